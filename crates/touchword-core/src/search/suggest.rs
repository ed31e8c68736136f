//! Top-level search driver: initialize, expand, emit.

use tracing::{debug, debug_span};

use crate::lexicon::ChildEdge;
use crate::proximity::ProximityType;

use super::dic_node::DicNode;
use super::scoring::{Scoring, TypingScoring};
use super::session::TraverseSession;
use super::traversal::{Traversal, TypingTraversal};
use super::weighting::{
    add_cost_and_forward_input_index, CorrectionKind, TypingWeighting, Weighting,
};
use super::{
    CORRECT_INSERTION, CORRECT_OMISSION, CORRECT_SPACE_OMISSION, CORRECT_TRANSPOSITION,
    MAX_RESULTS, MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE, MIN_LEN_FOR_MULTI_WORD_AUTOCORRECT,
};

/// Kind of an emitted suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Correction,
    Whitelist,
    Shortcut,
    ObviousCorrection,
}

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub score: i32,
    pub kind: SuggestionKind,
    /// Output positions of the spaces in a multi-word path.
    pub space_indices: Vec<usize>,
    pub edit_correction_count: u16,
    pub proximity_correction_count: u16,
}

/// The search driver. Holds the three injected policies; all per-search
/// state lives in the caller-provided session.
pub struct Suggest {
    traversal: Box<dyn Traversal>,
    scoring: Box<dyn Scoring>,
    weighting: Box<dyn Weighting>,
}

impl Default for Suggest {
    fn default() -> Self {
        Self::typing()
    }
}

impl Suggest {
    pub fn new(
        traversal: Box<dyn Traversal>,
        scoring: Box<dyn Scoring>,
        weighting: Box<dyn Weighting>,
    ) -> Self {
        Self {
            traversal,
            scoring,
            weighting,
        }
    }

    /// Driver with the default typing policies.
    pub fn typing() -> Self {
        Self::new(
            Box::new(TypingTraversal),
            Box::new(TypingScoring),
            Box::new(TypingWeighting),
        )
    }

    /// Run one search over the given touch points and return the ranked
    /// suggestions. `commit_point` greater than zero commits the first
    /// `commit_point` words of the previous top-1 path before resuming.
    pub fn get_suggestions(
        &self,
        session: &mut TraverseSession,
        xs: &[i32],
        ys: &[i32],
        times: &[i32],
        pointer_ids: &[i32],
        input_code_points: &[char],
        commit_point: usize,
    ) -> Vec<Suggestion> {
        session.setup_for_get_suggestions(xs, ys, times, pointer_ids, input_code_points);
        if !session.is_proximity_used() {
            return Vec::new();
        }
        let _span = debug_span!("get_suggestions", input_size = session.input_size()).entered();

        self.initialize_search(session, commit_point);

        {
            let _span = debug_span!("expand").entered();
            let input_size = session.input_size();
            while session.cache.active_size() > 0 {
                self.expand_current_dic_nodes(session);
                session.cache.advance_active();
                session.cache.advance_input_index(input_size);
            }
        }

        let results = self.output_suggestions(session);
        debug!(result_count = results.len());
        results
    }

    fn initialize_search(&self, session: &mut TraverseSession, commit_point: usize) {
        if session.input_size() > MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE
            && session.is_continuous_suggestion_possible()
        {
            if commit_point == 0 {
                if session.cache.continue_search() {
                    return;
                }
            } else if let Some(top) = session.cache.set_commit_point(commit_point) {
                session.prev_word_pos = top.prev_word_pos;
                if session.cache.continue_search() {
                    session.partially_committed = true;
                    return;
                }
            }
        }
        // Restart recognition at the root.
        session
            .cache
            .reset(self.traversal.max_cache_size(), MAX_RESULTS);
        session.partially_committed = false;
        let root = DicNode::init_as_root(session.lexicon.root_position(), session.prev_word_pos);
        session.cache.push_active(root);
    }

    /// Expand every node in the active list by advancing to the possible
    /// trie children for the next touch point (or none, for look-ahead).
    fn expand_current_dic_nodes(&self, session: &mut TraverseSession) {
        let input_size = session.input_size();
        let mut child_edges: Vec<ChildEdge> =
            Vec::with_capacity(self.traversal.default_expand_dic_node_size());

        let should_depth_level_cache = self.traversal.should_depth_level_cache(session);
        if should_depth_level_cache {
            session.cache.update_last_cached_input_index();
        }

        while let Some(mut dic_node) = session.cache.pop_active() {
            if dic_node.is_total_input_size_exceeding_limit(input_size) {
                continue;
            }
            let point0_index = dic_node.input_index(0) as usize;
            let can_do_look_ahead = self
                .traversal
                .can_do_look_ahead_correction(session, &dic_node);
            let is_look_ahead = can_do_look_ahead
                && session
                    .cache
                    .is_look_ahead_correction_input_index(point0_index);
            let is_completion = dic_node.is_completion(input_size);

            if should_depth_level_cache
                || self.traversal.should_node_level_cache(session, &dic_node)
            {
                session.cache.push_continuation(dic_node.clone());
                dic_node.set_cached();
            }

            if is_look_ahead {
                // Deferred nodes have not consumed the latest touch point
                // yet; the look-ahead operators decide what to do with it
                // (insertions must not consume it at all).
                if CORRECT_TRANSPOSITION {
                    self.process_dic_node_as_transposition(session, &dic_node);
                }
                if CORRECT_INSERTION {
                    self.process_dic_node_as_insertion(session, &dic_node);
                }
                continue;
            }

            // Error corrections are only considered while the normalized
            // compound distance stays below the spatial prune threshold.
            let allows_error_corrections = self.traversal.allows_error_corrections(&dic_node);

            // Space substitution (e.g., hevis => he is).
            if allows_error_corrections
                && CORRECT_SPACE_OMISSION
                && self
                    .traversal
                    .is_space_substitution_terminal(session, &dic_node)
            {
                self.create_next_word_dic_node(session, &dic_node, true);
            }

            child_edges.clear();
            session.lexicon.collect_children(dic_node.pos, &mut child_edges);

            for edge in &child_edges {
                if is_completion {
                    // The lexicon letter is beyond the input: forward lookahead.
                    self.process_dic_node_as_match(session, &dic_node, edge, false);
                    continue;
                }
                if allows_error_corrections
                    && CORRECT_OMISSION
                    && self.traversal.is_omission(session, &dic_node, edge)
                {
                    if let Some(mut omission_node) = dic_node.init_as_child(edge) {
                        omission_node.is_zero_cost_omission =
                            self.traversal.is_zero_cost_omission(edge);
                        self.process_dic_node_as_omission(session, &omission_node);
                    }
                }
                match self.traversal.get_proximity_type(session, &dic_node, edge) {
                    ProximityType::MatchChar => {
                        self.process_dic_node_as_match(session, &dic_node, edge, false);
                    }
                    ProximityType::ProximityChar => {
                        self.process_dic_node_as_match(session, &dic_node, edge, true);
                    }
                    ProximityType::AdditionalProximityChar => {
                        if allows_error_corrections {
                            self.process_dic_node_as_additional_proximity(
                                session, &dic_node, edge,
                            );
                        }
                    }
                    ProximityType::SubstitutionChar => {
                        if allows_error_corrections {
                            self.process_dic_node_as_substitution(session, &dic_node, edge);
                        }
                    }
                    ProximityType::UnrelatedChar => {
                        // Drop the child and do nothing.
                    }
                }
            }

            // Defer the node so look-ahead corrections can fire once the
            // next touch point is in frame.
            if allows_error_corrections && can_do_look_ahead {
                session.cache.push_next_active(dic_node);
            }
        }
    }

    /// Align the child to the touch point (or treat it as completion once
    /// the input is exhausted).
    fn weight_child_node(&self, session: &mut TraverseSession, child: &mut DicNode, proximity: bool) {
        let input_size = session.input_size();
        if child.is_completion(input_size) {
            add_cost_and_forward_input_index(
                self.weighting.as_ref(),
                CorrectionKind::Completion,
                session,
                None,
                child,
            );
        } else {
            add_cost_and_forward_input_index(
                self.weighting.as_ref(),
                CorrectionKind::Match { proximity },
                session,
                None,
                child,
            );
        }
    }

    fn process_dic_node_as_match(
        &self,
        session: &mut TraverseSession,
        parent: &DicNode,
        edge: &ChildEdge,
        proximity: bool,
    ) {
        let Some(mut child) = parent.init_as_child(edge) else {
            return;
        };
        self.weight_child_node(session, &mut child, proximity);
        self.process_expanded_dic_node(session, child);
    }

    fn process_dic_node_as_additional_proximity(
        &self,
        session: &mut TraverseSession,
        parent: &DicNode,
        edge: &ChildEdge,
    ) {
        let Some(mut child) = parent.init_as_child(edge) else {
            return;
        };
        add_cost_and_forward_input_index(
            self.weighting.as_ref(),
            CorrectionKind::AdditionalProximity,
            session,
            None,
            &mut child,
        );
        self.process_expanded_dic_node(session, child);
    }

    fn process_dic_node_as_substitution(
        &self,
        session: &mut TraverseSession,
        parent: &DicNode,
        edge: &ChildEdge,
    ) {
        let Some(mut child) = parent.init_as_child(edge) else {
            return;
        };
        add_cost_and_forward_input_index(
            self.weighting.as_ref(),
            CorrectionKind::Substitution,
            session,
            None,
            &mut child,
        );
        self.process_expanded_dic_node(session, child);
    }

    /// Omission (e.g., ths => this): the skipped letter is already emitted
    /// on `omission_node`; match its children against the current touch and
    /// keep only the ones that still align.
    fn process_dic_node_as_omission(
        &self,
        session: &mut TraverseSession,
        omission_node: &DicNode,
    ) {
        let zero_cost = omission_node.is_zero_cost_omission;
        let mut child_edges = Vec::new();
        session
            .lexicon
            .collect_children(omission_node.pos, &mut child_edges);

        for edge in &child_edges {
            let Some(mut child) = omission_node.init_as_child(edge) else {
                continue;
            };
            child.is_zero_cost_omission = zero_cost;
            add_cost_and_forward_input_index(
                self.weighting.as_ref(),
                CorrectionKind::Omission { zero_cost },
                session,
                None,
                &mut child,
            );
            self.weight_child_node(session, &mut child, false);
            if !self
                .traversal
                .is_possible_omission_child_node(session, omission_node, &child)
            {
                continue;
            }
            self.process_expanded_dic_node(session, child);
        }
    }

    /// Insertion (e.g., thiis => this): skip the current touch point and
    /// match children against the next one.
    fn process_dic_node_as_insertion(&self, session: &mut TraverseSession, dic_node: &DicNode) {
        let point_index = dic_node.input_index(0) as usize;
        if point_index + 1 >= session.input_size() {
            return;
        }
        for edge in self.proximity_child_edges(session, dic_node, point_index + 1) {
            let Some(mut child) = dic_node.init_as_child(&edge) else {
                continue;
            };
            add_cost_and_forward_input_index(
                self.weighting.as_ref(),
                CorrectionKind::Insertion,
                session,
                None,
                &mut child,
            );
            self.process_expanded_dic_node(session, child);
        }
    }

    /// Transposition (e.g., thsi => this): consume the next two touch points
    /// in swapped order.
    fn process_dic_node_as_transposition(
        &self,
        session: &mut TraverseSession,
        dic_node: &DicNode,
    ) {
        let point_index = dic_node.input_index(0) as usize;
        if point_index + 1 >= session.input_size() {
            return;
        }
        for first_edge in self.proximity_child_edges(session, dic_node, point_index + 1) {
            if !first_edge.has_children {
                continue;
            }
            let Some(first_child) = dic_node.init_as_child(&first_edge) else {
                continue;
            };
            for second_edge in self.proximity_child_edges(session, &first_child, point_index) {
                let Some(mut child) = first_child.init_as_child(&second_edge) else {
                    continue;
                };
                add_cost_and_forward_input_index(
                    self.weighting.as_ref(),
                    CorrectionKind::Transposition,
                    session,
                    None,
                    &mut child,
                );
                self.process_expanded_dic_node(session, child);
            }
        }
    }

    /// Trie children of `dic_node` whose letters align with the touch at
    /// `point_index` (exact or proximity).
    fn proximity_child_edges(
        &self,
        session: &TraverseSession,
        dic_node: &DicNode,
        point_index: usize,
    ) -> Vec<ChildEdge> {
        let mut edges = Vec::new();
        session.lexicon.collect_children(dic_node.pos, &mut edges);
        edges.retain(|e| {
            matches!(
                session.classify(point_index, e.code_point),
                ProximityType::MatchChar | ProximityType::ProximityChar
            )
        });
        edges
    }

    /// Fork a terminal copy of the node into the terminal list.
    fn process_terminal_dic_node(&self, session: &mut TraverseSession, dic_node: &DicNode) {
        if dic_node.scoring.compound_distance(1.0) >= self.weighting.max_value() {
            return;
        }
        if !dic_node.is_terminal_word {
            return;
        }
        if self.traversal.needs_to_traverse_all_user_input()
            && (dic_node.input_index(0) as usize) < session.input_size()
        {
            return;
        }
        let mut terminal = dic_node.clone();
        add_cost_and_forward_input_index(
            self.weighting.as_ref(),
            CorrectionKind::Terminal,
            session,
            None,
            &mut terminal,
        );
        session.cache.push_terminal(terminal);
    }

    /// Route a weighted child: fork a terminal if it completes a word, spawn
    /// a next-word node on space omission, and keep expanding while it has
    /// children.
    fn process_expanded_dic_node(&self, session: &mut TraverseSession, dic_node: DicNode) {
        self.process_terminal_dic_node(session, &dic_node);
        if dic_node.scoring.compound_distance(1.0) >= self.weighting.max_value() {
            return;
        }
        if CORRECT_SPACE_OMISSION
            && self
                .traversal
                .is_space_omission_terminal(session, &dic_node)
        {
            self.create_next_word_dic_node(session, &dic_node, false);
        }
        let input_size = session.input_size();
        let allows_look_ahead =
            !(dic_node.has_multiple_words() && dic_node.is_completion(input_size));
        if dic_node.has_children && allows_look_ahead {
            session.cache.push_next_active(dic_node);
        }
    }

    /// Start the next word of a multi-word path, charging the committed
    /// word's unigram/bigram language cost (and a consumed touch point when
    /// the break was a space substitution).
    fn create_next_word_dic_node(
        &self,
        session: &mut TraverseSession,
        dic_node: &DicNode,
        space_substitution: bool,
    ) {
        if !self.traversal.is_good_to_traverse_next_word(session, dic_node) {
            return;
        }
        let Some(mut new_node) = DicNode::init_as_root_with_previous_word(
            session.lexicon.root_position(),
            dic_node,
        ) else {
            return;
        };
        add_cost_and_forward_input_index(
            self.weighting.as_ref(),
            CorrectionKind::NewWord,
            session,
            Some(dic_node),
            &mut new_node,
        );
        if space_substitution {
            add_cost_and_forward_input_index(
                self.weighting.as_ref(),
                CorrectionKind::SpaceSubstitution,
                session,
                None,
                &mut new_node,
            );
        }
        session.cache.push_next_active(new_node);
    }

    /// Drain the terminal list and emit the ranked suggestions.
    fn output_suggestions(&self, session: &mut TraverseSession) -> Vec<Suggestion> {
        let _span = debug_span!("emit").entered();
        let input_size = session.input_size();
        let terminals = session.cache.drain_terminals_best_first();
        let terminal_size = terminals.len();

        let language_weight = self.scoring.adjusted_language_weight(session, &terminals);

        let mut output: Vec<Suggestion> = Vec::new();
        let has_most_probable = match self
            .scoring
            .most_probable_string(session, &terminals, language_weight)
        {
            Some(s) => {
                output.push(s);
                true
            }
            None => false,
        };

        let double_letter = self.scoring.search_double_letter(&terminals);

        let mut max_score = i32::MIN;
        for (terminal_index, terminal) in terminals.iter().enumerate() {
            if output.len() >= MAX_RESULTS {
                break;
            }
            let double_letter_cost = match double_letter {
                Some((index, level)) => {
                    self.scoring
                        .double_letter_demotion_cost(terminal_index, index, level)
                }
                None => 0.0,
            };
            let compound_distance =
                terminal.scoring.compound_distance(language_weight) + double_letter_cost;

            let probability = session.lexicon.word_probability(terminal.pos);
            let attributes = session.lexicon.attributes_at(terminal.pos);
            // Words with probability 0 and blacklisted/not-a-word entries are
            // not suggested themselves, but their shortcuts still are.
            let is_valid_word = probability > 0 && !attributes.is_blacklisted_or_not_a_word();

            let force_commit_multi_words = self.traversal.allow_partial_commit()
                && (session.partially_committed
                    || (input_size >= MIN_LEN_FOR_MULTI_WORD_AUTOCORRECT
                        && terminal.has_multiple_words()));
            let final_score = self.scoring.final_score(
                compound_distance,
                input_size,
                force_commit_multi_words
                    || (is_valid_word && self.scoring.does_auto_correct_valid_word()),
            );
            max_score = max_score.max(final_score);

            if is_valid_word {
                output.push(Suggestion {
                    text: terminal.out_text(),
                    score: final_score,
                    kind: SuggestionKind::Correction,
                    space_indices: terminal.space_indices(),
                    edit_correction_count: terminal.scoring.edit_correction_count(),
                    proximity_correction_count: terminal.scoring.proximity_correction_count(),
                });
            }

            let same_as_typed = self.traversal.same_as_typed(session, terminal);
            for shortcut in &attributes.shortcuts {
                if output.len() >= MAX_RESULTS {
                    break;
                }
                let kind = if shortcut.is_whitelist() && same_as_typed {
                    SuggestionKind::Whitelist
                } else {
                    SuggestionKind::Shortcut
                };
                output.push(Suggestion {
                    text: shortcut.text.clone(),
                    score: final_score,
                    kind,
                    space_indices: Vec::new(),
                    edit_correction_count: 0,
                    proximity_correction_count: 0,
                });
            }
        }

        if has_most_probable {
            self.scoring
                .safety_net(terminal_size, max_score, &mut output[0]);
        }
        output
    }
}
