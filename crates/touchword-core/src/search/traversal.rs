//! Pure predicates controlling which correction operators are legal at each
//! step of the search.

use crate::lexicon::ChildEdge;
use crate::proximity::ProximityType;
use crate::settings::settings;

use super::dic_node::DicNode;
use super::session::TraverseSession;
use super::{MAX_WORD_LENGTH, MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE};

pub trait Traversal {
    /// Pointers consumed by this traversal. Typing reads pointer 0 only.
    fn max_pointer_count(&self) -> usize {
        1
    }

    fn max_cache_size(&self) -> usize;

    fn max_spatial_distance(&self) -> f32;

    /// Preallocation hint for child enumeration.
    fn default_expand_dic_node_size(&self) -> usize;

    /// Error corrections stop once the normalized compound distance exceeds
    /// the spatial prune threshold.
    fn allows_error_corrections(&self, node: &DicNode) -> bool;

    /// Global toggle for phrase-level auto-commit.
    fn allow_partial_commit(&self) -> bool;

    /// Look-ahead corrections (transposition, insertion) need two unconsumed
    /// touch points and a node that has started spelling a word.
    fn can_do_look_ahead_correction(&self, session: &TraverseSession, node: &DicNode) -> bool;

    /// Whether skipping `edge`'s letter is worth exploring as an omission.
    fn is_omission(&self, session: &TraverseSession, node: &DicNode, edge: &ChildEdge) -> bool;

    /// Filter applied after an omission node's child has been weighted: the
    /// child must still align with the touch it consumed.
    fn is_possible_omission_child_node(
        &self,
        session: &TraverseSession,
        omission_node: &DicNode,
        child: &DicNode,
    ) -> bool;

    /// The skipped letter costs nothing when it is an apostrophe.
    fn is_zero_cost_omission(&self, edge: &ChildEdge) -> bool;

    fn is_space_substitution_terminal(&self, session: &TraverseSession, node: &DicNode) -> bool;

    fn is_space_omission_terminal(&self, session: &TraverseSession, node: &DicNode) -> bool;

    fn is_good_to_traverse_next_word(&self, session: &TraverseSession, node: &DicNode) -> bool;

    fn should_depth_level_cache(&self, session: &TraverseSession) -> bool;

    fn should_node_level_cache(&self, session: &TraverseSession, node: &DicNode) -> bool;

    fn get_proximity_type(
        &self,
        session: &TraverseSession,
        node: &DicNode,
        edge: &ChildEdge,
    ) -> ProximityType;

    fn same_as_typed(&self, session: &TraverseSession, node: &DicNode) -> bool;

    /// Typing requires every touch point to be consumed before a terminal
    /// may be emitted.
    fn needs_to_traverse_all_user_input(&self) -> bool {
        true
    }
}

/// Default predicates for typing, driven by the `[traversal]` settings.
#[derive(Debug, Default)]
pub struct TypingTraversal;

impl Traversal for TypingTraversal {
    fn max_cache_size(&self) -> usize {
        settings().traversal.max_cache_size
    }

    fn max_spatial_distance(&self) -> f32 {
        settings().traversal.max_spatial_distance
    }

    fn default_expand_dic_node_size(&self) -> usize {
        settings().traversal.expand_node_capacity
    }

    fn allows_error_corrections(&self, node: &DicNode) -> bool {
        node.scoring.normalized_compound_distance()
            < settings().traversal.error_correction_threshold
    }

    fn allow_partial_commit(&self) -> bool {
        true
    }

    fn can_do_look_ahead_correction(&self, session: &TraverseSession, node: &DicNode) -> bool {
        (node.input_index(0) as usize) + 1 < session.input_size() && !node.is_at_word_start()
    }

    fn is_omission(&self, session: &TraverseSession, node: &DicNode, edge: &ChildEdge) -> bool {
        // Skipping a leaf letter cannot be recovered by the next touches.
        edge.has_children && (node.input_index(0) as usize) < session.input_size()
    }

    fn is_possible_omission_child_node(
        &self,
        session: &TraverseSession,
        _omission_node: &DicNode,
        child: &DicNode,
    ) -> bool {
        if child.is_zero_cost_omission {
            return true;
        }
        if child.input_index(0) == 0 {
            return false;
        }
        let consumed = child.input_index(0) as usize - 1;
        let Some(cp) = child.last_code_point() else {
            return false;
        };
        matches!(
            session.classify(consumed, cp),
            ProximityType::MatchChar | ProximityType::ProximityChar
        )
    }

    fn is_zero_cost_omission(&self, edge: &ChildEdge) -> bool {
        edge.code_point == '\''
    }

    fn is_space_substitution_terminal(&self, session: &TraverseSession, node: &DicNode) -> bool {
        node.is_terminal_word
            && (node.input_index(0) as usize) < session.input_size()
            && session.has_space_proximity(node.input_index(0) as usize)
    }

    fn is_space_omission_terminal(&self, session: &TraverseSession, node: &DicNode) -> bool {
        node.is_terminal_word
            && node.current_word_len() >= 1
            && (node.input_index(0) as usize) < session.input_size()
    }

    fn is_good_to_traverse_next_word(&self, session: &TraverseSession, node: &DicNode) -> bool {
        let t = &settings().traversal;
        session.lexicon.word_probability(node.pos) >= t.min_probability_for_next_word
            && node.word_count() < t.max_word_count
            && node.depth() + 1 < MAX_WORD_LENGTH
    }

    fn should_depth_level_cache(&self, session: &TraverseSession) -> bool {
        session.input_size() >= MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE
    }

    fn should_node_level_cache(&self, _session: &TraverseSession, _node: &DicNode) -> bool {
        false
    }

    fn get_proximity_type(
        &self,
        session: &TraverseSession,
        node: &DicNode,
        edge: &ChildEdge,
    ) -> ProximityType {
        session.classify(node.input_index(0) as usize, edge.code_point)
    }

    fn same_as_typed(&self, session: &TraverseSession, node: &DicNode) -> bool {
        node.output() == session.typed_code_points()
    }
}
