//! Correction events and their cost contributions.
//!
//! Each correction operator maps to one `CorrectionKind`; applying it adds a
//! spatial and/or language cost to the child node's scoring state, bumps the
//! correction counters, and advances the input indices. Costs come from the
//! injected `Weighting` policy so that layouts and languages can retune.

use crate::proximity::DoubleLetterLevel;
use crate::settings::settings;

use super::dic_node::DicNode;
use super::session::TraverseSession;

/// The correction event being applied to a child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionKind {
    /// The touch aligns with the emitted letter's key (or its neighborhood
    /// when `proximity` is set).
    Match { proximity: bool },
    AdditionalProximity,
    Substitution,
    Omission { zero_cost: bool },
    Insertion,
    Transposition,
    SpaceSubstitution,
    NewWord,
    Terminal,
    Completion,
}

/// Cost policy for the correction events. All returned costs are
/// non-negative.
pub trait Weighting {
    /// Point-to-key alignment cost for the touch at `point_index`.
    fn match_spatial_cost(
        &self,
        session: &TraverseSession,
        point_index: usize,
        code_point: char,
    ) -> f32;

    /// Extra penalty when the match was to a neighboring key.
    fn proximity_extra_cost(&self) -> f32;

    fn additional_proximity_cost(&self) -> f32;

    fn substitution_cost(&self) -> f32;

    fn omission_cost(&self, zero_cost: bool) -> f32;

    /// Cost of skipping the spurious touch at `skipped_index` and aligning
    /// the next touch to `code_point`.
    fn insertion_cost(
        &self,
        session: &TraverseSession,
        skipped_index: usize,
        code_point: char,
    ) -> f32;

    /// Cost of consuming the touches at `point_index` and `point_index + 1`
    /// in swapped order for the letters `first` then `second`.
    fn transposition_cost(
        &self,
        session: &TraverseSession,
        point_index: usize,
        first: char,
        second: char,
    ) -> f32;

    fn space_substitution_cost(&self) -> f32;

    /// Language cost of committing the word at `word_pos` whose predecessor
    /// ended at `prev_word_pos` (unigram fallback when no bigram exists).
    fn new_word_language_cost(
        &self,
        session: &mut TraverseSession,
        prev_word_pos: Option<u32>,
        word_pos: u32,
    ) -> f32;

    fn terminal_spatial_cost(&self, session: &TraverseSession, node: &DicNode) -> f32;

    fn completion_language_cost(&self) -> f32;

    /// Saturation bound for accumulated distances.
    fn max_value(&self) -> f32;
}

/// Apply one correction event to `child`: add costs, bump counters, advance
/// input indices. `parent` is the committing node for `NewWord` and unused
/// otherwise.
pub fn add_cost_and_forward_input_index(
    weighting: &dyn Weighting,
    kind: CorrectionKind,
    session: &mut TraverseSession,
    parent: Option<&DicNode>,
    child: &mut DicNode,
) {
    let max_value = weighting.max_value();
    match kind {
        CorrectionKind::Match { proximity } => {
            let index = child.input_index(0) as usize;
            let cp = child.last_code_point().unwrap_or('\0');
            let distance = weighting.match_spatial_cost(session, index, cp);
            let spatial = if proximity {
                distance + weighting.proximity_extra_cost()
            } else {
                distance
            };
            child.forward_input_index(0, 1);
            child.scoring.add_raw_length(distance);
            child.scoring.add_cost(
                spatial,
                0.0,
                true,
                child.total_input_index(),
                false,
                proximity,
                max_value,
            );
            // A repeated touch on the same key feeding a repeated letter is
            // a double-letter hint, not a typo.
            let hint = session.double_letter_hint(index);
            if hint != DoubleLetterLevel::None {
                let out = child.output();
                if out.len() >= 2 && out[out.len() - 2] == cp {
                    child.scoring.set_double_letter_level(hint);
                }
            }
        }
        CorrectionKind::AdditionalProximity => {
            child.forward_input_index(0, 1);
            child.scoring.add_cost(
                weighting.additional_proximity_cost(),
                0.0,
                true,
                child.total_input_index(),
                false,
                true,
                max_value,
            );
        }
        CorrectionKind::Substitution => {
            child.forward_input_index(0, 1);
            child.scoring.add_cost(
                weighting.substitution_cost(),
                0.0,
                true,
                child.total_input_index(),
                true,
                false,
                max_value,
            );
        }
        CorrectionKind::Omission { zero_cost } => {
            child.scoring.add_cost(
                weighting.omission_cost(zero_cost),
                0.0,
                true,
                child.total_input_index(),
                true,
                false,
                max_value,
            );
        }
        CorrectionKind::Insertion => {
            let skipped = child.input_index(0) as usize;
            let cp = child.last_code_point().unwrap_or('\0');
            let cost = weighting.insertion_cost(session, skipped, cp);
            child.forward_input_index(0, 2);
            child.scoring.add_cost(
                cost,
                0.0,
                true,
                child.total_input_index(),
                true,
                false,
                max_value,
            );
            // Skipping a repeat of the previous key is the held-key shape.
            let hint = session.double_letter_hint(skipped + 1);
            if hint != DoubleLetterLevel::None {
                child.scoring.set_double_letter_level(hint);
            }
        }
        CorrectionKind::Transposition => {
            let index = child.input_index(0) as usize;
            let out = child.output();
            let (first, second) = if out.len() >= 2 {
                (out[out.len() - 2], out[out.len() - 1])
            } else {
                ('\0', '\0')
            };
            let cost = weighting.transposition_cost(session, index, first, second);
            child.forward_input_index(0, 2);
            child.scoring.add_cost(
                cost,
                0.0,
                true,
                child.total_input_index(),
                true,
                false,
                max_value,
            );
        }
        CorrectionKind::SpaceSubstitution => {
            child.forward_input_index(0, 1);
            child.scoring.add_cost(
                weighting.space_substitution_cost(),
                0.0,
                true,
                child.total_input_index(),
                true,
                false,
                max_value,
            );
        }
        CorrectionKind::NewWord => {
            let (prev, word) = match parent {
                Some(p) => (p.prev_word_pos, p.pos),
                None => (None, child.pos),
            };
            let language = weighting.new_word_language_cost(session, prev, word);
            child.scoring.add_cost(
                0.0,
                language,
                false,
                child.total_input_index(),
                false,
                false,
                max_value,
            );
        }
        CorrectionKind::Terminal => {
            let spatial = weighting.terminal_spatial_cost(session, child);
            child.scoring.add_cost(
                spatial,
                0.0,
                true,
                child.total_input_index(),
                false,
                false,
                max_value,
            );
        }
        CorrectionKind::Completion => {
            child.scoring.add_cost(
                0.0,
                weighting.completion_language_cost(),
                false,
                child.total_input_index(),
                false,
                false,
                max_value,
            );
        }
    }
}

/// Default cost policy for typing, driven by the `[weighting]` settings.
#[derive(Debug, Default)]
pub struct TypingWeighting;

impl Weighting for TypingWeighting {
    fn match_spatial_cost(
        &self,
        session: &TraverseSession,
        point_index: usize,
        code_point: char,
    ) -> f32 {
        session.spatial_cost(point_index, code_point) * settings().weighting.distance_weight
    }

    fn proximity_extra_cost(&self) -> f32 {
        settings().weighting.proximity_cost
    }

    fn additional_proximity_cost(&self) -> f32 {
        settings().weighting.additional_proximity_cost
    }

    fn substitution_cost(&self) -> f32 {
        settings().weighting.substitution_cost
    }

    fn omission_cost(&self, zero_cost: bool) -> f32 {
        if zero_cost {
            0.0
        } else {
            settings().weighting.omission_cost
        }
    }

    fn insertion_cost(
        &self,
        session: &TraverseSession,
        skipped_index: usize,
        code_point: char,
    ) -> f32 {
        let w = &settings().weighting;
        let same_key = matches!(
            (
                session.primary_code_point(skipped_index),
                session.primary_code_point(skipped_index + 1),
            ),
            (Some(a), Some(b)) if a == b
        );
        let base = if same_key {
            w.insertion_same_key_cost
        } else {
            w.insertion_cost
        };
        base + session.spatial_cost(skipped_index + 1, code_point) * w.distance_weight
    }

    fn transposition_cost(
        &self,
        session: &TraverseSession,
        point_index: usize,
        first: char,
        second: char,
    ) -> f32 {
        let w = &settings().weighting;
        w.transposition_cost
            + session.spatial_cost(point_index + 1, first) * w.distance_weight
            + session.spatial_cost(point_index, second) * w.distance_weight
    }

    fn space_substitution_cost(&self) -> f32 {
        settings().weighting.space_substitution_cost
    }

    fn new_word_language_cost(
        &self,
        session: &mut TraverseSession,
        prev_word_pos: Option<u32>,
        word_pos: u32,
    ) -> f32 {
        let w = &settings().weighting;
        let bigram = prev_word_pos.and_then(|prev| session.bigram_probability_cached(prev, word_pos));
        let improbability = match bigram {
            Some(p) => {
                let base = (255 - p as i32) as f32 / 255.0 * w.unigram_cost_scale;
                (base - w.new_word_bigram_bonus).max(0.0)
            }
            None => {
                let p = session.lexicon.word_probability(word_pos);
                (255 - p as i32) as f32 / 255.0 * w.unigram_cost_scale
            }
        };
        w.new_word_cost + improbability
    }

    fn terminal_spatial_cost(&self, _session: &TraverseSession, _node: &DicNode) -> f32 {
        settings().weighting.terminal_cost
    }

    fn completion_language_cost(&self) -> f32 {
        settings().weighting.completion_cost
    }

    fn max_value(&self) -> f32 {
        settings().weighting.max_value_for_weighting
    }
}
