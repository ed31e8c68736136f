//! Terminal ranking: language-weight tuning, most-probable-string and
//! double-letter handling, final score mapping, and the safety net.

use crate::proximity::DoubleLetterLevel;
use crate::settings::settings;

use super::dic_node::DicNode;
use super::session::TraverseSession;
use super::suggest::{Suggestion, SuggestionKind};
use super::AUTOCORRECT_CLASSIFICATION_THRESHOLD;

pub trait Scoring {
    /// Multiplier applied to language distances when ranking terminals.
    /// Rebalances toward the language model when spatial confidence is low.
    fn adjusted_language_weight(&self, session: &TraverseSession, terminals: &[DicNode]) -> f32;

    /// The terminal whose language distance dominates, emitted at index 0
    /// when its normalized distance clears the confidence threshold.
    fn most_probable_string(
        &self,
        session: &TraverseSession,
        terminals: &[DicNode],
        language_weight: f32,
    ) -> Option<Suggestion>;

    /// Index and level of a terminal whose path indicates an intentional
    /// double letter.
    fn search_double_letter(&self, terminals: &[DicNode]) -> Option<(usize, DoubleLetterLevel)>;

    /// Demotion added to every terminal other than the double-letter one.
    fn double_letter_demotion_cost(
        &self,
        index: usize,
        double_letter_index: usize,
        level: DoubleLetterLevel,
    ) -> f32;

    /// Monotone-decreasing map from compound distance to a 32-bit score.
    fn final_score(&self, compound_distance: f32, input_size: usize, force_autocorrect: bool)
        -> i32;

    fn does_auto_correct_valid_word(&self) -> bool {
        false
    }

    /// Replace the most-probable-string with an obvious-correction sentinel
    /// when its score trails the best terminal by more than the tolerance.
    fn safety_net(&self, terminal_size: usize, max_score: i32, most_probable: &mut Suggestion);
}

/// Default ranking policy for typing, driven by the `[scoring]` settings.
#[derive(Debug, Default)]
pub struct TypingScoring;

impl Scoring for TypingScoring {
    fn adjusted_language_weight(&self, session: &TraverseSession, terminals: &[DicNode]) -> f32 {
        let Some(top) = terminals.first() else {
            return 1.0;
        };
        let input_size = session.input_size().max(1);
        let spatial_per_point = top.scoring.spatial_distance() / input_size as f32;
        if spatial_per_point > AUTOCORRECT_CLASSIFICATION_THRESHOLD {
            settings()
                .scoring
                .low_confidence_language_weight
                .clamp(0.5, 1.5)
        } else {
            1.0
        }
    }

    fn most_probable_string(
        &self,
        session: &TraverseSession,
        terminals: &[DicNode],
        language_weight: f32,
    ) -> Option<Suggestion> {
        let input_size = session.input_size();
        // Multi-word paths carry committed-word language costs that are not
        // comparable here; only valid single words qualify.
        let best = terminals
            .iter()
            .filter(|t| {
                !t.has_multiple_words()
                    && session.lexicon.word_probability(t.pos) > 0
                    && !session
                        .lexicon
                        .attributes_at(t.pos)
                        .is_blacklisted_or_not_a_word()
            })
            .min_by(|a, b| {
                a.scoring
                    .language_distance()
                    .total_cmp(&b.scoring.language_distance())
                    .then(
                        a.scoring
                            .normalized_compound_distance()
                            .total_cmp(&b.scoring.normalized_compound_distance()),
                    )
            })?;
        let compound = best.scoring.compound_distance(language_weight);
        let normalized = compound / input_size.max(1) as f32;
        if normalized > settings().scoring.most_probable_threshold {
            return None;
        }
        Some(Suggestion {
            text: best.out_text(),
            score: self.final_score(compound, input_size, false),
            kind: SuggestionKind::Correction,
            space_indices: Vec::new(),
            edit_correction_count: best.scoring.edit_correction_count(),
            proximity_correction_count: best.scoring.proximity_correction_count(),
        })
    }

    fn search_double_letter(&self, terminals: &[DicNode]) -> Option<(usize, DoubleLetterLevel)> {
        let mut weak = None;
        for (i, t) in terminals.iter().enumerate() {
            match t.scoring.double_letter_level() {
                DoubleLetterLevel::Strong => return Some((i, DoubleLetterLevel::Strong)),
                DoubleLetterLevel::Weak if weak.is_none() => {
                    weak = Some((i, DoubleLetterLevel::Weak));
                }
                _ => {}
            }
        }
        weak
    }

    fn double_letter_demotion_cost(
        &self,
        index: usize,
        double_letter_index: usize,
        level: DoubleLetterLevel,
    ) -> f32 {
        if index == double_letter_index {
            return 0.0;
        }
        match level {
            DoubleLetterLevel::None => 0.0,
            DoubleLetterLevel::Weak => settings().scoring.double_letter_demotion_weak,
            DoubleLetterLevel::Strong => settings().scoring.double_letter_demotion_strong,
        }
    }

    fn final_score(
        &self,
        compound_distance: f32,
        input_size: usize,
        force_autocorrect: bool,
    ) -> i32 {
        let s = &settings().scoring;
        let normalized = compound_distance / input_size.max(1) as f32;
        let clamped = normalized.clamp(0.0, 2.0);
        let mut score = ((2.0 - clamped) / 2.0 * s.score_scale) as i32;
        if force_autocorrect {
            score = score.saturating_add(s.autocorrect_bonus);
        }
        score
    }

    fn safety_net(&self, terminal_size: usize, max_score: i32, most_probable: &mut Suggestion) {
        if terminal_size == 0 {
            return;
        }
        let tolerance = settings().scoring.safety_net_score_tolerance;
        if most_probable.score < max_score.saturating_sub(tolerance) {
            most_probable.kind = SuggestionKind::ObviousCorrection;
            most_probable.score = max_score;
        }
    }
}
