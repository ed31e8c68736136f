//! Per-search state: proximity tables, frontier cache, previous-word
//! context, and the bigram probability cache.
//!
//! The session is caller-owned and reused across calls so that a new input
//! extending the previous one can resume the earlier search.

use std::collections::HashMap;

use crate::lexicon::Lexicon;
use crate::proximity::{DoubleLetterLevel, KeyboardLayout, ProximityState, ProximityType};
use crate::settings::settings;

use super::cache::SearchCache;

pub struct TraverseSession<'a> {
    pub(crate) lexicon: &'a dyn Lexicon,
    layout: &'a KeyboardLayout,
    proximity: Option<ProximityState>,
    pub(crate) cache: SearchCache,
    pub(crate) prev_word_pos: Option<u32>,
    pub(crate) partially_committed: bool,
    continuous_possible: bool,
    prev_typed: Vec<char>,
    bigram_cache: HashMap<(u32, u32), Option<u8>>,
}

impl<'a> TraverseSession<'a> {
    pub fn new(lexicon: &'a dyn Lexicon, layout: &'a KeyboardLayout) -> Self {
        Self {
            lexicon,
            layout,
            proximity: None,
            cache: SearchCache::new(),
            prev_word_pos: None,
            partially_committed: false,
            continuous_possible: false,
            prev_typed: Vec::new(),
            bigram_cache: HashMap::new(),
        }
    }

    /// Previous-word context for bigram scoring at the start of the input.
    pub fn set_prev_word_pos(&mut self, pos: Option<u32>) {
        self.prev_word_pos = pos;
    }

    /// Rebuild the proximity tables for a new input and record whether the
    /// new input extends the previous one (continuation detection).
    pub(crate) fn setup_for_get_suggestions(
        &mut self,
        xs: &[i32],
        ys: &[i32],
        times: &[i32],
        pointer_ids: &[i32],
        input_code_points: &[char],
    ) {
        let proximity = ProximityState::new(
            self.layout,
            xs,
            ys,
            times,
            pointer_ids,
            input_code_points,
            0,
        );
        // Identical input cannot resume: the previous frontier no longer
        // carries the terminals that were drained at emit time.
        let typed = proximity.typed_code_points().to_vec();
        self.continuous_possible = !self.prev_typed.is_empty()
            && typed.len() > self.prev_typed.len()
            && typed.starts_with(&self.prev_typed)
            && self.cache.has_continuation();
        self.prev_typed = typed;
        self.bigram_cache.clear();
        self.proximity = Some(proximity);
    }

    pub fn input_size(&self) -> usize {
        self.proximity.as_ref().map_or(0, |p| p.input_size())
    }

    pub(crate) fn is_proximity_used(&self) -> bool {
        self.proximity.as_ref().is_some_and(|p| p.is_used())
    }

    pub(crate) fn is_continuous_suggestion_possible(&self) -> bool {
        self.continuous_possible
    }

    pub(crate) fn typed_code_points(&self) -> &[char] {
        self.proximity
            .as_ref()
            .map_or(&[], |p| p.typed_code_points())
    }

    pub(crate) fn classify(&self, index: usize, code_point: char) -> ProximityType {
        self.proximity
            .as_ref()
            .map_or(ProximityType::UnrelatedChar, |p| {
                p.classify(index, code_point)
            })
    }

    pub(crate) fn spatial_cost(&self, index: usize, code_point: char) -> f32 {
        self.proximity
            .as_ref()
            .map_or(settings().traversal.max_spatial_distance, |p| {
                p.spatial_cost(index, code_point)
            })
    }

    pub(crate) fn primary_code_point(&self, index: usize) -> Option<char> {
        self.proximity.as_ref()?.primary_code_point(index)
    }

    pub(crate) fn has_space_proximity(&self, index: usize) -> bool {
        self.proximity
            .as_ref()
            .is_some_and(|p| p.has_space_proximity(index))
    }

    pub(crate) fn double_letter_hint(&self, index: usize) -> DoubleLetterLevel {
        self.proximity
            .as_ref()
            .map_or(DoubleLetterLevel::None, |p| p.double_letter_hint(index))
    }

    /// Bigram lookup memoized for the duration of one search.
    pub(crate) fn bigram_probability_cached(
        &mut self,
        prev_word_pos: u32,
        word_pos: u32,
    ) -> Option<u8> {
        let lexicon = self.lexicon;
        *self
            .bigram_cache
            .entry((prev_word_pos, word_pos))
            .or_insert_with(|| lexicon.bigram_probability(prev_word_pos, word_pos))
    }
}
