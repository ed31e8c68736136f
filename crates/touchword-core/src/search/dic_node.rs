//! Search-frontier entries: one `DicNode` per candidate partial path.

use crate::lexicon::ChildEdge;
use crate::proximity::DoubleLetterLevel;

use super::{MAX_POINTER_COUNT, MAX_SPACE_COUNT, MAX_WORD_LENGTH};

/// Accumulated scoring data for one path. Plain data: nodes are value-copied
/// on every push, so this must stay trivially clonable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringState {
    double_letter_level: DoubleLetterLevel,
    edit_correction_count: u16,
    proximity_correction_count: u16,
    normalized_compound_distance: f32,
    spatial_distance: f32,
    language_distance: f32,
    total_prev_words_language_cost: f32,
    raw_length: f32,
}

impl ScoringState {
    /// Apply one weighting event. `total_input_index` is the number of touch
    /// points this path has consumed, used as the normalization denominator.
    pub fn add_cost(
        &mut self,
        spatial_cost: f32,
        language_cost: f32,
        do_normalization: bool,
        total_input_index: usize,
        is_edit_correction: bool,
        is_proximity_correction: bool,
        max_value: f32,
    ) {
        self.spatial_distance = (self.spatial_distance + spatial_cost).min(max_value);
        self.language_distance = (self.language_distance + language_cost).min(max_value);
        self.normalized_compound_distance = if do_normalization {
            (self.spatial_distance + self.language_distance)
                / (total_input_index.max(1) as f32)
        } else {
            self.spatial_distance + self.language_distance
        };
        if is_edit_correction {
            self.edit_correction_count += 1;
        }
        if is_proximity_correction {
            self.proximity_correction_count += 1;
        }
        if language_cost > 0.0 {
            self.total_prev_words_language_cost += language_cost;
        }
    }

    pub fn add_raw_length(&mut self, raw_length: f32) {
        self.raw_length += raw_length;
    }

    pub fn compound_distance(&self, language_weight: f32) -> f32 {
        self.spatial_distance + self.language_distance * language_weight
    }

    pub fn normalized_compound_distance(&self) -> f32 {
        self.normalized_compound_distance
    }

    pub fn spatial_distance(&self) -> f32 {
        self.spatial_distance
    }

    pub fn language_distance(&self) -> f32 {
        self.language_distance
    }

    pub fn total_prev_words_language_cost(&self) -> f32 {
        self.total_prev_words_language_cost
    }

    pub fn raw_length(&self) -> f32 {
        self.raw_length
    }

    pub fn edit_correction_count(&self) -> u16 {
        self.edit_correction_count
    }

    pub fn proximity_correction_count(&self) -> u16 {
        self.proximity_correction_count
    }

    pub fn double_letter_level(&self) -> DoubleLetterLevel {
        self.double_letter_level
    }

    /// Transitions are monotone toward `Strong`: once there, the level never
    /// downgrades, and `None` is a no-op.
    pub fn set_double_letter_level(&mut self, level: DoubleLetterLevel) {
        if level > self.double_letter_level {
            self.double_letter_level = level;
        }
    }
}

/// One candidate partial path through the lexicon trie.
///
/// Owned by whichever frontier list currently holds it; popping transfers
/// ownership to the driver, which writes back zero or more derived nodes.
#[derive(Debug, Clone)]
pub struct DicNode {
    /// Trie position of the most recently emitted letter (root position for
    /// a path that has not emitted into its current word yet).
    pub pos: u32,
    /// Terminal position of the previous committed word, for bigram lookup.
    /// `None` at sentence start.
    pub prev_word_pos: Option<u32>,

    output: [char; MAX_WORD_LENGTH],
    output_len: u8,
    /// Output index where the current word starts (after the last space).
    word_start: u8,
    space_indices: [u8; MAX_SPACE_COUNT],
    space_count: u8,

    input_indices: [u16; MAX_POINTER_COUNT],

    pub is_terminal_word: bool,
    pub has_children: bool,
    pub is_cached: bool,
    pub is_zero_cost_omission: bool,

    pub scoring: ScoringState,
}

impl DicNode {
    /// Root node for a fresh search.
    pub fn init_as_root(root_pos: u32, prev_word_pos: Option<u32>) -> Self {
        Self {
            pos: root_pos,
            prev_word_pos,
            output: ['\0'; MAX_WORD_LENGTH],
            output_len: 0,
            word_start: 0,
            space_indices: [0; MAX_SPACE_COUNT],
            space_count: 0,
            input_indices: [0; MAX_POINTER_COUNT],
            is_terminal_word: false,
            has_children: true,
            is_cached: false,
            is_zero_cost_omission: false,
            scoring: ScoringState::default(),
        }
    }

    /// Root-like node that starts the next word of a multi-word path. The
    /// committing node's output is kept and a space marker appended.
    /// Returns `None` when the output buffer or space markers are exhausted.
    pub fn init_as_root_with_previous_word(root_pos: u32, committing: &DicNode) -> Option<Self> {
        let mut node = committing.clone();
        if node.space_count as usize >= MAX_SPACE_COUNT {
            return None;
        }
        let space_at = node.output_len;
        node.push_output(' ')?;
        node.space_indices[node.space_count as usize] = space_at;
        node.space_count += 1;
        node.word_start = node.output_len;
        node.pos = root_pos;
        node.prev_word_pos = Some(committing.pos);
        node.is_terminal_word = false;
        node.has_children = true;
        node.is_cached = false;
        node.is_zero_cost_omission = false;
        Some(node)
    }

    /// Child node along a trie edge. Emits the edge's code point; input
    /// indices are not advanced (weighting does that). Returns `None` when
    /// the path would exceed the output buffer.
    pub fn init_as_child(&self, edge: &ChildEdge) -> Option<Self> {
        let mut node = self.clone();
        node.push_output(edge.code_point)?;
        node.pos = edge.position;
        node.is_terminal_word = edge.is_terminal;
        node.has_children = edge.has_children;
        node.is_cached = false;
        node.is_zero_cost_omission = false;
        Some(node)
    }

    fn push_output(&mut self, c: char) -> Option<()> {
        let len = self.output_len as usize;
        if len >= MAX_WORD_LENGTH {
            return None;
        }
        self.output[len] = c;
        self.output_len += 1;
        Some(())
    }

    pub fn output(&self) -> &[char] {
        &self.output[..self.output_len as usize]
    }

    pub fn out_text(&self) -> String {
        self.output().iter().collect()
    }

    pub fn last_code_point(&self) -> Option<char> {
        let len = self.output_len as usize;
        (len > 0).then(|| self.output[len - 1])
    }

    /// Total emitted code points, spaces included.
    pub fn depth(&self) -> usize {
        self.output_len as usize
    }

    /// Emitted code points of the word currently being spelled.
    pub fn current_word_len(&self) -> usize {
        (self.output_len - self.word_start) as usize
    }

    pub fn space_indices(&self) -> Vec<usize> {
        self.space_indices[..self.space_count as usize]
            .iter()
            .map(|&i| i as usize)
            .collect()
    }

    pub fn has_multiple_words(&self) -> bool {
        self.space_count > 0
    }

    pub fn word_count(&self) -> usize {
        self.space_count as usize + 1
    }

    pub fn input_index(&self, pointer: usize) -> u16 {
        self.input_indices[pointer]
    }

    pub fn forward_input_index(&mut self, pointer: usize, count: u16) {
        self.input_indices[pointer] += count;
    }

    pub fn total_input_index(&self) -> usize {
        self.input_indices.iter().map(|&i| i as usize).sum()
    }

    /// True once the path has consumed the whole input: further letters are
    /// word completion, not alignment.
    pub fn is_completion(&self, input_size: usize) -> bool {
        self.input_index(0) as usize >= input_size
    }

    pub fn is_total_input_size_exceeding_limit(&self, input_size: usize) -> bool {
        self.total_input_index() > input_size
    }

    /// True for a node that has not emitted anything into its current word.
    pub fn is_at_word_start(&self) -> bool {
        self.current_word_len() == 0
    }

    pub fn set_cached(&mut self) {
        self.is_cached = true;
    }

    pub fn clear_cached(&mut self) {
        self.is_cached = false;
    }
}
