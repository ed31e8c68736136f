//! Best-first search over the lexicon trie driven by touch proximity.
//!
//! The driver (`Suggest`) pops candidate paths from a bounded frontier,
//! applies the correction operators (match, omission, insertion,
//! transposition, space substitution/omission), and collects terminal words
//! which the scoring policy ranks into the final suggestion list.

pub mod cache;
pub mod dic_node;
pub mod scoring;
pub mod session;
pub mod suggest;
pub mod traversal;
pub mod weighting;

#[cfg(test)]
pub(crate) mod testutil;

#[cfg(test)]
mod tests;

pub use dic_node::{DicNode, ScoringState};
pub use scoring::{Scoring, TypingScoring};
pub use session::TraverseSession;
pub use suggest::{Suggest, Suggestion, SuggestionKind};
pub use traversal::{Traversal, TypingTraversal};
pub use weighting::{CorrectionKind, TypingWeighting, Weighting};

/// Maximum number of emitted suggestions.
pub const MAX_RESULTS: usize = 18;
/// Maximum emitted code points per path, spaces included.
pub const MAX_WORD_LENGTH: usize = 48;
/// Input-index slots reserved per node. Typing uses pointer 0 only.
pub const MAX_POINTER_COUNT: usize = 2;
/// Maximum space markers per multi-word path.
pub const MAX_SPACE_COUNT: usize = 4;

/// Per-depth capacity of the continuation cache.
pub const LOOKAHEAD_DIC_NODES_CACHE_SIZE: usize = 25;
/// Inputs at least this long force autocorrect for multi-word paths.
pub const MIN_LEN_FOR_MULTI_WORD_AUTOCORRECT: usize = 16;
/// Inputs must be longer than this to resume a previous search.
pub const MIN_CONTINUOUS_SUGGESTION_INPUT_SIZE: usize = 2;

pub const AUTOCORRECT_CLASSIFICATION_THRESHOLD: f32 = 0.33;
pub const AUTOCORRECT_LANGUAGE_FEATURE_THRESHOLD: f32 = 0.6;

// Error-correction master toggles.
pub const CORRECT_SPACE_OMISSION: bool = true;
pub const CORRECT_TRANSPOSITION: bool = true;
pub const CORRECT_INSERTION: bool = true;
pub const CORRECT_OMISSION: bool = true;
