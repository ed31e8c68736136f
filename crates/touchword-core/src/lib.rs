#[cfg(not(target_endian = "little"))]
compile_error!("touchword-core requires a little-endian platform");

pub mod lexicon;
pub mod proximity;
pub mod search;
pub mod settings;

pub use lexicon::{Lexicon, LexiconBuilder, LexiconError, TrieLexicon};
pub use proximity::{DoubleLetterLevel, KeyboardLayout, ProximityState, ProximityType};
pub use search::{Suggest, Suggestion, SuggestionKind, TraverseSession};
