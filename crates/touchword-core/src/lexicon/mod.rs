//! Lexicon trie storage and read-only access.
//!
//! `TrieLexicon` stores the word trie in a flat byte region addressed by
//! node offsets, loadable from an owned buffer or a memory-mapped file.
//! The search engine consumes it exclusively through the `Lexicon` trait.

mod trie;
mod trie_io;

#[cfg(test)]
mod tests;

pub use trie::{LexiconBuilder, TrieLexicon};

use std::io;

/// Shortcut probability value that marks a whitelist entry.
pub const WHITELIST_SHORTCUT_PROBABILITY: u8 = 255;

/// Unified error type for lexicon binary I/O.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected TWLX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("parse error: {0}")]
    Parse(String),
}

/// One outgoing trie edge: the child node plus the flags needed to decide
/// how to expand it without a second lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEdge {
    pub code_point: char,
    pub position: u32,
    pub is_terminal: bool,
    pub has_children: bool,
    pub probability: u8,
}

/// A shortcut target attached to a terminal word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutTarget {
    pub text: String,
    pub probability: u8,
}

impl ShortcutTarget {
    pub fn is_whitelist(&self) -> bool {
        self.probability == WHITELIST_SHORTCUT_PROBABILITY
    }
}

/// Attribute data for a terminal word node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordAttributes {
    pub blacklisted: bool,
    pub not_a_word: bool,
    pub shortcuts: Vec<ShortcutTarget>,
}

impl WordAttributes {
    pub fn is_blacklisted_or_not_a_word(&self) -> bool {
        self.blacklisted || self.not_a_word
    }
}

/// Read-only view of the lexicon trie. No mutation happens across a search.
pub trait Lexicon {
    /// Position of the root node (never a word itself).
    fn root_position(&self) -> u32;

    /// Append all children of the node at `pos` to `out`.
    ///
    /// Corrupt offsets yield no children; the search degrades instead of
    /// failing.
    fn collect_children(&self, pos: u32, out: &mut Vec<ChildEdge>);

    /// Unigram probability of the word ending at `pos`; 0 for non-terminals.
    fn word_probability(&self, pos: u32) -> u8;

    /// Bigram probability of the word at `word_pos` following the word at
    /// `prev_word_pos`, if the pair is recorded.
    fn bigram_probability(&self, prev_word_pos: u32, word_pos: u32) -> Option<u8>;

    /// Blacklist / not-a-word flags and shortcut list for the word at `pos`.
    fn attributes_at(&self, pos: u32) -> WordAttributes;
}
