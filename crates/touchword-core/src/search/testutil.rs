//! Shared fixtures for search tests: a small English lexicon and synthetic
//! QWERTY touch traces.

use crate::lexicon::{LexiconBuilder, TrieLexicon};
use crate::proximity::KeyboardLayout;

use super::session::TraverseSession;
use super::suggest::{Suggest, Suggestion, SuggestionKind};

pub(crate) fn test_lexicon() -> TrieLexicon {
    let mut b = LexiconBuilder::new();
    b.add_word("this", 180)
        .add_word("these", 160)
        .add_word("that", 190)
        .add_word("is", 220)
        .add_word("he", 200)
        .add_word("the", 240)
        .add_bigram("he", "is", 210);
    b.build()
}

/// Synthetic input: one tap per character, at the key center, 100ms apart.
pub(crate) fn tap_input(typed: &str) -> TapInput {
    let code_points: Vec<char> = typed.chars().collect();
    let n = code_points.len();
    TapInput {
        xs: vec![-1; n],
        ys: vec![-1; n],
        times: (0..n as i32).map(|i| i * 100).collect(),
        pointer_ids: vec![0; n],
        code_points,
    }
}

pub(crate) struct TapInput {
    pub xs: Vec<i32>,
    pub ys: Vec<i32>,
    pub times: Vec<i32>,
    pub pointer_ids: Vec<i32>,
    pub code_points: Vec<char>,
}

pub(crate) fn run_suggest(
    suggest: &Suggest,
    session: &mut TraverseSession,
    input: &TapInput,
    commit_point: usize,
) -> Vec<Suggestion> {
    suggest.get_suggestions(
        session,
        &input.xs,
        &input.ys,
        &input.times,
        &input.pointer_ids,
        &input.code_points,
        commit_point,
    )
}

/// One-shot search with a fresh session.
pub(crate) fn suggest_typed(lexicon: &TrieLexicon, typed: &str) -> Vec<Suggestion> {
    let layout = KeyboardLayout::qwerty();
    let mut session = TraverseSession::new(lexicon, &layout);
    let suggest = Suggest::typing();
    run_suggest(&suggest, &mut session, &tap_input(typed), 0)
}

/// Highest-scoring suggestion; ties go to the earlier entry.
pub(crate) fn best(suggestions: &[Suggestion]) -> &Suggestion {
    suggestions
        .iter()
        .reduce(|best, s| if s.score > best.score { s } else { best })
        .expect("no suggestions")
}

pub(crate) fn correction_texts(suggestions: &[Suggestion]) -> Vec<&str> {
    suggestions
        .iter()
        .filter(|s| {
            s.kind == SuggestionKind::Correction || s.kind == SuggestionKind::ObviousCorrection
        })
        .map(|s| s.text.as_str())
        .collect()
}
