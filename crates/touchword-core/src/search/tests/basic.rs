//! End-to-end suggestion scenarios on the QWERTY layout.

use crate::lexicon::{LexiconBuilder, WHITELIST_SHORTCUT_PROBABILITY};
use crate::proximity::KeyboardLayout;
use crate::search::testutil::{best, correction_texts, suggest_typed, test_lexicon};
use crate::search::{Suggest, SuggestionKind, TraverseSession};

#[test]
fn empty_input_returns_nothing() {
    let lexicon = test_lexicon();
    let results = suggest_typed(&lexicon, "");
    assert!(results.is_empty());
}

#[test]
fn exact_match_is_top_suggestion() {
    let lexicon = test_lexicon();
    let results = suggest_typed(&lexicon, "this");
    assert!(!results.is_empty());

    let top = best(&results);
    assert_eq!(top.text, "this");
    assert_eq!(top.kind, SuggestionKind::Correction);
    assert_eq!(top.edit_correction_count, 0);
    assert_eq!(top.proximity_correction_count, 0);
}

#[test]
fn prefix_input_completes_words() {
    let lexicon = test_lexicon();
    let results = suggest_typed(&lexicon, "th");
    let texts = correction_texts(&results);
    assert!(texts.contains(&"the"), "completions missing: {texts:?}");
    assert!(texts.contains(&"this"));
    assert!(texts.contains(&"that"));
    assert!(texts.contains(&"these"));
}

#[test]
fn neighbor_key_tap_recovers_word() {
    // 'u' is next to 'i': "thus"-shaped touches still suggest "this".
    let lexicon = test_lexicon();
    let results = suggest_typed(&lexicon, "thus");
    let top = best(&results);
    assert_eq!(top.text, "this");
    assert!(top.proximity_correction_count >= 1);
    assert_eq!(top.edit_correction_count, 0);
}

#[test]
fn zero_probability_words_are_not_suggested() {
    let mut b = LexiconBuilder::new();
    b.add_word("this", 0).add_word("these", 160);
    let lexicon = b.build();
    let results = suggest_typed(&lexicon, "this");
    let texts = correction_texts(&results);
    assert!(!texts.contains(&"this"), "zero-probability word emitted");
}

#[test]
fn blacklisted_word_is_skipped_but_shortcuts_survive() {
    let mut b = LexiconBuilder::new();
    b.add_word("tmrw", 120)
        .mark_not_a_word("tmrw")
        .add_shortcut("tmrw", "tomorrow", WHITELIST_SHORTCUT_PROBABILITY);
    let lexicon = b.build();

    let results = suggest_typed(&lexicon, "tmrw");
    assert!(results
        .iter()
        .all(|s| s.text != "tmrw" || s.kind != SuggestionKind::Correction));
    let shortcut = results
        .iter()
        .find(|s| s.text == "tomorrow")
        .expect("shortcut not emitted");
    // Whitelisted shortcut for exactly the typed string.
    assert_eq!(shortcut.kind, SuggestionKind::Whitelist);
}

#[test]
fn unrelated_input_yields_no_corrections() {
    let lexicon = test_lexicon();
    // Nothing in the lexicon starts anywhere near this.
    let results = suggest_typed(&lexicon, "zzzzzzzzzz");
    assert!(correction_texts(&results).is_empty());
}

#[test]
fn suggestions_are_capped() {
    let mut b = LexiconBuilder::new();
    // Many words sharing the typed prefix produce many completions.
    for (i, suffix) in [
        "", "e", "es", "ese", "eses", "a", "at", "ats", "i", "is", "ist", "ista", "o", "os",
        "ose", "u", "us", "use", "osa", "ina", "ino", "ana",
    ]
    .iter()
    .enumerate()
    {
        b.add_word(&format!("th{suffix}"), 100 + i as u8);
    }
    let lexicon = b.build();
    let results = suggest_typed(&lexicon, "th");
    assert!(results.len() <= crate::search::MAX_RESULTS);
}

#[test]
fn previous_word_context_feeds_bigram_scoring() {
    let lexicon = test_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    let he = lexicon.position_of("he").unwrap();
    let mut session = TraverseSession::new(&lexicon, &layout);
    session.set_prev_word_pos(Some(he));
    let input = crate::search::testutil::tap_input("is");
    let results = crate::search::testutil::run_suggest(&suggest, &mut session, &input, 0);
    assert_eq!(best(&results).text, "is");
}
