//! Resuming a search when the new input extends the previous one.

use crate::proximity::KeyboardLayout;
use crate::search::testutil::{best, correction_texts, run_suggest, tap_input, test_lexicon};
use crate::search::{Suggest, TraverseSession};

#[test]
fn continuation_matches_fresh_search_top_suggestion() {
    let lexicon = test_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    // Same session: "thi" then "this" resumes the first search.
    let mut session = TraverseSession::new(&lexicon, &layout);
    let first = run_suggest(&suggest, &mut session, &tap_input("thi"), 0);
    assert!(!first.is_empty());
    let continued = run_suggest(&suggest, &mut session, &tap_input("this"), 0);

    // Fresh session over the full input.
    let mut fresh_session = TraverseSession::new(&lexicon, &layout);
    let fresh = run_suggest(&suggest, &mut fresh_session, &tap_input("this"), 0);

    assert_eq!(best(&continued).text, best(&fresh).text);

    // Continuation may prune, but never invents: every continued correction
    // exists in the fresh result set.
    let fresh_texts = correction_texts(&fresh);
    for text in correction_texts(&continued) {
        assert!(fresh_texts.contains(&text), "{text} not in fresh results");
    }
}

#[test]
fn unrelated_input_restarts_from_scratch() {
    let lexicon = test_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    let mut session = TraverseSession::new(&lexicon, &layout);
    let _ = run_suggest(&suggest, &mut session, &tap_input("this"), 0);
    let results = run_suggest(&suggest, &mut session, &tap_input("heis"), 0);
    assert!(correction_texts(&results).contains(&"he is"));
}

#[test]
fn shrinking_input_restarts_from_scratch() {
    let lexicon = test_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    let mut session = TraverseSession::new(&lexicon, &layout);
    let _ = run_suggest(&suggest, &mut session, &tap_input("these"), 0);
    // Backspace down to "th": shorter than the previous input.
    let results = run_suggest(&suggest, &mut session, &tap_input("th"), 0);
    let texts = correction_texts(&results);
    assert!(texts.contains(&"this"));
    assert!(texts.contains(&"the"));
}

#[test]
fn commit_point_commits_first_word_and_resumes() {
    let lexicon = test_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    let mut session = TraverseSession::new(&lexicon, &layout);
    let first = run_suggest(&suggest, &mut session, &tap_input("hevis"), 0);
    assert_eq!(best(&first).text, "he is");

    // The host commits the first word while the user keeps typing "is".
    let committed = run_suggest(&suggest, &mut session, &tap_input("hevisis"), 1);
    let texts = correction_texts(&committed);
    assert!(texts.contains(&"he is is"), "got {texts:?}");
    let top = best(&committed);
    assert_eq!(top.text, "he is is");
    assert_eq!(top.space_indices, vec![2, 5]);
}

#[test]
fn repeated_identical_input_is_stable() {
    let lexicon = test_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    let mut session = TraverseSession::new(&lexicon, &layout);
    let first = run_suggest(&suggest, &mut session, &tap_input("this"), 0);
    let second = run_suggest(&suggest, &mut session, &tap_input("this"), 0);
    assert_eq!(best(&first).text, best(&second).text);
}
