//! Shared plumbing for the `twtool` binary: TSV word-list compilation and
//! synthetic-tap suggestion runs.

use anyhow::{bail, Context};

use touchword_core::search::Suggestion;
use touchword_core::{KeyboardLayout, LexiconBuilder, Suggest, TraverseSession, TrieLexicon};

/// Compile a TSV word list.
///
/// Plain lines are `word<TAB>probability`. Directive lines:
/// - `bigram<TAB>prev<TAB>word<TAB>probability`
/// - `shortcut<TAB>word<TAB>target<TAB>probability`
/// - `blacklist<TAB>word`
/// - `notaword<TAB>word`
///
/// `#` starts a comment.
pub fn compile_wordlist(text: &str) -> anyhow::Result<TrieLexicon> {
    let mut builder = LexiconBuilder::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let context = || format!("line {}", line_no + 1);
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.as_slice() {
            ["bigram", prev, word, prob] => {
                let prob: u8 = prob.parse().with_context(context)?;
                builder.add_bigram(prev, word, prob);
            }
            ["shortcut", word, target, prob] => {
                let prob: u8 = prob.parse().with_context(context)?;
                builder.add_shortcut(word, target, prob);
            }
            ["blacklist", word] => {
                builder.mark_blacklisted(word);
            }
            ["notaword", word] => {
                builder.mark_not_a_word(word);
            }
            [word, prob] => {
                let prob: u8 = prob.parse().with_context(context)?;
                builder.add_word(word, prob);
            }
            _ => bail!("malformed line {}: {line:?}", line_no + 1),
        }
    }
    Ok(builder.build())
}

/// Run one suggestion pass with touches synthesized at QWERTY key centers.
pub fn run_suggest(
    lexicon: &TrieLexicon,
    typed: &str,
    prev_word_pos: Option<u32>,
) -> Vec<Suggestion> {
    let layout = KeyboardLayout::qwerty();
    let mut session = TraverseSession::new(lexicon, &layout);
    session.set_prev_word_pos(prev_word_pos);
    let suggest = Suggest::typing();

    let code_points: Vec<char> = typed.chars().collect();
    let n = code_points.len();
    let xs = vec![-1; n];
    let ys = vec![-1; n];
    let times: Vec<i32> = (0..n as i32).map(|i| i * 100).collect();
    let pointer_ids = vec![0; n];
    suggest.get_suggestions(&mut session, &xs, &ys, &times, &pointer_ids, &code_points, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDLIST: &str = "\
# test lexicon
the\t240
this\t180
is\t220
he\t200
bigram\the\tis\t210
shortcut\tthe\tThe Hague\t120
blacklist\tthe
";

    #[test]
    fn compile_and_suggest() {
        let lexicon = compile_wordlist(WORDLIST).unwrap();
        let (words, _) = lexicon.stats();
        assert_eq!(words, 4);

        let results = run_suggest(&lexicon, "this", None);
        assert!(results.iter().any(|s| s.text == "this"));
    }

    #[test]
    fn compile_round_trips_through_file() {
        let lexicon = compile_wordlist(WORDLIST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.twlx");
        lexicon.save(&path).unwrap();

        let loaded = TrieLexicon::load(&path).unwrap();
        assert_eq!(lexicon.stats(), loaded.stats());
        let results = run_suggest(&loaded, "heis", None);
        assert!(results.iter().any(|s| s.text == "he is"));
    }

    #[test]
    fn malformed_line_is_rejected() {
        let err = compile_wordlist("the\tnot-a-number").unwrap_err();
        assert!(err.to_string().contains("line 1"));

        let err = compile_wordlist("justoneword").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
