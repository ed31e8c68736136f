use super::*;

fn small_lexicon() -> TrieLexicon {
    let mut b = LexiconBuilder::new();
    b.add_word("the", 240)
        .add_word("this", 180)
        .add_word("these", 160)
        .add_word("that", 190)
        .add_word("is", 220)
        .add_word("he", 200)
        .add_bigram("he", "is", 210)
        .add_shortcut("the", "The Hague", 120);
    b.build()
}

#[test]
fn children_of_root_are_sorted_and_unique() {
    let lex = small_lexicon();
    let mut children = Vec::new();
    lex.collect_children(lex.root_position(), &mut children);
    let cps: Vec<char> = children.iter().map(|e| e.code_point).collect();
    assert_eq!(cps, vec!['h', 'i', 't']);
    assert!(children.iter().all(|e| e.has_children));
    assert!(children.iter().all(|e| !e.is_terminal));
}

#[test]
fn terminal_probability_lookup() {
    let lex = small_lexicon();
    let pos = lex.position_of("this").expect("this is a word");
    assert_eq!(lex.word_probability(pos), 180);

    // Prefix that is not a word.
    assert_eq!(lex.position_of("thi"), None);
    // Interior node probability is 0.
    let mut children = Vec::new();
    lex.collect_children(lex.root_position(), &mut children);
    let t = children.iter().find(|e| e.code_point == 't').unwrap();
    assert_eq!(lex.word_probability(t.position), 0);
}

#[test]
fn shared_prefixes_branch_correctly() {
    let lex = small_lexicon();
    // "the", "this", "these", "that" share "th"; after it the trie branches
    // into 'e' (terminal, continues to "these") 'a', and 'i'.
    let the = lex.position_of("the").unwrap();
    let these = lex.position_of("these").unwrap();
    assert_ne!(the, these);
    let mut children = Vec::new();
    lex.collect_children(the, &mut children);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].code_point, 's');
}

#[test]
fn bigram_probability_found_and_missing() {
    let lex = small_lexicon();
    let he = lex.position_of("he").unwrap();
    let is = lex.position_of("is").unwrap();
    let the = lex.position_of("the").unwrap();
    assert_eq!(lex.bigram_probability(he, is), Some(210));
    assert_eq!(lex.bigram_probability(he, the), None);
    assert_eq!(lex.bigram_probability(the, is), None);
}

#[test]
fn attributes_flags_and_shortcuts() {
    let mut b = LexiconBuilder::new();
    b.add_word("damn", 120)
        .mark_blacklisted("damn")
        .add_word("tmrw", 90)
        .mark_not_a_word("tmrw")
        .add_shortcut("tmrw", "tomorrow", WHITELIST_SHORTCUT_PROBABILITY);
    let lex = b.build();

    let damn = lex.position_of("damn").unwrap();
    let attrs = lex.attributes_at(damn);
    assert!(attrs.blacklisted);
    assert!(!attrs.not_a_word);
    assert!(attrs.is_blacklisted_or_not_a_word());
    assert!(attrs.shortcuts.is_empty());

    let tmrw = lex.position_of("tmrw").unwrap();
    let attrs = lex.attributes_at(tmrw);
    assert!(attrs.not_a_word);
    assert_eq!(attrs.shortcuts.len(), 1);
    assert_eq!(attrs.shortcuts[0].text, "tomorrow");
    assert!(attrs.shortcuts[0].is_whitelist());
}

#[test]
fn bytes_round_trip() {
    let lex = small_lexicon();
    let bytes = lex.to_bytes().unwrap();
    let restored = TrieLexicon::from_bytes(&bytes).unwrap();

    assert_eq!(lex.stats(), restored.stats());
    for word in ["the", "this", "these", "that", "is", "he"] {
        let a = lex.position_of(word).unwrap();
        let b = restored.position_of(word).unwrap();
        assert_eq!(a, b, "offset moved for {word}");
        assert_eq!(lex.word_probability(a), restored.word_probability(b));
    }
    let he = restored.position_of("he").unwrap();
    let is = restored.position_of("is").unwrap();
    assert_eq!(restored.bigram_probability(he, is), Some(210));
}

#[test]
fn file_round_trip_via_mmap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.twlx");

    let lex = small_lexicon();
    lex.save(&path).unwrap();
    let mapped = TrieLexicon::load(&path).unwrap();

    assert_eq!(lex.stats(), mapped.stats());
    assert_eq!(
        mapped.word_probability(mapped.position_of("the").unwrap()),
        240
    );
    // An mmap-backed lexicon cannot be re-serialized.
    assert!(matches!(
        mapped.to_bytes(),
        Err(LexiconError::Parse(_))
    ));
}

#[test]
fn rejects_bad_magic_and_version() {
    let lex = small_lexicon();
    let mut bytes = lex.to_bytes().unwrap();

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        TrieLexicon::from_bytes(&bad_magic),
        Err(LexiconError::InvalidMagic)
    ));

    bytes[4] = 99;
    assert!(matches!(
        TrieLexicon::from_bytes(&bytes),
        Err(LexiconError::UnsupportedVersion(99))
    ));

    assert!(matches!(
        TrieLexicon::from_bytes(&[]),
        Err(LexiconError::InvalidHeader)
    ));
}

#[test]
fn corrupt_child_offset_yields_no_children() {
    let lex = small_lexicon();
    let mut bytes = lex.to_bytes().unwrap();

    // Point the root's children offset past the end of the node region.
    let header = 16;
    bytes[header + 8..header + 12].copy_from_slice(&u32::MAX.to_ne_bytes());
    let corrupt = TrieLexicon::from_bytes(&bytes).unwrap();

    let mut children = Vec::new();
    corrupt.collect_children(corrupt.root_position(), &mut children);
    assert!(children.is_empty());
}

#[test]
fn out_of_range_position_degrades() {
    let lex = small_lexicon();
    let mut children = Vec::new();
    lex.collect_children(u32::MAX - 64, &mut children);
    assert!(children.is_empty());
    assert_eq!(lex.word_probability(u32::MAX - 64), 0);
    assert_eq!(lex.attributes_at(u32::MAX - 64), WordAttributes::default());
}
