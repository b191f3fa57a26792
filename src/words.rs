use log::warn;

use crate::letter_index;

/// Reads one word per line, lowercased. Blank and `#` lines are skipped; words of the
/// wrong length or with anything but letters are dropped. Duplicates are kept.
pub fn parse_word_list(text: &str, word_len: usize) -> Vec<String> {
    let mut res = Vec::new();
    let mut dropped = 0;
    for raw in text.lines().map(str::trim).filter(|s| !s.is_empty() && !s.starts_with('#')) {
        let word = raw.to_lowercase();
        match word.chars().count() == word_len && word.chars().all(|ch| letter_index(ch).is_some()) {
            true => res.push(word),
            false => dropped += 1,
        }
    }
    if dropped != 0 { warn!("dropped {} words that are not {} letters a-z", dropped, word_len); }
    res
}

#[test]
fn test_parse_word_list() {
    let text = "Crane\n  slate \n\n# comment\ncrane\nfoo\nab-cd\ncafés\nnaïve\n";
    assert_eq!(parse_word_list(text, 5), ["crane", "slate", "crane"]);
    assert_eq!(parse_word_list(text, 3), ["foo"]);
    assert!(parse_word_list("", 5).is_empty());
}
