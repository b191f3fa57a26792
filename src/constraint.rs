use std::collections::BTreeSet;
use std::{fmt, iter};

use itertools::Itertools;

use crate::bit_set::{LetterSet, ALPHABET_LEN, letter_index, index_letter};
use crate::{ClueError, WORD_LEN};

/// Feedback shown for one letter of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hint { #[default] Absent, Present, Correct }
impl Hint {
    pub fn from_code(code: char) -> Result<Self, ClueError> {
        match code {
            '_' => Ok(Hint::Absent),
            '-' => Ok(Hint::Present),
            '+' => Ok(Hint::Correct),
            _ => Err(ClueError::InvalidCode(code)),
        }
    }
    pub fn code(self) -> char {
        match self {
            Hint::Absent => '_',
            Hint::Present => '-',
            Hint::Correct => '+',
        }
    }
    /// The hint a front-end shows after one more click on a tile.
    pub fn next(self) -> Self {
        match self {
            Hint::Absent => Hint::Present,
            Hint::Present => Hint::Correct,
            Hint::Correct => Hint::Absent,
        }
    }
}

/// Everything the ranker and the session need from a set of rules about the answer.
///
/// [`Constraint`] is the real implementation. Values are never mutated once built;
/// `combine` produces a new value.
pub trait Rules: Clone + Send + Sync {
    /// The rules that every word of `word_len` letters satisfies.
    fn identity(word_len: usize) -> Self;
    /// The rules implied by one guess and the hints it received.
    fn from_clues(word: &str, hints: &[Hint]) -> Result<Self, ClueError>;
    /// The rules a player would learn by guessing `guess` when the answer is `answer`.
    fn from_diff(answer: &str, guess: &str) -> Result<Self, ClueError>;
    /// Conjunction of both rule sets.
    fn combine(&self, other: &Self) -> Self;
    fn matches(&self, word: &str) -> bool;
    /// How narrow the rules are; larger is more specific.
    fn specificity(&self) -> f64;
    /// `from_diff(answer, guess)?.specificity()`, for implementations with a cheaper way to get there.
    fn diff_specificity(answer: &str, guess: &str) -> Result<f64, ClueError> {
        Ok(Self::from_diff(answer, guess)?.specificity())
    }
}

/// Computes the hints a game shows for `guess` when the answer is `answer`.
///
/// Exact matches are resolved first. Every other guess letter then claims the leftmost
/// unclaimed instance of the same letter in the answer, scanning guess positions left to
/// right, so a letter is never reported more often than the answer contains it.
pub fn feedback(answer: &str, guess: &str) -> Result<Vec<Hint>, ClueError> {
    let answer: Vec<char> = answer.chars().collect();
    let guess: Vec<char> = guess.chars().collect();
    if answer.len() != guess.len() {
        return Err(ClueError::WrongLength { expected: answer.len(), found: guess.len() });
    }

    let mut hints = vec![Hint::Absent; guess.len()];
    let mut consumed = vec![false; answer.len()];
    for (i, (a, g)) in iter::zip(&answer, &guess).enumerate() {
        if a == g {
            hints[i] = Hint::Correct;
            consumed[i] = true;
        }
    }
    for (i, g) in guess.iter().enumerate() {
        if hints[i] == Hint::Correct { continue }
        if let Some(j) = (0..answer.len()).find(|&j| !consumed[j] && answer[j] == *g) {
            consumed[j] = true;
            hints[i] = Hint::Present;
        }
    }
    Ok(hints)
}

/// Splits a clue line such as `+s_a-s_s_y` into the guessed word and its hints.
pub fn parse_clue_line(line: &str, word_len: usize) -> Result<(String, Vec<Hint>), ClueError> {
    let chars: Vec<char> = line.trim().chars().collect();
    if chars.len() != 2 * word_len {
        return Err(ClueError::WrongLength { expected: 2 * word_len, found: chars.len() });
    }

    let mut word = String::with_capacity(word_len);
    let mut hints = Vec::with_capacity(word_len);
    for pair in chars.chunks(2) {
        hints.push(Hint::from_code(pair[0])?);
        let letter = pair[1].to_ascii_lowercase();
        if letter_index(letter).is_none() { return Err(ClueError::InvalidLetter(pair[1])) }
        word.push(letter);
    }
    Ok((word, hints))
}

/// Conjoins every clue line in `text`. Blank lines and lines starting with `#` are skipped.
/// Nothing is returned unless every line parses.
pub fn parse_clue_lines<R: Rules>(text: &str, word_len: usize) -> Result<R, ClueError> {
    let mut res = R::identity(word_len);
    for line in text.lines().map(str::trim).filter(|s| !s.is_empty() && !s.starts_with('#')) {
        let (word, hints) = parse_clue_line(line, word_len)?;
        res = res.combine(&R::from_clues(&word, &hints)?);
    }
    Ok(res)
}

/// Per-letter count and per-position placement rules for the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    slots: Vec<LetterSet>,
    min_counts: [usize; ALPHABET_LEN],
    excluded: BTreeSet<String>,
}
impl Constraint {
    pub fn new(word_len: usize) -> Self {
        Constraint {
            slots: vec![LetterSet::full(); word_len],
            min_counts: [0; ALPHABET_LEN],
            excluded: BTreeSet::new(),
        }
    }
    /// Builds the constraint for a single clue line, e.g. `+s_a-s_s_y`.
    pub fn parse(line: &str, word_len: usize) -> Result<Self, ClueError> {
        let (word, hints) = parse_clue_line(line, word_len)?;
        Self::from_clues(&word, &hints)
    }
    pub fn word_len(&self) -> usize {
        self.slots.len()
    }
    /// Letters still allowed at `pos`.
    pub fn allowed(&self, pos: usize) -> LetterSet {
        self.slots[pos]
    }
    pub fn min_count(&self, letter: char) -> usize {
        letter_index(letter).map_or(0, |i| self.min_counts[i])
    }
    /// Letters with a known minimum, in alphabetical order.
    pub fn min_counts(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.min_counts.iter().enumerate().filter(|&(_, &n)| n > 0).map(|(i, &n)| (index_letter(i), n))
    }
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }
    /// True if some position has no letter left, i.e. the clues contradict each other.
    pub fn is_contradictory(&self) -> bool {
        self.slots.iter().any(LetterSet::is_empty)
    }
}
impl Default for Constraint {
    fn default() -> Self {
        Self::new(WORD_LEN)
    }
}
impl Rules for Constraint {
    fn identity(word_len: usize) -> Self {
        Self::new(word_len)
    }
    fn from_clues(word: &str, hints: &[Hint]) -> Result<Self, ClueError> {
        let letters = word.chars().map(|ch| letter_index(ch).ok_or(ClueError::InvalidLetter(ch))).collect::<Result<Vec<_>, _>>()?;
        if letters.len() != hints.len() {
            return Err(ClueError::MismatchedHints { letters: letters.len(), hints: hints.len() });
        }

        let mut res = Self::new(letters.len());
        res.excluded.insert(word.to_owned());
        let clues = || iter::zip(&letters, hints).map(|(&l, &h)| (l, h)).enumerate();

        // the passes must run in this order: a letter marked absent in one slot and
        // present/correct in another is only excluded from the slot where it was absent
        for (_, (letter, _)) in clues().filter(|(_, (_, h))| *h == Hint::Absent) {
            for slot in res.slots.iter_mut() { slot.remove(letter); }
        }
        for (pos, (letter, _)) in clues().filter(|(_, (_, h))| *h == Hint::Present) {
            for slot in res.slots.iter_mut() { slot.insert(letter); }
            res.slots[pos].remove(letter);
            res.min_counts[letter] += 1;
        }
        for (pos, (letter, _)) in clues().filter(|(_, (_, h))| *h == Hint::Absent) {
            res.slots[pos].remove(letter);
        }
        for (pos, (letter, _)) in clues().filter(|(_, (_, h))| *h == Hint::Correct) {
            res.slots[pos].clear();
            res.slots[pos].insert(letter);
            res.min_counts[letter] += 1;
        }
        Ok(res)
    }
    fn from_diff(answer: &str, guess: &str) -> Result<Self, ClueError> {
        Self::from_clues(guess, &feedback(answer, guess)?)
    }
    fn combine(&self, other: &Self) -> Self {
        debug_assert_eq!(self.slots.len(), other.slots.len());

        let mut min_counts = self.min_counts;
        for (mine, &theirs) in iter::zip(&mut min_counts, &other.min_counts) {
            *mine = (*mine).max(theirs);
        }
        Constraint {
            slots: iter::zip(&self.slots, &other.slots).map(|(a, b)| a.intersection(b)).collect(),
            min_counts,
            excluded: self.excluded.union(&other.excluded).cloned().collect(),
        }
    }
    fn matches(&self, word: &str) -> bool {
        if self.excluded.contains(word) { return false }

        let mut occurrences = [0; ALPHABET_LEN];
        let mut len = 0;
        for (i, ch) in word.chars().enumerate() {
            let letter = match letter_index(ch) {
                Some(x) => x,
                None => return false,
            };
            match self.slots.get(i) {
                Some(slot) if slot.contains(letter) => (),
                _ => return false,
            }
            occurrences[letter] += 1;
            len += 1;
        }
        len == self.slots.len() && iter::zip(&self.min_counts, occurrences).all(|(&min, occ)| occ >= min)
    }
    fn specificity(&self) -> f64 {
        self.slots.iter().map(|slot| 1.0 / slot.len() as f64).sum()
    }
    /// Same two-pass feedback as [`feedback`], kept in bitmasks so the ranking loop never allocates.
    fn diff_specificity(answer: &str, guess: &str) -> Result<f64, ClueError> {
        let (a, g) = (answer.as_bytes(), guess.as_bytes());
        if a.len() != g.len() || a.len() > 64 || !a.iter().chain(g).all(u8::is_ascii_lowercase) {
            return Ok(Self::from_diff(answer, guess)?.specificity());
        }
        let letter = |b: u8| (b - b'a') as usize;

        let mut correct = 0u64;
        for i in (0..g.len()).filter(|&i| a[i] == g[i]) { correct |= 1 << i; }
        let mut consumed = correct;
        let (mut present, mut absent) = (LetterSet::new(), LetterSet::new());
        for i in (0..g.len()).filter(|&i| correct & 1 << i == 0) {
            match (0..a.len()).find(|&j| consumed & 1 << j == 0 && a[j] == g[i]) {
                Some(j) => { consumed |= 1 << j; present.insert(letter(g[i])); }
                None => absent.insert(letter(g[i])),
            }
        }

        // letters never seen as present are gone everywhere; a wrong slot also loses its own letter
        let open = LetterSet::full().difference(&absent.difference(&present));
        Ok((0..g.len()).map(|i| match correct & 1 << i {
            0 => {
                let mut slot = open;
                slot.remove(letter(g[i]));
                1.0 / slot.len() as f64
            }
            _ => 1.0,
        }).sum())
    }
}
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            writeln!(f, "{}: {}", i, slot)?;
        }
        writeln!(f, "at least: {{{}}}", self.min_counts().map(|(ch, n)| format!("{}: {}", ch, n)).join(", "))?;
        writeln!(f, "words used: [{}]", self.excluded.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alphabet() -> LetterSet {
        LetterSet::full()
    }
    fn counts(c: &Constraint) -> Vec<(char, usize)> {
        c.min_counts().collect()
    }
    fn slots(c: &Constraint) -> Vec<LetterSet> {
        (0..c.word_len()).map(|i| c.allowed(i)).collect()
    }
    fn hints(codes: &str) -> Vec<Hint> {
        codes.chars().map(|c| Hint::from_code(c).unwrap()).collect()
    }

    #[test]
    fn test_hint_codes() {
        for h in [Hint::Absent, Hint::Present, Hint::Correct] {
            assert_eq!(Hint::from_code(h.code()), Ok(h));
        }
        assert_eq!(Hint::from_code('*'), Err(ClueError::InvalidCode('*')));
        assert_eq!(Hint::Absent.next(), Hint::Present);
        assert_eq!(Hint::Present.next(), Hint::Correct);
        assert_eq!(Hint::Correct.next(), Hint::Absent);
    }

    #[test]
    fn test_parse_mixed_codes() {
        let s = LetterSet::from_letters("s");
        let cases = [
            ("+s_a-s_s_y", [s, alphabet().without("ay"), alphabet().without("asy"), alphabet().without("asy"), alphabet().without("ay")]),
            ("+s_a_s-s_y", [s, alphabet().without("ay"), alphabet().without("asy"), alphabet().without("asy"), alphabet().without("ay")]),
            ("-s_a+s_s_y", [alphabet().without("asy"), alphabet().without("ay"), s, alphabet().without("asy"), alphabet().without("ay")]),
            ("-s_a_s+s_y", [alphabet().without("asy"), alphabet().without("ay"), alphabet().without("asy"), s, alphabet().without("ay")]),
            ("_s_a+s-s_y", [alphabet().without("asy"), alphabet().without("ay"), s, alphabet().without("asy"), alphabet().without("ay")]),
            ("_s_a-s+s_y", [alphabet().without("asy"), alphabet().without("ay"), alphabet().without("asy"), s, alphabet().without("ay")]),
        ];
        for (line, allowed) in cases {
            let c = Constraint::parse(line, WORD_LEN).unwrap();
            assert_eq!(counts(&c), vec![('s', 2)], "{}", line);
            assert_eq!(slots(&c), allowed, "{}", line);
            assert!(c.excluded().contains("sassy"));
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Constraint::parse("+s_a-s_s", WORD_LEN), Err(ClueError::WrongLength { expected: 10, found: 8 }));
        assert_eq!(Constraint::parse("+s_a*s_s_y", WORD_LEN), Err(ClueError::InvalidCode('*')));
        assert_eq!(Constraint::parse("+s_a-s_3_y", WORD_LEN), Err(ClueError::InvalidLetter('3')));
        assert_eq!(Constraint::parse("+S_A-s_s_y", WORD_LEN).unwrap(), Constraint::parse("+s_a-s_s_y", WORD_LEN).unwrap());
        assert_eq!(Constraint::from_clues("sass", &hints("_____")), Err(ClueError::MismatchedHints { letters: 4, hints: 5 }));
    }

    #[test]
    fn test_parse_lines() {
        let text = "# first guess\n_p_l_u_m_b\n\n+s_a-s_s_y\n";
        let c: Constraint = parse_clue_lines(text, WORD_LEN).unwrap();
        let expected = Constraint::parse("_p_l_u_m_b", WORD_LEN).unwrap().combine(&Constraint::parse("+s_a-s_s_y", WORD_LEN).unwrap());
        assert_eq!(c, expected);
        assert_eq!(counts(&c), vec![('s', 2)]);
        assert!(!c.allowed(3).contains_letter('u') && c.allowed(3).contains_letter('t'));
        assert_eq!(c.excluded().iter().collect::<Vec<_>>(), ["plumb", "sassy"]);

        assert!(parse_clue_lines::<Constraint>("_p_l_u_m_b\n+s_a?s_s_y", WORD_LEN).is_err());
        assert_eq!(parse_clue_lines::<Constraint>("# nothing\n", WORD_LEN).unwrap(), Constraint::default());
    }

    #[test]
    fn test_feedback_duplicates() {
        assert_eq!(feedback("abbey", "babes").unwrap(), hints("--++_"));
        assert_eq!(feedback("crane", "eerie").unwrap(), hints("__-_+"));
        assert_eq!(feedback("shire", "cross").unwrap(), hints("_-_-_"));
        assert_eq!(feedback("speed", "eerie").unwrap(), hints("--___"));
        assert_eq!(feedback("adage", "adiue").unwrap(), hints("++__+"));
        assert_eq!(feedback("crane", "crane").unwrap(), hints("+++++"));
        assert_eq!(feedback("crane", "cran"), Err(ClueError::WrongLength { expected: 5, found: 4 }));
    }

    #[test]
    fn test_diff_constraints() {
        let c = Constraint::from_diff("shire", "cross").unwrap();
        assert_eq!(counts(&c), vec![('r', 1), ('s', 1)]);
        assert_eq!(slots(&c), [alphabet().without("oc"), alphabet().without("ocr"), alphabet().without("oc"), alphabet().without("ocs"), alphabet().without("ocs")]);

        let c = Constraint::from_diff("adage", "adiue").unwrap();
        assert_eq!(counts(&c), vec![('a', 1), ('d', 1), ('e', 1)]);
        let (a, d, e) = (LetterSet::from_letters("a"), LetterSet::from_letters("d"), LetterSet::from_letters("e"));
        assert_eq!(slots(&c), [a, d, alphabet().without("iu"), alphabet().without("iu"), e]);
    }

    #[test]
    fn test_matches() {
        let c = Constraint::parse("+s_a-s_s_y", WORD_LEN).unwrap();
        assert!(c.matches("shots"));
        assert!(!c.matches("sassy"));  // already guessed
        assert!(!c.matches("shout"));  // only one s
        assert!(!c.matches("sushi"));  // s at position 2
        assert!(!c.matches("hosts"));  // wrong first letter
        assert!(!c.matches("shot"));
        assert!(!c.matches("shotss"));
        assert!(!c.matches("sh0ts"));
        assert!(Constraint::default().matches("zzzzz"));
    }

    #[test]
    fn test_specificity() {
        let unconstrained = Constraint::default().specificity();
        assert!((unconstrained - 5.0 / 26.0).abs() < 1e-12);
        let pinned = Constraint::from_diff("crane", "crane").unwrap().specificity();
        assert!((pinned - 5.0).abs() < 1e-12);
        let c = Constraint::from_diff("adage", "adiue").unwrap();
        assert!((c.specificity() - (3.0 + 2.0 / 24.0)).abs() < 1e-12);
    }

    #[test]
    fn test_diff_specificity() {
        for (answer, guess) in [("adage", "adiue"), ("shire", "cross"), ("abbey", "babes"), ("crane", "eerie"), ("speed", "eerie"), ("crane", "crane")] {
            let built = Constraint::from_diff(answer, guess).unwrap().specificity();
            assert_eq!(Constraint::diff_specificity(answer, guess).unwrap(), built, "{} {}", answer, guess);
        }
        assert!((Constraint::diff_specificity("adage", "adiue").unwrap() - (3.0 + 2.0 / 24.0)).abs() < 1e-12);
        assert_eq!(Constraint::diff_specificity("crane", "cran"), Err(ClueError::WrongLength { expected: 5, found: 4 }));
        assert_eq!(Constraint::diff_specificity("crane", "cr4ne"), Err(ClueError::InvalidLetter('4')));
    }

    #[test]
    fn test_identity_and_contradiction() {
        let c = Constraint::parse("+s_a-s_s_y", WORD_LEN).unwrap();
        assert_eq!(c.combine(&Constraint::default()), c);
        assert_eq!(Constraint::default().combine(&c), c);
        assert!(!c.is_contradictory());
        assert!(c.combine(&Constraint::parse("+t_a_b_c_d", WORD_LEN).unwrap()).is_contradictory());
    }

    #[test]
    fn test_display() {
        let txt = Constraint::from_diff("adage", "adiue").unwrap().to_string();
        assert!(txt.starts_with("0: a\n1: d\n"));
        assert!(txt.contains("at least: {a: 1, d: 1, e: 1}"));
        assert!(txt.contains("words used: [adiue]"));
    }

    fn word() -> impl Strategy<Value = String> {
        "[a-f]{5}"
    }
    fn constraint() -> impl Strategy<Value = Constraint> {
        prop::collection::vec((word(), word()), 0..4).prop_map(|pairs| {
            pairs.iter().fold(Constraint::default(), |acc, (a, g)| acc.combine(&Constraint::from_diff(a, g).unwrap()))
        })
    }

    proptest! {
        #[test]
        fn combine_is_idempotent(c in constraint()) {
            prop_assert_eq!(c.combine(&c), c);
        }

        #[test]
        fn combine_is_commutative(a in constraint(), b in constraint()) {
            prop_assert_eq!(a.combine(&b), b.combine(&a));
        }

        #[test]
        fn combine_is_associative(a in constraint(), b in constraint(), c in constraint()) {
            prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
        }

        #[test]
        fn answer_satisfies_its_own_feedback(answer in word(), guess in word()) {
            prop_assume!(answer != guess);
            prop_assert!(Constraint::from_diff(&answer, &guess).unwrap().matches(&answer));
        }

        #[test]
        fn diff_specificity_matches_built_constraint(answer in "[a-e]{5}", guess in "[a-e]{5}") {
            let built = Constraint::from_diff(&answer, &guess).unwrap().specificity();
            prop_assert_eq!(Constraint::diff_specificity(&answer, &guess).unwrap(), built);
        }

        #[test]
        fn combining_never_widens(a in constraint(), b in constraint(), pool in prop::collection::vec(word(), 0..40)) {
            let before = pool.iter().filter(|w| a.matches(w)).count();
            let after = pool.iter().filter(|w| a.combine(&b).matches(w)).count();
            prop_assert!(after <= before);
        }
    }
}
