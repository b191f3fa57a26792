use std::iter::FusedIterator;
use std::fmt;

pub const ALPHABET_LEN: usize = 26;

/// Maps a lowercase ascii letter to its index in `0..26`.
pub fn letter_index(ch: char) -> Option<usize> {
    match ch {
        'a'..='z' => Some(ch as usize - 'a' as usize),
        _ => None,
    }
}

/// Inverse of [`letter_index`].
pub fn index_letter(idx: usize) -> char {
    debug_assert!(idx < ALPHABET_LEN);
    (b'a' + idx as u8) as char
}

/// A set of lowercase letters, one bit per letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LetterSet(u32);
impl LetterSet {
    pub fn new() -> Self {
        LetterSet(0)
    }
    pub fn full() -> Self {
        LetterSet((1 << ALPHABET_LEN) - 1)
    }
    /// Builds a set from every letter in `letters`; anything outside `a..=z` is ignored.
    pub fn from_letters(letters: &str) -> Self {
        let mut res = Self::new();
        for idx in letters.chars().filter_map(letter_index) { res.insert(idx); }
        res
    }
    /// Everything in `self` except the letters in `letters`.
    pub fn without(mut self, letters: &str) -> Self {
        for idx in letters.chars().filter_map(letter_index) { self.remove(idx); }
        self
    }
    pub fn insert(&mut self, pos: usize) {
        self.0 |= 1 << pos;
    }
    pub fn remove(&mut self, pos: usize) {
        self.0 &= !(1 << pos);
    }
    pub fn contains(&self, pos: usize) -> bool {
        pos < ALPHABET_LEN && self.0 & (1 << pos) != 0
    }
    pub fn contains_letter(&self, ch: char) -> bool {
        letter_index(ch).map_or(false, |i| self.contains(i))
    }
    pub fn clear(&mut self) {
        self.0 = 0;
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    pub fn intersection(&self, other: &LetterSet) -> LetterSet {
        LetterSet(self.0 & other.0)
    }
    pub fn difference(&self, other: &LetterSet) -> LetterSet {
        LetterSet(self.0 & !other.0)
    }
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn letters(&self) -> impl Iterator<Item = char> {
        self.into_iter().map(index_letter)
    }
}
impl fmt::Display for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self == Self::full() {
            true => write!(f, "*"),
            false => self.letters().try_for_each(|ch| write!(f, "{}", ch)),
        }
    }
}

/// Iterates over the items of the bitset in ascending order.
pub struct Iter(u32);
impl Iterator for Iter {
    type Item = usize;
    fn next(&mut self) -> Option<Self::Item> {
        match self.0 {
            0 => None,
            v => Some({
                let res = v.trailing_zeros() as usize;
                self.0 &= v - 1;
                res
            }),
        }
    }
}
impl FusedIterator for Iter {}

impl IntoIterator for LetterSet {
    type Item = usize;
    type IntoIter = Iter;
    fn into_iter(self) -> Self::IntoIter {
        Iter(self.0)
    }
}

#[test]
fn test_letter_set() {
    let mut s = LetterSet::new();
    assert_eq!(s.0, 0b0);
    assert_eq!(s.into_iter().collect::<Vec<_>>(), &[]);
    assert!(!s.contains(1) && !s.contains(3) && !s.contains(0) && !s.contains(25));
    assert!(s.is_empty());
    assert_eq!(s.len(), 0);

    s.insert(0);
    s.insert(3);
    s.insert(3);
    assert_eq!(s.0, 0b1001);
    assert_eq!(s.into_iter().collect::<Vec<_>>(), &[0, 3]);
    assert!(s.contains_letter('a') && s.contains_letter('d') && !s.contains_letter('b'));
    assert!(!s.contains_letter('A') && !s.contains_letter('1'));
    assert_eq!(s.len(), 2);

    s.remove(0);
    s.remove(7);
    assert_eq!(s.into_iter().collect::<Vec<_>>(), &[3]);
    assert_eq!(s.to_string(), "d");

    s.clear();
    assert!(s.is_empty());

    let full = LetterSet::full();
    assert_eq!(full.len(), 26);
    assert_eq!(full.letters().collect::<String>(), "abcdefghijklmnopqrstuvwxyz");
    assert_eq!(full.to_string(), "*");
    assert!(!full.contains(26));

    let p = LetterSet::from_letters("crane");
    let q = full.without("xyz");
    assert_eq!(p.len(), 5);
    assert_eq!(q.len(), 23);
    assert_eq!(p.intersection(&q), p);
    assert_eq!(p.intersection(&LetterSet::from_letters("rent")), LetterSet::from_letters("ren"));
    assert_eq!(p.difference(&LetterSet::from_letters("rent")).to_string(), "ac");
    assert_eq!(full.difference(&q).to_string(), "xyz");
}
