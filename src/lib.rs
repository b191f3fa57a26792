use thiserror::Error;

mod bit_set;
mod constraint;
mod ranker;
mod session;
mod words;

#[cfg(test)] mod testing;

pub use bit_set::{LetterSet, ALPHABET_LEN, letter_index, index_letter};
pub use constraint::{Hint, Rules, Constraint, feedback, parse_clue_line, parse_clue_lines};
pub use ranker::{RankedGuess, SortOrder, rank, sorted_words};
pub use session::{Session, SessionConfig, Phase, Outcome, Turn};
pub use words::parse_word_list;

/// Length of a standard puzzle word.
pub const WORD_LEN: usize = 5;

/// A clue line or guess/hint pair that can't be turned into a constraint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClueError {
    #[error("expected {expected} letters, got {found}")]
    WrongLength { expected: usize, found: usize },
    #[error("invalid clue code {0:?} (expected one of '_', '-', '+')")]
    InvalidCode(char),
    #[error("invalid letter {0:?}")]
    InvalidLetter(char),
    #[error("{hints} hints given for a {letters}-letter word")]
    MismatchedHints { letters: usize, hints: usize },
}

/// A rejected turn operation. The session is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error("words must be {expected} letters long, got {found}")]
    InvalidWordLength { expected: usize, found: usize },
    #[error("operation not allowed in the current turn phase")]
    OutOfPhase,
    #[error("position {0} is outside the word")]
    InvalidPosition(usize),
    #[error(transparent)]
    Clue(#[from] ClueError),
}
