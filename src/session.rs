use std::collections::HashSet;

use log::debug;

use crate::{rank, sorted_words, ClueError, Constraint, Hint, RankedGuess, Rules, SortOrder, TurnError, WORD_LEN};

/// Everything a session needs up front; nothing is loaded behind its back.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub word_len: usize,
    /// Candidate answers, in the order ties are broken.
    pub words: Vec<String>,
    /// Words that are removed from `words`, e.g. previous answers.
    pub excluded: Vec<String>,
    /// Ranking workers; `0` uses one per cpu.
    pub threads: usize,
}
impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig { word_len: WORD_LEN, words: vec![], excluded: vec![], threads: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase { AwaitingWord, AwaitingColors }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome { InProgress, Solved, Exhausted }

/// A submitted word and the hints entered for it so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub word: String,
    pub hints: Vec<Hint>,
}

/// One playthrough: alternates between taking a guess and taking its colors,
/// folding each confirmed turn into the running rules and re-ranking the pool.
#[derive(Debug, Clone)]
pub struct Session<R: Rules = Constraint> {
    word_len: usize,
    threads: usize,
    pool: Vec<String>,
    initial: R,
    constraint: R,
    turns: Vec<Turn>,
    phase: Phase,
    ranked: Vec<RankedGuess>,
}
impl<R: Rules> Session<R> {
    pub fn new(config: SessionConfig) -> Self {
        let initial = R::identity(config.word_len);
        Self::with_constraint(config, initial)
    }
    /// Starts from `constraint` instead of the identity rules.
    pub fn with_constraint(config: SessionConfig, constraint: R) -> Self {
        let excluded: HashSet<&str> = config.excluded.iter().map(String::as_str).collect();
        let pool: Vec<String> = config.words.iter().filter(|w| !excluded.contains(w.as_str())).cloned().collect();
        debug!("session over {} words ({} excluded)", pool.len(), config.words.len() - pool.len());
        Session {
            word_len: config.word_len,
            threads: config.threads,
            pool,
            initial: constraint.clone(),
            constraint,
            turns: vec![],
            phase: Phase::AwaitingWord,
            ranked: vec![],
        }
    }

    pub fn word_len(&self) -> usize {
        self.word_len
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
    pub fn pool(&self) -> &[String] {
        &self.pool
    }
    /// The conjunction of every confirmed turn.
    pub fn constraint(&self) -> &R {
        &self.constraint
    }
    pub fn recommendations(&self) -> &[RankedGuess] {
        &self.ranked
    }
    pub fn ranked_candidates(&self, order: SortOrder) -> Vec<String> {
        sorted_words(&self.ranked, order)
    }

    pub fn outcome(&self) -> Outcome {
        let confirmed = match self.phase {
            Phase::AwaitingWord => self.turns.last(),
            Phase::AwaitingColors => self.turns.iter().rev().nth(1),
        };
        match confirmed {
            None => Outcome::InProgress,
            Some(turn) if turn.hints.iter().all(|&h| h == Hint::Correct) => Outcome::Solved,
            Some(_) if self.ranked.is_empty() => Outcome::Exhausted,
            Some(_) => Outcome::InProgress,
        }
    }

    /// Starts a new turn with `word`, every letter initially marked absent.
    /// Rejected words leave the session as it was.
    pub fn submit_word(&mut self, word: &str) -> Result<&str, TurnError> {
        if self.phase != Phase::AwaitingWord { return Err(TurnError::OutOfPhase) }
        let word = word.trim().to_lowercase();
        let found = word.chars().count();
        if found != self.word_len {
            return Err(TurnError::InvalidWordLength { expected: self.word_len, found });
        }
        // a word the rules can't take would leave the turn impossible to confirm
        R::from_clues(&word, &vec![Hint::Absent; self.word_len])?;

        debug!("turn {}: {}", self.turns.len(), word);
        self.turns.push(Turn { word, hints: vec![Hint::Absent; self.word_len] });
        self.phase = Phase::AwaitingColors;
        Ok(&self.turns[self.turns.len() - 1].word)
    }

    /// Advances the hint at `position` of the current turn to the next color.
    pub fn cycle_color(&mut self, turn: usize, position: usize) -> Result<Hint, TurnError> {
        if self.phase != Phase::AwaitingColors || Some(turn) != self.turns.len().checked_sub(1) { return Err(TurnError::OutOfPhase) }
        if position >= self.word_len { return Err(TurnError::InvalidPosition(position)) }

        let hint = &mut self.turns[turn].hints[position];
        *hint = hint.next();
        Ok(*hint)
    }

    /// Folds the current turn into the running rules, re-ranks and goes back to waiting for a word.
    /// On error nothing changes.
    pub fn confirm_turn(&mut self) -> Result<&[RankedGuess], TurnError> {
        let turn = match (self.phase, self.turns.last()) {
            (Phase::AwaitingColors, Some(turn)) => turn,
            _ => return Err(TurnError::OutOfPhase),
        };
        let constraint = self.constraint.combine(&R::from_clues(&turn.word, &turn.hints)?);
        let ranked = rank(&constraint, &self.pool, self.threads)?;
        debug!("turn {} confirmed, {} candidates left", self.turns.len() - 1, ranked.len());

        self.constraint = constraint;
        self.ranked = ranked;
        self.phase = Phase::AwaitingWord;
        Ok(&self.ranked)
    }

    /// Re-ranks the pool under the current rules without taking a turn.
    pub fn refresh(&mut self) -> Result<&[RankedGuess], ClueError> {
        self.ranked = rank(&self.constraint, &self.pool, self.threads)?;
        Ok(&self.ranked)
    }

    /// Forgets every turn and goes back to the starting rules.
    pub fn reset(&mut self) {
        self.constraint = self.initial.clone();
        self.turns.clear();
        self.ranked.clear();
        self.phase = Phase::AwaitingWord;
    }
}
