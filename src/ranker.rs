use std::cmp::Reverse;
use std::panic;

use float_ord::FloatOrd;
use itertools::Itertools;
use log::debug;

use crate::{ClueError, Rules};

/// A candidate next guess and the mean specificity it is expected to reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedGuess {
    pub word: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder { #[default] ByScore, Alphabetical }

/// Mean specificity of the rules `guess` would reveal, over every other candidate taken as the answer.
fn score_guess<R: Rules>(guess: &str, candidates: &[&str]) -> Result<f64, ClueError> {
    let mut total = 0.0;
    let mut compared = 0usize;
    for &answer in candidates.iter().filter(|&&answer| answer != guess) {
        total += R::diff_specificity(answer, guess)?;
        compared += 1;
    }
    // divides by the words actually compared, not the pool size; the two only rank
    // differently when the pool holds duplicates of the guess
    Ok(match compared {
        0 => 0.0,
        n => total / n as f64,
    })
}

/// Filters `pool` down to the words `base` allows and ranks each of them as a next guess.
///
/// Every surviving word is scored against every other (quadratic), split across `threads`
/// workers (`0` uses one per cpu). The result is sorted by descending score; equal scores
/// keep their pool order.
pub fn rank<R: Rules, S: AsRef<str>>(base: &R, pool: &[S], mut threads: usize) -> Result<Vec<RankedGuess>, ClueError> {
    let candidates: Vec<&str> = pool.iter().map(AsRef::as_ref).filter(|w| base.matches(w)).collect();
    if candidates.is_empty() {
        debug!("no candidates left out of {}", pool.len());
        return Ok(vec![]);
    }

    if threads == 0 { threads = num_cpus::get(); }
    threads = threads.clamp(1, candidates.len());
    let chunk_len = (candidates.len() + threads - 1) / threads;
    debug!("ranking {} of {} words on {} threads", candidates.len(), pool.len(), threads);

    let candidates = &candidates;
    let scored = crossbeam::thread::scope(|s| {
        let workers: Vec<_> = candidates.chunks(chunk_len).map(|chunk| {
            s.spawn(move |_| {
                chunk.iter().map(|&guess| {
                    score_guess::<R>(guess, candidates).map(|score| RankedGuess { word: guess.to_owned(), score })
                }).collect::<Result<Vec<_>, _>>()
            })
        }).collect();
        workers.into_iter().map(|w| w.join().unwrap_or_else(|e| panic::resume_unwind(e))).collect::<Result<Vec<_>, _>>()
    }).unwrap_or_else(|e| panic::resume_unwind(e))?;

    // chunks come back in pool order, so the stable sort keeps ties in pool order
    let mut ranked: Vec<RankedGuess> = scored.into_iter().flatten().collect();
    ranked.sort_by_key(|r| Reverse(FloatOrd(r.score)));
    Ok(ranked)
}

/// The words of `ranked` in the requested order.
pub fn sorted_words(ranked: &[RankedGuess], order: SortOrder) -> Vec<String> {
    let words = ranked.iter().map(|r| r.word.clone());
    match order {
        SortOrder::ByScore => words.collect(),
        SortOrder::Alphabetical => words.sorted().collect(),
    }
}
