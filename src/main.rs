use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, Args};
use itertools::Itertools;
use log::info;

use wordle_ranker::*;

#[derive(Parser)]
#[clap(about = "Ranks wordle guesses from the clues seen so far")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Dictionary {
    /// Candidate words, one per line
    #[clap(long, default_value = "words.txt")]
    words: PathBuf,
    /// Words to leave out, e.g. past answers
    #[clap(long)]
    history: Option<PathBuf>,
    /// Ranking threads (0 = one per cpu)
    #[clap(long, default_value_t = 0)]
    threads: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Ranks the words consistent with a file of clue lines such as `+s_a-s_s_y`
    Rank {
        #[clap(flatten)]
        dict: Dictionary,
        #[clap(long, default_value = "input.txt")]
        clues: PathBuf,
        #[clap(long, default_value_t = 20)]
        top: usize,
        /// List the candidates alphabetically instead of by score
        #[clap(long)]
        alpha: bool,
    },
    /// Plays a puzzle interactively
    Play {
        #[clap(flatten)]
        dict: Dictionary,
        #[clap(long, default_value_t = 10)]
        top: usize,
    },
    /// Lets the solver play against known answers (every word when none are given)
    Simulate {
        #[clap(flatten)]
        dict: Dictionary,
        answers: Vec<String>,
        /// Opening guess; defaults to the best-ranked word
        #[clap(long)]
        start: Option<String>,
        #[clap(long, default_value_t = 10)]
        max_rounds: usize,
    },
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

impl Dictionary {
    fn config(&self) -> Result<SessionConfig> {
        let words = parse_word_list(&read(&self.words)?, WORD_LEN);
        if words.is_empty() { bail!("{} has no {}-letter words", self.words.display(), WORD_LEN); }
        let excluded = match &self.history {
            Some(path) => parse_word_list(&read(path)?, WORD_LEN),
            None => vec![],
        };
        Ok(SessionConfig { word_len: WORD_LEN, words, excluded, threads: self.threads })
    }
}

/// Clicks every tile of the current turn round to `hints`.
fn enter_hints(session: &mut Session, hints: &[Hint]) -> Result<()> {
    let turn = session.turns().len().checked_sub(1).ok_or_else(|| anyhow!("no word entered"))?;
    for (pos, &want) in hints.iter().enumerate() {
        while session.turns()[turn].hints[pos] != want {
            session.cycle_color(turn, pos)?;
        }
    }
    Ok(())
}

fn print_ranked(ranked: &[RankedGuess], top: usize) {
    println!("number of candidates {}", ranked.len());
    for r in ranked.iter().take(top) {
        println!("{}\t{}", r.score * 100.0, r.word);
    }
}

fn run_rank(dict: &Dictionary, clues: &Path, top: usize, alpha: bool) -> Result<()> {
    let constraint: Constraint = parse_clue_lines(&read(clues)?, WORD_LEN).with_context(|| format!("bad clue line in {}", clues.display()))?;
    print!("{}", constraint);

    let mut session = Session::with_constraint(dict.config()?, constraint);
    let ranked = session.refresh()?;
    match alpha {
        false => print_ranked(ranked, top),
        true => println!("{}", session.ranked_candidates(SortOrder::Alphabetical).iter().take(top).join("\n")),
    }
    Ok(())
}

fn run_play(dict: &Dictionary, top: usize) -> Result<()> {
    let mut session: Session = Session::new(dict.config()?);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut prompt = |msg: &str| -> Result<Option<String>> {
        print!("{}", msg);
        io::stdout().flush()?;
        Ok(lines.next().transpose()?.map(|s| s.trim().to_owned()))
    };

    println!("enter each guess, then its colors as {} codes ('_' gray, '-' yellow, '+' green); 'reset' starts over", WORD_LEN);
    loop {
        let word = match prompt("guess: ")? {
            Some(x) => x.to_lowercase(),
            None => return Ok(()),
        };
        if word == "reset" {
            session.reset();
            continue;
        }
        if let Err(e) = session.submit_word(&word) {
            println!("{}", e);
            continue;
        }

        loop {
            let codes = match prompt("colors: ")? {
                Some(x) => x,
                None => return Ok(()),
            };
            let hints = match codes.chars().map(Hint::from_code).collect::<Result<Vec<_>, _>>() {
                Ok(x) if x.len() == WORD_LEN => x,
                Ok(x) => { println!("expected {} codes, got {}", WORD_LEN, x.len()); continue }
                Err(e) => { println!("{}", e); continue }
            };
            enter_hints(&mut session, &hints)?;
            print_ranked(session.confirm_turn()?, top);
            break;
        }

        match session.outcome() {
            Outcome::Solved => { println!("solved in {}", session.turns().len()); session.reset(); }
            Outcome::Exhausted => { println!("no words fit those clues"); session.reset(); }
            Outcome::InProgress => (),
        }
    }
}

/// Plays one game against `answer`; returns the number of rounds if it was solved.
fn simulate_one(config: &SessionConfig, answer: &str, opener: &str, max_rounds: usize) -> Result<Option<usize>> {
    let mut session: Session = Session::new(config.clone());
    let mut guess = opener.to_owned();
    for round in 1..=max_rounds {
        session.submit_word(&guess)?;
        let hints = feedback(answer, &guess)?;
        enter_hints(&mut session, &hints)?;
        session.confirm_turn()?;
        if session.outcome() == Outcome::Solved { return Ok(Some(round)) }
        guess = match session.recommendations().first() {
            Some(r) => r.word.clone(),
            None => return Ok(None),
        };
    }
    Ok(None)
}

fn run_simulate(dict: &Dictionary, answers: &[String], start: Option<&str>, max_rounds: usize) -> Result<()> {
    let config = dict.config()?;
    let answers = match answers.is_empty() {
        true => config.words.clone(),
        false => answers.iter().map(|s| s.to_lowercase()).collect(),
    };
    let opener = match start {
        Some(x) => x.to_lowercase(),
        None => {
            let mut session: Session = Session::new(config.clone());
            session.refresh()?.first().map(|r| r.word.clone()).ok_or_else(|| anyhow!("nothing to guess"))?
        }
    };
    info!("opening with {} against {} answers", opener, answers.len());

    let mut rounds = vec![];
    let mut failed = vec![];
    for answer in answers.iter() {
        match simulate_one(&config, answer, &opener, max_rounds)? {
            Some(n) => { println!("{}: {}", answer, n); rounds.push(n); }
            None => { println!("{}: failed", answer); failed.push(answer); }
        }
    }
    if !rounds.is_empty() {
        println!("average rounds: {:.3}", rounds.iter().sum::<usize>() as f64 / rounds.len() as f64);
    }
    if !failed.is_empty() {
        println!("failed ({}): {}", failed.len(), failed.iter().join(", "));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    match Cli::parse().command {
        Command::Rank { dict, clues, top, alpha } => run_rank(&dict, &clues, top, alpha),
        Command::Play { dict, top } => run_play(&dict, top),
        Command::Simulate { dict, answers, start, max_rounds } => run_simulate(&dict, &answers, start.as_deref(), max_rounds),
    }
}
