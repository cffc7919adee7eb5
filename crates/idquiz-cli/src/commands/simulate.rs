//! `idquiz simulate`: run a whole session with a simulated participant.
//!
//! Useful for checking a catalog end to end and for seeing what a report
//! looks like at a given hit rate without sitting through the quiz.

use std::path::PathBuf;

use idquiz_core::{Person, Proctor, QuizConfig, TickOutcome, TrialView};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

pub struct SimulateCommandConfig<'a> {
    pub catalog_path: &'a str,
    pub accuracy: f64,
    pub timeout_rate: f64,
    pub ticks: u32,
    pub seed: Option<u64>,
    pub timeouts: &'a str,
    pub json: bool,
    pub output_path: Option<&'a str>,
}

/// A participant who lets the clock run out with probability
/// `timeout_rate`, and otherwise answers correctly with probability
/// `accuracy` and uniformly at random among the wrong options otherwise.
pub struct Participant {
    accuracy: f64,
    timeout_rate: f64,
}

impl Participant {
    /// Out-of-range values are clamped; NaN becomes 0.
    pub fn new(accuracy: f64, timeout_rate: f64) -> Self {
        Self {
            accuracy: probability(accuracy),
            timeout_rate: probability(timeout_rate),
        }
    }

    /// `None` means no answer this trial.
    pub fn decide<R: Rng + ?Sized>(&self, view: &TrialView<'_>, rng: &mut R) -> Option<Person> {
        if rng.random_bool(self.timeout_rate) {
            return None;
        }
        let correct = view.reference.person;
        if rng.random_bool(self.accuracy) {
            return Some(correct);
        }
        let wrong: Vec<Person> = view
            .options
            .iter()
            .map(|o| o.person)
            .filter(|&p| p != correct)
            .collect();
        Some(wrong.choose(rng).copied().unwrap_or(correct))
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

pub fn run(cfg: SimulateCommandConfig<'_>) {
    let index = super::load_catalog(cfg.catalog_path);
    let config = QuizConfig {
        countdown_ticks: cfg.ticks,
        timeout_policy: super::parse_timeouts(cfg.timeouts),
        seed: cfg.seed,
    };

    let mut proctor = match Proctor::start(index, &config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            std::process::exit(1);
        }
    };

    // Participant draws come from their own stream so that changing the
    // behaviour knobs does not reshuffle the option sets.
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };
    let participant = Participant::new(cfg.accuracy, cfg.timeout_rate);

    play(&mut proctor, &participant, &mut rng);

    let Some(report) = proctor.report() else {
        eprintln!("Simulation ended before the last trial.");
        std::process::exit(1);
    };

    let text = if cfg.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Cannot serialize report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        report.to_text()
    };

    println!("{text}");
    if let Some(path) = cfg.output_path {
        super::write_report(&PathBuf::from(path), &text);
    }
}

/// Drive `proctor` to the end: answer, or tick until the countdown fires.
pub fn play<R: Rng>(proctor: &mut Proctor, participant: &Participant, rng: &mut R) {
    while let Some(view) = proctor.view() {
        match participant.decide(&view, rng) {
            Some(person) => {
                if let Err(e) = proctor.select(person) {
                    log::warn!("selection rejected: {e}");
                    return;
                }
            }
            None => loop {
                match proctor.tick() {
                    TickOutcome::Counting(_) => continue,
                    TickOutcome::TimedOut(_) | TickOutcome::Idle => break,
                }
            },
        }
    }
}
