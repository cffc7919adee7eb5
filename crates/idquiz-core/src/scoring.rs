//! Accuracy aggregation and the plain-text results report.
//!
//! Scoring is a pure function of the response list and fixed axes (methods,
//! intensities, identities). Every axis value gets a figure, even with no
//! responses behind it, so reports from different runs line up row by row.
//!
//! Report layout, in order:
//! 1. overall accuracy line
//! 2. one line per method
//! 3. one line per graded method and intensity (mask gets a single line)
//! 4. one line per identity
//! 5. one line per trial

use std::fmt::Write;

use serde::Serialize;

use crate::catalog::{CatalogIndex, Method, Person};
use crate::session::TrialRecord;

// ---------------------------------------------------------------------------
// Policy and axes
// ---------------------------------------------------------------------------

/// What a timed-out trial counts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Timeouts stay in every denominator as wrong answers.
    #[default]
    CountAsIncorrect,
    /// Timeouts are dropped from every denominator.
    Exclude,
}

impl std::fmt::Display for TimeoutPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountAsIncorrect => write!(f, "count"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// The fixed enumerations a report is sliced by.
#[derive(Debug, Clone)]
pub struct ScoreAxes {
    pub methods: Vec<Method>,
    pub intensities: Vec<u32>,
    pub persons: Vec<Person>,
}

impl Default for ScoreAxes {
    fn default() -> Self {
        Self {
            methods: Method::PROCESSED.to_vec(),
            intensities: vec![50, 75],
            persons: Person::ALL.to_vec(),
        }
    }
}

impl ScoreAxes {
    /// Default axes with the intensities actually present in `catalog`.
    pub fn from_catalog(catalog: &CatalogIndex) -> Self {
        let intensities = catalog.intensities();
        if intensities.is_empty() {
            return Self::default();
        }
        Self {
            intensities,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Accuracy
// ---------------------------------------------------------------------------

/// Correct / total counts with the derived percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
    /// `100 * correct / total` rounded half-up to 2 decimals; 0 when empty.
    pub percent: f64,
}

impl Accuracy {
    pub fn new(correct: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            round2(100.0 * correct as f64 / total as f64)
        };
        Self {
            correct,
            total,
            percent,
        }
    }

    pub fn of<'a>(records: impl IntoIterator<Item = &'a TrialRecord>) -> Self {
        let (correct, total) = records
            .into_iter()
            .fold((0, 0), |(c, t), r| (c + usize::from(r.correct), t + 1));
        Self::new(correct, total)
    }
}

/// Formats as the two-decimal percentage without a sign, e.g. `42.86`.
impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.percent)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MethodScore {
    pub method: Method,
    pub accuracy: Accuracy,
}

/// A row of the method/intensity block. `intensity` is `None` for the single
/// mask row, which repeats the mask figure from the method block.
#[derive(Debug, Clone, Serialize)]
pub struct IntensityScore {
    pub method: Method,
    pub intensity: Option<u32>,
    pub accuracy: Accuracy,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonScore {
    pub person: Person,
    pub accuracy: Accuracy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub timeout_policy: TimeoutPolicy,
    pub timeouts: usize,
    pub overall: Accuracy,
    pub by_method: Vec<MethodScore>,
    pub by_method_intensity: Vec<IntensityScore>,
    pub by_person: Vec<PersonScore>,
    pub trials: Vec<TrialRecord>,
}

/// Aggregate `responses` along `axes`.
pub fn score(responses: &[TrialRecord], axes: &ScoreAxes, policy: TimeoutPolicy) -> ScoreReport {
    let scored: Vec<&TrialRecord> = responses
        .iter()
        .filter(|r| policy == TimeoutPolicy::CountAsIncorrect || !r.timed_out())
        .collect();

    let overall = Accuracy::of(scored.iter().copied());

    let by_method: Vec<MethodScore> = axes
        .methods
        .iter()
        .map(|&method| MethodScore {
            method,
            accuracy: Accuracy::of(scored.iter().copied().filter(|r| r.method == method)),
        })
        .collect();

    let mut by_method_intensity = Vec::new();
    for entry in &by_method {
        if entry.method.has_intensity() {
            for &intensity in &axes.intensities {
                by_method_intensity.push(IntensityScore {
                    method: entry.method,
                    intensity: Some(intensity),
                    accuracy: Accuracy::of(scored.iter().copied().filter(|r| {
                        r.method == entry.method && r.intensity == Some(intensity)
                    })),
                });
            }
        } else {
            by_method_intensity.push(IntensityScore {
                method: entry.method,
                intensity: None,
                accuracy: entry.accuracy,
            });
        }
    }

    let by_person = axes
        .persons
        .iter()
        .map(|&person| PersonScore {
            person,
            accuracy: Accuracy::of(
                scored
                    .iter()
                    .copied()
                    .filter(|r| r.original_person == person),
            ),
        })
        .collect();

    ScoreReport {
        timeout_policy: policy,
        timeouts: responses.iter().filter(|r| r.timed_out()).count(),
        overall,
        by_method,
        by_method_intensity,
        by_person,
        trials: responses.to_vec(),
    }
}

impl ScoreReport {
    pub fn method(&self, method: Method) -> Option<Accuracy> {
        self.by_method
            .iter()
            .find(|s| s.method == method)
            .map(|s| s.accuracy)
    }

    pub fn method_intensity(&self, method: Method, intensity: Option<u32>) -> Option<Accuracy> {
        self.by_method_intensity
            .iter()
            .find(|s| s.method == method && s.intensity == intensity)
            .map(|s| s.accuracy)
    }

    pub fn person(&self, person: Person) -> Option<Accuracy> {
        self.by_person
            .iter()
            .find(|s| s.person == person)
            .map(|s| s.accuracy)
    }

    /// Plain-text report, suitable for pasting elsewhere.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = write!(out, "Overall accuracy: {}%", self.overall);
        if self.timeout_policy == TimeoutPolicy::Exclude && self.timeouts > 0 {
            let _ = write!(out, " ({} timeouts excluded)", self.timeouts);
        }
        out.push_str("\n\n");

        out.push_str("Accuracy by method:\n");
        for s in &self.by_method {
            let _ = writeln!(out, "{}: {}%", s.method, s.accuracy);
        }
        out.push('\n');

        out.push_str("Accuracy by method and intensity:\n");
        for s in &self.by_method_intensity {
            match s.intensity {
                Some(i) => {
                    let _ = writeln!(out, "{} ({}%): {}%", s.method, i, s.accuracy);
                }
                None => {
                    let _ = writeln!(out, "{}: {}%", s.method, s.accuracy);
                }
            }
        }
        out.push('\n');

        out.push_str("Accuracy by person:\n");
        for s in &self.by_person {
            let _ = writeln!(out, "{}: {}%", s.person, s.accuracy);
        }
        out.push('\n');

        out.push_str("Individual trials:");
        for (i, r) in self.trials.iter().enumerate() {
            out.push('\n');
            out.push_str(&trial_line(i, r));
        }
        out
    }
}

impl std::fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// `Trial 3 (blur 50%): selected P2 (answer: P5) - incorrect`
pub fn trial_line(index: usize, r: &TrialRecord) -> String {
    let condition = match r.intensity {
        Some(i) => format!("{} {}%", r.method, i),
        None => r.method.to_string(),
    };
    let (selected, tag) = match r.selected_person {
        Some(p) => (
            p.to_string(),
            if r.correct { "correct" } else { "incorrect" },
        ),
        None => ("none".to_string(), "timeout"),
    };
    format!(
        "Trial {} ({}): selected {} (answer: {}) - {}",
        index + 1,
        condition,
        selected,
        r.original_person,
        tag
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
