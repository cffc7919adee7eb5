//! # idquiz-core
//!
//! **Can you still recognise a face after it has been de-identified?**
//!
//! `idquiz-core` runs a perceptual identification quiz. Each trial shows an
//! original photo next to six candidates processed with one de-identification
//! method (blur, mask or pixelation); the participant picks the candidate
//! showing the same person, or the countdown runs out. At the end accuracy is
//! reported overall, per method, per method and intensity, and per person.
//!
//! ## Quick Start
//!
//! ```no_run
//! use idquiz_core::{CatalogIndex, Proctor, QuizConfig};
//!
//! let catalog = CatalogIndex::from_path("images-metadata.json").unwrap();
//! let mut proctor = Proctor::start(catalog, &QuizConfig::default()).unwrap();
//!
//! while let Some(view) = proctor.view() {
//!     let pick = view.options[0].person;
//!     proctor.select(pick).unwrap();
//! }
//! println!("{}", proctor.report().unwrap());
//! ```
//!
//! ## Architecture
//!
//! Catalog index → Option sampler → Session (+ countdown, via the proctor) → Scoring
//!
//! - [`CatalogIndex`] splits the image list into references (trial order) and
//!   per-method pools (round-robin method order).
//! - [`generate_options`] draws five distractors uniformly without
//!   replacement and shuffles the six candidates uniformly.
//! - [`QuizSession`] is the only writer of trial state; participant responses
//!   and countdown expiries share one advance path.
//! - [`Proctor`] owns the session and its [`Countdown`] and keeps the two
//!   triggers from both advancing the same trial.
//! - [`score`] aggregates the responses into a [`ScoreReport`].

pub mod catalog;
pub mod countdown;
pub mod error;
pub mod proctor;
pub mod sampler;
pub mod scoring;
pub mod session;

pub use catalog::{AssetRecord, Catalog, CatalogIndex, Method, MethodPool, Person};
pub use countdown::{Countdown, Tick};
pub use error::{QuizError, Result};
pub use proctor::{Proctor, TickOutcome};
pub use sampler::{OPTION_COUNT, TrialOption, generate_options, generate_options_from};
pub use scoring::{
    Accuracy, IntensityScore, MethodScore, PersonScore, ScoreAxes, ScoreReport, TimeoutPolicy,
    score, trial_line,
};
pub use session::{
    Advance, Phase, QuizConfig, QuizSession, TrialRecord, TrialToken, TrialView,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
