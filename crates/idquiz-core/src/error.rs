//! Error type shared by every stage of the quiz engine.
//!
//! Errors fall into two classes:
//! - **configuration** errors abort session start (bad catalog, missing
//!   coverage) and surface as a "cannot start" state;
//! - **invalid state** errors are recoverable: a pick that was not offered, a
//!   response after the session finished, or a countdown firing for a trial
//!   that already advanced. Front ends log and drop them.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{Method, Person};

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("cannot read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog contains no images")]
    EmptyCatalog,

    #[error("catalog contains no reference (original) images")]
    NoReferenceImages,

    #[error("catalog contains no processed images")]
    NoMethods,

    #[error("method '{method}' has no image of {person}")]
    MissingCoverage { method: Method, person: Person },

    #[error("need at least {needed} identities to build an option set, have {available}")]
    TooFewIdentities { needed: usize, available: usize },

    #[error("{0} is not among the current options")]
    NotAnOption(Person),

    #[error("session already finished")]
    SessionFinished,

    #[error("stale countdown for trial {got}, current trial is {expected}")]
    StaleTimer { expected: usize, got: usize },
}

impl QuizError {
    /// True for errors that must abort session start.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::NotAnOption(_) | Self::SessionFinished | Self::StaleTimer { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
