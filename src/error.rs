//! Errors raised while validating user input at the CLI and wizard boundaries.
//!
//! The calculation core never fails; degenerate inputs come back as sentinels.

use thiserror::Error;

use crate::core::wizard::{WizardEvent, WizardStep};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("--{flag} must be a finite number")]
    NotFinite { flag: &'static str },

    #[error("--{flag} must be >= 0")]
    Negative { flag: &'static str },

    #[error("--{flag} must be > 0")]
    NotPositive { flag: &'static str },

    #[error("--{flag} must be between {min} and {max}")]
    OutOfRange {
        flag: &'static str,
        min: f64,
        max: f64,
    },

    #[error("--rate must be > -100")]
    UnsupportedRate,

    #[error("--retirement-age must be >= --current-age")]
    RetirementBeforeCurrentAge,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    /// The current step still has unanswered questions.
    #[error("{step} step is incomplete: missing {}", .fields.join(", "))]
    Incomplete {
        step: WizardStep,
        fields: Vec<&'static str>,
    },

    #[error("cannot go {event} from the {step} step")]
    InvalidTransition { step: WizardStep, event: WizardEvent },

    #[error("invalid answers: {0}")]
    Input(#[from] InputError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render plan summary")]
    Fmt(#[from] std::fmt::Error),
}
