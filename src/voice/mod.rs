//! Natural-language alarm commands.
//!
//! Best-effort parsing of alarm-setting utterances into structured
//! creation parameters. The assistant's users speak Vietnamese, so the
//! patterns cover Vietnamese time/date words alongside the English
//! relative-date words.

pub mod parser;

use thiserror::Error;

pub use parser::{AlarmRequest, VoiceCommandParser};

/// Utterance parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoiceParseError {
    #[error("Could not recognize a time in the utterance")]
    TimeNotRecognized,

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
