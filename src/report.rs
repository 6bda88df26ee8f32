//! Runtime-error report modes.
//!
//! The mode governs how downstream transport conditions (underrun, overrun)
//! are surfaced: through the structured logger, straight to stderr, or not
//! at all. Parsing is strict so a rejected mode never disturbs the flags the
//! block already holds.

use std::str::FromStr;

use crate::AudioBlockError;

/// How runtime stream conditions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Report through the structured logger.
    Logger,
    /// Report directly to the process's error stream.
    Stderror,
    /// Suppress reports entirely.
    Disabled,
}

impl FromStr for ReportMode {
    type Err = AudioBlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOGGER" => Ok(Self::Logger),
            "STDERROR" => Ok(Self::Stderror),
            "DISABLED" => Ok(Self::Disabled),
            other => Err(AudioBlockError::UnknownReportMode {
                mode: other.to_string(),
            }),
        }
    }
}
