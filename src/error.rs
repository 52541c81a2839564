//! Failure taxonomy of a harness session.
//!
//! Every variant is fatal: the session that produced it stops at the
//! failing assertion and hands the error back to the caller.

use std::fmt;
use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Status flag reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// `o_wfull`, write domain
    Full,
    /// `o_rempty`, read domain
    Empty,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Full => f.write_str("o_wfull"),
            Flag::Empty => f.write_str("o_rempty"),
        }
    }
}

/// Errors that abort a harness session
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarnessError {
    /// Empty flag not asserted after reset
    #[error("reset invariant violated at t={time_ps}ps: expected o_rempty=1, got {actual}")]
    ResetInvariant {
        /// Sampled `o_rempty`
        actual: u32,
        /// Simulation time in picoseconds
        time_ps: u64,
    },

    /// Value read back disagrees with the reference model head
    #[error("read #{index} mismatch at t={time_ps}ps: expected {expected:#04x}, got {actual:#04x}")]
    DataMismatch {
        /// Ordinal of the read within the session
        index: usize,
        /// Reference model head
        expected: u32,
        /// Sampled `o_rdata`
        actual: u32,
        /// Simulation time in picoseconds
        time_ps: u64,
    },

    /// Settled status flag disagrees with the reference model predicate
    #[error("{flag} mismatch at t={time_ps}ps: expected {expected}, got {actual} (model holds {occupancy})")]
    FlagMismatch {
        /// Flag that disagreed
        flag: Flag,
        /// Model predicate
        expected: bool,
        /// Device level
        actual: bool,
        /// Reference model length at the check
        occupancy: usize,
        /// Simulation time in picoseconds
        time_ps: u64,
    },

    /// Invalid or inconsistent configuration
    #[error("configuration error: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },
}

impl HarnessError {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_flag_and_values() {
        let err = HarnessError::FlagMismatch {
            flag: Flag::Full,
            expected: true,
            actual: false,
            occupancy: 32,
            time_ps: 1_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("o_wfull"));
        assert!(msg.contains("expected true, got false"));
        assert!(msg.contains("model holds 32"));
    }

    #[test]
    fn test_data_mismatch_formats_hex() {
        let err = HarnessError::DataMismatch {
            index: 3,
            expected: 0xff,
            actual: 0x00,
            time_ps: 42,
        };
        assert_eq!(
            err.to_string(),
            "read #3 mismatch at t=42ps: expected 0xff, got 0x00"
        );
    }

    #[test]
    fn test_config_message() {
        assert_eq!(
            HarnessError::config("bad").to_string(),
            "configuration error: bad"
        );
    }
}
