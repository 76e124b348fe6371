//! Error types for rule configuration and evaluation.

use thiserror::Error;

/// Errors surfaced to the host. Neither is swallowed internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The rule string is missing, empty, or has an empty segment.
    #[error("invalid rule string '{rules}': {reason}")]
    Config {
        /// The offending rule string.
        rules: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A rule name has no entry in the registry.
    #[error("unknown validation rule '{0}'")]
    UnknownRule(String),
}

impl VerifyError {
    pub(crate) fn config(rules: &str, reason: &'static str) -> Self {
        Self::Config {
            rules: rules.to_string(),
            reason,
        }
    }
}

pub type Result<T, E = VerifyError> = std::result::Result<T, E>;
