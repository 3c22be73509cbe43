//! Errors raised while resolving ligature configuration

use thiserror::Error;

/// Failure while resolving a language's ligature configuration.
///
/// None of these are fatal: the resolver's lenient entry point logs them and
/// falls back to a configuration that leaves ligatures visible.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A single-character directive that isn't recognized: anything but
    /// `+ - 0 O X` in a ligature list, or `X` in a context list
    #[error("Invalid ligature specification: \"{0}\"")]
    InvalidSpecification(String),

    #[error("Invalid selectionMode: \"{0}\" (expected cursor, line, off or selection)")]
    InvalidSelectionMode(String),

    #[error("\"inherit\" is not a valid property for the root ligature configuration")]
    InvalidRootInherit,

    /// Inheritance cycle, listing every language on the chain
    #[error("Unresolved language inheritance for: {}", .0.join(", "))]
    UnresolvedInheritance(Vec<String>),

    #[error("Failed to compile ligature pattern: {0}")]
    Pattern(String),
}

impl From<fancy_regex::Error> for ConfigError {
    fn from(e: fancy_regex::Error) -> Self {
        ConfigError::Pattern(e.to_string())
    }
}
