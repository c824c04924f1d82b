//! Error handling for the resolver core.
//!
//! Mirrors the two-type split used across this codebase: a strongly-typed
//! [`ResolverError`] enum for precise `match`-based handling, plus an
//! [`ErrorContext`] wrapper that adds a user-facing suggestion for CLI
//! display. Resolve outcomes (`failed`, `aborted`) are values of
//! [`crate::types::ResolverStatus`], not errors — this module only covers
//! failures that prevent a resolve from running at all (bad construction
//! arguments, cache/repository/config I/O faults).

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// All failure modes the resolver core can report directly (as opposed to
/// a solved-but-failed/aborted resolve, which is a normal [`crate::types::ResolverStatus`]).
#[derive(Debug, Error)]
pub enum ResolverError {
    /// `max_depth` was non-zero and smaller than a non-zero `start_depth`.
    #[error("max_depth ({max_depth}) must be >= start_depth ({start_depth})")]
    InvalidDepthRange { start_depth: u32, max_depth: u32 },

    /// The cache gateway failed to serialize or deserialize a cache entry.
    #[error("cache entry (de)serialization failed: {0}")]
    CacheSerialization(#[from] serde_json::Error),

    /// The cache gateway failed to complete a get/set/delete.
    #[error("cache gateway I/O error: {0}")]
    CacheIo(String),

    /// The repository gateway could not answer a query (e.g. bad search path).
    #[error("repository gateway error: {0}")]
    Repository(String),

    /// A configuration file could not be parsed.
    #[error("invalid resolver configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Generic I/O failure reading config, cache files, or repository paths.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wraps a [`ResolverError`] with an actionable, user-facing suggestion.
///
/// This is the presentation layer consumed by the thin CLI binary; library
/// callers should match on [`ResolverError`] directly instead.
pub struct ErrorContext {
    error: ResolverError,
    suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(error: ResolverError) -> Self {
        Self {
            error,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{self}");
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", "error:".red().bold(), self.error)?;
        if let Some(suggestion) = &self.suggestion {
            writeln!(f, "  {} {}", "help:".cyan().bold(), suggestion)?;
        }
        Ok(())
    }
}

/// Converts any resolver error into a user-friendly context with a default
/// suggestion where one is known.
pub fn user_friendly_error(error: ResolverError) -> ErrorContext {
    let suggestion = match &error {
        ResolverError::InvalidDepthRange { .. } => {
            Some("pass a max_depth of 0 (unbounded) or one >= start_depth".to_string())
        }
        ResolverError::ConfigParse(_) => {
            Some("check the [resolver] table in your config.toml for typos".to_string())
        }
        ResolverError::CacheIo(_) | ResolverError::Repository(_) | ResolverError::Io(_) => {
            Some("the resolve can still proceed live; this only affects caching".to_string())
        }
        ResolverError::CacheSerialization(_) => None,
    };
    let ctx = ErrorContext::new(error);
    match suggestion {
        Some(s) => ctx.with_suggestion(s),
        None => ctx,
    }
}
