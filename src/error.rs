//! Error types for the perch-glider crate.

use std::path::PathBuf;

/// Failures while loading or validating physical parameters and limits.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The path does not resolve to a readable document.
    #[error("cannot read parameter document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse parameter document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Decision-vector and residual-buffer sizing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("decision vector length {len} is not a multiple of 8")]
    Misaligned { len: usize },

    #[error("{what} buffer holds {got} entries, layout needs {expected}")]
    BufferSize {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Failures building an initial guess.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuessError {
    #[error("a guess needs at least one knot")]
    NoKnots,

    #[error("maneuver duration must be positive, got {0}")]
    NonPositiveDuration(f64),
}

/// Failures raised by an NLP backend before or while searching.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("initial point has {got} entries, problem expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

/// Top-level error of the optimization driver.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("physical parameters have not been loaded")]
    ParametersMissing,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}
