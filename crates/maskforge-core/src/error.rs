use std::error::Error as StdError;
use std::io;

use thiserror::Error;

use crate::anchor::Anchor;

/// Parameter validation failures. Always raised before anything is committed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("anchor '{anchor}' is not supported by {shape}")]
    UnsupportedAnchor { shape: &'static str, anchor: Anchor },

    #[error("unknown anchor '{0}'")]
    UnknownAnchor(String),

    #[error("unknown axis '{0}', expected 'x' or 'y'")]
    UnknownAxis(String),

    #[error("unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error("'{name}' must be a list of length {expected}, got {actual}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("'{name}' needs at least {min} entries, got {actual}")]
    TooShort {
        name: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    #[error("'{name}' must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Failures reported by a drawing sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("document is not open; call begin_document first")]
    NotOpen,

    #[error("document is already open")]
    AlreadyOpen,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("drawing backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

/// Top-level error for building a layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Two independently routed anchor points did not meet.
    #[error("{label} alignment error: error={error} (tolerance {tolerance})")]
    Alignment {
        label: String,
        error: f64,
        tolerance: f64,
    },
}
