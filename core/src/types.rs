//! types.rs
//! Crate-wide error type and its stable categories.

use std::io;

use crate::registry::{DataType, RegistryError};
use crate::wire::WireError;

/// Caller-facing error category. Every `DataError` maps onto exactly one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Header, nesting or version outside expectation. Fatal for the instance.
    FormatViolation,
    /// Accessor or advance after close.
    ClosedUse,
    /// Row accessor without a current row.
    NoCurrentRow,
    /// Ordinal outside `[0, field_count)` or unknown column name.
    IndexRange,
    /// Source column type with no registry entry.
    UnsupportedType,
    /// Typed getter or source value disagreeing with the column type.
    TypeMismatch,
    /// Value not representable on the wire or natively.
    ValueOutOfRange,
    /// Invalid or unparsable options.
    Config,
    /// Underlying stream failure.
    Io,
}

/// Unified codec error covering wire, registry, cursor contract and I/O faults.
/// - `From<T>` impls enable `?` across layers.
/// - `kind()` gives the stable category; messages carry the offending values.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("format violation: {0}")]
    Wire(#[from] WireError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("format violation: stream version {have}, expected {need}")]
    VersionMismatch { have: u64, need: u32 },

    #[error("format violation: {0}")]
    Malformed(String),

    #[error("{op}: instance is closed")]
    Closed { op: &'static str },

    #[error("{op}: no current row")]
    NoCurrentRow { op: &'static str },

    #[error("ordinal {ordinal} out of range (field count {count})")]
    IndexOutOfRange { ordinal: usize, count: usize },

    #[error("no column named {name:?}")]
    UnknownColumn { name: String },

    #[error("row has {have} cell(s), table has {width} column(s)")]
    RowWidth { have: usize, width: usize },

    #[error("column {ordinal}: expected {expected:?}, found {actual:?}")]
    TypeMismatch { ordinal: usize, expected: DataType, actual: DataType },

    #[error("{data_type:?} value out of range: {reason}")]
    ValueOutOfRange { data_type: DataType, reason: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("options parse error: {0}")]
    OptionsParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Wire(WireError::Io(_)) => ErrorKind::Io,
            DataError::Wire(_) => ErrorKind::FormatViolation,
            DataError::Registry(RegistryError::UnknownTypeName { .. }) => ErrorKind::UnsupportedType,
            DataError::Registry(RegistryError::UnknownTag { .. }) => ErrorKind::FormatViolation,
            DataError::VersionMismatch { .. } => ErrorKind::FormatViolation,
            DataError::Malformed(_) => ErrorKind::FormatViolation,
            DataError::Closed { .. } => ErrorKind::ClosedUse,
            DataError::NoCurrentRow { .. } => ErrorKind::NoCurrentRow,
            DataError::IndexOutOfRange { .. } => ErrorKind::IndexRange,
            DataError::UnknownColumn { .. } => ErrorKind::IndexRange,
            DataError::RowWidth { .. } => ErrorKind::IndexRange,
            DataError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            DataError::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            DataError::InvalidOptions(_) => ErrorKind::Config,
            DataError::OptionsParse(_) => ErrorKind::Config,
            DataError::Io(_) => ErrorKind::Io,
        }
    }

    /// True for faults that leave a cursor or encoder permanently unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::FormatViolation | ErrorKind::Io)
    }
}
