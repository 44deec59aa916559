//! source.rs
//! The tabular source the encoder walks.
//!
//! A source is a forward-only multi-result cursor: it is positioned on a result, rows are
//! visited with `advance_row`, results with `advance_result`. Nothing is ever rewound.

use std::borrow::Cow;

use crate::registry::DataType;
use crate::types::DataError;
use crate::values::Value;

/// One column as a source reports it. `type_name` is resolved against the registry when
/// the encoder discovers the schema; unknown names are rejected there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    pub ordinal: usize,
    pub type_name: String,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, ordinal: usize, data_type: DataType) -> Self {
        Self::native(name, ordinal, data_type.name())
    }

    /// Column with a free-form native type name, which may not be registrable.
    pub fn native(name: impl Into<String>, ordinal: usize, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal,
            type_name: type_name.into(),
        }
    }
}

pub trait TabularSource {
    /// Columns of the current result.
    fn columns(&self) -> Result<Vec<SourceColumn>, DataError>;

    /// Global records-affected count, read once before any result.
    fn records_affected(&self) -> Result<i64, DataError>;

    /// False when the source holds no result at all.
    fn has_result(&self) -> bool {
        true
    }

    fn advance_row(&mut self) -> Result<bool, DataError>;

    /// Move to the next result, skipping unread rows of the current one.
    fn advance_result(&mut self) -> Result<bool, DataError>;

    /// Current row's cell, `None` when null.
    fn value(&self, ordinal: usize) -> Result<Option<Cow<'_, Value>>, DataError>;

    fn is_null(&self, ordinal: usize) -> Result<bool, DataError> {
        Ok(self.value(ordinal)?.is_none())
    }
}
