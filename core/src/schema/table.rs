//! schema/table.rs
//! Descriptive schema table built on demand for the active result.

use serde::{Deserialize, Serialize};

use crate::registry::{DataType, WireKind};
use crate::schema::column::Column;
use crate::types::DataError;

/// One row per column of the active result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRow {
    pub column_name: String,
    pub column_ordinal: usize,
    pub data_type: DataType,
    pub data_type_name: String,
    pub wire_kind: WireKind,
    /// Every column may carry nulls; the wire has no not-null constraint.
    pub allow_null: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaTable {
    rows: Vec<SchemaRow>,
}

impl SchemaTable {
    pub fn from_columns(columns: &[Column]) -> Self {
        let rows = columns
            .iter()
            .map(|c| SchemaRow {
                column_name: c.name.clone(),
                column_ordinal: c.ordinal,
                data_type: c.data_type,
                data_type_name: c.data_type.name().to_owned(),
                wire_kind: c.data_type.wire_kind(),
                allow_null: true,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[SchemaRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&SchemaRow> {
        self.rows.get(ordinal)
    }

    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
