//! table/reader.rs
//! Forward-only `TabularSource` over a `DataSet`.

use std::borrow::Cow;

use crate::source::{SourceColumn, TabularSource};
use crate::table::data_table::{DataSet, DataTable, Row};
use crate::types::DataError;
use crate::values::Value;

#[derive(Debug, Clone)]
pub struct TableReader<'a> {
    set: &'a DataSet,
    table: usize,
    /// Index of the current row; `None` before the first `advance_row`.
    row: Option<usize>,
}

impl<'a> TableReader<'a> {
    pub fn new(set: &'a DataSet) -> Self {
        Self { set, table: 0, row: None }
    }

    fn current_table(&self) -> Option<&'a DataTable> {
        self.set.table(self.table)
    }

    fn current_row(&self, op: &'static str) -> Result<&'a Row, DataError> {
        self.row
            .and_then(|r| self.current_table()?.rows().get(r))
            .ok_or(DataError::NoCurrentRow { op })
    }
}

impl TabularSource for TableReader<'_> {
    fn columns(&self) -> Result<Vec<SourceColumn>, DataError> {
        Ok(self
            .current_table()
            .map(|t| {
                t.columns()
                    .iter()
                    .map(|c| SourceColumn::new(c.name.clone(), c.ordinal, c.data_type))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn records_affected(&self) -> Result<i64, DataError> {
        Ok(self.set.records_affected)
    }

    fn has_result(&self) -> bool {
        self.current_table().is_some()
    }

    fn advance_row(&mut self) -> Result<bool, DataError> {
        let Some(table) = self.current_table() else {
            return Ok(false);
        };
        let next = self.row.map_or(0, |r| r + 1);
        if next < table.row_count() {
            self.row = Some(next);
            Ok(true)
        } else {
            self.row = Some(table.row_count());
            Ok(false)
        }
    }

    fn advance_result(&mut self) -> Result<bool, DataError> {
        if self.current_table().is_none() {
            return Ok(false);
        }
        self.table += 1;
        self.row = None;
        Ok(self.current_table().is_some())
    }

    fn value(&self, ordinal: usize) -> Result<Option<Cow<'_, Value>>, DataError> {
        let row = self.current_row("value")?;
        let cell = row
            .get(ordinal)
            .ok_or(DataError::IndexOutOfRange { ordinal, count: row.len() })?;
        Ok(cell.as_ref().map(Cow::Borrowed))
    }
}
