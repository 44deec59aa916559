//! table/data_table.rs
//! Materialized results: `DataTable` is one result, `DataSet` a whole stream.

use tracing::debug;

use crate::registry::{self, DataType};
use crate::schema::{ordinal_of, Column};
use crate::source::TabularSource;
use crate::table::reader::TableReader;
use crate::types::DataError;
use crate::values::Value;

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl DataTable {
    /// Empty table with the given `(name, type)` columns, ordinals by position.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(ordinal, (name, data_type))| Column::new(name, ordinal, data_type))
            .collect();
        Self { columns, rows: Vec::new() }
    }

    /// Append a row. Width and each non-null cell's type must match the columns.
    pub fn push_row(&mut self, row: Row) -> Result<(), DataError> {
        if row.len() != self.columns.len() {
            return Err(DataError::RowWidth { have: row.len(), width: self.columns.len() });
        }
        for (column, cell) in self.columns.iter().zip(&row) {
            if let Some(value) = cell {
                if value.data_type() != column.data_type {
                    return Err(DataError::TypeMismatch {
                        ordinal: column.ordinal,
                        expected: column.data_type,
                        actual: value.data_type(),
                    });
                }
            }
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn ordinal(&self, name: &str) -> Result<usize, DataError> {
        ordinal_of(&self.columns, name)
    }

    pub fn cell(&self, row: usize, ordinal: usize) -> Option<&Value> {
        self.rows.get(row)?.get(ordinal)?.as_ref()
    }

    /// Read every remaining row of the source's current result. The source is left on
    /// that result, rows exhausted.
    pub fn load<S: TabularSource + ?Sized>(source: &mut S) -> Result<Self, DataError> {
        let source_columns = source.columns()?;
        let mut columns = Vec::with_capacity(source_columns.len());
        for (ordinal, sc) in source_columns.iter().enumerate() {
            let info = registry::lookup(&sc.type_name)?;
            columns.push(Column::new(sc.name.clone(), ordinal, info.data_type));
        }

        let mut table = Self { columns, rows: Vec::new() };
        while source.advance_row()? {
            let row = source_columns
                .iter()
                .map(|sc| -> Result<Option<Value>, DataError> {
                    Ok(source.value(sc.ordinal)?.map(|v| v.into_owned()))
                })
                .collect::<Result<Row, DataError>>()?;
            table.push_row(row)?;
        }
        Ok(table)
    }
}

/// Every result of a stream plus its records-affected count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    pub records_affected: i64,
    tables: Vec<DataTable>,
}

impl DataSet {
    pub fn new(records_affected: i64) -> Self {
        Self { records_affected, tables: Vec::new() }
    }

    pub fn push_table(&mut self, table: DataTable) {
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[DataTable] {
        &self.tables
    }

    pub fn table(&self, index: usize) -> Option<&DataTable> {
        self.tables.get(index)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Materialize every result the source has left.
    pub fn load<S: TabularSource + ?Sized>(source: &mut S) -> Result<Self, DataError> {
        let mut set = Self::new(source.records_affected()?);
        if source.has_result() {
            loop {
                set.tables.push(DataTable::load(source)?);
                if !source.advance_result()? {
                    break;
                }
            }
        }
        debug!(tables = set.tables.len(), records_affected = set.records_affected, "data set loaded");
        Ok(set)
    }

    /// Forward-only source over the tables, in order.
    pub fn reader(&self) -> TableReader<'_> {
        TableReader::new(self)
    }
}
