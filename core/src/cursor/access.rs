//! cursor/access.rs
//! Schema and row accessors of `DataCursor`, and its `TabularSource` view.
//!
//! Notes:
//! - Every accessor fails with `Closed` once the cursor is closed.
//! - Schema accessors work whenever a result is active; row accessors also need a
//!   decoded row (`NoCurrentRow` otherwise), then a valid ordinal.
//! - Typed getters return the type's zero value for a null cell and fail with
//!   `TypeMismatch` when the column has another type.

use std::borrow::Cow;
use std::io::Read;
use chrono::{NaiveDateTime, TimeDelta};

use crate::cursor::reader::DataCursor;
use crate::cursor::state::CursorState;
use crate::registry::DataType;
use crate::schema::{ordinal_of, Column, RowBuffer, SchemaTable};
use crate::source::{SourceColumn, TabularSource};
use crate::types::DataError;
use crate::values::{Decimal, Guid, Value};

macro_rules! copy_getter {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $t:ty, $default:expr) => {
        $(#[$doc])*
        pub fn $name(&self, ordinal: usize) -> Result<$t, DataError> {
            match self.typed(stringify!($name), ordinal, DataType::$variant)? {
                Some(Value::$variant(v)) => Ok(*v),
                _ => Ok($default),
            }
        }
    };
}

impl<R: Read> DataCursor<R> {
    pub fn records_affected(&self) -> Result<i64, DataError> {
        self.ensure_open("records_affected")?;
        Ok(self.records_affected)
    }

    /// Column count of the active result; 0 once the stream is exhausted.
    pub fn field_count(&self) -> Result<usize, DataError> {
        self.ensure_open("field_count")?;
        Ok(self.columns.len())
    }

    pub fn columns(&self) -> Result<&[Column], DataError> {
        self.ensure_open("columns")?;
        Ok(&self.columns)
    }

    pub fn get_name(&self, ordinal: usize) -> Result<&str, DataError> {
        Ok(&self.column("get_name", ordinal)?.name)
    }

    /// Exact, case-sensitive name lookup.
    pub fn get_ordinal(&self, name: &str) -> Result<usize, DataError> {
        self.ensure_open("get_ordinal")?;
        ordinal_of(&self.columns, name)
    }

    pub fn get_data_type(&self, ordinal: usize) -> Result<DataType, DataError> {
        Ok(self.column("get_data_type", ordinal)?.data_type)
    }

    pub fn get_data_type_name(&self, ordinal: usize) -> Result<&'static str, DataError> {
        Ok(self.column("get_data_type_name", ordinal)?.data_type.name())
    }

    /// Schema table of the active result, built on first use and cached until the
    /// cursor moves to another result.
    pub fn get_schema(&mut self) -> Result<&SchemaTable, DataError> {
        self.ensure_open("get_schema")?;
        let columns = &self.columns;
        Ok(self.schema.get_or_insert_with(|| SchemaTable::from_columns(columns)))
    }

    /// Cell value, `None` for null.
    pub fn get_value(&self, ordinal: usize) -> Result<Option<&Value>, DataError> {
        let row = self.row("get_value")?;
        self.check_ordinal(ordinal)?;
        Ok(row.get(ordinal))
    }

    pub fn is_null(&self, ordinal: usize) -> Result<bool, DataError> {
        let row = self.row("is_null")?;
        self.check_ordinal(ordinal)?;
        Ok(row.is_null(ordinal))
    }

    /// Owned copy of every cell of the current row.
    pub fn get_values(&self) -> Result<Vec<Option<Value>>, DataError> {
        Ok(self.row("get_values")?.to_values())
    }

    copy_getter!(get_bool, Bool, bool, false);
    copy_getter!(get_byte, Byte, u8, 0);
    copy_getter!(get_char, Char, char, '\0');
    copy_getter!(get_date_time, DateTime, NaiveDateTime, NaiveDateTime::default());
    copy_getter!(get_decimal, Decimal, Decimal, Decimal::ZERO);
    copy_getter!(get_double, Double, f64, 0.0);
    copy_getter!(get_float, Float, f32, 0.0);
    copy_getter!(get_guid, Guid, Guid, Guid::NIL);
    copy_getter!(get_int16, Int16, i16, 0);
    copy_getter!(get_int32, Int32, i32, 0);
    copy_getter!(get_int64, Int64, i64, 0);
    copy_getter!(get_time_span, TimeSpan, TimeDelta, TimeDelta::zero());

    pub fn get_bytes(&self, ordinal: usize) -> Result<&[u8], DataError> {
        match self.typed("get_bytes", ordinal, DataType::ByteArray)? {
            Some(Value::ByteArray(v)) => Ok(v.as_slice()),
            _ => Ok(&[]),
        }
    }

    pub fn get_chars(&self, ordinal: usize) -> Result<&[char], DataError> {
        match self.typed("get_chars", ordinal, DataType::CharArray)? {
            Some(Value::CharArray(v)) => Ok(v.as_slice()),
            _ => Ok(&[]),
        }
    }

    pub fn get_string(&self, ordinal: usize) -> Result<&str, DataError> {
        match self.typed("get_string", ordinal, DataType::String)? {
            Some(Value::String(v)) => Ok(v.as_str()),
            _ => Ok(""),
        }
    }

    /// Copy bytes of a ByteArray cell starting at `offset` into `buf`.
    /// Returns the number copied; 0 past the end or for a null cell.
    pub fn read_bytes(&self, ordinal: usize, offset: usize, buf: &mut [u8]) -> Result<usize, DataError> {
        let src = self.get_bytes(ordinal)?;
        Ok(copy_chunk(src, offset, buf))
    }

    /// CharArray counterpart of `read_bytes`.
    pub fn read_chars(&self, ordinal: usize, offset: usize, buf: &mut [char]) -> Result<usize, DataError> {
        let src = self.get_chars(ordinal)?;
        Ok(copy_chunk(src, offset, buf))
    }

    fn check_ordinal(&self, ordinal: usize) -> Result<(), DataError> {
        if ordinal >= self.columns.len() {
            return Err(DataError::IndexOutOfRange { ordinal, count: self.columns.len() });
        }
        Ok(())
    }

    fn column(&self, op: &'static str, ordinal: usize) -> Result<&Column, DataError> {
        self.ensure_open(op)?;
        self.columns
            .get(ordinal)
            .ok_or(DataError::IndexOutOfRange { ordinal, count: self.columns.len() })
    }

    fn row(&self, op: &'static str) -> Result<&RowBuffer, DataError> {
        self.ensure_open(op)?;
        match (&self.buffer, self.state) {
            (Some(row), CursorState::InRow) => Ok(row),
            _ => Err(DataError::NoCurrentRow { op }),
        }
    }

    fn typed(&self, op: &'static str, ordinal: usize, expected: DataType) -> Result<Option<&Value>, DataError> {
        let row = self.row(op)?;
        self.check_ordinal(ordinal)?;
        let actual = self.columns[ordinal].data_type;
        if actual != expected {
            return Err(DataError::TypeMismatch { ordinal, expected, actual });
        }
        Ok(row.get(ordinal))
    }
}

fn copy_chunk<T: Copy>(src: &[T], offset: usize, buf: &mut [T]) -> usize {
    let Some(rest) = src.get(offset..) else {
        return 0;
    };
    let n = rest.len().min(buf.len());
    buf[..n].copy_from_slice(&rest[..n]);
    n
}

/// A decoded stream is itself a source, so it can be re-encoded without materializing it.
impl<R: Read> TabularSource for DataCursor<R> {
    fn columns(&self) -> Result<Vec<SourceColumn>, DataError> {
        Ok(DataCursor::columns(self)?
            .iter()
            .map(|c| SourceColumn::new(c.name.clone(), c.ordinal, c.data_type))
            .collect())
    }

    fn records_affected(&self) -> Result<i64, DataError> {
        DataCursor::records_affected(self)
    }

    fn has_result(&self) -> bool {
        self.state.has_result()
    }

    fn advance_row(&mut self) -> Result<bool, DataError> {
        DataCursor::advance_row(self)
    }

    fn advance_result(&mut self) -> Result<bool, DataError> {
        DataCursor::advance_result(self)
    }

    fn value(&self, ordinal: usize) -> Result<Option<Cow<'_, Value>>, DataError> {
        Ok(self.get_value(ordinal)?.map(Cow::Borrowed))
    }

    fn is_null(&self, ordinal: usize) -> Result<bool, DataError> {
        DataCursor::is_null(self, ordinal)
    }
}
