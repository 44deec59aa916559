//! schema/column.rs
//!
//! Column descriptors and the columns group.
//!
//! Layout:
//!
//! ```text
//! Columns := GroupStart(1) { Column(1) }* End GroupEnd
//! Column  := GroupStart(1) Name(1, text) Type(2, varint tag) GroupEnd
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{column_fields, COLUMN_FIELD};
use crate::registry::{self, DataType, TypeInfo};
use crate::types::DataError;
use crate::wire::{WireReader, WireType, WireWriter};

/// One column of the active result.
/// Invariant: `ordinal` is the column's position, and `ordinal + 1` is its field number
/// inside every record of the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ordinal: usize,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, ordinal: usize, data_type: DataType) -> Self {
        Self { name: name.into(), ordinal, data_type }
    }

    #[inline]
    pub fn field_number(&self) -> u32 {
        self.ordinal as u32 + 1
    }

    #[inline]
    pub fn type_tag(&self) -> u8 {
        self.data_type.tag()
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        registry::info(self.data_type)
    }
}

/// Exact, case-sensitive linear scan.
pub fn ordinal_of(columns: &[Column], name: &str) -> Result<usize, DataError> {
    columns
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| DataError::UnknownColumn { name: name.to_owned() })
}

/// Write the columns group as field `field` of the current result.
pub fn write_columns(w: &mut dyn WireWriter, field: u32, columns: &[Column]) -> Result<(), DataError> {
    let group = w.start_group(field)?;
    for column in columns {
        let token = w.start_group(COLUMN_FIELD)?;
        w.write_field_header(column_fields::NAME, WireType::LengthDelimited)?;
        w.write_str(&column.name)?;
        w.write_field_header(column_fields::TYPE, WireType::Varint)?;
        w.write_u32(column.type_tag() as u32)?;
        w.end_group(token)?;
    }
    w.write_end()?;
    w.end_group(group)?;
    Ok(())
}

/// Read the columns group (field `field`) into descriptors, ordinals by position.
pub fn read_columns(r: &mut dyn WireReader, field: u32) -> Result<Vec<Column>, DataError> {
    let group = r.open_group(field)?;
    let mut columns = Vec::new();
    while let Some(h) = r.read_field_header()? {
        if h.field != COLUMN_FIELD || h.wire_type != WireType::StartGroup {
            return Err(DataError::Malformed(format!(
                "unexpected field {} ({:?}) in columns group",
                h.field, h.wire_type
            )));
        }
        let token = r.start_group()?;
        let column = read_column(r, columns.len())?;
        r.end_group(token)?;
        columns.push(column);
    }
    r.end_group(group)?;
    Ok(columns)
}

fn read_column(r: &mut dyn WireReader, ordinal: usize) -> Result<Column, DataError> {
    let mut name = None;
    let mut data_type = None;
    while let Some(h) = r.read_field_header()? {
        match h.field {
            column_fields::NAME => name = Some(r.read_string()?),
            column_fields::TYPE => data_type = Some(registry::resolve(r.read_u32()?)?.data_type),
            _ => r.skip_field()?,
        }
    }
    let data_type = data_type
        .ok_or_else(|| DataError::Malformed(format!("column {} has no type tag", ordinal)))?;
    Ok(Column {
        name: name.unwrap_or_default(),
        ordinal,
        data_type,
    })
}
