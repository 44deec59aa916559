//! registry/codecs.rs
//! Per-type encode/decode functions referenced from the registry table.
//!
//! Encode functions write the field header themselves (a group start for structured
//! kinds), with the wire type taken from the entry's `WireKind`. Decode functions run
//! right after the header was read; the reader rejects a header whose wire type disagrees
//! with the value read.

use crate::registry::DataType;
use crate::types::DataError;
use crate::values::{bcl, Value};
use crate::wire::{WireReader, WireWriter};

pub type EncodeFn = fn(&mut dyn WireWriter, u32, &Value) -> Result<(), DataError>;
pub type DecodeFn = fn(&mut dyn WireReader) -> Result<Value, DataError>;

/// Header for a non-structured cell of `data_type`.
fn header(w: &mut dyn WireWriter, field: u32, data_type: DataType) -> Result<(), DataError> {
    w.write_field_header(field, data_type.wire_kind().wire_type())?;
    Ok(())
}

fn mismatch(field: u32, expected: DataType, value: &Value) -> DataError {
    DataError::TypeMismatch {
        ordinal: field.saturating_sub(1) as usize,
        expected,
        actual: value.data_type(),
    }
}

macro_rules! scalar_codec {
    ($enc:ident, $dec:ident, $variant:ident, $write:ident, $read:ident) => {
        pub(crate) fn $enc(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
            match value {
                Value::$variant(v) => {
                    header(w, field, DataType::$variant)?;
                    w.$write(*v)?;
                    Ok(())
                }
                other => Err(mismatch(field, DataType::$variant, other)),
            }
        }

        pub(crate) fn $dec(r: &mut dyn WireReader) -> Result<Value, DataError> {
            Ok(Value::$variant(r.$read()?))
        }
    };
}

scalar_codec!(encode_bool, decode_bool, Bool, write_bool, read_bool);
scalar_codec!(encode_byte, decode_byte, Byte, write_u8, read_u8);
scalar_codec!(encode_double, decode_double, Double, write_f64, read_f64);
scalar_codec!(encode_float, decode_float, Float, write_f32, read_f32);
scalar_codec!(encode_int32, decode_int32, Int32, write_i32, read_i32);
scalar_codec!(encode_int64, decode_int64, Int64, write_i64, read_i64);
scalar_codec!(encode_int16, decode_int16, Int16, write_i16, read_i16);

// --- Length-delimited ---

pub(crate) fn encode_byte_array(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    let Value::ByteArray(bytes) = value else {
        return Err(mismatch(field, DataType::ByteArray, value));
    };
    header(w, field, DataType::ByteArray)?;
    w.write_bytes(bytes)?;
    Ok(())
}

pub(crate) fn decode_byte_array(r: &mut dyn WireReader) -> Result<Value, DataError> {
    Ok(Value::ByteArray(r.read_bytes()?))
}

pub(crate) fn encode_char_array(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    let Value::CharArray(chars) = value else {
        return Err(mismatch(field, DataType::CharArray, value));
    };
    let text: String = chars.iter().collect();
    header(w, field, DataType::CharArray)?;
    w.write_str(&text)?;
    Ok(())
}

pub(crate) fn decode_char_array(r: &mut dyn WireReader) -> Result<Value, DataError> {
    Ok(Value::CharArray(r.read_string()?.chars().collect()))
}

pub(crate) fn encode_string(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    let Value::String(s) = value else {
        return Err(mismatch(field, DataType::String, value));
    };
    header(w, field, DataType::String)?;
    w.write_str(s)?;
    Ok(())
}

pub(crate) fn decode_string(r: &mut dyn WireReader) -> Result<Value, DataError> {
    Ok(Value::String(r.read_string()?))
}

// --- Char: one UTF-16 code unit ---

pub(crate) fn encode_char(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    let Value::Char(c) = value else {
        return Err(mismatch(field, DataType::Char, value));
    };
    let unit = u16::try_from(u32::from(*c)).map_err(|_| DataError::ValueOutOfRange {
        data_type: DataType::Char,
        reason: format!("U+{:04X} is outside the 16-bit range", u32::from(*c)),
    })?;
    header(w, field, DataType::Char)?;
    w.write_u16(unit)?;
    Ok(())
}

pub(crate) fn decode_char(r: &mut dyn WireReader) -> Result<Value, DataError> {
    let unit = r.read_u16()?;
    char::from_u32(unit as u32)
        .map(Value::Char)
        .ok_or_else(|| DataError::ValueOutOfRange {
            data_type: DataType::Char,
            reason: format!("lone surrogate 0x{:04X}", unit),
        })
}

// --- Nested structured ---

pub(crate) fn encode_datetime(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    match value {
        Value::DateTime(dt) => bcl::write_datetime(w, field, dt),
        other => Err(mismatch(field, DataType::DateTime, other)),
    }
}

pub(crate) fn decode_datetime(r: &mut dyn WireReader) -> Result<Value, DataError> {
    bcl::read_datetime(r).map(Value::DateTime)
}

pub(crate) fn encode_timespan(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    match value {
        Value::TimeSpan(d) => bcl::write_timespan(w, field, d),
        other => Err(mismatch(field, DataType::TimeSpan, other)),
    }
}

pub(crate) fn decode_timespan(r: &mut dyn WireReader) -> Result<Value, DataError> {
    bcl::read_timespan(r).map(Value::TimeSpan)
}

pub(crate) fn encode_decimal(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    match value {
        Value::Decimal(d) => bcl::write_decimal(w, field, d),
        other => Err(mismatch(field, DataType::Decimal, other)),
    }
}

pub(crate) fn decode_decimal(r: &mut dyn WireReader) -> Result<Value, DataError> {
    bcl::read_decimal(r).map(Value::Decimal)
}

pub(crate) fn encode_guid(w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
    match value {
        Value::Guid(g) => bcl::write_guid(w, field, g),
        other => Err(mismatch(field, DataType::Guid, other)),
    }
}

pub(crate) fn decode_guid(r: &mut dyn WireReader) -> Result<Value, DataError> {
    bcl::read_guid(r).map(Value::Guid)
}
