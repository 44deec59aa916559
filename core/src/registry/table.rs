//! registry/table.rs
//! The fixed type table and its two lookup directions.

use crate::registry::codecs::{self, DecodeFn, EncodeFn};
use crate::registry::types::{DataType, RegistryError, WireKind};
use crate::types::DataError;
use crate::values::Value;
use crate::wire::{WireReader, WireWriter};

/// One registry entry. The table is indexed by `data_type.tag()`.
pub struct TypeInfo {
    pub data_type: DataType,
    pub name: &'static str,
    pub wire_kind: WireKind,
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

impl TypeInfo {
    #[inline]
    pub fn tag(&self) -> u8 {
        self.data_type.tag()
    }

    /// Write `value` as field `field` (header included).
    #[inline]
    pub fn encode_value(&self, w: &mut dyn WireWriter, field: u32, value: &Value) -> Result<(), DataError> {
        (self.encode)(w, field, value)
    }

    /// Read the value announced by the header just read.
    #[inline]
    pub fn decode_value(&self, r: &mut dyn WireReader) -> Result<Value, DataError> {
        (self.decode)(r)
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("data_type", &self.data_type)
            .field("name", &self.name)
            .field("wire_kind", &self.wire_kind)
            .finish()
    }
}

macro_rules! entry {
    ($dt:ident, $name:literal, $kind:ident, $enc:ident, $dec:ident) => {
        TypeInfo {
            data_type: DataType::$dt,
            name: $name,
            wire_kind: WireKind::$kind,
            encode: codecs::$enc,
            decode: codecs::$dec,
        }
    };
}

static TYPE_TABLE: [TypeInfo; 15] = [
    entry!(Bool,      "Bool",      Variant,          encode_bool,       decode_bool),
    entry!(Byte,      "Byte",      Variant,          encode_byte,       decode_byte),
    entry!(ByteArray, "ByteArray", LengthDelimited,  encode_byte_array, decode_byte_array),
    entry!(Char,      "Char",      Variant,          encode_char,       decode_char),
    entry!(CharArray, "CharArray", LengthDelimited,  encode_char_array, decode_char_array),
    entry!(DateTime,  "DateTime",  NestedStructured, encode_datetime,   decode_datetime),
    entry!(Decimal,   "Decimal",   NestedStructured, encode_decimal,    decode_decimal),
    entry!(Double,    "Double",    Fixed64,          encode_double,     decode_double),
    entry!(Float,     "Float",     Fixed32,          encode_float,      decode_float),
    entry!(Guid,      "Guid",      NestedStructured, encode_guid,       decode_guid),
    entry!(Int32,     "Int32",     Variant,          encode_int32,      decode_int32),
    entry!(Int64,     "Int64",     Variant,          encode_int64,      decode_int64),
    entry!(Int16,     "Int16",     Variant,          encode_int16,      decode_int16),
    entry!(String,    "String",    LengthDelimited,  encode_string,     decode_string),
    entry!(TimeSpan,  "TimeSpan",  NestedStructured, encode_timespan,   decode_timespan),
];

/// All entries in tag order.
pub fn entries() -> &'static [TypeInfo] {
    &TYPE_TABLE
}

/// Entry for a known type. Infallible: every `DataType` has a row.
#[inline]
pub fn info(data_type: DataType) -> &'static TypeInfo {
    &TYPE_TABLE[data_type.tag() as usize]
}

/// tag → entry, used when rebuilding columns from the wire.
pub fn resolve(raw: u32) -> Result<&'static TypeInfo, RegistryError> {
    DataType::verify(raw).map(info)
}

/// native type name → entry, used when discovering source columns. Exact match.
pub fn lookup(name: &str) -> Result<&'static TypeInfo, RegistryError> {
    TYPE_TABLE
        .iter()
        .find(|info| info.name == name)
        .ok_or_else(|| RegistryError::UnknownTypeName { name: name.to_owned() })
}
