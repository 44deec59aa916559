//! registry/types.rs
//! Logical column types, wire kinds and registry errors.
use std::fmt;
use std::str::FromStr;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::utils::enum_name_or_hex;
use crate::wire::WireType;

/// Logical column type. The discriminant is the wire type tag.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum DataType {
    Bool      = 0,
    Byte      = 1,
    ByteArray = 2,
    Char      = 3,
    CharArray = 4,
    DateTime  = 5,
    Decimal   = 6,
    Double    = 7,
    Float     = 8,
    Guid      = 9,
    Int32     = 10,
    Int64     = 11,
    Int16     = 12,
    String    = 13,
    TimeSpan  = 14,
}

impl DataType {
    pub fn verify(raw: u32) -> Result<Self, RegistryError> {
        u8::try_from(raw)
            .ok()
            .and_then(|tag| DataType::try_from(tag).ok())
            .ok_or(RegistryError::UnknownTag { raw })
    }

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Registry name, also the native type name sources report.
    pub fn name(self) -> &'static str {
        crate::registry::info(self).name
    }

    pub fn wire_kind(self) -> WireKind {
        crate::registry::info(self).wire_kind
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::registry::lookup(s).map(|info| info.data_type)
    }
}

/// Physical encoding family of a column type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireKind {
    Variant,
    Fixed32,
    Fixed64,
    LengthDelimited,
    /// Decomposed into primitive sub-fields inside a group.
    NestedStructured,
}

impl WireKind {
    /// Wire type a field header announces for this kind.
    pub fn wire_type(self) -> WireType {
        match self {
            WireKind::Variant          => WireType::Varint,
            WireKind::Fixed32          => WireType::Fixed32,
            WireKind::Fixed64          => WireType::Fixed64,
            WireKind::LengthDelimited  => WireType::LengthDelimited,
            WireKind::NestedStructured => WireType::StartGroup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unsupported column type {name:?}")]
    UnknownTypeName { name: String },

    #[error("format violation: unknown type tag {}", fmt_tag(*raw))]
    UnknownTag { raw: u32 },
}

fn fmt_tag(raw: u32) -> String {
    match u8::try_from(raw) {
        Ok(tag) => enum_name_or_hex::<DataType>(tag),
        Err(_) => format!("0x{:x}", raw),
    }
}
