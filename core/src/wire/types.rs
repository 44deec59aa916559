//! wire/types.rs
//! Field headers, group tokens and wire-level errors.
//!
//! Notes:
//! - A header is a single varint: `(field << 3) | wire_type`.
//! - A raw `0` header is the end sentinel; field 0 is never a data tag.
//! - Groups are closed by an `EndGroup` header carrying the same field number.

use std::io;
use num_enum::TryFromPrimitive;

use crate::constants::MAX_FIELD_NUMBER;

/// Physical encoding family announced by a field header.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum WireType {
    Varint          = 0,
    Fixed64         = 1,
    LengthDelimited = 2,
    StartGroup      = 3,
    EndGroup        = 4,
    Fixed32         = 5,
}

impl WireType {
    pub fn verify(raw: u8) -> Result<Self, WireError> {
        WireType::try_from(raw).map_err(|_| WireError::InvalidWireType { raw })
    }
}

/// Decoded field header: the role of the next value inside the innermost group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldHeader {
    pub field: u32,
    pub wire_type: WireType,
}

impl FieldHeader {
    pub fn new(field: u32, wire_type: WireType) -> Result<Self, WireError> {
        if field == 0 || field > MAX_FIELD_NUMBER {
            return Err(WireError::InvalidFieldNumber { field: field as u64 });
        }
        Ok(Self { field, wire_type })
    }

    /// Raw varint payload for this header.
    #[inline]
    pub fn to_raw(&self) -> u64 {
        ((self.field as u64) << 3) | self.wire_type as u64
    }

    /// Parse a non-zero raw header. The zero sentinel is handled by the reader.
    pub fn from_raw(raw: u64) -> Result<Self, WireError> {
        let field = raw >> 3;
        if field == 0 || field > MAX_FIELD_NUMBER as u64 {
            return Err(WireError::InvalidFieldNumber { field });
        }
        let wire_type = WireType::verify((raw & 0x07) as u8)?;
        Ok(Self { field: field as u32, wire_type })
    }
}

/// Proof of an open group. Must be handed back to `end_group` exactly once, LIFO.
#[must_use = "every opened group must be closed with end_group"]
#[derive(Debug, PartialEq, Eq)]
pub struct GroupToken {
    pub(crate) field: u32,
    pub(crate) depth: usize,
}

impl GroupToken {
    pub fn field(&self) -> u32 {
        self.field
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("varint exceeds 64 bits")]
    VarintOverflow,

    #[error("invalid wire type: {raw}")]
    InvalidWireType { raw: u8 },

    #[error("invalid field number: {field}")]
    InvalidFieldNumber { field: u64 },

    #[error("field {field}: expected wire type {expected:?}, got {actual:?}")]
    UnexpectedWireType { field: u32, expected: WireType, actual: WireType },

    #[error("expected field {expected}, got {actual}")]
    UnexpectedField { expected: u32, actual: u32 },

    #[error("expected field {expected}, group ended")]
    MissingField { expected: u32 },

    #[error("value of wire type {expected:?} without a field header")]
    MissingHeader { expected: WireType },

    #[error("field {field} header has no value")]
    DanglingHeader { field: u32 },

    #[error("group mismatch: innermost open group is {expected:?}, got {actual}")]
    GroupMismatch { expected: Option<u32>, actual: u32 },

    #[error("end of group {field} expected, found field {found}")]
    ExpectedEndGroup { field: u32, found: u32 },

    #[error("{open} group(s) left open")]
    UnbalancedGroups { open: usize },

    #[error("group nesting too deep: {depth} > {max}")]
    GroupTooDeep { depth: usize, max: usize },

    #[error("payload too large: {have} > {max}")]
    PayloadTooLarge { have: u64, max: usize },

    #[error("text payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("value {value} does not fit {target}")]
    ValueOverflow { value: u64, target: &'static str },
}

impl WireError {
    /// Map std I/O failures so that a short read is a format fault, not an I/O fault.
    pub(crate) fn from_read(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            WireError::UnexpectedEof
        } else {
            WireError::Io(e)
        }
    }
}
