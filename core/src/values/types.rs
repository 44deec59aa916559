//! values/types.rs
//! Cell values and the structured scalar types that have no std counterpart.
//!
//! Notes:
//! - `Value` is the tagged union of the 15 registrable column types; there is no null
//!   variant. A null cell is `Option::<Value>::None` everywhere in the crate.
//! - `Char` is a Rust `char` restricted to the Basic Multilingual Plane on the wire.

use std::fmt;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::registry::DataType;
use crate::types::DataError;

/// Largest magnitude a `Decimal` mantissa may carry (96 bits).
pub const DECIMAL_MAX_MANTISSA: u128 = (1u128 << 96) - 1;
/// Largest number of fractional digits.
pub const DECIMAL_MAX_SCALE: u8 = 28;

/// Fixed-point decimal: `mantissa * 10^-scale`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { mantissa: 0, scale: 0 };

    pub fn new(mantissa: i128, scale: u8) -> Result<Self, DataError> {
        if mantissa.unsigned_abs() > DECIMAL_MAX_MANTISSA {
            return Err(DataError::ValueOutOfRange {
                data_type: DataType::Decimal,
                reason: format!("mantissa {} exceeds 96 bits", mantissa),
            });
        }
        if scale > DECIMAL_MAX_SCALE {
            return Err(DataError::ValueOutOfRange {
                data_type: DataType::Decimal,
                reason: format!("scale {} > {}", scale, DECIMAL_MAX_SCALE),
            });
        }
        Ok(Self { mantissa, scale })
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int, frac)
    }
}

/// 128-bit globally unique identifier, kept as raw bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid([u8; 16]);

impl Guid {
    pub const NIL: Guid = Guid([0u8; 16]);

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Guid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; 16]
    }

    /// Split into the two little-endian halves used on the wire.
    pub fn to_halves(&self) -> (u64, u64) {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&self.0[..8]);
        hi.copy_from_slice(&self.0[8..]);
        (u64::from_le_bytes(lo), u64::from_le_bytes(hi))
    }

    pub fn from_halves(lo: u64, hi: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&lo.to_le_bytes());
        bytes[8..].copy_from_slice(&hi.to_le_bytes());
        Guid(bytes)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = hex::encode(self.0);
        write!(f, "{}-{}-{}-{}-{}", &h[0..8], &h[8..12], &h[12..16], &h[16..20], &h[20..32])
    }
}

/// One non-null cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    ByteArray(Vec<u8>),
    Char(char),
    CharArray(Vec<char>),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
    Double(f64),
    Float(f32),
    Guid(Guid),
    Int32(i32),
    Int64(i64),
    Int16(i16),
    String(String),
    TimeSpan(TimeDelta),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_)      => DataType::Bool,
            Value::Byte(_)      => DataType::Byte,
            Value::ByteArray(_) => DataType::ByteArray,
            Value::Char(_)      => DataType::Char,
            Value::CharArray(_) => DataType::CharArray,
            Value::DateTime(_)  => DataType::DateTime,
            Value::Decimal(_)   => DataType::Decimal,
            Value::Double(_)    => DataType::Double,
            Value::Float(_)     => DataType::Float,
            Value::Guid(_)      => DataType::Guid,
            Value::Int32(_)     => DataType::Int32,
            Value::Int64(_)     => DataType::Int64,
            Value::Int16(_)     => DataType::Int16,
            Value::String(_)    => DataType::String,
            Value::TimeSpan(_)  => DataType::TimeSpan,
        }
    }

    /// Zero value a typed getter returns for a null cell.
    pub fn default_for(data_type: DataType) -> Value {
        match data_type {
            DataType::Bool      => Value::Bool(false),
            DataType::Byte      => Value::Byte(0),
            DataType::ByteArray => Value::ByteArray(Vec::new()),
            DataType::Char      => Value::Char('\0'),
            DataType::CharArray => Value::CharArray(Vec::new()),
            DataType::DateTime  => Value::DateTime(NaiveDateTime::default()),
            DataType::Decimal   => Value::Decimal(Decimal::ZERO),
            DataType::Double    => Value::Double(0.0),
            DataType::Float     => Value::Float(0.0),
            DataType::Guid      => Value::Guid(Guid::NIL),
            DataType::Int32     => Value::Int32(0),
            DataType::Int64     => Value::Int64(0),
            DataType::Int16     => Value::Int16(0),
            DataType::String    => Value::String(String::new()),
            DataType::TimeSpan  => Value::TimeSpan(TimeDelta::zero()),
        }
    }

    /// Zero-length arrays, the candidates for `serialize_empty_arrays_as_null`.
    pub fn is_empty_array(&self) -> bool {
        match self {
            Value::ByteArray(b) => b.is_empty(),
            Value::CharArray(c) => c.is_empty(),
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from! {
    bool => Bool,
    u8 => Byte,
    Vec<u8> => ByteArray,
    char => Char,
    Vec<char> => CharArray,
    NaiveDateTime => DateTime,
    Decimal => Decimal,
    f64 => Double,
    f32 => Float,
    Guid => Guid,
    i32 => Int32,
    i64 => Int64,
    i16 => Int16,
    String => String,
    TimeDelta => TimeSpan,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}
