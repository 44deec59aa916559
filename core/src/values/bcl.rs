//! values/bcl.rs
//!
//! Nested structured encodings for DateTime, TimeSpan, Decimal and Guid.
//!
//! Layout (each value is one group; zero sub-fields are omitted):
//!
//! ```text
//! DateTime / TimeSpan : 1 = value (zigzag varint), 2 = scale (varint)
//! Decimal             : 1 = lo (varint u64), 2 = hi (varint u32), 3 = sign | scale << 1
//! Guid                : 1 = lo (fixed64), 2 = hi (fixed64)
//! ```
//!
//! DateTime counts 100ns ticks from the Unix epoch, TimeSpan counts 100ns ticks.
//! Unknown sub-fields are skipped.

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use num_enum::TryFromPrimitive;

use crate::registry::DataType;
use crate::types::DataError;
use crate::values::types::{Decimal, Guid};
use crate::wire::{WireReader, WireType, WireWriter};

pub const TICKS_PER_MILLISECOND: i64 = 10_000;
pub const TICKS_PER_SECOND: i64 = 1_000 * TICKS_PER_MILLISECOND;
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

/// Unit of the `value` sub-field.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum TimeScale {
    Days         = 0,
    Hours        = 1,
    Minutes      = 2,
    Seconds      = 3,
    Milliseconds = 4,
    Ticks        = 5,
    /// `value` is +1 for the maximum, -1 for the minimum.
    MinMax       = 15,
}

impl TimeScale {
    const EXACT: [TimeScale; 5] = [
        TimeScale::Days,
        TimeScale::Hours,
        TimeScale::Minutes,
        TimeScale::Seconds,
        TimeScale::Milliseconds,
    ];

    fn ticks(self) -> i64 {
        match self {
            TimeScale::Days         => TICKS_PER_DAY,
            TimeScale::Hours        => TICKS_PER_HOUR,
            TimeScale::Minutes      => TICKS_PER_MINUTE,
            TimeScale::Seconds      => TICKS_PER_SECOND,
            TimeScale::Milliseconds => TICKS_PER_MILLISECOND,
            TimeScale::Ticks | TimeScale::MinMax => 1,
        }
    }
}

/// A point or length in ticks, or one of the type's extremes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Span {
    Ticks(i64),
    Min,
    Max,
}

/// Coarsest scale that represents `ticks` exactly.
fn coarsest(ticks: i64) -> (i64, TimeScale) {
    for scale in TimeScale::EXACT {
        let unit = scale.ticks();
        if ticks % unit == 0 {
            return (ticks / unit, scale);
        }
    }
    (ticks, TimeScale::Ticks)
}

fn write_span(w: &mut dyn WireWriter, field: u32, span: Span) -> Result<(), DataError> {
    let (value, scale) = match span {
        Span::Min => (-1, TimeScale::MinMax),
        Span::Max => (1, TimeScale::MinMax),
        Span::Ticks(t) => coarsest(t),
    };
    let token = w.start_group(field)?;
    if value != 0 {
        w.write_field_header(1, WireType::Varint)?;
        w.write_zigzag_i64(value)?;
    }
    if scale != TimeScale::Days {
        w.write_field_header(2, WireType::Varint)?;
        w.write_u32(scale as u32)?;
    }
    w.end_group(token)?;
    Ok(())
}

fn read_span(r: &mut dyn WireReader, data_type: DataType) -> Result<Span, DataError> {
    let token = r.start_group()?;
    let mut value = 0i64;
    let mut raw_scale = 0u32;
    while let Some(h) = r.read_field_header()? {
        match h.field {
            1 => value = r.read_zigzag_i64()?,
            2 => raw_scale = r.read_u32()?,
            _ => r.skip_field()?,
        }
    }
    r.end_group(token)?;

    let scale = TimeScale::try_from(raw_scale)
        .map_err(|_| DataError::Malformed(format!("{:?}: unknown time scale {}", data_type, raw_scale)))?;
    match (scale, value) {
        (TimeScale::MinMax, 1) => Ok(Span::Max),
        (TimeScale::MinMax, -1) => Ok(Span::Min),
        (TimeScale::MinMax, other) => {
            Err(DataError::Malformed(format!("{:?}: invalid min/max marker {}", data_type, other)))
        }
        (scale, value) => value
            .checked_mul(scale.ticks())
            .map(Span::Ticks)
            .ok_or_else(|| out_of_range(data_type, "tick count overflows 64 bits")),
    }
}

fn out_of_range(data_type: DataType, reason: &str) -> DataError {
    DataError::ValueOutOfRange { data_type, reason: reason.to_owned() }
}

/// Split signed ticks into whole seconds and non-negative nanoseconds.
fn split_ticks(ticks: i64) -> (i64, u32) {
    let secs = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = (ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    (secs, nanos)
}

fn join_ticks(secs: i64, sub_ticks: i64) -> Option<i64> {
    secs.checked_mul(TICKS_PER_SECOND)?.checked_add(sub_ticks)
}

// ---------------------------------------------------------------------------
// DateTime
// ---------------------------------------------------------------------------

pub fn write_datetime(w: &mut dyn WireWriter, field: u32, dt: &NaiveDateTime) -> Result<(), DataError> {
    let span = if *dt == NaiveDateTime::MIN {
        Span::Min
    } else if *dt == NaiveDateTime::MAX {
        Span::Max
    } else {
        let utc = dt.and_utc();
        let sub_ticks = utc.timestamp_subsec_nanos() as i64 / 100;
        let ticks = join_ticks(utc.timestamp(), sub_ticks)
            .ok_or_else(|| out_of_range(DataType::DateTime, "tick count overflows 64 bits"))?;
        Span::Ticks(ticks)
    };
    write_span(w, field, span)
}

pub fn read_datetime(r: &mut dyn WireReader) -> Result<NaiveDateTime, DataError> {
    match read_span(r, DataType::DateTime)? {
        Span::Min => Ok(NaiveDateTime::MIN),
        Span::Max => Ok(NaiveDateTime::MAX),
        Span::Ticks(ticks) => {
            let (secs, nanos) = split_ticks(ticks);
            DateTime::from_timestamp(secs, nanos)
                .map(|d| d.naive_utc())
                .ok_or_else(|| out_of_range(DataType::DateTime, "outside the representable calendar"))
        }
    }
}

// ---------------------------------------------------------------------------
// TimeSpan
// ---------------------------------------------------------------------------

pub fn write_timespan(w: &mut dyn WireWriter, field: u32, d: &TimeDelta) -> Result<(), DataError> {
    let span = if *d == TimeDelta::MIN {
        Span::Min
    } else if *d == TimeDelta::MAX {
        Span::Max
    } else {
        let sub_ticks = d.subsec_nanos() as i64 / 100;
        let ticks = join_ticks(d.num_seconds(), sub_ticks)
            .ok_or_else(|| out_of_range(DataType::TimeSpan, "tick count overflows 64 bits"))?;
        Span::Ticks(ticks)
    };
    write_span(w, field, span)
}

pub fn read_timespan(r: &mut dyn WireReader) -> Result<TimeDelta, DataError> {
    match read_span(r, DataType::TimeSpan)? {
        Span::Min => Ok(TimeDelta::MIN),
        Span::Max => Ok(TimeDelta::MAX),
        Span::Ticks(ticks) => {
            let (secs, nanos) = split_ticks(ticks);
            TimeDelta::new(secs, nanos)
                .ok_or_else(|| out_of_range(DataType::TimeSpan, "outside the representable range"))
        }
    }
}

// ---------------------------------------------------------------------------
// Decimal
// ---------------------------------------------------------------------------

pub fn write_decimal(w: &mut dyn WireWriter, field: u32, d: &Decimal) -> Result<(), DataError> {
    let magnitude = d.mantissa().unsigned_abs();
    let lo = magnitude as u64;
    let hi = (magnitude >> 64) as u32;
    let sign_scale = ((d.scale() as u32) << 1) | d.is_negative() as u32;

    let token = w.start_group(field)?;
    if lo != 0 {
        w.write_field_header(1, WireType::Varint)?;
        w.write_varint(lo)?;
    }
    if hi != 0 {
        w.write_field_header(2, WireType::Varint)?;
        w.write_u32(hi)?;
    }
    if sign_scale != 0 {
        w.write_field_header(3, WireType::Varint)?;
        w.write_u32(sign_scale)?;
    }
    w.end_group(token)?;
    Ok(())
}

pub fn read_decimal(r: &mut dyn WireReader) -> Result<Decimal, DataError> {
    let token = r.start_group()?;
    let mut lo = 0u64;
    let mut hi = 0u32;
    let mut sign_scale = 0u32;
    while let Some(h) = r.read_field_header()? {
        match h.field {
            1 => lo = r.read_varint()?,
            2 => hi = r.read_u32()?,
            3 => sign_scale = r.read_u32()?,
            _ => r.skip_field()?,
        }
    }
    r.end_group(token)?;

    let magnitude = ((hi as u128) << 64 | lo as u128) as i128;
    let mantissa = if sign_scale & 0x01 != 0 { -magnitude } else { magnitude };
    let scale = ((sign_scale >> 1) & 0xFF) as u8;
    Decimal::new(mantissa, scale)
}

// ---------------------------------------------------------------------------
// Guid
// ---------------------------------------------------------------------------

pub fn write_guid(w: &mut dyn WireWriter, field: u32, g: &Guid) -> Result<(), DataError> {
    let (lo, hi) = g.to_halves();
    let token = w.start_group(field)?;
    if lo != 0 {
        w.write_field_header(1, WireType::Fixed64)?;
        w.write_fixed64(lo)?;
    }
    if hi != 0 {
        w.write_field_header(2, WireType::Fixed64)?;
        w.write_fixed64(hi)?;
    }
    w.end_group(token)?;
    Ok(())
}

pub fn read_guid(r: &mut dyn WireReader) -> Result<Guid, DataError> {
    let token = r.start_group()?;
    let mut lo = 0u64;
    let mut hi = 0u64;
    while let Some(h) = r.read_field_header()? {
        match h.field {
            1 => lo = r.read_fixed64()?,
            2 => hi = r.read_fixed64()?,
            _ => r.skip_field()?,
        }
    }
    r.end_group(token)?;
    Ok(Guid::from_halves(lo, hi))
}
