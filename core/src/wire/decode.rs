//! wire/decode.rs
//!
//! Wire reader.
//!
//! Design notes:
//! - `read_field_header` returns `None` at the end of the innermost group, whether the
//!   writer closed it with an explicit `0` sentinel or went straight to the group's end
//!   marker. Both spellings decode through the same loop.
//! - An end marker seen by `read_field_header` is parked until `end_group` consumes it.
//! - Any short read is `WireError::UnexpectedEof`; the reader never seeks.

use std::io::{self, Read};
use byteorder::{LittleEndian, ReadBytesExt};

use crate::constants::{DEFAULT_MAX_GROUP_DEPTH, DEFAULT_MAX_PAYLOAD_LEN, MAX_VARINT_LEN};
use crate::wire::types::{FieldHeader, GroupToken, WireError, WireType};

/// Object-safe reader surface. Registry decode functions are written against this.
pub trait WireReader {
    /// Next header in the innermost group, or `None` at its end.
    fn read_field_header(&mut self) -> Result<Option<FieldHeader>, WireError>;

    fn read_varint(&mut self) -> Result<u64, WireError>;
    fn read_fixed32(&mut self) -> Result<u32, WireError>;
    fn read_fixed64(&mut self) -> Result<u64, WireError>;
    fn read_bytes(&mut self) -> Result<Vec<u8>, WireError>;

    /// Enter the group announced by the header just read.
    fn start_group(&mut self) -> Result<GroupToken, WireError>;
    /// Leave the group, consuming its end marker.
    fn end_group(&mut self, token: GroupToken) -> Result<(), WireError>;

    /// Discard the value announced by the header just read.
    fn skip_field(&mut self) -> Result<(), WireError>;

    fn depth(&self) -> usize;

    /// Read a header that must be the start of group `field`.
    fn open_group(&mut self, field: u32) -> Result<GroupToken, WireError> {
        match self.read_field_header()? {
            Some(h) if h.field == field && h.wire_type == WireType::StartGroup => self.start_group(),
            Some(h) if h.field == field => Err(WireError::UnexpectedWireType {
                field,
                expected: WireType::StartGroup,
                actual: h.wire_type,
            }),
            Some(h) => Err(WireError::UnexpectedField { expected: field, actual: h.field }),
            None => Err(WireError::MissingField { expected: field }),
        }
    }

    fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.read_varint()? != 0)
    }

    fn read_u8(&mut self) -> Result<u8, WireError> {
        let v = self.read_varint()?;
        u8::try_from(v).map_err(|_| WireError::ValueOverflow { value: v, target: "u8" })
    }

    fn read_u16(&mut self) -> Result<u16, WireError> {
        let v = self.read_varint()?;
        u16::try_from(v).map_err(|_| WireError::ValueOverflow { value: v, target: "u16" })
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        let v = self.read_varint()?;
        u32::try_from(v).map_err(|_| WireError::ValueOverflow { value: v, target: "u32" })
    }

    fn read_i16(&mut self) -> Result<i16, WireError> {
        let v = self.read_varint()?;
        i16::try_from(v as i64).map_err(|_| WireError::ValueOverflow { value: v, target: "i16" })
    }

    fn read_i32(&mut self) -> Result<i32, WireError> {
        let v = self.read_varint()?;
        i32::try_from(v as i64).map_err(|_| WireError::ValueOverflow { value: v, target: "i32" })
    }

    fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(self.read_varint()? as i64)
    }

    fn read_zigzag_i64(&mut self) -> Result<i64, WireError> {
        let v = self.read_varint()?;
        Ok(((v >> 1) as i64) ^ -((v & 1) as i64))
    }

    fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_bits(self.read_fixed32()?))
    }

    fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_bits(self.read_fixed64()?))
    }

    fn read_string(&mut self) -> Result<String, WireError> {
        String::from_utf8(self.read_bytes()?).map_err(|_| WireError::InvalidUtf8)
    }
}

/// Streaming reader over any `Read`.
#[derive(Debug)]
pub struct ProtoReader<R: Read> {
    inner: R,
    groups: Vec<u32>,
    current: Option<FieldHeader>,
    parked_end: Option<u32>,
    consumed: u64,
    max_payload_len: usize,
    max_depth: usize,
}

impl<R: Read> ProtoReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, DEFAULT_MAX_PAYLOAD_LEN, DEFAULT_MAX_GROUP_DEPTH)
    }

    pub fn with_limits(inner: R, max_payload_len: usize, max_depth: usize) -> Self {
        Self {
            inner,
            groups: Vec::new(),
            current: None,
            parked_end: None,
            consumed: 0,
            max_payload_len,
            max_depth,
        }
    }

    /// Bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.consumed
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), WireError> {
        self.inner.read_exact(buf).map_err(WireError::from_read)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    fn get_varint(&mut self) -> Result<u64, WireError> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let mut byte = [0u8; 1];
            self.fill(&mut byte)?;
            let b = byte[0];
            // 10th byte may only carry the top bit of a u64.
            if i == MAX_VARINT_LEN - 1 && b > 0x01 {
                return Err(WireError::VarintOverflow);
            }
            value |= ((b & 0x7F) as u64) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(WireError::VarintOverflow)
    }

    /// Consume the current header, checking it announced `wire_type`.
    fn take_current(&mut self, wire_type: WireType) -> Result<(), WireError> {
        match self.current.take() {
            Some(h) if h.wire_type == wire_type => Ok(()),
            Some(h) => Err(WireError::UnexpectedWireType {
                field: h.field,
                expected: wire_type,
                actual: h.wire_type,
            }),
            None if self.groups.is_empty() => Ok(()),
            None => Err(WireError::MissingHeader { expected: wire_type }),
        }
    }

    fn skip_exact(&mut self, len: u64) -> Result<(), WireError> {
        let copied = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        self.consumed += copied;
        if copied != len {
            return Err(WireError::UnexpectedEof);
        }
        Ok(())
    }

    fn read_len(&mut self) -> Result<usize, WireError> {
        let len = self.get_varint()?;
        if len > self.max_payload_len as u64 {
            return Err(WireError::PayloadTooLarge { have: len, max: self.max_payload_len });
        }
        Ok(len as usize)
    }
}

impl<R: Read> WireReader for ProtoReader<R> {
    fn read_field_header(&mut self) -> Result<Option<FieldHeader>, WireError> {
        if self.parked_end.is_some() {
            return Ok(None);
        }
        if let Some(h) = self.current {
            return Err(WireError::DanglingHeader { field: h.field });
        }
        let raw = self.get_varint()?;
        if raw == 0 {
            return Ok(None);
        }
        let header = FieldHeader::from_raw(raw)?;
        if header.wire_type == WireType::EndGroup {
            let top = self.groups.last().copied();
            if top != Some(header.field) {
                return Err(WireError::GroupMismatch { expected: top, actual: header.field });
            }
            self.parked_end = Some(header.field);
            return Ok(None);
        }
        self.current = Some(header);
        Ok(Some(header))
    }

    fn read_varint(&mut self) -> Result<u64, WireError> {
        self.take_current(WireType::Varint)?;
        self.get_varint()
    }

    fn read_fixed32(&mut self) -> Result<u32, WireError> {
        self.take_current(WireType::Fixed32)?;
        let v = self.inner.read_u32::<LittleEndian>().map_err(WireError::from_read)?;
        self.consumed += 4;
        Ok(v)
    }

    fn read_fixed64(&mut self) -> Result<u64, WireError> {
        self.take_current(WireType::Fixed64)?;
        let v = self.inner.read_u64::<LittleEndian>().map_err(WireError::from_read)?;
        self.consumed += 8;
        Ok(v)
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, WireError> {
        self.take_current(WireType::LengthDelimited)?;
        let len = self.read_len()?;
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn start_group(&mut self) -> Result<GroupToken, WireError> {
        let field = match self.current {
            Some(h) => h.field,
            None => return Err(WireError::MissingHeader { expected: WireType::StartGroup }),
        };
        self.take_current(WireType::StartGroup)?;
        if self.groups.len() >= self.max_depth {
            return Err(WireError::GroupTooDeep { depth: self.groups.len() + 1, max: self.max_depth });
        }
        self.groups.push(field);
        Ok(GroupToken { field, depth: self.groups.len() })
    }

    fn end_group(&mut self, token: GroupToken) -> Result<(), WireError> {
        let top = self.groups.last().copied();
        if top != Some(token.field) || self.groups.len() != token.depth {
            return Err(WireError::GroupMismatch { expected: top, actual: token.field });
        }
        if let Some(h) = self.current {
            return Err(WireError::DanglingHeader { field: h.field });
        }
        if self.parked_end.take().is_none() {
            let raw = self.get_varint()?;
            if raw == 0 {
                return Err(WireError::ExpectedEndGroup { field: token.field, found: 0 });
            }
            let found = FieldHeader::from_raw(raw)?;
            if found.field != token.field || found.wire_type != WireType::EndGroup {
                return Err(WireError::ExpectedEndGroup { field: token.field, found: found.field });
            }
        }
        self.groups.pop();
        Ok(())
    }

    fn skip_field(&mut self) -> Result<(), WireError> {
        let header = match self.current {
            Some(h) => h,
            None => return Ok(()),
        };
        match header.wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed32 => {
                self.take_current(WireType::Fixed32)?;
                self.skip_exact(4)?;
            }
            WireType::Fixed64 => {
                self.take_current(WireType::Fixed64)?;
                self.skip_exact(8)?;
            }
            WireType::LengthDelimited => {
                self.take_current(WireType::LengthDelimited)?;
                let len = self.read_len()?;
                self.skip_exact(len as u64)?;
            }
            WireType::StartGroup => {
                let token = self.start_group()?;
                while self.read_field_header()?.is_some() {
                    self.skip_field()?;
                }
                self.end_group(token)?;
            }
            // Never stored as current; end markers are parked instead.
            WireType::EndGroup => {
                return Err(WireError::GroupMismatch {
                    expected: self.groups.last().copied(),
                    actual: header.field,
                });
            }
        }
        Ok(())
    }

    fn depth(&self) -> usize {
        self.groups.len()
    }
}
