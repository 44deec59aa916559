//! wire/encode.rs
//!
//! Wire writer.
//!
//! Design notes:
//! - Every value inside a group is preceded by exactly one field header; the header's
//!   wire type must match the value written after it.
//! - Bare values (no header) are only accepted outside any group, which is where the
//!   stream prelude (version, records affected) lives.
//! - Groups are written start-token first and closed by an end marker, so nothing is
//!   ever backpatched and the writer never buffers.

use std::io::Write;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::constants::MAX_VARINT_LEN;
use crate::wire::types::{FieldHeader, GroupToken, WireError, WireType};

/// Object-safe writer surface. Registry encode functions are written against this.
pub trait WireWriter {
    /// Announce the next value. Groups use `start_group` instead.
    fn write_field_header(&mut self, field: u32, wire_type: WireType) -> Result<(), WireError>;

    /// Write the `0` end sentinel for the innermost group (or the stream).
    fn write_end(&mut self) -> Result<(), WireError>;

    fn write_varint(&mut self, v: u64) -> Result<(), WireError>;
    fn write_fixed32(&mut self, v: u32) -> Result<(), WireError>;
    fn write_fixed64(&mut self, v: u64) -> Result<(), WireError>;
    fn write_bytes(&mut self, v: &[u8]) -> Result<(), WireError>;

    fn start_group(&mut self, field: u32) -> Result<GroupToken, WireError>;
    fn end_group(&mut self, token: GroupToken) -> Result<(), WireError>;

    /// Number of groups currently open.
    fn depth(&self) -> usize;

    fn write_bool(&mut self, v: bool) -> Result<(), WireError> {
        self.write_varint(v as u64)
    }

    fn write_u8(&mut self, v: u8) -> Result<(), WireError> {
        self.write_varint(v as u64)
    }

    fn write_u16(&mut self, v: u16) -> Result<(), WireError> {
        self.write_varint(v as u64)
    }

    fn write_u32(&mut self, v: u32) -> Result<(), WireError> {
        self.write_varint(v as u64)
    }

    // Signed integers are sign-extended two's complement.
    fn write_i16(&mut self, v: i16) -> Result<(), WireError> {
        self.write_varint(v as i64 as u64)
    }

    fn write_i32(&mut self, v: i32) -> Result<(), WireError> {
        self.write_varint(v as i64 as u64)
    }

    fn write_i64(&mut self, v: i64) -> Result<(), WireError> {
        self.write_varint(v as u64)
    }

    fn write_zigzag_i64(&mut self, v: i64) -> Result<(), WireError> {
        self.write_varint(((v << 1) ^ (v >> 63)) as u64)
    }

    fn write_f32(&mut self, v: f32) -> Result<(), WireError> {
        self.write_fixed32(v.to_bits())
    }

    fn write_f64(&mut self, v: f64) -> Result<(), WireError> {
        self.write_fixed64(v.to_bits())
    }

    fn write_str(&mut self, v: &str) -> Result<(), WireError> {
        self.write_bytes(v.as_bytes())
    }
}

/// Streaming writer over any `Write`.
#[derive(Debug)]
pub struct ProtoWriter<W: Write> {
    inner: W,
    groups: Vec<u32>,
    pending: Option<FieldHeader>,
    written: u64,
}

impl<W: Write> ProtoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            groups: Vec::new(),
            pending: None,
            written: 0,
        }
    }

    /// Bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), WireError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Check framing is balanced, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<W, WireError> {
        if let Some(h) = self.pending {
            return Err(WireError::DanglingHeader { field: h.field });
        }
        if !self.groups.is_empty() {
            return Err(WireError::UnbalancedGroups { open: self.groups.len() });
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn put_varint(&mut self, mut v: u64) -> Result<(), WireError> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let mut n = 0;
        loop {
            let byte = (v & 0x7F) as u8;
            v >>= 7;
            if v == 0 {
                buf[n] = byte;
                n += 1;
                break;
            }
            buf[n] = byte | 0x80;
            n += 1;
        }
        self.inner.write_all(&buf[..n])?;
        self.written += n as u64;
        Ok(())
    }

    fn put_header(&mut self, header: FieldHeader) -> Result<(), WireError> {
        if let Some(h) = self.pending {
            return Err(WireError::DanglingHeader { field: h.field });
        }
        self.put_varint(header.to_raw())
    }

    /// Consume the pending header, checking it announced `wire_type`.
    fn take_pending(&mut self, wire_type: WireType) -> Result<(), WireError> {
        match self.pending.take() {
            Some(h) if h.wire_type == wire_type => Ok(()),
            Some(h) => Err(WireError::UnexpectedWireType {
                field: h.field,
                expected: h.wire_type,
                actual: wire_type,
            }),
            None if self.groups.is_empty() => Ok(()),
            None => Err(WireError::MissingHeader { expected: wire_type }),
        }
    }
}

impl<W: Write> WireWriter for ProtoWriter<W> {
    fn write_field_header(&mut self, field: u32, wire_type: WireType) -> Result<(), WireError> {
        if matches!(wire_type, WireType::StartGroup | WireType::EndGroup) {
            return Err(WireError::UnexpectedWireType {
                field,
                expected: WireType::StartGroup,
                actual: wire_type,
            });
        }
        let header = FieldHeader::new(field, wire_type)?;
        self.put_header(header)?;
        self.pending = Some(header);
        Ok(())
    }

    fn write_end(&mut self) -> Result<(), WireError> {
        if let Some(h) = self.pending {
            return Err(WireError::DanglingHeader { field: h.field });
        }
        self.put_varint(0)
    }

    fn write_varint(&mut self, v: u64) -> Result<(), WireError> {
        self.take_pending(WireType::Varint)?;
        self.put_varint(v)
    }

    fn write_fixed32(&mut self, v: u32) -> Result<(), WireError> {
        self.take_pending(WireType::Fixed32)?;
        self.inner.write_u32::<LittleEndian>(v)?;
        self.written += 4;
        Ok(())
    }

    fn write_fixed64(&mut self, v: u64) -> Result<(), WireError> {
        self.take_pending(WireType::Fixed64)?;
        self.inner.write_u64::<LittleEndian>(v)?;
        self.written += 8;
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<(), WireError> {
        self.take_pending(WireType::LengthDelimited)?;
        self.put_varint(v.len() as u64)?;
        self.inner.write_all(v)?;
        self.written += v.len() as u64;
        Ok(())
    }

    fn start_group(&mut self, field: u32) -> Result<GroupToken, WireError> {
        let header = FieldHeader::new(field, WireType::StartGroup)?;
        self.put_header(header)?;
        self.groups.push(field);
        Ok(GroupToken { field, depth: self.groups.len() })
    }

    fn end_group(&mut self, token: GroupToken) -> Result<(), WireError> {
        if let Some(h) = self.pending {
            return Err(WireError::DanglingHeader { field: h.field });
        }
        let top = self.groups.last().copied();
        if top != Some(token.field) || self.groups.len() != token.depth {
            return Err(WireError::GroupMismatch { expected: top, actual: token.field });
        }
        self.groups.pop();
        self.put_varint(FieldHeader { field: token.field, wire_type: WireType::EndGroup }.to_raw())
    }

    fn depth(&self) -> usize {
        self.groups.len()
    }
}
