//! cursor/reader.rs
//!
//! Decoder side: a forward-only multi-result cursor over the byte stream.
//!
//! Design notes:
//! - Opening reads the version, records affected and the first result's columns.
//! - Rows are decoded one record at a time into a reused `RowBuffer`; fields absent from a
//!   record are null.
//! - `advance_result` drains unread rows first; the framing cannot be skipped any other way.
//! - A navigation fault leaves the stream position unknown, so the cursor releases the
//!   stream and moves to `Closed`.

use std::io::{self, Read};
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::DecodeOptions;
use crate::constants::{result_fields, RECORD_FIELD, RESULT_FIELD};
use crate::cursor::state::CursorState;
use crate::schema::{read_columns, Column, RowBuffer, SchemaTable};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::DataError;
use crate::wire::{GroupToken, ProtoReader, WireReader, WireType};

pub struct DataCursor<R: Read> {
    pub(super) reader: Option<ProtoReader<R>>,
    pub(super) state: CursorState,
    pub(super) records_affected: i64,
    pub(super) columns: Vec<Column>,
    /// Allocated on the first record of a result, dropped when it is exhausted.
    pub(super) buffer: Option<RowBuffer>,
    pub(super) schema: Option<SchemaTable>,
    result_group: Option<GroupToken>,
    records_group: Option<GroupToken>,
    results_seen: usize,
    rows_in_result: u64,
    options: DecodeOptions,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl<R: Read> DataCursor<R> {
    pub fn open(inner: R) -> Result<Self, DataError> {
        Self::open_with(inner, DecodeOptions::default())
    }

    pub fn open_with(inner: R, options: DecodeOptions) -> Result<Self, DataError> {
        options.validate()?;
        let mut reader = ProtoReader::with_limits(inner, options.max_payload_len, options.max_group_depth);

        let version = reader.read_varint()?;
        if version != options.expected_version as u64 {
            return Err(DataError::VersionMismatch { have: version, need: options.expected_version });
        }
        let records_affected = reader.read_i64()?;
        debug!(version, records_affected, "cursor opened");

        let mut cursor = Self {
            reader: Some(reader),
            state: CursorState::StreamExhausted,
            records_affected,
            columns: Vec::new(),
            buffer: None,
            schema: None,
            result_group: None,
            records_group: None,
            results_seen: 0,
            rows_in_result: 0,
            options,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        };
        cursor.enter_result()?;
        Ok(cursor)
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Decode the next record of the active result. False once the result has no more rows.
    pub fn advance_row(&mut self) -> Result<bool, DataError> {
        self.ensure_open("advance_row")?;
        match self.state {
            CursorState::ResultExhausted | CursorState::StreamExhausted => return Ok(false),
            _ => {}
        }
        let t = Instant::now();
        let res = self.read_record();
        self.timer.add_stage_time(Stage::Rows, t.elapsed());
        self.guard(res)
    }

    /// Skip what is left of the active result and enter the next one.
    pub fn advance_result(&mut self) -> Result<bool, DataError> {
        self.ensure_open("advance_result")?;
        let res = self.next_result();
        self.guard(res)
    }

    /// Release the stream. Idempotent.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        self.release();
        debug!(results = self.results_seen, "cursor closed");
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        let mut counters = self.counters.clone();
        if let Some(r) = &self.reader {
            counters.set_bytes(r.bytes_read());
        }
        TelemetrySnapshot::from(&counters, &self.timer)
    }

    pub(super) fn ensure_open(&self, op: &'static str) -> Result<(), DataError> {
        if self.state == CursorState::Closed {
            return Err(DataError::Closed { op });
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(r) = self.reader.take() {
            self.counters.set_bytes(r.bytes_read());
        }
        self.state = CursorState::Closed;
        self.buffer = None;
        self.schema = None;
        self.columns.clear();
        self.result_group = None;
        self.records_group = None;
        self.timer.finish();
    }

    /// Navigation faults are fatal: the stream is released.
    fn guard<T>(&mut self, res: Result<T, DataError>) -> Result<T, DataError> {
        if let Err(e) = &res {
            warn!(error = %e, result = self.results_seen, "cursor faulted; stream released");
            self.release();
        }
        res
    }

    fn reader_mut(&mut self) -> Result<&mut ProtoReader<R>, DataError> {
        self.reader.as_mut().ok_or(DataError::Closed { op: "read" })
    }

    /// Read the next top-level header: a result group, or the end sentinel.
    fn enter_result(&mut self) -> Result<bool, DataError> {
        let t = Instant::now();
        let reader = self.reader.as_mut().ok_or(DataError::Closed { op: "advance_result" })?;
        let header = match reader.read_field_header()? {
            None => {
                self.state = CursorState::StreamExhausted;
                debug!(results = self.results_seen, "stream exhausted");
                return Ok(false);
            }
            Some(h) => h,
        };
        if header.field != RESULT_FIELD || header.wire_type != WireType::StartGroup {
            return Err(DataError::Malformed(format!(
                "expected result group, found field {} ({:?})",
                header.field, header.wire_type
            )));
        }

        let result = reader.start_group()?;
        let columns = read_columns(reader, result_fields::COLUMNS)?;
        let records = reader.open_group(result_fields::RECORDS)?;

        self.counters.add_result(columns.len());
        self.timer.add_stage_time(Stage::Schema, t.elapsed());
        debug!(result = self.results_seen, columns = columns.len(), "result entered");

        self.columns = columns;
        self.result_group = Some(result);
        self.records_group = Some(records);
        self.results_seen += 1;
        self.rows_in_result = 0;
        self.state = CursorState::AtResultStart;
        Ok(true)
    }

    fn read_record(&mut self) -> Result<bool, DataError> {
        let reader = self.reader.as_mut().ok_or(DataError::Closed { op: "advance_row" })?;
        let header = match reader.read_field_header()? {
            None => {
                self.close_result()?;
                return Ok(false);
            }
            Some(h) => h,
        };
        if header.field != RECORD_FIELD || header.wire_type != WireType::StartGroup {
            return Err(DataError::Malformed(format!(
                "expected record group, found field {} ({:?})",
                header.field, header.wire_type
            )));
        }

        let record = reader.start_group()?;
        let width = self.columns.len();
        let buffer = self.buffer.get_or_insert_with(|| RowBuffer::new(width));
        buffer.reset(width);
        let mut present = 0usize;
        while let Some(field) = reader.read_field_header()? {
            let ordinal = field.field as usize - 1;
            let column = self.columns.get(ordinal).ok_or_else(|| {
                DataError::Malformed(format!("record field {} beyond {} column(s)", field.field, width))
            })?;
            let value = column.type_info().decode_value(reader)?;
            buffer.set(ordinal, value)?;
            present += 1;
        }
        reader.end_group(record)?;

        self.counters.add_row(width, present);
        trace!(result = self.results_seen - 1, row = self.rows_in_result, present, "record read");
        self.rows_in_result += 1;
        self.state = CursorState::InRow;
        Ok(true)
    }

    /// Consume the end of the records and result groups.
    fn close_result(&mut self) -> Result<(), DataError> {
        let records = self.records_group.take();
        let result = self.result_group.take();
        let reader = self.reader_mut()?;
        match (records, result) {
            (Some(records), Some(result)) => {
                reader.end_group(records)?;
                // Result may close with an explicit sentinel; later fields are skipped.
                while reader.read_field_header()?.is_some() {
                    reader.skip_field()?;
                }
                reader.end_group(result)?;
            }
            _ => return Err(DataError::Malformed("records group is not open".into())),
        }
        self.buffer = None;
        self.state = CursorState::ResultExhausted;
        debug!(result = self.results_seen - 1, rows = self.rows_in_result, "result exhausted");
        Ok(())
    }

    fn next_result(&mut self) -> Result<bool, DataError> {
        if self.state == CursorState::StreamExhausted {
            return Ok(false);
        }
        let t = Instant::now();
        let mut drained = 0u64;
        while self.state != CursorState::ResultExhausted {
            if self.read_record()? {
                drained += 1;
            }
        }
        if drained > 0 {
            self.counters.add_drained(drained);
            debug!(result = self.results_seen - 1, drained, "unread rows skipped");
        }
        self.timer.add_stage_time(Stage::Drain, t.elapsed());

        self.columns.clear();
        self.schema = None;
        self.enter_result()
    }
}

impl DataCursor<io::Cursor<Vec<u8>>> {
    /// Cursor over an in-memory stream.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, DataError> {
        Self::open(io::Cursor::new(bytes.into()))
    }
}

impl<R: Read> Drop for DataCursor<R> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<R: Read> std::fmt::Debug for DataCursor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCursor")
            .field("state", &self.state)
            .field("records_affected", &self.records_affected)
            .field("columns", &self.columns)
            .field("results_seen", &self.results_seen)
            .finish()
    }
}
