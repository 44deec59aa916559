//! encoder/encode.rs
//!
//! Single-pass encoder from a `TabularSource` to the framed byte stream.
//!
//! Design notes:
//! - Version and records affected are written bare, before the first result group.
//! - Each result's schema is discovered and resolved against the registry before its
//!   result group opens. An unsupported column type therefore writes nothing for it.
//! - Null cells are omitted from the record; the reader sees the field as absent.
//! - Any failure poisons the encoder. The sink may hold a partial stream.

use std::io::Write;
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::EncodeOptions;
use crate::constants::{result_fields, RECORD_FIELD, RESULT_FIELD};
use crate::registry;
use crate::schema::{write_columns, Column};
use crate::source::TabularSource;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::DataError;
use crate::wire::{ProtoWriter, WireWriter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncoderState {
    Ready,
    /// A full stream was written; only `finish`/`close` remain.
    Done,
    Failed,
    Closed,
}

/// A registry-resolved column plus where to read it in the source.
struct ColumnPlan {
    column: Column,
    source_ordinal: usize,
}

pub struct DataEncoder<W: Write> {
    writer: Option<ProtoWriter<W>>,
    options: EncodeOptions,
    state: EncoderState,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl<W: Write> DataEncoder<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Some(ProtoWriter::new(inner)),
            options: EncodeOptions::default(),
            state: EncoderState::Ready,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        }
    }

    pub fn with_options(inner: W, options: EncodeOptions) -> Result<Self, DataError> {
        options.validate()?;
        let mut encoder = Self::new(inner);
        encoder.options = options;
        Ok(encoder)
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Walk `source` to its end and write the whole stream. Callable once.
    pub fn encode<S: TabularSource + ?Sized>(&mut self, source: &mut S) -> Result<(), DataError> {
        if self.state != EncoderState::Ready {
            return Err(DataError::Closed { op: "encode" });
        }
        match self.write_stream(source) {
            Ok(()) => {
                self.state = EncoderState::Done;
                self.timer.finish();
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "encode failed; encoder poisoned");
                self.state = EncoderState::Failed;
                self.timer.finish();
                Err(e)
            }
        }
    }

    /// Check the framing is balanced, flush, and return the sink.
    pub fn finish(mut self) -> Result<W, DataError> {
        let writer = self.writer.take().ok_or(DataError::Closed { op: "finish" })?;
        self.state = EncoderState::Closed;
        Ok(writer.finish()?)
    }

    /// Flush and release the sink. Idempotent.
    pub fn close(&mut self) -> Result<(), DataError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        self.state = EncoderState::Closed;
        self.timer.finish();
        debug!(bytes = writer.bytes_written(), "encoder closed");
        writer.flush()?;
        Ok(())
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        let mut counters = self.counters.clone();
        if let Some(w) = &self.writer {
            counters.set_bytes(w.bytes_written());
        }
        TelemetrySnapshot::from(&counters, &self.timer)
    }

    fn write_stream<S: TabularSource + ?Sized>(&mut self, source: &mut S) -> Result<(), DataError> {
        let Self { writer, options, counters, timer, .. } = self;
        let w = writer.as_mut().ok_or(DataError::Closed { op: "encode" })?;

        w.write_u32(options.format_version)?;
        let records_affected = source.records_affected()?;
        w.write_i64(records_affected)?;
        debug!(version = options.format_version, records_affected, "stream prelude written");

        if source.has_result() {
            let mut index = 0usize;
            loop {
                let t = Instant::now();
                let plan = discover(&*source)?;
                timer.add_stage_time(Stage::Schema, t.elapsed());

                write_result(w, source, &plan, options, counters, timer, index)?;
                index += 1;
                if !source.advance_result()? {
                    break;
                }
            }
        }

        w.write_end()?;
        w.flush()?;
        counters.set_bytes(w.bytes_written());
        Ok(())
    }
}

impl<W: Write> Drop for DataEncoder<W> {
    fn drop(&mut self) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match self.state {
            EncoderState::Failed => warn!("encoder dropped after a failure; sink holds a partial stream"),
            _ => {
                let _ = writer.flush();
            }
        }
    }
}

/// Snapshot the source's current columns, ordinals by position.
fn discover<S: TabularSource + ?Sized>(source: &S) -> Result<Vec<ColumnPlan>, DataError> {
    source
        .columns()?
        .into_iter()
        .enumerate()
        .map(|(position, sc)| {
            let info = registry::lookup(&sc.type_name)?;
            Ok(ColumnPlan {
                column: Column::new(sc.name, position, info.data_type),
                source_ordinal: sc.ordinal,
            })
        })
        .collect()
}

fn write_result<W: Write, S: TabularSource + ?Sized>(
    w: &mut ProtoWriter<W>,
    source: &mut S,
    plan: &[ColumnPlan],
    options: &EncodeOptions,
    counters: &mut TelemetryCounters,
    timer: &mut TelemetryTimer,
    index: usize,
) -> Result<(), DataError> {
    let columns: Vec<Column> = plan.iter().map(|p| p.column.clone()).collect();

    let result = w.start_group(RESULT_FIELD)?;
    write_columns(w, result_fields::COLUMNS, &columns)?;
    counters.add_result(columns.len());

    let t = Instant::now();
    let records = w.start_group(result_fields::RECORDS)?;
    let mut rows = 0u64;
    while source.advance_row()? {
        let record = w.start_group(RECORD_FIELD)?;
        let mut present = 0usize;
        for p in plan {
            let Some(value) = source.value(p.source_ordinal)? else {
                continue;
            };
            if options.serialize_empty_arrays_as_null && value.is_empty_array() {
                continue;
            }
            p.column.type_info().encode_value(w, p.column.field_number(), &value)?;
            present += 1;
        }
        w.write_end()?;
        w.end_group(record)?;
        counters.add_row(plan.len(), present);
        trace!(result = index, row = rows, present, "record written");
        rows += 1;
    }
    w.write_end()?;
    w.end_group(records)?;
    w.end_group(result)?;
    timer.add_stage_time(Stage::Rows, t.elapsed());

    debug!(result = index, columns = columns.len(), rows, "result written");
    Ok(())
}

/// Encode `source` into `out` with default options and hand the sink back.
pub fn encode<W: Write, S: TabularSource + ?Sized>(out: W, source: &mut S) -> Result<W, DataError> {
    encode_with(out, source, EncodeOptions::default())
}

pub fn encode_with<W: Write, S: TabularSource + ?Sized>(
    out: W,
    source: &mut S,
    options: EncodeOptions,
) -> Result<W, DataError> {
    let mut encoder = DataEncoder::with_options(out, options)?;
    encoder.encode(source)?;
    encoder.finish()
}

pub fn encode_to_vec<S: TabularSource + ?Sized>(source: &mut S) -> Result<Vec<u8>, DataError> {
    encode(Vec::new(), source)
}
