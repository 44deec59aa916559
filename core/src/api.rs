//! api.rs
//! Stable entry points over normalized endpoints.

use std::io::Read;
use tracing::debug;

use crate::config::{DecodeOptions, EncodeOptions};
use crate::cursor::DataCursor;
use crate::encoder::DataEncoder;
use crate::io::{open_input, open_output, take_buffer, InputSource, OutputSink};
use crate::source::TabularSource;
use crate::telemetry::TelemetrySnapshot;
use crate::types::DataError;

/// Encode `source` into `output`. For `OutputSink::Memory` the encoded bytes are attached
/// to the returned snapshot.
pub fn serialize<S: TabularSource + ?Sized>(
    source: &mut S,
    output: OutputSink,
    options: EncodeOptions,
) -> Result<TelemetrySnapshot, DataError> {
    let (writer, maybe_buf) = open_output(output)?;
    let mut encoder = DataEncoder::with_options(writer, options)?;
    encoder.encode(source)?;
    let mut snapshot = encoder.telemetry();
    encoder.finish()?;

    if let Some(buf) = maybe_buf {
        snapshot.attach_output(take_buffer(&buf)?);
    }
    debug!(bytes = snapshot.bytes_wire, results = snapshot.results, rows = snapshot.rows, "serialized");
    Ok(snapshot)
}

/// Open a cursor over `input`.
pub fn deserialize(input: InputSource, options: DecodeOptions) -> Result<DataCursor<Box<dyn Read + Send>>, DataError> {
    let reader = open_input(input)?;
    DataCursor::open_with(reader, options)
}
