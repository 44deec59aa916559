//! io.rs
//! Normalized stream endpoints for the top-level API.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::types::DataError;

/// Where an encoded stream is read from.
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Where an encoded stream is written to. `Memory` output is captured and handed back.
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Shared handle to captured memory output.
pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>, DataError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(io::BufReader::new(std::fs::File::open(p)?)),
        InputSource::Memory(b) => Box::new(io::Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize the sink into a boxed writer, plus the capture buffer for `Memory`.
pub fn open_output(sink: OutputSink) -> Result<(Box<dyn Write + Send>, Option<SharedBuffer>), DataError> {
    match sink {
        OutputSink::Writer(w) => Ok((w, None)),
        OutputSink::File(p) => Ok((Box::new(io::BufWriter::new(std::fs::File::create(p)?)), None)),
        OutputSink::Memory => {
            let buf: SharedBuffer = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBufferWriter { buf: buf.clone() };
            Ok((Box::new(writer), Some(buf)))
        }
    }
}

/// Copy the captured bytes out of a shared buffer.
pub fn take_buffer(buf: &SharedBuffer) -> Result<Vec<u8>, DataError> {
    let guard = buf.lock().map_err(|_| poisoned())?;
    Ok(guard.clone())
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "output buffer lock poisoned")
}

pub struct SharedBufferWriter {
    buf: SharedBuffer,
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self.buf.lock().map_err(|_| poisoned())?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
