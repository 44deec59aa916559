//! tabwire-core
//!
//! Streaming binary codec for forward-only tabular cursors.
//! A source with one or more typed result sets is written once, front to back, and read
//! back as an equivalent forward-only cursor. Nothing is buffered beyond one row.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Codec layers
pub mod wire;
pub mod registry;
pub mod values;
pub mod schema;

pub mod source;
pub mod encoder;
pub mod cursor;
pub mod table;

pub mod telemetry;
pub mod io;
pub mod api;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{DecodeOptions, EncodeOptions};
    pub use crate::cursor::{CursorState, DataCursor};
    pub use crate::encoder::{encode, encode_to_vec, encode_with, DataEncoder};
    pub use crate::registry::DataType;
    pub use crate::schema::{Column, SchemaTable};
    pub use crate::source::{SourceColumn, TabularSource};
    pub use crate::table::{DataSet, DataTable, TableReader};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{DataError, ErrorKind};
    pub use crate::values::{Decimal, Guid, Value};
}
