//! constants.rs
//! Protocol constants shared by the encoder and the cursor.
//!
//! Notes:
//! - Field numbers are scoped to the innermost open group, so the same number
//!   is reused at different depths.
//! - Field number 0 is never a data tag; a raw `0` header is the end sentinel.

/// Stream format version written first on the wire.
pub const FORMAT_VERSION: u32 = 1;

/// Top-level field carrying one result group.
pub const RESULT_FIELD: u32 = 1;

/// Fields inside a result group.
pub mod result_fields {
    pub const COLUMNS: u32 = 1;
    pub const RECORDS: u32 = 2;
}

/// Field of each column group inside the columns group.
pub const COLUMN_FIELD: u32 = 1;

/// Fields inside a column group.
pub mod column_fields {
    pub const NAME: u32 = 1;
    pub const TYPE: u32 = 2;
}

/// Field of each record group inside the records group.
pub const RECORD_FIELD: u32 = 1;

/// Largest field number a header can carry (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Upper bound for a single length-delimited payload (64 MiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// Default bound on open group nesting.
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 16;

/// Deepest nesting the format itself produces:
/// result > records > record > structured value.
pub const MIN_GROUP_DEPTH: usize = 4;

/// Varints never exceed ten bytes for 64-bit payloads.
pub const MAX_VARINT_LEN: usize = 10;
