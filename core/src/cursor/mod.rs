//! cursor/mod.rs
//! Byte stream → forward-only multi-result cursor.

pub mod state;
pub mod reader;
pub mod access;

pub use state::CursorState;
pub use reader::DataCursor;
