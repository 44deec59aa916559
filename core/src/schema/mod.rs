//! schema/mod.rs
//! Column/buffer model: column descriptors, the row buffer and the schema table.

pub mod column;
pub mod buffer;
pub mod table;

pub use column::{ordinal_of, read_columns, write_columns, Column};
pub use buffer::RowBuffer;
pub use table::{SchemaRow, SchemaTable};
