//! table/mod.rs
//! In-memory tables: load a stream into memory, or serve one as a source.

pub mod data_table;
pub mod reader;

pub use data_table::{DataSet, DataTable, Row};
pub use reader::TableReader;
