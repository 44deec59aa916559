//! values/mod.rs
//! Cell values plus the nested encodings of the structured scalar types.

pub mod types;
pub mod bcl;

pub use types::*;
