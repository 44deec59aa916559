//! registry/mod.rs
//! Fixed, bidirectional column type registry.
//!
//! Notes:
//! - 15 entries, tags 0..=14, never widened at runtime.
//! - Each entry carries its encode/decode functions, so the encoder and the cursor
//!   dispatch with one table lookup instead of a branch ladder.

pub mod types;
pub mod codecs;
pub mod table;

pub use types::{DataType, RegistryError, WireKind};
pub use table::{entries, info, lookup, resolve, TypeInfo};
