//! encoder/mod.rs
//! Tabular source → byte stream.

pub mod encode;

pub use encode::{encode, encode_to_vec, encode_with, DataEncoder, EncoderState};
