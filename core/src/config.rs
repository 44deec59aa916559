//! config.rs
//! Encoder and decoder options.
//!
//! Both load from JSON with every field optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_GROUP_DEPTH, DEFAULT_MAX_PAYLOAD_LEN, FORMAT_VERSION, MIN_GROUP_DEPTH};
use crate::types::DataError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Write zero-length ByteArray/CharArray cells as null.
    pub serialize_empty_arrays_as_null: bool,
    pub format_version: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            serialize_empty_arrays_as_null: false,
            format_version: FORMAT_VERSION,
        }
    }
}

impl EncodeOptions {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.format_version == 0 {
            return Err(DataError::InvalidOptions("format_version must be non-zero".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub expected_version: u32,
    /// Largest length-delimited payload accepted, in bytes.
    pub max_payload_len: usize,
    /// Deepest group nesting accepted.
    pub max_group_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            expected_version: FORMAT_VERSION,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.expected_version == 0 {
            return Err(DataError::InvalidOptions("expected_version must be non-zero".into()));
        }
        if self.max_payload_len == 0 {
            return Err(DataError::InvalidOptions("max_payload_len must be non-zero".into()));
        }
        if self.max_group_depth < MIN_GROUP_DEPTH {
            return Err(DataError::InvalidOptions(format!(
                "max_group_depth {} below the format's nesting of {}",
                self.max_group_depth, MIN_GROUP_DEPTH
            )));
        }
        Ok(())
    }
}
