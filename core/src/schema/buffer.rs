//! schema/buffer.rs
//! Per-row scratch storage of the cursor.
//!
//! One slot per column, reused across rows. `None` is both "not yet read" while a
//! record is being decoded and "null" once it is complete: a field that never shows up
//! in the record stays `None`.

use crate::types::DataError;
use crate::values::Value;

#[derive(Debug, Clone, Default)]
pub struct RowBuffer {
    slots: Vec<Option<Value>>,
}

impl RowBuffer {
    pub fn new(width: usize) -> Self {
        Self { slots: vec![None; width] }
    }

    /// Clear every slot before decoding the next record.
    pub fn reset(&mut self, width: usize) {
        self.slots.clear();
        self.slots.resize(width, None);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a decoded cell. A field may appear at most once per record.
    pub fn set(&mut self, ordinal: usize, value: Value) -> Result<(), DataError> {
        let width = self.slots.len();
        let slot = self.slots.get_mut(ordinal).ok_or_else(|| {
            DataError::Malformed(format!("record field {} beyond {} column(s)", ordinal + 1, width))
        })?;
        if slot.is_some() {
            return Err(DataError::Malformed(format!("record field {} repeated", ordinal + 1)));
        }
        *slot = Some(value);
        Ok(())
    }

    #[inline]
    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.slots.get(ordinal).and_then(Option::as_ref)
    }

    #[inline]
    pub fn is_null(&self, ordinal: usize) -> bool {
        self.get(ordinal).is_none()
    }

    /// Owned copy of the row, columns in ordinal order.
    pub fn to_values(&self) -> Vec<Option<Value>> {
        self.slots.clone()
    }
}
