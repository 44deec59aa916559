//! telemetry/counters.rs
//! Mutable counters updated while a stream is encoded or decoded.
//!
//! Converted into an immutable `TelemetrySnapshot` on demand.
use std::ops::AddAssign;
use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub results: u64,
    pub columns: u64,
    pub rows: u64,
    pub cells: u64,
    pub null_cells: u64,
    /// Rows skipped by `advance_result` without being exposed.
    pub rows_drained: u64,
    pub bytes_wire: u64,
}

impl TelemetryCounters {
    /// Record one result entered, with its column count.
    pub fn add_result(&mut self, column_count: usize) {
        self.results += 1;
        self.columns += column_count as u64;
    }

    /// Record one row; `present` cells carried a value, the rest were null.
    pub fn add_row(&mut self, width: usize, present: usize) {
        self.rows += 1;
        self.cells += width as u64;
        self.null_cells += width.saturating_sub(present) as u64;
    }

    pub fn add_drained(&mut self, rows: u64) {
        self.rows_drained += rows;
    }

    /// Overwrite with the wire position; the codec reports totals, not deltas.
    pub fn set_bytes(&mut self, total: u64) {
        self.bytes_wire = total;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.results += other.results;
        self.columns += other.columns;
        self.rows += other.rows;
        self.cells += other.cells;
        self.null_cells += other.null_cells;
        self.rows_drained += other.rows_drained;
        self.bytes_wire += other.bytes_wire;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
