//! telemetry/snapshot.rs
//!
//! Immutable telemetry snapshot.
//!
//! Design notes:
//! - Built from live counters and a timer; never updated afterwards.
//! - `output` carries the encoded bytes when the caller asked for a memory sink.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub results: u64,
    pub columns: u64,
    pub rows: u64,
    pub cells: u64,
    pub null_cells: u64,
    pub rows_drained: u64,
    pub bytes_wire: u64,
    /// Fraction of cells that were null, 0.0 when no cell was seen.
    pub null_ratio: f64,
    pub throughput_rows_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output: Option<Vec<u8>>,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let null_ratio = if counters.cells > 0 {
            counters.null_cells as f64 / counters.cells as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.rows as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            results: counters.results,
            columns: counters.columns,
            rows: counters.rows,
            cells: counters.cells,
            null_cells: counters.null_cells,
            rows_drained: counters.rows_drained,
            bytes_wire: counters.bytes_wire,
            null_ratio,
            throughput_rows_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
            output: None,
        }
    }

    pub fn attach_output(&mut self, bytes: Vec<u8>) {
        self.output = Some(bytes);
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Internal consistency: null cells never exceed cells, stages fit in the elapsed time.
    pub fn sanity_check(&self) -> bool {
        self.null_cells <= self.cells
            && self.null_ratio <= 1.0
            && self.total_stage_time() <= self.elapsed
    }
}
