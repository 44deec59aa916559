//! cursor/state.rs
//! Cursor lifecycle.
//!
//! ```text
//! open ─▶ AtResultStart ─advance_row─▶ InRow ─advance_row(end)─▶ ResultExhausted
//!              │                                                      │
//!              └──────────────── advance_result ◀────────────────────┘
//!                                      │
//!                   next result ◀──────┴──────▶ StreamExhausted
//!
//! close (from any state) ─▶ Closed
//! ```

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorState {
    /// Columns of a result are known; no row read yet.
    AtResultStart,
    /// A record is decoded into the row buffer.
    InRow,
    /// The records group of the active result has ended.
    ResultExhausted,
    /// The top-level end sentinel was read.
    StreamExhausted,
    Closed,
}

impl CursorState {
    /// A result is active, whether or not its rows are used up.
    pub fn has_result(self) -> bool {
        matches!(self, CursorState::AtResultStart | CursorState::InRow | CursorState::ResultExhausted)
    }

    pub fn is_closed(self) -> bool {
        self == CursorState::Closed
    }
}
