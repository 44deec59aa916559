//! Wire codec: varints, fixed-width values, length-delimited payloads and group framing.
//!
//! Responsibilities:
//! - Field headers and the `0` end sentinel
//! - Start/end group framing with LIFO tokens
//! - Strict wire-type checking on every value
//!
//! Non-responsibilities:
//! - Column types (see `registry`)
//! - Result/record layout (see `encoder` and `cursor`)

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{FieldHeader, GroupToken, WireError, WireType};
pub use encode::{ProtoWriter, WireWriter};
pub use decode::{ProtoReader, WireReader};
