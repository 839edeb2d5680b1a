//! Wire-event contract shared with agent workers.
//!
//! Event `type` strings are stable and must not be runtime-configurable;
//! they are what Python agents and other services key on. Timestamps are
//! Unix milliseconds.

mod codec;
mod types;

pub use codec::{decode_inbound, encode, CodecError};
pub use types::{Envelope, EventPayload};
