//! V2V Environment Boundary
//!
//! This crate defines the seam between the collision-risk core and its
//! excluded collaborators (location sensor, transport backend, identity
//! storage):
//! - Identity: opaque [`AgentId`] keys, random or seed-derived
//! - Time: the [`Clock`] abstraction (wall clock vs. manual clock)
//! - Wire: the fleet-feed record format pushed by the transport
//!
//! The core itself never reads a clock or parses JSON: it takes a
//! caller-supplied `now_ms` and already-decoded records, which keeps every
//! elapsed-time comparison deterministically testable.

mod clock;
mod error;
mod feed;
mod types;

pub use clock::{Clock, ManualClock, WallClock};
pub use error::EnvError;
pub use feed::{decode_feed, encode_feed, PeerStateRecord};
pub use types::AgentId;
