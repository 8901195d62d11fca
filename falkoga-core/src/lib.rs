//! # falkoga-core
//!
//! Foundation layer for the attack-event pipeline.
//! Built so that no single downstream consumer can stall event production
//! or delivery to the others.
//!
//! ### Key Submodules:
//! - `events`: the immutable attack-event schema, country weight table, and wire frames
//! - `hub`: concurrency-safe broadcast fan-out to live subscribers
//! - `sink`: time-batched buffer feeding a durable writer

pub mod events;
pub mod hub;
pub mod sink;

pub mod prelude {
    pub use crate::events::*;
    pub use crate::hub::*;
    pub use crate::sink::*;
}
