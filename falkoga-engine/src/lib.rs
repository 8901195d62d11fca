//! # falkoga-engine
//!
//! Runtime core - wires the generator into the broadcast hub, batch sink,
//! relay, and aggregator, with per-dependency degradation and graceful
//! shutdown.

mod dispatch;
mod runtime;

pub use runtime::{DependencyStatus, EngineError, Runtime};

pub mod prelude {
    pub use super::{DependencyStatus, EngineError, Runtime};
}
