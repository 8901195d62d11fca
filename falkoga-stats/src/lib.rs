//! # falkoga-stats
//!
//! Rolling statistics over the event stream, served as point-in-time
//! [`StatsSnapshot`] values.
//!
//! Two variants cover the two operating modes:
//! - [`StoreAggregator`] answers from the durable store's windowed
//!   queries.
//! - [`MemoryAggregator`] keeps a bounded recent-event buffer and a
//!   decaying live-rate counter for when storage is down.

mod memory;
mod snapshot;
mod store;

pub use memory::{AggregatorHandle, MemoryAggregator};
pub use snapshot::{per_second_rate, StatsSnapshot};
pub use store::StoreAggregator;
