//! Topic-based event bus for engine events.
//!
//! Engine events are published to one of a few topics, and consumers can
//! subscribe only to the topics they need.

mod bus;

pub use bus::{BusObserver, EventBus, Topic};
