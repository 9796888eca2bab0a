//! News events and the append-only event store.
//!
//! - **`event`**: the stored `NewsEvent` record, its identifier and the
//!   caller-supplied `NewsDraft`.
//! - **`store`**: `EventStore`, which assigns identity and keeps the global and
//!   per-city time indices.

pub mod event;
pub mod store;

pub use event::{fold_city, EventId, NewsDraft, NewsEvent};
pub use store::EventStore;
