//! `vt-schedule` — the building blocks every scheduling policy shares.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`reschedule`]   | `reschedule`, `reschedule_in` — next due time or disable  |
//! | [`order`]        | `OrderKey` — intra-tick ordering for the bucketed policy  |
//! | [`event_heap`]   | `EventHeap` (min-heap on time, lazily pruned)             |
//! | [`tick_buckets`] | `TickBuckets` (`BTreeMap<Tick, Vec<BucketEntry>>`)        |
//!
//! # Staleness
//!
//! Queues never hold references into the agent store, only
//! `(BehaviorId, generation)` pairs.  Every reschedule bumps the slot's
//! generation, so an entry whose generation no longer matches its slot (or
//! whose slot is now disabled) is stale and is skipped when it surfaces.

pub mod event_heap;
pub mod order;
pub mod reschedule;
pub mod tick_buckets;


pub use event_heap::EventHeap;
pub use order::OrderKey;
pub use reschedule::{reschedule, reschedule_in};
pub use tick_buckets::{BucketEntry, TickBuckets};
