//! Claim-check sample store.
//!
//! Large sample buffers are stored once and referenced thereafter by a
//! small structured id, so they never cross task boundaries by copy:
//! - [`ClaimCheckId`] is the typed, JSON-encoded cache key
//! - [`ClaimCheckStore`] maps encoded ids to shared `f64` buffers,
//!   including in-flight (pending) computations

pub mod claim_check;
pub mod store;

pub use claim_check::{ClaimCheckError, ClaimCheckId, UNFILTERED};
pub use store::{ClaimCheckStore, SampleBuffer, StoreError};
