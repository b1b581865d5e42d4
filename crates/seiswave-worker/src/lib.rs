//! Off-main-thread worker transport.
//!
//! Heavy pipeline operations (batch filtering, export hydration, bulk
//! clears, network fetches) run on a fixed-size pool of worker tasks
//! reached through an RPC-style request/response channel:
//! - [`cancel`]: the cancellation token threaded through every call
//! - [`rpc`]: the [`WorkerPool`], its request/response protocol, and
//!   dispatch
//! - [`fetch`]: the HTTP client for filter-definition lookups

pub mod cancel;
pub mod fetch;
pub mod rpc;

pub use cancel::CancellationToken;
pub use fetch::{FetchClient, FetchError, FilterDefinitionsByUsage, FilterDefinitionsRequest};
pub use rpc::{WorkerError, WorkerPool, WorkerRequest, WorkerResponse};
