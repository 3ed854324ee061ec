//! HTTP access layer: a single GET wrapper with retry/backoff.

mod client;
mod retry_policy;

pub use client::{FetchClient, FetchOutcome};
pub use retry_policy::RetryPolicy;
