//! txnload-core: streaming synthetic-transaction loader.
//!
//! One pass reads flat pipe-delimited records from a generated data
//! directory and fans each record out into five entity tables via
//! batched, conflict-aware bulk upserts. The accumulators in
//! [`batch`] own the only real invariant in the system: a flushed
//! batch for a keyed entity never touches the same key twice.

pub mod batch;
pub mod config;
pub mod entity;
pub mod error;
pub mod extract;
pub mod parser;
pub mod pipeline;
pub mod policy;
pub mod record;
pub mod rng;
pub mod store;
