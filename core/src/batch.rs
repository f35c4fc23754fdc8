//! Per-entity batch accumulation — the heart of the loader.
//!
//! RULES:
//!   - A flushed batch for a keyed entity never contains the same key
//!     twice; a single bulk upsert cannot touch one key twice.
//!   - The duplicate rule is enforced by flushing early, not by
//!     dropping rows: a recurring key forces out the pending buffer,
//!     then starts the next one. The same key may appear in many
//!     batches over a pass.
//!   - Flushed batch sizes are therefore <= capacity, bounded below
//!     only by 1, and concatenated flushes preserve offer order.

use std::collections::HashSet;

use crate::entity::{EntitySpec, Row};
use crate::error::LoadResult;

/// Receiver for a flushed batch. The production sink applies the
/// conflict policy and executes one bulk upsert; tests record.
pub trait FlushSink {
    fn flush(&mut self, spec: &'static EntitySpec, batch: &[Row]) -> LoadResult<()>;
}

/// One entity's pending buffer plus the keys currently in it.
/// Keyed vs. unkeyed is carried by the spec, not a second type.
pub struct BatchAccumulator {
    spec: &'static EntitySpec,
    capacity: usize,
    buffer: Vec<Row>,
    seen: HashSet<String>,
    flushes: u64,
    rows: u64,
}

impl BatchAccumulator {
    /// `capacity` must be >= 1 (config validation guarantees it).
    pub fn new(spec: &'static EntitySpec, capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            spec,
            capacity,
            buffer: Vec::with_capacity(capacity),
            seen: HashSet::new(),
            flushes: 0,
            rows: 0,
        }
    }

    pub fn spec(&self) -> &'static EntitySpec {
        self.spec
    }

    /// Batches flushed so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Rows flushed so far (excludes anything still buffered).
    pub fn row_count(&self) -> u64 {
        self.rows
    }

    /// Buffer one row. For keyed entities a recurring key flushes the
    /// pending buffer first; hitting capacity flushes afterwards.
    pub fn offer(
        &mut self,
        key: Option<String>,
        row: Row,
        sink: &mut dyn FlushSink,
    ) -> LoadResult<()> {
        if let Some(key) = key {
            if self.seen.contains(&key) {
                self.flush(sink)?;
            }
            self.seen.insert(key);
        }
        self.buffer.push(row);
        if self.buffer.len() >= self.capacity {
            self.flush(sink)?;
        }
        Ok(())
    }

    /// End of stream: flush whatever is left. No-op when empty.
    pub fn drain(&mut self, sink: &mut dyn FlushSink) -> LoadResult<()> {
        self.flush(sink)
    }

    fn flush(&mut self, sink: &mut dyn FlushSink) -> LoadResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        sink.flush(self.spec, &self.buffer)?;
        self.flushes += 1;
        self.rows += self.buffer.len() as u64;
        self.buffer.clear();
        self.seen.clear();
        Ok(())
    }
}
