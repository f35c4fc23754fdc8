//! Pipeline driver: one pass over the record stream.
//!
//! EXECUTION ORDER (fixed, never reordered): address, city_loc,
//! customer, merchant, transaction. The order is not semantically
//! required, but a deterministic order keeps benchmark runs
//! comparable. The five accumulators are independent state machines;
//! each flushes on its own key collisions and fill level.

use crate::batch::BatchAccumulator;
use crate::config::LoaderConfig;
use crate::entity;
use crate::error::LoadResult;
use crate::extract;
use crate::record::Record;
use crate::rng::WorkerRng;
use crate::store::{LoadStore, UpsertSink};

/// Per-entity totals for one pass, in execution order.
#[derive(Debug, Clone)]
pub struct EntityTotals {
    pub entity: &'static str,
    pub flushes: u64,
    pub rows: u64,
}

#[derive(Debug, Clone)]
pub struct PassSummary {
    pub records: u64,
    pub entities: Vec<EntityTotals>,
}

pub struct Pipeline<'a> {
    sink: UpsertSink<'a>,
    address: BatchAccumulator,
    city_loc: BatchAccumulator,
    customer: BatchAccumulator,
    merchant: BatchAccumulator,
    transaction: BatchAccumulator,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a LoadStore, cfg: &LoaderConfig, rng: WorkerRng) -> Self {
        Self {
            sink: UpsertSink::new(store, rng, cfg.update_freq),
            address: BatchAccumulator::new(&entity::ADDRESS, cfg.batch_size),
            city_loc: BatchAccumulator::new(&entity::CITY_LOC, cfg.batch_size),
            customer: BatchAccumulator::new(&entity::CUSTOMER, cfg.batch_size),
            merchant: BatchAccumulator::new(&entity::MERCHANT, cfg.batch_size),
            transaction: BatchAccumulator::new(&entity::TRANSACTION, cfg.batch_size),
        }
    }

    /// Drive one pass: offer every record to all five accumulators,
    /// then drain. Stops on the first store error; buffered rows are
    /// lost, the host restarts the whole pass if it retries at all.
    pub fn run(&mut self, records: impl Iterator<Item = Record>) -> LoadResult<PassSummary> {
        let mut count: u64 = 0;
        for record in records {
            count += 1;

            let (key, row) = extract::address_row(&record);
            self.address.offer(Some(key), row, &mut self.sink)?;

            let (key, row) = extract::city_loc_row(&record);
            self.city_loc.offer(Some(key), row, &mut self.sink)?;

            let (key, row) = extract::customer_row(&record);
            self.customer.offer(Some(key), row, &mut self.sink)?;

            let (key, row) = extract::merchant_row(&record);
            self.merchant.offer(Some(key), row, &mut self.sink)?;

            let row = extract::transaction_row(&record);
            self.transaction.offer(None, row, &mut self.sink)?;
        }

        self.address.drain(&mut self.sink)?;
        self.city_loc.drain(&mut self.sink)?;
        self.customer.drain(&mut self.sink)?;
        self.merchant.drain(&mut self.sink)?;
        self.transaction.drain(&mut self.sink)?;

        Ok(PassSummary {
            records: count,
            entities: self.totals(),
        })
    }

    fn totals(&self) -> Vec<EntityTotals> {
        [
            &self.address,
            &self.city_loc,
            &self.customer,
            &self.merchant,
            &self.transaction,
        ]
        .iter()
        .map(|acc| EntityTotals {
            entity: acc.spec().table,
            flushes: acc.flush_count(),
            rows: acc.row_count(),
        })
        .collect()
    }
}
