//! End-to-end pipeline tests against an in-memory store.

use txnload_core::config::LoaderConfig;
use txnload_core::entity;
use txnload_core::error::LoadError;
use txnload_core::pipeline::Pipeline;
use txnload_core::record::{Record, FIELD_COUNT};
use txnload_core::rng::WorkerRng;
use txnload_core::store::LoadStore;

fn rec(ssn: &str, acct: &str, zip: &str, merchant: &str, street: &str, trans: &str) -> Record {
    let mut fields: Vec<String> = (0..FIELD_COUNT).map(|i| format!("x{i}")).collect();
    fields[0] = ssn.to_string();
    fields[5] = street.to_string();
    fields[8] = zip.to_string();
    fields[14] = acct.to_string();
    fields[16] = trans.to_string();
    fields[23] = merchant.to_string();
    let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
    Record::from_fields(&refs).unwrap()
}

fn cfg(batch_size: usize, update_freq: u32) -> LoaderConfig {
    LoaderConfig {
        batch_size,
        update_freq,
        ..LoaderConfig::default()
    }
}

/// Every record lands in the transaction table; keyed tables end up
/// with one row per distinct key even when keys recur across batches.
#[test]
fn one_pass_normalizes_into_five_tables() {
    let store = LoadStore::in_memory().unwrap();
    store.migrate().unwrap();

    // acct sequence A,A,B,A — the documented early-flush trace.
    let records = vec![
        rec("s1", "A", "10001", "m1", "1 Elm St", "t1"),
        rec("s1", "A", "10001", "m1", "1 Elm St", "t2"),
        rec("s2", "B", "10002", "m2", "2 Oak St", "t3"),
        rec("s1", "A", "10001", "m1", "1 Elm St", "t4"),
    ];

    let mut pipeline = Pipeline::new(&store, &cfg(3, 0), WorkerRng::new(42, 0));
    let summary = pipeline.run(records.into_iter()).unwrap();

    assert_eq!(summary.records, 4);
    assert_eq!(store.row_count(&entity::TRANSACTION).unwrap(), 4);
    assert_eq!(store.row_count(&entity::ADDRESS).unwrap(), 2);
    assert_eq!(store.row_count(&entity::CITY_LOC).unwrap(), 2);
    assert_eq!(store.row_count(&entity::CUSTOMER).unwrap(), 2);
    assert_eq!(store.row_count(&entity::MERCHANT).unwrap(), 2);

    // Address accumulator flushed 1, 2, then the drained 1.
    let address = summary
        .entities
        .iter()
        .find(|t| t.entity == "address")
        .unwrap();
    assert_eq!(address.flushes, 3);
    assert_eq!(address.rows, 4);
}

/// update_freq = 100 forces DO UPDATE on every keyed flush: the last
/// offered attributes win.
#[test]
fn full_update_frequency_applies_latest_values() {
    let store = LoadStore::in_memory().unwrap();
    store.migrate().unwrap();

    let records = vec![
        rec("s1", "A", "10001", "m1", "1 Elm St", "t1"),
        rec("s1", "A", "10001", "m1", "9 Birch Rd", "t2"),
    ];

    let mut pipeline = Pipeline::new(&store, &cfg(8, 100), WorkerRng::new(7, 0));
    pipeline.run(records.into_iter()).unwrap();

    assert_eq!(store.row_count(&entity::ADDRESS).unwrap(), 1);
    assert_eq!(
        store
            .column_for_key(&entity::ADDRESS, "street", "A")
            .unwrap(),
        "9 Birch Rd"
    );
}

/// update_freq = 0 forces DO NOTHING: the first offered attributes
/// survive later conflicting batches.
#[test]
fn zero_update_frequency_keeps_first_values() {
    let store = LoadStore::in_memory().unwrap();
    store.migrate().unwrap();

    let records = vec![
        rec("s1", "A", "10001", "m1", "1 Elm St", "t1"),
        rec("s1", "A", "10001", "m1", "9 Birch Rd", "t2"),
    ];

    let mut pipeline = Pipeline::new(&store, &cfg(8, 0), WorkerRng::new(7, 0));
    pipeline.run(records.into_iter()).unwrap();

    assert_eq!(
        store
            .column_for_key(&entity::ADDRESS, "street", "A")
            .unwrap(),
        "1 Elm St"
    );
}

/// The five accumulators flush independently: a zip collision must
/// not force an address flush.
#[test]
fn accumulators_flush_independently() {
    let store = LoadStore::in_memory().unwrap();
    store.migrate().unwrap();

    // Same zip throughout, distinct acct_nums: city_loc flushes on
    // every record, address only at drain.
    let records = vec![
        rec("s1", "A1", "10001", "m1", "st", "t1"),
        rec("s2", "A2", "10001", "m2", "st", "t2"),
        rec("s3", "A3", "10001", "m3", "st", "t3"),
    ];

    let mut pipeline = Pipeline::new(&store, &cfg(100, 0), WorkerRng::new(1, 0));
    let summary = pipeline.run(records.into_iter()).unwrap();

    let by_name = |name: &str| {
        summary
            .entities
            .iter()
            .find(|t| t.entity == name)
            .unwrap()
            .clone()
    };
    assert_eq!(by_name("city_loc").flushes, 3);
    assert_eq!(by_name("address").flushes, 1);
    assert_eq!(store.row_count(&entity::CITY_LOC).unwrap(), 1);
    assert_eq!(store.row_count(&entity::ADDRESS).unwrap(), 3);
}

/// A failed flush stops the pass: the error surfaces with its entity
/// context and no later entity's batches reach the store.
#[test]
fn pipeline_stops_on_first_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("load.db");
    let store = LoadStore::open(path.to_str().unwrap()).unwrap();
    store.migrate().unwrap();

    // Break the second entity's table out from under the pipeline so
    // its first flush fails mid-stream.
    let side = rusqlite::Connection::open(&path).unwrap();
    side.execute_batch("DROP TABLE city_loc;").unwrap();
    drop(side);

    let records = vec![
        rec("s1", "A", "10001", "m1", "st", "t1"),
        rec("s2", "B", "10002", "m2", "st", "t2"),
    ];

    // batch_size 1: address flushes first and lands, city_loc fails.
    let mut pipeline = Pipeline::new(&store, &cfg(1, 0), WorkerRng::new(3, 0));
    let err = pipeline.run(records.into_iter()).unwrap_err();
    match err {
        LoadError::Flush { entity, rows, .. } => {
            assert_eq!(entity, "city_loc");
            assert_eq!(rows, 1);
        }
        other => panic!("expected Flush error, got {other}"),
    }

    assert_eq!(store.row_count(&entity::ADDRESS).unwrap(), 1);
    assert_eq!(store.row_count(&entity::CUSTOMER).unwrap(), 0);
    assert_eq!(store.row_count(&entity::MERCHANT).unwrap(), 0);
    assert_eq!(store.row_count(&entity::TRANSACTION).unwrap(), 0);
}

/// An empty stream drains to nothing: zero flushes everywhere.
#[test]
fn empty_stream_is_a_clean_no_op() {
    let store = LoadStore::in_memory().unwrap();
    store.migrate().unwrap();

    let mut pipeline = Pipeline::new(&store, &cfg(4, 50), WorkerRng::new(5, 0));
    let summary = pipeline.run(std::iter::empty()).unwrap();

    assert_eq!(summary.records, 0);
    for totals in &summary.entities {
        assert_eq!(totals.flushes, 0, "{} flushed", totals.entity);
    }
}
