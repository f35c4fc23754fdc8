//! Static descriptions of the five target tables.
//!
//! Column order here is load-bearing: the extractors emit values in
//! this order and the store binds them positionally.

/// One buffered row: column values in [`EntitySpec::columns`] order.
pub type Row = Vec<String>;

/// Upsert target description for one entity table.
#[derive(Debug)]
pub struct EntitySpec {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    /// Dedup key column. `None` for append-only tables.
    pub key: Option<&'static str>,
}

impl EntitySpec {
    /// Index of the key column within `columns`, if keyed.
    pub fn key_index(&self) -> Option<usize> {
        self.key.and_then(|k| self.columns.iter().position(|c| *c == k))
    }
}

pub static ADDRESS: EntitySpec = EntitySpec {
    table: "address",
    columns: &["acct_num", "street", "zip", "lat", "lng"],
    key: Some("acct_num"),
};

pub static CITY_LOC: EntitySpec = EntitySpec {
    table: "city_loc",
    columns: &["zip", "city", "state", "city_pop"],
    key: Some("zip"),
};

pub static CUSTOMER: EntitySpec = EntitySpec {
    table: "customer",
    columns: &[
        "ssn", "cc_num", "first", "last", "gender", "job", "dob", "acct_num", "profile",
    ],
    key: Some("ssn"),
};

pub static MERCHANT: EntitySpec = EntitySpec {
    table: "merchant",
    columns: &["id", "merchant", "merch_lat", "merch_lng"],
    key: Some("id"),
};

pub static TRANSACTION: EntitySpec = EntitySpec {
    table: "transaction",
    columns: &[
        "cc_num",
        "trans_num",
        "trans_date",
        "trans_time",
        "unix_time",
        "category",
        "merch_id",
        "amt",
        "is_fraud",
    ],
    key: None,
};
