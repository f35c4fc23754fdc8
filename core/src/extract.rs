//! Entity extractors: pure Record → row projections.
//!
//! Each function returns the dedup key (for keyed entities) and the
//! column values in the exact order declared in [`crate::entity`].

use crate::entity::Row;
use crate::record::Record;

pub fn address_row(r: &Record) -> (String, Row) {
    (
        r.acct_num.clone(),
        vec![
            r.acct_num.clone(),
            r.street.clone(),
            r.zip.clone(),
            r.lat.clone(),
            r.lng.clone(),
        ],
    )
}

pub fn city_loc_row(r: &Record) -> (String, Row) {
    (
        r.zip.clone(),
        vec![
            r.zip.clone(),
            r.city.clone(),
            r.state.clone(),
            r.city_pop.clone(),
        ],
    )
}

pub fn customer_row(r: &Record) -> (String, Row) {
    (
        r.ssn.clone(),
        vec![
            r.ssn.clone(),
            r.cc_num.clone(),
            r.first.clone(),
            r.last.clone(),
            r.gender.clone(),
            r.job.clone(),
            r.dob.clone(),
            r.acct_num.clone(),
            r.profile.clone(),
        ],
    )
}

pub fn merchant_row(r: &Record) -> (String, Row) {
    (
        r.merch_id.clone(),
        vec![
            r.merch_id.clone(),
            r.merchant.clone(),
            r.merch_lat.clone(),
            r.merch_lng.clone(),
        ],
    )
}

pub fn transaction_row(r: &Record) -> Row {
    vec![
        r.cc_num.clone(),
        r.trans_num.clone(),
        r.trans_date.clone(),
        r.trans_time.clone(),
        r.unix_time.clone(),
        r.category.clone(),
        r.merch_id.clone(),
        r.amt.clone(),
        r.is_fraud.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity;
    use crate::record::FIELD_COUNT;

    fn sample() -> Record {
        let fields: Vec<String> = (0..FIELD_COUNT).map(|i| format!("f{i}")).collect();
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        Record::from_fields(&refs).unwrap()
    }

    #[test]
    fn arity_matches_entity_columns() {
        let r = sample();
        assert_eq!(address_row(&r).1.len(), entity::ADDRESS.columns.len());
        assert_eq!(city_loc_row(&r).1.len(), entity::CITY_LOC.columns.len());
        assert_eq!(customer_row(&r).1.len(), entity::CUSTOMER.columns.len());
        assert_eq!(merchant_row(&r).1.len(), entity::MERCHANT.columns.len());
        assert_eq!(transaction_row(&r).len(), entity::TRANSACTION.columns.len());
    }

    #[test]
    fn keys_sit_in_the_key_column() {
        let r = sample();
        let (key, row) = address_row(&r);
        assert_eq!(row[entity::ADDRESS.key_index().unwrap()], key);
        let (key, row) = merchant_row(&r);
        assert_eq!(row[entity::MERCHANT.key_index().unwrap()], key);
        assert_eq!(key, r.merch_id);
    }
}
