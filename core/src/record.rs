//! Flat denormalized transaction record, one per generator output
//! line. Fields are carried as text; the store casts on insert.

use crate::error::{LoadError, LoadResult};
use uuid::Uuid;

/// Number of fields in one generator output line (before the derived
/// merchant id is appended).
pub const FIELD_COUNT: usize = 26;

/// One flat transaction event. Field order matches the generator's
/// column order; `merch_id` is derived, not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub ssn: String,
    pub cc_num: String,
    pub first: String,
    pub last: String,
    pub gender: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub lat: String,
    pub lng: String,
    pub city_pop: String,
    pub job: String,
    pub dob: String,
    pub acct_num: String,
    pub profile: String,
    pub trans_num: String,
    pub trans_date: String,
    pub trans_time: String,
    pub unix_time: String,
    pub category: String,
    pub amt: String,
    pub is_fraud: String,
    pub merchant: String,
    pub merch_lat: String,
    pub merch_lng: String,
    /// Name-based stable id: uuid5(DNS, merchant name).
    pub merch_id: String,
}

impl Record {
    /// Build a record from one split line. The derived merchant id is
    /// appended here, the only normalization before extraction.
    pub fn from_fields(fields: &[&str]) -> LoadResult<Self> {
        if fields.len() != FIELD_COUNT {
            return Err(LoadError::Parse {
                expected: FIELD_COUNT,
                got: fields.len(),
            });
        }
        let merchant = fields[23].to_string();
        let merch_id = merchant_id(&merchant);
        Ok(Self {
            ssn: fields[0].to_string(),
            cc_num: fields[1].to_string(),
            first: fields[2].to_string(),
            last: fields[3].to_string(),
            gender: fields[4].to_string(),
            street: fields[5].to_string(),
            city: fields[6].to_string(),
            state: fields[7].to_string(),
            zip: fields[8].to_string(),
            lat: fields[9].to_string(),
            lng: fields[10].to_string(),
            city_pop: fields[11].to_string(),
            job: fields[12].to_string(),
            dob: fields[13].to_string(),
            acct_num: fields[14].to_string(),
            profile: fields[15].to_string(),
            trans_num: fields[16].to_string(),
            trans_date: fields[17].to_string(),
            trans_time: fields[18].to_string(),
            unix_time: fields[19].to_string(),
            category: fields[20].to_string(),
            amt: fields[21].to_string(),
            is_fraud: fields[22].to_string(),
            merchant,
            merch_lat: fields[24].to_string(),
            merch_lng: fields[25].to_string(),
            merch_id,
        })
    }
}

/// Deterministic merchant identifier: the same merchant name yields
/// the same id within and across runs and workers.
pub fn merchant_id(name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merchant_id_is_stable() {
        let a = merchant_id("fraud_Kirlin and Sons");
        let b = merchant_id("fraud_Kirlin and Sons");
        assert_eq!(a, b);
        assert_ne!(a, merchant_id("fraud_Sporer-Keebler"));
    }

    #[test]
    fn wrong_field_count_is_a_parse_error() {
        let err = Record::from_fields(&["a", "b", "c"]).unwrap_err();
        match err {
            LoadError::Parse { expected, got } => {
                assert_eq!(expected, FIELD_COUNT);
                assert_eq!(got, 3);
            }
            other => panic!("expected Parse error, got {other}"),
        }
    }
}
