//! Loader configuration, supplied by the host as a flat string map
//! (or as JSON via serde). Unrecognized keys are ignored; invalid
//! values are fatal at startup.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{LoadError, LoadResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Customer population size per pass.
    pub customers: u32,
    /// Span of simulated days per pass; the generator's date window
    /// advances by this much on each successive pass.
    pub days: i64,
    /// Accumulator capacity. Actual flushed batches are <= this.
    pub batch_size: usize,
    /// Percent of keyed flushes resolved as DO UPDATE, in [0, 100].
    pub update_freq: u32,
    /// Directory holding the external generator.
    pub generator_location: String,
    /// Root directory for generated data; each worker writes to its
    /// own subdirectory.
    pub data_folder: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            customers: 10,
            days: 10,
            batch_size: 128,
            update_freq: 10,
            generator_location: "./Sparkov_Data_Generation".to_string(),
            data_folder: "./data/generated".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Build from host-supplied key/value args, falling back to
    /// defaults for anything absent.
    pub fn from_map(args: &HashMap<String, String>) -> LoadResult<Self> {
        let mut cfg = Self::default();
        if let Some(v) = args.get("customers") {
            cfg.customers = parse(v, "customers")?;
        }
        if let Some(v) = args.get("days") {
            cfg.days = parse(v, "days")?;
        }
        if let Some(v) = args.get("batch_size") {
            cfg.batch_size = parse(v, "batch_size")?;
        }
        if let Some(v) = args.get("update_freq") {
            cfg.update_freq = parse(v, "update_freq")?;
        }
        if let Some(v) = args.get("generator_location") {
            cfg.generator_location = v.clone();
        }
        if let Some(v) = args.get("data_folder") {
            cfg.data_folder = v.clone();
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fatal-at-startup checks; call after deserializing too.
    pub fn validate(&self) -> LoadResult<()> {
        if self.batch_size < 1 {
            return Err(LoadError::Config {
                key: "batch_size",
                value: self.batch_size.to_string(),
            });
        }
        if self.update_freq > 100 {
            return Err(LoadError::Config {
                key: "update_freq",
                value: self.update_freq.to_string(),
            });
        }
        if self.days < 1 {
            return Err(LoadError::Config {
                key: "days",
                value: self.days.to_string(),
            });
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> LoadResult<T> {
    value.trim().parse().map_err(|_| LoadError::Config {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = LoaderConfig::from_map(&HashMap::new()).unwrap();
        assert_eq!(cfg.customers, 10);
        assert_eq!(cfg.days, 10);
        assert_eq!(cfg.batch_size, 128);
        assert_eq!(cfg.update_freq, 10);
    }

    #[test]
    fn overrides_and_unknown_keys() {
        let cfg = LoaderConfig::from_map(&map(&[
            ("batch_size", "3"),
            ("update_freq", "100"),
            ("ignored_key", "whatever"),
        ]))
        .unwrap();
        assert_eq!(cfg.batch_size, 3);
        assert_eq!(cfg.update_freq, 100);
    }

    #[test]
    fn deserializes_from_host_json() {
        let cfg: LoaderConfig =
            serde_json::from_str(r#"{"customers": 25, "batch_size": 3, "unknown_key": 1}"#)
                .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.customers, 25);
        assert_eq!(cfg.batch_size, 3);
        assert_eq!(cfg.days, 10, "absent keys fall back to defaults");
    }

    #[test]
    fn bad_values_are_fatal() {
        assert!(LoaderConfig::from_map(&map(&[("customers", "ten")])).is_err());
        assert!(LoaderConfig::from_map(&map(&[("batch_size", "0")])).is_err());
        assert!(LoaderConfig::from_map(&map(&[("update_freq", "101")])).is_err());
    }
}
