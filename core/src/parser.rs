//! Record parser: walks a worker's generated data directory and
//! yields records lazily, one pass, file by file.
//!
//! Files named `customers*` are the generator's auxiliary customer
//! export and are skipped, as is anything that is not a `.csv`.
//! A malformed line is logged and skipped; it never aborts the file
//! or the pass.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::LoadResult;
use crate::record::{Record, FIELD_COUNT};

const FIELD_DELIMITER: u8 = b'|';
const AUX_FILE_PREFIX: &str = "customers";

/// Lazy, single-pass stream of records over one or more files.
pub struct RecordStream {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<csv::StringRecordsIntoIter<File>>,
    skipped: u64,
}

impl RecordStream {
    /// Stream every transactional `.csv` under `dir`. Files are taken
    /// in name order so a pass replays deterministically.
    pub fn from_dir(dir: &Path) -> LoadResult<Self> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if eligible(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self {
            files: paths.into_iter(),
            current: None,
            skipped: 0,
        })
    }

    /// Lines dropped so far (malformed or unreadable).
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn open_next(&mut self) -> Option<()> {
        loop {
            let path = self.files.next()?;
            match csv::ReaderBuilder::new()
                .delimiter(FIELD_DELIMITER)
                .has_headers(true)
                .flexible(true)
                .from_path(&path)
            {
                Ok(reader) => {
                    log::debug!("reading {}", path.display());
                    self.current = Some(reader.into_records());
                    return Some(());
                }
                Err(e) => {
                    // Unreadable file: skip it, keep the rest of the pass.
                    log::error!("skipping {}: {e}", path.display());
                    self.skipped += 1;
                }
            }
        }
    }
}

impl Iterator for RecordStream {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let Some(lines) = self.current.as_mut() else {
                self.open_next()?;
                continue;
            };
            match lines.next() {
                None => {
                    self.current = None;
                }
                Some(Err(e)) => {
                    log::warn!("skipping unreadable line: {e}");
                    self.skipped += 1;
                }
                Some(Ok(line)) => {
                    if line.len() != FIELD_COUNT {
                        log::warn!(
                            "skipping malformed line: expected {FIELD_COUNT} fields, got {}",
                            line.len()
                        );
                        self.skipped += 1;
                        continue;
                    }
                    let fields: Vec<&str> = line.iter().collect();
                    match Record::from_fields(&fields) {
                        Ok(record) => return Some(record),
                        Err(e) => {
                            log::warn!("skipping malformed line: {e}");
                            self.skipped += 1;
                        }
                    }
                }
            }
        }
    }
}

fn eligible(path: &Path) -> bool {
    let is_csv = path.extension().is_some_and(|ext| ext == "csv");
    let is_aux = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(AUX_FILE_PREFIX));
    is_csv && !is_aux
}
