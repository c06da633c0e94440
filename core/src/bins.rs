use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One row of the lure bin table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: u32,
    pub bin: i64,
}

/// Image to lure bin assignments, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BinTable {
    records: Vec<ImageRecord>,
}

impl BinTable {
    pub fn from_records(records: Vec<ImageRecord>) -> Result<Self, DataError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(DataError::DuplicateImage { id: record.id });
            }
        }
        Ok(Self { records })
    }

    /// Read a whitespace-delimited `<id> <bin>` table from disk.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let contents = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse table text. Blank lines and `#` comments are skipped.
    pub fn parse(contents: &str) -> Result<Self, DataError> {
        let mut records = Vec::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = index + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(DataError::Malformed {
                    line,
                    reason: format!("expected 2 columns, found {}", fields.len()),
                });
            }

            let id = parse_integral(fields[0]).ok_or_else(|| DataError::Malformed {
                line,
                reason: format!("image identifier {:?} is not an integer", fields[0]),
            })?;
            let id = u32::try_from(id).map_err(|_| DataError::Malformed {
                line,
                reason: format!("image identifier {id} is out of range"),
            })?;
            let bin = parse_integral(fields[1]).ok_or_else(|| DataError::Malformed {
                line,
                reason: format!("bin label {:?} is not an integer", fields[1]),
            })?;

            records.push(ImageRecord { id, bin });
        }

        Self::from_records(records)
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct bin labels in ascending order.
    pub fn distinct_bins(&self) -> Vec<i64> {
        let mut bins: Vec<i64> = self.records.iter().map(|record| record.bin).collect();
        bins.sort_unstable();
        bins.dedup();
        bins
    }

    /// Identifiers assigned to `bin`, in table order.
    pub fn ids_in_bin(&self, bin: i64) -> Vec<u32> {
        self.records
            .iter()
            .filter(|record| record.bin == bin)
            .map(|record| record.id)
            .collect()
    }
}

/// Accepts `12` as well as `12.0`, which numeric tools tend to write.
fn parse_integral(token: &str) -> Option<i64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }
    let value = token.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
