//! CSV batch input reader.
//!
//! Reads the record set as raw strings, preserving header order and column
//! presence exactly; all interpretation happens in the validator so that a
//! constraint violation can name the offending column.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::Result;

/// An unvalidated batch: header row plus data rows, as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawBatch {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_owned).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn header_order_is_preserved() {
        let batch = RawBatch::from_reader(
            indoc! {"
                education,age,sex,cvlt
                12,30,1,40
            "}
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(batch.headers, vec!["education", "age", "sex", "cvlt"]);
        assert_eq!(batch.rows, vec![vec!["12", "30", "1", "40"]]);
    }

    #[test]
    fn values_are_trimmed() {
        let batch = RawBatch::from_reader("age,sex,education,sdmt\n 30 , 1 ,12, 55\n".as_bytes())
            .unwrap();
        assert_eq!(batch.rows[0], vec!["30", "1", "12", "55"]);
    }
}
