//! Conversion table resources: per-test raw-to-scaled lookup tables.
//!
//! Each table is a CSV with columns `scaled_score,lower_bound,upper_bound`,
//! one row per scaled-score bucket. Tables are loaded once at startup and
//! immutable afterwards; a missing or malformed table is fatal
//! (`DataUnavailable`).

use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::Test;
use crate::errors::{BicamsError, Result};

/// One scaled-score bucket: raw scores in `lower_bound..=upper_bound` map to
/// `scaled_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConversionRow {
    pub scaled_score: i32,
    pub lower_bound: u32,
    pub upper_bound: u32,
}

impl ConversionRow {
    pub fn contains(&self, raw_score: u32) -> bool {
        self.lower_bound <= raw_score && raw_score <= self.upper_bound
    }
}

/// Immutable raw-to-scaled conversion table for one subtest.
#[derive(Debug, Clone)]
pub struct ConversionTable {
    test: Test,
    rows: Vec<ConversionRow>,
}

impl ConversionTable {
    /// Parse a table from CSV, enforcing integrity: per-row ordered bounds,
    /// buckets sorted ascending and non-overlapping. Rejecting overlap at
    /// load time keeps first-match lookup unambiguous.
    pub fn from_reader<R: Read>(test: Test, reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for record in csv_reader.deserialize() {
            let row: ConversionRow = record.map_err(|e| {
                BicamsError::resource(
                    format!("{test} conversion table"),
                    format!("malformed row: {e}"),
                )
            })?;
            rows.push(row);
        }
        let table = Self { test, rows };
        table.check_integrity()?;
        Ok(table)
    }

    /// Load the table for `test` from `<dir>/<test>_conversion_table.csv`.
    pub fn load(test: Test, dir: &Path) -> Result<Self> {
        let path = dir.join(format!("{test}_conversion_table.csv"));
        let file = File::open(&path).map_err(|e| {
            BicamsError::data_unavailable(
                format!("{test} conversion table"),
                path.clone(),
                e.to_string(),
            )
        })?;
        let table = Self::from_reader(test, file)?;
        debug!(
            "loaded {} conversion table ({} buckets) from {}",
            test,
            table.rows.len(),
            path.display()
        );
        Ok(table)
    }

    fn check_integrity(&self) -> Result<()> {
        let resource = format!("{} conversion table", self.test);
        if self.rows.is_empty() {
            return Err(BicamsError::resource(resource, "table has no rows"));
        }
        for row in &self.rows {
            if row.lower_bound > row.upper_bound {
                return Err(BicamsError::resource(
                    resource,
                    format!(
                        "bucket for scaled score {} has inverted bounds {}..={}",
                        row.scaled_score, row.lower_bound, row.upper_bound
                    ),
                ));
            }
        }
        for pair in self.rows.windows(2) {
            if pair[1].lower_bound <= pair[0].upper_bound {
                return Err(BicamsError::resource(
                    resource,
                    format!(
                        "buckets for scaled scores {} and {} overlap or are out of order",
                        pair[0].scaled_score, pair[1].scaled_score
                    ),
                ));
            }
        }
        Ok(())
    }

    /// First-match scan in stored order. Tables are tens of rows, so a linear
    /// scan is fine; an unmatched raw score is an error, never an undefined
    /// scaled score.
    pub fn lookup(&self, raw_score: u32) -> Result<i32> {
        self.rows
            .iter()
            .find(|row| row.contains(raw_score))
            .map(|row| row.scaled_score)
            .ok_or(BicamsError::OutOfRange {
                test: self.test,
                raw_score,
            })
    }

    pub fn test(&self) -> Test {
        self.test
    }

    pub fn rows(&self) -> &[ConversionRow] {
        &self.rows
    }
}

/// Holds the three loaded conversion tables, shared read-only for the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct TableStore {
    sdmt: ConversionTable,
    bvmt: ConversionTable,
    cvlt: ConversionTable,
}

impl TableStore {
    /// Load all three tables from `dir`. Called once at startup.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            sdmt: ConversionTable::load(Test::Sdmt, dir)?,
            bvmt: ConversionTable::load(Test::Bvmt, dir)?,
            cvlt: ConversionTable::load(Test::Cvlt, dir)?,
        })
    }

    pub fn table(&self, test: Test) -> &ConversionTable {
        match test {
            Test::Sdmt => &self.sdmt,
            Test::Bvmt => &self.bvmt,
            Test::Cvlt => &self.cvlt,
        }
    }
}
