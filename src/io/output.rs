//! Batch result writers.
//!
//! The output table is the input table augmented with an `age^2` column
//! inserted right after `age`, then one `<test>_z` column per test present,
//! then one `<test>_imp` column per test present, in that order.

use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, Table};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::core::ZScoreResult;
use crate::errors::{BicamsError, Result};
use crate::validation::ValidatedBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Terminal,
}

pub trait BatchWriter {
    fn write_batch(
        &mut self,
        batch: &ValidatedBatch,
        results: &[Vec<ZScoreResult>],
        cutoff: f64,
    ) -> Result<()>;
}

/// Header row of the augmented output table.
pub fn output_headers(batch: &ValidatedBatch) -> Vec<String> {
    let mut headers = Vec::with_capacity(batch.headers.len() + 1 + 2 * batch.tests_present.len());
    for header in &batch.headers {
        headers.push(header.clone());
        if header == "age" {
            headers.push("age^2".to_string());
        }
    }
    for test in &batch.tests_present {
        headers.push(format!("{test}_z"));
    }
    for test in &batch.tests_present {
        headers.push(format!("{test}_imp"));
    }
    headers
}

/// One augmented output row, all cells rendered as strings.
pub fn output_row(
    batch: &ValidatedBatch,
    row_index: usize,
    results: &[ZScoreResult],
) -> Vec<String> {
    let mut cells = Vec::new();
    for (header, value) in batch.headers.iter().zip(&batch.rows[row_index]) {
        cells.push(value.to_string());
        if header == "age" {
            let age2 = batch.subjects[row_index].demographics.age_squared();
            cells.push(age2.to_string());
        }
    }
    for test in &batch.tests_present {
        let result = results
            .iter()
            .find(|r| r.test == *test)
            .expect("results are computed for every test present");
        cells.push(result.z_score.to_string());
    }
    for test in &batch.tests_present {
        let result = results
            .iter()
            .find(|r| r.test == *test)
            .expect("results are computed for every test present");
        cells.push(result.impaired_flag().to_string());
    }
    cells
}

pub struct CsvBatchWriter<W: Write> {
    writer: W,
}

impl<W: Write> CsvBatchWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> BatchWriter for CsvBatchWriter<W> {
    fn write_batch(
        &mut self,
        batch: &ValidatedBatch,
        results: &[Vec<ZScoreResult>],
        _cutoff: f64,
    ) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(&mut self.writer);
        csv_writer.write_record(output_headers(batch))?;
        for (index, subject_results) in results.iter().enumerate() {
            csv_writer.write_record(output_row(batch, index, subject_results))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// JSON report payload: metadata plus per-subject results.
#[derive(Debug, Serialize)]
pub struct BatchReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub cutoff: f64,
    pub subjects: Vec<SubjectReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SubjectReport<'a> {
    pub row: usize,
    pub age: u32,
    #[serde(rename = "age^2")]
    pub age_squared: u32,
    pub sex: u8,
    pub education: u8,
    pub results: &'a [ZScoreResult],
}

pub struct JsonBatchWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonBatchWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> BatchWriter for JsonBatchWriter<W> {
    fn write_batch(
        &mut self,
        batch: &ValidatedBatch,
        results: &[Vec<ZScoreResult>],
        cutoff: f64,
    ) -> Result<()> {
        let report = BatchReport {
            generated_at: Utc::now(),
            cutoff,
            subjects: batch
                .subjects
                .iter()
                .zip(results)
                .enumerate()
                .map(|(index, (subject, subject_results))| SubjectReport {
                    row: index + 1,
                    age: subject.demographics.age,
                    age_squared: subject.demographics.age_squared(),
                    sex: subject.demographics.sex.code(),
                    education: subject.demographics.education.years(),
                    results: subject_results,
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TerminalBatchWriter;

impl BatchWriter for TerminalBatchWriter {
    fn write_batch(
        &mut self,
        batch: &ValidatedBatch,
        results: &[Vec<ZScoreResult>],
        cutoff: f64,
    ) -> Result<()> {
        let mut table = Table::new();
        table.set_header(output_headers(batch));
        for (index, subject_results) in results.iter().enumerate() {
            let impaired_count = subject_results.iter().filter(|r| r.impaired).count();
            let cells: Vec<Cell> = output_row(batch, index, subject_results)
                .into_iter()
                .map(|cell| {
                    if impaired_count > 0 {
                        Cell::new(cell).fg(Color::Red)
                    } else {
                        Cell::new(cell)
                    }
                })
                .collect();
            table.add_row(cells);
        }
        println!("{table}");
        println!("cutoff: z <= {cutoff} is impaired");
        Ok(())
    }
}

/// Writer factory; `output` of `None` means stdout.
pub fn create_batch_writer(
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<Box<dyn BatchWriter>> {
    match (format, output) {
        (OutputFormat::Terminal, _) => Ok(Box::new(TerminalBatchWriter)),
        (OutputFormat::Csv, Some(path)) => Ok(Box::new(CsvBatchWriter::new(File::create(path)?))),
        (OutputFormat::Csv, None) => Ok(Box::new(CsvBatchWriter::new(std::io::stdout()))),
        (OutputFormat::Json, Some(path)) => Ok(Box::new(JsonBatchWriter::new(File::create(path)?))),
        (OutputFormat::Json, None) => Ok(Box::new(JsonBatchWriter::new(std::io::stdout()))),
    }
}

/// Column layout check used by writers and tests: original columns, `age^2`
/// right after `age`, then `_z` columns, then `_imp` columns.
pub fn verify_layout(headers: &[String]) -> Result<()> {
    let age = headers.iter().position(|h| h == "age");
    let age2 = headers.iter().position(|h| h == "age^2");
    match (age, age2) {
        (Some(a), Some(b)) if b == a + 1 => Ok(()),
        _ => Err(BicamsError::validation(
            "age^2",
            "age^2 column must directly follow age",
        )),
    }
}
