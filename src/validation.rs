//! Batch input validation.
//!
//! Every record is checked against the fixed column schema before anything
//! reaches the pipeline. Validation is all-or-nothing: the first violated
//! constraint aborts the whole batch with an error naming the column and
//! constraint, and no partial results are ever produced.

use crate::core::{Demographics, Education, Sex, SubjectRecord, Test, TestScores, MAX_AGE};
use crate::errors::{BicamsError, Result};
use crate::io::reader::RawBatch;

/// Columns that must be present in every batch.
pub const MANDATORY_COLUMNS: [&str; 3] = ["age", "sex", "education"];

/// A fully validated batch, ready for the pipeline. `rows` echoes the
/// original integer values in input column order so output can reproduce the
/// input table exactly.
#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<i64>>,
    pub subjects: Vec<SubjectRecord>,
    /// Tests with a column in this batch, in canonical sdmt/bvmt/cvlt order.
    pub tests_present: Vec<Test>,
}

/// Validate headers and every value of a raw batch, building typed subject
/// records row-aligned with the input.
pub fn validate(batch: &RawBatch) -> Result<ValidatedBatch> {
    validate_headers(&batch.headers)?;

    let tests_present: Vec<Test> = Test::ALL
        .into_iter()
        .filter(|test| batch.headers.iter().any(|h| h == test.name()))
        .collect();

    let mut rows = Vec::with_capacity(batch.rows.len());
    let mut subjects = Vec::with_capacity(batch.rows.len());
    for (index, raw_row) in batch.rows.iter().enumerate() {
        let row_number = index + 1;
        if raw_row.len() != batch.headers.len() {
            return Err(BicamsError::validation(
                "<row>",
                format!(
                    "row {row_number} has {} values, expected {}",
                    raw_row.len(),
                    batch.headers.len()
                ),
            ));
        }
        let row = parse_row(&batch.headers, raw_row, row_number)?;
        subjects.push(build_subject(&batch.headers, &row, row_number)?);
        rows.push(row);
    }

    Ok(ValidatedBatch {
        headers: batch.headers.clone(),
        rows,
        subjects,
        tests_present,
    })
}

fn validate_headers(headers: &[String]) -> Result<()> {
    for header in headers {
        if !is_known_column(header) {
            return Err(BicamsError::validation(
                header.clone(),
                format!(
                    "unknown column; allowed columns are age, sex, education, {}",
                    Test::ALL.map(|t| t.name()).join(", ")
                ),
            ));
        }
    }
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(BicamsError::validation(header.clone(), "duplicate column"));
        }
    }
    for mandatory in MANDATORY_COLUMNS {
        if !headers.iter().any(|h| h == mandatory) {
            return Err(BicamsError::validation(
                mandatory,
                "mandatory column is missing",
            ));
        }
    }
    if !Test::ALL.iter().any(|t| headers.iter().any(|h| h == t.name())) {
        return Err(BicamsError::validation(
            "scores",
            "at least one of the sdmt/bvmt/cvlt columns must be present",
        ));
    }
    Ok(())
}

fn is_known_column(name: &str) -> bool {
    MANDATORY_COLUMNS.contains(&name) || Test::ALL.iter().any(|t| t.name() == name)
}

fn parse_row(headers: &[String], raw_row: &[String], row_number: usize) -> Result<Vec<i64>> {
    headers
        .iter()
        .zip(raw_row)
        .map(|(column, value)| {
            let parsed: i64 = value.parse().map_err(|_| {
                BicamsError::validation(
                    column.clone(),
                    format!("row {row_number}: value `{value}` is not an integer"),
                )
            })?;
            check_domain(column, parsed, row_number)?;
            Ok(parsed)
        })
        .collect()
}

/// Per-column domain constraints, fixed by the normative dataset.
fn check_domain(column: &str, value: i64, row_number: usize) -> Result<()> {
    let ok = match column {
        "age" => (0..=i64::from(MAX_AGE)).contains(&value),
        "sex" => Sex::from_code(value).is_some(),
        "education" => Education::from_years(value).is_some(),
        name => match Test::ALL.iter().find(|t| t.name() == name) {
            Some(test) => {
                u32::try_from(value).is_ok_and(|v| test.raw_range().contains(&v))
            }
            None => true,
        },
    };
    if ok {
        return Ok(());
    }
    let constraint = match column {
        "age" => format!("row {row_number}: value {value} outside allowed range 0-{MAX_AGE}"),
        "sex" => format!("row {row_number}: value {value} not in allowed set {{1, 2}}"),
        "education" => format!(
            "row {row_number}: value {value} not in allowed set {{6, 12, 13, 15, 17, 21}}"
        ),
        name => {
            let test = Test::ALL.iter().find(|t| t.name() == name).unwrap();
            format!(
                "row {row_number}: value {value} outside allowed range {}-{}",
                test.raw_range().start(),
                test.raw_range().end()
            )
        }
    };
    Err(BicamsError::validation(column, constraint))
}

fn build_subject(headers: &[String], row: &[i64], row_number: usize) -> Result<SubjectRecord> {
    let value_of = |column: &str| -> Option<i64> {
        headers
            .iter()
            .position(|h| h == column)
            .map(|index| row[index])
    };

    // Header validation guarantees the mandatory columns and the domain
    // checks above guarantee the conversions.
    let age = value_of("age").and_then(|v| u32::try_from(v).ok()).ok_or_else(|| {
        BicamsError::validation("age", format!("row {row_number}: missing value"))
    })?;
    let sex = value_of("sex").and_then(Sex::from_code).ok_or_else(|| {
        BicamsError::validation("sex", format!("row {row_number}: missing value"))
    })?;
    let education = value_of("education")
        .and_then(Education::from_years)
        .ok_or_else(|| {
            BicamsError::validation("education", format!("row {row_number}: missing value"))
        })?;

    let mut scores = TestScores::default();
    for test in Test::ALL {
        if let Some(value) = value_of(test.name()) {
            // Domain check already bounded the value.
            scores.set(test, value as u32);
        }
    }

    let demographics = Demographics::new(age, sex, education)?;
    SubjectRecord::new(demographics, scores)
}
