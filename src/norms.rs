//! The four-stage normalization pipeline.
//!
//! Each stage is a pure function: expected-score regression, raw-to-scaled
//! table lookup, z-score computation, threshold classification. Batch
//! orchestration applies the same transform per (subject, test-present) pair;
//! subjects are independent, so the batch runs on rayon with results kept
//! row-aligned with the input.

use rayon::prelude::*;

use crate::core::{Demographics, SubjectRecord, Test, ZScoreResult};
use crate::errors::Result;
use crate::tables::{ConversionTable, TableStore};

/// Linear prediction of the score a demographically-matched healthy subject
/// would achieve.
pub fn expected_score(demographics: &Demographics, test: Test) -> f64 {
    test.weights().predict(demographics)
}

/// Raw score to scaled-score bucket via the test's conversion table.
/// First match in stored order; no match is an `OutOfRange` error.
pub fn raw_to_scaled(raw_score: u32, table: &ConversionTable) -> Result<i32> {
    table.lookup(raw_score)
}

/// Scaled and expected score to a z-score, using the test's fixed residual
/// standard deviation as denominator.
pub fn to_z_score(scaled_score: i32, expected: f64, test: Test) -> f64 {
    (f64::from(scaled_score) - expected) / test.denominator()
}

/// Dichotomize a z-score: impaired at or below the cutoff (inclusive),
/// preserved above it.
pub fn impaired_or_not(z_score: f64, cutoff: f64) -> bool {
    z_score <= cutoff
}

/// The full pipeline for one (subject, test) pair.
pub fn normalize(
    demographics: &Demographics,
    raw_score: u32,
    test: Test,
    table: &ConversionTable,
    cutoff: f64,
) -> Result<ZScoreResult> {
    let expected = expected_score(demographics, test);
    let scaled = raw_to_scaled(raw_score, table)?;
    let z_score = to_z_score(scaled, expected, test);
    let impaired = impaired_or_not(z_score, cutoff);
    Ok(ZScoreResult {
        test,
        z_score,
        impaired,
    })
}

/// Normalize every test present on one subject, in canonical sdmt/bvmt/cvlt
/// order.
pub fn normalize_subject(
    record: &SubjectRecord,
    store: &TableStore,
    cutoff: f64,
) -> Result<Vec<ZScoreResult>> {
    record
        .scores
        .present()
        .map(|(test, raw_score)| {
            normalize(
                &record.demographics,
                raw_score,
                test,
                store.table(test),
                cutoff,
            )
        })
        .collect()
}

/// Normalize a whole batch. Subjects are independent, so they run in
/// parallel; output rows stay aligned with input order. Any error aborts the
/// batch with no partial results.
pub fn normalize_batch(
    records: &[SubjectRecord],
    store: &TableStore,
    cutoff: f64,
) -> Result<Vec<Vec<ZScoreResult>>> {
    records
        .par_iter()
        .map(|record| normalize_subject(record, store, cutoff))
        .collect()
}
