//! End-to-end tests of the normalization pipeline over the shipped data
//! resources: single-subject computation, batch column layout, and
//! all-or-nothing batch validation.

use std::path::Path;

use bicams::core::{Demographics, Education, Sex, SubjectRecord, Test, TestScores};
use bicams::errors::BicamsError;
use bicams::io::output::{output_headers, CsvBatchWriter};
use bicams::io::reader::RawBatch;
use bicams::io::BatchWriter;
use bicams::norms::{normalize, normalize_batch, normalize_subject};
use bicams::tables::TableStore;
use bicams::validation::validate;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn store() -> TableStore {
    TableStore::load(Path::new("data")).expect("shipped tables must load")
}

#[test]
fn single_subject_sdmt_scenario() {
    // age=30, sex=1, education=12, sdmt raw 55, cutoff -1.5
    let store = store();
    let demographics = Demographics::new(30, Sex::Male, Education::HighSchool).unwrap();
    let result = normalize(
        &demographics,
        55,
        Test::Sdmt,
        store.table(Test::Sdmt),
        -1.5,
    )
    .unwrap();

    // [1, 30, 900, 1, 12] . [10.648, -0.289, 0.002, -0.05, 0.479]
    let expected_score = 10.648 - 0.289 * 30.0 + 0.002 * 900.0 - 0.05 + 0.479 * 12.0;
    let scaled = f64::from(store.table(Test::Sdmt).lookup(55).unwrap());
    let expected_z = (scaled - expected_score) / 2.790;

    assert!((result.z_score - expected_z).abs() < 1e-9);
    assert_eq!(result.impaired, expected_z <= -1.5);
}

#[test]
fn batch_with_only_sdmt_appends_only_sdmt_columns() {
    let raw = RawBatch::from_reader(
        indoc! {"
            age,sex,education,sdmt
            30,1,12,55
            45,2,15,48
            70,1,6,25
        "}
        .as_bytes(),
    )
    .unwrap();
    let batch = validate(&raw).unwrap();
    let results = normalize_batch(&batch.subjects, &store(), -1.5).unwrap();
    assert_eq!(results.len(), 3);

    let headers = output_headers(&batch);
    assert_eq!(
        headers,
        vec!["age", "age^2", "sex", "education", "sdmt", "sdmt_z", "sdmt_imp"]
    );
    assert!(!headers.iter().any(|h| h.contains("bvmt") || h.contains("cvlt")));

    let mut buffer = Vec::new();
    CsvBatchWriter::new(&mut buffer)
        .write_batch(&batch, &results, -1.5)
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn batch_with_invalid_sex_is_rejected_in_full() {
    let raw = RawBatch::from_reader(
        indoc! {"
            age,sex,education,sdmt
            30,1,12,55
            45,3,15,48
            70,1,6,25
        "}
        .as_bytes(),
    )
    .unwrap();
    let err = validate(&raw).unwrap_err();
    match err {
        BicamsError::Validation { column, constraint } => {
            assert_eq!(column, "sex");
            assert!(constraint.contains("3"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn one_row_batch_equals_single_subject_pipeline() {
    let raw = RawBatch::from_reader("age,sex,education,sdmt,bvmt,cvlt\n52,2,17,41,22,50\n".as_bytes())
        .unwrap();
    let batch = validate(&raw).unwrap();
    let store = store();
    let from_batch = normalize_batch(&batch.subjects, &store, -1.0).unwrap();

    let demographics = Demographics::new(52, Sex::Female, Education::Master).unwrap();
    let record = SubjectRecord::new(
        demographics,
        TestScores {
            sdmt: Some(41),
            bvmt: Some(22),
            cvlt: Some(50),
        },
    )
    .unwrap();
    let from_single = normalize_subject(&record, &store, -1.0).unwrap();

    assert_eq!(from_batch, vec![from_single]);
}

#[test]
fn batch_output_preserves_input_row_order() {
    let csv = {
        let mut csv = String::from("age,sex,education,cvlt\n");
        for i in 0..50u32 {
            let age = 20 + i;
            let cvlt = 30 + i;
            csv.push_str(&format!("{age},1,12,{cvlt}\n"));
        }
        csv
    };
    let raw = RawBatch::from_reader(csv.as_bytes()).unwrap();
    let batch = validate(&raw).unwrap();
    let results = normalize_batch(&batch.subjects, &store(), -1.5).unwrap();

    let mut buffer = Vec::new();
    CsvBatchWriter::new(&mut buffer)
        .write_batch(&batch, &results, -1.5)
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();
    for (i, line) in text.lines().skip(1).enumerate() {
        let age = 20 + i;
        assert!(
            line.starts_with(&format!("{age},")),
            "row {i} out of order: {line}"
        );
    }
}

#[test]
fn missing_table_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = TableStore::load(dir.path()).unwrap_err();
    assert!(matches!(err, BicamsError::DataUnavailable { .. }));
}

#[test]
fn raw_score_without_bucket_surfaces_as_out_of_range() {
    // A truncated table leaves high raw scores uncovered; the pipeline must
    // fail loudly instead of producing an undefined scaled score.
    use bicams::tables::ConversionTable;
    let table = ConversionTable::from_reader(
        Test::Cvlt,
        "scaled_score,lower_bound,upper_bound\n2,0,24\n3,25,29\n".as_bytes(),
    )
    .unwrap();
    let demographics = Demographics::new(30, Sex::Male, Education::HighSchool).unwrap();
    let err = normalize(&demographics, 60, Test::Cvlt, &table, -1.5).unwrap_err();
    match err {
        BicamsError::OutOfRange { test, raw_score } => {
            assert_eq!(test, Test::Cvlt);
            assert_eq!(raw_score, 60);
        }
        other => panic!("expected out-of-range error, got {other}"),
    }
}
