//! Single-subject normalization command.

use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::Table;
use serde::Serialize;

use crate::core::{Demographics, Education, Sex, SubjectRecord, TestScores, ZScoreResult};
use crate::errors::{BicamsError, Result};
use crate::io::output::OutputFormat;
use crate::norms::normalize_subject;
use crate::plot::render_overlay;
use crate::reference::ReferenceDistribution;
use crate::tables::TableStore;
use std::path::PathBuf;

pub struct NormalizeConfig {
    pub age: u32,
    pub sex: i64,
    pub education: i64,
    pub sdmt: Option<u32>,
    pub bvmt: Option<u32>,
    pub cvlt: Option<u32>,
    pub cutoff: f64,
    pub format: OutputFormat,
    pub data_dir: PathBuf,
    pub plot: bool,
    pub reference_file: PathBuf,
}

#[derive(Serialize)]
struct SingleSubjectReport<'a> {
    generated_at: DateTime<Utc>,
    cutoff: f64,
    age: u32,
    #[serde(rename = "age^2")]
    age_squared: u32,
    sex: u8,
    education: u8,
    results: &'a [ZScoreResult],
}

pub fn run_normalize(config: NormalizeConfig) -> Result<()> {
    let record = build_record(&config)?;
    let store = TableStore::load(&config.data_dir)?;
    let results = normalize_subject(&record, &store, config.cutoff)?;

    match config.format {
        OutputFormat::Terminal => print_terminal(&record, &results, config.cutoff),
        OutputFormat::Json => print_json(&record, &results, config.cutoff)?,
        OutputFormat::Csv => print_csv(&results)?,
    }

    if config.plot {
        let distribution = ReferenceDistribution::load(&config.reference_file)?;
        println!();
        println!("{}", render_overlay(&distribution, &results, config.cutoff));
    }
    Ok(())
}

fn build_record(config: &NormalizeConfig) -> Result<SubjectRecord> {
    let sex = Sex::from_code(config.sex).ok_or_else(|| {
        BicamsError::validation(
            "sex",
            format!("value {} not in allowed set {{1, 2}}", config.sex),
        )
    })?;
    let education = Education::from_years(config.education).ok_or_else(|| {
        BicamsError::validation(
            "education",
            format!(
                "value {} not in allowed set {{6, 12, 13, 15, 17, 21}}",
                config.education
            ),
        )
    })?;
    let demographics = Demographics::new(config.age, sex, education)?;
    let scores = TestScores {
        sdmt: config.sdmt,
        bvmt: config.bvmt,
        cvlt: config.cvlt,
    };
    for (test, raw_score) in scores.present() {
        if !test.raw_range().contains(&raw_score) {
            return Err(BicamsError::validation(
                test.name(),
                format!(
                    "value {raw_score} outside allowed range {}-{}",
                    test.raw_range().start(),
                    test.raw_range().end()
                ),
            ));
        }
    }
    SubjectRecord::new(demographics, scores)
}

fn print_terminal(record: &SubjectRecord, results: &[ZScoreResult], cutoff: f64) {
    let demographics = &record.demographics;
    let mut table = Table::new();
    table.set_header(vec!["age", "age^2", "sex", "education"]);
    table.add_row(vec![
        demographics.age.to_string(),
        demographics.age_squared().to_string(),
        demographics.sex.label().to_string(),
        demographics.education.label().to_string(),
    ]);
    println!("{table}");
    println!();

    for result in results {
        let raw_score = record
            .scores
            .get(result.test)
            .expect("result exists only for a present score");
        let status = if result.impaired {
            "impaired".red().bold()
        } else {
            "preserved".green()
        };
        println!(
            "  {}: raw {}, z {:+.2}, {} {}",
            result.test,
            raw_score,
            result.z_score,
            result.test.domain(),
            status
        );
    }
    println!();
    println!("cutoff: z <= {cutoff} is impaired");
}

fn print_json(record: &SubjectRecord, results: &[ZScoreResult], cutoff: f64) -> Result<()> {
    let report = SingleSubjectReport {
        generated_at: Utc::now(),
        cutoff,
        age: record.demographics.age,
        age_squared: record.demographics.age_squared(),
        sex: record.demographics.sex.code(),
        education: record.demographics.education.years(),
        results,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_csv(results: &[ZScoreResult]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["test", "z", "imp"])?;
    for result in results {
        writer.write_record([
            result.test.name().to_string(),
            result.z_score.to_string(),
            result.impaired_flag().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Test;

    fn config() -> NormalizeConfig {
        NormalizeConfig {
            age: 30,
            sex: 1,
            education: 12,
            sdmt: Some(55),
            bvmt: None,
            cvlt: None,
            cutoff: -1.5,
            format: OutputFormat::Terminal,
            data_dir: PathBuf::from("data"),
            plot: false,
            reference_file: PathBuf::from("data/reference_sample.csv"),
        }
    }

    #[test]
    fn builds_record_from_valid_flags() {
        let record = build_record(&config()).unwrap();
        assert_eq!(record.demographics.age, 30);
        assert_eq!(record.scores.sdmt, Some(55));
    }

    #[test]
    fn rejects_invalid_sex_code() {
        let mut config = config();
        config.sex = 3;
        let err = build_record(&config).unwrap_err();
        assert!(err.to_string().contains("sex"));
    }

    #[test]
    fn rejects_raw_score_outside_test_domain() {
        let mut config = config();
        config.bvmt = Some(37);
        let err = build_record(&config).unwrap_err();
        assert!(err.to_string().contains("bvmt"));
    }

    #[test]
    fn rejects_subject_without_any_score() {
        let mut config = config();
        config.sdmt = None;
        let err = build_record(&config).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn end_to_end_single_subject_matches_hand_computation() {
        let record = build_record(&config()).unwrap();
        let store = TableStore::load(std::path::Path::new("data")).unwrap();
        let results = normalize_subject(&record, &store, -1.5).unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.test, Test::Sdmt);

        let expected = 10.648 - 0.289 * 30.0 + 0.002 * 900.0 - 0.05 + 0.479 * 12.0;
        let scaled = f64::from(store.table(Test::Sdmt).lookup(55).unwrap());
        let z = (scaled - expected) / 2.790;
        assert!((result.z_score - z).abs() < 1e-12);
        assert_eq!(result.impaired, z <= -1.5);
    }
}
