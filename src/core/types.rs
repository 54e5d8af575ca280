//! Domain types for BICAMS score normalization.
//!
//! The three subtests are a closed set, so test identity is a plain enum and
//! every per-test constant (regression weights, residual SD, raw-score domain)
//! hangs off it. Constants come from the Costers et al. 2017 regression-based
//! norms and are not configurable at runtime.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::errors::{BicamsError, Result};

/// The three subtests of the BICAMS battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Test {
    /// Symbol Digit Modalities Test
    Sdmt,
    /// Brief Visuospatial Memory Test
    Bvmt,
    /// California Verbal Learning Test
    Cvlt,
}

impl Test {
    /// All subtests, in the canonical sdmt/bvmt/cvlt order used for output
    /// column layout.
    pub const ALL: [Test; 3] = [Test::Sdmt, Test::Bvmt, Test::Cvlt];

    /// Lowercase identifier, also the batch column name.
    pub fn name(self) -> &'static str {
        match self {
            Test::Sdmt => "sdmt",
            Test::Bvmt => "bvmt",
            Test::Cvlt => "cvlt",
        }
    }

    /// The cognitive domain the subtest screens.
    pub fn domain(self) -> &'static str {
        match self {
            Test::Sdmt => "information processing speed",
            Test::Bvmt => "visuospatial learning and memory",
            Test::Cvlt => "verbal learning and memory",
        }
    }

    /// Fixed regression weights predicting the healthy-reference score from
    /// `[1, age, age^2, sex, education]`.
    pub fn weights(self) -> RegressionWeights {
        match self {
            Test::Sdmt => RegressionWeights {
                bias: 10.648,
                age: -0.289,
                age_squared: 0.002,
                sex: -0.05,
                education: 0.479,
            },
            Test::Bvmt => RegressionWeights {
                bias: 16.902,
                age: -0.473,
                age_squared: 0.005,
                sex: -1.427,
                education: 0.341,
            },
            Test::Cvlt => RegressionWeights {
                bias: 9.052,
                age: -0.230,
                age_squared: 0.002,
                sex: -2.182,
                education: 0.323,
            },
        }
    }

    /// Residual standard deviation of the regression for this subtest; the
    /// denominator of the z-score.
    pub fn denominator(self) -> f64 {
        match self {
            Test::Sdmt => 2.790,
            Test::Bvmt => 2.793,
            Test::Cvlt => 2.801,
        }
    }

    /// Valid raw-score domain for batch validation.
    pub fn raw_range(self) -> RangeInclusive<u32> {
        match self {
            Test::Sdmt => 0..=110,
            Test::Bvmt => 0..=36,
            Test::Cvlt => 0..=80,
        }
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed per-test regression weight vector: `[bias, age, age^2, sex, education]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionWeights {
    pub bias: f64,
    pub age: f64,
    pub age_squared: f64,
    pub sex: f64,
    pub education: f64,
}

impl RegressionWeights {
    /// Dot product against a demographic vector, bias included.
    pub fn predict(&self, demographics: &Demographics) -> f64 {
        self.bias
            + self.age * f64::from(demographics.age)
            + self.age_squared * f64::from(demographics.age_squared())
            + self.sex * f64::from(demographics.sex.code())
            + self.education * f64::from(demographics.education.years())
    }
}

/// Subject sex, coded 1 (male) / 2 (female) as in the normative dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Sex::Male),
            2 => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Sex::Male => 1,
            Sex::Female => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Educational attainment, coded as years of education. Only the six degree
/// levels of the normative dataset are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    PrimarySchool,
    HighSchool,
    ProfessionalEducation,
    Bachelor,
    Master,
    Doctorate,
}

impl Education {
    /// The allowed years-of-education codes, ascending.
    pub const YEARS: [u8; 6] = [6, 12, 13, 15, 17, 21];

    pub fn from_years(years: i64) -> Option<Self> {
        match years {
            6 => Some(Education::PrimarySchool),
            12 => Some(Education::HighSchool),
            13 => Some(Education::ProfessionalEducation),
            15 => Some(Education::Bachelor),
            17 => Some(Education::Master),
            21 => Some(Education::Doctorate),
            _ => None,
        }
    }

    pub fn years(self) -> u8 {
        match self {
            Education::PrimarySchool => 6,
            Education::HighSchool => 12,
            Education::ProfessionalEducation => 13,
            Education::Bachelor => 15,
            Education::Master => 17,
            Education::Doctorate => 21,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Education::PrimarySchool => "primary school",
            Education::HighSchool => "high school",
            Education::ProfessionalEducation => "professional education",
            Education::Bachelor => "bachelor",
            Education::Master => "master",
            Education::Doctorate => "doctorate",
        }
    }
}

/// Maximum accepted age in years.
pub const MAX_AGE: u32 = 125;

/// Validated demographic vector. `age_squared` is always derived from `age`,
/// never supplied independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub age: u32,
    pub sex: Sex,
    pub education: Education,
}

impl Demographics {
    pub fn new(age: u32, sex: Sex, education: Education) -> Result<Self> {
        if age > MAX_AGE {
            return Err(BicamsError::validation(
                "age",
                format!("value {age} outside allowed range 0-{MAX_AGE}"),
            ));
        }
        Ok(Self {
            age,
            sex,
            education,
        })
    }

    pub fn age_squared(&self) -> u32 {
        self.age * self.age
    }
}

/// Raw scores present for one subject; at least one must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TestScores {
    pub sdmt: Option<u32>,
    pub bvmt: Option<u32>,
    pub cvlt: Option<u32>,
}

impl TestScores {
    pub fn get(&self, test: Test) -> Option<u32> {
        match test {
            Test::Sdmt => self.sdmt,
            Test::Bvmt => self.bvmt,
            Test::Cvlt => self.cvlt,
        }
    }

    pub fn set(&mut self, test: Test, raw_score: u32) {
        match test {
            Test::Sdmt => self.sdmt = Some(raw_score),
            Test::Bvmt => self.bvmt = Some(raw_score),
            Test::Cvlt => self.cvlt = Some(raw_score),
        }
    }

    /// Tests with a score, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (Test, u32)> + '_ {
        Test::ALL
            .into_iter()
            .filter_map(|test| self.get(test).map(|raw| (test, raw)))
    }

    pub fn is_empty(&self) -> bool {
        self.sdmt.is_none() && self.bvmt.is_none() && self.cvlt.is_none()
    }
}

/// One subject: demographics plus the raw scores supplied for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectRecord {
    pub demographics: Demographics,
    pub scores: TestScores,
}

impl SubjectRecord {
    pub fn new(demographics: Demographics, scores: TestScores) -> Result<Self> {
        if scores.is_empty() {
            return Err(BicamsError::validation(
                "scores",
                "at least one of sdmt/bvmt/cvlt must be present",
            ));
        }
        Ok(Self {
            demographics,
            scores,
        })
    }
}

/// The pipeline's output unit for one (subject, test) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZScoreResult {
    pub test: Test,
    pub z_score: f64,
    pub impaired: bool,
}

impl ZScoreResult {
    /// 0/1 encoding used in batch output columns.
    pub fn impaired_flag(&self) -> u8 {
        u8::from(self.impaired)
    }
}
