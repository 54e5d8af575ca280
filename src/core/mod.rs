//! Core domain types shared across the crate.

pub mod types;

pub use types::{
    Demographics, Education, RegressionWeights, Sex, SubjectRecord, Test, TestScores, ZScoreResult,
    MAX_AGE,
};
