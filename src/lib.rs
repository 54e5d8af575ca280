// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod core;
pub mod errors;
pub mod io;
pub mod norms;
pub mod plot;
pub mod reference;
pub mod tables;
pub mod validation;

// Re-export commonly used types
pub use crate::core::{
    Demographics, Education, RegressionWeights, Sex, SubjectRecord, Test, TestScores, ZScoreResult,
};

pub use crate::errors::{BicamsError, Result};

pub use crate::norms::{
    expected_score, impaired_or_not, normalize, normalize_batch, normalize_subject, raw_to_scaled,
    to_z_score,
};

pub use crate::tables::{ConversionRow, ConversionTable, TableStore};

pub use crate::reference::ReferenceDistribution;

pub use crate::validation::{validate, ValidatedBatch};
