//! Batch normalization command: read, validate, transform, write.

use log::info;
use std::path::PathBuf;

use crate::errors::Result;
use crate::io::output::{create_batch_writer, OutputFormat};
use crate::io::reader::RawBatch;
use crate::norms::normalize_batch;
use crate::tables::TableStore;
use crate::validation::validate;

pub struct BatchConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub cutoff: f64,
    pub format: OutputFormat,
    pub data_dir: PathBuf,
}

pub fn run_batch(config: BatchConfig) -> Result<()> {
    let raw = RawBatch::from_path(&config.input)?;
    info!(
        "read {} rows from {}",
        raw.rows.len(),
        config.input.display()
    );

    // All-or-nothing: the batch is fully validated before any pipeline call.
    let batch = validate(&raw)?;
    let store = TableStore::load(&config.data_dir)?;
    let results = normalize_batch(&batch.subjects, &store, config.cutoff)?;

    let mut writer = create_batch_writer(config.format, config.output)?;
    writer.write_batch(&batch, &results, config.cutoff)?;
    info!("transformed {} subjects", results.len());
    Ok(())
}
