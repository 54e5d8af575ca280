//! Batch input parsing and result writers.

pub mod output;
pub mod reader;

pub use output::{create_batch_writer, BatchWriter, OutputFormat};
pub use reader::RawBatch;
