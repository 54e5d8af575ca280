//! CLI command implementations.
//!
//! One handler module per subcommand, each taking a plain config struct
//! built by `main` from the parsed CLI:
//! - **normalize**: single-subject normalization, optional distribution plot
//! - **batch**: validate and transform a whole CSV of subject records
//! - **tables**: inspect the loaded conversion tables

pub mod batch;
pub mod normalize;
pub mod tables;

pub use batch::{run_batch, BatchConfig};
pub use normalize::{run_normalize, NormalizeConfig};
pub use tables::{run_tables, TablesConfig};
