use anyhow::Result;
use clap::Parser;

use bicams::cli::{Cli, Commands};
use bicams::commands::{self, BatchConfig, NormalizeConfig, TablesConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize {
            age,
            sex,
            education,
            sdmt,
            bvmt,
            cvlt,
            cutoff,
            format,
            data_dir,
            plot,
            reference_file,
        } => {
            let config = NormalizeConfig {
                age,
                sex,
                education,
                sdmt,
                bvmt,
                cvlt,
                cutoff,
                format: format.into(),
                data_dir,
                plot,
                reference_file,
            };
            commands::run_normalize(config)?;
        }
        Commands::Batch {
            input,
            output,
            cutoff,
            format,
            data_dir,
        } => {
            let config = BatchConfig {
                input,
                output,
                cutoff,
                format: format.into(),
                data_dir,
            };
            commands::run_batch(config)?;
        }
        Commands::Tables { test, data_dir } => {
            commands::run_tables(TablesConfig { test, data_dir })?;
        }
    }
    Ok(())
}
