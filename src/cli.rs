use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::Test;

#[derive(Parser, Debug)]
#[command(name = "bicams")]
#[command(about = "Regression-based normalization of BICAMS cognitive scores", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a single subject's raw scores
    Normalize {
        /// Age in years
        #[arg(long)]
        age: u32,

        /// Sex code (1: male, 2: female)
        #[arg(long)]
        sex: i64,

        /// Years of education (6, 12, 13, 15, 17 or 21)
        #[arg(long)]
        education: i64,

        /// SDMT raw score
        #[arg(long)]
        sdmt: Option<u32>,

        /// BVMT raw score
        #[arg(long)]
        bvmt: Option<u32>,

        /// CVLT raw score
        #[arg(long)]
        cvlt: Option<u32>,

        /// Impairment cutoff on the z-scale; z at or below it is impaired
        #[arg(long, default_value = "-1.5", allow_hyphen_values = true)]
        cutoff: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Directory holding the conversion table resources
        #[arg(long, env = "BICAMS_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Render the reference-distribution overlay
        #[arg(long)]
        plot: bool,

        /// Reference sample file for the overlay
        #[arg(long, default_value = "data/reference_sample.csv")]
        reference_file: PathBuf,
    },

    /// Validate and normalize a CSV batch of subject records
    Batch {
        /// Batch CSV file (columns age, sex, education plus sdmt/bvmt/cvlt)
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Impairment cutoff on the z-scale; z at or below it is impaired
        #[arg(long, default_value = "-1.5", allow_hyphen_values = true)]
        cutoff: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Directory holding the conversion table resources
        #[arg(long, env = "BICAMS_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },

    /// Inspect the loaded conversion tables
    Tables {
        /// Restrict to one subtest
        #[arg(long, value_enum)]
        test: Option<Test>,

        /// Directory holding the conversion table resources
        #[arg(long, env = "BICAMS_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
    Csv,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Csv => crate::io::output::OutputFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_normalize_command_with_scores() {
        let cli = Cli::parse_from([
            "bicams",
            "normalize",
            "--age",
            "30",
            "--sex",
            "1",
            "--education",
            "12",
            "--sdmt",
            "55",
            "--cutoff",
            "-1.0",
        ]);
        match cli.command {
            Commands::Normalize {
                age,
                sex,
                education,
                sdmt,
                bvmt,
                cutoff,
                ..
            } => {
                assert_eq!(age, 30);
                assert_eq!(sex, 1);
                assert_eq!(education, 12);
                assert_eq!(sdmt, Some(55));
                assert_eq!(bvmt, None);
                assert_eq!(cutoff, -1.0);
            }
            _ => panic!("expected normalize command"),
        }
    }

    #[test]
    fn parses_batch_command_with_defaults() {
        let cli = Cli::parse_from(["bicams", "batch", "subjects.csv"]);
        match cli.command {
            Commands::Batch {
                input,
                output,
                cutoff,
                format,
                ..
            } => {
                assert_eq!(input, PathBuf::from("subjects.csv"));
                assert_eq!(output, None);
                assert_eq!(cutoff, -1.5);
                assert_eq!(format, OutputFormat::Csv);
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn parses_tables_command_with_test_filter() {
        let cli = Cli::parse_from(["bicams", "tables", "--test", "bvmt"]);
        match cli.command {
            Commands::Tables { test, .. } => assert_eq!(test, Some(Test::Bvmt)),
            _ => panic!("expected tables command"),
        }
    }
}
