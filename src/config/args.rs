use crate::config::job::unquote_path;
use crate::config::toml_config::CleanerConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "catalog-clean")]
#[command(about = "Cleans product catalog exports: categories, brands, variants and title attributes")]
pub struct CliConfig {
    /// CSV or JSON files to clean, processed in order
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Path to TOML configuration file (defaults to ./catalog-clean.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for output files instead of the input's directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// CSV field delimiter
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Output format: csv or json
    #[arg(long)]
    pub format: Option<String>,

    /// Text placed between the input name and the timestamp
    #[arg(long)]
    pub suffix: Option<String>,

    /// Clean and report without writing output files
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    /// Input paths with surrounding quotes removed.
    pub fn input_paths(&self) -> Vec<String> {
        self.inputs
            .iter()
            .map(|input| unquote_path(input).to_string())
            .collect()
    }

    /// Command line flags win over the configuration file.
    pub fn apply_overrides(&self, config: &mut CleanerConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.directory = Some(dir.clone());
        }
        if let Some(delimiter) = &self.delimiter {
            config.csv.delimiter = delimiter.clone();
        }
        if let Some(format) = &self.format {
            config.output.format = format.to_lowercase();
        }
        if let Some(suffix) = &self.suffix {
            config.output.suffix = suffix.clone();
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_file_extensions("inputs", &self.input_paths(), &["csv", "json"])
    }
}
