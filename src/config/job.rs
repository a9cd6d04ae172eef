use crate::config::toml_config::CleanerConfig;
use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::validate_timestamp_format;

/// Settings for cleaning a single input file.
#[derive(Debug, Clone)]
pub struct FileJob {
    pub input_path: String,
    pub output_dir: Option<String>,
    pub delimiter: u8,
    pub suffix: String,
    pub format: OutputFormat,
    pub timestamp_format: String,
}

impl FileJob {
    pub fn from_config(input_path: &str, config: &CleanerConfig) -> Result<Self> {
        validate_timestamp_format("output.timestamp_format", &config.output.timestamp_format)?;
        Ok(Self {
            input_path: unquote_path(input_path).to_string(),
            output_dir: config.output.directory.clone(),
            delimiter: config.delimiter()?,
            suffix: config.output.suffix.clone(),
            format: config.output_format()?,
            timestamp_format: config.output.timestamp_format.clone(),
        })
    }
}

impl ConfigProvider for FileJob {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_dir(&self) -> Option<&str> {
        self.output_dir.as_deref()
    }

    fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn output_suffix(&self) -> &str {
        &self.suffix
    }

    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }
}

/// Paths pasted from a file manager often arrive wrapped in double quotes.
pub fn unquote_path(path: &str) -> &str {
    let path = path.trim();
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}
