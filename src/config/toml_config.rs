use crate::core::attributes::{
    default_head_shapes, default_material_rules, AttributeRules, MaterialRule,
};
use crate::core::blacklist::{Blacklist, DEFAULT_BRANDS, DEFAULT_CATEGORIES};
use crate::core::transformer::RowTransformer;
use crate::core::OutputFormat;
use crate::utils::error::{CleanError, Result};
use crate::utils::validation::{
    validate_delimiter, validate_non_empty_string, validate_one_of, validate_path,
    validate_timestamp_format, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "catalog-clean.toml";

/// Cleaning rules and output settings. Every section may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub blacklist: BlacklistConfig,
    pub attributes: AttributesConfig,
    pub csv: CsvConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistConfig {
    pub brands: Vec<String>,
    pub categories: Vec<String>,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            brands: DEFAULT_BRANDS.iter().map(|s| s.to_string()).collect(),
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributesConfig {
    pub head_shapes: Vec<String>,
    pub material: Vec<MaterialRule>,
}

impl Default for AttributesConfig {
    fn default() -> Self {
        Self {
            head_shapes: default_head_shapes(),
            material: default_material_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Unset writes each output next to its input.
    pub directory: Option<String>,
    pub suffix: String,
    pub format: String,
    pub timestamp_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            suffix: "CSV Edit".to_string(),
            format: "csv".to_string(),
            timestamp_format: "%Y-%m-%d_%H-%M".to_string(),
        }
    }
}

impl CleanerConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CleanError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path`, or the default file in the working directory when present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path);
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                tracing::debug!("No configuration file, using built-in rules");
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CleanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        for brand in &self.blacklist.brands {
            validate_non_empty_string("blacklist.brands", brand)?;
        }
        for category in &self.blacklist.categories {
            validate_non_empty_string("blacklist.categories", category)?;
        }
        for shape in &self.attributes.head_shapes {
            validate_non_empty_string("attributes.head_shapes", shape)?;
        }
        for rule in &self.attributes.material {
            validate_non_empty_string("attributes.material.keyword", &rule.keyword)?;
            validate_non_empty_string("attributes.material.value", &rule.value)?;
        }

        validate_delimiter("csv.delimiter", &self.csv.delimiter)?;
        validate_one_of("output.format", &self.output.format, &["csv", "json"])?;
        validate_timestamp_format("output.timestamp_format", &self.output.timestamp_format)?;
        if let Some(directory) = &self.output.directory {
            validate_path("output.directory", directory)?;
        }
        Ok(())
    }

    pub fn delimiter(&self) -> Result<u8> {
        validate_delimiter("csv.delimiter", &self.csv.delimiter)
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        match self.output.format.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(CleanError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: csv, json".to_string(),
            }),
        }
    }

    pub fn build_transformer(&self) -> Result<RowTransformer> {
        let rules = AttributeRules::new(&self.attributes.material, &self.attributes.head_shapes)?;
        let brands = Blacklist::new(&self.blacklist.brands);
        let categories = Blacklist::new(&self.blacklist.categories);
        tracing::debug!(
            "Rules: {} brands, {} categories blacklisted; {} material rules, {} head shapes",
            brands.len(),
            categories.len(),
            self.attributes.material.len(),
            self.attributes.head_shapes.len()
        );
        Ok(RowTransformer::new(brands, categories, rules))
    }
}

impl Validate for CleanerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
