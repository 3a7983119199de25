use crate::constants;
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub normalize: NormalizeConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Lookup data consumed by the normalization pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Month name -> two-digit code
    pub months: BTreeMap<String, String>,
    pub weekdays: Vec<String>,
    pub others_suffix: String,
    pub performer_label: String,
    pub venue_label: String,
    pub date_label: String,
    pub genre_label: String,
    pub country_suffix: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            months: constants::MONTHS
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
            weekdays: constants::WEEKDAYS.iter().map(|d| d.to_string()).collect(),
            others_suffix: constants::OTHERS_SUFFIX.to_string(),
            performer_label: constants::PERFORMER_LABEL.to_string(),
            venue_label: constants::VENUE_LABEL.to_string(),
            date_label: constants::DATE_LABEL.to_string(),
            genre_label: constants::GENRE_LABEL.to_string(),
            country_suffix: constants::COUNTRY_SUFFIX.to_string(),
        }
    }
}

impl NormalizeConfig {
    /// Rejects tables the date parser cannot work with.
    ///
    /// Extra month names (abbreviations like `Jun`) are allowed as long as every code
    /// `01`..`12` is reachable from some name.
    pub fn validate(&self) -> Result<()> {
        let mut covered = BTreeSet::new();
        for (name, code) in &self.months {
            let month = code
                .parse::<u32>()
                .ok()
                .filter(|m| code.len() == 2 && (1..=12).contains(m));
            match month {
                Some(m) => {
                    covered.insert(m);
                }
                None => {
                    return Err(PipelineError::Config(format!(
                        "month '{}' has invalid code '{}'",
                        name, code
                    )))
                }
            }
        }
        let missing: Vec<String> = (1..=12u32)
            .filter(|m| !covered.contains(m))
            .map(|m| format!("{:02}", m))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Config(format!(
                "month table has no name for code(s) {}",
                missing.join(", ")
            )));
        }
        if self.weekdays.len() != 7 {
            return Err(PipelineError::Config(format!(
                "weekday set must have 7 entries, found {}",
                self.weekdays.len()
            )));
        }
        if self.others_suffix.trim().is_empty() {
            return Err(PipelineError::Config("others_suffix must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Area index page that URL discovery starts from
    pub area_url: String,
    pub concurrency: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            area_url: constants::DEFAULT_AREA_URL.to_string(),
            concurrency: 32,
            timeout_seconds: 30,
            user_agent: concat!("concert_pipeline/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
    /// Worker count for parallel normalization; 0 means one per available core
    pub workers: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: constants::DEFAULT_OUTPUT_DIR.to_string(),
            workers: 0,
        }
    }
}

impl AppConfig {
    /// Loads the config file at `path`, falling back to defaults when it does not exist.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("No config file at '{}', using built-in defaults", path);
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.normalize.validate()?;
        Ok(config)
    }
}
