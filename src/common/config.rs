use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::FixedOffset;
use crate::common::error::{AnalyzerError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub error_log: ErrorLogConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Cosmetic pause between "Analyzing.." and the report.
    #[serde(default = "default_delay")]
    pub delay_ms: u64,
    #[serde(default = "default_max_allocation")]
    pub max_allocation_bytes: u64,
}

fn default_delay() -> u64 { 2000 }
fn default_max_allocation() -> u64 { 1 << 30 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay(),
            max_allocation_bytes: default_max_allocation(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_invalid_pause")]
    pub invalid_input_pause_ms: u64,
    #[serde(default = "default_true")]
    pub clear_screen: bool,
}

fn default_invalid_pause() -> u64 { 1500 }
fn default_true() -> bool { true }

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            invalid_input_pause_ms: default_invalid_pause(),
            clear_screen: default_true(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorLogConfig {
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

fn default_log_path() -> PathBuf { PathBuf::from("error_log.json") }
fn default_utc_offset() -> i32 { 1 }

impl Default for ErrorLogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

const MAX_PAUSE_MS: u64 = 60_000;

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalyzerError::Config(format!(
                "Config file not found: {}", path.display()
            )));
        }

        tracing::debug!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AnalyzerError::Config(format!("Config parse error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.max_allocation_bytes == 0 {
            return Err(AnalyzerError::Config(
                "max_allocation_bytes must be at least 1".into()
            ));
        }

        if self.analysis.delay_ms > MAX_PAUSE_MS {
            return Err(AnalyzerError::Config(format!(
                "delay_ms must be at most {}, got {}", MAX_PAUSE_MS, self.analysis.delay_ms
            )));
        }
        if self.prompt.invalid_input_pause_ms > MAX_PAUSE_MS {
            return Err(AnalyzerError::Config(format!(
                "invalid_input_pause_ms must be at most {}, got {}",
                MAX_PAUSE_MS, self.prompt.invalid_input_pause_ms
            )));
        }

        if !(-12..=14).contains(&self.error_log.utc_offset_hours) {
            return Err(AnalyzerError::Config(format!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.error_log.utc_offset_hours
            )));
        }

        if self.error_log.path.as_os_str().is_empty() {
            return Err(AnalyzerError::Config("error log path cannot be empty".into()));
        }

        Ok(())
    }

    /// Turns off both cosmetic pauses.
    pub fn without_delays(mut self) -> Self {
        self.analysis.delay_ms = 0;
        self.prompt.invalid_input_pause_ms = 0;
        self
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis.delay_ms)
    }

    pub fn invalid_input_pause(&self) -> Duration {
        Duration::from_millis(self.prompt.invalid_input_pause_ms)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.error_log.utc_offset_hours * 3600).ok_or_else(|| {
            AnalyzerError::Config(format!(
                "Invalid UTC offset: {} hours", self.error_log.utc_offset_hours
            ))
        })
    }
}
