//! Plan cache configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! { "max_entries": 5000, "works_growth_coefficient": 2.0, "log_level": "INFO" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{PlanCacheError, PlanCacheResult};
use crate::observability::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCacheConfig {
    /// Maximum number of cached entries (must be > 0)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Default multiplier applied to an entry's works estimate
    /// (must be > 1.0)
    #[serde(default = "default_works_growth_coefficient")]
    pub works_growth_coefficient: f64,

    /// Minimum log severity
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_entries() -> usize {
    5000
}
fn default_works_growth_coefficient() -> f64 {
    2.0
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for PlanCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            works_growth_coefficient: default_works_growth_coefficient(),
            log_level: default_log_level(),
        }
    }
}

impl PlanCacheConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> PlanCacheResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| PlanCacheError::bad_config(format!("Failed to read config: {}", e)))?;

        let config: PlanCacheConfig = serde_json::from_str(&content)
            .map_err(|e| PlanCacheError::bad_config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> PlanCacheResult<()> {
        if self.max_entries == 0 {
            return Err(PlanCacheError::bad_config("max_entries must be > 0"));
        }

        // NaN fails this comparison too
        if !(self.works_growth_coefficient > 1.0) || self.works_growth_coefficient.is_infinite() {
            return Err(PlanCacheError::bad_config(format!(
                "works_growth_coefficient must be a finite number > 1.0, got {}",
                self.works_growth_coefficient
            )));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(PlanCacheError::bad_config(format!(
                "Invalid log_level: '{}'. Expected TRACE, INFO, WARN, ERROR or FATAL.",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Parsed log level; falls back to INFO for an unvalidated config.
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}
