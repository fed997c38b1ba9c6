use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;

use crate::error::DriverError;

/// Options the driver consumes before invoking the core. `statsfile` and
/// `savestepsize` are pure pass-through fields the driver records but
/// never interprets itself — the out-of-scope runtime reads them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverConfig {
    pub statsfile: Option<PathBuf>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub savestepsize: Option<u32>,
}

impl DriverConfig {
    /// A file is instrumented iff it matches some `include` pattern (or
    /// `include` is empty) and no `exclude` pattern.
    pub fn should_instrument(&self, path: &str) -> Result<bool, DriverError> {
        if any_pattern_matches(&self.exclude, path)? {
            return Ok(false);
        }
        if self.include.is_empty() {
            return Ok(true);
        }
        any_pattern_matches(&self.include, path)
    }

    /// Load the on-disk TOML form of this config. The config-loading
    /// *feature* (file discovery, CLI flags, defaults merging) is out
    /// of scope, but the driver still has to read back whatever an
    /// out-of-scope loader wrote, so this is the plain deserialization
    /// half of that contract.
    pub fn from_toml_str(s: &str) -> Result<Self, DriverError> {
        toml::from_str(s)
            .map_err(|e| DriverError::Validation(format!("invalid config TOML: {e}")))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

fn any_pattern_matches(patterns: &[String], path: &str) -> Result<bool, DriverError> {
    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            DriverError::Validation(format!("invalid include/exclude pattern `{pattern}`: {e}"))
        })?;
        if re.is_match(path) {
            return Ok(true);
        }
    }
    Ok(false)
}
