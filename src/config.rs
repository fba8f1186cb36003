//! Runtime settings, read from an optional TOML file.
//!
//! ```toml
//! input_path = "MV_Material_Study.csv"
//! output_dir = "reports"
//! top_n = 10
//! ```

use crate::actions::ActionSettings;
use crate::analysis::AnalysisOptions;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// CSV export of the material study sheet.
    pub input_path: PathBuf,
    /// Directory receiving the CSV/JSON exports.
    pub output_dir: PathBuf,
    /// Length of the "top blocked projects" and "top suppliers" lists.
    pub top_n: usize,
    /// Rows shown in console previews.
    pub preview_rows: usize,
    pub wip_locater: String,
    pub free_stock_source: String,
}

impl Default for Settings {
    fn default() -> Self {
        let actions = ActionSettings::default();
        Self {
            input_path: PathBuf::from("material_study.csv"),
            output_dir: PathBuf::from("."),
            top_n: 10,
            preview_rows: 5,
            wip_locater: actions.wip_locater,
            free_stock_source: actions.free_stock_source,
        }
    }
}

impl Settings {
    /// Defaults when `path` is `None`, otherwise the file's values over defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(AnalysisError::Config("top_n must be at least 1".to_string()));
        }
        if self.wip_locater.trim().is_empty() {
            return Err(AnalysisError::Config("wip_locater must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions { top_n: self.top_n }
    }

    pub fn action_settings(&self) -> ActionSettings {
        ActionSettings {
            wip_locater: self.wip_locater.clone(),
            free_stock_source: self.free_stock_source.clone(),
        }
    }
}
