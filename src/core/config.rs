//=========================================================================
// UI Configuration
//=========================================================================
//
// Startup configuration, loaded once from TOML and passed explicitly into
// the DirectorBuilder.
//
// Example:
// ```toml
// sorting_layer = "UI"
//
// [[views]]
// name = "Core"
// ids = ["Hud", "Menu"]
//
// [[views]]
// name = "Shop"
// ids = ["ShopPopup"]
//
// [logging]
// filter = "aetheric_ui=debug"
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;

use serde::Deserialize;

//=== Internal Dependencies ===============================================

use super::catalog::{ViewCatalog, ViewIdSource};
use super::error::ConfigError;
use crate::logging::LoggingConfig;

//=== Defaults ============================================================

/// Sorting layer stamped on every view canvas unless configured otherwise.
pub const DEFAULT_SORTING_LAYER: &str = "UI";

//=== UiConfig ============================================================

/// Root of the UI configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Sorting layer assigned to every view canvas.
    pub sorting_layer: String,

    /// View id declarations, one entry per group.
    pub views: Vec<ViewIdSource>,

    pub logging: LogSettings,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sorting_layer: DEFAULT_SORTING_LAYER.to_string(),
            views: Vec::new(),
            logging: LogSettings::default(),
        }
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter directive, e.g. `"info"` or `"aetheric_ui=debug"`.
    pub filter: Option<String>,
}

impl UiConfig {
    //--- Loading ----------------------------------------------------------

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    //--- Derived Settings -------------------------------------------------

    /// Discovers the view catalog from the declared groups.
    pub fn catalog(&self) -> Result<ViewCatalog, ConfigError> {
        ViewCatalog::discover(&self.views)
    }

    /// Logger settings for [`init_logging`](crate::logging::init_logging).
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.logging.filter.clone(),
            ..LoggingConfig::default()
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
