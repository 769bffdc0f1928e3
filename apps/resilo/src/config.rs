//! # Application Configuration
//!
//! TOML configuration for the Resilo binary: the rating scale and its
//! display labels, the rating policy, and server defaults.
//!
//! The rule engine itself never sees presentation data; labels stay in
//! this layer and are only used when rendering output.
//!
//! ## Example
//!
//! ```toml
//! [scale]
//! levels = [1, 2, 3, 4, 5]
//! labels = ["Initial", "Managed", "Defined", "Quantified", "Optimising"]
//!
//! [rules]
//! treat_na_as_zero = false
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```

use resilo_core::{Level, RatingRules, RatingScale, ResiloError};
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// The `[scale]` section: levels and their display labels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Ascending maturity levels.
    pub levels: Vec<u8>,
    /// Display labels, parallel to `levels`.
    pub labels: Vec<String>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            levels: vec![1, 2, 3, 4, 5],
            labels: vec![
                "Initial".to_string(),
                "Managed".to_string(),
                "Defined".to_string(),
                "Quantified".to_string(),
                "Optimising".to_string(),
            ],
        }
    }
}

/// The `[rules]` section: rating policy flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Allow a desired target while current is marked N/A.
    pub treat_na_as_zero: bool,
}

/// The `[server]` section: bind defaults for `resilo server`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// The full application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scale: ScaleConfig,
    pub rules: RulesConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults apply. A file that
    /// exists but fails to parse is rejected so a typo cannot silently
    /// fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ResiloError> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ResiloError::IoError(format!("Cannot read config {:?}: {}", path, e)))?;
        toml::from_str(&text).map_err(|e| {
            ResiloError::DeserializationError(format!("Invalid config {:?}: {}", path, e))
        })
    }

    /// Build the rule engine this deployment runs.
    #[must_use]
    pub fn rating_rules(&self) -> RatingRules {
        RatingRules::with_policy(
            RatingScale::from_values(&self.scale.levels),
            self.rules.treat_na_as_zero,
        )
    }

    /// Display label for a level, if one is configured.
    #[must_use]
    pub fn level_label(&self, level: Level) -> Option<&str> {
        self.scale
            .levels
            .iter()
            .position(|l| *l == level.value())
            .and_then(|idx| self.scale.labels.get(idx))
            .map(String::as_str)
    }
}

// =============================================================================
// TESTS
// =============================================================================
