use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "scommesse.json";

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/foppini975/Scommesse_export/main/prematch_export.latest.csv";
pub const DEFAULT_LEAGUE_URL_PREFIX: &str = "https://www.snai.it/sport/CALCIO/";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Every field is optional in the file; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Remote CSV export.
    pub source_url: String,
    /// Stripped from `prematch_url` before reading the competition segment.
    pub league_url_prefix: String,
    pub request_timeout_secs: u64,
    /// Initial "refreshed since" floor, in days before today.
    pub default_days_back: i64,
    pub default_label_length: usize,
    pub contour: ContourConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            league_url_prefix: DEFAULT_LEAGUE_URL_PREFIX.to_string(),
            request_timeout_secs: 30,
            default_days_back: 2,
            default_label_length: 3,
            contour: ContourConfig::default(),
        }
    }
}

/// Sampling grid of the iso-margin overlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Grid points per axis.
    pub resolution: usize,
    /// Added on each side of the observed odds range.
    pub padding: f64,
    /// Margin levels, as fractions (0.05 = 5%).
    pub margins: Vec<f64>,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            resolution: 400,
            padding: 0.1,
            margins: vec![0.04, 0.05, 0.06, 0.07, 0.08, 0.09, 0.10],
        }
    }
}

impl DashboardConfig {
    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No {} found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: DashboardConfig =
            serde_json::from_str(r#"{ "default_label_length": 5, "contour": { "resolution": 50 } }"#)
                .unwrap();
        assert_eq!(cfg.default_label_length, 5);
        assert_eq!(cfg.contour.resolution, 50);
        assert_eq!(cfg.contour.margins.len(), 7);
        assert_eq!(cfg.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = DashboardConfig::load(Path::new("definitely/not/here.json")).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }
}
