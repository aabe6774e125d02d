//! Editor configuration.
//!
//! Every field has a default, so a partial JSON file only needs to name the
//! values it overrides.

use crate::error::{EditorError, EditorResult};
use crate::objects::SerializableColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pixels per millimetre at 96 DPI.
pub const PX_PER_MM: f64 = 96.0 / 25.4;

/// Grid cell size in surface pixels.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Distance within which two edges are considered aligned.
pub const ALIGNMENT_THRESHOLD: f64 = 5.0;

/// Maximum number of history snapshots kept per surface.
pub const MAX_HISTORY_DEPTH: usize = 50;

/// Debounce window for in-place property edits.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// CR80 card width in millimetres.
pub const CR80_WIDTH_MM: f64 = 85.6;

/// CR80 card height in millimetres.
pub const CR80_HEIGHT_MM: f64 = 53.98;

/// Grid snapping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cell_size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Alignment (smart guide) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub enabled: bool,
    pub threshold: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: ALIGNMENT_THRESHOLD,
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_depth: usize,
    pub debounce_ms: u64,
}

impl HistoryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_HISTORY_DEPTH,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Physical surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub px_per_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub default_background: SerializableColor,
}

impl SurfaceConfig {
    /// Surface size in pixels.
    pub fn pixel_size(&self) -> kurbo::Size {
        kurbo::Size::new(
            (self.width_mm * self.px_per_mm).round(),
            (self.height_mm * self.px_per_mm).round(),
        )
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            px_per_mm: PX_PER_MM,
            width_mm: CR80_WIDTH_MM,
            height_mm: CR80_HEIGHT_MM,
            default_background: SerializableColor::white(),
        }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridConfig,
    pub alignment: AlignmentConfig,
    pub history: HistoryConfig,
    pub surface: SurfaceConfig,
}

impl EditorConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded editor config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Reject values the engine cannot operate with.
    pub fn validate(&self) -> EditorResult<()> {
        if !(self.grid.cell_size > 0.0) {
            return Err(EditorError::Config(format!(
                "grid.cell_size must be positive, got {}",
                self.grid.cell_size
            )));
        }
        if !(self.alignment.threshold > 0.0) {
            return Err(EditorError::Config(format!(
                "alignment.threshold must be positive, got {}",
                self.alignment.threshold
            )));
        }
        if self.history.max_depth == 0 {
            return Err(EditorError::Config(
                "history.max_depth must be at least 1".to_string(),
            ));
        }
        if !(self.surface.px_per_mm > 0.0)
            || !(self.surface.width_mm > 0.0)
            || !(self.surface.height_mm > 0.0)
        {
            return Err(EditorError::Config(
                "surface dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(!config.grid.enabled);
        assert!((config.grid.cell_size - 10.0).abs() < f64::EPSILON);
        assert!((config.alignment.threshold - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.history.max_depth, 50);
        assert_eq!(config.history.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_cr80_pixel_size() {
        let size = SurfaceConfig::default().pixel_size();
        assert!((size.width - 324.0).abs() < f64::EPSILON);
        assert!((size.height - 204.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json_str(r#"{"grid": {"enabled": true}}"#).unwrap();
        assert!(config.grid.enabled);
        assert!((config.grid.cell_size - DEFAULT_GRID_SIZE).abs() < f64::EPSILON);
        assert_eq!(config.history.max_depth, MAX_HISTORY_DEPTH);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let result = EditorConfig::from_json_str(r#"{"grid": {"cell_size": 0}}"#);
        assert!(matches!(result, Err(EditorError::Config(_))));

        let result = EditorConfig::from_json_str(r#"{"history": {"max_depth": 0}}"#);
        assert!(matches!(result, Err(EditorError::Config(_))));

        let result = EditorConfig::from_json_str("not json");
        assert!(matches!(result, Err(EditorError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"alignment": {{"threshold": 8.0}}}}"#).unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert!((config.alignment.threshold - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let result = EditorConfig::load("/nonexistent/cardsmith.json");
        assert!(matches!(result, Err(EditorError::Config(_))));
    }
}
