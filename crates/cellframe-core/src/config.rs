//! Editor tunables, loadable from camelCase JSON.

use crate::camera::{FIT_MARGIN, MAX_ZOOM, MIN_ZOOM};
use crate::error::{EditorError, EditorResult};
use crate::onion::OnionSkinConfig;
use crate::storage::{DEFAULT_AUTOSAVE_INTERVAL_SECS, DEFAULT_DEBOUNCE_MILLIS};
use crate::timeline::TIMELINE_ZOOM_STEP;
use crate::undo::DEFAULT_UNDO_DEPTH;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every field falls back to its default when missing from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub undo_depth: usize,
    pub autosave_interval_secs: u64,
    pub autosave_debounce_ms: u64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub fit_margin: f64,
    pub timeline_zoom_step: f64,
    pub onion_skin: OnionSkinConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            autosave_debounce_ms: DEFAULT_DEBOUNCE_MILLIS,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            fit_margin: FIT_MARGIN,
            timeline_zoom_step: TIMELINE_ZOOM_STEP,
            onion_skin: OnionSkinConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EditorError::ParseFailure(e.to_string()))?;
        config.validated()
    }

    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EditorError::ParseFailure(e.to_string()))
    }

    /// Reject inconsistent limits and pull the onion skin back into range.
    pub fn validated(mut self) -> EditorResult<Self> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(EditorError::InvalidArgument(format!(
                "zoom limits {}..{} are invalid",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.fit_margin > 0.0 && self.fit_margin <= 1.0) {
            return Err(EditorError::InvalidArgument(format!(
                "fit margin {} must be in (0, 1]",
                self.fit_margin
            )));
        }
        self.undo_depth = self.undo_depth.max(1);
        self.onion_skin = self.onion_skin.sanitized();
        Ok(self)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.undo_depth, 50);
        assert_eq!(config.autosave_interval(), Duration::from_secs(30));
        assert_eq!(config.autosave_debounce(), Duration::from_millis(2000));
        assert!((config.fit_margin - 0.9).abs() < f64::EPSILON);
        assert!((config.timeline_zoom_step - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"undoDepth":10,"onionSkin":{"previousFrames":9}}"#)
            .unwrap();
        assert_eq!(config.undo_depth, 10);
        assert_eq!(config.onion_skin.previous_frames, 5);
        assert!((config.max_zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_trip() {
        let mut config = EditorConfig::default();
        config.autosave_interval_secs = 120;
        let json = config.to_json().unwrap();
        assert!(json.contains("autosaveIntervalSecs"));
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            EditorConfig::from_json("{not json"),
            Err(EditorError::ParseFailure(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"minZoom":3.0,"maxZoom":1.0}"#),
            Err(EditorError::InvalidArgument(_))
        ));
    }
}
