//! Onion skinning: which neighbouring frames to ghost behind the current one.

use crate::model::{Frame, FrameId};
use peniko::Color;
use serde::{Deserialize, Serialize};

pub const MAX_ONION_FRAMES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnionMode {
    #[default]
    Overlay,
    Split,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnionSkinConfig {
    pub enabled: bool,
    pub previous_frames: usize,
    pub next_frames: usize,
    pub previous_opacity: f64,
    pub next_opacity: f64,
    pub previous_tint: String,
    pub next_tint: String,
    pub mode: OnionMode,
}

impl Default for OnionSkinConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            previous_frames: 1,
            next_frames: 1,
            previous_opacity: 0.3,
            next_opacity: 0.3,
            previous_tint: "#ff0000".to_string(),
            next_tint: "#0000ff".to_string(),
            mode: OnionMode::Overlay,
        }
    }
}

impl OnionSkinConfig {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn set_previous_frames(&mut self, count: usize) {
        self.previous_frames = count.min(MAX_ONION_FRAMES);
    }

    pub fn set_next_frames(&mut self, count: usize) {
        self.next_frames = count.min(MAX_ONION_FRAMES);
    }

    pub fn set_previous_opacity(&mut self, opacity: f64) {
        self.previous_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_next_opacity(&mut self, opacity: f64) {
        self.next_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Pull values loaded from disk back into range.
    pub fn sanitized(mut self) -> Self {
        self.set_previous_frames(self.previous_frames);
        self.set_next_frames(self.next_frames);
        self.set_previous_opacity(self.previous_opacity);
        self.set_next_opacity(self.next_opacity);
        self
    }

    pub fn previous_color(&self) -> Color {
        parse_hex_color(&self.previous_tint).unwrap_or(Color::from_rgba8(255, 0, 0, 255))
    }

    pub fn next_color(&self) -> Color {
        parse_hex_color(&self.next_tint).unwrap_or(Color::from_rgba8(0, 0, 255, 255))
    }

    /// Ghost layers around `current_index`, in timeline order.
    /// Invisible frames are skipped but still count toward the range.
    pub fn frames_to_display(&self, frames: &[Frame], current_index: usize) -> Vec<OnionLayer> {
        if !self.enabled {
            return Vec::new();
        }

        let previous_color = self.previous_color();
        let next_color = self.next_color();
        let layer = |index: usize, side: OnionSide, opacity: f64, tint: Color| {
            frames
                .get(index)
                .filter(|frame| frame.visible)
                .map(|frame| OnionLayer {
                    frame_id: frame.id,
                    frame_index: index,
                    side,
                    opacity,
                    tint,
                })
        };

        let start = current_index.saturating_sub(self.previous_frames);
        let previous = (start..current_index.min(frames.len()))
            .filter_map(|i| layer(i, OnionSide::Previous, self.previous_opacity, previous_color));
        let next = (current_index + 1..=current_index + self.next_frames)
            .filter_map(|i| layer(i, OnionSide::Next, self.next_opacity, next_color));

        previous.chain(next).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnionSide {
    Previous,
    Next,
}

/// One ghosted frame.
#[derive(Debug, Clone)]
pub struct OnionLayer {
    pub frame_id: FrameId,
    pub frame_index: usize,
    pub side: OnionSide,
    pub opacity: f64,
    pub tint: Color,
}

/// Parse a `#rgb` or `#rrggbb` color.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        3 => {
            let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
            Some(Color::from_rgba8(short(0)?, short(1)?, short(2)?, 255))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn frames(count: usize) -> Vec<Frame> {
        let scene_id = Uuid::new_v4();
        (0..count).map(|i| Frame::new(scene_id, i)).collect()
    }

    fn enabled(previous: usize, next: usize) -> OnionSkinConfig {
        OnionSkinConfig {
            enabled: true,
            previous_frames: previous,
            next_frames: next,
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_shows_nothing() {
        let config = OnionSkinConfig::default();
        assert!(config.frames_to_display(&frames(3), 1).is_empty());
    }

    #[test]
    fn test_neighbours_in_order() {
        let config = enabled(2, 1);
        let layers = config.frames_to_display(&frames(6), 3);
        let indices: Vec<usize> = layers.iter().map(|l| l.frame_index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert_eq!(layers[0].side, OnionSide::Previous);
        assert_eq!(layers[2].side, OnionSide::Next);
        assert!((layers[2].opacity - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clipped_at_edges() {
        let config = enabled(3, 3);
        let layers = config.frames_to_display(&frames(3), 0);
        let indices: Vec<usize> = layers.iter().map(|l| l.frame_index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_invisible_frames_skipped() {
        let config = enabled(2, 0);
        let mut frames = frames(4);
        frames[2].visible = false;
        let layers = config.frames_to_display(&frames, 3);
        let indices: Vec<usize> = layers.iter().map(|l| l.frame_index).collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn test_setters_clamp() {
        let mut config = OnionSkinConfig::default();
        config.set_previous_frames(9);
        config.set_next_opacity(2.0);
        assert_eq!(config.previous_frames, MAX_ONION_FRAMES);
        assert!((config.next_opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_hex_color() {
        let rgba = |s: &str| parse_hex_color(s).map(|c| c.to_rgba8());
        assert_eq!(rgba("#ff0000"), Some(Color::from_rgba8(255, 0, 0, 255).to_rgba8()));
        assert_eq!(rgba("#00f"), Some(Color::from_rgba8(0, 0, 255, 255).to_rgba8()));
        assert!(parse_hex_color("blue").is_none());
        assert!(parse_hex_color("#12345").is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: OnionSkinConfig = serde_json::from_str(r#"{"enabled":true,"nextFrames":7}"#).unwrap();
        let config = config.sanitized();
        assert!(config.enabled);
        assert_eq!(config.next_frames, MAX_ONION_FRAMES);
        assert_eq!(config.previous_tint, "#ff0000");
    }
}
