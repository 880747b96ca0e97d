//! Timeline navigation and frame selection.

use crate::signal::{Observable, SubscriptionId};
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 4.0;
pub const MIN_TIMELINE_ZOOM: f64 = 0.5;
pub const MAX_TIMELINE_ZOOM: f64 = 3.0;
pub const TIMELINE_ZOOM_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackDirection {
    #[default]
    Forward,
    Reverse,
}

/// Observable timeline state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    pub current_frame_index: usize,
    /// Sorted, unique.
    pub selected_frame_indices: Vec<usize>,
    pub playback_status: PlaybackStatus,
    pub playback_direction: PlaybackDirection,
    pub playback_speed: f64,
    pub looping: bool,
    pub zoom_level: f64,
    pub scroll_position: f64,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            current_frame_index: 0,
            selected_frame_indices: Vec::new(),
            playback_status: PlaybackStatus::Stopped,
            playback_direction: PlaybackDirection::Forward,
            playback_speed: 1.0,
            looping: false,
            zoom_level: 1.0,
            scroll_position: 0.0,
        }
    }
}

/// Where a step landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(usize),
    /// Crossed a boundary and wrapped around because looping is on.
    Wrapped(usize),
    /// At a boundary with looping off; nothing changed.
    Blocked,
}

/// Timeline over the frames of the active scene.
#[derive(Debug, Default)]
pub struct Timeline {
    state: Observable<TimelineState>,
    total_frames: usize,
}

impl Timeline {
    pub fn new(total_frames: usize) -> Self {
        let mut timeline = Self::default();
        timeline.initialize(total_frames);
        timeline
    }

    pub fn state(&self) -> &TimelineState {
        self.state.get()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&TimelineState) + 'static) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn current_frame(&self) -> usize {
        self.state.get().current_frame_index
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.get().playback_status
    }

    pub fn direction(&self) -> PlaybackDirection {
        self.state.get().playback_direction
    }

    pub fn speed(&self) -> f64 {
        self.state.get().playback_speed
    }

    pub fn looping(&self) -> bool {
        self.state.get().looping
    }

    /// Reset to the first frame with only it selected.
    pub fn initialize(&mut self, frame_count: usize) {
        self.total_frames = frame_count;
        self.state.update(|s| {
            s.current_frame_index = 0;
            s.selected_frame_indices = if frame_count > 0 { vec![0] } else { Vec::new() };
        });
    }

    /// Change the frame count, pulling the current index back into range.
    pub fn set_total_frames(&mut self, count: usize) {
        self.total_frames = count;
        let last = count.saturating_sub(1);
        self.state.update(|s| {
            if s.current_frame_index >= count {
                s.current_frame_index = last;
            }
            s.selected_frame_indices.retain(|i| *i < count);
        });
    }

    /// Jump to `index`. Out-of-range indices are ignored.
    pub fn set_current_frame(&mut self, index: usize) -> bool {
        if index >= self.total_frames {
            return false;
        }
        self.state.update(|s| s.current_frame_index = index);
        true
    }

    pub fn next_frame(&mut self) -> Step {
        let current = self.current_frame();
        if current + 1 < self.total_frames {
            self.set_current_frame(current + 1);
            Step::Moved(current + 1)
        } else if self.looping() && self.total_frames > 0 {
            self.set_current_frame(0);
            Step::Wrapped(0)
        } else {
            Step::Blocked
        }
    }

    pub fn previous_frame(&mut self) -> Step {
        let current = self.current_frame();
        if current > 0 {
            self.set_current_frame(current - 1);
            Step::Moved(current - 1)
        } else if self.looping() && self.total_frames > 0 {
            let last = self.total_frames - 1;
            self.set_current_frame(last);
            Step::Wrapped(last)
        } else {
            Step::Blocked
        }
    }

    /// One step in the configured playback direction.
    pub fn step(&mut self) -> Step {
        match self.direction() {
            PlaybackDirection::Forward => self.next_frame(),
            PlaybackDirection::Reverse => self.previous_frame(),
        }
    }

    pub fn first_frame(&mut self) {
        self.set_current_frame(0);
    }

    pub fn last_frame(&mut self) {
        self.set_current_frame(self.total_frames.saturating_sub(1));
    }

    /// Move by `delta` frames, clamped to the timeline.
    pub fn jump_frames(&mut self, delta: isize) {
        if self.total_frames == 0 {
            return;
        }
        let target = self
            .current_frame()
            .saturating_add_signed(delta)
            .min(self.total_frames - 1);
        self.set_current_frame(target);
    }

    /// Select one frame, or toggle it when `multi` is set.
    pub fn select_frame(&mut self, index: usize, multi: bool) {
        if index >= self.total_frames {
            return;
        }
        self.state.update(|s| {
            if multi {
                if let Some(pos) = s.selected_frame_indices.iter().position(|i| *i == index) {
                    s.selected_frame_indices.remove(pos);
                } else {
                    s.selected_frame_indices.push(index);
                    s.selected_frame_indices.sort_unstable();
                }
            } else {
                s.selected_frame_indices = vec![index];
            }
        });
    }

    /// Select the inclusive range between two indices, in either order.
    pub fn select_frame_range(&mut self, a: usize, b: usize) {
        if self.total_frames == 0 {
            return;
        }
        let start = a.min(b);
        let end = a.max(b).min(self.total_frames - 1);
        self.state
            .update(|s| s.selected_frame_indices = (start..=end).collect());
    }

    pub fn select_all_frames(&mut self) {
        let count = self.total_frames;
        self.state
            .update(|s| s.selected_frame_indices = (0..count).collect());
    }

    pub fn clear_frame_selection(&mut self) {
        self.state.update(|s| s.selected_frame_indices.clear());
    }

    pub fn set_status(&mut self, status: PlaybackStatus) {
        self.state.update(|s| s.playback_status = status);
    }

    pub fn set_direction(&mut self, direction: PlaybackDirection) {
        self.state.update(|s| s.playback_direction = direction);
    }

    /// Clamped to 0.25–4. Non-finite values are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            return;
        }
        let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.state.update(|s| s.playback_speed = speed);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.state.update(|s| s.looping = looping);
    }

    pub fn toggle_looping(&mut self) {
        self.state.update(|s| s.looping = !s.looping);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let zoom = zoom.clamp(MIN_TIMELINE_ZOOM, MAX_TIMELINE_ZOOM);
        self.state.update(|s| s.zoom_level = zoom);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(TIMELINE_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-TIMELINE_ZOOM_STEP);
    }

    /// Change the zoom level by a signed step, clamped.
    pub fn zoom_by(&mut self, step: f64) {
        self.set_zoom(self.state.get().zoom_level + step);
    }

    pub fn set_scroll(&mut self, position: f64) {
        if !position.is_finite() {
            return;
        }
        self.state.update(|s| s.scroll_position = position.max(0.0));
    }

    /// Back to defaults. The frame count is kept.
    pub fn reset(&mut self) {
        self.state.set(TimelineState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_selects_first() {
        let timeline = Timeline::new(5);
        assert_eq!(timeline.current_frame(), 0);
        assert_eq!(timeline.state().selected_frame_indices, vec![0]);
    }

    #[test]
    fn test_set_current_frame_ignores_out_of_range() {
        let mut timeline = Timeline::new(3);
        assert!(!timeline.set_current_frame(3));
        assert!(timeline.set_current_frame(2));
        assert_eq!(timeline.current_frame(), 2);
    }

    #[test]
    fn test_shrinking_clamps_current() {
        let mut timeline = Timeline::new(10);
        timeline.set_current_frame(8);
        timeline.set_total_frames(4);
        assert_eq!(timeline.current_frame(), 3);
    }

    #[test]
    fn test_next_and_previous_without_looping() {
        let mut timeline = Timeline::new(2);
        assert_eq!(timeline.next_frame(), Step::Moved(1));
        assert_eq!(timeline.next_frame(), Step::Blocked);
        assert_eq!(timeline.previous_frame(), Step::Moved(0));
        assert_eq!(timeline.previous_frame(), Step::Blocked);
    }

    #[test]
    fn test_wrapping_with_looping() {
        let mut timeline = Timeline::new(3);
        timeline.set_looping(true);
        assert_eq!(timeline.previous_frame(), Step::Wrapped(2));
        assert_eq!(timeline.next_frame(), Step::Wrapped(0));
    }

    #[test]
    fn test_jump_frames_clamps() {
        let mut timeline = Timeline::new(5);
        timeline.jump_frames(10);
        assert_eq!(timeline.current_frame(), 4);
        timeline.jump_frames(-2);
        assert_eq!(timeline.current_frame(), 2);
        timeline.jump_frames(-10);
        assert_eq!(timeline.current_frame(), 0);
    }

    #[test]
    fn test_multi_select_toggles_sorted() {
        let mut timeline = Timeline::new(6);
        timeline.select_frame(4, true);
        timeline.select_frame(2, true);
        assert_eq!(timeline.state().selected_frame_indices, vec![0, 2, 4]);
        timeline.select_frame(0, true);
        assert_eq!(timeline.state().selected_frame_indices, vec![2, 4]);
        timeline.select_frame(5, false);
        assert_eq!(timeline.state().selected_frame_indices, vec![5]);
    }

    #[test]
    fn test_select_range_any_order() {
        let mut timeline = Timeline::new(5);
        timeline.select_frame_range(3, 1);
        assert_eq!(timeline.state().selected_frame_indices, vec![1, 2, 3]);
        timeline.select_frame_range(2, 99);
        assert_eq!(timeline.state().selected_frame_indices, vec![2, 3, 4]);
    }

    #[test]
    fn test_speed_and_zoom_clamps() {
        let mut timeline = Timeline::new(1);
        timeline.set_speed(10.0);
        assert!((timeline.speed() - MAX_SPEED).abs() < f64::EPSILON);
        timeline.set_speed(0.0);
        assert!((timeline.speed() - MIN_SPEED).abs() < f64::EPSILON);

        for _ in 0..20 {
            timeline.zoom_in();
        }
        assert!((timeline.state().zoom_level - MAX_TIMELINE_ZOOM).abs() < f64::EPSILON);
        timeline.set_zoom(0.1);
        assert!((timeline.state().zoom_level - MIN_TIMELINE_ZOOM).abs() < f64::EPSILON);
        timeline.zoom_in();
        assert!((timeline.state().zoom_level - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let mut timeline = Timeline::new(1);
        timeline.set_speed(2.0);
        timeline.set_zoom(1.5);
        timeline.set_scroll(40.0);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            timeline.set_speed(bad);
            timeline.set_zoom(bad);
            timeline.set_scroll(bad);
        }
        assert!((timeline.speed() - 2.0).abs() < f64::EPSILON);
        assert!((timeline.state().zoom_level - 1.5).abs() < f64::EPSILON);
        assert!((timeline.state().scroll_position - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scroll_not_negative() {
        let mut timeline = Timeline::new(1);
        timeline.set_scroll(-30.0);
        assert!(timeline.state().scroll_position.abs() < f64::EPSILON);
    }
}
