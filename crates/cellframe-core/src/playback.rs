//! Time-driven playback over a [`Timeline`].
//!
//! A [`Scheduler`] delivers repeating ticks tagged with a generation number.
//! Every play/pause/stop bumps the generation, so a tick that was already
//! queued when playback stopped is recognised as stale and ignored.
//! Advancement is elapsed-time based: the scheduler may tick at any rate.

use crate::signal::SubscriptionId;
use crate::timeline::{PlaybackDirection, PlaybackStatus, Step, Timeline, TimelineState};
use log::{debug, info};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

pub const MIN_FRAME_RATE: u32 = 1;
pub const MAX_FRAME_RATE: u32 = 60;
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// A repeating timer with a cancel handle.
pub trait Scheduler {
    /// Begin delivering ticks for `generation` until cancelled.
    fn start(&mut self, generation: u64);

    /// Stop delivering ticks. Must take effect before the next tick is observed.
    fn cancel(&mut self);
}

/// Scheduler driven by the caller. Records which generation is live.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    active: Option<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation currently being ticked, if any.
    pub fn active(&self) -> Option<u64> {
        self.active
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, generation: u64) {
        self.active = Some(generation);
    }

    fn cancel(&mut self) {
        self.active = None;
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick belonged to an older generation or playback is not running.
    Stale,
    /// Not enough time has passed for the current frame.
    Waiting,
    Advanced(usize),
    Wrapped(usize),
    /// Hit a boundary with looping off and stopped.
    Stopped,
}

/// Playback sequencer.
#[derive(Debug)]
pub struct Playback<S: Scheduler> {
    timeline: Timeline,
    scheduler: S,
    frame_rate: u32,
    /// Hold length in frame slots, indexed like the timeline.
    holds: Vec<u32>,
    generation: u64,
    last_advance: Option<Instant>,
}

impl<S: Scheduler> Playback<S> {
    pub fn new(timeline: Timeline, scheduler: S) -> Self {
        Self {
            timeline,
            scheduler,
            frame_rate: DEFAULT_FRAME_RATE,
            holds: Vec::new(),
            generation: 0,
            last_advance: None,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutable access for navigation while stopped or paused.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn state(&self) -> &TimelineState {
        self.timeline.state()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&TimelineState) + 'static) -> SubscriptionId {
        self.timeline.subscribe(callback)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn is_playing(&self) -> bool {
        self.timeline.status() == PlaybackStatus::Playing
    }

    /// Clamped to 1..=60. Takes effect on the next tick.
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.timeline.set_speed(speed);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.timeline.set_looping(looping);
    }

    /// Per-frame hold lengths. Missing or zero entries count as one slot.
    pub fn set_frame_holds(&mut self, holds: Vec<u32>) {
        self.holds = holds;
    }

    /// Time the current frame stays on screen at the current rate and speed.
    pub fn frame_interval(&self) -> Duration {
        let hold = self
            .holds
            .get(self.timeline.current_frame())
            .copied()
            .unwrap_or(1)
            .max(1);
        let base = 1.0 / f64::from(self.frame_rate) / self.timeline.speed();
        Duration::from_secs_f64(base * f64::from(hold))
    }

    /// Swap in a new frame count, e.g. after the active scene changed.
    pub fn load_frames(&mut self, frame_count: usize, holds: Vec<u32>) {
        self.stop();
        self.timeline.initialize(frame_count);
        self.holds = holds;
    }

    pub fn play(&mut self, now: Instant) {
        if self.is_playing() {
            return;
        }
        self.generation += 1;
        self.last_advance = Some(now);
        self.timeline.set_status(PlaybackStatus::Playing);
        self.scheduler.start(self.generation);
        info!(
            "Playback started at frame {} ({:?}, {} fps)",
            self.timeline.current_frame(),
            self.timeline.direction(),
            self.frame_rate
        );
    }

    /// Start playing backwards.
    pub fn play_reverse(&mut self, now: Instant) {
        self.timeline.set_direction(PlaybackDirection::Reverse);
        self.play(now);
    }

    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.halt();
        self.timeline.set_status(PlaybackStatus::Paused);
        info!("Playback paused at frame {}", self.timeline.current_frame());
    }

    /// Halt and rewind to the first frame.
    pub fn stop(&mut self) {
        self.halt();
        self.timeline.set_status(PlaybackStatus::Stopped);
        self.timeline.first_frame();
        info!("Playback stopped");
    }

    pub fn toggle_play_pause(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    fn halt(&mut self) {
        self.scheduler.cancel();
        self.generation += 1;
        self.last_advance = None;
    }

    /// Handle one scheduler tick.
    pub fn tick(&mut self, generation: u64, now: Instant) -> TickOutcome {
        if generation != self.generation || !self.is_playing() {
            debug!("Ignoring stale tick (generation {generation})");
            return TickOutcome::Stale;
        }
        let Some(last) = self.last_advance else {
            return TickOutcome::Stale;
        };
        if now.saturating_duration_since(last) < self.frame_interval() {
            return TickOutcome::Waiting;
        }

        match self.timeline.step() {
            Step::Moved(index) => {
                self.last_advance = Some(now);
                debug!("Advanced to frame {index}");
                TickOutcome::Advanced(index)
            }
            Step::Wrapped(index) => {
                self.last_advance = Some(now);
                debug!("Wrapped to frame {index}");
                TickOutcome::Wrapped(index)
            }
            Step::Blocked => {
                self.stop();
                TickOutcome::Stopped
            }
        }
    }
}
