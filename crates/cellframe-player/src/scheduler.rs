//! Sleep-based scheduler for headless playback.

use cellframe_core::Scheduler;
use std::time::Duration;

/// Wakes the playback loop every `interval` while a generation is live.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    active: Option<u64>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn active(&self) -> Option<u64> {
        self.active
    }

    /// Sleep one interval and return the live generation, or `None`
    /// right away once cancelled.
    pub fn wait(&self) -> Option<u64> {
        let generation = self.active?;
        std::thread::sleep(self.interval);
        Some(generation)
    }
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self, generation: u64) {
        self.active = Some(generation);
    }

    fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellframe_core::{Playback, TickOutcome, Timeline};
    use std::time::Instant;

    #[test]
    fn test_cancel_ends_wait() {
        let mut scheduler = IntervalScheduler::new(Duration::from_millis(1));
        assert_eq!(scheduler.wait(), None);
        scheduler.start(4);
        assert_eq!(scheduler.wait(), Some(4));
        scheduler.cancel();
        assert_eq!(scheduler.wait(), None);
    }

    #[test]
    fn test_drives_playback_to_the_end() {
        let mut playback = Playback::new(
            Timeline::new(3),
            IntervalScheduler::new(Duration::from_millis(2)),
        );
        playback.set_frame_rate(60);
        playback.set_speed(4.0);
        playback.set_looping(false);
        playback.play(Instant::now());

        let mut outcomes = Vec::new();
        while let Some(generation) = playback.scheduler().wait() {
            outcomes.push(playback.tick(generation, Instant::now()));
        }
        assert_eq!(outcomes.last(), Some(&TickOutcome::Stopped));
        assert!(outcomes.contains(&TickOutcome::Advanced(2)));
    }
}
