//! The playback clock.
//!
//! A small state machine advanced by its host rather than by a private
//! timer thread: the host calls [`Timeline::tick`] once per tick interval
//! while playback is live. That keeps the whole core on one thread and
//! makes an explicit `stop` always win over a tick that was "in flight" —
//! after `stop` the clock is idle and the next `tick` call is a no-op.
//!
//! ```text
//!            start(target)            pause
//!    ┌──────┐ ─────────────→ ┌─────────┐ ─────→ ┌────────┐
//!    │ Idle │                │ Running │        │ Paused │
//!    └──────┘ ←───────────── └─────────┘ ←───── └────────┘
//!        ↑        stop /          │        start (resume)
//!        │        target reached  │
//!        └────────────────────────┘
//! ```
//!
//! `seek` moves the position in any state without changing state.

use std::fmt;

/// Guard against a zero or negative tick interval.
const MIN_TICK_INTERVAL: f64 = 1.0e-6;

/// Clock state. `stop` and natural completion both land back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    Idle,
    Running,
    Paused,
}

/// What one call to [`Timeline::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// The clock advanced to this elapsed time.
    Advanced(f64),
    /// The clock reached its target, reported exactly once per arming.
    /// Carries the final position; the clock is idle again afterwards.
    Completed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineError {
    /// `pause` is only meaningful while the clock is running.
    NotRunning,
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineError::NotRunning => write!(f, "clock is not running"),
        }
    }
}

impl std::error::Error for TimelineError {}

#[derive(Debug, Clone)]
pub struct Timeline {
    state: TimelineState,
    elapsed: f64,
    tick_interval: f64,
    target: Option<f64>,
}

impl Timeline {
    /// Create an idle clock that advances by `tick_interval` seconds per
    /// tick.
    pub fn new(tick_interval: f64) -> Self {
        Self {
            state: TimelineState::Idle,
            elapsed: 0.0,
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            target: None,
        }
    }

    /// Start, or resume from `Paused`, running toward `target` seconds.
    ///
    /// No-op while already running. Starting does not reset the position,
    /// so a seek performed while idle is preserved (scrub, then play).
    pub fn start(&mut self, target: f64) {
        match self.state {
            TimelineState::Running => {}
            TimelineState::Idle | TimelineState::Paused => {
                self.target = Some(target.max(0.0));
                self.state = TimelineState::Running;
            }
        }
    }

    /// Freeze the position without losing it.
    pub fn pause(&mut self) -> Result<(), TimelineError> {
        if self.state != TimelineState::Running {
            return Err(TimelineError::NotRunning);
        }
        self.state = TimelineState::Paused;
        Ok(())
    }

    /// Reset to idle at position zero, from any state.
    pub fn stop(&mut self) {
        self.state = TimelineState::Idle;
        self.elapsed = 0.0;
        self.target = None;
    }

    /// Move the position directly. Allowed in any state and never changes
    /// state. The value is clamped to be non-negative and, while armed, to
    /// the target. Returns the position actually taken so the caller can
    /// notify its observers exactly once.
    pub fn seek(&mut self, to: f64) -> f64 {
        let mut position = to.max(0.0);
        if let Some(target) = self.target {
            position = position.min(target);
        }
        self.elapsed = position;
        position
    }

    /// Advance by one tick interval. Returns `None` unless running.
    pub fn tick(&mut self) -> Option<Tick> {
        if self.state != TimelineState::Running {
            return None;
        }

        self.elapsed += self.tick_interval;

        if let Some(target) = self.target {
            if self.elapsed >= target {
                let reached = self.elapsed.min(target);
                self.stop();
                return Some(Tick::Completed(reached));
            }
        }

        Some(Tick::Advanced(self.elapsed))
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimelineState::Running
    }

    /// Current elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f64 = 0.05;

    #[test]
    fn completes_on_the_exact_tick() {
        let mut clock = Timeline::new(TICK);
        clock.start(0.2);

        assert_eq!(clock.tick(), Some(Tick::Advanced(0.05)));
        assert!(matches!(clock.tick(), Some(Tick::Advanced(_))));
        assert!(matches!(clock.tick(), Some(Tick::Advanced(_))));
        // 4th tick: 0.2 >= 0.2
        assert!(matches!(clock.tick(), Some(Tick::Completed(t)) if (t - 0.2).abs() < 1e-9));

        // Completion is reported exactly once; the clock is idle now.
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.state(), TimelineState::Idle);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn positions_increase_strictly_while_running() {
        let mut clock = Timeline::new(TICK);
        clock.start(10.0);

        let mut last = 0.0;
        for _ in 0..20 {
            match clock.tick() {
                Some(Tick::Advanced(t)) => {
                    assert!(t > last);
                    last = t;
                }
                other => panic!("unexpected tick result {other:?}"),
            }
        }
    }

    #[test]
    fn pause_freezes_and_start_resumes() {
        let mut clock = Timeline::new(TICK);
        clock.start(1.0);
        clock.tick();
        clock.tick();

        clock.pause().unwrap();
        let frozen = clock.elapsed();
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.elapsed(), frozen);

        clock.start(1.0);
        assert!(matches!(clock.tick(), Some(Tick::Advanced(t)) if t > frozen));
    }

    #[test]
    fn pause_fails_unless_running() {
        let mut clock = Timeline::new(TICK);
        assert_eq!(clock.pause(), Err(TimelineError::NotRunning));

        clock.start(1.0);
        clock.pause().unwrap();
        assert_eq!(clock.pause(), Err(TimelineError::NotRunning));
    }

    #[test]
    fn seek_while_paused_moves_without_ticking() {
        let mut clock = Timeline::new(TICK);
        clock.start(1.0);
        clock.tick();
        clock.pause().unwrap();

        assert_eq!(clock.seek(0.1), 0.1);
        assert_eq!(clock.elapsed(), 0.1);
        assert_eq!(clock.state(), TimelineState::Paused);
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn seek_clamps_negative_and_past_target() {
        let mut clock = Timeline::new(TICK);
        assert_eq!(clock.seek(-3.0), 0.0);

        clock.start(1.0);
        assert_eq!(clock.seek(5.0), 1.0);
    }

    #[test]
    fn seek_survives_until_start() {
        // Scrub while idle, then play: position is preserved.
        let mut clock = Timeline::new(TICK);
        clock.seek(0.4);
        clock.start(1.0);
        assert!(matches!(clock.tick(), Some(Tick::Advanced(t)) if (t - 0.45).abs() < 1e-9));
    }

    #[test]
    fn stop_resets_from_any_state() {
        let mut clock = Timeline::new(TICK);
        clock.stop(); // idle stop is safe

        clock.start(1.0);
        clock.tick();
        clock.stop();
        assert_eq!(clock.state(), TimelineState::Idle);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.tick(), None);
    }
}
