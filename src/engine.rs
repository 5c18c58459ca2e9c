//! The orchestrating core: one engine instance owns the level arrays, the
//! playback clock, the gradient fraction, and the redraw queue a drawing
//! backend drains.
//!
//! The engine is single-threaded. Asynchronous collaborators (an input
//! stream delivering metering levels, a decode worker) hand their results
//! to the host thread, which applies them here; decode completions carry
//! a [`Generation`] so anything that raced a `reset` is discarded.

use std::collections::VecDeque;
use std::fmt;

use crate::config::VisualConfig;
use crate::observer::TimePublisher;
use crate::render::{self, ViewMetrics, WaveformGeometry};
use crate::scale::scale_levels;
use crate::seek;
use crate::timeline::{Tick, Timeline};
use crate::NOMINAL_LEVEL_COUNT;

/// Which data discipline the engine enforces, fixed at construction.
///
/// Record mode appends raw metering levels one at a time; playback mode
/// bulk-loads a pre-scaled sequence and runs the clock against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Record,
    Playback,
}

/// Token for one lifetime of the engine's contents.
///
/// Captured before kicking off asynchronous work and checked when the
/// result comes back: `reset` bumps the generation, so a stale completion
/// can never clobber fresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// One frame the drawing backend should render.
///
/// Carries the gradient as it was when the redraw was requested, so
/// back-to-back state changes (notably the stop pulse) stay observable
/// even if the host drains the queue late.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedrawRequest {
    pub gradient: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// An operation reserved for the other mode was called.
    ModeViolation { required: Mode, actual: Mode },
    /// `pause` without a running clock.
    NotPlaying,
    /// `play` before any levels were loaded.
    NoLevelsLoaded,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ModeViolation { required, actual } => {
                write!(f, "operation requires {required:?} mode, engine is in {actual:?} mode")
            }
            EngineError::NotPlaying => write!(f, "playback is not running"),
            EngineError::NoLevelsLoaded => write!(f, "no levels loaded for playback"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Scrollable, time-synchronized amplitude bar visualization core.
pub struct WaveformEngine {
    mode: Mode,
    config: VisualConfig,
    view_width: f32,
    raw_levels: Vec<f32>,
    scaled_levels: Vec<f32>,
    gradient: Option<f32>,
    duration: Option<f64>,
    timeline: Timeline,
    publisher: TimePublisher,
    generation: u64,
    redraws: VecDeque<RedrawRequest>,
    samples_since_redraw: usize,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl WaveformEngine {
    pub fn new(mode: Mode, config: VisualConfig) -> Self {
        let timeline = Timeline::new(config.tick_interval);
        Self {
            mode,
            config,
            view_width: 0.0,
            raw_levels: Vec::new(),
            scaled_levels: Vec::new(),
            gradient: None,
            duration: None,
            timeline,
            publisher: TimePublisher::new(),
            generation: 0,
            redraws: VecDeque::new(),
            samples_since_redraw: 0,
            on_complete: None,
        }
    }

    // ------------------------------------------------------------------
    // Layout

    /// Tell the engine how wide its view currently is, in view units.
    /// Changing the width changes the bar capacity and requests a redraw.
    pub fn set_view_width(&mut self, width: f32) {
        let width = width.max(0.0);
        if (width - self.view_width).abs() > f32::EPSILON {
            self.view_width = width;
            self.request_redraw();
        }
    }

    /// Bars that fit the current view width.
    pub fn bar_capacity(&self) -> usize {
        self.config.bar_capacity(self.view_width)
    }

    // ------------------------------------------------------------------
    // Record mode

    /// Append one metering level (clamped to `0.0..=1.0`).
    pub fn add_sample(&mut self, level: f32) -> Result<(), EngineError> {
        self.require_mode(Mode::Record, "add_sample")?;

        self.raw_levels.push(level.clamp(0.0, 1.0));

        self.samples_since_redraw += 1;
        if self.samples_since_redraw >= self.config.redraw_granularity.max(1) {
            self.samples_since_redraw = 0;
            self.request_redraw();
        }
        Ok(())
    }

    /// Re-derive the scaled levels from everything recorded so far,
    /// targeting the current bar capacity. Returns the new levels; an
    /// empty recording yields an empty result without error.
    pub fn rescale(&mut self) -> Result<&[f32], EngineError> {
        self.require_mode(Mode::Record, "rescale")?;

        self.scaled_levels = scale_levels(&self.raw_levels, self.bar_capacity());
        self.request_redraw();
        Ok(&self.scaled_levels)
    }

    // ------------------------------------------------------------------
    // Playback mode

    /// Replace the scaled levels wholesale with decoder output.
    ///
    /// The sequence is truncated to the nominal level count and clamped;
    /// the gradient resets to the very start of the track.
    pub fn load_levels(&mut self, mut levels: Vec<f32>) -> Result<(), EngineError> {
        self.require_mode(Mode::Playback, "load_levels")?;

        levels.truncate(NOMINAL_LEVEL_COUNT);
        for level in &mut levels {
            *level = level.clamp(0.0, 1.0);
        }
        self.scaled_levels = levels;
        self.gradient = Some(0.0);
        self.request_redraw();
        Ok(())
    }

    /// Start (or resume) the playback clock.
    ///
    /// The first successful `play` fixes the engine's duration; later
    /// calls with a different value keep the original. Fails when no
    /// levels are loaded.
    pub fn play(&mut self, duration: f64) -> Result<(), EngineError> {
        self.require_mode(Mode::Playback, "play")?;

        if self.scaled_levels.is_empty() {
            log::warn!("play requested before any levels were loaded");
            return Err(EngineError::NoLevelsLoaded);
        }

        let target = *self.duration.get_or_insert(duration.max(0.0));
        self.timeline.start(target);
        Ok(())
    }

    /// Advance the playback clock by one tick interval.
    ///
    /// The host calls this once per tick interval while playback is live.
    /// A no-op when the clock is idle or paused, so a tick racing an
    /// explicit `stop` simply evaporates.
    pub fn tick(&mut self) {
        match self.timeline.tick() {
            Some(Tick::Advanced(position)) => {
                if let Some(duration) = self.duration {
                    if duration > 0.0 {
                        self.gradient = Some(((position / duration) as f32).min(1.0));
                    }
                }
                self.publisher.publish(position);
                self.request_redraw();
            }
            Some(Tick::Completed(position)) => {
                self.publisher.publish(position);
                self.stop();
                if let Some(mut complete) = self.on_complete.take() {
                    complete();
                    self.on_complete = Some(complete);
                }
            }
            None => {}
        }
    }

    /// Freeze playback at the current position.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.timeline.pause().map_err(|_| {
            log::warn!("pause requested while the clock is not running");
            EngineError::NotPlaying
        })
    }

    /// Stop playback and render the stop pulse: one full-progress frame,
    /// then one with the overlay cleared. Safe in any state.
    pub fn stop(&mut self) {
        self.timeline.stop();
        self.publisher.publish(0.0);

        self.gradient = Some(1.0);
        self.request_redraw();
        self.gradient = None;
        self.request_redraw();
    }

    /// Return the engine to its post-construction state.
    ///
    /// Also invalidates the current [`Generation`], so decode completions
    /// kicked off before the reset are discarded when they arrive.
    pub fn reset(&mut self) {
        self.raw_levels.clear();
        self.scaled_levels.clear();
        self.gradient = None;
        self.duration = None;
        self.timeline.stop();
        self.generation = self.generation.wrapping_add(1);
        self.samples_since_redraw = 0;
        self.publisher.publish(0.0);
        self.request_redraw();
    }

    // ------------------------------------------------------------------
    // Seeking

    /// Set the playback position directly.
    ///
    /// The time is clamped non-negative (and to the duration when known).
    /// When the clock is not running the gradient takes `fraction`
    /// immediately; while running, the next natural tick overwrites it,
    /// avoiding a visual fight between the pointer and the clock.
    pub fn set_position(&mut self, time: f64, fraction: Option<f32>) {
        let mut time = time.max(0.0);
        if let Some(duration) = self.duration {
            time = time.min(duration);
        }

        let position = self.timeline.seek(time);
        if !self.timeline.is_running() {
            self.gradient = fraction.map(|f| f.clamp(0.0, 1.0));
        }
        self.publisher.publish(position);
        self.request_redraw();
    }

    /// Scrub to pointer offset `x` within a view of `width`.
    ///
    /// Silently does nothing until a duration is known.
    pub fn scrub(&mut self, x: f32, width: f32) {
        if let Some(scrub) = seek::map_scrub(x, width, self.duration) {
            self.set_position(scrub.time, Some(scrub.fraction));
        }
    }

    // ------------------------------------------------------------------
    // Asynchronous collaborators

    /// The generation a host should capture before starting async work.
    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Apply a decode result, unless the engine has been reset since the
    /// work started. Returns whether the levels were actually applied.
    pub fn complete_decode(
        &mut self,
        generation: Generation,
        levels: Vec<f32>,
    ) -> Result<bool, EngineError> {
        if generation != self.generation() {
            log::warn!("discarding decode result from a superseded generation");
            return Ok(false);
        }
        self.load_levels(levels).map(|_| true)
    }

    // ------------------------------------------------------------------
    // Observation

    /// Observe every position change (ticks, seeks, resets). The observer
    /// immediately receives the current position.
    pub fn subscribe_position(&mut self, observer: impl FnMut(f64) + 'static) {
        self.publisher.subscribe(observer);
    }

    /// Hook invoked once each time playback runs to natural completion.
    pub fn on_playback_complete(&mut self, hook: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    /// Next pending frame for the drawing backend, oldest first.
    pub fn poll_redraw(&mut self) -> Option<RedrawRequest> {
        self.redraws.pop_front()
    }

    /// Frame geometry for the current state at the given view height.
    pub fn geometry(&self, height: f32) -> WaveformGeometry {
        self.geometry_with_gradient(height, self.gradient)
    }

    /// Frame geometry with an explicit gradient, for hosts replaying a
    /// [`RedrawRequest`].
    pub fn geometry_with_gradient(&self, height: f32, gradient: Option<f32>) -> WaveformGeometry {
        render::layout(
            self.levels(),
            ViewMetrics {
                width: self.view_width,
                height,
            },
            self.mode,
            gradient,
            &self.config,
        )
    }

    // ------------------------------------------------------------------
    // Accessors

    /// The levels a frame should draw: the scaled sequence when one
    /// exists, otherwise the raw recording.
    pub fn levels(&self) -> &[f32] {
        if self.scaled_levels.is_empty() {
            &self.raw_levels
        } else {
            &self.scaled_levels
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn gradient(&self) -> Option<f32> {
        self.gradient
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Current playback position in seconds.
    pub fn position(&self) -> f64 {
        self.timeline.elapsed()
    }

    pub fn is_playing(&self) -> bool {
        self.timeline.is_running()
    }

    // ------------------------------------------------------------------

    fn require_mode(&self, required: Mode, operation: &'static str) -> Result<(), EngineError> {
        if self.mode != required {
            log::warn!("{operation} requires {required:?} mode, engine is in {:?} mode", self.mode);
            return Err(EngineError::ModeViolation {
                required,
                actual: self.mode,
            });
        }
        Ok(())
    }

    fn request_redraw(&mut self) {
        self.redraws.push_back(RedrawRequest {
            gradient: self.gradient,
        });
    }
}
