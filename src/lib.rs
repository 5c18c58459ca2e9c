pub mod config; // Bar sizing, colors, clock granularity
pub mod decode; // Amplitude extraction from audio files
pub mod engine; // Orchestrating core: modes, levels, clock, redraws
pub mod observer; // Last-value-cached position broadcast
pub mod render; // Per-bar rectangles and two-color fill
pub mod scale; // Variable-length levels onto a fixed bar count
pub mod seek; // Pointer offset to timeline position
pub mod timeline; // Tick-driven playback clock

pub use config::{Rgb, VisualConfig};
pub use engine::{EngineError, Generation, Mode, RedrawRequest, WaveformEngine};
pub use timeline::{Tick, Timeline, TimelineError, TimelineState};

/// Seconds the playback clock advances per tick unless configured.
pub const DEFAULT_TICK_INTERVAL: f64 = 0.05;
/// Conventional number of levels a decoder delivers for playback.
pub const NOMINAL_LEVEL_COUNT: usize = 100;
