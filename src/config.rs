//! Visual configuration for the waveform display.
//!
//! A single plain struct constructed once by the host and handed to the
//! engine. Every field affects only how the bars are laid out or colored,
//! never how levels are scaled or how the playback clock advances (with the
//! one exception of `tick_interval`, which sets the clock's step size).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB color with components in `0.0..=1.0`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channel values.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

/// Deep purple used for the not-yet-played portion of the waveform.
pub const DEFAULT_START_COLOR: Rgb = Rgb::new(61.0 / 255.0, 20.0 / 255.0, 117.0 / 255.0);
/// Pale lavender used for the played portion and for record mode.
pub const DEFAULT_END_COLOR: Rgb = Rgb::new(166.0 / 255.0, 150.0 / 255.0, 225.0 / 255.0);

/// Bar sizing, colors, and clock granularity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VisualConfig {
    /// Width of one metering bar, in view units. Default 3.0.
    pub bar_width: f32,
    /// Horizontal gap between neighboring bars. Default 2.0.
    pub bar_spacing: f32,
    /// Corner radius carried through to the drawing backend. Default 2.0.
    pub corner_radius: f32,
    /// Draw one centered stick per bar instead of a mirrored pair.
    pub single_stick: bool,
    /// Fill for the portion not yet played.
    pub start_color: Rgb,
    /// Fill for the played portion (and all of record mode).
    pub end_color: Rgb,
    /// Seconds the playback clock advances per tick. Default 0.05.
    pub tick_interval: f64,
    /// Request a redraw only every Nth recorded sample. Default 1
    /// (every sample). Zero is treated as 1.
    pub redraw_granularity: usize,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            bar_width: 3.0,
            bar_spacing: 2.0,
            corner_radius: 2.0,
            single_stick: false,
            start_color: DEFAULT_START_COLOR,
            end_color: DEFAULT_END_COLOR,
            tick_interval: crate::DEFAULT_TICK_INTERVAL,
            redraw_granularity: 1,
        }
    }
}

impl VisualConfig {
    /// Number of bars that fit a view of the given width.
    pub fn bar_capacity(&self, view_width: f32) -> usize {
        let slot = self.bar_width + self.bar_spacing;
        if slot <= 0.0 || view_width <= 0.0 {
            return 0;
        }
        (view_width / slot) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_floors_partial_slots() {
        let config = VisualConfig::default();
        // 3.0 + 2.0 = 5.0 units per bar
        assert_eq!(config.bar_capacity(50.0), 10);
        assert_eq!(config.bar_capacity(54.9), 10);
        assert_eq!(config.bar_capacity(55.0), 11);
    }

    #[test]
    fn capacity_is_zero_for_degenerate_widths() {
        let config = VisualConfig::default();
        assert_eq!(config.bar_capacity(0.0), 0);
        assert_eq!(config.bar_capacity(-10.0), 0);
    }
}
