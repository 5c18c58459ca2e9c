//! Per-bar rectangle and fill computation.
//!
//! This is the sole interface between the core and whatever actually
//! draws: the engine's levels, gradient fraction, and config go in, a
//! list of rectangles plus a two-color fill description comes out. The
//! core never touches a graphics API.

use crate::config::{Rgb, VisualConfig};
use crate::engine::Mode;

/// An axis-aligned rectangle in view units, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Geometry for one visible bar.
///
/// A level renders either as one stick centered on the mid-line with
/// doubled height, or as a mirrored pair above and below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bar {
    Single(Rect),
    Pair { upper: Rect, lower: Rect },
}

/// How to color the bars once they are treated as a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// Everything in one color.
    Solid(Rgb),
    /// Two-color split at `boundary_x`: `played` to the left,
    /// `remaining` to the right.
    Split {
        boundary_x: f32,
        played: Rgb,
        remaining: Rgb,
    },
}

/// Complete frame description for a drawing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformGeometry {
    pub bars: Vec<Bar>,
    pub fill: Fill,
    pub corner_radius: f32,
}

/// Dimensions of the drawing surface, in view units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMetrics {
    pub width: f32,
    pub height: f32,
}

/// Compute the frame geometry for the given levels.
///
/// Levels are windowed to the last `bar_capacity` entries, so a long
/// recording scrolls: the newest samples stay on screen and older ones
/// fall off the left edge. The fill rules:
///
/// - Record mode always fills with the end color, whatever the gradient
///   says. Intentional, inherited behavior.
/// - Playback with a gradient fraction splits at `fraction * width`,
///   played portion in the end color.
/// - Playback without a fraction means no progress overlay: start color
///   throughout.
pub fn layout(
    levels: &[f32],
    view: ViewMetrics,
    mode: Mode,
    gradient: Option<f32>,
    config: &VisualConfig,
) -> WaveformGeometry {
    let capacity = config.bar_capacity(view.width);
    let offset = levels.len().saturating_sub(capacity);

    let center_y = view.height / 2.0;
    let max_bar_height = view.height / 2.0;
    let slot = config.bar_width + config.bar_spacing;

    let bars = levels[offset..]
        .iter()
        .enumerate()
        .map(|(index, &level)| {
            let x = index as f32 * slot;
            let height = level.clamp(0.0, 1.0) * max_bar_height;

            if config.single_stick {
                Bar::Single(Rect {
                    x,
                    y: center_y - height,
                    width: config.bar_width,
                    height: height * 2.0,
                })
            } else {
                Bar::Pair {
                    upper: Rect {
                        x,
                        y: center_y - height,
                        width: config.bar_width,
                        height,
                    },
                    lower: Rect {
                        x,
                        y: center_y,
                        width: config.bar_width,
                        height,
                    },
                }
            }
        })
        .collect();

    let fill = match (mode, gradient) {
        (Mode::Record, _) => Fill::Solid(config.end_color),
        (Mode::Playback, Some(fraction)) => Fill::Split {
            boundary_x: fraction.clamp(0.0, 1.0) * view.width,
            played: config.end_color,
            remaining: config.start_color,
        },
        (Mode::Playback, None) => Fill::Solid(config.start_color),
    };

    WaveformGeometry {
        bars,
        fill,
        corner_radius: config.corner_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> VisualConfig {
        VisualConfig {
            bar_width: 3.0,
            bar_spacing: 2.0,
            ..VisualConfig::default()
        }
    }

    fn view() -> ViewMetrics {
        ViewMetrics {
            width: 50.0,
            height: 40.0,
        }
    }

    #[test]
    fn pair_bars_mirror_around_the_center_line() {
        let geometry = layout(&[0.5], view(), Mode::Record, None, &test_config());

        assert_eq!(geometry.bars.len(), 1);
        match geometry.bars[0] {
            Bar::Pair { upper, lower } => {
                // level 0.5 of a 20-unit half-height
                assert_eq!(upper.height, 10.0);
                assert_eq!(upper.y, 10.0);
                assert_eq!(lower.y, 20.0);
                assert_eq!(lower.height, 10.0);
                assert_eq!(upper.x, 0.0);
                assert_eq!(upper.width, 3.0);
            }
            ref other => panic!("expected a pair, got {other:?}"),
        }
    }

    #[test]
    fn single_stick_doubles_the_height() {
        let config = VisualConfig {
            single_stick: true,
            ..test_config()
        };
        let geometry = layout(&[0.5], view(), Mode::Record, None, &config);

        match geometry.bars[0] {
            Bar::Single(rect) => {
                assert_eq!(rect.y, 10.0);
                assert_eq!(rect.height, 20.0);
            }
            ref other => panic!("expected a single stick, got {other:?}"),
        }
    }

    #[test]
    fn bars_advance_by_width_plus_spacing() {
        let levels = [0.1, 0.2, 0.3];
        let geometry = layout(&levels, view(), Mode::Record, None, &test_config());

        let xs: Vec<f32> = geometry
            .bars
            .iter()
            .map(|bar| match bar {
                Bar::Single(rect) => rect.x,
                Bar::Pair { upper, .. } => upper.x,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn long_histories_window_to_the_newest_bars() {
        // capacity = 50 / 5 = 10 bars; 12 levels means the first two scroll off
        let levels: Vec<f32> = (0..12).map(|i| i as f32 / 12.0).collect();
        let geometry = layout(&levels, view(), Mode::Record, None, &test_config());

        assert_eq!(geometry.bars.len(), 10);
        match geometry.bars[0] {
            Bar::Pair { upper, .. } => {
                // first visible bar is levels[2]
                assert_eq!(upper.height, levels[2] * 20.0);
            }
            ref other => panic!("expected a pair, got {other:?}"),
        }
    }

    #[test]
    fn record_mode_fills_with_the_end_color_regardless_of_gradient() {
        let config = test_config();
        let geometry = layout(&[0.5], view(), Mode::Record, Some(0.3), &config);
        assert_eq!(geometry.fill, Fill::Solid(config.end_color));
    }

    #[test]
    fn playback_gradient_splits_at_the_fraction() {
        let config = test_config();
        let geometry = layout(&[0.5], view(), Mode::Playback, Some(0.4), &config);

        assert_eq!(
            geometry.fill,
            Fill::Split {
                boundary_x: 20.0,
                played: config.end_color,
                remaining: config.start_color,
            }
        );
    }

    #[test]
    fn playback_without_gradient_has_no_overlay() {
        let config = test_config();
        let geometry = layout(&[0.5], view(), Mode::Playback, None, &config);
        assert_eq!(geometry.fill, Fill::Solid(config.start_color));
    }

    #[test]
    fn empty_levels_yield_no_bars() {
        let geometry = layout(&[], view(), Mode::Playback, None, &test_config());
        assert!(geometry.bars.is_empty());
    }
}
