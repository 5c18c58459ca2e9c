//! Pointer-to-timeline mapping ("scrubbing").
//!
//! Converts a horizontal pointer offset inside the view into a playback
//! position. The math is kept pure here; the engine decides what to do
//! with the result (see `WaveformEngine::scrub`).

/// A pointer offset resolved against a known duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrub {
    /// Target playback position in seconds.
    pub time: f64,
    /// Horizontal fraction of the view, `0.0..=1.0`.
    pub fraction: f32,
}

/// Map pointer offset `x` within a view of `width` onto the timeline.
///
/// Returns `None` when the duration is unknown (nothing to seek against)
/// or the width is degenerate. The fraction is clamped, so pointer
/// coordinates slightly outside the view resolve to the nearest edge.
pub fn map_scrub(x: f32, width: f32, duration: Option<f64>) -> Option<Scrub> {
    let duration = duration?;
    if width <= 0.0 {
        return None;
    }

    let fraction = (x / width).clamp(0.0, 1.0);
    Some(Scrub {
        time: duration * fraction as f64,
        fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_edge_maps_to_start() {
        let scrub = map_scrub(0.0, 200.0, Some(10.0)).unwrap();
        assert_eq!(scrub.time, 0.0);
        assert_eq!(scrub.fraction, 0.0);
    }

    #[test]
    fn midpoint_maps_to_half_duration() {
        let scrub = map_scrub(100.0, 200.0, Some(10.0)).unwrap();
        assert!((scrub.time - 5.0).abs() < 1e-9);
        assert!((scrub.fraction - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unknown_duration_is_a_no_op() {
        assert_eq!(map_scrub(50.0, 200.0, None), None);
    }

    #[test]
    fn degenerate_width_is_a_no_op() {
        assert_eq!(map_scrub(0.0, 0.0, Some(10.0)), None);
    }

    #[test]
    fn offsets_outside_the_view_clamp_to_the_edges() {
        let past = map_scrub(250.0, 200.0, Some(4.0)).unwrap();
        assert_eq!(past.fraction, 1.0);
        assert_eq!(past.time, 4.0);

        let before = map_scrub(-10.0, 200.0, Some(4.0)).unwrap();
        assert_eq!(before.fraction, 0.0);
    }
}
