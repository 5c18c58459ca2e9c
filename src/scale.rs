/*
Level Scaling
=============

Maps a variable-length run of amplitude samples onto a fixed number of
display bars.

Vocabulary
----------

  raw        The recorded metering levels, one per capture interval,
             each in 0.0..=1.0. Can be shorter or longer than the
             number of bars on screen.

  target     How many bars we want out. Usually the bar capacity of the
             current view width.

  position   Where output index i lands inside `raw`, as a float:
             position = i / target * raw.len()

Two regimes, one tie-break
--------------------------

  Upsampling (target > raw.len(), position fractional):

      raw:     a---------b
      output:  a  .  .  b      values linearly interpolated between
                                the two neighbors of `position`; the
                                last bar clamps to `a` when ceil runs
                                off the end.

  Downsampling or exact fit (everything else):

      raw:     x x x x x x x x
      output:  [avg] [avg][avg] each bar averages the inclusive slice
                                raw[last_position ..= floor(position)],
                                where last_position is the previous
                                bar's floor. Buckets tile `raw` in
                                order; only the boundary sample is
                                shared between neighbors.

The tie-break matters: an integral `position` takes the averaging branch
even while upsampling, which decides whether neighboring bars share
input samples. Callers depend on that exact behavior, so keep it.
*/

/// Scale `raw` onto exactly `target` bars.
///
/// Returns an empty vector when `raw` is empty or `target` is zero;
/// otherwise the output length is exactly `target`.
pub fn scale_levels(raw: &[f32], target: usize) -> Vec<f32> {
    if raw.is_empty() || target == 0 {
        return Vec::new();
    }

    let mut scaled = Vec::with_capacity(target);
    let mut last_position: usize = 0;

    for index in 0..target {
        let position = index as f32 / target as f32 * raw.len() as f32;

        let level = if target > raw.len() && position.floor() != position {
            let low = position.floor() as usize;
            let high = position.ceil() as usize;

            if high < raw.len() {
                raw[low] + (position - low as f32) * (raw[high] - raw[low])
            } else {
                raw[low]
            }
        } else {
            let bucket = &raw[last_position..=position as usize];
            bucket.iter().sum::<f32>() / bucket.len() as f32
        };

        last_position = position as usize;
        scaled.push(level);
    }

    scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-6;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < TOLERANCE, "expected {b}, got {a}");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(scale_levels(&[], 10).is_empty());
        assert!(scale_levels(&[0.5], 0).is_empty());
    }

    #[test]
    fn output_length_matches_target() {
        let raw = vec![0.3; 17];
        for target in [1, 2, 5, 16, 17, 18, 100] {
            assert_eq!(scale_levels(&raw, target).len(), target);
        }
    }

    #[test]
    fn constant_input_survives_any_target() {
        let raw = vec![0.4; 8];
        for target in [1, 3, 8, 40] {
            for level in scale_levels(&raw, target) {
                assert_close(level, 0.4);
            }
        }
    }

    #[test]
    fn rescaling_to_same_length_is_stable() {
        // One pass through the bucket branch, then a second pass over its
        // own output, converges immediately for already-smoothed data.
        let raw = vec![0.5, 0.5, 0.5, 0.5, 0.5];
        let once = scale_levels(&raw, raw.len());
        let twice = scale_levels(&once, once.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn upsampling_interpolates_monotonically() {
        let raw = [0.2, 0.8];
        let scaled = scale_levels(&raw, 4);

        assert_eq!(scaled.len(), 4);
        assert_close(scaled[0], 0.2);
        // positions: 0.0, 0.5, 1.0, 1.5
        assert_close(scaled[1], 0.5); // interpolated midpoint
        assert_close(scaled[2], 0.5); // integral position: average of both
        assert_close(scaled[3], 0.8); // ceil out of bounds: edge clamp
        for pair in scaled.windows(2) {
            assert!(pair[1] >= pair[0] - TOLERANCE);
        }
    }

    #[test]
    fn upsampling_end_clamps_to_last_sample() {
        let raw = [0.1, 0.5, 0.9];
        let scaled = scale_levels(&raw, 6);

        assert_eq!(scaled.len(), 6);
        assert_close(scaled[0], 0.1);
        assert_close(scaled[5], 0.9); // position 2.5, ceil == 3 is clamped
    }

    #[test]
    fn downsampling_partitions_without_double_counting_interiors() {
        // 6 -> 3: positions 0, 2, 4. Buckets [0..=0], [0..=2], [2..=4].
        let raw = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let scaled = scale_levels(&raw, 3);

        assert_close(scaled[0], 1.0);
        assert_close(scaled[1], 1.0 / 3.0); // boundary sample shared
        assert_close(scaled[2], 0.0);
    }

    #[test]
    fn integral_positions_while_upsampling_take_the_average_branch() {
        // 2 -> 4 hits position 1.0 at index 2; that bar must average, not
        // interpolate.
        let raw = [0.0, 1.0];
        let scaled = scale_levels(&raw, 4);
        assert_close(scaled[2], 0.5);
    }
}
