//! Precomputed amplitude boundaries for channel segments.
//!
//! Boundaries summarize the min/max/average amplitude of a segment's
//! samples over a time window so the camera can be framed without
//! rescanning full buffers on every zoom change.

use serde::{Deserialize, Serialize};

/// Min/max/average amplitude over a time window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSegmentBoundaries {
    /// Largest amplitude, rounded up to a whole unit.
    pub top_max: f64,
    /// Smallest amplitude, rounded down to a whole unit.
    pub bottom_max: f64,
    /// Mean amplitude over the window.
    pub channel_avg: f64,
    /// Largest absolute amplitude before rounding.
    pub offset: f64,
    /// Number of samples contributing to the window.
    pub samples_count: usize,
}

/// Camera framing derived from one or more segment boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub top: f64,
    pub bottom: f64,
}

/// Accumulates amplitude statistics across the data segments of a channel
/// segment, then folds them into one [`ChannelSegmentBoundaries`].
#[derive(Debug, Default)]
pub struct BoundariesAccumulator {
    top_max: f64,
    bottom_max: f64,
    total_value: f64,
    samples_count: usize,
}

impl BoundariesAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            top_max: f64::NEG_INFINITY,
            bottom_max: f64::INFINITY,
            total_value: 0.0,
            samples_count: 0,
        }
    }

    /// Fold the value slots of an interleaved `[x, y, ...]` buffer into
    /// the running statistics. When `x_window` is given, only pairs whose
    /// x falls inside it (inclusive) contribute.
    pub fn add_position_buffer(&mut self, buffer: &[f64], x_window: Option<[f64; 2]>) {
        for pair in buffer.chunks_exact(2) {
            if let Some([lo, hi]) = x_window {
                if pair[0] < lo || pair[0] > hi {
                    continue;
                }
            }
            let sample = pair[1];
            self.total_value += sample;
            if sample > self.top_max {
                self.top_max = sample;
            }
            if sample < self.bottom_max {
                self.bottom_max = sample;
            }
            self.samples_count += 1;
        }
    }

    /// Finish the accumulation. Returns `None` when no samples fell in
    /// the window; callers fall back to a unit camera range.
    #[must_use]
    pub fn finish(self) -> Option<ChannelSegmentBoundaries> {
        if self.samples_count == 0 {
            return None;
        }
        Some(ChannelSegmentBoundaries {
            top_max: self.top_max.ceil(),
            bottom_max: self.bottom_max.floor(),
            channel_avg: self.total_value / self.samples_count as f64,
            offset: self.top_max.abs().max(self.bottom_max.abs()),
            samples_count: self.samples_count,
        })
    }
}

/// Boundaries of a single position buffer over an optional x window.
#[must_use]
pub fn boundaries_for_position_buffer(
    buffer: &[f64],
    x_window: Option<[f64; 2]>,
) -> Option<ChannelSegmentBoundaries> {
    let mut acc = BoundariesAccumulator::new();
    acc.add_position_buffer(buffer, x_window);
    acc.finish()
}

impl ChannelSegmentBoundaries {
    /// Frame the camera for a set of segment boundaries.
    ///
    /// When the data crosses zero the camera is centered on the mean
    /// channel average with the largest absolute extreme as the half
    /// height; one-sided data is framed tightly between its extremes.
    #[must_use]
    pub fn camera_bounds(boundaries: &[Self]) -> Option<CameraBounds> {
        if boundaries.is_empty() {
            return None;
        }
        let amplitude_min = boundaries
            .iter()
            .map(|b| b.bottom_max.min(b.top_max))
            .fold(f64::INFINITY, f64::min);
        let amplitude_max = boundaries
            .iter()
            .map(|b| b.bottom_max.max(b.top_max))
            .fold(f64::NEG_INFINITY, f64::max);
        let axis_offset = amplitude_max.abs().max(amplitude_min.abs());

        if amplitude_min < 0.0 && amplitude_max > 0.0 {
            let channel_avg = boundaries.iter().map(|b| b.channel_avg).sum::<f64>()
                / boundaries.len() as f64;
            Some(CameraBounds {
                top: channel_avg + axis_offset,
                bottom: channel_avg - axis_offset,
            })
        } else {
            Some(CameraBounds {
                top: amplitude_max,
                bottom: amplitude_min,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_for_buffer() {
        // x y x y x y x y
        let buffer = [0.0, 1.5, 1.0, -2.5, 2.0, 3.5, 3.0, 0.5];
        let bounds = boundaries_for_position_buffer(&buffer, None).unwrap();
        assert_eq!(bounds.top_max, 4.0);
        assert_eq!(bounds.bottom_max, -3.0);
        assert_eq!(bounds.offset, 3.5);
        assert_eq!(bounds.samples_count, 4);
        assert!((bounds.channel_avg - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_x_window_restricts_samples() {
        let buffer = [0.0, 10.0, 1.0, -20.0, 2.0, 30.0, 3.0, -40.0];
        let bounds = boundaries_for_position_buffer(&buffer, Some([1.0, 2.0])).unwrap();
        assert_eq!(bounds.samples_count, 2);
        assert_eq!(bounds.top_max, 30.0);
        assert_eq!(bounds.bottom_max, -20.0);
    }

    #[test]
    fn test_empty_window_yields_none() {
        let buffer = [0.0, 10.0, 1.0, -20.0];
        assert!(boundaries_for_position_buffer(&buffer, Some([5.0, 6.0])).is_none());
        assert!(boundaries_for_position_buffer(&[], None).is_none());
    }

    #[test]
    fn test_accumulator_spans_segments() {
        let mut acc = BoundariesAccumulator::new();
        acc.add_position_buffer(&[0.0, 1.0, 1.0, 2.0], None);
        acc.add_position_buffer(&[2.0, -3.0, 3.0, 4.0], None);
        let bounds = acc.finish().unwrap();
        assert_eq!(bounds.samples_count, 4);
        assert_eq!(bounds.top_max, 4.0);
        assert_eq!(bounds.bottom_max, -3.0);
        assert_eq!(bounds.channel_avg, 1.0);
    }

    #[test]
    fn test_camera_centered_when_crossing_zero() {
        let bounds = boundaries_for_position_buffer(&[0.0, 4.0, 1.0, -2.0], None).unwrap();
        let camera = ChannelSegmentBoundaries::camera_bounds(&[bounds]).unwrap();
        assert_eq!(camera.top, bounds.channel_avg + 4.0);
        assert_eq!(camera.bottom, bounds.channel_avg - 4.0);
    }

    #[test]
    fn test_camera_tight_for_one_sided_data() {
        let bounds = boundaries_for_position_buffer(&[0.0, 2.0, 1.0, 6.0], None).unwrap();
        let camera = ChannelSegmentBoundaries::camera_bounds(&[bounds]).unwrap();
        assert_eq!(camera.top, 6.0);
        assert_eq!(camera.bottom, 2.0);
    }

    #[test]
    fn test_camera_none_for_empty() {
        assert!(ChannelSegmentBoundaries::camera_bounds(&[]).is_none());
    }
}
