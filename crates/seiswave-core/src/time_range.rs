//! Time interval types used throughout the display pipeline.

use serde::{Deserialize, Serialize};

/// An interval of epoch time in seconds.
///
/// Used for the display interval (all loaded data), the viewable interval
/// (initially shown subset), and the zoom interval (currently rendered
/// subset). Invariant: `start_time_secs <= end_time_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Start of the interval in epoch seconds.
    pub start_time_secs: f64,
    /// End of the interval in epoch seconds.
    pub end_time_secs: f64,
}

impl TimeRange {
    /// Create a new time range. Callers are expected to provide
    /// `start <= end`; use [`TimeRange::ordered`] when the order is unknown.
    #[must_use]
    pub const fn new(start_time_secs: f64, end_time_secs: f64) -> Self {
        Self {
            start_time_secs,
            end_time_secs,
        }
    }

    /// Create a time range from two endpoints in either order.
    #[must_use]
    pub fn ordered(a: f64, b: f64) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    /// Duration of the interval in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time_secs - self.start_time_secs
    }

    /// Midpoint of the interval in epoch seconds.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.start_time_secs + self.duration() / 2.0
    }

    /// Whether the given time falls within the interval (inclusive).
    #[must_use]
    pub fn contains(&self, time_secs: f64) -> bool {
        time_secs >= self.start_time_secs && time_secs <= self.end_time_secs
    }

    /// Whether this interval is fully contained by `other` (inclusive).
    #[must_use]
    pub fn is_subset_of(&self, other: &TimeRange) -> bool {
        self.start_time_secs >= other.start_time_secs && self.end_time_secs <= other.end_time_secs
    }

    /// True if either bound is NaN. NaN intervals are rejected at the zoom
    /// boundary rather than normalized away.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.start_time_secs.is_nan() || self.end_time_secs.is_nan()
    }
}

/// A fractional sub-range of the display interval, both bounds in `[0, 1]`.
///
/// `ZoomRange([0.0, 1.0])` shows the entire display interval. Zero-length
/// ranges are disallowed by the zoom clamping rules, not by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange(pub [f64; 2]);

impl ZoomRange {
    /// The full display interval.
    pub const FULL: ZoomRange = ZoomRange([0.0, 1.0]);

    /// Left (start) fraction.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.0[0]
    }

    /// Right (end) fraction.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.0[1]
    }

    /// Width of the range in fractional units.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.0[1] - self.0[0]
    }

    /// Clamp both bounds to `[0, 1]`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self([self.0[0].clamp(0.0, 1.0), self.0[1].clamp(0.0, 1.0)])
    }
}
