//! Zoom interval management and platform-limit clamping.
//!
//! The [`ZoomController`] owns the current zoom interval and clamps every
//! requested zoom against two platform limits discovered by the host:
//!
//! - the maximum width, in pixels, at which the rendering surface can be
//!   laid out before the platform silently rounds element sizes, and
//! - the maximum usable time resolution (intervals narrower than 100
//!   microseconds render no additional detail).
//!
//! Clamping never fails: a too-narrow request is replaced with a valid
//! interval and the outcome carries a `max_zoom_reached` flag so the host
//! can notify the user. Zoom intervals are never compared with direct
//! float equality; [`ZoomController::intervals_equal`] applies a
//! half-pixel tolerance to keep floating-point noise from triggering
//! render loops.

use crate::coords::scale_linear;
use crate::time_range::{TimeRange, ZoomRange};

/// Two intervals closer than this many pixels at both endpoints are the
/// same zoom.
const ZOOM_UPDATE_THRESHOLD_PX: f64 = 0.5;

/// Beyond this many significant figures the platform rounds element sizes.
pub const DEFAULT_MAX_SIG_FIGS_FOR_ELEMENT_SIZE: u32 = 5;

/// Widest element the platform will lay out, in pixels.
pub const DEFAULT_MAX_ELEMENT_WIDTH_PX: u32 = 33_554_428;

/// Percent tolerance applied when checking against the max element width.
const MAX_DIV_TOLERANCE_PERCENT: f64 = 0.99;

/// Percent tolerance applied when checking against the max resolution.
const MAX_RESOLUTION_TOLERANCE_PERCENT: f64 = 1.01;

const MICROSECONDS_IN_SECOND: f64 = 1e6;

/// The narrowest interval we allow, in microseconds.
const SMALLEST_ALLOWED_TIME_RANGE_MICROSECONDS: f64 = 100.0;

/// Rounding mode for [`round_to_sig_figs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigFigRounding {
    Floor,
    Ceiling,
    Round,
}

/// The result of a zoom request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomOutcome {
    /// The accepted zoom interval (the previous one if the request was
    /// rejected).
    pub interval: TimeRange,
    /// True when the request was clamped or rejected by a platform limit;
    /// a user-facing notification, never an error.
    pub max_zoom_reached: bool,
    /// True when the accepted interval differs from the previous one by
    /// more than the half-pixel tolerance.
    pub changed: bool,
}

/// Owns the current zoom interval and applies the platform clamps.
#[derive(Debug, Clone)]
pub struct ZoomController {
    display_interval: TimeRange,
    zoom_interval: TimeRange,
    canvas_width_px: f64,
    label_width_px: f64,
    max_element_width_px: u32,
    max_sig_figs_for_element_size: u32,
}

impl ZoomController {
    /// Create a controller showing the full display interval.
    #[must_use]
    pub fn new(display_interval: TimeRange, canvas_width_px: f64) -> Self {
        Self {
            display_interval,
            zoom_interval: display_interval,
            canvas_width_px,
            label_width_px: 0.0,
            max_element_width_px: DEFAULT_MAX_ELEMENT_WIDTH_PX,
            max_sig_figs_for_element_size: DEFAULT_MAX_SIG_FIGS_FOR_ELEMENT_SIZE,
        }
    }

    /// Override the platform limits discovered by the host.
    pub fn set_platform_limits(&mut self, max_element_width_px: u32, max_sig_figs: u32) {
        self.max_element_width_px = max_element_width_px;
        self.max_sig_figs_for_element_size = max_sig_figs;
    }

    /// Update the canvas width after a resize.
    pub fn set_canvas_width(&mut self, canvas_width_px: f64) {
        self.canvas_width_px = canvas_width_px;
    }

    /// Width in pixels reserved for channel labels.
    pub fn set_label_width(&mut self, label_width_px: f64) {
        self.label_width_px = label_width_px;
    }

    /// Replace the display interval, resetting the zoom to show all of it.
    pub fn set_display_interval(&mut self, display_interval: TimeRange) {
        self.display_interval = display_interval;
        self.zoom_interval = display_interval;
    }

    /// The display interval (all loaded data).
    #[must_use]
    pub fn display_interval(&self) -> TimeRange {
        self.display_interval
    }

    /// The current zoom interval. Falls back to the display interval if
    /// the stored interval has been poisoned with NaN.
    #[must_use]
    pub fn zoom_interval(&self) -> TimeRange {
        if self.zoom_interval.is_nan() {
            self.display_interval
        } else {
            self.zoom_interval
        }
    }

    /// The current zoom interval as a fraction of the display interval.
    #[must_use]
    pub fn current_zoom_range(&self) -> ZoomRange {
        self.zoom_range_for_interval(&self.zoom_interval())
    }

    /// Convert a time interval into a fractional range of the display
    /// interval.
    #[must_use]
    pub fn zoom_range_for_interval(&self, interval: &TimeRange) -> ZoomRange {
        let scale = scale_linear(
            [
                self.display_interval.start_time_secs,
                self.display_interval.end_time_secs,
            ],
            [0.0, 1.0],
        );
        ZoomRange([scale(interval.start_time_secs), scale(interval.end_time_secs)])
    }

    /// Convert a fractional range of the display interval back into a time
    /// interval.
    #[must_use]
    pub fn interval_for_range(&self, range: ZoomRange) -> TimeRange {
        let scale = scale_linear(
            [0.0, 1.0],
            [
                self.display_interval.start_time_secs,
                self.display_interval.end_time_secs,
            ],
        );
        TimeRange::new(scale(range.start()), scale(range.end()))
    }

    /// Compare two intervals in pixel space.
    ///
    /// They are considered the same zoom when both endpoint deltas map to
    /// less than half a pixel at the current canvas width. This is the
    /// only sanctioned equality test for zoom intervals; extremely small
    /// deltas would otherwise cause an infinite zoom/render loop.
    #[must_use]
    pub fn intervals_equal(&self, a: &TimeRange, b: &TimeRange) -> bool {
        let pixels_per_second = self.canvas_width_px / a.duration();
        (pixels_per_second * (a.start_time_secs - b.start_time_secs)).abs()
            < ZOOM_UPDATE_THRESHOLD_PX
            && (pixels_per_second * (a.end_time_secs - b.end_time_secs)).abs()
                < ZOOM_UPDATE_THRESHOLD_PX
    }

    /// Request a new zoom interval, clamping it against the platform
    /// limits.
    pub fn set_zoom(&mut self, requested: TimeRange) -> ZoomOutcome {
        if requested.is_nan() {
            return ZoomOutcome {
                interval: self.zoom_interval(),
                max_zoom_reached: false,
                changed: false,
            };
        }

        // Already maxed out and still trying to zoom in: reject and notify.
        if self.has_reached_max_zoom() && requested.is_subset_of(&self.zoom_interval()) {
            return ZoomOutcome {
                interval: self.zoom_interval(),
                max_zoom_reached: true,
                changed: false,
            };
        }

        let (clamped, was_clamped) = self.clamp_to_max_zoom_interval(&requested);
        // If the interval changed we did not zoom to the requested range,
        // so inform the user (once; not again if already pinned at max).
        let max_zoom_reached = was_clamped && !self.has_reached_max_zoom();

        let changed = !self.intervals_equal(&self.zoom_interval(), &clamped);
        if changed {
            self.zoom_interval = clamped;
        }
        ZoomOutcome {
            interval: self.zoom_interval(),
            max_zoom_reached,
            changed,
        }
    }

    /// Zoom in or out by a percentage, anchored at a fractional canvas
    /// position. Positive percentages zoom out.
    ///
    /// The increment is asymmetric around the anchor so the time under the
    /// cursor stays put.
    pub fn zoom_by_percentage_to_point(&mut self, zoom_pct: f64, x_frac: f64) -> ZoomOutcome {
        let range = self.current_zoom_range();
        let increment = range.span() * zoom_pct / 2.0;
        let left = (range.start() - increment * x_frac).max(0.0);
        let right = (range.end() + increment * (1.0 - x_frac)).min(1.0);
        let interval = self.interval_for_range(ZoomRange([left, right]));
        self.set_zoom(interval)
    }

    /// True when the current zoom interval is pinned at either platform
    /// limit.
    #[must_use]
    pub fn has_reached_max_zoom(&self) -> bool {
        let current = self.zoom_interval();
        self.is_interval_at_max_element_width(&current) || Self::is_interval_at_max_resolution(&current)
    }

    /// Whether rendering this interval would require laying out an element
    /// wider than the platform supports.
    fn is_interval_at_max_element_width(&self, interval: &TimeRange) -> bool {
        let range = self.zoom_range_for_interval(interval);
        let width_px = (self.canvas_width_px / range.span()).ceil();

        // Shortly after mounting the canvas width can be 0; a zero width
        // would otherwise read as a false positive.
        width_px > 0.0
            && width_px
                >= (f64::from(self.max_element_width_px) - self.label_width_px)
                    * MAX_DIV_TOLERANCE_PERCENT
    }

    /// Whether this interval is at or below the maximum time resolution
    /// (100 microseconds), within the trigger tolerance.
    fn is_interval_at_max_resolution(interval: &TimeRange) -> bool {
        let min_range =
            (1.0 / MICROSECONDS_IN_SECOND) * SMALLEST_ALLOWED_TIME_RANGE_MICROSECONDS;
        interval.duration() <= min_range * MAX_RESOLUTION_TOLERANCE_PERCENT
    }

    /// Clamp an interval against both platform limits. Returns the clamped
    /// interval and whether clamping changed it.
    fn clamp_to_max_zoom_interval(&self, interval: &TimeRange) -> (TimeRange, bool) {
        // If the display is behind another window the max width is 0 and
        // clamping breaks.
        if self.max_element_width_px != 0 && self.is_interval_at_max_element_width(interval) {
            return (self.clamp_to_max_element_width(interval), true);
        }
        if Self::is_interval_at_max_resolution(interval) {
            return (Self::clamp_to_max_resolution(interval), true);
        }
        (*interval, false)
    }

    /// Expand the interval symmetrically in fractional space until it
    /// exactly fits the widest layout the platform supports.
    fn clamp_to_max_element_width(&self, interval: &TimeRange) -> TimeRange {
        let range = self.zoom_range_for_interval(interval);
        let target_width_px = round_to_sig_figs(
            f64::from(self.max_element_width_px),
            self.max_sig_figs_for_element_size,
            SigFigRounding::Floor,
        ) - self.label_width_px;
        let new_span = self.canvas_width_px / target_width_px;
        let add = (new_span - range.span()) / 2.0;
        self.interval_for_range(ZoomRange([range.start() - add, range.end() + add]))
    }

    /// Replace a too-narrow interval with a 100 microsecond interval
    /// centered on its midpoint.
    fn clamp_to_max_resolution(interval: &TimeRange) -> TimeRange {
        let min_range =
            (1.0 / MICROSECONDS_IN_SECOND) * SMALLEST_ALLOWED_TIME_RANGE_MICROSECONDS;
        // Derive the end from the start so the duration is exact to an
        // ulp; rounding both endpoints from an epoch-scale midpoint
        // would not be.
        let start = interval.midpoint() - min_range / 2.0;
        TimeRange::new(start, start + min_range)
    }
}

/// Round to the given number of significant figures, but only above
/// `10^(sig_figs - 1)`; smaller numbers pass through unchanged.
#[must_use]
pub fn round_to_sig_figs(num: f64, sig_figs: u32, mode: SigFigRounding) -> f64 {
    if num > 10f64.powi(sig_figs as i32 - 1) {
        let digits = num_digits(num);
        let to_the_nearest = 10f64.powi(digits.saturating_sub(sig_figs).max(1) as i32);
        return match mode {
            SigFigRounding::Floor => (num / to_the_nearest).floor() * to_the_nearest,
            SigFigRounding::Ceiling => (num / to_the_nearest).ceil() * to_the_nearest,
            SigFigRounding::Round => (num / to_the_nearest).round() * to_the_nearest,
        };
    }
    num
}

/// Number of digits in the integer part of the number.
fn num_digits(num: f64) -> u32 {
    let abs = num.abs().floor();
    if abs < 1.0 {
        1
    } else {
        abs.log10().floor() as u32 + 1
    }
}
