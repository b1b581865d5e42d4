//! Coordinate conversions for the waveform display.
//!
//! This module is the single source of truth for converting between the
//! four coordinate spaces of the display:
//!
//! - **Epoch time** in seconds
//! - **Pixels**, offsets from the left edge of the window
//! - **Canvas fractions**, `[0, 1]` across the visible canvas
//! - **Device (GL) units**, a normalized rendering space independent of
//!   pixel density
//!
//! All conversions are pure functions of their explicit inputs,
//! parameterized by the display interval and the current fractional zoom
//! range. `time_secs_for_fraction` and `fraction_for_time_secs` are exact
//! inverses up to floating-point rounding.

use crate::time_range::{TimeRange, ZoomRange};

/// The horizontal extent of the canvas element, in pixels from the left
/// edge of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    /// Left edge of the canvas, window-relative pixels.
    pub left: f64,
    /// Width of the canvas in pixels.
    pub width: f64,
}

impl CanvasRect {
    /// Create a new canvas rectangle.
    #[must_use]
    pub const fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }
}

/// Build a linear scale mapping `domain` onto `range`.
///
/// Values outside the domain extrapolate; no clamping is applied.
pub fn scale_linear(domain: [f64; 2], range: [f64; 2]) -> impl Fn(f64) -> f64 {
    let slope = (range[1] - range[0]) / (domain[1] - domain[0]);
    move |value| range[0] + (value - domain[0]) * slope
}

/// Compute the epoch time for a canvas fraction, given the display
/// interval and the current zoom range.
///
/// The fraction is first mapped into the absolute zoom fraction
/// `z0 + frac * (z1 - z0)`, then linearly interpolated into the display
/// interval.
#[must_use]
pub fn time_secs_for_fraction(
    fraction: f64,
    display_interval: &TimeRange,
    zoom_range: ZoomRange,
) -> f64 {
    let absolute = zoom_range.start() + fraction * zoom_range.span();
    display_interval.start_time_secs + absolute * display_interval.duration()
}

/// Inverse of [`time_secs_for_fraction`]: the canvas fraction at which the
/// given epoch time falls.
#[must_use]
pub fn fraction_for_time_secs(
    time_secs: f64,
    display_interval: &TimeRange,
    zoom_range: ZoomRange,
) -> f64 {
    let absolute = (time_secs - display_interval.start_time_secs) / display_interval.duration();
    (absolute - zoom_range.start()) / zoom_range.span()
}

/// Compute the epoch time under an x pixel offset.
#[must_use]
pub fn time_secs_for_pixel(
    pixel_x: f64,
    canvas_rect: &CanvasRect,
    display_interval: &TimeRange,
    zoom_range: ZoomRange,
) -> f64 {
    time_secs_for_fraction(
        fraction_for_pixel(pixel_x, canvas_rect),
        display_interval,
        zoom_range,
    )
}

/// The canvas fraction under an x pixel offset.
///
/// Not clamped to `[0, 1]`; callers detect out-of-bounds positions from
/// the unclamped value.
#[must_use]
pub fn fraction_for_pixel(pixel_x: f64, canvas_rect: &CanvasRect) -> f64 {
    (pixel_x - canvas_rect.left) / canvas_rect.width
}

/// Rescale an epoch time into device (GL) units.
#[must_use]
pub fn gl_from_time(time_secs: f64, time_range: &TimeRange, gl_range: [f64; 2]) -> f64 {
    scale_linear(
        [time_range.start_time_secs, time_range.end_time_secs],
        gl_range,
    )(time_secs)
}
