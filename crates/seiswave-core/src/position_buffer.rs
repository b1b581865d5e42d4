//! Interleaved position-buffer construction and scanning.
//!
//! A position buffer is the `[x0, y0, x1, y1, ...]` vertex layout the
//! renderer consumes: `x` in device (GL) units derived from sample time,
//! `y` the raw sample amplitude. Buffers are built in full `f64`
//! precision so they can double as the claim-checked sample store
//! representation; [`as_vertex_buffer`] narrows to `f32` at the last
//! moment before upload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::scale_linear;
use crate::time_range::TimeRange;

/// Errors from position-buffer construction and scanning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionBufferError {
    #[error("Cannot calculate position buffer: must have an even number of elements.")]
    OddElementCount,
    #[error("Cannot calculate position buffer: start index must be greater than 0 and less than end index.")]
    StartIndexOutOfRange,
    #[error("Cannot calculate position buffer: end index must be less than the length of data.")]
    EndIndexOutOfRange,
    #[error("Cannot calculate position buffer: must provide odd indices to access y values.")]
    EvenValueIndex,
    #[error("Typed array conversion failed; No visible domain was provided.")]
    NoVisibleDomain,
}

/// Evenly sampled data: amplitudes plus the timing needed to place them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBySampleRate {
    /// Sample amplitudes.
    pub values: Vec<f64>,
    /// Time of the first sample, epoch seconds.
    pub start_time_secs: f64,
    /// Time of the last sample, epoch seconds.
    pub end_time_secs: f64,
    /// Samples per second.
    pub sample_rate_hz: f64,
}

/// An irregularly sampled point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeValuePair {
    /// Epoch seconds.
    pub time_secs: f64,
    /// Sample amplitude.
    pub value: f64,
}

/// Amplitude extrema of a position buffer slice, with the times at which
/// they occur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionBufferBounds {
    pub max: f64,
    /// X value (device units) paired with the maximum.
    pub max_secs: f64,
    pub min: f64,
    /// X value (device units) paired with the minimum.
    pub min_secs: f64,
}

/// Convert evenly sampled data into an interleaved `[x, y, ...]` buffer.
///
/// For sample index `i`, `x = scale(start_time + i / sample_rate)` where
/// `scale` maps the visible domain onto `gl_range`, and `y = values[i]`.
/// Output length is exactly `2 * values.len()`; no samples are dropped or
/// reordered. A zero-length or NaN domain has no valid x scale and is
/// rejected.
pub fn to_position_buffer(
    data: &DataBySampleRate,
    domain: &TimeRange,
    gl_range: [f64; 2],
) -> Result<Vec<f64>, PositionBufferError> {
    if !(domain.duration() > 0.0) {
        return Err(PositionBufferError::NoVisibleDomain);
    }
    let scale_to_gl_units = scale_linear(
        [domain.start_time_secs, domain.end_time_secs],
        gl_range,
    );
    let mut vertices = vec![0.0; data.values.len() * 2];
    for (i, &value) in data.values.iter().enumerate() {
        vertices[i * 2] = scale_to_gl_units(data.start_time_secs + i as f64 / data.sample_rate_hz);
        vertices[i * 2 + 1] = value;
    }
    Ok(vertices)
}

/// Convert irregular `{time, value}` points into an interleaved buffer,
/// ordering them by time first.
pub fn position_buffer_for_data_by_time(
    values: &[TimeValuePair],
    domain: &TimeRange,
    gl_range: [f64; 2],
) -> Result<Vec<f64>, PositionBufferError> {
    if !(domain.duration() > 0.0) {
        return Err(PositionBufferError::NoVisibleDomain);
    }
    let scale_to_gl_units = scale_linear(
        [domain.start_time_secs, domain.end_time_secs],
        gl_range,
    );
    let mut ordered: Vec<TimeValuePair> = values.to_vec();
    ordered.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));

    let mut vertices = Vec::with_capacity(ordered.len() * 2);
    for pair in &ordered {
        vertices.push(scale_to_gl_units(pair.time_secs));
        vertices.push(pair.value);
    }
    Ok(vertices)
}

/// Narrow a full-precision buffer to the `f32` vertex form the renderer
/// uploads. Lossy for rendering only; the `f64` buffer stays canonical.
#[must_use]
pub fn as_vertex_buffer(buffer: &[f64]) -> Vec<f32> {
    buffer.iter().map(|&v| v as f32).collect()
}

/// Scan `[start_index, end_index]` (inclusive, odd y-value indices) for
/// the amplitude extrema of an interleaved buffer.
pub fn bounds_for_position_buffer(
    data: &[f64],
    start_index: usize,
    end_index: usize,
) -> Result<PositionBufferBounds, PositionBufferError> {
    if data.len() % 2 != 0 {
        return Err(PositionBufferError::OddElementCount);
    }
    if start_index > end_index {
        return Err(PositionBufferError::StartIndexOutOfRange);
    }
    if end_index >= data.len() {
        return Err(PositionBufferError::EndIndexOutOfRange);
    }
    if start_index % 2 != 1 || end_index % 2 != 1 {
        return Err(PositionBufferError::EvenValueIndex);
    }

    let mut min_index = start_index;
    let mut max_index = start_index;
    let mut i = start_index + 2;
    while i <= end_index {
        if data[i] > data[max_index] {
            max_index = i;
        } else if data[i] < data[min_index] {
            min_index = i;
        }
        i += 2;
    }

    Ok(PositionBufferBounds {
        max: data[max_index],
        max_secs: data[max_index - 1],
        min: data[min_index],
        min_secs: data[min_index - 1],
    })
}

/// Scan the whole buffer for amplitude extrema.
pub fn bounds_for_whole_buffer(data: &[f64]) -> Result<PositionBufferBounds, PositionBufferError> {
    if data.len() % 2 != 0 {
        return Err(PositionBufferError::OddElementCount);
    }
    if data.is_empty() {
        return Err(PositionBufferError::EndIndexOutOfRange);
    }
    bounds_for_position_buffer(data, 1, data.len() - 1)
}
