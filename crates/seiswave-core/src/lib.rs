//! Core numeric types and algorithms for the seiswave waveform display.
//!
//! This crate is the pure, synchronous heart of the pipeline:
//! - [`TimeRange`] and [`ZoomRange`] time/fraction models
//! - coordinate conversions between epoch time, pixels, canvas fractions,
//!   and device (GL) units ([`coords`])
//! - the zoom controller with its platform clamps ([`zoom`])
//! - interleaved position-buffer construction and scanning
//!   ([`position_buffer`], [`boundaries`])
//! - channel-segment identities shared by the store and export layers
//!   ([`segment`])
//!
//! Nothing in here suspends or touches I/O.

pub mod boundaries;
pub mod coords;
pub mod position_buffer;
pub mod segment;
pub mod time_range;
pub mod zoom;

pub use boundaries::ChannelSegmentBoundaries;
pub use coords::CanvasRect;
pub use position_buffer::{DataBySampleRate, PositionBufferError, TimeValuePair};
pub use segment::{ChannelSegmentId, TimeseriesType, WaveformDescriptor};
pub use time_range::{TimeRange, ZoomRange};
pub use zoom::{ZoomController, ZoomOutcome};
