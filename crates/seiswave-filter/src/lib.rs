//! Digital filter design and the claim-check filter pipeline.
//!
//! - [`types`]: filter definitions, designed coefficients, and the
//!   fixed-point sample-rate key
//! - [`design`]: biquad cascade design (RBJ cookbook sections with
//!   Butterworth Q values)
//! - [`apply`]: stateful cascade application over strided buffers,
//!   tapering, and group-delay removal
//! - [`pipeline`]: retrieves claim-checked buffers, filters the value
//!   channel, and stores results under derived ids

pub mod apply;
pub mod design;
pub mod pipeline;
pub mod types;

pub use design::design_filter;
pub use pipeline::{DataSegment, FilterError, FilterPipeline, FilteredChannelSegment, UiChannelSegment};
pub use types::{
    DesignError, DesignedFilterDefinition, FilterDefinition, FilterKind, FiltersBySampleRate,
    SampleRateKey, SosCoefficients,
};
