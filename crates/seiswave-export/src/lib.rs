//! Lossless export of claim-checked channel segments.
//!
//! Export is the inverse of storage: every claim-check id is resolved
//! back to its full-precision buffer, de-interleaved to samples only,
//! and written into a JSON document alongside the filter associations
//! that were active. No precision is lost relative to the stored `f64`
//! samples.

pub mod hydrate;

pub use hydrate::{
    export_channel_segments, hydrate_channel_segment, hydrate_timeseries, ExportBlob,
    ExportChannelSegment, ExportDocument, ExportError, FilterAssociation, HydratedTimeseries,
    Timeseries,
};
