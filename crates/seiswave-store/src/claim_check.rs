//! Typed claim-check ids.
//!
//! A claim-check id is a structured record identifying one data segment's
//! samples: the owning channel segment, the timeseries type, the display
//! domain the buffer was built against, and the name of the filter
//! applied to it (or the unfiltered sentinel). Ids are encoded to JSON
//! for use as cache keys and must never be hand-built by string
//! concatenation; the only sanctioned derivation is
//! [`ClaimCheckId::with_filter`], which replaces the whole value.

use seiswave_core::{ChannelSegmentId, TimeRange, TimeseriesType, WaveformDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filter-field sentinel for raw, unfiltered samples.
pub const UNFILTERED: &str = "Unfiltered";

/// Errors from claim-check id encoding and decoding.
#[derive(Debug, Error)]
pub enum ClaimCheckError {
    #[error("failed to encode claim check id: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to parse claim check id: {0}")]
    Parse(#[source] serde_json::Error),
}

/// The structured cache key for one data segment's samples.
///
/// Two ids differing only in `filter` refer to the same raw samples
/// logically but are distinct cache entries once filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCheckId {
    /// The display domain the position buffer was built against.
    pub domain: TimeRange,
    /// The owning channel segment.
    pub id: ChannelSegmentId,
    #[serde(rename = "type")]
    pub timeseries_type: TimeseriesType,
    /// Name of the applied filter, or [`UNFILTERED`].
    pub filter: String,
    /// Shape of the underlying waveform.
    pub waveform: WaveformDescriptor,
}

impl ClaimCheckId {
    /// Id for raw samples that have not been filtered.
    #[must_use]
    pub fn unfiltered(
        domain: TimeRange,
        id: ChannelSegmentId,
        waveform: WaveformDescriptor,
    ) -> Self {
        Self {
            domain,
            id,
            timeseries_type: waveform.timeseries_type,
            filter: UNFILTERED.to_string(),
            waveform,
        }
    }

    /// True when this id refers to raw, unfiltered samples.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.filter == UNFILTERED
    }

    /// Encode to the canonical JSON wire form used as the cache key.
    pub fn encode(&self) -> Result<String, ClaimCheckError> {
        serde_json::to_string(self).map_err(ClaimCheckError::Encode)
    }

    /// Decode an encoded id.
    pub fn decode(encoded: &str) -> Result<Self, ClaimCheckError> {
        serde_json::from_str(encoded).map_err(ClaimCheckError::Parse)
    }

    /// Derive an id with a different filter name. All other fields are
    /// carried over unchanged; applying the same name twice is a no-op.
    #[must_use]
    pub fn with_filter(&self, filter_name: &str) -> Self {
        Self {
            filter: filter_name.to_string(),
            ..self.clone()
        }
    }
}

/// Decode an encoded id, replace only its filter field, and re-encode.
pub fn change_encoded_id_filter(
    encoded: &str,
    filter_name: &str,
) -> Result<String, ClaimCheckError> {
    ClaimCheckId::decode(encoded)?.with_filter(filter_name).encode()
}
