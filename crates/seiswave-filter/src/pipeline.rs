//! The claim-check filter pipeline.
//!
//! Given designed filters keyed by sample rate and segments whose
//! samples live in the claim-check store, the pipeline retrieves each
//! raw buffer, filters its value channel, stores the result under the
//! filter-derived id, and hands back the new id so the caller can
//! repoint its segment metadata. Batch operations are per-segment: one
//! failing segment never aborts its siblings.

use futures::future::join_all;
use log::debug;
use seiswave_store::{ClaimCheckError, ClaimCheckId, ClaimCheckStore, StoreError, UNFILTERED};
use thiserror::Error;

use crate::apply::apply_designed;
use crate::types::{FiltersBySampleRate, SampleRateKey};

/// Position-buffer stride selecting only the value (y) slots.
const VALUE_INDEX_OFFSET: usize = 1;
const VALUE_INDEX_INCREMENT: usize = 2;

/// Errors from pipeline operations.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("cannot filter a data segment without a claim check id")]
    InvalidInput,
    #[error("no filter designed for sample rate {0} Hz")]
    MissingSampleRate(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    ClaimCheck(#[from] ClaimCheckError),
}

/// One data segment as the pipeline sees it: where its samples are and
/// how they were sampled.
#[derive(Debug, Clone)]
pub struct DataSegment {
    /// Encoded claim-check id, absent when the segment's samples are not
    /// store-backed.
    pub claim_check_id: Option<String>,
    pub sample_rate_hz: f64,
}

/// A channel segment: an ordered list of data segments under one channel.
#[derive(Debug, Clone)]
pub struct UiChannelSegment {
    pub channel_name: String,
    pub data_segments: Vec<DataSegment>,
}

/// Result of filtering one channel segment. `data_segments` preserves
/// input order; each slot holds the derived claim-check id or that
/// segment's own failure.
#[derive(Debug)]
pub struct FilteredChannelSegment {
    pub channel_name: String,
    /// Display name of the applied filter.
    pub filter_name: String,
    pub data_segments: Vec<Result<String, FilterError>>,
}

/// Applies designed filters to claim-checked buffers.
#[derive(Clone)]
pub struct FilterPipeline {
    store: ClaimCheckStore,
}

impl FilterPipeline {
    #[must_use]
    pub fn new(store: ClaimCheckStore) -> Self {
        Self { store }
    }

    /// Filter one data segment and return the derived claim-check id.
    ///
    /// The filtered buffer is stored only if the derived id is not
    /// already present, so concurrent requests for the same filter do
    /// the work once.
    pub async fn filter_data_segment(
        &self,
        segment: &DataSegment,
        filters: &FiltersBySampleRate,
    ) -> Result<String, FilterError> {
        let encoded = segment
            .claim_check_id
            .as_deref()
            .ok_or(FilterError::InvalidInput)?;
        let id = ClaimCheckId::decode(encoded)?;
        let designed = filters
            .get(&SampleRateKey::from_hz(segment.sample_rate_hz))
            .ok_or(FilterError::MissingSampleRate(segment.sample_rate_hz))?;

        let derived = id.with_filter(&designed.definition.name).encode()?;
        if self.store.has(&derived).await {
            return Ok(derived);
        }

        let raw = self.store.retrieve(encoded).await?;
        let mut samples = raw.as_ref().clone();
        apply_designed(
            designed,
            &mut samples,
            VALUE_INDEX_OFFSET,
            VALUE_INDEX_INCREMENT,
        );
        debug!(
            "filtered {} samples with {}",
            samples.len() / 2,
            designed.definition.name
        );
        self.store.store_if_absent(&derived, samples).await;
        Ok(derived)
    }

    /// Filter every data segment of one channel segment concurrently,
    /// preserving segment order in the result.
    pub async fn filter_channel_segment(
        &self,
        segment: &UiChannelSegment,
        filters: &FiltersBySampleRate,
    ) -> FilteredChannelSegment {
        // Tag the result with the name of a filter that actually applies
        // to one of the segments; map iteration order is arbitrary.
        let filter_name = segment
            .data_segments
            .iter()
            .find_map(|data_segment| {
                filters.get(&SampleRateKey::from_hz(data_segment.sample_rate_hz))
            })
            .map_or_else(|| UNFILTERED.to_string(), |d| d.definition.name.clone());

        let results = join_all(
            segment
                .data_segments
                .iter()
                .map(|data_segment| self.filter_data_segment(data_segment, filters)),
        )
        .await;

        FilteredChannelSegment {
            channel_name: segment.channel_name.clone(),
            filter_name,
            data_segments: results,
        }
    }

    /// Filter several channel segments concurrently, preserving order.
    pub async fn filter_channel_segments(
        &self,
        segments: &[UiChannelSegment],
        filters: &FiltersBySampleRate,
    ) -> Vec<FilteredChannelSegment> {
        join_all(
            segments
                .iter()
                .map(|segment| self.filter_channel_segment(segment, filters)),
        )
        .await
    }
}
