//! Hydration of claim-checked timeseries and the export document.

use futures::future::join_all;
use log::debug;
use seiswave_core::ChannelSegmentId;
use seiswave_store::{ClaimCheckError, ClaimCheckId, ClaimCheckStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from hydration and export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot convert timeseries that is not data claim check")]
    InvalidInput,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    ClaimCheck(#[from] ClaimCheckError),
    #[error("failed to serialize export document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A timeseries as held in UI state: either still claim-checked or
/// already hydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timeseries {
    ClaimCheck {
        /// Encoded [`ClaimCheckId`].
        #[serde(rename = "claimCheckId")]
        claim_check_id: String,
    },
    Hydrated(HydratedTimeseries),
}

/// A fully resolved timeseries, samples inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedTimeseries {
    pub samples: Vec<f64>,
    pub sample_count: usize,
    pub sample_rate_hz: f64,
    pub start_time_secs: f64,
    pub end_time_secs: f64,
}

/// One channel segment in the export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportChannelSegment {
    pub id: ChannelSegmentId,
    pub timeseries: Vec<Timeseries>,
}

/// Which filter was applied to which channel segment at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterAssociation {
    pub channel_name: String,
    pub filter_name: String,
}

/// The export file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub channel_segments: Vec<ExportChannelSegment>,
    pub filter_associations: Vec<FilterAssociation>,
}

/// A serialized export document ready to hand to the host for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBlob {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Resolve one claim-checked timeseries to its full-precision samples.
///
/// The stored buffer alternates `[x, y, ...]`; only the odd-indexed
/// value slots are samples, so the hydrated sample count is half the
/// buffer length. Fails with `InvalidInput` when the timeseries is
/// already hydrated.
pub async fn hydrate_timeseries(
    store: &ClaimCheckStore,
    timeseries: &Timeseries,
) -> Result<HydratedTimeseries, ExportError> {
    let encoded = match timeseries {
        Timeseries::ClaimCheck { claim_check_id } => claim_check_id,
        Timeseries::Hydrated(_) => return Err(ExportError::InvalidInput),
    };
    let id = ClaimCheckId::decode(encoded)?;
    let buffer = store.retrieve(encoded).await?;

    let samples: Vec<f64> = buffer.iter().skip(1).step_by(2).copied().collect();
    debug!("hydrated {} samples for export", samples.len());
    Ok(HydratedTimeseries {
        sample_count: buffer.len() / 2,
        samples,
        sample_rate_hz: id.waveform.sample_rate_hz,
        start_time_secs: id.waveform.start_time_secs,
        end_time_secs: id.waveform.end_time_secs,
    })
}

/// Hydrate every timeseries of a channel segment.
pub async fn hydrate_channel_segment(
    store: &ClaimCheckStore,
    segment: &ExportChannelSegment,
) -> Result<ExportChannelSegment, ExportError> {
    let hydrated = join_all(
        segment
            .timeseries
            .iter()
            .map(|timeseries| hydrate_timeseries(store, timeseries)),
    )
    .await
    .into_iter()
    .map(|result| result.map(Timeseries::Hydrated))
    .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportChannelSegment {
        id: segment.id.clone(),
        timeseries: hydrated,
    })
}

/// Hydrate a set of channel segments and serialize the export document.
pub async fn export_channel_segments(
    store: &ClaimCheckStore,
    segments: &[ExportChannelSegment],
    filter_associations: Vec<FilterAssociation>,
) -> Result<ExportBlob, ExportError> {
    let channel_segments = join_all(
        segments
            .iter()
            .map(|segment| hydrate_channel_segment(store, segment)),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>, _>>()?;

    let document = ExportDocument {
        channel_segments,
        filter_associations,
    };
    Ok(ExportBlob {
        bytes: serde_json::to_vec(&document)?,
        mime_type: "application/json",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seiswave_core::{TimeRange, TimeseriesType, WaveformDescriptor};

    fn encoded_id() -> String {
        ClaimCheckId::unfiltered(
            TimeRange::new(0.0, 100.0),
            ChannelSegmentId {
                channel_name: "ASAR.AS01.SHZ".to_string(),
                effective_at_secs: 0.0,
                start_time_secs: 10.0,
                end_time_secs: 20.0,
                creation_time_secs: 5.0,
            },
            WaveformDescriptor {
                timeseries_type: TimeseriesType::Waveform,
                start_time_secs: 10.0,
                end_time_secs: 20.0,
                sample_count: 3,
                sample_rate_hz: 40.0,
            },
        )
        .encode()
        .unwrap()
    }

    #[tokio::test]
    async fn test_hydration_takes_odd_indexed_values_exactly() {
        let store = ClaimCheckStore::new();
        let encoded = encoded_id();
        store
            .store(
                &encoded,
                vec![
                    1.0,
                    2.000_000_000_000_1,
                    3.0,
                    4.000_000_000_000_1,
                    5.0,
                    6.0,
                ],
            )
            .await;

        let hydrated = hydrate_timeseries(
            &store,
            &Timeseries::ClaimCheck {
                claim_check_id: encoded,
            },
        )
        .await
        .unwrap();

        assert_eq!(hydrated.samples, vec![2.000_000_000_000_1, 4.000_000_000_000_1, 6.0]);
        assert_eq!(hydrated.sample_count, 3);
        assert_eq!(hydrated.sample_rate_hz, 40.0);
        assert_eq!(hydrated.start_time_secs, 10.0);
    }

    #[tokio::test]
    async fn test_hydrating_non_claim_check_fails() {
        let store = ClaimCheckStore::new();
        let already = Timeseries::Hydrated(HydratedTimeseries {
            samples: vec![1.0],
            sample_count: 1,
            sample_rate_hz: 40.0,
            start_time_secs: 0.0,
            end_time_secs: 1.0,
        });
        let err = hydrate_timeseries(&store, &already).await.unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput));
        assert_eq!(
            err.to_string(),
            "Cannot convert timeseries that is not data claim check"
        );
    }

    #[tokio::test]
    async fn test_hydrating_unknown_id_fails() {
        let store = ClaimCheckStore::new();
        let err = hydrate_timeseries(
            &store,
            &Timeseries::ClaimCheck {
                claim_check_id: encoded_id(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_export_document_shape() {
        let store = ClaimCheckStore::new();
        let encoded = encoded_id();
        store.store(&encoded, vec![1.0, 2.0, 3.0, 4.0]).await;

        let segment = ExportChannelSegment {
            id: ClaimCheckId::decode(&encoded).unwrap().id,
            timeseries: vec![Timeseries::ClaimCheck {
                claim_check_id: encoded,
            }],
        };
        let associations = vec![FilterAssociation {
            channel_name: "ASAR.AS01.SHZ".to_string(),
            filter_name: "LP 4.00 Hz".to_string(),
        }];

        let blob = export_channel_segments(&store, &[segment], associations)
            .await
            .unwrap();
        assert_eq!(blob.mime_type, "application/json");

        let document: ExportDocument = serde_json::from_slice(&blob.bytes).unwrap();
        assert_eq!(document.channel_segments.len(), 1);
        assert_eq!(document.filter_associations.len(), 1);
        // Fully hydrated: no claim-check ids remain.
        match &document.channel_segments[0].timeseries[0] {
            Timeseries::Hydrated(hydrated) => {
                assert_eq!(hydrated.samples, vec![2.0, 4.0]);
                assert_eq!(hydrated.sample_count, 2);
            }
            Timeseries::ClaimCheck { .. } => panic!("expected hydrated timeseries"),
        }
    }

    #[tokio::test]
    async fn test_export_fails_when_any_segment_is_malformed() {
        let store = ClaimCheckStore::new();
        let segment = ExportChannelSegment {
            id: ChannelSegmentId {
                channel_name: "ASAR.AS01.SHZ".to_string(),
                effective_at_secs: 0.0,
                start_time_secs: 0.0,
                end_time_secs: 1.0,
                creation_time_secs: 0.0,
            },
            timeseries: vec![Timeseries::ClaimCheck {
                claim_check_id: "not json".to_string(),
            }],
        };
        let err = export_channel_segments(&store, &[segment], Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ClaimCheck(_)));
    }
}
