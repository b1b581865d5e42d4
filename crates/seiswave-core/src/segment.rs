//! Channel-segment identities shared by the store, filter, and export
//! layers.

use serde::{Deserialize, Serialize};

/// Identity of one channel segment: which channel, which version of it,
/// and the time span it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSegmentId {
    /// Fully qualified channel name.
    pub channel_name: String,
    /// When this version of the channel came online, epoch seconds.
    pub effective_at_secs: f64,
    /// Start of the segment's data, epoch seconds.
    pub start_time_secs: f64,
    /// End of the segment's data, epoch seconds.
    pub end_time_secs: f64,
    /// When the segment was created, epoch seconds.
    pub creation_time_secs: f64,
}

impl ChannelSegmentId {
    /// Dotted display form used for logging and UI lookup keys.
    #[must_use]
    pub fn display_string(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            self.channel_name,
            self.effective_at_secs,
            self.creation_time_secs,
            self.start_time_secs,
            self.end_time_secs
        )
    }
}

/// The kind of timeseries a segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeseriesType {
    Waveform,
    Spectrogram,
}

/// Shape of one waveform timeseries: its span and sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformDescriptor {
    #[serde(rename = "type")]
    pub timeseries_type: TimeseriesType,
    pub start_time_secs: f64,
    pub end_time_secs: f64,
    pub sample_count: usize,
    pub sample_rate_hz: f64,
}
