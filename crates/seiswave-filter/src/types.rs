//! Filter definitions and designed coefficient sets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The response shape of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum FilterKind {
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_hz: f64, high_hz: f64 },
    BandReject { low_hz: f64, high_hz: f64 },
}

/// A filter as configured, before coefficients exist for a concrete
/// sample rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    /// Display name; becomes the `filter` field of derived claim-check
    /// ids.
    pub name: String,
    #[serde(flatten)]
    pub kind: FilterKind,
    /// Filter order; one biquad section per pole pair.
    pub order: u32,
}

/// One second-order section in normalized `a0 = 1` form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SosCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// A filter designed for a concrete sample rate: the cascade of
/// second-order sections plus the application options chosen at design
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignedFilterDefinition {
    pub definition: FilterDefinition,
    pub sample_rate_hz: f64,
    pub sections: Vec<SosCoefficients>,
    /// Cosine-taper length at each end of the signal, in samples.
    pub taper_samples: usize,
    /// Run a second, time-reversed pass to cancel the cascade's phase
    /// delay.
    pub remove_group_delay: bool,
}

/// Fixed-point sample-rate map key (millihertz).
///
/// Channel segments may span several sample rates, so designed filters
/// are keyed per rate. Using an integral key makes lookup misses
/// explicit instead of depending on float key coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRateKey(u64);

impl SampleRateKey {
    #[must_use]
    pub fn from_hz(sample_rate_hz: f64) -> Self {
        Self((sample_rate_hz * 1_000.0).round() as u64)
    }

    #[must_use]
    pub fn as_hz(self) -> f64 {
        self.0 as f64 / 1_000.0
    }
}

/// Designed filters keyed by sample rate.
pub type FiltersBySampleRate = HashMap<SampleRateKey, DesignedFilterDefinition>;

/// Errors from filter design.
#[derive(Debug, Error, PartialEq)]
pub enum DesignError {
    #[error("cannot design a filter for sample rate {0} Hz")]
    InvalidSampleRate(f64),
    #[error("filter order must be at least 1, got {0}")]
    InvalidOrder(u32),
}
