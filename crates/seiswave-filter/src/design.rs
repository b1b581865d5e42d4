//! Biquad cascade design.
//!
//! Coefficients come from the RBJ audio-EQ cookbook formulas, one
//! second-order section per pole pair, with section Q values placed on
//! the Butterworth circle so the cascade is maximally flat. Design is a
//! pure function of the definition and sample rate: designing the same
//! definition twice yields coefficient-equal results.

use std::f64::consts::PI;

use crate::types::{
    DesignError, DesignedFilterDefinition, FilterDefinition, FilterKind, SosCoefficients,
};

/// Design a filter for a concrete sample rate.
pub fn design_filter(
    definition: &FilterDefinition,
    sample_rate_hz: f64,
    taper_samples: usize,
    remove_group_delay: bool,
) -> Result<DesignedFilterDefinition, DesignError> {
    if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
        return Err(DesignError::InvalidSampleRate(sample_rate_hz));
    }
    if definition.order == 0 {
        return Err(DesignError::InvalidOrder(0));
    }

    let nyquist = sample_rate_hz * 0.5;
    let section_count = definition.order.div_ceil(2) as usize;
    let mut sections = Vec::with_capacity(section_count);

    for q in butterworth_q_values(definition.order) {
        let section = match definition.kind {
            FilterKind::LowPass { cutoff_hz } => {
                low_pass(nyquist_clamp(cutoff_hz, nyquist), sample_rate_hz, q)
            }
            FilterKind::HighPass { cutoff_hz } => {
                high_pass(nyquist_clamp(cutoff_hz, nyquist), sample_rate_hz, q)
            }
            FilterKind::BandPass { low_hz, high_hz } => {
                let (low, high) = band_edges(low_hz, high_hz, nyquist);
                let center = (low * high).sqrt();
                let band_q = band_q(center, low, high, q);
                band_pass(center, sample_rate_hz, band_q)
            }
            FilterKind::BandReject { low_hz, high_hz } => {
                let (low, high) = band_edges(low_hz, high_hz, nyquist);
                let center = (low * high).sqrt();
                let band_q = band_q(center, low, high, q);
                notch(center, sample_rate_hz, band_q)
            }
        };
        sections.push(section);
    }

    Ok(DesignedFilterDefinition {
        definition: definition.clone(),
        sample_rate_hz,
        sections,
        taper_samples,
        remove_group_delay,
    })
}

/// Section Q values for an order-n Butterworth cascade: pole pairs at
/// angles `(2k + 1) * pi / (2n)`. Odd orders round up to the next pole
/// pair so every section stays a conjugate pair.
fn butterworth_q_values(order: u32) -> Vec<f64> {
    let pairs = order.div_ceil(2);
    let n = f64::from(pairs * 2);
    (0..pairs)
        .map(|k| {
            let theta = (2.0 * f64::from(k) + 1.0) * PI / (2.0 * n);
            1.0 / (2.0 * theta.cos())
        })
        .collect()
}

fn nyquist_clamp(freq_hz: f64, nyquist: f64) -> f64 {
    freq_hz.clamp(0.01, nyquist - 0.01)
}

fn band_edges(low_hz: f64, high_hz: f64, nyquist: f64) -> (f64, f64) {
    let low = nyquist_clamp(low_hz.min(high_hz), nyquist);
    let high = nyquist_clamp(low_hz.max(high_hz), nyquist);
    (low, high)
}

fn band_q(center: f64, low: f64, high: f64, section_q: f64) -> f64 {
    section_q.max(0.1).min(100.0).min(center / (high - low))
}

fn low_pass(freq_hz: f64, sample_rate_hz: f64, q: f64) -> SosCoefficients {
    let w0 = 2.0 * PI * freq_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    let b0 = (1.0 - cos_w0) * 0.5;
    let b1 = 1.0 - cos_w0;
    let b2 = b0;
    normalize(b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
}

fn high_pass(freq_hz: f64, sample_rate_hz: f64, q: f64) -> SosCoefficients {
    let w0 = 2.0 * PI * freq_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    let b0 = (1.0 + cos_w0) * 0.5;
    let b1 = -(1.0 + cos_w0);
    let b2 = b0;
    normalize(b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
}

fn band_pass(center_hz: f64, sample_rate_hz: f64, q: f64) -> SosCoefficients {
    let w0 = 2.0 * PI * center_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    let b0 = alpha;
    let b1 = 0.0;
    let b2 = -alpha;
    normalize(b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
}

fn notch(center_hz: f64, sample_rate_hz: f64, q: f64) -> SosCoefficients {
    let w0 = 2.0 * PI * center_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    let b0 = 1.0;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0;
    normalize(b0, b1, b2, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
}

fn normalize(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> SosCoefficients {
    let a0_inv = 1.0 / a0;
    SosCoefficients {
        b0: b0 * a0_inv,
        b1: b1 * a0_inv,
        b2: b2 * a0_inv,
        a1: a1 * a0_inv,
        a2: a2 * a0_inv,
    }
}
