//! Stateful application of a designed biquad cascade.
//!
//! Buffers arrive interleaved `[x, y, x, y, ...]`, so every routine here
//! walks the buffer with a configurable `(index_offset, index_increment)`
//! stride; filtering the value channel of a position buffer uses
//! `(1, 2)` and never touches the x slots.

use crate::types::{DesignedFilterDefinition, SosCoefficients};

/// Apply a designed filter in place over a strided view of `samples`.
///
/// Runs the cosine taper first, then the cascade forward, and, when the
/// design asks for group-delay removal, a second time-reversed pass with
/// fresh state (forward-backward filtering, which squares the magnitude
/// response and cancels the phase).
pub fn apply_designed(
    designed: &DesignedFilterDefinition,
    samples: &mut [f64],
    index_offset: usize,
    index_increment: usize,
) {
    apply_taper(samples, designed.taper_samples, index_offset, index_increment);
    apply_cascade(&designed.sections, samples, index_offset, index_increment);
    if designed.remove_group_delay {
        apply_cascade_reversed(&designed.sections, samples, index_offset, index_increment);
    }
}

/// Run every section of the cascade forward over the strided view.
pub fn apply_cascade(
    sections: &[SosCoefficients],
    samples: &mut [f64],
    index_offset: usize,
    index_increment: usize,
) {
    let increment = index_increment.max(1);
    for section in sections {
        let mut state = SectionState::default();
        let mut i = index_offset;
        while i < samples.len() {
            samples[i] = state.process(section, samples[i]);
            i += increment;
        }
    }
}

/// Run every section of the cascade backward over the strided view.
fn apply_cascade_reversed(
    sections: &[SosCoefficients],
    samples: &mut [f64],
    index_offset: usize,
    index_increment: usize,
) {
    let increment = index_increment.max(1);
    let indices: Vec<usize> = (index_offset..samples.len()).step_by(increment).collect();
    for section in sections {
        let mut state = SectionState::default();
        for &i in indices.iter().rev() {
            samples[i] = state.process(section, samples[i]);
        }
    }
}

/// Cosine-taper the first and last `taper_samples` strided values to
/// suppress edge transients.
pub fn apply_taper(
    samples: &mut [f64],
    taper_samples: usize,
    index_offset: usize,
    index_increment: usize,
) {
    if taper_samples == 0 {
        return;
    }
    let increment = index_increment.max(1);
    let indices: Vec<usize> = (index_offset..samples.len()).step_by(increment).collect();
    let n = taper_samples.min(indices.len() / 2);
    for k in 0..n {
        let weight = 0.5 * (1.0 - (std::f64::consts::PI * k as f64 / n as f64).cos());
        samples[indices[k]] *= weight;
        samples[indices[indices.len() - 1 - k]] *= weight;
    }
}

/// Transposed direct form II state for one section.
#[derive(Debug, Default, Clone, Copy)]
struct SectionState {
    z1: f64,
    z2: f64,
}

impl SectionState {
    fn process(&mut self, c: &SosCoefficients, input: f64) -> f64 {
        let y = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * y + self.z2;
        self.z2 = c.b2 * input - c.a2 * y;
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::design_filter;
    use crate::types::{FilterDefinition, FilterKind};

    fn low_pass(taper: usize, remove_group_delay: bool) -> DesignedFilterDefinition {
        design_filter(
            &FilterDefinition {
                name: "LP 4.00 Hz".to_string(),
                kind: FilterKind::LowPass { cutoff_hz: 4.0 },
                order: 2,
            },
            40.0,
            taper,
            remove_group_delay,
        )
        .unwrap()
    }

    fn high_pass(remove_group_delay: bool) -> DesignedFilterDefinition {
        design_filter(
            &FilterDefinition {
                name: "HP 1.00 Hz".to_string(),
                kind: FilterKind::HighPass { cutoff_hz: 1.0 },
                order: 2,
            },
            40.0,
            0,
            remove_group_delay,
        )
        .unwrap()
    }

    #[test]
    fn test_interleaved_stride_leaves_x_slots_untouched() {
        let mut buffer: Vec<f64> = (0..64)
            .map(|i| if i % 2 == 0 { i as f64 } else { 1.0 })
            .collect();
        let x_before: Vec<f64> = buffer.iter().step_by(2).copied().collect();

        apply_designed(&low_pass(4, true), &mut buffer, 1, 2);

        let x_after: Vec<f64> = buffer.iter().step_by(2).copied().collect();
        assert_eq!(x_before, x_after);
        // Value slots were filtered.
        assert_ne!(buffer[1], 1.0);
    }

    #[test]
    fn test_zero_signal_stays_zero() {
        let mut samples = vec![0.0; 128];
        apply_designed(&low_pass(8, true), &mut samples, 0, 1);
        assert!(samples.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_taper_zeroes_endpoints() {
        let mut samples = vec![1.0; 32];
        apply_taper(&mut samples, 4, 0, 1);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[31], 0.0);
        assert_eq!(samples[16], 1.0);
    }

    #[test]
    fn test_forward_backward_removes_phase_delay() {
        // Filtfilt has zero phase, so an impulse comes out symmetric
        // around its original position.
        let mut samples = vec![0.0; 257];
        samples[128] = 1.0;
        apply_designed(&low_pass(0, true), &mut samples, 0, 1);

        for k in 1..100 {
            let left = samples[128 - k];
            let right = samples[128 + k];
            assert!(
                (left - right).abs() < 1e-9,
                "asymmetric at +-{k}: {left} vs {right}"
            );
        }
        // Peak stays centered.
        let peak = samples
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 128);
    }

    #[test]
    fn test_high_pass_removes_dc_offset() {
        let mut samples = vec![5.0; 512];
        apply_designed(&high_pass(true), &mut samples, 0, 1);
        // Away from the edges the constant component is gone.
        for &v in &samples[128..384] {
            assert!(v.abs() < 1e-3, "residual dc {v}");
        }
    }
}
