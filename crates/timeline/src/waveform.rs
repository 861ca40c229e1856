//! Peak waveform used as the timeline background.

/// Normalized peak amplitudes, one per column bucket, in `[0.0, 1.0]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    peaks: Vec<f32>,
}

impl Waveform {
    /// Build from raw mono samples, reducing to at most `buckets` peaks.
    ///
    /// Peaks are normalized so the loudest bucket is `1.0`.
    pub fn from_samples(samples: &[f32], buckets: usize) -> Self {
        if samples.is_empty() || buckets == 0 {
            return Self::default();
        }
        let block = samples.len().div_ceil(buckets).max(1);
        let mut peaks: Vec<f32> = samples
            .chunks(block)
            .map(|chunk| {
                chunk
                    .iter()
                    .filter(|s| s.is_finite())
                    .map(|s| s.abs())
                    .fold(0.0f32, f32::max)
            })
            .collect();

        let max = peaks.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            for p in &mut peaks {
                *p /= max;
            }
        }
        Self { peaks }
    }

    /// Use precomputed peaks, clamping them into `[0.0, 1.0]`.
    pub fn from_peaks(peaks: Vec<f32>) -> Self {
        Self {
            peaks: peaks
                .into_iter()
                .map(|p| if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 })
                .collect(),
        }
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Amplitude at a fractional position `[0.0, 1.0]` along the source.
    pub fn amplitude_at(&self, fraction: f64) -> f32 {
        if self.peaks.is_empty() {
            return 0.0;
        }
        let last = self.peaks.len() - 1;
        let index = (fraction.clamp(0.0, 1.0) * self.peaks.len() as f64) as usize;
        self.peaks[index.min(last)]
    }
}
