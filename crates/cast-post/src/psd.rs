//! Welch power spectral density.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// One-sided Welch estimate of the power spectral density of `samples`.
///
/// Segments of `segment_length` samples overlap by half, are detrended by
/// their mean and tapered with a periodic Hann window. Densities are scaled by
/// `1 / (fs Σw²)` and every bin except DC and Nyquist is doubled. The segment
/// length is clamped to the signal length. Returns `segment_length / 2 + 1`
/// bins, or nothing for an empty signal.
pub fn welch(samples: &[f64], sample_rate: f64, segment_length: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let nperseg = segment_length.clamp(1, samples.len());
    let step = (nperseg / 2).max(1);
    let window = hann(nperseg);
    let scale = 1.0 / (sample_rate * window.iter().map(|w| w * w).sum::<f64>());
    let bins = nperseg / 2 + 1;

    let fft = FftPlanner::<f64>::new().plan_fft_forward(nperseg);
    let mut density = vec![0.0; bins];
    let mut segments = 0usize;
    let mut buffer = vec![Complex::new(0.0, 0.0); nperseg];
    let mut start = 0;
    while start + nperseg <= samples.len() {
        let segment = &samples[start..start + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;
        for ((slot, sample), w) in buffer.iter_mut().zip(segment).zip(&window) {
            *slot = Complex::new((sample - mean) * w, 0.0);
        }
        fft.process(&mut buffer);
        for (acc, value) in density.iter_mut().zip(&buffer) {
            *acc += value.norm_sqr() * scale;
        }
        segments += 1;
        start += step;
    }

    let last_doubled = if nperseg % 2 == 0 { bins - 1 } else { bins };
    for (idx, value) in density.iter_mut().enumerate() {
        *value /= segments as f64;
        if idx > 0 && idx < last_doubled {
            *value *= 2.0;
        }
    }
    density
}

/// Bin frequencies matching [`welch`] for a signal of `signal_length` samples.
pub fn welch_frequencies(sample_rate: f64, segment_length: usize, signal_length: usize) -> Vec<f64> {
    if signal_length == 0 {
        return Vec::new();
    }
    let nperseg = segment_length.clamp(1, signal_length);
    (0..=nperseg / 2)
        .map(|k| k as f64 * sample_rate / nperseg as f64)
        .collect()
}

fn hann(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / len as f64).cos())
        .collect()
}
