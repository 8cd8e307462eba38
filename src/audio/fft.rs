use anyhow::{ensure, Result};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Analysis size whose spectrum has 256 bands.
pub const DEFAULT_FFT_SIZE: usize = 512;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

/// Weight of the previous frame when smoothing magnitudes over time.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
/// Decibel level mapped to byte 0.
pub const MIN_DECIBELS: f32 = -100.0;
/// Decibel level mapped to byte 255.
pub const MAX_DECIBELS: f32 = -30.0;

/// Byte-scaled frequency analyser in the manner of a browser analyser node.
///
/// Each call to [`analyse`](Self::analyse) windows the most recent `fft_size`
/// samples with a Blackman window, runs a forward FFT, smooths the bin
/// magnitudes against the previous frame and maps them from
/// `[MIN_DECIBELS, MAX_DECIBELS]` onto `0..=255`.
pub struct SpectrumAnalyser {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    magnitudes: Vec<u8>,
}

impl SpectrumAnalyser {
    pub fn new(fft_size: usize) -> Result<Self> {
        ensure!(
            fft_size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size),
            "FFT size must be a power of two between {} and {}, got {}",
            MIN_FFT_SIZE,
            MAX_FFT_SIZE,
            fft_size
        );

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let bins = fft_size / 2;

        Ok(Self {
            fft_size,
            fft,
            window: Self::blackman_window(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            magnitudes: vec![0; bins],
        })
    }

    fn blackman_window(size: usize) -> Vec<f32> {
        let a0 = 0.42;
        let a1 = 0.5;
        let a2 = 0.08;
        (0..size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
                a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
            })
            .collect()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// The Magnitude Array produced by the last call to `analyse`.
    pub fn magnitudes(&self) -> &[u8] {
        &self.magnitudes
    }

    /// Forget smoothing history and zero the output.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
        self.magnitudes.iter_mut().for_each(|v| *v = 0);
    }

    /// Analyse the trailing `fft_size` samples of `audio_data`. Shorter input is
    /// treated as preceded by silence.
    pub fn analyse(&mut self, audio_data: &[f32]) -> &[u8] {
        let take = audio_data.len().min(self.fft_size);
        let tail = &audio_data[audio_data.len() - take..];
        let lead = self.fft_size - take;

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < lead { 0.0 } else { tail[i - lead] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        for (bin, (smoothed, out)) in self
            .smoothed
            .iter_mut()
            .zip(self.magnitudes.iter_mut())
            .enumerate()
        {
            let magnitude = self.buffer[bin].norm() * scale;
            *smoothed = SMOOTHING_TIME_CONSTANT * *smoothed
                + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }

            let db = 20.0 * smoothed.log10();
            let scaled = 255.0 / range * (db - MIN_DECIBELS);
            *out = if scaled.is_nan() {
                0
            } else {
                scaled.floor().clamp(0.0, 255.0) as u8
            };
        }

        &self.magnitudes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bin: usize, fft_size: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / fft_size as f32).sin())
            .collect()
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(SpectrumAnalyser::new(0).is_err());
        assert!(SpectrumAnalyser::new(100).is_err());
        assert!(SpectrumAnalyser::new(16).is_err());
        assert!(SpectrumAnalyser::new(65536).is_err());
        assert_eq!(SpectrumAnalyser::new(DEFAULT_FFT_SIZE).unwrap().bin_count(), 256);
    }

    #[test]
    fn test_bin_count_is_half_fft_size() {
        let mut analyser = SpectrumAnalyser::new(256).unwrap();
        assert_eq!(analyser.bin_count(), 128);
        assert_eq!(analyser.analyse(&[0.0; 256]).len(), 128);
    }

    #[test]
    fn test_silence_is_zero() {
        let mut analyser = SpectrumAnalyser::new(256).unwrap();
        assert!(analyser.analyse(&[0.0; 512]).iter().all(|&v| v == 0));
        assert!(analyser.analyse(&[]).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let mut analyser = SpectrumAnalyser::new(256).unwrap();
        let signal = tone(20, 256, 256);
        let out = analyser.analyse(&signal).to_vec();

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .map(|(i, _)| i)
            .unwrap();
        assert!((19..=21).contains(&peak), "peak at bin {}", peak);
        assert_eq!(out[20], 255);
        assert!(out[100] < out[20]);
    }

    #[test]
    fn test_short_input_is_padded() {
        let mut analyser = SpectrumAnalyser::new(256).unwrap();
        let out = analyser.analyse(&tone(10, 256, 64));
        assert_eq!(out.len(), 128);
        assert!(out.iter().any(|&v| v > 0));
    }

    #[test]
    fn test_smoothing_decays_after_signal_stops() {
        let mut analyser = SpectrumAnalyser::new(256).unwrap();
        let signal = tone(20, 256, 256);
        analyser.analyse(&signal);
        analyser.analyse(&signal);

        let after_one = analyser.analyse(&[0.0; 256])[20];
        assert!(after_one > 0, "smoothing should keep energy for a frame");

        for _ in 0..200 {
            analyser.analyse(&[0.0; 256]);
        }
        assert_eq!(analyser.magnitudes()[20], 0);
        assert!(analyser.magnitudes()[20] < after_one);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut analyser = SpectrumAnalyser::new(256).unwrap();
        analyser.analyse(&tone(20, 256, 256));
        analyser.reset();
        assert!(analyser.magnitudes().iter().all(|&v| v == 0));
        assert!(analyser.analyse(&[0.0; 256]).iter().all(|&v| v == 0));
    }
}
