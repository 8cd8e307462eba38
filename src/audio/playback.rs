use anyhow::{ensure, Context, Result};
use log::{debug, info};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{AudioSource, SpectrumAnalyser};

/// Decoded track: interleaved samples for playback plus a mono mix for analysis.
pub struct DecodedTrack {
    pub channels: u16,
    pub sample_rate: u32,
    pub interleaved: Vec<f32>,
    pub mono: Vec<f32>,
}

impl DecodedTrack {
    pub fn decode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open audio file {:?}", path))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode audio file {:?}", path))?;

        let channels = source.channels();
        let sample_rate = source.sample_rate();
        let interleaved: Vec<f32> = source.convert_samples().collect();

        Ok(Self::from_interleaved(channels, sample_rate, interleaved))
    }

    pub fn from_interleaved(channels: u16, sample_rate: u32, interleaved: Vec<f32>) -> Self {
        let channels = channels.max(1);
        let mono = interleaved
            .chunks_exact(channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Self {
            channels,
            sample_rate,
            interleaved,
            mono,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.mono.len() as f32 / self.sample_rate as f32
    }

    /// Hands the interleaved samples to a playable buffer and keeps the mono mix.
    pub fn split(self) -> (SamplesBuffer<f32>, AnalysisTrack) {
        let buffer = SamplesBuffer::new(self.channels, self.sample_rate, self.interleaved);
        let track = AnalysisTrack {
            sample_rate: self.sample_rate,
            mono: self.mono,
        };
        (buffer, track)
    }
}

/// Mono samples of the playing track, indexed by playback position.
pub struct AnalysisTrack {
    pub sample_rate: u32,
    pub mono: Vec<f32>,
}

/// The `size` mono samples that end at `position`, fewer near the start.
/// Empty once `position` is past the end of the track.
pub fn analysis_window(samples: &[f32], position: usize, size: usize) -> &[f32] {
    if position > samples.len() {
        return &[];
    }
    &samples[position.saturating_sub(size)..position]
}

/// rodio-backed [`AudioSource`] that plays one fixed audio file.
///
/// The output stream is opened lazily by [`start`](AudioSource::start), the
/// file is decoded on the first [`play`](AudioSource::play), and the analysis
/// position follows the wall clock from the moment playback began.
pub struct AudioPlayback {
    path: PathBuf,
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    track: Option<AnalysisTrack>,
    started_at: Option<Instant>,
    analyser: SpectrumAnalyser,
}

impl AudioPlayback {
    pub fn new<P: Into<PathBuf>>(path: P, fft_size: usize) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            output: None,
            sink: None,
            track: None,
            started_at: None,
            analyser: SpectrumAnalyser::new(fft_size)?,
        })
    }

    #[cfg(test)]
    fn playing_since(track: AnalysisTrack, started_at: Instant, fft_size: usize) -> Result<Self> {
        let mut playback = Self::new("", fft_size)?;
        playback.track = Some(track);
        playback.started_at = Some(started_at);
        Ok(playback)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn playback_position(&self) -> Option<usize> {
        let track = self.track.as_ref()?;
        let started_at = self.started_at?;
        let elapsed = started_at.elapsed().as_secs_f64();
        Some((elapsed * track.sample_rate as f64) as usize)
    }
}

impl AudioSource for AudioPlayback {
    fn start(&mut self) -> Result<()> {
        if self.output.is_none() {
            let output = OutputStream::try_default().context("Failed to open default audio output")?;
            self.output = Some(output);
            info!("Audio engine started");
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let (_, handle) = self.output.as_ref().context("Audio engine has not been started")?;

        let decoded = DecodedTrack::decode(&self.path)?;
        ensure!(!decoded.mono.is_empty(), "Audio file {:?} contains no samples", self.path);
        info!(
            "Loaded audio file: {:?} ({}Hz, {} channels, {:.1}s)",
            self.path,
            decoded.sample_rate,
            decoded.channels,
            decoded.duration_seconds()
        );

        let sink = Sink::try_new(handle).context("Failed to create audio sink")?;
        let (buffer, track) = decoded.split();
        sink.append(buffer);
        sink.play();

        self.sink = Some(sink);
        self.track = Some(track);
        self.started_at = Some(Instant::now());
        self.analyser.reset();
        info!("Audio playback started");

        Ok(())
    }

    fn frequency_data(&mut self) -> &[u8] {
        let size = self.analyser.fft_size();
        match (self.playback_position(), &self.track) {
            (Some(position), Some(track)) => {
                let window = analysis_window(&track.mono, position, size);
                if window.is_empty() {
                    debug!("Playback position past end of track");
                }
                self.analyser.analyse(window)
            }
            _ => self.analyser.analyse(&[]),
        }
    }

    fn is_playing(&self) -> bool {
        self.sink.as_ref().map_or(false, |sink| !sink.is_paused() && !sink.empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::DEFAULT_FFT_SIZE;
    use std::time::Duration;

    #[test]
    fn test_mono_mixdown() {
        let track = DecodedTrack::from_interleaved(2, 48000, vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0]);
        assert_eq!(track.mono, vec![0.5, 0.5, 0.0]);
        assert_eq!(track.channels, 2);
    }

    #[test]
    fn test_trailing_partial_frame_dropped() {
        let track = DecodedTrack::from_interleaved(2, 44100, vec![1.0, 1.0, 0.3]);
        assert_eq!(track.mono, vec![1.0]);
    }

    #[test]
    fn test_duration() {
        let track = DecodedTrack::from_interleaved(1, 4, vec![0.0; 10]);
        assert!((track.duration_seconds() - 2.5).abs() < 1e-6);
        assert_eq!(DecodedTrack::from_interleaved(1, 0, vec![0.0; 4]).duration_seconds(), 0.0);
    }

    #[test]
    fn test_analysis_window() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(analysis_window(&samples, 6, 4), &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(analysis_window(&samples, 2, 4), &[0.0, 1.0]);
        assert_eq!(analysis_window(&samples, 10, 4), &[6.0, 7.0, 8.0, 9.0]);
        assert!(analysis_window(&samples, 11, 4).is_empty());
        assert!(analysis_window(&samples, 0, 4).is_empty());
    }

    #[test]
    fn test_silent_before_play() {
        let mut playback = AudioPlayback::new("vaporwave.mp3", 256).unwrap();
        assert!(!playback.is_playing());
        let data = playback.frequency_data();
        assert_eq!(data.len(), 128);
        assert!(data.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_default_spectrum_has_256_bands() {
        let mut playback = AudioPlayback::new("vaporwave.mp3", DEFAULT_FFT_SIZE).unwrap();
        assert_eq!(playback.frequency_data().len(), 256);
    }

    #[test]
    fn test_split_keeps_mono_for_analysis() {
        let track = DecodedTrack::from_interleaved(2, 8000, vec![0.2, 0.4, 1.0, 0.0]);
        let (buffer, analysis) = track.split();
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(analysis.sample_rate, 8000);
        assert_eq!(analysis.mono.len(), 2);
        assert!((analysis.mono[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_tone_shows_up_while_playing() {
        let sample_rate = 44100;
        let fft_size = 512;
        let bin = 20;
        let mono = (0..sample_rate * 2)
            .map(|i| {
                (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / fft_size as f32).sin()
            })
            .collect();
        let track = AnalysisTrack { sample_rate: sample_rate as u32, mono };
        let started_at = Instant::now() - Duration::from_millis(500);

        let mut playback = AudioPlayback::playing_since(track, started_at, fft_size).unwrap();
        let data = playback.frequency_data().to_vec();

        assert_eq!(data.len(), fft_size / 2);
        assert!(data[bin] > 0, "expected energy at bin {}", bin);
        assert!(data[bin] > data[200]);
    }

    #[test]
    fn test_silent_after_track_ends() {
        let track = AnalysisTrack { sample_rate: 1000, mono: vec![0.5; 100] };
        let started_at = Instant::now() - Duration::from_secs(5);

        let mut playback = AudioPlayback::playing_since(track, started_at, 256).unwrap();
        assert!(playback.frequency_data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_play_before_start_fails() {
        let mut playback = AudioPlayback::new("vaporwave.mp3", 256).unwrap();
        let err = playback.play().unwrap_err();
        assert!(err.to_string().contains("not been started"));
    }
}
