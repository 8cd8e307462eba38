//! Command-line argument parsing.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::audio::DEFAULT_FFT_SIZE;
use crate::params::{Style, VisualParams};

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 400;
/// Largest canvas edge; fits wgpu's default `max_texture_dimension_2d` (8192).
pub const MAX_CANVAS_SIZE: i64 = 4096;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "lofi-visualiser")]
#[command(about = "Lo-fi audio visualiser: bars, dots or grid over a live spectrum", long_about = None)]
pub struct Args {
    /// Audio file to play (MP3, WAV, FLAC, OGG, etc.)
    #[arg(long, value_name = "PATH", default_value = "vaporwave.mp3")]
    pub audio: PathBuf,

    /// JSON file with the initial visual parameters
    #[arg(long, value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Initial drawing style, overrides the params file
    #[arg(long, value_enum)]
    pub style: Option<Style>,

    /// Analysis FFT size (power of two); the spectrum has half as many bands
    #[arg(long, default_value_t = DEFAULT_FFT_SIZE)]
    pub fft_size: usize,

    /// Canvas width in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH, value_parser = clap::value_parser!(u32).range(1..=MAX_CANVAS_SIZE))]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT, value_parser = clap::value_parser!(u32).range(1..=MAX_CANVAS_SIZE))]
    pub height: u32,
}

impl Args {
    /// Initial visual parameters: defaults, then the params file, then `--style`.
    pub fn visual_params(&self) -> Result<VisualParams> {
        let mut params = match &self.params {
            Some(path) => VisualParams::from_json_file(path)?,
            None => VisualParams::default(),
        };
        if let Some(style) = self.style {
            params.style = style;
        }
        Ok(params)
    }
}
