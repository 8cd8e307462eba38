use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

pub const SPEED_RANGE: RangeInclusive<f32> = 0.1..=5.0;
pub const SPEED_STEP: f64 = 0.1;
pub const DENSITY_RANGE: RangeInclusive<u32> = 5..=64;
pub const GLOW_RANGE: RangeInclusive<f32> = 0.0..=50.0;
pub const HUE_RANGE: RangeInclusive<f32> = 0.0..=360.0;

/// Drawing mode for each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Bars,
    Dots,
    Grid,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Bars, Style::Dots, Style::Grid];

    pub fn label(self) -> &'static str {
        match self {
            Style::Bars => "Bars",
            Style::Dots => "Dots",
            Style::Grid => "Grid",
        }
    }
}

/// User-adjustable visual parameters, read by the renderer every frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    /// Captured from the UI but not consulted by the renderer.
    pub speed: f32,
    /// Number of bands the canvas width is divided into.
    pub density: u32,
    /// Shadow blur radius in pixels.
    pub glow: f32,
    /// Colour angle in degrees.
    pub hue: f32,
    pub style: Style,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            density: 30,
            glow: 10.0,
            hue: 280.0,
            style: Style::Bars,
        }
    }
}

impl VisualParams {
    /// Load initial parameters from a JSON file. Missing fields take their
    /// defaults and out-of-range values are clamped.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read params file {:?}", path))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid params file {:?}", path))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut params: Self = serde_json::from_str(text)?;
        params.clamp();
        Ok(params)
    }

    /// Bring every field back inside its UI range.
    pub fn clamp(&mut self) {
        self.speed = clamp_f32(self.speed, &SPEED_RANGE, 1.0);
        self.density = self.density.clamp(*DENSITY_RANGE.start(), *DENSITY_RANGE.end());
        self.glow = clamp_f32(self.glow, &GLOW_RANGE, 0.0);
        self.hue = clamp_f32(self.hue, &HUE_RANGE, 0.0);
    }
}

fn clamp_f32(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}
