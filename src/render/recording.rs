//! Test double that records every canvas call instead of rasterising.

use super::canvas::{Canvas2d, Hsl};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    FillStyle(Hsl),
    ShadowBlur(f32),
    ShadowColor(Hsl),
    FillRect { x: f32, y: f32, width: f32, height: f32 },
    FillCircle { cx: f32, cy: f32, radius: f32 },
}

pub struct RecordingCanvas {
    width: f32,
    height: f32,
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn rects(&self) -> Vec<(f32, f32, f32, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                DrawCall::FillRect { x, y, width, height } => Some((x, y, width, height)),
                _ => None,
            })
            .collect()
    }

    pub fn circles(&self) -> Vec<(f32, f32, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                DrawCall::FillCircle { cx, cy, radius } => Some((cx, cy, radius)),
                _ => None,
            })
            .collect()
    }

    pub fn fill_styles(&self) -> Vec<Hsl> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                DrawCall::FillStyle(color) => Some(color),
                _ => None,
            })
            .collect()
    }
}

impl Canvas2d for RecordingCanvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn set_fill_style(&mut self, color: Hsl) {
        self.calls.push(DrawCall::FillStyle(color));
    }

    fn set_shadow_blur(&mut self, blur: f32) {
        self.calls.push(DrawCall::ShadowBlur(blur));
    }

    fn set_shadow_color(&mut self, color: Hsl) {
        self.calls.push(DrawCall::ShadowColor(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::FillRect { x, y, width, height });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32) {
        self.calls.push(DrawCall::FillCircle { cx, cy, radius });
    }
}
