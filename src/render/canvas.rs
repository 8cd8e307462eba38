use std::fmt;

/// A colour in CSS `hsl()` terms: hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Converts to 8-bit sRGB channels following the CSS Color 3 algorithm.
    pub fn to_rgb(self) -> [u8; 3] {
        let h = self.hue.rem_euclid(360.0) / 360.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
        let m1 = l * 2.0 - m2;

        let channel = |t: f32| -> u8 {
            let v = hue_to_channel(m1, m2, t);
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };

        [
            channel(h + 1.0 / 3.0),
            channel(h),
            channel(h - 1.0 / 3.0),
        ]
    }
}

fn hue_to_channel(m1: f32, m2: f32, mut h: f32) -> f32 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// The subset of a 2D drawing context the frame renderer needs.
///
/// Styling state (fill colour, shadow blur, shadow colour) persists between
/// calls until changed, the same way it does on an HTML canvas context.
pub trait Canvas2d {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn set_fill_style(&mut self, color: Hsl);
    fn set_shadow_blur(&mut self, blur: f32);
    fn set_shadow_color(&mut self, color: Hsl);

    /// Fills an axis-aligned rectangle with the current fill style.
    /// Non-positive width or height paints nothing.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Fills a full circle (a 0..2π arc) with the current fill style.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32);
}
