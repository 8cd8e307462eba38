use anyhow::{Context, Result};
use image::{imageops, GrayImage};
use tiny_skia::{
    Color, ColorU8, FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect,
    Transform,
};

use super::canvas::{Canvas2d, Hsl};

/// Gaussian extent, in sigmas, kept around a shape when painting its shadow.
const SHADOW_EXTENT_SIGMAS: f32 = 3.0;

/// [`Canvas2d`] backed by a `tiny_skia::Pixmap`.
///
/// Shapes are anti-aliased and clipped to the pixmap. A non-zero shadow blur
/// paints a Gaussian-blurred copy of each shape (sigma `blur / 2`) in the
/// shadow colour underneath it.
pub struct PixelCanvas {
    pixmap: Pixmap,
    fill: [u8; 3],
    shadow_blur: f32,
    shadow_color: [u8; 3],
}

/// Integer pixel region, in canvas coordinates, that a shadow is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShadowRegion {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
}

impl ShadowRegion {
    /// Shape bounds grown by `pad`, limited to the canvas grown by `pad`.
    fn around(bounds: Rect, pad: i32, canvas_width: u32, canvas_height: u32) -> Option<Self> {
        let left = (bounds.left().floor() as i32 - pad).max(-pad);
        let top = (bounds.top().floor() as i32 - pad).max(-pad);
        let right = (bounds.right().ceil() as i32 + pad).min(canvas_width as i32 + pad);
        let bottom = (bounds.bottom().ceil() as i32 + pad).min(canvas_height as i32 + pad);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Self {
            left,
            top,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height)
            .with_context(|| format!("Invalid canvas size {}x{}", width, height))?;
        pixmap.fill(Color::BLACK);

        Ok(Self {
            pixmap,
            fill: [0, 0, 0],
            shadow_blur: 0.0,
            shadow_color: [0, 0, 0],
        })
    }

    /// Row-major RGBA8 bytes, ready for a texture upload.
    ///
    /// Every pixel is opaque, so the pixmap's premultiplied data is plain RGBA.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let p = self.pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    fn paint(color: [u8; 3]) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = true;
        paint
    }

    fn sigma(&self) -> f32 {
        self.shadow_blur / 2.0
    }

    /// Paints the blurred shadow of `path` beneath whatever is drawn next.
    fn draw_shadow(&mut self, path: &Path) {
        let sigma = self.sigma();
        if sigma <= 0.0 {
            return;
        }

        let pad = (sigma * SHADOW_EXTENT_SIGMAS).ceil() as i32;
        let region = match ShadowRegion::around(
            path.bounds(),
            pad,
            self.pixmap.width(),
            self.pixmap.height(),
        ) {
            Some(region) => region,
            None => return,
        };

        let mut mask = match Mask::new(region.width, region.height) {
            Some(mask) => mask,
            None => return,
        };
        mask.fill_path(
            path,
            FillRule::Winding,
            true,
            Transform::from_translate(-region.left as f32, -region.top as f32),
        );

        let coverage = match GrayImage::from_raw(region.width, region.height, mask.data().to_vec()) {
            Some(image) => image,
            None => return,
        };
        let blurred = imageops::blur(&coverage, sigma);

        let mut shadow = match Pixmap::new(region.width, region.height) {
            Some(pixmap) => pixmap,
            None => return,
        };
        let [r, g, b] = self.shadow_color;
        for (pixel, alpha) in shadow.pixels_mut().iter_mut().zip(blurred.pixels()) {
            *pixel = ColorU8::from_rgba(r, g, b, alpha.0[0]).premultiply();
        }

        self.pixmap.draw_pixmap(
            region.left,
            region.top,
            shadow.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

impl Canvas2d for PixelCanvas {
    fn width(&self) -> f32 {
        self.pixmap.width() as f32
    }

    fn height(&self) -> f32 {
        self.pixmap.height() as f32
    }

    fn set_fill_style(&mut self, color: Hsl) {
        self.fill = color.to_rgb();
    }

    fn set_shadow_blur(&mut self, blur: f32) {
        self.shadow_blur = if blur.is_finite() { blur.max(0.0) } else { 0.0 };
    }

    fn set_shadow_color(&mut self, color: Hsl) {
        self.shadow_color = color.to_rgb();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        let rect = match Rect::from_xywh(x, y, width, height) {
            Some(rect) => rect,
            None => return,
        };

        self.draw_shadow(&PathBuilder::from_rect(rect));
        self.pixmap
            .fill_rect(rect, &Self::paint(self.fill), Transform::identity(), None);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32) {
        if !(radius > 0.0) {
            return;
        }
        let path = match PathBuilder::from_circle(cx, cy, radius) {
            Some(path) => path,
            None => return,
        };

        self.draw_shadow(&path);
        self.pixmap.fill_path(
            &path,
            &Self::paint(self.fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}
