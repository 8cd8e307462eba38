use super::canvas::{Canvas2d, Hsl};
use crate::params::{Style, VisualParams};

pub const BACKGROUND_SATURATION: f32 = 20.0;
pub const BACKGROUND_LIGHTNESS: f32 = 10.0;
pub const GLOW_LIGHTNESS: f32 = 70.0;
pub const DOT_RADIUS: f32 = 4.0;
pub const GRID_PIXEL: f32 = 2.0;
pub const BAR_GAP: f32 = 2.0;

/// Largest value a Magnitude Array sample can hold.
pub const MAX_MAGNITUDE: f32 = 255.0;

pub fn background_color(hue: f32) -> Hsl {
    Hsl::new(hue, BACKGROUND_SATURATION, BACKGROUND_LIGHTNESS)
}

pub fn glow_color(hue: f32) -> Hsl {
    Hsl::new(hue, 100.0, GLOW_LIGHTNESS)
}

/// Shape colour: brightness rises from 30% to 80% lightness with the magnitude.
pub fn band_color(hue: f32, normalized: f32) -> Hsl {
    Hsl::new(hue, 100.0, 30.0 + normalized * 50.0)
}

pub fn bar_width(canvas_width: f32, density: u32) -> f32 {
    canvas_width / density.max(1) as f32
}

pub fn normalize(sample: u8) -> f32 {
    sample as f32 / MAX_MAGNITUDE
}

pub fn band_top(canvas_height: f32, normalized: f32) -> f32 {
    canvas_height * (1.0 - normalized)
}

/// Paints exactly one frame of the visualiser onto `canvas`.
///
/// Every sample of `magnitudes` is drawn, so when the array is longer than
/// `params.density` the extra bands land past the right edge and are clipped.
pub fn render_frame<C: Canvas2d + ?Sized>(canvas: &mut C, magnitudes: &[u8], params: &VisualParams) {
    let width = canvas.width();
    let height = canvas.height();

    // Full-canvas opaque fill, a shadow under it would never be visible.
    canvas.set_shadow_blur(0.0);
    canvas.set_fill_style(background_color(params.hue));
    canvas.fill_rect(0.0, 0.0, width, height);

    canvas.set_shadow_blur(params.glow);
    canvas.set_shadow_color(glow_color(params.hue));

    let band = bar_width(width, params.density);
    for (i, &sample) in magnitudes.iter().enumerate() {
        let val = normalize(sample);
        let x = i as f32 * band;
        let y = band_top(height, val);
        canvas.set_fill_style(band_color(params.hue, val));

        match params.style {
            Style::Bars => canvas.fill_rect(x, y, band - BAR_GAP, height - y),
            Style::Dots => canvas.fill_circle(x, y, DOT_RADIUS),
            Style::Grid => canvas.fill_rect(x % width, y % height, GRID_PIXEL, GRID_PIXEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DENSITY_RANGE;
    use crate::render::recording::{DrawCall, RecordingCanvas};
    use crate::render::PixelCanvas;

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 400.0;

    fn params(style: Style) -> VisualParams {
        VisualParams {
            style,
            ..VisualParams::default()
        }
    }

    #[test]
    fn test_bar_width_positive_and_bars_fit() {
        for density in DENSITY_RANGE {
            let band = bar_width(WIDTH, density);
            assert!(band > 0.0);

            let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
            let magnitudes = vec![255u8; density as usize];
            render_frame(&mut canvas, &magnitudes, &VisualParams { density, ..params(Style::Bars) });

            for (x, y, w, h) in canvas.rects().into_iter().skip(1) {
                assert!(x >= 0.0 && y >= 0.0);
                assert!(x + w <= WIDTH + 1e-3, "bar at {} overflows for density {}", x, density);
                assert!(y + h <= HEIGHT + 1e-3);
            }
        }
    }

    #[test]
    fn test_normalized_and_y_stay_in_bounds() {
        for sample in 0..=255u8 {
            let val = normalize(sample);
            assert!((0.0..=1.0).contains(&val));
            let y = band_top(HEIGHT, val);
            assert!((0.0..=HEIGHT).contains(&y));
        }
        assert_eq!(band_top(HEIGHT, normalize(0)), HEIGHT);
        assert_eq!(band_top(HEIGHT, normalize(255)), 0.0);
    }

    #[test]
    fn test_every_style_clears_first() {
        let magnitudes = [10u8, 200, 0, 128];
        for style in Style::ALL {
            let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
            render_frame(&mut canvas, &magnitudes, &params(style));

            let first_fill = canvas
                .calls
                .iter()
                .position(|c| matches!(c, DrawCall::FillRect { .. } | DrawCall::FillCircle { .. }))
                .unwrap();
            assert_eq!(
                canvas.calls[first_fill],
                DrawCall::FillRect { x: 0.0, y: 0.0, width: WIDTH, height: HEIGHT }
            );
            assert_eq!(canvas.calls[first_fill - 1], DrawCall::FillStyle(background_color(280.0)));
        }
    }

    #[test]
    fn test_previous_frame_pixels_are_cleared() {
        let mut canvas = PixelCanvas::new(WIDTH as u32, HEIGHT as u32).unwrap();
        let full = vec![255u8; 256];
        render_frame(&mut canvas, &full, &VisualParams { hue: 0.0, ..params(Style::Bars) });

        let bar_pixel = canvas.pixel(10, 50);
        let [r, g, b] = band_color(0.0, 1.0).to_rgb();
        assert_eq!(bar_pixel, [r, g, b, 255]);

        let silent = vec![0u8; 256];
        render_frame(&mut canvas, &silent, &VisualParams { hue: 200.0, ..params(Style::Dots) });

        let [r, g, b] = background_color(200.0).to_rgb();
        assert_eq!(canvas.pixel(10, 50), [r, g, b, 255]);
        assert_eq!(canvas.pixel(400, 200), [r, g, b, 255]);
    }

    #[test]
    fn test_bars_geometry() {
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        let p = VisualParams { density: 8, ..params(Style::Bars) };
        render_frame(&mut canvas, &[0, 255, 51], &p);

        let rects = canvas.rects();
        assert_eq!(rects.len(), 4);
        assert_eq!(rects[1], (0.0, HEIGHT, 98.0, 0.0));
        assert_eq!(rects[2], (100.0, 0.0, 98.0, HEIGHT));
        let (x, y, _, h) = rects[3];
        assert_eq!(x, 200.0);
        assert!((y - 320.0).abs() < 1e-3);
        assert!((h - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_dots_geometry() {
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        let p = VisualParams { density: 10, ..params(Style::Dots) };
        render_frame(&mut canvas, &[255, 0], &p);

        assert_eq!(canvas.circles(), vec![(0.0, 0.0, DOT_RADIUS), (80.0, HEIGHT, DOT_RADIUS)]);
        assert_eq!(canvas.rects().len(), 1);
    }

    #[test]
    fn test_grid_wraps_into_canvas() {
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        let p = VisualParams { density: 5, ..params(Style::Grid) };
        let magnitudes = vec![0u8; 8];
        render_frame(&mut canvas, &magnitudes, &p);

        for (x, y, w, h) in canvas.rects().into_iter().skip(1) {
            assert!(x >= 0.0 && x < WIDTH);
            assert!(y >= 0.0 && y < HEIGHT);
            assert_eq!((w, h), (GRID_PIXEL, GRID_PIXEL));
        }
        // Band 5 starts at 800, which wraps back to the left edge.
        assert_eq!(canvas.rects()[6].0, 0.0);
    }

    #[test]
    fn test_loop_bound_is_array_length_not_density() {
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        let p = VisualParams { density: 5, ..params(Style::Bars) };
        render_frame(&mut canvas, &[100u8; 12], &p);
        assert_eq!(canvas.rects().len(), 1 + 12);

        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        let p = VisualParams { density: 64, ..params(Style::Bars) };
        render_frame(&mut canvas, &[100u8; 3], &p);
        assert_eq!(canvas.rects().len(), 1 + 3);
    }

    #[test]
    fn test_empty_array_paints_background_only() {
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        render_frame(&mut canvas, &[], &VisualParams::default());
        assert_eq!(canvas.rects(), vec![(0.0, 0.0, WIDTH, HEIGHT)]);
        assert!(canvas.circles().is_empty());
    }

    #[test]
    fn test_glow_and_hue_applied_on_next_frame() {
        let mut p = VisualParams::default();
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        render_frame(&mut canvas, &[255], &p);

        p.hue = 30.0;
        p.glow = 42.0;
        let mut canvas = RecordingCanvas::new(WIDTH, HEIGHT);
        render_frame(&mut canvas, &[255], &p);

        let fills = canvas.fill_styles();
        assert_eq!(fills[0], background_color(30.0));
        assert_eq!(fills[1], Hsl::new(30.0, 100.0, 80.0));
        assert!(canvas.calls.contains(&DrawCall::ShadowBlur(42.0)));
        assert!(canvas.calls.contains(&DrawCall::ShadowColor(glow_color(30.0))));
    }

    #[test]
    fn test_brightness_scales_with_magnitude() {
        assert_eq!(band_color(0.0, 0.0).lightness, 30.0);
        assert_eq!(band_color(0.0, 1.0).lightness, 80.0);
        assert!(band_color(0.0, 0.5).lightness > band_color(0.0, 0.25).lightness);
    }
}
