pub mod canvas;
pub mod frame;
pub mod frame_loop;
pub mod pixel_canvas;

#[cfg(test)]
pub mod recording;

pub use canvas::{Canvas2d, Hsl};
pub use frame::render_frame;
pub use frame_loop::{CancellationToken, FrameLoop, Tick};
pub use pixel_canvas::PixelCanvas;
