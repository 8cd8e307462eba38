pub mod engine;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use engine::GraphicsEngine;
pub use shader::create_canvas_pipeline;
pub use texture::CanvasTexture;
pub use vertex::{canvas_quad, letterbox_scale, Vertex, VertexBuffer};
