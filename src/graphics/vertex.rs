use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Scale factors that fit a `canvas_w`×`canvas_h` image inside the window
/// without distortion. Both are in `(0, 1]`.
pub fn letterbox_scale(window_w: u32, window_h: u32, canvas_w: u32, canvas_h: u32) -> (f32, f32) {
    if window_w == 0 || window_h == 0 || canvas_w == 0 || canvas_h == 0 {
        return (1.0, 1.0);
    }
    let window_aspect = window_w as f32 / window_h as f32;
    let canvas_aspect = canvas_w as f32 / canvas_h as f32;
    if window_aspect > canvas_aspect {
        (canvas_aspect / window_aspect, 1.0)
    } else {
        (1.0, window_aspect / canvas_aspect)
    }
}

/// Two triangles covering the centred letterboxed area, texture origin top-left.
pub fn canvas_quad(scale_x: f32, scale_y: f32) -> [Vertex; 6] {
    let (l, r, b, t) = (-scale_x, scale_x, -scale_y, scale_y);
    [
        Vertex { position: [l, b, 0.0], tex_coords: [0.0, 1.0] },
        Vertex { position: [r, b, 0.0], tex_coords: [1.0, 1.0] },
        Vertex { position: [r, t, 0.0], tex_coords: [1.0, 0.0] },
        Vertex { position: [l, b, 0.0], tex_coords: [0.0, 1.0] },
        Vertex { position: [r, t, 0.0], tex_coords: [1.0, 0.0] },
        Vertex { position: [l, t, 0.0], tex_coords: [0.0, 0.0] },
    ]
}

pub struct VertexBuffer {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl VertexBuffer {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Canvas Quad Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, vertices: &[Vertex]) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
    }
}
