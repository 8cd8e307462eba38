use anyhow::Result;
use egui_wgpu::Renderer;
use egui_winit::State;
use wgpu::{CommandBuffer, CommandEncoder, Device, Queue, TextureView};
use winit::{event::WindowEvent, window::Window};

use crate::graphics::GraphicsEngine;
use crate::params::{
    Style, VisualParams, DENSITY_RANGE, GLOW_RANGE, HUE_RANGE, SPEED_RANGE, SPEED_STEP,
};
use crate::render::Hsl;

const HUE_PICKER_SEGMENTS: usize = 36;

/// Requests the control panel raises for the application to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Play,
}

/// The egui control panel drawn over the canvas.
pub struct UserInterface {
    context: egui::Context,
    state: State,
    renderer: Renderer,
    show_controls: bool,
}

impl UserInterface {
    pub fn new(window: &Window, graphics_engine: &GraphicsEngine) -> Self {
        let context = egui::Context::default();

        let egui_state = State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );

        let renderer = Renderer::new(
            &graphics_engine.device,
            graphics_engine.config.format,
            None,
            1,
        );

        Self {
            context,
            state: egui_state,
            renderer,
            show_controls: true,
        }
    }

    /// Feed a window event to egui. Returns true if egui consumed it.
    pub fn handle_event(&mut self, event: &WindowEvent, window: &Window) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        device: &Device,
        queue: &Queue,
        window: &Window,
        params: &mut VisualParams,
        is_playing: bool,
    ) -> Result<(Vec<CommandBuffer>, Option<UiAction>)> {
        let raw_input = self.state.take_egui_input(window);

        let show_controls = &mut self.show_controls;
        let mut action = None;

        let full_output = self.context.run(raw_input, |ctx| {
            action = Self::ui_content(ctx, show_controls, params, is_playing);
        });

        self.state.handle_platform_output(window, full_output.platform_output);

        let tris = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let command_buffers =
            self.renderer
                .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        Ok((command_buffers, action))
    }

    fn ui_content(
        ctx: &egui::Context,
        show_controls: &mut bool,
        params: &mut VisualParams,
        is_playing: bool,
    ) -> Option<UiAction> {
        if ctx.input(|i| i.key_pressed(egui::Key::F1)) {
            *show_controls = !*show_controls;
        }

        if !*show_controls {
            return None;
        }

        let mut action = None;

        egui::Window::new("Lo-Fi Visualiser")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("controls").num_columns(2).show(ui, |ui| {
                    ui.label("Speed");
                    ui.add(egui::Slider::new(&mut params.speed, SPEED_RANGE).step_by(SPEED_STEP));
                    ui.end_row();

                    ui.label("Density");
                    ui.add(egui::Slider::new(&mut params.density, DENSITY_RANGE).step_by(1.0));
                    ui.end_row();

                    ui.label("Glow");
                    ui.add(egui::Slider::new(&mut params.glow, GLOW_RANGE).step_by(1.0));
                    ui.end_row();

                    ui.label("Style");
                    egui::ComboBox::from_id_source("style")
                        .selected_text(params.style.label())
                        .show_ui(ui, |ui| {
                            for style in Style::ALL {
                                ui.selectable_value(&mut params.style, style, style.label());
                            }
                        });
                    ui.end_row();

                    ui.label("Hue");
                    hue_picker(ui, &mut params.hue);
                    ui.end_row();
                });

                ui.add_space(10.0);

                let label = if is_playing { "Playing" } else { "Play" };
                if ui.add_enabled(!is_playing, egui::Button::new(label)).clicked() {
                    action = Some(UiAction::Play);
                }

                ui.separator();
                ui.label("F1 toggles controls, ESC exits");
            });

        action
    }
}

/// Hue for a pointer at `x` over a strip starting at `left` that is `width` wide.
pub fn hue_at(left: f32, width: f32, x: f32) -> f32 {
    if width <= 0.0 {
        return *HUE_RANGE.start();
    }
    let t = ((x - left) / width).clamp(0.0, 1.0);
    HUE_RANGE.start() + t * (HUE_RANGE.end() - HUE_RANGE.start())
}

fn hue_color(hue: f32) -> egui::Color32 {
    let [r, g, b] = Hsl::new(hue, 100.0, 50.0).to_rgb();
    egui::Color32::from_rgb(r, g, b)
}

/// Horizontal rainbow strip; click or drag to pick a hue.
fn hue_picker(ui: &mut egui::Ui, hue: &mut f32) -> egui::Response {
    let desired = egui::vec2(ui.spacing().slider_width, ui.spacing().interact_size.y);
    let (rect, mut response) = ui.allocate_exact_size(desired, egui::Sense::click_and_drag());

    if let Some(pos) = response.interact_pointer_pos() {
        let picked = hue_at(rect.left(), rect.width(), pos.x);
        if picked != *hue {
            *hue = picked;
            response.mark_changed();
        }
    }

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let segment = rect.width() / HUE_PICKER_SEGMENTS as f32;
        for i in 0..HUE_PICKER_SEGMENTS {
            let left = rect.left() + i as f32 * segment;
            let segment_rect = egui::Rect::from_min_max(
                egui::pos2(left, rect.top()),
                egui::pos2(left + segment + 0.5, rect.bottom()),
            );
            let mid = hue_at(rect.left(), rect.width(), left + segment / 2.0);
            painter.rect_filled(segment_rect, 0.0, hue_color(mid));
        }

        let span = HUE_RANGE.end() - HUE_RANGE.start();
        let marker_x = rect.left() + (*hue - HUE_RANGE.start()) / span * rect.width();
        painter.vline(marker_x, rect.y_range(), egui::Stroke::new(2.0, egui::Color32::WHITE));
    }

    response.on_hover_text(format!("{:.0}°", hue))
}
