use anyhow::Result;
use clap::Parser;
use log::{debug, error, info};
use std::sync::Arc;
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use lofi_visualiser::audio::{AudioPlayback, AudioSource};
use lofi_visualiser::cli::Args;
use lofi_visualiser::control::PlaybackControl;
use lofi_visualiser::graphics::GraphicsEngine;
use lofi_visualiser::render::{render_frame, FrameLoop, PixelCanvas, Tick};
use lofi_visualiser::ui::{UiAction, UserInterface};

const STATS_INTERVAL_FRAMES: u64 = 600;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    info!("Starting Lo-Fi Visualiser");

    let mut params = args.visual_params()?;
    info!("Initial parameters: {:?}", params);

    let mut audio = AudioPlayback::new(&args.audio, args.fft_size)?;
    info!("Audio asset: {:?}, {} bands", audio.path(), args.fft_size / 2);

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Lo-Fi Visualiser")
            .with_inner_size(winit::dpi::LogicalSize::new(args.width, args.height))
            .build(&event_loop)?,
    );

    let mut engine = pollster::block_on(GraphicsEngine::new(Arc::clone(&window), args.width, args.height))?;
    let mut ui = UserInterface::new(&window, &engine);
    let mut canvas = PixelCanvas::new(args.width, args.height)?;
    let mut control = PlaybackControl::new();
    let frame_loop = FrameLoop::new();

    info!("Visualiser initialized, press Play to start the track");
    window.request_redraw();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => {
            ui.handle_event(&event, &window);

            match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested");
                    frame_loop.cancel();
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                        && event.state == ElementState::Pressed
                    {
                        info!("Escape pressed");
                        frame_loop.cancel();
                        elwt.exit();
                    }
                }
                WindowEvent::Resized(physical_size) => {
                    engine.resize(physical_size);
                }
                WindowEvent::RedrawRequested => {
                    let mut play_requested = false;

                    let tick = frame_loop.tick(|| {
                        render_frame(&mut canvas, audio.frequency_data(), &params);

                        let is_playing = control.is_playing();
                        let result = engine.render(&canvas, |encoder, view, device, queue| {
                            let (buffers, action) = ui.render(
                                encoder,
                                view,
                                device,
                                queue,
                                &window,
                                &mut params,
                                is_playing,
                            )?;
                            play_requested = action == Some(UiAction::Play);
                            Ok(buffers)
                        });

                        if let Err(e) = result {
                            error!("Render error: {:#}", e);
                        }
                    });

                    if play_requested {
                        match control.activate(&mut audio) {
                            Ok(true) => info!("Playing {:?}", audio.path()),
                            Ok(false) => {}
                            Err(e) => error!("Failed to start playback: {:#}", e),
                        }
                    }

                    if tick == Tick::Scheduled {
                        let frames = frame_loop.frames_rendered();
                        if frames % STATS_INTERVAL_FRAMES == 0 {
                            debug!(
                                "Rendered {} frames, playing: {}, params: {:?}",
                                frames,
                                audio.is_playing(),
                                params
                            );
                        }
                        window.request_redraw();
                    }
                }
                _ => {}
            }
        }
        Event::LoopExiting => {
            frame_loop.cancel();
            info!("Render loop stopped after {} frames", frame_loop.frames_rendered());
        }
        _ => {}
    })?;

    Ok(())
}
