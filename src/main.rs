use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, warn};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowBuilder},
};

mod config;
mod engine;
mod input;
mod lighting;
mod rendering;

use config::Args;
use engine::Engine;
use input::{InputState, KeyOutcome};

struct App {
    engine: Engine,
    input_state: InputState,
    last_frame_time: Instant,
    fps_counter: FpsCounter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let event_loop = EventLoop::new().context("Failed to create event loop")?;

    let title = format!("Skybox Demos - {}", args.demo.name());
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(&title)
            .with_inner_size(winit::dpi::PhysicalSize::new(args.width, args.height))
            .build(&event_loop)
            .context("Failed to create window")?,
    ));
    let window_id = window.id();

    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    {
        warn!("Could not grab cursor: {err}");
    }
    window.set_cursor_visible(false);

    let engine = pollster::block_on(Engine::new(window, &args))?;

    let mut app = App {
        engine,
        input_state: InputState::default(),
        last_frame_time: Instant::now(),
        fps_counter: FpsCounter::new(),
    };

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id: event_window_id,
            } if event_window_id == window_id => match event {
                WindowEvent::CloseRequested => {
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    app.engine.resize(*physical_size);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    app.engine.resize(window.inner_size());
                }
                WindowEvent::KeyboardInput {
                    event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(keycode),
                        ..
                    },
                    ..
                } => {
                    let pressed = state == &ElementState::Pressed;
                    if app.input_state.handle_key(*keycode, pressed) == KeyOutcome::Exit {
                        elwt.exit();
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => match delta {
                    MouseScrollDelta::LineDelta(_, y) => app.input_state.add_scroll(*y),
                    MouseScrollDelta::PixelDelta(position) => {
                        app.input_state.add_scroll_pixels(position.y as f32)
                    }
                },
                _ => {}
            },

            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta, .. },
                ..
            } => {
                app.input_state.add_mouse_delta(delta.0 as f32, delta.1 as f32);
            }

            Event::AboutToWait => {
                let now = Instant::now();
                let dt = now.duration_since(app.last_frame_time).as_secs_f32();
                app.last_frame_time = now;

                if let Some(fps) = app.fps_counter.update(dt) {
                    window.set_title(&format!("{title} - FPS: {fps}"));
                    let camera = app.engine.camera();
                    debug!(
                        "{fps} fps, position {:?}, yaw {:.1}, pitch {:.1}, zoom {:.1}",
                        camera.position(),
                        camera.yaw(),
                        camera.pitch(),
                        camera.zoom()
                    );
                }

                app.engine.update(dt, &app.input_state);
                if let Err(err) = app.engine.render() {
                    error!("{err:#}");
                    elwt.exit();
                }

                app.input_state.end_frame();
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

struct FpsCounter {
    frame_count: u32,
    elapsed_time: f32,
    update_interval: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frame_count: 0,
            elapsed_time: 0.0,
            update_interval: 1.0,
        }
    }

    fn update(&mut self, dt: f32) -> Option<u32> {
        self.frame_count += 1;
        self.elapsed_time += dt;

        if self.elapsed_time >= self.update_interval {
            let fps = (self.frame_count as f32 / self.elapsed_time).round() as u32;
            self.frame_count = 0;
            self.elapsed_time = 0.0;
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_reported_once_per_interval() {
        let mut counter = FpsCounter::new();
        for _ in 0..59 {
            assert_eq!(counter.update(1.0 / 60.0), None);
        }
        assert_eq!(counter.update(1.0 / 60.0 + 1e-4), Some(60));
        assert_eq!(counter.update(1.0 / 60.0), None);
    }
}
