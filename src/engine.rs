use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::{Args, SceneSettings};
use crate::input::InputState;
use crate::lighting::{DirectionalLight, LightUniform, OrbitingLight};
use crate::rendering::pipeline::uniform_entry;
use crate::rendering::{Camera, CameraController, CameraUniform, RenderContext, RenderingSystem};

pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 3.0);

pub struct Engine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    window: &'static Window,

    camera: Camera,
    camera_controller: CameraController,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    scene: SceneSettings,
    orbiting_light: Option<OrbitingLight>,
    directional_light: DirectionalLight,
    rendering_system: RenderingSystem,
}

impl Engine {
    pub async fn new(window: &'static Window, args: &Args) -> Result<Self> {
        let size = window.inner_size();
        info!("Creating Engine with window size: {:?}", size);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find an appropriate adapter"))?;
        info!("Adapter: {:?}", adapter.get_info());

        let surface_caps = surface.get_capabilities(&adapter);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("Failed to create device")?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let Some(&first_format) = surface_caps.formats.first() else {
            bail!("Surface reports no supported formats");
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(first_format);
        info!("Selected surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let scene = SceneSettings::for_demo(args.demo, &args.assets);
        info!("Running {} demo with assets from {}", args.demo.name(), args.assets.display());

        let camera = Camera::new(CAMERA_START);
        let camera_controller = CameraController::default();
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, aspect_ratio(&config), scene.near, scene.far);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
                label: Some("camera_bind_group_layout"),
            },
        );

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let render_context = RenderContext::new(
            Arc::clone(&device),
            Arc::clone(&queue),
            surface_format,
            camera_bind_group_layout,
        );
        let rendering_system =
            RenderingSystem::new(render_context, &scene, config.width, config.height)
                .context("Failed to build the scene")?;

        let orbiting_light = scene.lit.is_some().then(OrbitingLight::default);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            window,
            camera,
            camera_controller,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            scene,
            orbiting_light,
            directional_light: DirectionalLight::default(),
            rendering_system,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            debug!("Ignoring resize to {:?}", new_size);
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.rendering_system.resize(new_size.width, new_size.height);
        debug!("Resized surface to {}x{}", new_size.width, new_size.height);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.camera_controller.update_camera(&mut self.camera, input, dt);
        self.camera_uniform.update_view_proj(
            &self.camera,
            aspect_ratio(&self.config),
            self.scene.near,
            self.scene.far,
        );
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        if let (Some(orbit), Some(material)) = (self.orbiting_light.as_mut(), self.scene.lit.as_ref()) {
            orbit.advance(dt);
            let lights = LightUniform::new(
                &orbit.light,
                &self.directional_light,
                self.camera.position(),
                input.shading(),
                material.shininess,
            );
            self.rendering_system.update_lighting(&lights, orbit.lamp_model());
        }
    }

    pub fn render(&mut self) -> Result<()> {
        // Minimized windows have no drawable surface
        if !is_drawable(self.window.inner_size()) {
            return Ok(());
        }
        let Some(output) = self.acquire_frame()? else {
            return Ok(());
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        self.rendering_system
            .render(&mut encoder, &view, &self.camera_bind_group);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        let err = match self.surface.get_current_texture() {
            Ok(output) => return Ok(Some(output)),
            Err(err) => err,
        };

        match surface_recovery(&err) {
            SurfaceRecovery::Fatal => bail!("Surface texture acquisition failed: {err}"),
            SurfaceRecovery::Skip => {
                warn!("Surface error ({err}), skipping frame");
                Ok(None)
            }
            SurfaceRecovery::Reconfigure => {
                info!("Surface {err}, reconfiguring");
                let size = self.window.inner_size();
                self.config.width = size.width.max(1);
                self.config.height = size.height.max(1);
                self.surface.configure(&self.device, &self.config);
                self.rendering_system.resize(self.config.width, self.config.height);

                match self.surface.get_current_texture() {
                    Ok(output) => Ok(Some(output)),
                    Err(err) if surface_recovery(&err) == SurfaceRecovery::Fatal => {
                        bail!("Surface texture acquisition failed after reconfigure: {err}")
                    }
                    Err(err) => {
                        warn!("Surface still unavailable after reconfigure ({err}), skipping frame");
                        Ok(None)
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    Skip,
    Fatal,
}

fn surface_recovery(err: &wgpu::SurfaceError) -> SurfaceRecovery {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceRecovery::Fatal,
        _ => SurfaceRecovery::Skip,
    }
}

fn is_drawable(size: winit::dpi::PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

fn aspect_ratio(config: &wgpu::SurfaceConfiguration) -> f32 {
    config.width as f32 / config.height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn only_out_of_memory_is_fatal() {
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Timeout), SurfaceRecovery::Skip);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Other), SurfaceRecovery::Skip);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::OutOfMemory), SurfaceRecovery::Fatal);
    }

    #[test]
    fn minimized_window_is_not_drawable() {
        assert!(!is_drawable(PhysicalSize::new(0, 0)));
        assert!(!is_drawable(PhysicalSize::new(800, 0)));
        assert!(is_drawable(PhysicalSize::new(800, 600)));
    }
}
