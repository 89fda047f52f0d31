use std::sync::Arc;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::config::SceneSettings;
use crate::lighting::LightUniform;
use crate::rendering::resources::{
    create_depth_texture, cube_mesh, skybox_mesh, GpuMesh, Vertex, DEPTH_FORMAT,
};
use crate::rendering::shaders::{
    get_lamp_shader, get_lit_shader, get_skybox_shader, get_textured_shader,
};
use crate::rendering::texture::{repeat_sampler, Fallback, Texture, TextureKind};

// Render Context holds common rendering resources
pub struct RenderContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface_format: wgpu::TextureFormat,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderContext {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        camera_bind_group_layout: wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            camera_bind_group_layout,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

// Per-object transform buffer and its bind group
struct ModelBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ModelBinding {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, model: Mat4) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Model Buffer")),
            contents: bytemuck::cast_slice(&[ModelUniform::new(model)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Model Bind Group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[ModelUniform::new(model)]));
    }
}

// What gets drawn on top of the skybox
enum SceneMaterial {
    Textured {
        pipeline: wgpu::RenderPipeline,
        bind_group: wgpu::BindGroup,
        _diffuse: Texture,
    },
    Lit {
        pipeline: wgpu::RenderPipeline,
        bind_group: wgpu::BindGroup,
        light_buffer: wgpu::Buffer,
        lamp_pipeline: wgpu::RenderPipeline,
        lamp_model: ModelBinding,
        _maps: [Texture; 3],
    },
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

struct MeshPipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    cull_mode: Option<wgpu::Face>,
    depth_write_enabled: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    desc: MeshPipelineDesc,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{} Pipeline Layout", desc.label)),
        bind_group_layouts: desc.bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{} Pipeline", desc.label)),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write_enabled,
            depth_compare: desc.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

// Main rendering system
pub struct RenderingSystem {
    skybox_pipeline: wgpu::RenderPipeline,
    skybox_mesh: GpuMesh,
    skybox_bind_group: wgpu::BindGroup,
    _skybox_texture: Texture,

    cube_mesh: GpuMesh,
    cube_model: ModelBinding,
    material: SceneMaterial,

    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,

    context: RenderContext,
}

impl RenderingSystem {
    pub fn new(context: RenderContext, scene: &SceneSettings, width: u32, height: u32) -> Result<Self> {
        let device = &context.device;
        let queue = &context.queue;
        let format = context.surface_format;
        let sampler = repeat_sampler(device, "Material Sampler");

        // Skybox
        let skybox_texture = Texture::cubemap_from_paths(device, queue, &scene.skybox_faces)?;
        let skybox_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Bind Group Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                sampler_entry(1),
            ],
        });
        let skybox_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &skybox_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&skybox_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let skybox_shader = get_skybox_shader(device);
        // Drawn first with depth writes off, so the cube always covers it
        let skybox_pipeline = create_mesh_pipeline(device, format, MeshPipelineDesc {
            label: "Skybox",
            shader: &skybox_shader,
            bind_group_layouts: &[&context.camera_bind_group_layout, &skybox_layout],
            cull_mode: None,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
        });

        // Cube transform
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let cube_model = ModelBinding::new(
            device,
            &model_layout,
            "Cube",
            Mat4::from_translation(scene.cube_offset),
        );

        let material = match &scene.lit {
            None => {
                let diffuse = Texture::from_path(
                    device,
                    queue,
                    &scene.diffuse,
                    TextureKind::Color,
                    Fallback::Checker,
                );
                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Textured Bind Group Layout"),
                    entries: &[
                        texture_entry(0, wgpu::TextureViewDimension::D2),
                        sampler_entry(1),
                    ],
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Textured Bind Group"),
                    layout: &layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&diffuse.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });
                let shader = get_textured_shader(device);
                let pipeline = create_mesh_pipeline(device, format, MeshPipelineDesc {
                    label: "Textured",
                    shader: &shader,
                    bind_group_layouts: &[&context.camera_bind_group_layout, &model_layout, &layout],
                    cull_mode: Some(wgpu::Face::Back),
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                });

                SceneMaterial::Textured {
                    pipeline,
                    bind_group,
                    _diffuse: diffuse,
                }
            }
            Some(lit) => {
                let maps = [
                    Texture::from_path(device, queue, &scene.diffuse, TextureKind::Color, Fallback::Checker),
                    Texture::from_path(device, queue, &lit.specular, TextureKind::Data, Fallback::Grey),
                    Texture::from_path(device, queue, &lit.normal, TextureKind::Data, Fallback::FlatNormal),
                ];
                let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Light Buffer"),
                    size: std::mem::size_of::<LightUniform>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Lit Bind Group Layout"),
                    entries: &[
                        texture_entry(0, wgpu::TextureViewDimension::D2),
                        texture_entry(1, wgpu::TextureViewDimension::D2),
                        texture_entry(2, wgpu::TextureViewDimension::D2),
                        sampler_entry(3),
                        uniform_entry(4, wgpu::ShaderStages::FRAGMENT),
                    ],
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Lit Bind Group"),
                    layout: &layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&maps[0].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&maps[1].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&maps[2].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: light_buffer.as_entire_binding(),
                        },
                    ],
                });

                let shader = get_lit_shader(device);
                let pipeline = create_mesh_pipeline(device, format, MeshPipelineDesc {
                    label: "Lit",
                    shader: &shader,
                    bind_group_layouts: &[&context.camera_bind_group_layout, &model_layout, &layout],
                    cull_mode: Some(wgpu::Face::Back),
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                });

                let lamp_shader = get_lamp_shader(device);
                let lamp_pipeline = create_mesh_pipeline(device, format, MeshPipelineDesc {
                    label: "Lamp",
                    shader: &lamp_shader,
                    bind_group_layouts: &[&context.camera_bind_group_layout, &model_layout],
                    cull_mode: Some(wgpu::Face::Back),
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                });
                let lamp_model = ModelBinding::new(device, &model_layout, "Lamp", Mat4::IDENTITY);

                SceneMaterial::Lit {
                    pipeline,
                    bind_group,
                    light_buffer,
                    lamp_pipeline,
                    lamp_model,
                    _maps: maps,
                }
            }
        };

        let cube_mesh = GpuMesh::upload(device, "Cube", &cube_mesh(scene.cube_half_extent));
        let skybox_mesh = GpuMesh::upload(device, "Skybox", &skybox_mesh());
        let depth_texture = create_depth_texture(device, width, height);
        let clear_color = wgpu::Color {
            r: scene.clear_color,
            g: scene.clear_color,
            b: scene.clear_color,
            a: 1.0,
        };

        Ok(Self {
            skybox_pipeline,
            skybox_mesh,
            skybox_bind_group,
            _skybox_texture: skybox_texture,
            cube_mesh,
            cube_model,
            material,
            depth_texture,
            clear_color,
            context,
        })
    }

    // Update the depth texture when window is resized
    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(&self.context.device, width, height);
    }

    /// Uploads light parameters and the lamp transform. No-op for the textured demo.
    pub fn update_lighting(&self, lights: &LightUniform, lamp_model: Mat4) {
        if let SceneMaterial::Lit { light_buffer, lamp_model: lamp, .. } = &self.material {
            self.context
                .queue
                .write_buffer(light_buffer, 0, bytemuck::cast_slice(&[*lights]));
            lamp.write(&self.context.queue, lamp_model);
        }
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, camera_bind_group, &[]);

        render_pass.set_pipeline(&self.skybox_pipeline);
        render_pass.set_bind_group(1, &self.skybox_bind_group, &[]);
        self.skybox_mesh.draw(&mut render_pass);

        match &self.material {
            SceneMaterial::Textured { pipeline, bind_group, .. } => {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &self.cube_model.bind_group, &[]);
                render_pass.set_bind_group(2, bind_group, &[]);
                self.cube_mesh.draw(&mut render_pass);
            }
            SceneMaterial::Lit {
                pipeline,
                bind_group,
                lamp_pipeline,
                lamp_model,
                ..
            } => {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &self.cube_model.bind_group, &[]);
                render_pass.set_bind_group(2, bind_group, &[]);
                self.cube_mesh.draw(&mut render_pass);

                render_pass.set_pipeline(lamp_pipeline);
                render_pass.set_bind_group(1, &lamp_model.bind_group, &[]);
                self.cube_mesh.draw(&mut render_pass);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn model_uniform_is_column_major() {
        let uniform = ModelUniform::new(Mat4::from_translation(Vec3::new(-0.4, 0.4, -0.4)));
        assert_eq!(uniform.model[3], [-0.4, 0.4, -0.4, 1.0]);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }
}
