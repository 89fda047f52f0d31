use wgpu::util::DeviceExt;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// (normal, tangent, bitangent) per face, with tangent x bitangent == normal
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),     // +X
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),     // -X
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),     // +Y
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),     // -Y
    (Vec3::Z, Vec3::X, Vec3::Y),         // +Z
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y), // -Z
];

// Corner signs along (tangent, bitangent) and their uvs; v points down the image
const FACE_CORNERS: [(f32, f32, [f32; 2]); 4] = [
    (-1.0, -1.0, [0.0, 1.0]),
    (1.0, -1.0, [1.0, 1.0]),
    (1.0, 1.0, [1.0, 0.0]),
    (-1.0, 1.0, [0.0, 0.0]),
];

const FACE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Axis-aligned cube centred on the origin, counter-clockwise when seen
/// from outside.
pub fn cube_mesh(half_extent: f32) -> MeshData {
    let mut mesh = MeshData::default();

    for (normal, tangent, bitangent) in CUBE_FACES {
        let base_index = mesh.vertices.len() as u32;

        for (s, t, uv) in FACE_CORNERS {
            let position = (normal + tangent * s + bitangent * t) * half_extent;
            mesh.vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                tex_coords: uv,
                tangent: tangent.to_array(),
                bitangent: bitangent.to_array(),
            });
        }

        mesh.indices.extend(FACE_INDICES.iter().map(|i| base_index + i));
    }

    mesh
}

/// Unit cube for the skybox. Drawn without culling, so the winding of
/// `cube_mesh` is reused as is.
pub fn skybox_mesh() -> MeshData {
    cube_mesh(1.0)
}

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// Create a depth texture for depth testing
pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    };

    let desc = wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    };

    let texture = device.create_texture(&desc);

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
