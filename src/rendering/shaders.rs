// WGSL sources for the two demos. Bind group 0 is always the camera.

const SKYBOX_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    sky_view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var skybox_texture: texture_cube<f32>;
@group(1) @binding(1)
var skybox_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let clip = camera.sky_view_proj * vec4<f32>(vertex.position, 1.0);
    // Pin the skybox to the far plane
    out.clip_position = clip.xyww;
    out.direction = vertex.position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(skybox_texture, skybox_sampler, in.direction);
}
"#;

const TEXTURED_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    sky_view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct Model {
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> model_uniform: Model;

@group(2) @binding(0)
var diffuse_texture: texture_2d<f32>;
@group(2) @binding(1)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * model_uniform.model * vec4<f32>(vertex.position, 1.0);
    out.tex_coords = vertex.tex_coords;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(diffuse_texture, diffuse_sampler, in.tex_coords);
}
"#;

const LIT_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    sky_view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct Model {
    model: mat4x4<f32>,
};

struct Lights {
    point_position: vec4<f32>,
    point_ambient: vec4<f32>,
    point_diffuse: vec4<f32>,
    point_specular: vec4<f32>,
    // constant, linear, quadratic
    point_attenuation: vec4<f32>,
    dir_direction: vec4<f32>,
    dir_ambient: vec4<f32>,
    dir_diffuse: vec4<f32>,
    dir_specular: vec4<f32>,
    view_position: vec4<f32>,
    // blinn, directional only, shininess
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> model_uniform: Model;

@group(2) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(2) @binding(1)
var specular_map: texture_2d<f32>;
@group(2) @binding(2)
var normal_map: texture_2d<f32>;
@group(2) @binding(3)
var material_sampler: sampler;
@group(2) @binding(4)
var<uniform> lights: Lights;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
    @location(3) tangent: vec3<f32>,
    @location(4) bitangent: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
    @location(3) tangent: vec3<f32>,
    @location(4) bitangent: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = model_uniform.model * vec4<f32>(vertex.position, 1.0);
    let basis = mat3x3<f32>(model_uniform.model[0].xyz, model_uniform.model[1].xyz, model_uniform.model[2].xyz);

    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    out.normal = basis * vertex.normal;
    out.tangent = basis * vertex.tangent;
    out.bitangent = basis * vertex.bitangent;
    out.tex_coords = vertex.tex_coords;
    return out;
}

fn specular_strength(normal: vec3<f32>, light_dir: vec3<f32>, view_dir: vec3<f32>) -> f32 {
    let shininess = lights.params.z;
    if (lights.params.x > 0.5) {
        let halfway = normalize(light_dir + view_dir);
        return pow(max(dot(normal, halfway), 0.0), shininess);
    }
    let reflected = reflect(-light_dir, normal);
    return pow(max(dot(view_dir, reflected), 0.0), shininess);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, material_sampler, in.tex_coords).rgb;
    let specular_mask = textureSample(specular_map, material_sampler, in.tex_coords).rgb;
    let encoded_normal = textureSample(normal_map, material_sampler, in.tex_coords).rgb;

    let tbn = mat3x3<f32>(normalize(in.tangent), normalize(in.bitangent), normalize(in.normal));
    let normal = normalize(tbn * (encoded_normal * 2.0 - 1.0));
    let view_dir = normalize(lights.view_position.xyz - in.world_position);

    // Directional light, `dir_direction` points towards the light
    let dir_light = normalize(lights.dir_direction.xyz);
    var color = lights.dir_ambient.rgb * albedo
        + lights.dir_diffuse.rgb * max(dot(normal, dir_light), 0.0) * albedo
        + lights.dir_specular.rgb * specular_strength(normal, dir_light, view_dir) * specular_mask;

    if (lights.params.y < 0.5) {
        let to_light = lights.point_position.xyz - in.world_position;
        let dist = length(to_light);
        let point_light = to_light / dist;
        let k = lights.point_attenuation.xyz;
        let attenuation = 1.0 / (k.x + k.y * dist + k.z * dist * dist);

        let ambient = lights.point_ambient.rgb * albedo;
        let diffuse = lights.point_diffuse.rgb * max(dot(normal, point_light), 0.0) * albedo;
        let specular = lights.point_specular.rgb * specular_strength(normal, point_light, view_dir) * specular_mask;
        color += (ambient + diffuse + specular) * attenuation;
    }

    return vec4<f32>(color, 1.0);
}
"#;

const LAMP_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    sky_view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct Model {
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> model_uniform: Model;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return camera.view_proj * model_uniform.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

fn create_shader(device: &wgpu::Device, label: &str, source: &'static str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

pub fn get_skybox_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    create_shader(device, "Skybox Shader", SKYBOX_SHADER)
}

pub fn get_textured_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    create_shader(device, "Textured Shader", TEXTURED_SHADER)
}

pub fn get_lit_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    create_shader(device, "Lit Shader", LIT_SHADER)
}

pub fn get_lamp_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    create_shader(device, "Lamp Shader", LAMP_SHADER)
}
