use std::path::Path;

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use log::{info, warn};

const FALLBACK_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

/// How texel values are interpreted by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// sRGB-encoded colour
    Color,
    /// Linear data, e.g. normal or specular maps
    Data,
}

impl TextureKind {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Image used when an asset is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Checker,
    FlatNormal,
    Grey,
    Sky,
}

impl Fallback {
    pub fn generate(self, face: u32, size: u32) -> RgbaImage {
        match self {
            Fallback::Checker => RgbaImage::from_fn(size, size, |x, y| {
                if (x / CHECKER_CELL + y / CHECKER_CELL) % 2 == 0 {
                    image::Rgba([200, 200, 200, 255])
                } else {
                    image::Rgba([90, 90, 90, 255])
                }
            }),
            Fallback::FlatNormal => {
                RgbaImage::from_pixel(size, size, image::Rgba([128, 128, 255, 255]))
            }
            Fallback::Grey => {
                RgbaImage::from_pixel(size, size, image::Rgba([128, 128, 128, 255]))
            }
            Fallback::Sky => sky_face(face, size),
        }
    }
}

// Top face light blue, bottom face dark, side faces a vertical gradient between them
fn sky_face(face: u32, size: u32) -> RgbaImage {
    let top = [120.0, 170.0, 235.0];
    let bottom = [30.0, 35.0, 45.0];

    RgbaImage::from_fn(size, size, |_, y| {
        let t = match face {
            2 => 0.0,
            3 => 1.0,
            _ => y as f32 / size.saturating_sub(1).max(1) as f32,
        };
        let channel = |i: usize| (top[i] + (bottom[i] - top[i]) * t) as u8;
        image::Rgba([channel(0), channel(1), channel(2), 255])
    })
}

pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load image {}", path.display()))?;
    Ok(image.to_rgba8())
}

fn try_load(path: &Path) -> Option<RgbaImage> {
    match load_rgba(path) {
        Ok(image) => {
            info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
            Some(image)
        }
        Err(err) => {
            warn!("{err:#}; using a generated texture");
            None
        }
    }
}

fn load_or_fallback(path: &Path, fallback: Fallback) -> RgbaImage {
    try_load(path).unwrap_or_else(|| fallback.generate(0, FALLBACK_SIZE))
}

/// Loads six cube faces. Missing faces are generated at the size of the
/// first face that did load, so a partial skybox still matches.
pub fn load_cube_faces(paths: &[impl AsRef<Path>; 6]) -> Vec<RgbaImage> {
    let loaded: Vec<Option<RgbaImage>> = paths.iter().map(|path| try_load(path.as_ref())).collect();
    let size = loaded
        .iter()
        .flatten()
        .next()
        .map_or(FALLBACK_SIZE, |image| image.width());

    (0u32..)
        .zip(loaded)
        .map(|(face, image)| image.unwrap_or_else(|| Fallback::Sky.generate(face, size)))
        .collect()
}

pub struct Texture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        kind: TextureKind,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: kind.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        write_layer(queue, &texture, image, 0);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }

    /// Loads a 2D texture, substituting `fallback` when the file can't be read.
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        kind: TextureKind,
        fallback: Fallback,
    ) -> Self {
        let image = load_or_fallback(path, fallback);
        Self::from_image(device, queue, &image, kind, &path.display().to_string())
    }

    /// Builds a cube texture from six faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn cubemap_from_paths(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &[impl AsRef<Path>; 6],
    ) -> Result<Self> {
        let faces = load_cube_faces(paths);
        let size = check_face_sizes(&faces)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Skybox Cubemap"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureKind::Color.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in (0u32..).zip(&faces) {
            write_layer(queue, &texture, face, layer);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Skybox Cubemap View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        Ok(Self { _texture: texture, view })
    }
}

/// All faces must be square and share one size.
pub fn check_face_sizes(faces: &[RgbaImage]) -> Result<u32> {
    let Some(first) = faces.first() else {
        bail!("Cubemap has no faces");
    };
    let (size, height) = first.dimensions();
    if size != height {
        bail!("Cubemap face 0 is not square ({size}x{height})");
    }

    for (index, face) in faces.iter().enumerate().skip(1) {
        if face.dimensions() != (size, size) {
            let (w, h) = face.dimensions();
            bail!("Cubemap face {index} is {w}x{h}, expected {size}x{size}");
        }
    }

    Ok(size)
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &RgbaImage, layer: u32) {
    let (width, height) = image.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Repeat addressing with linear filtering, used for every texture here.
pub fn repeat_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error_with_path() {
        let err = load_rgba(Path::new("does/not/exist.png")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.png"));
    }

    #[test]
    fn missing_file_falls_back() {
        let image = load_or_fallback(Path::new("does/not/exist.jpg"), Fallback::FlatNormal);
        assert_eq!(image.dimensions(), (FALLBACK_SIZE, FALLBACK_SIZE));
        assert_eq!(image.get_pixel(3, 3).0, [128, 128, 255, 255]);
    }

    #[test]
    fn checker_alternates_between_cells() {
        let image = Fallback::Checker.generate(0, FALLBACK_SIZE);
        assert_ne!(image.get_pixel(0, 0), image.get_pixel(CHECKER_CELL, 0));
        assert_eq!(image.get_pixel(0, 0), image.get_pixel(CHECKER_CELL, CHECKER_CELL));
    }

    #[test]
    fn sky_fallback_is_brighter_on_top() {
        let top = Fallback::Sky.generate(2, FALLBACK_SIZE);
        let bottom = Fallback::Sky.generate(3, FALLBACK_SIZE);
        assert!(top.get_pixel(0, 0).0[2] > bottom.get_pixel(0, 0).0[2]);

        let side = Fallback::Sky.generate(0, FALLBACK_SIZE);
        assert!(side.get_pixel(0, 0).0[2] > side.get_pixel(0, FALLBACK_SIZE - 1).0[2]);
    }

    #[test]
    fn face_sizes_must_match() {
        let square = RgbaImage::new(4, 4);
        assert_eq!(check_face_sizes(&vec![square.clone(); 6]).unwrap(), 4);

        let mut faces = vec![square; 6];
        faces[4] = RgbaImage::new(8, 8);
        let err = check_face_sizes(&faces).unwrap_err();
        assert!(err.to_string().contains("face 4"));

        assert!(check_face_sizes(&[RgbaImage::new(4, 2)]).is_err());
        assert!(check_face_sizes(&[]).is_err());
    }

    #[test]
    fn missing_cube_face_matches_loaded_faces() {
        let dir = std::env::temp_dir().join(format!("skybox_faces_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let names = ["right", "left", "top", "bottom", "front", "back"];
        let paths = names.map(|name| dir.join(format!("{name}.png")));
        for path in &paths[..5] {
            RgbaImage::from_pixel(16, 16, image::Rgba([10, 20, 30, 255]))
                .save(path)
                .unwrap();
        }

        let faces = load_cube_faces(&paths);
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(faces.len(), 6);
        assert_eq!(check_face_sizes(&faces).unwrap(), 16);
        assert_eq!(faces[0].get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(faces[5], Fallback::Sky.generate(5, 16));
    }

    #[test]
    fn all_cube_faces_missing_use_default_size() {
        let paths = ["a", "b", "c", "d", "e", "f"].map(|name| format!("does/not/{name}.png"));
        let faces = load_cube_faces(&paths);
        assert_eq!(check_face_sizes(&faces).unwrap(), FALLBACK_SIZE);
    }
}
