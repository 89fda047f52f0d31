use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Textured cube inside a skybox
    Textured,
    /// Normal-mapped cube lit by an orbiting point light
    Lit,
}

impl Demo {
    pub fn name(self) -> &'static str {
        match self {
            Demo::Textured => "textured",
            Demo::Lit => "lit",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "skybox_demos", about = "Free-fly camera demos rendered with wgpu")]
pub struct Args {
    /// Which scene to run
    #[arg(long, value_enum, default_value_t = Demo::Lit)]
    pub demo: Demo,

    /// Directory holding the `images/` folder
    #[arg(long, default_value = "resources")]
    pub assets: PathBuf,

    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Enable debug logging when RUST_LOG is not set
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Material maps for the lit cube.
#[derive(Debug, Clone, PartialEq)]
pub struct LitMaterial {
    pub specular: PathBuf,
    pub normal: PathBuf,
    pub shininess: f32,
}

/// Per-demo scene constants.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub clear_color: f64,
    pub cube_half_extent: f32,
    pub cube_offset: Vec3,
    pub near: f32,
    pub far: f32,
    pub diffuse: PathBuf,
    pub lit: Option<LitMaterial>,
    pub skybox_faces: [PathBuf; 6],
}

// Cubemap layer order: +X, -X, +Y, -Y, +Z, -Z
const SKYBOX_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

impl SceneSettings {
    pub fn for_demo(demo: Demo, assets: &Path) -> Self {
        let images = assets.join("images");
        let faces = |ext: &str| SKYBOX_FACES.map(|face| images.join(format!("{face}.{ext}")));

        match demo {
            Demo::Textured => Self {
                clear_color: 0.05,
                cube_half_extent: 0.05,
                cube_offset: Vec3::new(-0.1, 0.1, -0.7),
                near: 0.1,
                far: 1000.0,
                diffuse: images.join("image2.jpg"),
                lit: None,
                skybox_faces: faces("jpg"),
            },
            Demo::Lit => Self {
                clear_color: 0.1,
                cube_half_extent: 0.2,
                cube_offset: Vec3::new(-0.4, 0.4, -0.4),
                near: 0.1,
                far: 100.0,
                diffuse: images.join("ROCK035_2K_Color.jpg"),
                lit: Some(LitMaterial {
                    specular: images.join("ROCK035_2K_Displacement.jpg"),
                    normal: images.join("ROCK035_2K_Normal.jpg"),
                    shininess: 5.0,
                }),
                skybox_faces: faces("png"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_lit_demo() {
        let args = Args::parse_from(["skybox_demos"]);
        assert_eq!(args.demo, Demo::Lit);
        assert_eq!(args.assets, PathBuf::from("resources"));
        assert_eq!((args.width, args.height), (800, 600));
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn parses_demo_and_window_size() {
        let args = Args::parse_from([
            "skybox_demos", "--demo", "textured", "--width", "1024", "--height", "768", "-v",
        ]);
        assert_eq!(args.demo, Demo::Textured);
        assert_eq!((args.width, args.height), (1024, 768));
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn rejects_unknown_demo() {
        assert!(Args::try_parse_from(["skybox_demos", "--demo", "pbr"]).is_err());
    }

    #[test]
    fn textured_scene_uses_jpg_skybox_and_no_material() {
        let scene = SceneSettings::for_demo(Demo::Textured, Path::new("assets"));
        assert!(scene.lit.is_none());
        assert_eq!(scene.far, 1000.0);
        assert_eq!(scene.diffuse, Path::new("assets/images/image2.jpg"));
        assert_eq!(scene.skybox_faces[0], Path::new("assets/images/right.jpg"));
        assert_eq!(scene.skybox_faces[5], Path::new("assets/images/back.jpg"));
    }

    #[test]
    fn lit_scene_carries_material_maps() {
        let scene = SceneSettings::for_demo(Demo::Lit, Path::new("resources"));
        let material = scene.lit.expect("lit demo has a material");
        assert_eq!(material.shininess, 5.0);
        assert!(material.normal.ends_with("ROCK035_2K_Normal.jpg"));
        assert_eq!(scene.skybox_faces[2], Path::new("resources/images/top.png"));
        assert_eq!(scene.cube_offset, Vec3::new(-0.4, 0.4, -0.4));
    }
}
