use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::input::ShadingFlags;

pub const ORBIT_RADIUS: f32 = 0.2;
pub const ORBIT_HEIGHT: f32 = 0.1;
pub const ORBIT_START_DEGREES: f32 = 45.0;
/// Clockwise when seen from above.
pub const ORBIT_DEGREES_PER_SECOND: f32 = -42.0;
pub const LAMP_SCALE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::splat(0.1),
            ambient: Vec3::splat(0.5),
            diffuse: Vec3::splat(2.0),
            specular: Vec3::splat(1.0),
            constant: 1.0,
            linear: 0.0,
            quadratic: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::splat(0.5),
            ambient: Vec3::splat(0.3),
            diffuse: Vec3::splat(0.2),
            specular: Vec3::ZERO,
        }
    }
}

/// Point light circling the origin in the XZ plane.
#[derive(Debug, Clone)]
pub struct OrbitingLight {
    pub light: PointLight,
    theta: f32,
}

impl OrbitingLight {
    pub fn new(light: PointLight) -> Self {
        let mut orbit = Self {
            light,
            theta: ORBIT_START_DEGREES,
        };
        orbit.advance(0.0);
        orbit
    }

    pub fn advance(&mut self, dt: f32) {
        self.theta = (self.theta + ORBIT_DEGREES_PER_SECOND * dt).rem_euclid(360.0);
        let theta = self.theta.to_radians();
        self.light.position = Vec3::new(
            ORBIT_RADIUS * theta.cos(),
            ORBIT_HEIGHT,
            ORBIT_RADIUS * theta.sin(),
        );
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn position(&self) -> Vec3 {
        self.light.position
    }

    pub fn lamp_model(&self) -> Mat4 {
        Mat4::from_translation(self.light.position) * Mat4::from_scale(Vec3::splat(LAMP_SCALE))
    }
}

impl Default for OrbitingLight {
    fn default() -> Self {
        Self::new(PointLight::default())
    }
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

// Every field is a vec4 so the layout matches WGSL uniform alignment
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightUniform {
    pub point_position: [f32; 4],
    pub point_ambient: [f32; 4],
    pub point_diffuse: [f32; 4],
    pub point_specular: [f32; 4],
    /// constant, linear, quadratic, unused
    pub point_attenuation: [f32; 4],
    pub dir_direction: [f32; 4],
    pub dir_ambient: [f32; 4],
    pub dir_diffuse: [f32; 4],
    pub dir_specular: [f32; 4],
    pub view_position: [f32; 4],
    /// blinn, directional only, shininess, unused
    pub params: [f32; 4],
}

impl LightUniform {
    pub fn new(
        point: &PointLight,
        directional: &DirectionalLight,
        view_position: Vec3,
        shading: ShadingFlags,
        shininess: f32,
    ) -> Self {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        Self {
            point_position: vec4(point.position, 1.0),
            point_ambient: vec4(point.ambient, 0.0),
            point_diffuse: vec4(point.diffuse, 0.0),
            point_specular: vec4(point.specular, 0.0),
            point_attenuation: [point.constant, point.linear, point.quadratic, 0.0],
            dir_direction: vec4(directional.direction, 0.0),
            dir_ambient: vec4(directional.ambient, 0.0),
            dir_diffuse: vec4(directional.diffuse, 0.0),
            dir_specular: vec4(directional.specular, 0.0),
            view_position: vec4(view_position, 1.0),
            params: [
                flag(shading.blinn),
                flag(shading.directional_only),
                shininess,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn orbit_starts_at_forty_five_degrees() {
        let orbit = OrbitingLight::default();
        let expected = ORBIT_RADIUS * 45.0_f32.to_radians().cos();
        assert!(orbit.position().abs_diff_eq(Vec3::new(expected, ORBIT_HEIGHT, expected), EPSILON));
    }

    #[test]
    fn orbit_keeps_radius_and_height() {
        let mut orbit = OrbitingLight::default();
        for _ in 0..500 {
            orbit.advance(1.0 / 60.0);
            let p = orbit.position();
            assert!((p.x.hypot(p.z) - ORBIT_RADIUS).abs() < EPSILON);
            assert_eq!(p.y, ORBIT_HEIGHT);
            assert!((0.0..360.0).contains(&orbit.theta()));
        }
    }

    #[test]
    fn orbit_speed_matches_frame_step_at_sixty_hz() {
        let mut orbit = OrbitingLight::default();
        orbit.advance(1.0 / 60.0);
        assert!((orbit.theta() - (45.0 - 0.7)).abs() < 1e-3);
    }

    #[test]
    fn lamp_model_scales_and_translates() {
        let orbit = OrbitingLight::default();
        let model = orbit.lamp_model();
        let corner = model.transform_point3(Vec3::ONE);
        assert!(corner.abs_diff_eq(orbit.position() + Vec3::splat(LAMP_SCALE), EPSILON));
    }

    #[test]
    fn uniform_packs_flags_and_attenuation() {
        let point = PointLight::default();
        let uniform = LightUniform::new(
            &point,
            &DirectionalLight::default(),
            Vec3::new(0.0, 0.0, 3.0),
            ShadingFlags { blinn: true, directional_only: false },
            5.0,
        );
        assert_eq!(uniform.params, [1.0, 0.0, 5.0, 0.0]);
        assert_eq!(uniform.point_attenuation, [1.0, 0.0, 3.0, 0.0]);
        assert_eq!(uniform.view_position, [0.0, 0.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<LightUniform>(), 11 * 16);
    }
}
