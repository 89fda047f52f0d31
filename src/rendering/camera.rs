use glam::{Mat3, Mat4, Vec3};
use bytemuck::{Pod, Zeroable};

use crate::input::InputState;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 6.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.25;
pub const DEFAULT_ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-fly camera driven by yaw/pitch angles in degrees.
///
/// `front`, `right` and `up` are rebuilt from the angles after every
/// orientation change and always form an orthonormal basis.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_camera_vectors();
        camera
    }

    /// Right-handed look-at transform from `position` towards `position + front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection using `zoom` as the vertical field of view.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, near, far)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );

        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

// Applies one frame of input to a camera
pub struct CameraController {
    constrain_pitch: bool,
}

impl CameraController {
    pub fn new(constrain_pitch: bool) -> Self {
        Self { constrain_pitch }
    }

    pub fn update_camera(&mut self, camera: &mut Camera, input: &InputState, dt: f32) {
        if input.is_forward_pressed {
            camera.process_keyboard(CameraMovement::Forward, dt);
        }
        if input.is_backward_pressed {
            camera.process_keyboard(CameraMovement::Backward, dt);
        }
        if input.is_left_pressed {
            camera.process_keyboard(CameraMovement::Left, dt);
        }
        if input.is_right_pressed {
            camera.process_keyboard(CameraMovement::Right, dt);
        }

        // Window y grows downward, pitch grows upward
        if input.mouse_dx != 0.0 || input.mouse_dy != 0.0 {
            camera.process_mouse_movement(input.mouse_dx, -input.mouse_dy, self.constrain_pitch);
        }

        if input.scroll != 0.0 {
            camera.process_mouse_scroll(input.scroll);
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(true)
    }
}

// Uniform buffer for passing camera data to shaders
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub sky_view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sky_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, aspect: f32, near: f32, far: f32) {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(aspect, near, far);
        // Rotation only, so the skybox stays centred on the viewer
        let sky_view = Mat4::from_mat3(Mat3::from_mat4(view));

        self.view_proj = (projection * view).to_cols_array_2d();
        self.sky_view_proj = (projection * sky_view).to_cols_array_2d();
        let position = camera.position();
        self.position = [position.x, position.y, position.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, EPSILON)
    }

    fn assert_orthonormal(camera: &Camera) {
        let (f, r, u) = (camera.front(), camera.right(), camera.up());
        assert!(approx(f.length(), 1.0), "front not unit: {f:?}");
        assert!(approx(r.length(), 1.0), "right not unit: {r:?}");
        assert!(approx(u.length(), 1.0), "up not unit: {u:?}");
        assert!(approx(f.dot(r), 0.0));
        assert!(approx(f.dot(u), 0.0));
        assert!(approx(r.dot(u), 0.0));
    }

    #[test]
    fn starts_facing_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        assert!(approx_vec(camera.front(), Vec3::NEG_Z));
        assert!(approx_vec(camera.right(), Vec3::X));
        assert!(approx_vec(camera.up(), Vec3::Y));
        assert_eq!(camera.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn forward_one_second_at_default_tutorial_speed() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        camera.movement_speed = 2.5;
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(approx_vec(camera.position(), Vec3::new(0.0, 0.0, 0.5)));
    }

    #[test]
    fn keyboard_displacement_is_linear_in_time() {
        let start = {
            let mut camera = Camera::new(Vec3::new(1.0, -2.0, 3.0));
            camera.process_mouse_movement(37.0, 12.0, true);
            camera
        };

        for dt in [0.0, 0.004, 0.016, 0.25, 1.5] {
            for direction in [
                CameraMovement::Forward,
                CameraMovement::Backward,
                CameraMovement::Left,
                CameraMovement::Right,
            ] {
                let mut single = start.clone();
                let mut double = start.clone();
                single.process_keyboard(direction, dt);
                double.process_keyboard(direction, dt * 2.0);

                let d1 = single.position() - start.position();
                let d2 = double.position() - start.position();
                assert!(approx_vec(d2, d1 * 2.0), "{direction:?} dt={dt}: {d1:?} vs {d2:?}");
            }
        }
    }

    #[test]
    fn strafing_moves_along_right() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.movement_speed = 1.0;
        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert!(approx_vec(camera.position(), Vec3::new(2.0, 0.0, 0.0)));
        camera.process_keyboard(CameraMovement::Left, 3.0);
        assert!(approx_vec(camera.position(), Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn yaw_ninety_degrees_turns_towards_positive_x() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.mouse_sensitivity = 1.0;
        camera.process_mouse_movement(90.0, 0.0, true);
        assert!(approx(camera.yaw(), 0.0));
        assert!(approx_vec(camera.front(), Vec3::X));
        assert!(approx_vec(camera.right(), Vec3::Z));
    }

    #[test]
    fn basis_stays_orthonormal_after_mouse_sequences() {
        let mut camera = Camera::new(Vec3::ZERO);
        let deltas = [
            (13.0, 7.0),
            (-250.0, 400.0),
            (1000.0, -1000.0),
            (0.5, 0.25),
            (-3.0, 900.0),
            (720.0, -37.5),
        ];
        for (dx, dy) in deltas {
            camera.process_mouse_movement(dx, dy, true);
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn up_tracks_view_direction_near_pole() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.mouse_sensitivity = 1.0;
        camera.process_mouse_movement(0.0, 80.0, true);
        assert!(camera.up().y > 0.0);
        assert!(approx(camera.up().dot(camera.front()), 0.0));
        assert!(camera.up().dot(Vec3::Y) < 0.5);
    }

    #[test]
    fn constrained_pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.mouse_sensitivity = 1.0;

        camera.process_mouse_movement(0.0, 500.0, true);
        assert_eq!(camera.pitch(), PITCH_LIMIT);

        camera.process_mouse_movement(0.0, -5000.0, true);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn unconstrained_pitch_may_exceed_limit() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.mouse_sensitivity = 1.0;
        camera.process_mouse_movement(0.0, 120.0, false);
        assert_eq!(camera.pitch(), 120.0);
    }

    #[test]
    fn scroll_clamps_zoom() {
        let mut camera = Camera::new(Vec3::ZERO);

        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom(), 35.0);

        camera.process_mouse_scroll(50.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);

        camera.process_mouse_scroll(-500.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);

        for delta in [-3.0, 0.5, 7.25, -0.1, 44.0, -44.0] {
            camera.process_mouse_scroll(delta);
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&camera.zoom()));
        }
    }

    #[test]
    fn view_matrix_maps_target_onto_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let view = camera.view_matrix();
        let eye = view.transform_point3(camera.position());
        let ahead = view.transform_point3(camera.position() + camera.front());
        assert!(approx_vec(eye, Vec3::ZERO));
        assert!(approx_vec(ahead, Vec3::NEG_Z));
    }

    #[test]
    fn controller_applies_held_keys_mouse_and_scroll() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        camera.movement_speed = 2.0;
        let mut controller = CameraController::default();

        let mut input = InputState::default();
        input.is_forward_pressed = true;
        controller.update_camera(&mut camera, &input, 0.5);
        assert!(approx_vec(camera.position(), Vec3::new(0.0, 0.0, 2.0)));

        // Opposing keys cancel out
        input.is_backward_pressed = true;
        controller.update_camera(&mut camera, &input, 0.5);
        assert!(approx_vec(camera.position(), Vec3::new(0.0, 0.0, 2.0)));

        let mut input = InputState::default();
        input.add_mouse_delta(0.0, -40.0);
        input.add_scroll(5.0);
        controller.update_camera(&mut camera, &input, 0.016);
        assert!(approx(camera.pitch(), 40.0 * DEFAULT_SENSITIVITY));
        assert_eq!(camera.zoom(), 40.0);
    }

    #[test]
    fn sky_view_proj_ignores_translation() {
        let near = Camera::new(Vec3::ZERO);
        let far = Camera::new(Vec3::new(50.0, -20.0, 7.0));

        let mut a = CameraUniform::new();
        let mut b = CameraUniform::new();
        a.update_view_proj(&near, 4.0 / 3.0, 0.1, 100.0);
        b.update_view_proj(&far, 4.0 / 3.0, 0.1, 100.0);

        let sky_a = Mat4::from_cols_array_2d(&a.sky_view_proj);
        let sky_b = Mat4::from_cols_array_2d(&b.sky_view_proj);
        assert!(sky_a.abs_diff_eq(sky_b, EPSILON));

        let full_a = Mat4::from_cols_array_2d(&a.view_proj);
        let full_b = Mat4::from_cols_array_2d(&b.view_proj);
        assert!(!full_a.abs_diff_eq(full_b, EPSILON));
        assert_eq!(b.position, [50.0, -20.0, 7.0, 1.0]);
    }

    #[test]
    fn projection_follows_zoom() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let aspect = 4.0 / 3.0;

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, aspect, 0.1, 100.0);
        let before = Mat4::from_cols_array_2d(&uniform.view_proj);

        camera.process_mouse_scroll(15.0);
        assert!(approx(camera.zoom(), 30.0));

        let expected = Mat4::perspective_rh(30.0_f32.to_radians(), aspect, 0.1, 100.0);
        assert!(camera
            .projection_matrix(aspect, 0.1, 100.0)
            .abs_diff_eq(expected, EPSILON));

        uniform.update_view_proj(&camera, aspect, 0.1, 100.0);
        let after = Mat4::from_cols_array_2d(&uniform.view_proj);
        assert!(!before.abs_diff_eq(after, EPSILON));
        assert!(after.abs_diff_eq(expected * camera.view_matrix(), EPSILON));

        // Narrower field of view magnifies the image
        assert!(after.x_axis.x > before.x_axis.x);
    }
}
