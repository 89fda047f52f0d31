use winit::keyboard::KeyCode;

/// Touchpad pixel deltas per scroll line.
pub const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    Exit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadingFlags {
    pub blinn: bool,
    pub directional_only: bool,
}

/// Input gathered by the window layer during one frame.
///
/// Held flags persist across frames; mouse and scroll deltas accumulate
/// until `end_frame`.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub is_forward_pressed: bool,
    pub is_backward_pressed: bool,
    pub is_left_pressed: bool,
    pub is_right_pressed: bool,
    pub is_blinn_pressed: bool,
    pub is_directional_only_pressed: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub scroll: f32,
}

impl InputState {
    pub fn handle_key(&mut self, keycode: KeyCode, pressed: bool) -> KeyOutcome {
        match keycode {
            KeyCode::KeyW | KeyCode::ArrowUp => self.is_forward_pressed = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.is_backward_pressed = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.is_left_pressed = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.is_right_pressed = pressed,
            KeyCode::KeyB => self.is_blinn_pressed = pressed,
            KeyCode::KeyF => self.is_directional_only_pressed = pressed,
            KeyCode::Escape if pressed => return KeyOutcome::Exit,
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_dx += dx;
        self.mouse_dy += dy;
    }

    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn add_scroll_pixels(&mut self, pixels: f32) {
        self.add_scroll(pixels / PIXELS_PER_LINE);
    }

    pub fn shading(&self) -> ShadingFlags {
        ShadingFlags {
            blinn: self.is_blinn_pressed,
            directional_only: self.is_directional_only_pressed,
        }
    }

    pub fn end_frame(&mut self) {
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.scroll = 0.0;
    }
}
