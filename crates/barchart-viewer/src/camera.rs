use glam::{Mat4, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Closest the orbit may zoom in.
pub const MIN_DISTANCE: f32 = 20.0;
/// Farthest the orbit may zoom out.
pub const MAX_DISTANCE: f32 = 2000.0;
/// Fraction of the pending rotation applied per frame.
pub const DAMPING_FACTOR: f32 = 0.08;

const MAX_ELEVATION: f32 = 89.0f32 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // --- Orbital parameters ---
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from the camera to the target.
    pub radius: f32,
    /// Rotation around +Y, 0 looks down -Z from the +Z side (radians).
    pub azimuth_rad: f32,
    /// Angle above the XZ plane (radians).
    pub elevation_rad: f32,

    // --- Projection ---
    pub fovy_rad: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at `position` orbiting `target`.
    pub fn looking_at(position: Vec3, target: Vec3, aspect: f32) -> Self {
        let offset = position - target;
        let radius = offset.length();
        Self {
            target,
            radius,
            azimuth_rad: offset.x.atan2(offset.z),
            elevation_rad: (offset.y / radius.max(f32::EPSILON)).asin(),
            fovy_rad: 50f32.to_radians(),
            aspect,
            near: 0.1,
            far: 10_000.0,
        }
    }

    /// The chart's default view: from (0, 200, 400) towards the origin.
    pub fn chart_default(aspect: f32) -> Self {
        Self::looking_at(Vec3::new(0.0, 200.0, 400.0), Vec3::ZERO, aspect)
    }

    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth_rad.sin_cos();
        let (sin_el, cos_el) = self.elevation_rad.sin_cos();
        self.target
            + self.radius * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Right-handed perspective with depth in `[0, 1]`, as wgpu expects.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_rad, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

/// Orbit controls with damping. Input is ignored while disabled.
pub struct CameraController {
    pub enabled: bool,
    mouse_down: bool,
    last_mouse: Option<(f64, f64)>,
    /// Rotation still to be applied: (azimuth, elevation).
    pending: (f32, f32),
    saved: Option<Camera>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            enabled: true,
            mouse_down: false,
            last_mouse: None,
            pending: (0.0, 0.0),
            saved: None,
        }
    }

    /// Remember `camera` for a later [`Self::reset`].
    pub fn save_state(&mut self, camera: &Camera) {
        self.saved = Some(camera.clone());
    }

    /// Restore the saved orbit, keeping the current projection.
    pub fn reset(&mut self, camera: &mut Camera) {
        if let Some(saved) = &self.saved {
            camera.target = saved.target;
            camera.radius = saved.radius;
            camera.azimuth_rad = saved.azimuth_rad;
            camera.elevation_rad = saved.elevation_rad;
        }
        self.pending = (0.0, 0.0);
    }

    /// Handles window events. `viewport_height` scales drag distance to rotation.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera, viewport_height: u32) {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.on_button(*state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor((position.x, position.y), viewport_height);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.on_scroll(scroll, camera);
            }
            _ => {}
        }
    }

    pub fn on_button(&mut self, pressed: bool) {
        self.mouse_down = pressed && self.enabled;
    }

    /// Accumulates rotation while the left button is held.
    pub fn on_cursor(&mut self, xy: (f64, f64), viewport_height: u32) {
        if let Some(last) = self.last_mouse {
            if self.mouse_down && self.enabled {
                // A drag across the full viewport height is one full turn.
                let per_px = std::f32::consts::TAU / viewport_height.max(1) as f32;
                self.pending.0 -= (xy.0 - last.0) as f32 * per_px;
                self.pending.1 += (xy.1 - last.1) as f32 * per_px;
            }
        }
        self.last_mouse = Some(xy);
    }

    /// Positive delta (wheel up) zooms in.
    pub fn on_scroll(&mut self, delta: f32, camera: &mut Camera) {
        if !self.enabled {
            return;
        }
        camera.radius = (camera.radius * 0.95f32.powf(delta)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Per-frame step: apply a damped share of the pending rotation.
    pub fn update(&mut self, camera: &mut Camera) {
        if !self.enabled {
            self.pending = (0.0, 0.0);
            self.mouse_down = false;
            return;
        }

        camera.azimuth_rad += self.pending.0 * DAMPING_FACTOR;
        camera.elevation_rad = (camera.elevation_rad + self.pending.1 * DAMPING_FACTOR)
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);
        camera.radius = camera.radius.clamp(MIN_DISTANCE, MAX_DISTANCE);

        self.pending.0 *= 1.0 - DAMPING_FACTOR;
        self.pending.1 *= 1.0 - DAMPING_FACTOR;
    }
}
