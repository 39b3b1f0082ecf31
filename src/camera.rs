//! Perspective camera and orbit controls.
//!
//! [`OrbitControls`] keeps the camera on a sphere around a target point. User
//! input only accumulates pending motion; [`OrbitControls::update`] applies it
//! once per frame. With damping enabled only a share of the pending motion is
//! applied per update and the rest decays, so the camera glides to a stop.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::config::{CameraConfig, ControlsConfig};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const EPS: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov_y: Rad<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: config.position,
            target: config.target,
            up: Vector3::unit_y(),
            fov_y: config.fov_y.into(),
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fov_y, self.aspect.max(EPS), self.near, self.far)
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}

/// Camera data as laid out in the uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = camera.view_proj().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Position around a target: `radius`, polar angle `phi` from the up axis and
/// azimuth `theta` around it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius < EPS {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub config: ControlsConfig,
    pub target: Point3<f32>,
    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: Drag,
    cursor: Option<(f64, f64)>,
    /// Height of the viewport in pixels, converts pointer motion into angles.
    viewport_height: f32,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig, target: Point3<f32>) -> Self {
        Self {
            config,
            target,
            spherical_delta: Spherical::default(),
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
            drag: Drag::None,
            cursor: None,
            viewport_height: 1.0,
        }
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = (height as f32).max(1.0);
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Move the camera closer to the target by `factor` (> 1 moves closer).
    pub fn dolly_in(&mut self, factor: f32) {
        self.scale /= factor;
    }

    pub fn dolly_out(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Pan by a pointer motion of `dx`, `dy` pixels.
    pub fn pan(&mut self, camera: &Camera, dx: f32, dy: f32) {
        let offset = camera.position - self.target;
        // half of the fov is center to top of screen
        let target_distance = offset.magnitude() * (camera.fov_y.0 / 2.0).tan();
        let left_distance = 2.0 * dx * target_distance / self.viewport_height * self.config.pan_speed;
        let up_distance = 2.0 * dy * target_distance / self.viewport_height * self.config.pan_speed;

        let forward = (self.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        self.pan_offset -= right * left_distance;

        let up = if self.config.screen_space_panning {
            right.cross(forward).normalize()
        } else {
            // move along the ground plane
            camera.up.cross(right).normalize()
        };
        self.pan_offset += up * up_distance;
    }

    fn dolly_factor(&self) -> f32 {
        0.95f32.powf(self.config.zoom_speed)
    }

    /// Feed a window event. Returns `true` if the event moved the camera.
    pub fn handle_window_event(&mut self, camera: &Camera, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Drag::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => Drag::Pan,
                    (ElementState::Released, _) => Drag::None,
                    _ => self.drag,
                };
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.cursor.replace(current);
                let Some((px, py)) = previous else {
                    return false;
                };
                let (dx, dy) = ((current.0 - px) as f32, (current.1 - py) as f32);
                match self.drag {
                    Drag::Rotate => {
                        let speed = 2.0 * PI * self.config.rotate_speed / self.viewport_height;
                        self.rotate_left(dx * speed);
                        self.rotate_up(dy * speed);
                        true
                    }
                    Drag::Pan => {
                        self.pan(camera, dx, dy);
                        true
                    }
                    Drag::None => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                if scroll > 0.0 {
                    self.dolly_in(1.0 / self.dolly_factor());
                } else if scroll < 0.0 {
                    self.dolly_out(1.0 / self.dolly_factor());
                }
                scroll != 0.0
            }
            _ => false,
        }
    }

    /// Apply pending motion to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let config = &self.config;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        let share = if config.enable_damping {
            config.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * share;
        spherical.phi += self.spherical_delta.phi * share;
        spherical.phi = spherical
            .phi
            .clamp(config.min_polar_angle, config.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(config.min_distance, config.max_distance);

        self.target += self.pan_offset * share;

        let new_position = self.target + spherical.to_offset();
        let moved = (new_position - camera.position).magnitude2() > EPS * EPS
            || (camera.target - self.target).magnitude2() > EPS * EPS;
        camera.position = new_position;
        camera.target = self.target;

        if config.enable_damping {
            let decay = 1.0 - config.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        }
        self.scale = 1.0;

        moved
    }

    /// Distance from the camera to the target after the last update.
    pub fn distance(&self, camera: &Camera) -> f32 {
        (camera.position.to_vec() - self.target.to_vec()).magnitude()
    }
}
