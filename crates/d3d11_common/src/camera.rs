use bevy_math::EulerRot;
use bevy_math::Mat4;
use bevy_math::Quat;
use bevy_math::Vec3;

pub const DEFAULT_FOV_DEGREES: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// A free camera positioned in world space and oriented by pitch, yaw and
/// roll in degrees. Call [`Camera::render`] after moving it to refresh the
/// view matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    rotation: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            view: Mat4::IDENTITY,
            projection: Mat4::perspective_lh(
                DEFAULT_FOV_DEGREES.to_radians(),
                800.0 / 600.0,
                DEFAULT_NEAR,
                DEFAULT_FAR,
            ),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    /// Pitch, yaw and roll in degrees.
    pub fn set_rotation(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.rotation = Vec3::new(pitch, yaw, roll);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_perspective(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_lh(fov_degrees.to_radians(), aspect, near, far);
    }

    pub fn render(&mut self) {
        let [pitch, yaw, roll] = self.rotation.to_array().map(f32::to_radians);
        let orientation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);
        let forward = orientation * Vec3::Z;
        let up = orientation * Vec3::Y;
        self.view = Mat4::look_at_lh(self.position, self.position + forward, up);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }
}
