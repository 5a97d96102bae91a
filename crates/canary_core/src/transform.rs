use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotates around an arbitrary axis (normalized here), in local space
    pub fn rotate_axis(&mut self, axis: Vec3, angle_radians: f32) {
        self.rotation *= Quat::from_axis_angle(axis.normalize(), angle_radians);
    }

    /// Yaw around world +Y, applied before the current rotation
    pub fn rotate_y(&mut self, angle_radians: f32) {
        self.rotation = Quat::from_rotation_y(angle_radians) * self.rotation;
    }

    /// Model matrix, object space -> world space.
    pub fn compute_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Local -Z in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let transform = Transform::from_xyz(1.0, 2.0, 3.0)
            .with_scale(Vec3::splat(2.0));
        let p = transform.compute_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-5));
    }

    #[test]
    fn rotate_y_turns_forward_towards_negative_x() {
        let mut transform = Transform::default();
        transform.rotate_y(FRAC_PI_2);
        assert!(transform.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert!(transform.up().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn rotate_axis_normalizes_its_axis() {
        let mut a = Transform::default();
        let mut b = Transform::default();
        a.rotate_axis(Vec3::new(1.0, 0.3, 0.5), 0.7);
        b.rotate_axis(Vec3::new(1.0, 0.3, 0.5) * 10.0, 0.7);
        assert!(a.rotation.abs_diff_eq(b.rotation, 1e-6));
        assert!((a.rotation.length() - 1.0).abs() < 1e-5);
    }
}
