use glam::{Mat3, Mat4, Quat, Vec3};

/// Order in which the three Euler angles are applied.
///
/// For order `ABC` the rotation matrix is `R_A * R_B * R_C`: a vector is rotated
/// about `C` first and about `A` last (intrinsic `A`, then `B`, then `C`).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum RotationOrder {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::XYZ,
        RotationOrder::XZY,
        RotationOrder::YXZ,
        RotationOrder::YZX,
        RotationOrder::ZXY,
        RotationOrder::ZYX,
    ];
}

/// Euler angles in radians plus the order they are applied in.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub order: RotationOrder,
}

impl Euler {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, order: RotationOrder::XYZ }
    }

    pub const fn with_order(x: f32, y: f32, z: f32, order: RotationOrder) -> Self {
        Self { x, y, z, order }
    }

    /// Changes the application order. The stored angles are kept as-is, so the
    /// resulting orientation generally differs.
    pub fn reorder(&mut self, order: RotationOrder) {
        self.order = order;
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    pub fn to_quat(&self) -> Quat {
        let qx = Quat::from_rotation_x(self.x);
        let qy = Quat::from_rotation_y(self.y);
        let qz = Quat::from_rotation_z(self.z);

        match self.order {
            RotationOrder::XYZ => qx * qy * qz,
            RotationOrder::XZY => qx * qz * qy,
            RotationOrder::YXZ => qy * qx * qz,
            RotationOrder::YZX => qy * qz * qx,
            RotationOrder::ZXY => qz * qx * qy,
            RotationOrder::ZYX => qz * qy * qx,
        }
    }

    /// Extracts `XYZ`-ordered angles from a pure rotation matrix.
    pub fn from_rotation_xyz(m: &Mat3) -> Self {
        // Row/column naming: m13 is row 1, column 3.
        let m11 = m.x_axis.x;
        let m12 = m.y_axis.x;
        let m13 = m.z_axis.x;
        let m22 = m.y_axis.y;
        let m23 = m.z_axis.y;
        let m32 = m.y_axis.z;
        let m33 = m.z_axis.z;

        let y = m13.clamp(-1.0, 1.0).asin();
        let (x, z) = if m13.abs() < 0.999_999_9 {
            ((-m23).atan2(m33), (-m12).atan2(m11))
        } else {
            // Gimbal lock: fold z into x.
            (m32.atan2(m22), 0.0)
        };

        Self::new(x, y, z)
    }

    pub fn from_quat_xyz(q: Quat) -> Self {
        Self::from_rotation_xyz(&Mat3::from_quat(q.normalize()))
    }
}

/// Local transform of a scene node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Euler,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Euler::new(0.0, 0.0, 0.0),
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local matrix: translation * rotation * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation.to_quat(), self.position)
    }

    /// Rescales `position` to unit length. A zero position stays zero.
    pub fn normalize_position(&mut self) {
        self.position = self.position.normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    // ── Euler ─────────────────────────────────────────────────────────────

    #[test]
    fn xyz_applies_z_first() {
        // R_X(90) * R_Z(90): +X -> +Y (by Z) -> +Z (by X).
        let e = Euler::new(FRAC_PI_2, 0.0, FRAC_PI_2);
        let v = e.to_quat() * Vec3::X;
        assert!(approx(v, Vec3::Z), "{v:?}");
    }

    #[test]
    fn reorder_keeps_angles_but_changes_orientation() {
        let mut e = Euler::new(FRAC_PI_2, 0.0, FRAC_PI_2);
        let before = e.to_quat() * Vec3::X;

        e.reorder(RotationOrder::ZYX);
        assert_eq!((e.x, e.y, e.z), (FRAC_PI_2, 0.0, FRAC_PI_2));

        // R_Z(90) * R_X(90): +X stays +X under X, then -> +Y under Z.
        let after = e.to_quat() * Vec3::X;
        assert!(approx(after, Vec3::Y), "{after:?}");
        assert!(!approx(before, after));
    }

    #[test]
    fn xyz_extraction_round_trips() {
        let e = Euler::new(0.3, -0.7, FRAC_PI_4);
        let back = Euler::from_quat_xyz(e.to_quat());
        assert!((back.x - e.x).abs() < 1e-5);
        assert!((back.y - e.y).abs() < 1e-5);
        assert!((back.z - e.z).abs() < 1e-5);
        assert_eq!(back.order, RotationOrder::XYZ);
    }

    // ── Transform ─────────────────────────────────────────────────────────

    #[test]
    fn normalize_position_discards_magnitude() {
        let mut t = Transform::from_position(Vec3::new(0.7, -0.6, 1.0));
        t.normalize_position();
        assert!((t.position.length() - 1.0).abs() < 1e-6);

        let mut zero = Transform::IDENTITY;
        zero.normalize_position();
        assert_eq!(zero.position, Vec3::ZERO);
    }

    #[test]
    fn matrix_scales_then_rotates_then_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0))
            .with_rotation(Euler::new(0.0, 0.0, FRAC_PI_2))
            .with_scale(Vec3::splat(2.0));

        let p = t.matrix().transform_point3(Vec3::X);
        assert!(approx(p, Vec3::new(1.0, 2.0, 0.0)), "{p:?}");
    }
}
