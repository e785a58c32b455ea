use glam::Mat4;

use crate::error::ConfigError;

/// Camera projection model.
///
/// Matrices follow OpenGL clip conventions: right-handed view space looking
/// down `-Z`, NDC depth in `[-1, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view, degrees.
        fov_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, Projection::Perspective { .. })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (near, far) = (self.near(), self.far());
        if !(near.is_finite() && near > 0.0) {
            return Err(ConfigError::InvalidNear { near });
        }
        if !(far.is_finite() && near < far) {
            return Err(ConfigError::NearNotLessThanFar { near, far });
        }

        match *self {
            Projection::Perspective { fov_deg, aspect, .. } => {
                if !(fov_deg.is_finite() && fov_deg > 0.0 && fov_deg < 180.0) {
                    return Err(ConfigError::InvalidFov { fov_deg });
                }
                if !(aspect.is_finite() && aspect > 0.0) {
                    return Err(ConfigError::InvalidAspect { aspect });
                }
            }
            Projection::Orthographic { left, right, top, bottom, .. } => {
                let finite = [left, right, top, bottom].iter().all(|v| v.is_finite());
                if !finite || left == right || top == bottom {
                    return Err(ConfigError::DegenerateOrthographic { left, right, top, bottom });
                }
            }
        }
        Ok(())
    }

    /// Projection matrix for the current parameters. Does not validate.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective { fov_deg, aspect, near, far } => {
                Mat4::perspective_rh_gl(fov_deg.to_radians(), aspect, near, far)
            }
            Projection::Orthographic { left, right, top, bottom, near, far } => {
                Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
            }
        }
    }
}
