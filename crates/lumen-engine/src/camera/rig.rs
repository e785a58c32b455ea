use glam::Mat4;

use crate::error::ConfigError;
use crate::scene::{NodeId, SceneGraph};

use super::projection::Projection;

/// A projection bound to a camera node of the scene graph.
///
/// The cached projection matrix only changes in [`Camera::update_projection`];
/// editing parameters (directly or via [`Camera::set_aspect`]) leaves it stale
/// until then.
#[derive(Debug, Clone)]
pub struct Camera {
    node: NodeId,
    projection: Projection,
    /// Orthographic `left/right` at aspect 1 plus the aspect they were last
    /// scaled with. Aspect changes scale from the base so repeated resizes
    /// never compound.
    ortho: Option<OrthoBase>,
    matrix: Mat4,
}

impl Camera {
    pub fn new(node: NodeId, projection: Projection) -> Result<Self, ConfigError> {
        projection.validate()?;
        Ok(Self {
            node,
            projection,
            ortho: OrthoBase::of(&projection),
            matrix: projection.matrix(),
        })
    }

    pub fn perspective(node: NodeId, fov_deg: f32, aspect: f32, near: f32, far: f32) -> Result<Self, ConfigError> {
        Self::new(node, Projection::Perspective { fov_deg, aspect, near, far })
    }

    /// Extents are given for aspect 1; [`Camera::set_aspect`] widens
    /// `left/right` by the aspect ratio.
    pub fn orthographic(
        node: NodeId,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, ConfigError> {
        Self::new(node, Projection::Orthographic { left, right, top, bottom, near, far })
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Direct parameter access. Call [`Camera::update_projection`] afterwards.
    ///
    /// Orthographic extents written here are taken as already scaled by the
    /// current aspect; later aspect changes rescale from them.
    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    /// Replaces the projection model. The matrix is refreshed on the next
    /// [`Camera::update_projection`].
    pub fn set_projection(&mut self, projection: Projection) -> Result<(), ConfigError> {
        projection.validate()?;
        self.projection = projection;
        self.ortho = OrthoBase::of(&projection);
        Ok(())
    }

    /// Applies a new viewport aspect ratio to the parameters.
    ///
    /// Non-positive or non-finite ratios are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::debug!("camera {}: ignoring aspect {aspect}", self.node);
            return;
        }
        self.rebase_ortho();
        match &mut self.projection {
            Projection::Perspective { aspect: a, .. } => *a = aspect,
            Projection::Orthographic { left, right, .. } => {
                if let Some(base) = self.ortho.as_mut() {
                    *left = base.left * aspect;
                    *right = base.right * aspect;
                    base.aspect = aspect;
                }
            }
        }
    }

    /// Picks up `left/right` edited through [`Camera::projection_mut`].
    fn rebase_ortho(&mut self) {
        let Projection::Orthographic { left, right, .. } = self.projection else {
            self.ortho = None;
            return;
        };
        let base = self.ortho.get_or_insert(OrthoBase { left, right, aspect: 1.0 });
        if left != base.left * base.aspect || right != base.right * base.aspect {
            base.left = left / base.aspect;
            base.right = right / base.aspect;
        }
    }

    /// Recomputes the projection matrix from the current parameters.
    ///
    /// Idempotent. Invalid parameters (from [`Camera::projection_mut`]) keep
    /// the previous matrix and log a warning.
    pub fn update_projection(&mut self) {
        self.rebase_ortho();
        match self.projection.validate() {
            Ok(()) => self.matrix = self.projection.matrix(),
            Err(err) => log::warn!("camera {}: keeping previous projection: {err}", self.node),
        }
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Inverse of the camera node's world matrix.
    pub fn view_matrix(&self, scene: &SceneGraph) -> Option<Mat4> {
        scene.world_matrix(self.node).map(|m| m.inverse())
    }

    pub fn view_projection(&self, scene: &SceneGraph) -> Option<Mat4> {
        self.view_matrix(scene).map(|view| self.matrix * view)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct OrthoBase {
    left: f32,
    right: f32,
    aspect: f32,
}

impl OrthoBase {
    fn of(projection: &Projection) -> Option<Self> {
        match *projection {
            Projection::Orthographic { left, right, .. } => Some(Self { left, right, aspect: 1.0 }),
            Projection::Perspective { .. } => None,
        }
    }
}

/// Index of a camera inside a [`CameraRig`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CameraId(usize);

/// Every camera that follows the viewport, plus the one used for drawing.
#[derive(Debug, Default)]
pub struct CameraRig {
    cameras: Vec<Camera>,
    active: Option<CameraId>,
}

impl CameraRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a camera. The first camera added becomes active.
    pub fn insert(&mut self, camera: Camera) -> CameraId {
        let id = CameraId(self.cameras.len());
        self.cameras.push(camera);
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    pub fn get(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id.0)
    }

    pub fn get_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        self.cameras.get_mut(id.0)
    }

    /// Returns `false` for an unknown id and keeps the current camera.
    pub fn set_active(&mut self, id: CameraId) -> bool {
        if id.0 < self.cameras.len() {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    pub fn active_id(&self) -> Option<CameraId> {
        self.active
    }

    pub fn active(&self) -> Option<&Camera> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Camera> {
        self.active.and_then(|id| self.cameras.get_mut(id.0))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CameraId, &Camera)> {
        self.cameras.iter().enumerate().map(|(i, c)| (CameraId(i), c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Camera> {
        self.cameras.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
