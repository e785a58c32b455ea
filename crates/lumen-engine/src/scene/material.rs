use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::assets::TextureHandle;
use crate::geometry::GeometryHandle;
use crate::paint::Color;

/// Unlit surface description.
#[derive(Debug, Clone)]
pub struct BasicMaterial {
    pub color: Color,
    /// Draw triangle edges instead of filled faces.
    pub wireframe: bool,
    /// Color map multiplied with `color`. Absent, pending, errored or disposed
    /// maps sample as white.
    pub map: Option<TextureHandle>,
    /// `[0, 1]`; values below 1 enable alpha blending.
    pub opacity: f32,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            wireframe: false,
            map: None,
            opacity: 1.0,
        }
    }
}

impl BasicMaterial {
    pub fn with_color(color: Color) -> Self {
        Self { color, ..Default::default() }
    }

    pub fn with_map(map: TextureHandle) -> Self {
        Self { map: Some(map), ..Default::default() }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Shared, mutable material. Several meshes may render with one material.
#[derive(Debug, Clone, Default)]
pub struct MaterialHandle(Rc<RefCell<BasicMaterial>>);

impl MaterialHandle {
    pub fn new(material: BasicMaterial) -> Self {
        Self(Rc::new(RefCell::new(material)))
    }

    pub fn borrow(&self) -> Ref<'_, BasicMaterial> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, BasicMaterial> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &MaterialHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<BasicMaterial> for MaterialHandle {
    fn from(material: BasicMaterial) -> Self {
        Self::new(material)
    }
}

/// Drawable payload of a mesh node.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

impl Mesh {
    pub fn new(geometry: impl Into<GeometryHandle>, material: impl Into<MaterialHandle>) -> Self {
        Self {
            geometry: geometry.into(),
            material: material.into(),
        }
    }
}
