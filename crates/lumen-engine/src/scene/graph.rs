use std::fmt;

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::geometry::GeometryHandle;

use super::material::Mesh;
use super::transform::{Euler, Transform};

/// Generational handle to a node in a [`SceneGraph`].
///
/// A despawned node's id never resolves again, even after its slot is reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    /// Projection data lives in the camera rig; the node carries its placement.
    Camera,
}

impl NodeKind {
    pub fn is_camera(&self) -> bool {
        matches!(self, NodeKind::Camera)
    }
}

/// Scene-graph API misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("{0} does not exist (despawned or from another graph)")]
    StaleNode(NodeId),

    #[error("{0} cannot be its own parent")]
    SelfParent(NodeId),

    #[error("adding {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("the root node cannot be reparented, detached or despawned")]
    RootNode,

    #[error("{0} is not a mesh")]
    NotAMesh(NodeId),
}

/// A transform node.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    /// Hidden nodes are skipped together with their subtree when drawing.
    pub visible: bool,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, name: String) -> Self {
        Self {
            name,
            transform: Transform::IDENTITY,
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed transform hierarchy.
///
/// The graph owns a root group; nodes become part of the rendered scene once
/// they are added under it (directly or through other nodes). Parent links are
/// ids, so the hierarchy is acyclic by construction: [`SceneGraph::add`] rejects
/// any edge that would close a loop.
#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            live: 0,
        };
        graph.root = graph.spawn_named(NodeKind::Group, "root");
        graph
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Creates a detached node.
    pub fn spawn(&mut self, kind: NodeKind) -> NodeId {
        self.spawn_named(kind, "")
    }

    pub fn spawn_named(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let node = Node::new(kind, name.into());
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId { index, generation: 0 }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.node(id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.node_mut(id).map(|n| &mut n.transform)
    }

    fn require(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.node(id).ok_or(SceneError::StaleNode(id))
    }

    fn require_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.node_mut(id).ok_or(SceneError::StaleNode(id))
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    /// Makes `child` the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.require(parent)?;
        self.require(child)?;

        if parent == child {
            return Err(SceneError::SelfParent(child));
        }
        if child == self.root {
            return Err(SceneError::RootNode);
        }
        if self.is_ancestor_of(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        self.unlink(child);
        self.require_mut(child)?.parent = Some(parent);
        self.require_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detaches `child` from `parent`. Returns `false` (and changes nothing)
    /// when `child` is not a direct child of `parent`.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        let is_child = self.node(child).is_some_and(|n| n.parent == Some(parent));
        if is_child {
            self.unlink(child);
        }
        is_child
    }

    /// Detaches `child` from whatever parent it has.
    pub fn detach(&mut self, child: NodeId) -> Result<(), SceneError> {
        if child == self.root {
            return Err(SceneError::RootNode);
        }
        self.require(child)?;
        self.unlink(child);
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(old_parent) = self.node_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.node_mut(old_parent) {
            parent.children.retain(|&c| c != child);
        }
    }

    /// Removes `id` and its whole subtree. Returns the number of nodes freed.
    pub fn despawn(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            return Err(SceneError::RootNode);
        }
        self.require(id)?;
        self.unlink(id);

        let mut doomed = Vec::new();
        self.traverse(id, |node_id, _| doomed.push(node_id));

        for node_id in &doomed {
            let slot = &mut self.slots[node_id.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node_id.index);
        }
        self.live -= doomed.len();

        Ok(doomed.len())
    }

    /// Depth-first pre-order walk from `id`, children in insertion order.
    pub fn traverse(&self, id: NodeId, mut f: impl FnMut(NodeId, &Node)) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            f(current, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Pre-order walk over visible nodes with their world matrices.
    ///
    /// World matrices are accumulated top-down, so each is computed once.
    /// Invisible nodes prune their subtree.
    pub fn traverse_visible(&self, id: NodeId, mut f: impl FnMut(NodeId, &Node, &Mat4)) {
        let Some(start) = self.node(id) else {
            return;
        };
        let base = start
            .parent
            .map(|p| self.world_matrix(p).unwrap_or(Mat4::IDENTITY))
            .unwrap_or(Mat4::IDENTITY);

        let mut stack = vec![(id, base)];
        while let Some((current, parent_world)) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            f(current, node, &world);
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }

    /// `parent_world * local`, evaluated up to the top of the node's chain.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut world = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            world = node.transform.matrix() * world;
        }
        Some(world)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.w_axis.truncate())
    }

    /// Rotates `id` so its forward axis points at the world-space `target`.
    ///
    /// Cameras look down `-Z`, every other node faces `+Z`; world up is `+Y`.
    /// The parent's world rotation is compensated, so the result holds in
    /// world space.
    ///
    /// This overwrites the node's rotation and resets its order to `XYZ`.
    /// When the node already sits on `target` nothing changes.
    pub fn look_at(&mut self, id: NodeId, target: Vec3) -> Result<(), SceneError> {
        let node = self.require(id)?;
        let is_camera = node.kind.is_camera();
        let parent = node.parent;

        let eye = self.world_position(id).ok_or(SceneError::StaleNode(id))?;
        if eye.abs_diff_eq(target, f32::EPSILON) {
            log::trace!("look_at: {id} already at target");
            return Ok(());
        }

        let basis = if is_camera {
            look_basis(eye, target, Vec3::Y)
        } else {
            look_basis(target, eye, Vec3::Y)
        };
        let mut rotation = Quat::from_mat3(&basis);

        if let Some(parent_world) = parent.and_then(|p| self.world_matrix(p)) {
            let (_, parent_rotation, _) = parent_world.to_scale_rotation_translation();
            rotation = parent_rotation.inverse() * rotation;
        }

        self.require_mut(id)?.transform.rotation = Euler::from_quat_xyz(rotation);
        Ok(())
    }

    /// Installs `geometry` on a mesh node, disposing the geometry it replaces.
    ///
    /// Replacing a geometry with itself is a no-op.
    pub fn replace_geometry(&mut self, id: NodeId, geometry: GeometryHandle) -> Result<(), SceneError> {
        let node = self.require_mut(id)?;
        let NodeKind::Mesh(mesh) = &mut node.kind else {
            return Err(SceneError::NotAMesh(id));
        };
        if mesh.geometry.ptr_eq(&geometry) {
            return Ok(());
        }
        mesh.geometry.dispose();
        mesh.geometry = geometry;
        Ok(())
    }
}

/// Rotation basis whose `+Z` points from `target` toward `eye`.
fn look_basis(eye: Vec3, target: Vec3, up: Vec3) -> Mat3 {
    let mut z = eye - target;
    if z.length_squared() == 0.0 {
        z.z = 1.0;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        // up and z are parallel; nudge z off the axis.
        if (up.z.abs() - 1.0).abs() < f32::EPSILON {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    x = x.normalize();

    let y = z.cross(x);
    Mat3::from_cols(x, y, z)
}
