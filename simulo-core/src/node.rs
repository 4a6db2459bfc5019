/// Scene nodes and the move-only handles that own them
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use nalgebra::{Matrix4, Vector2};

use crate::behavior::{Game, Particle};
use crate::handle::RawHandle;
use crate::host::{Host, NodeId};
use crate::material::Material;
use crate::transform::TransformState;

/// Where a node is in its lifecycle. A dropped node no longer exists, so it
/// has no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created, not yet attached to the tree
    Constructed,
    /// Attached as the root or as some node's child
    Live,
    /// Detached from its parent, waiting for the host to drop it
    PendingRemoval,
}

/// Per-kind payload and update behaviour
pub enum NodeKind {
    Plain,
    Particle(Particle),
    Root(Box<Game>),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Plain => "plain",
            NodeKind::Particle(_) => "particle",
            NodeKind::Root(_) => "root",
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Particle(particle) => f.debug_tuple("Particle").field(particle).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// A positioned object in the scene
pub struct Node {
    id: NodeId,
    transform: TransformState,
    material: Material,
    kind: NodeKind,
    state: NodeState,
    transform_dirty: bool,
    host: Rc<dyn Host>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        material: Material,
        kind: NodeKind,
        host: Rc<dyn Host>,
    ) -> Self {
        let mut node = Self {
            id,
            transform: TransformState::default(),
            material,
            kind,
            state: NodeState::Constructed,
            transform_dirty: false,
            host,
        };
        node.mark_transform_dirty();
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        trace!("{} {:?} -> {:?}", self.id, self.state, state);
        self.state = state;
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn position(&self) -> Vector2<f32> {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vector2<f32>) {
        self.transform.position = position;
        self.mark_transform_dirty();
    }

    pub fn translate(&mut self, offset: Vector2<f32>) {
        self.set_position(self.transform.position + offset);
    }

    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.transform.rotation = rotation;
        self.mark_transform_dirty();
    }

    pub fn scale(&self) -> Vector2<f32> {
        self.transform.scale
    }

    pub fn set_scale(&mut self, scale: Vector2<f32>) {
        self.transform.scale = scale;
        self.mark_transform_dirty();
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Display a different material. The old one is released by this node only.
    pub fn set_material(&mut self, material: Material) {
        self.host.set_material(self.id, material.id());
        self.material = material;
    }

    pub fn is_transform_dirty(&self) -> bool {
        self.transform_dirty
    }

    /// Declare the cached world matrix stale. The host hears about it once
    /// per clean-to-dirty transition.
    pub fn mark_transform_dirty(&mut self) {
        if !self.transform_dirty {
            self.transform_dirty = true;
            self.host.mark_transform_outdated(self.id);
        }
    }

    /// Detach from the parent. The node stays addressable until dropped.
    pub fn remove_from_parent(&mut self) {
        self.host.remove_from_parent(self.id);
        if self.state == NodeState::Live {
            self.set_state(NodeState::PendingRemoval);
        }
    }

    /// Recompute the local-to-world matrix from the current fields and mark
    /// the transform clean.
    pub fn recalculate_transform(&mut self) -> Matrix4<f32> {
        self.transform_dirty = false;
        self.transform.matrix()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("transform", &self.transform)
            .field("material", &self.material.id())
            .field("kind", &self.kind)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        debug!("Dropping {} ({})", self.id, self.kind.name());
        self.host.delete_node(self.id);
    }
}

struct NodeCell {
    id: NodeId,
    raw: Cell<Option<RawHandle>>,
    node: RefCell<Node>,
}

/// One strong reference to a node.
///
/// Not `Clone`: passing a `NodeHandle` by value transfers the reference, and
/// the node is destroyed when the last reference goes away. New references
/// are only minted when a handle comes back across the boundary.
pub struct NodeHandle(Rc<NodeCell>);

impl NodeHandle {
    pub(crate) fn new(node: Node) -> Self {
        NodeHandle(Rc::new(NodeCell {
            id: node.id,
            raw: Cell::new(None),
            node: RefCell::new(node),
        }))
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// The handle the host uses for this node, if it holds any reference
    pub fn raw(&self) -> Option<RawHandle> {
        self.0.raw.get()
    }

    pub(crate) fn set_raw(&self, raw: Option<RawHandle>) {
        self.0.raw.set(raw);
    }

    pub fn borrow(&self) -> Ref<'_, Node> {
        self.0.node.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Node> {
        self.0.node.borrow_mut()
    }

    /// Whether both handles refer to the same node
    pub fn same_node(&self, other: &NodeHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Live strong references, guest and table together
    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn retain(&self) -> NodeHandle {
        NodeHandle(Rc::clone(&self.0))
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeHandle").field(&self.0.id).finish()
    }
}
