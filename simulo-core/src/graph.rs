/// Object graph operations: creating nodes and linking them into the tree.
///
/// The parent/child edges live in the host's graph table. Attaching a child
/// hands one reference to the host; enumerating children hands fresh
/// references back to the guest.
use std::rc::Rc;

use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::{Result, SceneError};
use crate::handle::RawHandle;
use crate::host::{ImageId, NodeId};
use crate::material::Material;
use crate::node::{Node, NodeHandle, NodeKind, NodeState};
use crate::scene::Scene;

/// Most children a single enumeration returns
pub const MAX_CHILDREN: usize = 128;

/// Snapshot of a node's children, each entry an owned reference.
///
/// Holds at most `MAX_CHILDREN` handles; `total` is the host's true count so
/// truncation is visible to the caller.
#[derive(Debug)]
pub struct Children {
    handles: Vec<NodeHandle>,
    total: usize,
}

impl Children {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Number of children the host reported, including any not returned
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_truncated(&self) -> bool {
        self.total > self.handles.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeHandle> {
        self.handles.iter()
    }
}

impl IntoIterator for Children {
    type Item = NodeHandle;
    type IntoIter = std::vec::IntoIter<NodeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a NodeHandle;
    type IntoIter = std::slice::Iter<'a, NodeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

impl Scene {
    /// Allocate a node and register it with the host graph table.
    pub fn create(&self, material: &Material, kind: NodeKind) -> Result<NodeHandle> {
        let id = self.host.create_node(material.id());
        if id == NodeId::EXHAUSTED {
            return Err(SceneError::ResourceExhausted { resource: "nodes" });
        }
        debug!("Created {} ({}) with {}", id, kind.name(), material.id());
        Ok(NodeHandle::new(Node::new(
            id,
            material.clone(),
            kind,
            Rc::clone(&self.host),
        )))
    }

    pub fn create_material(&self, image: ImageId, r: f32, g: f32, b: f32) -> Result<Material> {
        Material::new(&self.host, image, Vector3::new(r, g, b))
    }

    /// Attach `child` under `parent`, transferring the child reference into
    /// the edge.
    pub fn add_child(&self, parent: &NodeHandle, child: NodeHandle) {
        let child_id = child.id();
        child.borrow_mut().set_state(NodeState::Live);
        let handle = self.export(child);
        self.host.add_child(parent.id(), child_id);
        debug!("Attached {} ({}) under {}", child_id, handle, parent.id());
    }

    /// Owned references to up to `MAX_CHILDREN` immediate children, in the
    /// host's iteration order.
    pub fn children(&self, parent: &NodeHandle) -> Result<Children> {
        let mut out = [RawHandle::NIL; MAX_CHILDREN];
        let total = self.host.get_children(parent.id(), &mut out);
        let count = total.min(MAX_CHILDREN);
        if total > MAX_CHILDREN {
            warn!(
                "{} has {} children; enumerating the first {}",
                parent.id(),
                total,
                MAX_CHILDREN
            );
        }

        let table = self.table.borrow();
        let handles = out[..count]
            .iter()
            .map(|&handle| table.retain(handle))
            .collect::<Result<Vec<_>>>()?;
        Ok(Children { handles, total })
    }

    /// Detach `node` from its parent. Its own reference is untouched.
    pub fn remove_from_parent(&self, node: &NodeHandle) {
        node.borrow_mut().remove_from_parent();
    }

    pub fn mark_transform_dirty(&self, node: &NodeHandle) {
        node.borrow_mut().mark_transform_dirty();
    }

    pub fn set_material(&self, node: &NodeHandle, material: &Material) {
        node.borrow_mut().set_material(material.clone());
    }

    /// Move one reference to the host, announcing the handle on first export.
    pub(crate) fn export(&self, node: NodeHandle) -> RawHandle {
        let id = node.id();
        let (handle, issued) = self.table.borrow_mut().export(node);
        if issued {
            self.host.set_node_handle(id, handle);
        }
        handle
    }
}
