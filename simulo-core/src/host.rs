/// Functions the guest consumes from the host runtime
use std::fmt;

use crate::handle::RawHandle;

/// Identifier the host assigns to a node in its graph table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifier the host assigns to a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Identifier of an image known to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

impl NodeId {
    /// Returned by `create_node` when the host table is full
    pub const EXHAUSTED: NodeId = NodeId(u32::MAX);
}

impl MaterialId {
    /// Returned by `create_material` when the host table is full
    pub const EXHAUSTED: MaterialId = MaterialId(u32::MAX);
}

impl ImageId {
    /// A single opaque white texel; tinting it gives a solid colour.
    pub const SOLID: ImageId = ImageId(u32::MAX);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// The host runtime as seen from the guest.
///
/// Every call runs on the single guest execution context, so methods take
/// `&self`; implementations needing state use interior mutability.
pub trait Host {
    /// Announce the guest-owned pose (34 floats) and transform (16 floats) buffers.
    fn set_buffers(&self, pose: *mut f32, transform: *mut f32);

    fn set_root(&self, id: NodeId, handle: RawHandle);

    /// Register a node with the host graph table. Returns `NodeId::EXHAUSTED` when full.
    fn create_node(&self, material: MaterialId) -> NodeId;

    /// Tell the host which opaque handle refers to `id`.
    fn set_node_handle(&self, id: NodeId, handle: RawHandle);

    fn delete_node(&self, id: NodeId);

    fn add_child(&self, parent: NodeId, child: NodeId);

    /// Write up to `out.len()` child handles and return the true child count.
    fn get_children(&self, parent: NodeId, out: &mut [RawHandle]) -> usize;

    fn remove_from_parent(&self, id: NodeId);

    fn mark_transform_outdated(&self, id: NodeId);

    fn set_material(&self, id: NodeId, material: MaterialId);

    /// Returns `MaterialId::EXHAUSTED` when full.
    fn create_material(&self, image: ImageId, r: f32, g: f32, b: f32) -> MaterialId;

    fn delete_material(&self, id: MaterialId);

    /// Uniform sample in `[0, 1)`
    fn random(&self) -> f32;

    fn window_size(&self) -> (i32, i32);
}
