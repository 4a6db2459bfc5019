/// In-memory host used by the unit tests.
///
/// `RecordingHost` plays the host side of the boundary: it assigns ids, keeps
/// the parent/child table, and holds every reference the guest transfers to
/// it until a test releases them through `Scene::drop_handle`.
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::error::Result;
use crate::handle::RawHandle;
use crate::host::{Host, ImageId, MaterialId, NodeId};
use crate::material::Material;
use crate::node::{NodeHandle, NodeKind};
use crate::scene::Scene;

struct HostNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handle: Option<RawHandle>,
    material: MaterialId,
}

struct HostState {
    node_capacity: usize,
    material_capacity: usize,
    next_node: u32,
    next_material: u32,
    nodes: BTreeMap<NodeId, HostNode>,
    deleted: Vec<NodeId>,
    outdated: HashMap<NodeId, usize>,
    materials: BTreeMap<MaterialId, ImageId>,
    deleted_materials: Vec<MaterialId>,
    root: Option<NodeId>,
    /// References the guest transferred, one per edge or root installation
    held: Vec<RawHandle>,
    /// References whose edge is gone and which the host will drop next
    pending_drop: Vec<RawHandle>,
    buffer_registrations: usize,
    window: (i32, i32),
    random: f32,
}

impl HostState {
    fn unhold(&mut self, handle: RawHandle) {
        if let Some(position) = self.held.iter().position(|&held| held == handle) {
            self.held.swap_remove(position);
            self.pending_drop.push(handle);
        }
    }

    fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes.get_mut(&id).and_then(|node| node.parent.take()) else {
            return false;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|&child| child != id);
        }
        if let Some(handle) = self.nodes[&id].handle {
            self.unhold(handle);
        }
        true
    }
}

pub struct RecordingHost {
    state: RefCell<HostState>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX, usize::MAX)
    }

    pub fn with_capacity(nodes: usize, materials: usize) -> Self {
        Self {
            state: RefCell::new(HostState {
                node_capacity: nodes,
                material_capacity: materials,
                next_node: 1,
                next_material: 1,
                nodes: BTreeMap::new(),
                deleted: Vec::new(),
                outdated: HashMap::new(),
                materials: BTreeMap::new(),
                deleted_materials: Vec::new(),
                root: None,
                held: Vec::new(),
                pending_drop: Vec::new(),
                buffer_registrations: 0,
                window: (1920, 1080),
                random: 0.5,
            }),
        }
    }

    pub fn with_window(self, width: i32, height: i32) -> Self {
        self.state.borrow_mut().window = (width, height);
        self
    }

    pub fn set_random(&self, value: f32) {
        self.state.borrow_mut().random = value;
    }

    pub fn set_node_capacity(&self, nodes: usize) {
        self.state.borrow_mut().node_capacity = nodes;
    }

    pub fn live_materials(&self) -> usize {
        self.state.borrow().materials.len()
    }

    pub fn is_deleted(&self, id: NodeId) -> bool {
        self.state.borrow().deleted.contains(&id)
    }

    pub fn deleted_count(&self) -> usize {
        self.state.borrow().deleted.len()
    }

    pub fn created_count(&self) -> usize {
        (self.state.borrow().next_node - 1) as usize
    }

    pub fn live_nodes(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn outdated_count(&self, id: NodeId) -> usize {
        self.state.borrow().outdated.get(&id).copied().unwrap_or(0)
    }

    pub fn material_of(&self, id: NodeId) -> Option<MaterialId> {
        self.state.borrow().nodes.get(&id).map(|node| node.material)
    }

    pub fn is_material_deleted(&self, id: MaterialId) -> bool {
        self.state.borrow().deleted_materials.contains(&id)
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.state
            .borrow()
            .nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// `id` and everything below it
    pub fn subtree_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut subtree = vec![id];
        let mut i = 0;
        while i < subtree.len() {
            let children = self.children_of(subtree[i]);
            subtree.extend(children);
            i += 1;
        }
        subtree
    }

    pub fn handle_of(&self, id: NodeId) -> Option<RawHandle> {
        self.state.borrow().nodes.get(&id).and_then(|node| node.handle)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.state.borrow().root
    }

    pub fn buffer_registrations(&self) -> usize {
        self.state.borrow().buffer_registrations
    }

    /// Drop every reference whose edge was removed, including edges lost
    /// because their parent was deleted along the way.
    pub fn release_detached(&self, scene: &Scene) -> Result<usize> {
        let mut released = 0;
        loop {
            let batch = std::mem::take(&mut self.state.borrow_mut().pending_drop);
            if batch.is_empty() {
                return Ok(released);
            }
            for handle in batch {
                scene.drop_handle(handle)?;
                released += 1;
            }
        }
    }

    /// Drop every reference the host holds, as on shutdown.
    pub fn release_all(&self, scene: &Scene) -> Result<usize> {
        let mut released = 0;
        loop {
            let batch: Vec<RawHandle> = {
                let mut state = self.state.borrow_mut();
                let mut batch = std::mem::take(&mut state.held);
                batch.append(&mut state.pending_drop);
                batch
            };
            if batch.is_empty() {
                return Ok(released);
            }
            for handle in batch {
                scene.drop_handle(handle)?;
                released += 1;
            }
        }
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for RecordingHost {
    fn set_buffers(&self, _pose: *mut f32, _transform: *mut f32) {
        self.state.borrow_mut().buffer_registrations += 1;
    }

    fn set_root(&self, id: NodeId, handle: RawHandle) {
        let mut state = self.state.borrow_mut();
        state.root = Some(id);
        state.held.push(handle);
    }

    fn create_node(&self, material: MaterialId) -> NodeId {
        let mut state = self.state.borrow_mut();
        if state.nodes.len() >= state.node_capacity {
            return NodeId::EXHAUSTED;
        }
        let id = NodeId(state.next_node);
        state.next_node += 1;
        state.nodes.insert(
            id,
            HostNode {
                parent: None,
                children: Vec::new(),
                handle: None,
                material,
            },
        );
        id
    }

    fn set_node_handle(&self, id: NodeId, handle: RawHandle) {
        let mut state = self.state.borrow_mut();
        let node = state.nodes.get_mut(&id).expect("handle for unknown node");
        node.handle = Some(handle);
    }

    fn delete_node(&self, id: NodeId) {
        let mut state = self.state.borrow_mut();
        assert!(!state.deleted.contains(&id), "{id} deleted twice");
        state.detach(id);
        let node = state.nodes.remove(&id).expect("delete of unknown node");
        for child in node.children {
            let handle = state.nodes.get_mut(&child).and_then(|child| {
                child.parent = None;
                child.handle
            });
            if let Some(handle) = handle {
                state.unhold(handle);
            }
        }
        if state.root == Some(id) {
            state.root = None;
        }
        state.deleted.push(id);
    }

    fn add_child(&self, parent: NodeId, child: NodeId) {
        let mut state = self.state.borrow_mut();
        state.detach(child);
        let handle = state.nodes[&child].handle.expect("child without handle");
        state.held.push(handle);
        state.nodes.get_mut(&child).expect("unknown child").parent = Some(parent);
        state
            .nodes
            .get_mut(&parent)
            .expect("unknown parent")
            .children
            .push(child);
    }

    fn get_children(&self, parent: NodeId, out: &mut [RawHandle]) -> usize {
        let state = self.state.borrow();
        let Some(node) = state.nodes.get(&parent) else {
            return 0;
        };
        for (slot, child) in out.iter_mut().zip(&node.children) {
            *slot = state.nodes[child].handle.expect("child without handle");
        }
        node.children.len()
    }

    fn remove_from_parent(&self, id: NodeId) {
        self.state.borrow_mut().detach(id);
    }

    fn mark_transform_outdated(&self, id: NodeId) {
        *self.state.borrow_mut().outdated.entry(id).or_insert(0) += 1;
    }

    fn set_material(&self, id: NodeId, material: MaterialId) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&id) {
            node.material = material;
        }
    }

    fn create_material(&self, image: ImageId, _r: f32, _g: f32, _b: f32) -> MaterialId {
        let mut state = self.state.borrow_mut();
        if state.materials.len() >= state.material_capacity {
            return MaterialId::EXHAUSTED;
        }
        let id = MaterialId(state.next_material);
        state.next_material += 1;
        state.materials.insert(id, image);
        id
    }

    fn delete_material(&self, id: MaterialId) {
        let mut state = self.state.borrow_mut();
        assert!(!state.deleted_materials.contains(&id), "{id} deleted twice");
        state.materials.remove(&id);
        state.deleted_materials.push(id);
    }

    fn random(&self) -> f32 {
        self.state.borrow().random
    }

    fn window_size(&self) -> (i32, i32) {
        self.state.borrow().window
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Share `host` with a fresh scene, keeping a typed handle for assertions.
pub fn scene_with_host(host: RecordingHost) -> (Rc<RecordingHost>, Scene) {
    init_logging();
    let host = Rc::new(host);
    let scene = Scene::new(host.clone());
    (host, scene)
}

/// A plain node with its own white material
pub fn plain(scene: &Scene) -> NodeHandle {
    let material: Material = scene
        .create_material(ImageId::SOLID, 1.0, 1.0, 1.0)
        .expect("material");
    scene.create(&material, NodeKind::Plain).expect("node")
}
