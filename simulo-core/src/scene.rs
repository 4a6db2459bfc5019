/// The scene context and the lifecycle entry points the host invokes.
///
/// One `Scene` exists per guest instance. It owns the handle table, the
/// shared buffers and the root handle, and is passed to every operation that
/// needs them.
use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use log::{debug, trace, warn};
use nalgebra::Matrix4;

use crate::behavior::{self, Game};
use crate::buffers::SharedBuffers;
use crate::config::GameConfig;
use crate::error::{Result, SceneError};
use crate::handle::{HandleTable, RawHandle};
use crate::host::Host;
use crate::node::{NodeHandle, NodeState};

pub struct Scene {
    pub(crate) host: Rc<dyn Host>,
    pub(crate) table: RefCell<HandleTable>,
    buffers: OnceCell<SharedBuffers>,
    root: Cell<Option<RawHandle>>,
}

impl Scene {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            host,
            table: RefCell::new(HandleTable::new()),
            buffers: OnceCell::new(),
            root: Cell::new(None),
        }
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    /// Allocate the shared buffers and announce their addresses to the host.
    /// Only the first call has any effect.
    pub fn register_buffers(&self) {
        if self.buffers.get().is_some() {
            warn!("Shared buffers already registered; keeping the existing ones");
            return;
        }
        let buffers = self.buffers.get_or_init(SharedBuffers::new);
        self.host
            .set_buffers(buffers.pose_ptr(), buffers.transform_ptr());
        debug!("Registered shared buffers");
    }

    /// Start-up sequence: register the buffers, build the root game object
    /// and hand it to the host.
    ///
    /// Once a root is installed later calls leave the scene untouched. A
    /// failed start installs nothing, so calling again retries it.
    pub fn start(&self, config: GameConfig) -> Result<RawHandle> {
        if let Some(root) = self.root.get() {
            warn!("Scene already started with root {}", root);
            return Ok(root);
        }
        if self.buffers.get().is_none() {
            self.register_buffers();
        }
        let root = Game::create(self, config)?;
        self.set_root(root)
    }

    pub fn is_started(&self) -> bool {
        self.root.get().is_some()
    }

    pub fn buffers(&self) -> Result<&SharedBuffers> {
        self.buffers.get().ok_or(SceneError::BufferNotRegistered)
    }

    /// Install the scene root, transferring the reference to the host.
    /// The buffers must be registered first.
    pub fn set_root(&self, root: NodeHandle) -> Result<RawHandle> {
        self.buffers()?;
        let id = root.id();
        root.borrow_mut().set_state(NodeState::Live);
        if let Some(previous) = self.root.get() {
            warn!("Replacing root {} with {}", previous, id);
        }
        let handle = self.export(root);
        self.host.set_root(id, handle);
        self.root.set(Some(handle));
        debug!("Installed root {} ({})", id, handle);
        Ok(handle)
    }

    /// A new reference to the installed root
    pub fn root(&self) -> Result<NodeHandle> {
        let handle = self.root.get().ok_or(SceneError::NoRoot)?;
        self.node(handle)
    }

    /// A new guest-owned reference to the node behind a host handle
    pub fn node(&self, handle: RawHandle) -> Result<NodeHandle> {
        self.table.borrow().retain(handle)
    }

    /// A tracked subject appeared (`alive`) or disappeared. The pose is read
    /// from the shared buffer only for live subjects.
    pub fn pose_update(&self, subject: i32, alive: bool) -> Result<()> {
        let buffers = self.buffers()?;
        let pose = alive.then(|| buffers.read_pose());
        let root = self.root()?;
        trace!("Pose event subject={} alive={}", subject, alive);
        behavior::pose_update(self, &root, subject, pose)
    }

    /// Advance one node by `delta` seconds. The node is only borrowed.
    pub fn update(&self, handle: RawHandle, delta: f32) -> Result<()> {
        self.buffers()?;
        let node = self.node(handle)?;
        behavior::update(self, &node, delta)
    }

    /// Recompute a node's world matrix and write it, row-major, into the
    /// shared transform buffer.
    pub fn recalculate_transform(&self, handle: RawHandle) -> Result<Matrix4<f32>> {
        let buffers = self.buffers()?;
        let node = self.node(handle)?;
        let matrix = node.borrow_mut().recalculate_transform();
        buffers.write_transform(&matrix);
        trace!("Wrote transform of {}", node.id());
        Ok(matrix)
    }

    /// Release one host reference. The node is destroyed when no references
    /// remain anywhere.
    pub fn drop_handle(&self, handle: RawHandle) -> Result<()> {
        let released = self.table.borrow_mut().release(handle)?;
        if let Some(node) = released {
            if self.root.get() == Some(handle) {
                debug!("Root {} dropped", node.id());
                self.root.set(None);
            }
            drop(node);
        }
        Ok(())
    }

    /// Handles the host currently holds at least one reference through
    pub fn live_handles(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn handle_refs(&self, handle: RawHandle) -> Result<u32> {
        self.table.borrow().host_refs(handle)
    }
}
