/// Opaque handles and the guest-side table backing them.
///
/// Every node the host knows about lives in one slot of `HandleTable`. The
/// slot owns a single strong reference to the node and counts how many
/// references the host currently holds through the slot's `RawHandle`.
use std::fmt;

use log::debug;

use crate::error::{Result, SceneError};
use crate::node::NodeHandle;

/// Value passed across the boundary in place of a node: slot index in the low
/// 32 bits, slot generation in the high 32 bits. Index 0 is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawHandle(u64);

impl RawHandle {
    pub const NIL: RawHandle = RawHandle(0);

    pub const fn from_parts(index: u32, generation: u32) -> Self {
        RawHandle(((generation as u64) << 32) | index as u64)
    }

    pub const fn from_u64(value: u64) -> Self {
        RawHandle(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn is_nil(self) -> bool {
        self.index() == 0
    }
}

impl Default for RawHandle {
    fn default() -> Self {
        RawHandle::NIL
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

struct Entry {
    node: NodeHandle,
    host_refs: u32,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Generational slot arena of nodes shared with the host
pub struct HandleTable {
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
}

impl HandleTable {
    pub fn new() -> Self {
        // Slot 0 backs the nil handle and is never occupied.
        Self {
            slots: vec![Slot {
                generation: 0,
                entry: None,
            }],
            free_indices: Vec::new(),
        }
    }

    /// Hand one reference to the host. The first export of a node allocates
    /// its slot; later exports reuse it and bump the host reference count.
    /// Returns the handle and whether it was newly issued.
    pub fn export(&mut self, node: NodeHandle) -> (RawHandle, bool) {
        if let Some(handle) = node.raw() {
            if let Ok(entry) = self.entry_mut(handle) {
                entry.host_refs += 1;
                // the slot already owns a strong reference; `node` is released here
                return (handle, false);
            }
        }

        let index = match self.free_indices.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let handle = RawHandle::from_parts(index, slot.generation);
        node.set_raw(Some(handle));
        debug!("Issued handle {} for {}", handle, node.id());
        slot.entry = Some(Entry { node, host_refs: 1 });
        (handle, true)
    }

    /// Borrow the node behind a host handle without changing any count.
    pub fn get(&self, handle: RawHandle) -> Result<&NodeHandle> {
        self.entry(handle).map(|entry| &entry.node)
    }

    /// A new guest-owned reference to the node behind a host handle.
    pub fn retain(&self, handle: RawHandle) -> Result<NodeHandle> {
        self.get(handle).map(NodeHandle::retain)
    }

    /// Give back one host reference. When the host holds none any more the
    /// slot is freed and the table's reference is returned so the caller can
    /// release it outside of any borrow of the table.
    pub fn release(&mut self, handle: RawHandle) -> Result<Option<NodeHandle>> {
        let entry = self.entry_mut(handle)?;
        entry.host_refs -= 1;
        if entry.host_refs > 0 {
            return Ok(None);
        }

        let slot = &mut self.slots[handle.index() as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let entry = slot.entry.take().ok_or(SceneError::InvalidHandle { handle })?;
        self.free_indices.push(handle.index());
        entry.node.set_raw(None);
        debug!("Released handle {} for {}", handle, entry.node.id());
        Ok(Some(entry.node))
    }

    /// Host references outstanding for `handle`
    pub fn host_refs(&self, handle: RawHandle) -> Result<u32> {
        self.entry(handle).map(|entry| entry.host_refs)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.entry.is_none())
    }

    /// Older generations were issued and released; a vacant slot at the
    /// current generation, or any later one, was never issued.
    fn check(&self, handle: RawHandle) -> Result<()> {
        let slot = match self.slots.get(handle.index() as usize) {
            Some(slot) if !handle.is_nil() => slot,
            _ => return Err(SceneError::InvalidHandle { handle }),
        };
        if handle.generation() < slot.generation {
            Err(SceneError::UseAfterDrop { handle })
        } else if handle.generation() == slot.generation && slot.entry.is_some() {
            Ok(())
        } else {
            Err(SceneError::InvalidHandle { handle })
        }
    }

    fn entry(&self, handle: RawHandle) -> Result<&Entry> {
        self.check(handle)?;
        self.slots[handle.index() as usize]
            .entry
            .as_ref()
            .ok_or(SceneError::InvalidHandle { handle })
    }

    fn entry_mut(&mut self, handle: RawHandle) -> Result<&mut Entry> {
        self.check(handle)?;
        self.slots[handle.index() as usize]
            .entry
            .as_mut()
            .ok_or(SceneError::InvalidHandle { handle })
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
