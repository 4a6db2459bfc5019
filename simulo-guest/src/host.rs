/// `Host` implementation over the runtime's wasm imports
use simulo_core::{Host, ImageId, MaterialId, NodeId, RawHandle};

#[link(wasm_import_module = "env")]
extern "C" {
    fn simulo_set_buffers(pose: *mut f32, transform: *mut f32);
    fn simulo_set_root(id: u32, handle: u64);
    fn simulo_create_object(material: u32) -> u32;
    fn simulo_set_object_handle(id: u32, handle: u64);
    fn simulo_drop_object(id: u32);
    fn simulo_add_object_child(parent: u32, child: u32);
    fn simulo_get_children(id: u32, children: *mut u64, max: u32) -> u32;
    fn simulo_remove_object_from_parent(id: u32);
    fn simulo_mark_transform_outdated(id: u32);
    fn simulo_set_object_material(id: u32, material: u32);
    fn simulo_random() -> f32;
    fn simulo_window_width() -> i32;
    fn simulo_window_height() -> i32;
    fn simulo_create_material(image: u32, r: f32, g: f32, b: f32) -> u32;
    fn simulo_delete_material(id: u32);
}

/// The runtime hosting this module. Stateless: all state lives host-side.
pub struct WasmHost;

impl Host for WasmHost {
    fn set_buffers(&self, pose: *mut f32, transform: *mut f32) {
        unsafe { simulo_set_buffers(pose, transform) }
    }

    fn set_root(&self, id: NodeId, handle: RawHandle) {
        unsafe { simulo_set_root(id.0, handle.as_u64()) }
    }

    fn create_node(&self, material: MaterialId) -> NodeId {
        NodeId(unsafe { simulo_create_object(material.0) })
    }

    fn set_node_handle(&self, id: NodeId, handle: RawHandle) {
        unsafe { simulo_set_object_handle(id.0, handle.as_u64()) }
    }

    fn delete_node(&self, id: NodeId) {
        unsafe { simulo_drop_object(id.0) }
    }

    fn add_child(&self, parent: NodeId, child: NodeId) {
        unsafe { simulo_add_object_child(parent.0, child.0) }
    }

    fn get_children(&self, parent: NodeId, out: &mut [RawHandle]) -> usize {
        // RawHandle is a transparent u64
        let total = unsafe {
            simulo_get_children(parent.0, out.as_mut_ptr().cast::<u64>(), out.len() as u32)
        };
        total as usize
    }

    fn remove_from_parent(&self, id: NodeId) {
        unsafe { simulo_remove_object_from_parent(id.0) }
    }

    fn mark_transform_outdated(&self, id: NodeId) {
        unsafe { simulo_mark_transform_outdated(id.0) }
    }

    fn set_material(&self, id: NodeId, material: MaterialId) {
        unsafe { simulo_set_object_material(id.0, material.0) }
    }

    fn create_material(&self, image: ImageId, r: f32, g: f32, b: f32) -> MaterialId {
        MaterialId(unsafe { simulo_create_material(image.0, r, g, b) })
    }

    fn delete_material(&self, id: MaterialId) {
        unsafe { simulo_delete_material(id.0) }
    }

    fn random(&self) -> f32 {
        unsafe { simulo_random() }
    }

    fn window_size(&self) -> (i32, i32) {
        unsafe { (simulo_window_width(), simulo_window_height()) }
    }
}
