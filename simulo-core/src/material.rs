/// Materials: an image tinted by an RGB colour, shared between nodes
use std::rc::Rc;

use log::debug;
use nalgebra::Vector3;

use crate::error::{Result, SceneError};
use crate::host::{Host, ImageId, MaterialId};

struct MaterialInner {
    id: MaterialId,
    image: ImageId,
    tint: Vector3<f32>,
    host: Rc<dyn Host>,
}

impl Drop for MaterialInner {
    fn drop(&mut self) {
        debug!("Deleting {}", self.id);
        self.host.delete_material(self.id);
    }
}

/// Shared reference to a host material. Cloning shares the same host entry;
/// the entry is deleted once the last clone is gone.
#[derive(Clone)]
pub struct Material(Rc<MaterialInner>);

impl Material {
    pub fn new(host: &Rc<dyn Host>, image: ImageId, tint: Vector3<f32>) -> Result<Self> {
        let id = host.create_material(image, tint.x, tint.y, tint.z);
        if id == MaterialId::EXHAUSTED {
            return Err(SceneError::ResourceExhausted {
                resource: "materials",
            });
        }
        debug!("Created {} tint={:?}", id, tint);
        Ok(Material(Rc::new(MaterialInner {
            id,
            image,
            tint,
            host: Rc::clone(host),
        })))
    }

    pub fn id(&self) -> MaterialId {
        self.0.id
    }

    pub fn image(&self) -> ImageId {
        self.0.image
    }

    pub fn tint(&self) -> Vector3<f32> {
        self.0.tint
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("id", &self.0.id)
            .field("tint", &self.0.tint)
            .finish()
    }
}
