/// Simulo Core Library - Guest-side scene graph
///
/// This library holds everything the guest module does behind the host
/// boundary: matrix algebra, the node tree and its ownership rules, the
/// handle table shared with the host, and the lifecycle entry points.

pub mod behavior;
pub mod buffers;
pub mod config;
pub mod error;
pub mod graph;
pub mod handle;
pub mod host;
pub mod material;
pub mod node;
pub mod pose;
pub mod scene;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use behavior::{Game, Particle};
pub use buffers::SharedBuffers;
pub use config::GameConfig;
pub use error::{status, Result, SceneError, STATUS_OK};
pub use graph::{Children, MAX_CHILDREN};
pub use handle::{HandleTable, RawHandle};
pub use host::{Host, ImageId, MaterialId, NodeId};
pub use material::Material;
pub use node::{Node, NodeHandle, NodeKind, NodeState};
pub use pose::{Keypoint, Pose, KEYPOINTS, POSE_FLOATS};
pub use scene::Scene;
pub use transform::{Transform, TransformState, TRANSFORM_FLOATS};
