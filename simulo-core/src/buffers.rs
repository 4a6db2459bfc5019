/// Fixed-size memory regions shared with the host.
///
/// The host writes the pose buffer before a pose event and reads the
/// transform buffer after `recalculate_transform`. Both live in boxed cells so
/// their addresses stay stable for the life of the scene.
use std::cell::Cell;

use nalgebra::Matrix4;

use crate::pose::{Pose, POSE_FLOATS};
use crate::transform::{Transform, TRANSFORM_FLOATS};

pub struct SharedBuffers {
    pose: Box<Cell<[f32; POSE_FLOATS]>>,
    transform: Box<Cell<[f32; TRANSFORM_FLOATS]>>,
}

impl SharedBuffers {
    pub fn new() -> Self {
        Self {
            pose: Box::new(Cell::new([0.0; POSE_FLOATS])),
            transform: Box::new(Cell::new([0.0; TRANSFORM_FLOATS])),
        }
    }

    pub fn pose_ptr(&self) -> *mut f32 {
        self.pose.as_ptr().cast()
    }

    pub fn transform_ptr(&self) -> *mut f32 {
        self.transform.as_ptr().cast()
    }

    /// Copy the current pose buffer contents
    pub fn read_pose(&self) -> Pose {
        Pose::from_buffer(self.pose.get())
    }

    /// Fill the pose buffer the way the host does before a pose event
    pub fn write_pose(&self, data: [f32; POSE_FLOATS]) {
        self.pose.set(data);
    }

    pub fn write_transform(&self, matrix: &Matrix4<f32>) {
        self.transform.set(Transform::to_row_major(matrix));
    }

    /// Row-major contents of the transform buffer
    pub fn read_transform(&self) -> [f32; TRANSFORM_FLOATS] {
        self.transform.get()
    }
}

impl Default for SharedBuffers {
    fn default() -> Self {
        Self::new()
    }
}
