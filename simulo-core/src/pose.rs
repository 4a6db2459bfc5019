/// Skeleton snapshots delivered through the shared pose buffer
use nalgebra::Vector2;

/// Keypoints per pose
pub const KEYPOINTS: usize = 17;

/// Number of floats in the shared pose buffer: one (x, y) pair per keypoint
pub const POSE_FLOATS: usize = KEYPOINTS * 2;

/// COCO keypoints in buffer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keypoint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Keypoint {
    pub const ALL: [Keypoint; KEYPOINTS] = [
        Keypoint::Nose,
        Keypoint::LeftEye,
        Keypoint::RightEye,
        Keypoint::LeftEar,
        Keypoint::RightEar,
        Keypoint::LeftShoulder,
        Keypoint::RightShoulder,
        Keypoint::LeftElbow,
        Keypoint::RightElbow,
        Keypoint::LeftWrist,
        Keypoint::RightWrist,
        Keypoint::LeftHip,
        Keypoint::RightHip,
        Keypoint::LeftKnee,
        Keypoint::RightKnee,
        Keypoint::LeftAnkle,
        Keypoint::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Immutable copy of the pose buffer taken when the host signals an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    data: [f32; POSE_FLOATS],
}

impl Pose {
    pub fn from_buffer(data: [f32; POSE_FLOATS]) -> Self {
        Self { data }
    }

    pub fn keypoint(&self, keypoint: Keypoint) -> Vector2<f32> {
        let i = keypoint.index() * 2;
        Vector2::new(self.data[i], self.data[i + 1])
    }

    pub fn nose(&self) -> Vector2<f32> {
        self.keypoint(Keypoint::Nose)
    }

    pub fn left_wrist(&self) -> Vector2<f32> {
        self.keypoint(Keypoint::LeftWrist)
    }

    pub fn right_wrist(&self) -> Vector2<f32> {
        self.keypoint(Keypoint::RightWrist)
    }

    pub fn keypoints(&self) -> impl Iterator<Item = (Keypoint, Vector2<f32>)> + '_ {
        Keypoint::ALL
            .into_iter()
            .map(move |k| (k, self.keypoint(k)))
    }

    pub fn as_array(&self) -> &[f32; POSE_FLOATS] {
        &self.data
    }
}
