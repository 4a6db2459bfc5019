/// 4x4 affine matrix algebra and per-node transform state
use nalgebra::{Matrix4, Vector2, Vector3};

/// Number of floats in a flattened 4x4 matrix
pub const TRANSFORM_FLOATS: usize = 16;

/// Position, rotation (radians, around +Z) and non-uniform scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub position: Vector2<f32>,
    pub rotation: f32,
    pub scale: Vector2<f32>,
}

impl TransformState {
    pub fn new(position: Vector2<f32>, rotation: f32, scale: Vector2<f32>) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local-to-world matrix: `translation * rotation_z * scale`
    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::compose(&[
            Transform::translation(self.position.x, self.position.y, 0.0),
            Transform::rotation_z(self.rotation),
            Transform::scale(self.scale.x, self.scale.y, 1.0),
        ])
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            position: Vector2::zeros(),
            rotation: 0.0,
            scale: Vector2::new(1.0, 1.0),
        }
    }
}

/// Transform builder for 2D-in-3D transformations.
///
/// Products follow the column-vector convention: applying `a * b` to a point
/// applies `b` first, then `a`.
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4<f32> {
        Matrix4::identity()
    }

    /// Create a translation matrix
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a rotation matrix around the +Z axis
    pub fn rotation_z(angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, 0.0, angle))
    }

    /// Create a scale matrix
    pub fn scale(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Multiply matrices left to right; the last one is applied to points first.
    pub fn compose(matrices: &[Matrix4<f32>]) -> Matrix4<f32> {
        matrices
            .iter()
            .fold(Matrix4::identity(), |acc, matrix| acc * matrix)
    }

    /// Flatten into row-major order, the layout of the shared transform buffer
    pub fn to_row_major(matrix: &Matrix4<f32>) -> [f32; TRANSFORM_FLOATS] {
        let mut out = [0.0; TRANSFORM_FLOATS];
        // nalgebra stores columns contiguously, so the transpose's storage is row-major
        out.copy_from_slice(matrix.transpose().as_slice());
        out
    }

    pub fn from_row_major(data: &[f32; TRANSFORM_FLOATS]) -> Matrix4<f32> {
        Matrix4::from_row_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const EPSILON: f32 = 1e-4;

    fn random_matrix(rng: &mut StdRng) -> Matrix4<f32> {
        Matrix4::from_fn(|_, _| rng.gen_range(-4.0..4.0))
    }

    #[test]
    fn test_identity_constructors() {
        let identity = Matrix4::identity();
        assert!((Transform::rotation_z(0.0) - identity).norm() < 1e-6);
        assert!((Transform::scale(1.0, 1.0, 1.0) - identity).norm() < 1e-6);
        assert!((Transform::translation(0.0, 0.0, 0.0) - identity).norm() < 1e-6);
        assert_eq!(Transform::identity(), identity);
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let a = Transform::translation(3.0, -2.0, 0.0);
        let b = Transform::rotation_z(std::f32::consts::FRAC_PI_2);
        let p = Point3::new(1.0, 0.0, 0.0);

        let combined = (a * b).transform_point(&p);
        let stepwise = a.transform_point(&b.transform_point(&p));

        assert!((combined - stepwise).norm() < 1e-6);
        // rotate (1, 0) to (0, 1), then translate
        assert!((combined - Point3::new(3.0, -1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_multiplication_is_associative() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..64 {
            let a = random_matrix(&mut rng);
            let b = random_matrix(&mut rng);
            let c = random_matrix(&mut rng);
            let left = (a * b) * c;
            let right = a * (b * c);
            assert!(
                (left - right).norm() < EPSILON * left.norm().max(1.0),
                "associativity drifted: {left} vs {right}"
            );
        }
    }

    #[test]
    fn test_state_matrix_matches_composition() {
        let state = TransformState::new(Vector2::new(12.0, -7.5), 0.75, Vector2::new(2.0, 0.5));
        let expected = Transform::translation(12.0, -7.5, 0.0)
            * Transform::rotation_z(0.75)
            * Transform::scale(2.0, 0.5, 1.0);
        assert!((state.matrix() - expected).norm() < 1e-6);
    }

    #[test]
    fn test_row_major_layout() {
        let matrix = Transform::translation(5.0, 6.0, 7.0);
        let flat = Transform::to_row_major(&matrix);
        // translation sits in the last column, i.e. at the end of the first three rows
        assert_eq!(flat[3], 5.0);
        assert_eq!(flat[7], 6.0);
        assert_eq!(flat[11], 7.0);
        assert_eq!(flat[15], 1.0);
        assert_eq!(Transform::from_row_major(&flat), matrix);
    }
}
