//! Composition of per-link DH transforms into base- and world-frame poses.
//!
//! All functions here are pure: they read the chain's current joint
//! variables and return fresh matrices. Nothing is cached, so every result
//! reflects the latest joint-variable writes.

use nalgebra::{Matrix3xX, Matrix4, Vector3};

use crate::chain::ManipulatorChain;
use crate::link::DhRow;

/// Standard DH homogeneous transform for a row `[θ, d, a, α]`
///
/// ```text
/// [ cosθ, -sinθ·cosα,  sinθ·sinα, a·cosθ ]
/// [ sinθ,  cosθ·cosα, -cosθ·sinα, a·sinθ ]
/// [    0,      sinα,       cosα,      d  ]
/// [    0,         0,          0,      1  ]
/// ```
pub fn dh_transform(row: &DhRow) -> Matrix4<f64> {
    let (st, ct) = row.theta.sin_cos();
    let (sa, ca) = row.alpha.sin_cos();

    #[rustfmt::skip]
    let transform = Matrix4::new(
        ct, -st * ca,  st * sa, row.a * ct,
        st,  ct * ca, -ct * sa, row.a * st,
        0.0,      sa,       ca,      row.d,
        0.0,     0.0,      0.0,        1.0,
    );
    transform
}

/// Local transform of every link, in kinematic order
pub fn local_transforms(chain: &ManipulatorChain) -> Vec<Matrix4<f64>> {
    chain.links().iter().map(|link| link.local_transform()).collect()
}

/// Cumulative transforms: `B[i] = L[0] · L[1] · … · L[i]`
///
/// Each `B[i]` expresses frame `i` in the chain's base coordinates. The
/// chain's world base pose is not applied here; see [`world_transforms`].
pub fn base_transforms(local: &[Matrix4<f64>]) -> Vec<Matrix4<f64>> {
    local
        .iter()
        .scan(Matrix4::identity(), |accumulated, transform| {
            *accumulated *= transform;
            Some(*accumulated)
        })
        .collect()
}

/// End-effector pose in base coordinates
pub fn tool_transform(chain: &ManipulatorChain) -> Matrix4<f64> {
    chain
        .links()
        .iter()
        .fold(Matrix4::identity(), |accumulated, link| {
            accumulated * link.local_transform()
        })
}

/// Cumulative transforms with the chain's base pose composed on the left
pub fn world_transforms(chain: &ManipulatorChain) -> Vec<Matrix4<f64>> {
    let base = chain.base();
    base_transforms(&local_transforms(chain))
        .into_iter()
        .map(|transform| base * transform)
        .collect()
}

/// End-effector pose in world coordinates
pub fn world_tool_transform(chain: &ManipulatorChain) -> Matrix4<f64> {
    chain.base() * tool_transform(chain)
}

/// Joint positions in base coordinates, one column per joint
///
/// Column 0 is the base-frame origin. Column `i` (for `i >= 1`) is the
/// translation of `base_transforms[i - 1]`: a joint sits at the origin of the
/// frame before it.
pub fn joint_positions(chain: &ManipulatorChain) -> Matrix3xX<f64> {
    let cumulative = base_transforms(&local_transforms(chain));
    let mut positions = Matrix3xX::zeros(chain.dof());
    for (column, previous) in cumulative.iter().take(chain.dof() - 1).enumerate() {
        positions.set_column(column + 1, &translation(previous));
    }
    positions
}

/// Translation part of a homogeneous transform
pub fn translation(transform: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)])
}

/// Flatten a transform to 16 doubles in column-major order (Eigen's default)
pub fn to_column_major(transform: &Matrix4<f64>) -> [f64; 16] {
    let mut result = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            result[col * 4 + row] = transform[(row, col)];
        }
    }
    result
}
