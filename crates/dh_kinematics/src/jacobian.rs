//! Geometric Jacobian of a [`ManipulatorChain`] at its current configuration.
//!
//! Column `i` is `[Jv_i; Jw_i]`, where the axis of joint `i` is the third
//! column of that link's *local* transform and the joint origin comes from
//! [`joint_positions`](crate::transform::joint_positions):
//!
//! - revolute: `Jv_i = axis_i × (tool - joint_i)`, `Jw_i = axis_i`
//! - prismatic: `Jv_i = axis_i`, `Jw_i = 0`
//!
//! For chains where a later joint's local z axis differs from its base-frame
//! z axis (non-zero twist with preceding joints moved) the result is not the
//! textbook geometric Jacobian. Planar chains (all `alpha = 0`) are exact.

use nalgebra::{Matrix6xX, Vector3, Vector6};
use tracing::trace;

use crate::chain::ManipulatorChain;
use crate::link::JointType;
use crate::transform::{joint_positions, tool_transform, translation};
use crate::{Error, Result};

/// Compute the 6×N Jacobian, rows `[vx, vy, vz, wx, wy, wz]`
///
/// Recomputed from the links on every call.
pub fn jacobian(chain: &ManipulatorChain) -> Matrix6xX<f64> {
    let tool = translation(&tool_transform(chain));
    let positions = joint_positions(chain);
    let mut jacobian = Matrix6xX::zeros(chain.dof());

    for (i, link) in chain.links().iter().enumerate() {
        let axis = link.joint_axis();
        let (linear, angular) = match link.joint_type() {
            JointType::Revolute => {
                let lever = tool - positions.column(i);
                (axis.cross(&lever), axis)
            }
            JointType::Prismatic => (axis, Vector3::zeros()),
        };
        jacobian.set_column(
            i,
            &Vector6::new(
                linear.x, linear.y, linear.z, angular.x, angular.y, angular.z,
            ),
        );
    }

    trace!(dof = chain.dof(), "evaluated jacobian");
    jacobian
}

/// Tool twist `J · q̇` for the given joint velocities
///
/// # Errors
/// Returns [`Error::JointCountMismatch`] if `joint_velocities` does not have
/// one entry per joint.
pub fn tool_twist(chain: &ManipulatorChain, joint_velocities: &[f64]) -> Result<Vector6<f64>> {
    if joint_velocities.len() != chain.dof() {
        return Err(Error::JointCountMismatch {
            expected: chain.dof(),
            actual: joint_velocities.len(),
        });
    }
    let jacobian = jacobian(chain);
    Ok(jacobian
        .column_iter()
        .zip(joint_velocities)
        .fold(Vector6::zeros(), |twist, (column, &rate)| twist + column * rate))
}
