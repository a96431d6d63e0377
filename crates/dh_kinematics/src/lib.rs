//! # DH Kinematics
//!
//! Forward kinematics and geometric Jacobians for serial chains of rigid
//! links described by Denavit-Hartenberg parameters.
//!
//! ## Features
//!
//! - Revolute and prismatic links with clamped joint variables
//! - Composition of local DH transforms into base- and world-frame poses
//! - Joint positions and the 6×N geometric Jacobian
//! - Serializable chain descriptions (`serde` feature)
//!
//! ## Example
//!
//! ```rust
//! use dh_kinematics::{DhGeometry, JointLink, ManipulatorChain, transform};
//!
//! let links = vec![
//!     JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap(),
//!     JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap(),
//! ];
//! let mut chain = ManipulatorChain::new(links).unwrap();
//! chain.set_joint_vector(&[std::f64::consts::FRAC_PI_2, 0.0]).unwrap();
//!
//! let tool = transform::translation(&transform::tool_transform(&chain));
//! assert!((tool.y - 2.0).abs() < 1e-12);
//! ```

pub mod chain;
#[cfg(feature = "serde")]
pub mod description;
pub mod jacobian;
pub mod link;
pub mod transform;

pub use chain::ManipulatorChain;
#[cfg(feature = "serde")]
pub use description::{ChainDescription, LinkDescription};
pub use jacobian::jacobian;
pub use link::{DhGeometry, DhRow, DynamicProps, JointLimits, JointLink, JointType};
pub use nalgebra::{Matrix3xX, Matrix4, Matrix6xX, Vector3};

/// Common result type for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for chain construction and joint updates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A vector or matrix input has the wrong number of elements
    #[error("Invalid {field}: expected {expected} elements, got {actual}")]
    InvalidShape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An input that must be finite is NaN or infinite
    #[error("Invalid {field}: values must be finite")]
    NonFinite { field: &'static str },

    /// Lower joint limit above the upper one
    #[error("Invalid joint limits: min {min} is greater than max {max}")]
    InvalidLimits { min: f64, max: f64 },

    /// Link mass below zero
    #[error("Invalid mass {mass}: must not be negative")]
    NegativeMass { mass: f64 },

    /// A chain needs at least one link
    #[error("A manipulator chain needs at least one link")]
    EmptyChain,

    /// Joint vector length does not match the chain
    #[error("Expected {expected} joint values, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    /// Link index past the end of the chain
    #[error("Link index {index} out of range for chain of {len} links")]
    LinkIndexOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidShape {
            field: "geometry",
            expected: 4,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Invalid geometry: expected 4 elements, got 2");
        assert_eq!(
            Error::JointCountMismatch {
                expected: 6,
                actual: 5
            }
            .to_string(),
            "Expected 6 joint values, got 5"
        );
    }

    #[test]
    fn test_chain_debug() {
        let link = JointLink::revolute(DhGeometry::default())
            .unwrap()
            .with_name("debug_link");
        let chain = ManipulatorChain::new(vec![link]).unwrap();
        let debug_str = format!("{:?}", chain);
        assert!(debug_str.contains("debug_link"));
    }

    #[test]
    fn test_reexported_jacobian() {
        let link = JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap();
        let chain = ManipulatorChain::new(vec![link]).unwrap();
        let j = jacobian(&chain);
        assert_eq!((j.nrows(), j.ncols()), (6, 1));
    }
}
