use std::fmt;

use nalgebra::{DVector, Matrix4, MatrixXx4, Vector3};
use tracing::debug;

use crate::link::JointLink;
use crate::{Error, Result};

/// Standard gravity along -z, carried for consumers that model dynamics
pub const DEFAULT_GRAVITY: [f64; 3] = [0.0, 0.0, -9.81];

/// An ordered serial chain of links from base to tip
///
/// The chain owns its links. Joint variables live only in the links, so the
/// joint vector and DH table are always read fresh from them.
#[derive(Clone, Debug)]
pub struct ManipulatorChain {
    /// Links in kinematic order, never empty
    links: Vec<JointLink>,

    /// World to base transform
    base: Matrix4<f64>,

    gravity: Vector3<f64>,
}

impl ManipulatorChain {
    /// Create a chain from links ordered base to tip, with an identity base
    ///
    /// # Errors
    /// Returns [`Error::EmptyChain`] if `links` is empty.
    ///
    /// # Example
    /// ```rust
    /// use dh_kinematics::{DhGeometry, JointLink, ManipulatorChain};
    ///
    /// let shoulder = JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap();
    /// let elbow = JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap();
    /// let chain = ManipulatorChain::new(vec![shoulder, elbow]).unwrap();
    /// assert_eq!(chain.dof(), 2);
    /// ```
    pub fn new(links: Vec<JointLink>) -> Result<Self> {
        if links.is_empty() {
            return Err(Error::EmptyChain);
        }
        debug!(dof = links.len(), "constructed manipulator chain");
        Ok(Self {
            links,
            base: Matrix4::identity(),
            gravity: Vector3::from(DEFAULT_GRAVITY),
        })
    }

    /// Set the world to base transform
    ///
    /// The matrix is taken as a rigid transform; orthonormality is the
    /// caller's responsibility.
    pub fn with_base(mut self, base: Matrix4<f64>) -> Self {
        self.base = base;
        self
    }

    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Number of joints
    pub fn dof(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[JointLink] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&JointLink> {
        self.links.get(index)
    }

    pub fn link_mut(&mut self, index: usize) -> Option<&mut JointLink> {
        self.links.get_mut(index)
    }

    pub fn base(&self) -> &Matrix4<f64> {
        &self.base
    }

    pub fn set_base(&mut self, base: Matrix4<f64>) {
        self.base = base;
    }

    pub fn gravity(&self) -> &Vector3<f64> {
        &self.gravity
    }

    /// Set one joint variable, saturated to that link's limits
    pub fn set_joint_variable(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.links.len();
        let link = self
            .links
            .get_mut(index)
            .ok_or(Error::LinkIndexOutOfRange { index, len })?;
        link.set_joint_variable(value);
        Ok(())
    }

    /// Set every joint variable at once, each saturated to its limits
    ///
    /// # Errors
    /// Returns [`Error::JointCountMismatch`] if `values.len() != self.dof()`;
    /// no joint is modified in that case.
    pub fn set_joint_vector(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.links.len() {
            return Err(Error::JointCountMismatch {
                expected: self.links.len(),
                actual: values.len(),
            });
        }
        for (link, &value) in self.links.iter_mut().zip(values) {
            link.set_joint_variable(value);
        }
        Ok(())
    }

    /// Current joint variables, read from the links
    pub fn joint_vector(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.links.len(),
            self.links.iter().map(JointLink::joint_variable),
        )
    }

    /// N×4 table of evaluated DH rows, columns `[θ, d, a, α]`
    pub fn dh_table(&self) -> MatrixXx4<f64> {
        let rows: Vec<[f64; 4]> = self.links.iter().map(|link| link.dh_row().to_array()).collect();
        MatrixXx4::from_fn(rows.len(), |row, col| rows[row][col])
    }
}

impl fmt::Display for ManipulatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ManipulatorChain ({} dof)", self.dof())?;
        for (index, link) in self.links.iter().enumerate() {
            writeln!(f, "  [{}] {}", index, link)?;
        }
        Ok(())
    }
}
