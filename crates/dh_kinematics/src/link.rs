use std::fmt;

use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::transform::dh_transform;
use crate::{Error, Result};

/// Kind of motion a link's joint allows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum JointType {
    /// Joint variable drives θ, the rotation about the previous z axis
    Revolute,
    /// Joint variable drives d, the displacement along the previous z axis
    Prismatic,
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointType::Revolute => write!(f, "revolute"),
            JointType::Prismatic => write!(f, "prismatic"),
        }
    }
}

/// Fixed Denavit-Hartenberg constants of a link
///
/// Exactly one of `theta`/`d` is the offset added to the joint variable,
/// chosen by the link's [`JointType`]. `a` and `alpha` never move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DhGeometry {
    pub theta: f64,
    pub d: f64,
    pub a: f64,
    pub alpha: f64,
}

impl DhGeometry {
    pub fn new(theta: f64, d: f64, a: f64, alpha: f64) -> Self {
        Self { theta, d, a, alpha }
    }

    /// Build from a `[theta, d, a, alpha]` slice
    ///
    /// # Errors
    /// Returns [`Error::InvalidShape`] unless the slice has exactly four elements.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            &[theta, d, a, alpha] => Ok(Self::new(theta, d, a, alpha)),
            _ => Err(Error::InvalidShape {
                field: "geometry",
                expected: 4,
                actual: values.len(),
            }),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.theta, self.d, self.a, self.alpha]
    }

    fn validate(&self) -> Result<()> {
        if self.to_array().iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(Error::NonFinite { field: "geometry" })
        }
    }
}

/// One evaluated row of a DH table, `[θ, d, a, α]`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DhRow {
    pub theta: f64,
    pub d: f64,
    pub a: f64,
    pub alpha: f64,
}

impl DhRow {
    pub fn to_array(&self) -> [f64; 4] {
        [self.theta, self.d, self.a, self.alpha]
    }
}

/// Closed interval a joint variable is saturated to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointLimits {
    min: f64,
    max: f64,
}

impl JointLimits {
    /// Create limits, rejecting NaN bounds and `min > max`
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() {
            return Err(Error::NonFinite { field: "limits" });
        }
        if min > max {
            return Err(Error::InvalidLimits { min, max });
        }
        Ok(Self { min, max })
    }

    /// Limits that never clamp
    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Saturate `value` to `[min, max]`
    ///
    /// NaN saturates to `max`, so the result always lies within the limits.
    pub fn clamp(&self, value: f64) -> f64 {
        self.min.max(self.max.min(value))
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Mass properties carried with a link
///
/// Kinematics never reads these; they travel with the link for consumers
/// that do.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicProps {
    mass: f64,
    center_of_mass: Vector3<f64>,
    inertia: Matrix3<f64>,
}

impl DynamicProps {
    /// # Errors
    /// Rejects a negative or non-finite mass and non-finite vectors.
    pub fn new(mass: f64, center_of_mass: Vector3<f64>, inertia: Matrix3<f64>) -> Result<Self> {
        if !mass.is_finite() {
            return Err(Error::NonFinite { field: "mass" });
        }
        if mass < 0.0 {
            return Err(Error::NegativeMass { mass });
        }
        if center_of_mass.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite {
                field: "center_of_mass",
            });
        }
        if inertia.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite { field: "inertia" });
        }
        Ok(Self {
            mass,
            center_of_mass,
            inertia,
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn center_of_mass(&self) -> &Vector3<f64> {
        &self.center_of_mass
    }

    pub fn inertia(&self) -> &Matrix3<f64> {
        &self.inertia
    }
}

impl Default for DynamicProps {
    fn default() -> Self {
        Self {
            mass: 0.0,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::zeros(),
        }
    }
}

/// A rigid link with one joint variable, described by DH constants
#[derive(Clone, Debug)]
pub struct JointLink {
    /// Name of the link, used only for display
    name: String,

    /// Revolute or prismatic, fixed at construction
    joint_type: JointType,

    /// DH constants not driven by motion
    geometry: DhGeometry,

    /// Copy of the free-variable slot of `geometry`
    offset: f64,

    /// Saturation interval for `joint_variable`
    limits: JointLimits,

    /// Current joint variable, always within `limits`
    joint_variable: f64,

    dynamics: DynamicProps,
}

impl JointLink {
    /// Create a link with unbounded limits and the joint variable at zero
    ///
    /// # Arguments
    /// * `joint_type` - Which DH parameter the joint variable drives
    /// * `geometry` - Constant `(θ₀, d₀, a, α)`
    ///
    /// # Example
    /// ```rust
    /// use dh_kinematics::{DhGeometry, JointLink, JointType};
    ///
    /// let link = JointLink::new(JointType::Revolute, DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap();
    /// assert_eq!(link.joint_variable(), 0.0);
    /// assert_eq!(link.dh_row().a, 1.0);
    /// ```
    pub fn new(joint_type: JointType, geometry: DhGeometry) -> Result<Self> {
        geometry.validate()?;
        let offset = match joint_type {
            JointType::Revolute => geometry.theta,
            JointType::Prismatic => geometry.d,
        };
        Ok(Self {
            name: String::new(),
            joint_type,
            geometry,
            offset,
            limits: JointLimits::unbounded(),
            joint_variable: 0.0,
            dynamics: DynamicProps::default(),
        })
    }

    pub fn revolute(geometry: DhGeometry) -> Result<Self> {
        Self::new(JointType::Revolute, geometry)
    }

    pub fn prismatic(geometry: DhGeometry) -> Result<Self> {
        Self::new(JointType::Prismatic, geometry)
    }

    /// Create a link from an untyped `[theta, d, a, alpha]` slice
    pub fn from_slices(joint_type: JointType, geometry: &[f64]) -> Result<Self> {
        Self::new(joint_type, DhGeometry::from_slice(geometry)?)
    }

    /// Set the joint limits; the current joint variable is re-clamped
    pub fn with_limits(mut self, min: f64, max: f64) -> Result<Self> {
        self.set_limits(min, max)?;
        Ok(self)
    }

    /// Replace the joint limits in place, re-clamping the joint variable
    ///
    /// On error the link is left unchanged.
    pub fn set_limits(&mut self, min: f64, max: f64) -> Result<()> {
        self.limits = JointLimits::new(min, max)?;
        self.joint_variable = self.limits.clamp(self.joint_variable);
        Ok(())
    }

    pub fn with_dynamics(mut self, dynamics: DynamicProps) -> Self {
        self.dynamics = dynamics;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the link name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the joint type
    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    /// Get the constant DH geometry
    pub fn geometry(&self) -> &DhGeometry {
        &self.geometry
    }

    /// Get the offset added to the joint variable
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Get the joint limits
    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    /// Get the dynamic properties
    pub fn dynamics(&self) -> &DynamicProps {
        &self.dynamics
    }

    /// Get the stored (clamped) joint variable
    pub fn joint_variable(&self) -> f64 {
        self.joint_variable
    }

    /// Set the joint variable, saturating it to the joint limits
    ///
    /// Out-of-range values are not an error; the stored value is the clamped one.
    pub fn set_joint_variable(&mut self, value: f64) {
        self.joint_variable = self.limits.clamp(value);
    }

    /// Check if a joint variable is within limits
    pub fn is_within_limits(&self, value: f64) -> bool {
        self.limits.contains(value)
    }

    /// Evaluate the DH row `[θ, d, a, α]` for the current joint variable
    pub fn dh_row(&self) -> DhRow {
        let driven = self.joint_variable + self.offset;
        let (theta, d) = match self.joint_type {
            JointType::Revolute => (driven, self.geometry.d),
            JointType::Prismatic => (self.geometry.theta, driven),
        };
        DhRow {
            theta,
            d,
            a: self.geometry.a,
            alpha: self.geometry.alpha,
        }
    }

    /// Homogeneous transform from the previous frame to this link's frame
    pub fn local_transform(&self) -> Matrix4<f64> {
        dh_transform(&self.dh_row())
    }

    /// Rotation/slide axis: third column of the local transform
    pub fn joint_axis(&self) -> Vector3<f64> {
        let t = self.local_transform();
        Vector3::new(t[(0, 2)], t[(1, 2)], t[(2, 2)])
    }
}

impl fmt::Display for JointLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = self.dh_row();
        write!(
            f,
            "Link '{}' ({}, q: {}, theta: {}, d: {}, a: {}, alpha: {})",
            self.name, self.joint_type, self.joint_variable, row.theta, row.d, row.a, row.alpha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    use test_log::test;

    fn limited_revolute() -> JointLink {
        JointLink::revolute(DhGeometry::new(0.1, 0.2, 0.3, 0.4))
            .unwrap()
            .with_limits(-1.0, 2.0)
            .unwrap()
    }

    #[test]
    fn test_link_creation() {
        let link = JointLink::revolute(DhGeometry::new(0.5, 0.2, 1.0, FRAC_PI_2)).unwrap();
        assert_eq!(link.joint_type(), JointType::Revolute);
        assert_eq!(link.joint_variable(), 0.0);
        assert_eq!(link.offset(), 0.5);
        assert_eq!(link.limits().min(), f64::NEG_INFINITY);
        assert_eq!(link.limits().max(), f64::INFINITY);
        assert_eq!(link.dynamics().mass(), 0.0);
    }

    #[test]
    fn test_prismatic_offset_comes_from_d() {
        let link = JointLink::prismatic(DhGeometry::new(0.5, 0.2, 1.0, 0.0)).unwrap();
        assert_eq!(link.offset(), 0.2);
    }

    #[test]
    fn test_from_slices_rejects_wrong_shape() {
        let err = JointLink::from_slices(JointType::Revolute, &[0.0, 0.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidShape {
                field: "geometry",
                expected: 4,
                actual: 3
            }
        ));
        assert!(JointLink::from_slices(JointType::Revolute, &[0.0, 0.0, 1.0, 0.0]).is_ok());
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let result = JointLink::revolute(DhGeometry::new(f64::NAN, 0.0, 1.0, 0.0));
        assert!(matches!(result, Err(Error::NonFinite { field: "geometry" })));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let result = JointLink::revolute(DhGeometry::default())
            .unwrap()
            .with_limits(1.0, -1.0);
        assert!(matches!(result, Err(Error::InvalidLimits { .. })));
    }

    #[test]
    fn test_nan_limit_rejected() {
        assert!(JointLimits::new(f64::NAN, 1.0).is_err());
        assert!(JointLimits::new(-1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_degenerate_limits_allowed() {
        let mut link = JointLink::revolute(DhGeometry::default())
            .unwrap()
            .with_limits(0.5, 0.5)
            .unwrap();
        assert_eq!(link.joint_variable(), 0.5);
        link.set_joint_variable(-3.0);
        assert_eq!(link.joint_variable(), 0.5);
    }

    #[test]
    fn test_dynamics_validation() {
        let com = Vector3::new(0.0, 0.0, 0.1);
        let inertia = Matrix3::identity();
        assert!(DynamicProps::new(2.0, com, inertia).is_ok());
        assert!(matches!(
            DynamicProps::new(-1.0, com, inertia),
            Err(Error::NegativeMass { .. })
        ));
        assert!(DynamicProps::new(f64::INFINITY, com, inertia).is_err());
        assert!(DynamicProps::new(1.0, Vector3::new(f64::NAN, 0.0, 0.0), inertia).is_err());
    }

    #[test]
    fn test_dynamics_are_inert() {
        let plain = JointLink::revolute(DhGeometry::new(0.0, 0.1, 1.0, 0.3)).unwrap();
        let heavy = plain.clone().with_dynamics(
            DynamicProps::new(50.0, Vector3::new(0.5, 0.0, 0.0), Matrix3::identity() * 3.0)
                .unwrap(),
        );
        assert_eq!(heavy.dynamics().mass(), 50.0);
        assert_eq!(plain.local_transform(), heavy.local_transform());
    }

    #[test]
    fn test_clamp_correctness() {
        let mut link = limited_revolute();
        for v in [-10.0, -1.0, -0.5, 0.0, 1.5, 2.0, 7.0, f64::INFINITY, f64::NEG_INFINITY] {
            link.set_joint_variable(v);
            assert_eq!(link.joint_variable(), f64::max(-1.0, f64::min(2.0, v)));
        }
    }

    #[test]
    fn test_nan_write_saturates_to_upper_limit() {
        let mut link = limited_revolute();
        link.set_joint_variable(f64::NAN);
        assert_eq!(link.joint_variable(), f64::max(-1.0, f64::min(2.0, f64::NAN)));
        assert_eq!(link.joint_variable(), 2.0);
        assert!(link.local_transform().iter().all(|v| v.is_finite()));

        let mut locked = JointLink::revolute(DhGeometry::default())
            .unwrap()
            .with_limits(0.5, 0.5)
            .unwrap();
        locked.set_joint_variable(f64::NAN);
        assert_eq!(locked.joint_variable(), 0.5);
    }

    #[test]
    fn test_clamp_idempotence() {
        let mut link = limited_revolute();
        for v in [-10.0, -0.25, 1.0, 3.5] {
            link.set_joint_variable(v);
            let stored = link.joint_variable();
            link.set_joint_variable(link.joint_variable());
            assert_eq!(link.joint_variable(), stored);
        }
    }

    #[test]
    fn test_with_limits_reclamps_current_value() {
        let mut link = JointLink::revolute(DhGeometry::default()).unwrap();
        link.set_joint_variable(5.0);
        let link = link.with_limits(-1.0, 1.0).unwrap();
        assert_eq!(link.joint_variable(), 1.0);
    }

    #[test]
    fn test_set_limits_failure_leaves_link_unchanged() {
        let mut link = limited_revolute();
        link.set_joint_variable(1.5);
        assert!(link.set_limits(3.0, 2.0).is_err());
        assert_eq!(link.limits().max(), 2.0);
        assert_eq!(link.joint_variable(), 1.5);

        link.set_limits(0.0, 1.0).unwrap();
        assert_eq!(link.joint_variable(), 1.0);
    }

    #[test]
    fn test_is_within_limits() {
        let link = limited_revolute();
        assert!(link.is_within_limits(0.0));
        assert!(link.is_within_limits(2.0));
        assert!(!link.is_within_limits(2.1));
        assert!(!link.is_within_limits(-1.1));
    }

    #[test]
    fn test_revolute_dh_row() {
        let mut link = JointLink::revolute(DhGeometry::new(0.25, 0.5, 1.0, PI)).unwrap();
        link.set_joint_variable(1.0);
        let row = link.dh_row();
        assert_relative_eq!(row.theta, 1.25);
        assert_eq!(row.d, 0.5);
        assert_eq!(row.a, 1.0);
        assert_eq!(row.alpha, PI);
    }

    #[test]
    fn test_prismatic_dh_row() {
        let mut link = JointLink::prismatic(DhGeometry::new(0.25, 0.5, 1.0, PI)).unwrap();
        link.set_joint_variable(2.0);
        let row = link.dh_row();
        assert_eq!(row.theta, 0.25);
        assert_relative_eq!(row.d, 2.5);
        assert_eq!(row.a, 1.0);
        assert_eq!(row.alpha, PI);
    }

    #[test]
    fn test_local_transform_identity() {
        let link = JointLink::revolute(DhGeometry::default()).unwrap();
        assert_relative_eq!(link.local_transform(), Matrix4::identity());
    }

    #[test]
    fn test_local_transform_keeps_x_translation() {
        // theta = d = 0: rotation depends only on alpha, translation is along x
        let link = JointLink::revolute(DhGeometry::new(0.0, 0.0, 2.0, FRAC_PI_2)).unwrap();
        let t = link.local_transform();
        assert_relative_eq!(t[(0, 3)], 2.0);
        assert_relative_eq!(t[(1, 3)], 0.0);
        assert_relative_eq!(t[(2, 3)], 0.0);
        assert_relative_eq!(t[(0, 0)], 1.0);
        assert_relative_eq!(t[(1, 1)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(t[(2, 1)], 1.0);
        assert_relative_eq!(t[(1, 2)], -1.0);
    }

    #[test]
    fn test_transform_reflects_latest_write() {
        let mut link = JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0)).unwrap();
        link.set_joint_variable(FRAC_PI_2);
        let t = link.local_transform();
        assert_relative_eq!(t[(0, 3)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(t[(1, 3)], 1.0);

        link.set_joint_variable(0.0);
        assert_relative_eq!(link.local_transform()[(0, 3)], 1.0);
    }

    #[test]
    fn test_joint_axis() {
        let link = JointLink::revolute(DhGeometry::new(0.0, 0.0, 0.0, FRAC_PI_2)).unwrap();
        let axis = link.joint_axis();
        assert_relative_eq!(axis, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(axis.norm(), 1.0);
    }

    #[test]
    fn test_display() {
        let link = JointLink::prismatic(DhGeometry::default())
            .unwrap()
            .with_name("slide");
        let display_str = format!("{}", link);
        assert!(display_str.contains("slide"));
        assert!(display_str.contains("prismatic"));
    }
}
