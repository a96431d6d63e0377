//! Serializable chain descriptions, the configuration format for chains.
//!
//! A [`ChainDescription`] uses plain vectors so it can be read from JSON or
//! YAML. [`ChainDescription::build`] checks every shape and value and yields
//! a [`ManipulatorChain`].

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{DEFAULT_GRAVITY, ManipulatorChain};
use crate::link::{DhGeometry, DynamicProps, JointLink, JointType};
use crate::{Error, Result};

/// Description of a whole chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainDescription {
    /// World to base transform as four rows of four, identity when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Vec<Vec<f64>>>,
    /// Gravity vector, `[0, 0, -9.81]` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Vec<f64>>,
    /// Links ordered base to tip
    pub links: Vec<LinkDescription>,
}

/// Description of a single link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub joint_type: JointType,
    /// `[theta, d, a, alpha]`
    pub geometry: Vec<f64>,
    /// `[min, max]`, unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Vec<f64>>,
    /// Initial joint variable, clamped to the limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_variable: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_of_mass: Option<Vec<f64>>,
    /// Three rows of three
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertia: Option<Vec<Vec<f64>>>,
}

impl ChainDescription {
    /// Validate the description and build a chain from it
    pub fn build(&self) -> Result<ManipulatorChain> {
        let links = self
            .links
            .iter()
            .map(LinkDescription::build)
            .collect::<Result<Vec<_>>>()?;

        let mut chain = ManipulatorChain::new(links)?;
        if let Some(rows) = &self.base {
            chain = chain.with_base(matrix_from_rows::<4>("base", rows)?);
        }
        if let Some(gravity) = &self.gravity {
            chain = chain.with_gravity(vector3("gravity", gravity)?);
        }
        debug!(dof = chain.dof(), "built chain from description");
        Ok(chain)
    }

    /// Describe an existing chain, including its current joint variables
    pub fn from_chain(chain: &ManipulatorChain) -> Self {
        let gravity = *chain.gravity();
        Self {
            base: (*chain.base() != Matrix4::identity()).then(|| rows_of(chain.base())),
            gravity: (gravity != Vector3::from(DEFAULT_GRAVITY))
                .then(|| gravity.iter().copied().collect()),
            links: chain.links().iter().map(LinkDescription::from_link).collect(),
        }
    }
}

impl LinkDescription {
    /// Validate the description and build a link from it
    pub fn build(&self) -> Result<JointLink> {
        let mut link = JointLink::from_slices(self.joint_type, &self.geometry)?;

        if let Some(limits) = &self.limits {
            match limits.as_slice() {
                &[min, max] => link = link.with_limits(min, max)?,
                _ => {
                    return Err(Error::InvalidShape {
                        field: "limits",
                        expected: 2,
                        actual: limits.len(),
                    });
                }
            }
        }

        if self.mass.is_some() || self.center_of_mass.is_some() || self.inertia.is_some() {
            let center_of_mass = match &self.center_of_mass {
                Some(values) => vector3("center_of_mass", values)?,
                None => Vector3::zeros(),
            };
            let inertia = match &self.inertia {
                Some(rows) => matrix_from_rows::<3>("inertia", rows)?
                    .fixed_view::<3, 3>(0, 0)
                    .into_owned(),
                None => Matrix3::zeros(),
            };
            link = link.with_dynamics(DynamicProps::new(
                self.mass.unwrap_or(0.0),
                center_of_mass,
                inertia,
            )?);
        }

        if let Some(name) = &self.name {
            link = link.with_name(name.clone());
        }
        if let Some(value) = self.joint_variable {
            link.set_joint_variable(value);
        }
        Ok(link)
    }

    pub fn from_link(link: &JointLink) -> Self {
        let limits = link.limits();
        let bounded = limits.min().is_finite() || limits.max().is_finite();
        let dynamics = link.dynamics();
        let has_dynamics = *dynamics != DynamicProps::default();
        Self {
            name: (!link.name().is_empty()).then(|| link.name().to_string()),
            joint_type: link.joint_type(),
            geometry: link.geometry().to_array().to_vec(),
            limits: bounded.then(|| vec![limits.min(), limits.max()]),
            joint_variable: Some(link.joint_variable()),
            mass: has_dynamics.then(|| dynamics.mass()),
            center_of_mass: has_dynamics.then(|| dynamics.center_of_mass().iter().copied().collect()),
            inertia: has_dynamics.then(|| {
                dynamics
                    .inertia()
                    .row_iter()
                    .map(|row| row.iter().copied().collect())
                    .collect()
            }),
        }
    }
}

fn vector3(field: &'static str, values: &[f64]) -> Result<Vector3<f64>> {
    match values {
        _ if values.iter().any(|v| !v.is_finite()) => Err(Error::NonFinite { field }),
        &[x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(Error::InvalidShape {
            field,
            expected: 3,
            actual: values.len(),
        }),
    }
}

/// Read an `N`×`N` row-major matrix into the top-left corner of a 4×4
fn matrix_from_rows<const N: usize>(field: &'static str, rows: &[Vec<f64>]) -> Result<Matrix4<f64>> {
    let element_count: usize = rows.iter().map(Vec::len).sum();
    if rows.len() != N || rows.iter().any(|row| row.len() != N) {
        return Err(Error::InvalidShape {
            field,
            expected: N * N,
            actual: element_count,
        });
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite { field });
    }
    let mut matrix = Matrix4::identity();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            matrix[(r, c)] = *value;
        }
    }
    Ok(matrix)
}

fn rows_of(matrix: &Matrix4<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}
