//! Report generation module
//!
//! Snapshots of a chain's kinematic state, serializable as JSON or YAML.
//! Matrices are written as lists of rows.

use color_eyre::{Result, eyre::Context};
use dh_kinematics::{JointType, ManipulatorChain, jacobian, transform};
use nalgebra::{Dim, Matrix, storage::Storage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full forward kinematics and Jacobian report for one configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KinematicsReport {
    /// Number of joints
    pub dof: usize,
    /// Joint type of each link
    pub joint_types: Vec<JointType>,
    /// Link names, empty strings for unnamed links
    pub link_names: Vec<String>,
    /// Clamped joint variables
    pub joint_vector: Vec<f64>,
    /// Evaluated DH rows `[theta, d, a, alpha]`
    pub dh_table: Vec<Vec<f64>>,
    /// Per-link local transforms
    pub local_transforms: Vec<Vec<Vec<f64>>>,
    /// Cumulative transforms in base coordinates
    pub base_transforms: Vec<Vec<Vec<f64>>>,
    /// Cumulative transforms in world coordinates
    pub world_transforms: Vec<Vec<Vec<f64>>>,
    /// Joint positions in base coordinates, one `[x, y, z]` per joint
    pub joint_positions: Vec<Vec<f64>>,
    /// End-effector pose
    pub tool: ToolReport,
    /// 6xN Jacobian as six rows
    pub jacobian: Vec<Vec<f64>>,
}

/// End-effector pose in base and world coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolReport {
    pub position: Vec<f64>,
    pub world_position: Vec<f64>,
    pub transform: Vec<Vec<f64>>,
    pub world_transform: Vec<Vec<f64>>,
}

/// Jacobian at one configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JacobianReport {
    pub joint_vector: Vec<f64>,
    /// Rows `vx, vy, vz, wx, wy, wz`, one column per joint
    pub jacobian: Vec<Vec<f64>>,
}

impl KinematicsReport {
    /// Capture the chain's current configuration
    pub fn from_chain(chain: &ManipulatorChain) -> Self {
        let local = transform::local_transforms(chain);
        let cumulative = transform::base_transforms(&local);
        let positions = transform::joint_positions(chain);

        Self {
            dof: chain.dof(),
            joint_types: chain.links().iter().map(|link| link.joint_type()).collect(),
            link_names: chain
                .links()
                .iter()
                .map(|link| link.name().to_string())
                .collect(),
            joint_vector: chain.joint_vector().iter().copied().collect(),
            dh_table: rows(&chain.dh_table()),
            local_transforms: local.iter().map(rows).collect(),
            base_transforms: cumulative.iter().map(rows).collect(),
            world_transforms: transform::world_transforms(chain).iter().map(rows).collect(),
            joint_positions: positions
                .column_iter()
                .map(|column| column.iter().copied().collect())
                .collect(),
            tool: ToolReport::from_chain(chain),
            jacobian: rows(&jacobian(chain)),
        }
    }
}

impl ToolReport {
    pub fn from_chain(chain: &ManipulatorChain) -> Self {
        let tool = transform::tool_transform(chain);
        let world = transform::world_tool_transform(chain);
        Self {
            position: transform::translation(&tool).iter().copied().collect(),
            world_position: transform::translation(&world).iter().copied().collect(),
            transform: rows(&tool),
            world_transform: rows(&world),
        }
    }
}

impl JacobianReport {
    pub fn from_chain(chain: &ManipulatorChain) -> Self {
        Self {
            joint_vector: chain.joint_vector().iter().copied().collect(),
            jacobian: rows(&jacobian(chain)),
        }
    }
}

/// Serialization shared by every report type
pub trait Report: Serialize {
    /// Export to JSON format
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
    }

    /// Export to YAML format
    fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize report to YAML")
    }

    fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Yaml => self.to_yaml(),
        }
    }

    /// Save to a file
    fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ReportFormat) -> Result<()> {
        let path = path.as_ref();
        let content = self.render(format)?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        Ok(())
    }
}

impl Report for KinematicsReport {}
impl Report for ToolReport {}
impl Report for JacobianReport {}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl ReportFormat {
    /// Parse format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "yaml" | "yml" => Some(ReportFormat::Yaml),
            _ => None,
        }
    }
}

fn rows<R: Dim, C: Dim, S: Storage<f64, R, C>>(matrix: &Matrix<f64, R, C, S>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_kinematics::{DhGeometry, JointLink, Matrix4, Vector3};
    use tempfile::TempDir;
    use test_log::test;

    fn two_link_arm() -> ManipulatorChain {
        let links = vec![
            JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0))
                .unwrap()
                .with_name("shoulder"),
            JointLink::revolute(DhGeometry::new(0.0, 0.0, 1.0, 0.0))
                .unwrap()
                .with_name("elbow"),
        ];
        ManipulatorChain::new(links)
            .unwrap()
            .with_base(Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)))
    }

    #[test]
    fn test_kinematics_report_contents() {
        let report = KinematicsReport::from_chain(&two_link_arm());

        assert_eq!(report.dof, 2);
        assert_eq!(report.link_names, vec!["shoulder", "elbow"]);
        assert_eq!(report.joint_vector, vec![0.0, 0.0]);
        assert_eq!(report.dh_table, vec![vec![0.0, 0.0, 1.0, 0.0]; 2]);
        assert_eq!(report.local_transforms.len(), 2);
        assert_eq!(report.local_transforms[0][0], vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(report.base_transforms[1][0][3], 2.0);
        assert_eq!(report.world_transforms[1][2][3], 1.0);
        assert_eq!(report.joint_positions, vec![vec![0.0; 3], vec![1.0, 0.0, 0.0]]);
        assert_eq!(report.tool.position, vec![2.0, 0.0, 0.0]);
        assert_eq!(report.tool.world_position, vec![2.0, 0.0, 1.0]);
        assert_eq!(report.jacobian.len(), 6);
        assert_eq!(report.jacobian[1], vec![2.0, 1.0]);
        assert_eq!(report.jacobian[5], vec![1.0, 1.0]);
    }

    #[test]
    fn test_json_output() -> Result<()> {
        let report = KinematicsReport::from_chain(&two_link_arm());
        let json = report.to_json()?;
        assert!(json.contains("\"joint_types\""));
        assert!(json.contains("\"revolute\""));

        let parsed: KinematicsReport = serde_json::from_str(&json)?;
        assert_eq!(parsed, report);
        Ok(())
    }

    #[test]
    fn test_yaml_output() -> Result<()> {
        let report = JacobianReport::from_chain(&two_link_arm());
        let yaml = report.to_yaml()?;
        assert!(yaml.contains("jacobian:"));
        assert!(yaml.contains("joint_vector:"));
        Ok(())
    }

    #[test]
    fn test_save_to_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("tool.yaml");
        ToolReport::from_chain(&two_link_arm()).save_to_file(&path, ReportFormat::Yaml)?;

        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("world_position:"));
        Ok(())
    }

    #[test]
    fn test_report_format_extension() {
        assert_eq!(ReportFormat::from_extension("JSON"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::from_extension("yml"), Some(ReportFormat::Yaml));
        assert_eq!(ReportFormat::from_extension("toml"), None);
    }
}
