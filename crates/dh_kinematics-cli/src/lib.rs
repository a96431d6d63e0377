//! dhkin - DH chain kinematics reports
//!
//! Loads a chain description from a JSON or YAML file, applies joint values
//! and produces forward kinematics and Jacobian reports for plotting and
//! inspection tools.

pub mod chain_file;
pub mod report;

pub use chain_file::{load_chain, load_description};
pub use report::{JacobianReport, KinematicsReport, ReportFormat, ToolReport};

/// Main result type using color-eyre for error handling
pub type Result<T> = color_eyre::Result<T>;
