//! Chain description files
//!
//! Reads [`ChainDescription`] documents from disk, choosing the parser from
//! the file extension.

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use dh_kinematics::{ChainDescription, ManipulatorChain};
use std::path::Path;
use tracing::debug;

use crate::report::ReportFormat;

/// Read and parse a chain description from a `.json`, `.yaml` or `.yml` file
pub fn load_description<P: AsRef<Path>>(path: P) -> Result<ChainDescription> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ReportFormat::from_extension)
        .ok_or_else(|| {
            eyre!(
                "Unsupported chain file '{}'. Supported extensions: json, yaml, yml",
                path.display()
            )
        })?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chain file {}", path.display()))?;

    let description = match format {
        ReportFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON chain file {}", path.display()))?,
        ReportFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML chain file {}", path.display()))?,
    };
    debug!(path = %path.display(), "loaded chain description");
    Ok(description)
}

/// Load a chain file and optionally override its joint variables
///
/// Joint values are saturated to each link's limits.
pub fn load_chain<P: AsRef<Path>>(path: P, joints: Option<&[f64]>) -> Result<ManipulatorChain> {
    let path = path.as_ref();
    let mut chain = load_description(path)?
        .build()
        .with_context(|| format!("Invalid chain in {}", path.display()))?;

    if let Some(values) = joints {
        chain
            .set_joint_vector(values)
            .context("Failed to apply joint values")?;
    }
    Ok(chain)
}
