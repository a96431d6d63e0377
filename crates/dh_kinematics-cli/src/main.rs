//! dhkin CLI - DH chain kinematics
//!
//! A command-line tool that loads a chain description, applies joint values
//! and prints forward kinematics and Jacobian reports.

use clap::{Args, Parser, Subcommand};
use color_eyre::{Result, eyre::Context};
use dh_kinematics::ManipulatorChain;
use dh_kinematics_cli::{
    JacobianReport, KinematicsReport, ReportFormat, ToolReport, load_chain, report::Report,
};
use std::{env, path::PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "dhkin",
    about = "DH chain kinematics",
    long_about = "Compute forward kinematics, joint positions and geometric Jacobians for serial chains described by Denavit-Hartenberg parameters"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full report: DH table, transforms, joint positions, tool pose and Jacobian
    Report(ReportArgs),
    /// End-effector pose in base and world coordinates
    Tool(ReportArgs),
    /// 6xN geometric Jacobian
    Jacobian(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Path to the chain description (.json, .yaml or .yml)
    path: PathBuf,
    /// Joint values, comma separated; saturated to the joint limits
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    joints: Option<Vec<f64>>,
    /// Output file for the report
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format (json, yaml)
    #[arg(short, long, default_value = "json")]
    format: String,
}

fn main() {
    // Enable backtraces by default
    if env::var("RUST_BACKTRACE").is_err() {
        unsafe {
            env::set_var("RUST_BACKTRACE", "1");
        }
    }

    init_tracing();

    // Install color-eyre with enhanced configuration
    color_eyre::config::HookBuilder::default()
        .capture_span_trace_by_default(true)
        .display_location_section(true)
        .display_env_section(false)
        .install()
        .expect("Failed to install color-eyre");

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report(args) => run(args, KinematicsReport::from_chain),
        Commands::Tool(args) => run(args, ToolReport::from_chain),
        Commands::Jacobian(args) => run(args, JacobianReport::from_chain),
    };

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_error::ErrorLayer::default())
        .init();
}

#[tracing::instrument(skip(args, build), fields(path = %args.path.display()))]
fn run<R, F>(args: ReportArgs, build: F) -> Result<()>
where
    R: Report,
    F: FnOnce(&ManipulatorChain) -> R,
{
    let report_format = parse_format(&args.format)?;
    let chain = load_chain(&args.path, args.joints.as_deref())
        .with_context(|| format!("Failed to load chain from {}", args.path.display()))?;

    let report = build(&chain);

    if let Some(output_path) = args.output {
        report.save_to_file(&output_path, report_format)?;
        eprintln!("Report saved to: {}", output_path.display());
    } else {
        println!("{}", report.render(report_format)?);
    }

    // Print summary to stderr so it doesn't interfere with stdout output
    print_chain_summary(&chain);

    Ok(())
}

fn parse_format(format: &str) -> Result<ReportFormat> {
    ReportFormat::from_extension(format).ok_or_else(|| {
        color_eyre::eyre::eyre!(
            "Unsupported format '{}'. Supported formats: json, yaml",
            format
        )
    })
}

fn print_chain_summary(chain: &ManipulatorChain) {
    eprintln!();
    eprintln!("=== Chain Summary ===");
    eprint!("{}", chain);
    eprintln!();
}
