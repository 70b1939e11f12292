use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::cleanup::CleanupAction;

/// SDK Harness - cleans native SDK build trees and runs their unit tests
#[derive(Parser, Debug)]
#[command(name = "sdk-harness")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH", env = "SDK_HARNESS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove build outputs, generated files and preparation changes
    Clean(CleanArgs),

    /// Run unit test executables of built targets
    Test(TestArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Print the manual page in roff format
    Manpage,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Cleanup actions to perform, in order (defaults to the configured ones)
    #[arg(short, long = "action", value_enum, value_delimiter = ',', value_name = "ACTIONS")]
    pub actions: Vec<CleanupAction>,

    /// Target to clean outputs of, `*` for all
    #[arg(long, default_value = "*", value_name = "TARGET")]
    pub target: String,

    /// Platform to clean outputs of, `*` for all
    #[arg(long, default_value = "*", value_name = "PLATFORM")]
    pub platform: String,

    /// CPU to clean outputs of, `*` for all
    #[arg(long, default_value = "*", value_name = "CPU")]
    pub cpu: String,

    /// Configuration to clean outputs of, `*` for all
    #[arg(long, default_value = "*", value_name = "CONFIGURATION")]
    pub configuration: String,
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Targets to test (comma-separated, defaults to the configured ones)
    #[arg(long = "target", value_delimiter = ',', value_name = "TARGETS")]
    pub targets: Vec<String>,

    /// Platforms to test (comma-separated)
    #[arg(long = "platform", value_delimiter = ',', value_name = "PLATFORMS")]
    pub platforms: Vec<String>,

    /// CPUs to test (comma-separated)
    #[arg(long = "cpu", value_delimiter = ',', value_name = "CPUS")]
    pub cpus: Vec<String>,

    /// Configurations to test (comma-separated)
    #[arg(long = "configuration", value_delimiter = ',', value_name = "CONFIGURATIONS")]
    pub configurations: Vec<String>,

    /// Folder with the test executables, relative to the source root.
    /// Only valid when a single combination is selected
    #[arg(short, long, value_name = "PATH")]
    pub working_path: Option<PathBuf>,

    /// Output the run reports as JSON
    #[arg(long)]
    pub json: bool,
}
