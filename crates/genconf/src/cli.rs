//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use genconf_core::types::SchemaKind;

/// genconf - Validate generator configurations and transition conditions
#[derive(Parser, Debug)]
#[command(name = "genconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Maximum nesting of conditions
    #[arg(long, global = true, env = "GENCONF_MAX_DEPTH", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a project file
    Validate(ValidateArgs),

    /// Show the normalized form of a project file
    Show(ShowArgs),

    /// Validate every project file below a directory
    Scan(ScanArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Project file (searches for generator.yml in the current and parent directories if omitted)
    pub file: Option<Utf8PathBuf>,

    /// Shape to validate against
    #[arg(short, long, default_value_t = SchemaKind::Generator)]
    pub kind: SchemaKind,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Project file (searches for generator.yml in the current and parent directories if omitted)
    pub file: Option<Utf8PathBuf>,

    /// Shape to validate against
    #[arg(short, long, default_value_t = SchemaKind::Generator)]
    pub kind: SchemaKind,

    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub dir: Utf8PathBuf,

    /// Shape every file is validated against
    #[arg(short, long, default_value_t = SchemaKind::Generator)]
    pub kind: SchemaKind,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
