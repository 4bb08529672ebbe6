//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Compile path-to-handler manifests into a static, read-only VFS initialiser
#[derive(Parser, Debug)]
#[command(name = "staticfs-gen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Manifest files or directories of manifests, processed in order
    #[arg(value_hint = ValueHint::AnyPath)]
    pub sources: Vec<PathBuf>,

    /// Output file ('-' or omitted: stdout)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Config file (default: ./.staticfs-gen.toml if present)
    #[arg(short, long, value_hint = ValueHint::FilePath, env = "STATICFS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sort directory entries by name instead of declaration order
    #[arg(long)]
    pub sorted: bool,

    /// Print the merged tree instead of generating code
    #[arg(long, conflicts_with = "output")]
    pub tree: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print a config file template and exit
    #[arg(long, conflicts_with = "show_config")]
    pub config_template: bool,

    /// Print shell completions and exit
    #[arg(long = "generator", value_enum, value_name = "SHELL")]
    pub generator: Option<clap_complete::Shell>,

    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,
}
