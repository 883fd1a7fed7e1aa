use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "testtree",
    about = "testtree -- stable test trees across discovery passes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log registry activity (create/reuse/prune) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Factory configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one discovery pass over a manifest and print the tree
    Discover(DiscoverArgs),
    /// Run two passes and report what was reused, pruned and re-tagged
    Rescan(RescanArgs),
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Discovery manifest (TOML)
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct RescanArgs {
    /// Manifest for the first pass
    pub before: PathBuf,
    /// Manifest for the second pass
    pub after: PathBuf,
    /// Skip printing the tree after the second pass
    #[arg(long)]
    pub no_tree: bool,
}
