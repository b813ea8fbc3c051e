//! # barbican
//!
//! Keeps the source trees of a project's components in sync with their
//! upstream repositories.
//!
//! - `barbican download` clones components that are not on disk yet
//! - `barbican update` fetches and moves components to their revision
//! - `barbican list` prints the components of the manifest
//! - `barbican status` shows where each working copy stands
//!
//! The manifest is `./project.toml` unless `--project` or
//! `$BARBICAN_PROJECT` says otherwise.

use anyhow::Result;
use barbican::{cmd_download, cmd_list, cmd_status, cmd_update, init_logging, manifest_path};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "barbican",
    version,
    about = "barbican - fetch and synchronize project components",
    arg_required_else_help = true
)]
struct Cli {
    /// Project manifest (default: $BARBICAN_PROJECT or ./project.toml)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Clone components that have no working copy yet
    Download {
        /// Only these components
        names: Vec<String>,
        /// Number of components processed in parallel
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Fetch and move components to the tip of their revision
    Update {
        /// Only these components
        names: Vec<String>,
        /// Number of components processed in parallel
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// List components defined in the manifest
    List,
    /// Show HEAD, branch and local changes of each working copy
    Status {
        /// Only these components
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let manifest = manifest_path(cli.project.as_deref());

    match cli.cmd {
        Cmd::Download { names, jobs } => cmd_download(&manifest, &names, jobs),
        Cmd::Update { names, jobs } => cmd_update(&manifest, &names, jobs),
        Cmd::List => cmd_list(&manifest),
        Cmd::Status { names } => cmd_status(&manifest, &names),
    }
}
