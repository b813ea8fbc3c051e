//! Crate entry point for **barbican**.
//!
//! Fetches and synchronizes the source trees ("components") a project is
//! built from. Each module owns one concern: manifest parsing, directory
//! layout, the SCM layer, hooks and the CLI commands. The `pub use`
//! re-exports are what the `barbican` binary and the integration tests use.

mod config;
mod hooks;
mod list;
mod logging;
mod paths;
mod project;
pub mod scm;
mod status;
mod sync;

pub use config::{ComponentConfig, Config, load_config, parse_config};
pub use list::cmd_list;
pub use logging::init_logging;
pub use paths::{Paths, manifest_path};
pub use project::{Project, ProjectComponent};
pub use scm::{Component, Scm, ScmError, UpdateOutcome, WorkingCopyStatus, scm_create};
pub use status::cmd_status;
pub use sync::{cmd_download, cmd_update};
