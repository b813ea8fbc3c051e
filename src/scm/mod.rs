//! Source control layer.
//!
//! Components are fetched through the [`Scm`] trait. The only backend is
//! git (`git2_backend`, built on the `git2` crate); callers go through
//! [`scm_create`] so they never depend on the backend directly.

mod git2_backend;
pub mod revision;

use anyhow::Result;
use std::path::PathBuf;

pub use git2_backend::Git;

/// What the SCM layer needs to know about a project component.
pub trait Component: Sync {
    fn name(&self) -> &str;
    fn url(&self) -> &str;
    /// Branch name, tag or commit id to check out.
    fn revision(&self) -> &str;
    /// Location of the working copy.
    fn src_dir(&self) -> PathBuf;

    fn scm_kind(&self) -> &str {
        "git"
    }

    /// Called once the working copy has been created and checked out.
    fn post_download_hook(&self) -> Result<()>;

    /// Called after an update moved the working copy.
    fn post_update_hook(&self) -> Result<()>;
}

/// Result of [`Scm::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { head: String },
    Updated { from: String, to: String },
}

/// Snapshot of a downloaded working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopyStatus {
    pub head: String,
    /// Attached branch, `None` when HEAD is detached.
    pub branch: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("unsupported scm '{kind}' for component {component}")]
    Unsupported { kind: String, component: String },
    #[error("{0} is not downloaded")]
    NotDownloaded(PathBuf),
    #[error("{0} already exists")]
    AlreadyDownloaded(PathBuf),
    #[error("revision not found: {0}")]
    RevisionNotFound(String),
    #[error("working copy {0} has local changes")]
    Dirty(PathBuf),
    #[error("local branch {0} has diverged from origin/{0}")]
    Diverged(String),
    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// A fetchable working copy.
pub trait Scm {
    /// Clone the component and check out its revision.
    fn download(&self) -> Result<()>;
    /// Fetch origin and move the working copy to its revision.
    fn update(&self) -> Result<UpdateOutcome>;
    /// Commit id HEAD points at.
    fn head_commit(&self) -> Result<String>;
    fn status(&self) -> Result<WorkingCopyStatus>;
    fn is_downloaded(&self) -> bool;
}

/// Pick the SCM backend for `component`.
///
/// # Errors
/// [`ScmError::Unsupported`] for any kind other than `git`.
pub fn scm_create<'a>(component: &'a dyn Component) -> Result<Box<dyn Scm + 'a>> {
    match component.scm_kind() {
        "git" => Ok(Box::new(Git::new(component))),
        other => Err(ScmError::Unsupported {
            kind: other.to_string(),
            component: component.name().to_string(),
        }
        .into()),
    }
}
