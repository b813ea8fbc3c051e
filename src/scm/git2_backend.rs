use anyhow::{Context, Result, anyhow};
use git2::{
    BranchType, Commit, Cred, ErrorCode, FetchOptions, RemoteCallbacks, Repository,
    RepositoryState, ResetType, StatusOptions,
    build::{CheckoutBuilder, RepoBuilder},
};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::revision::{RevisionKind, classify, short_id};
use super::{Component, Scm, ScmError, UpdateOutcome, WorkingCopyStatus};

/// Git working copy of one component.
///
/// Nothing is read from disk or the network until an operation is called.
pub struct Git<'a> {
    component: &'a dyn Component,
}

impl<'a> Git<'a> {
    pub fn new(component: &'a dyn Component) -> Self {
        Self { component }
    }

    fn open(&self) -> Result<Repository> {
        let dir = self.component.src_dir();
        if !dir.join(".git").exists() {
            return Err(ScmError::NotDownloaded(dir).into());
        }
        Repository::open(&dir).with_context(|| format!("open {}", dir.display()))
    }
}

impl Scm for Git<'_> {
    /// Clone into a hidden staging directory next to `src_dir`, check out
    /// the revision there and only then move it into place, so a failed
    /// clone or an unknown revision leaves nothing behind.
    fn download(&self) -> Result<()> {
        let dest = self.component.src_dir();
        let url = self.component.url();
        let rev = self.component.revision();

        if dest.join(".git").exists() {
            return Err(ScmError::AlreadyDownloaded(dest).into());
        }
        let parent = dest
            .parent()
            .ok_or_else(|| anyhow!("invalid source directory: {}", dest.display()))?;
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", self.component.name()))
            .tempdir_in(parent)?;

        info!(component = self.component.name(), url, rev, "cloning");
        {
            let mut builder = RepoBuilder::new();
            builder.fetch_options(fetch_opts_with_creds());
            let repo = builder
                .clone(url, staging.path())
                .with_context(|| format!("git clone {}", url))?;
            checkout_rev(&repo, rev)?;
        }

        if dest.exists() {
            fs::remove_dir(&dest)
                .with_context(|| format!("{} exists and is not empty", dest.display()))?;
        }
        let staged = staging.keep();
        if let Err(e) = fs::rename(&staged, &dest) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e).with_context(|| format!("move working copy to {}", dest.display()));
        }

        self.component
            .post_download_hook()
            .with_context(|| format!("post-download hook of {}", self.component.name()))
    }

    fn update(&self) -> Result<UpdateOutcome> {
        let repo = self.open()?;
        let rev = self.component.revision();

        if is_dirty(&repo)? {
            return Err(ScmError::Dirty(self.component.src_dir()).into());
        }

        let before = head_id(&repo)?;
        fetch_origin(&repo)?;
        checkout_rev(&repo, rev)?;
        let after = head_id(&repo)?;

        if before == after {
            debug!(
                component = self.component.name(),
                head = short_id(&after),
                "up to date"
            );
            return Ok(UpdateOutcome::UpToDate { head: after });
        }

        info!(
            component = self.component.name(),
            from = short_id(&before),
            to = short_id(&after),
            "updated"
        );
        self.component
            .post_update_hook()
            .with_context(|| format!("post-update hook of {}", self.component.name()))?;
        Ok(UpdateOutcome::Updated {
            from: before,
            to: after,
        })
    }

    fn head_commit(&self) -> Result<String> {
        let repo = self.open()?;
        Ok(head_id(&repo)?)
    }

    fn status(&self) -> Result<WorkingCopyStatus> {
        let repo = self.open()?;
        let branch = if repo.head_detached()? {
            None
        } else {
            repo.head()?.shorthand().map(str::to_string)
        };
        Ok(WorkingCopyStatus {
            head: head_id(&repo)?,
            branch,
            dirty: is_dirty(&repo)?,
        })
    }

    fn is_downloaded(&self) -> bool {
        self.component.src_dir().join(".git").exists()
    }
}

/// Build a `FetchOptions` with SSH-agent credentials enabled.
///
/// Falls back to default credentials when the agent has no usable key.
fn fetch_opts_with_creds() -> FetchOptions<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo
}

/// `git fetch origin`: branches into `refs/remotes/origin/*`, tags into
/// `refs/tags/*`. Both are forced so a tag moved upstream is picked up.
fn fetch_origin(repo: &Repository) -> Result<()> {
    let mut fo = fetch_opts_with_creds();

    let mut remote = repo.find_remote("origin")?;
    remote
        .fetch(
            &[
                "+refs/heads/*:refs/remotes/origin/*",
                "+refs/tags/*:refs/tags/*",
            ],
            Some(&mut fo),
            None,
        )
        .context("git fetch origin")?;
    Ok(())
}

fn head_id(repo: &Repository) -> Result<String, ScmError> {
    Ok(repo.head()?.peel_to_commit()?.id().to_string())
}

/// Whether the working copy has changes an update would destroy.
///
/// Untracked and ignored files are not counted; an interrupted merge,
/// rebase or cherry-pick is.
fn is_dirty(repo: &Repository) -> Result<bool, ScmError> {
    if repo.state() != RepositoryState::Clean {
        return Ok(true);
    }
    let mut opts = StatusOptions::new();
    opts.include_untracked(false)
        .include_ignored(false)
        .exclude_submodules(true);
    Ok(!repo.statuses(Some(&mut opts))?.is_empty())
}

/// Check out `rev` in `repo`.
///
/// Resolution order:
/// 1. Remote branch `refs/remotes/origin/<rev>` → attach to local `<rev>`
/// 2. Tag `refs/tags/<rev>` → detach at the tagged commit
/// 3. Commit id or other revspec → detach at that commit
fn checkout_rev(repo: &Repository, rev: &str) -> Result<(), ScmError> {
    if let Ok(remote_ref) = repo.find_reference(&format!("refs/remotes/origin/{}", rev)) {
        let remote_tip = remote_ref.peel_to_commit()?;
        return attach_branch(repo, rev, &remote_tip);
    }

    if let Ok(tag_ref) = repo.find_reference(&format!("refs/tags/{}", rev)) {
        let commit = tag_ref.peel_to_commit()?;
        return detach_at(repo, &commit);
    }

    let not_found = |e: git2::Error| {
        debug!(rev, error = %e, "revision lookup failed");
        ScmError::RevisionNotFound(rev.to_string())
    };
    let commit = repo
        .revparse_single(rev)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(not_found)?;
    if classify(rev) == RevisionKind::Named {
        let id = commit.id().to_string();
        warn!(rev, commit = short_id(&id), "revision resolved to a detached commit");
    }
    detach_at(repo, &commit)
}

/// Attach HEAD to local branch `name` and hard-reset it to `remote_tip`.
///
/// The local branch is created (tracking `origin/<name>`) if missing. An
/// existing one must be an ancestor of `remote_tip`; anything else would
/// drop local commits.
fn attach_branch(repo: &Repository, name: &str, remote_tip: &Commit) -> Result<(), ScmError> {
    match repo.find_branch(name, BranchType::Local) {
        Ok(local) => {
            let local_tip = local.get().peel_to_commit()?;
            if local_tip.id() != remote_tip.id()
                && !repo.graph_descendant_of(remote_tip.id(), local_tip.id())?
            {
                return Err(ScmError::Diverged(name.to_string()));
            }
        }
        Err(_) => {
            let mut b = repo.branch(name, remote_tip, false)?;
            b.set_upstream(Some(&format!("origin/{}", name)))?;
        }
    }

    checkout_safe(repo, remote_tip)?;
    repo.set_head(&format!("refs/heads/{}", name))?;
    repo.reset(remote_tip.as_object(), ResetType::Hard, None)?;
    Ok(())
}

fn detach_at(repo: &Repository, commit: &Commit) -> Result<(), ScmError> {
    checkout_safe(repo, commit)?;
    repo.set_head_detached(commit.id())?;
    Ok(())
}

/// Move the worktree and index to `commit` without touching anything the
/// index doesn't track. An untracked file in the way of an incoming one
/// makes libgit2 refuse the whole checkout, reported as [`ScmError::Dirty`].
fn checkout_safe(repo: &Repository, commit: &Commit) -> Result<(), ScmError> {
    let mut opts = CheckoutBuilder::new();
    opts.safe();
    repo.checkout_tree(commit.as_object(), Some(&mut opts))
        .map_err(|e| match e.code() {
            ErrorCode::Conflict => {
                debug!(error = %e, "checkout blocked by local files");
                let dir: &Path = repo.workdir().unwrap_or_else(|| repo.path());
                ScmError::Dirty(dir.to_path_buf())
            }
            _ => ScmError::Git(e),
        })
}
