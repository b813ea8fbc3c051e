use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::project::Project;
use crate::scm::revision::{RevisionKind, classify, short_id};
use crate::scm::{Component, WorkingCopyStatus, scm_create};

/// CLI command: show where each working copy stands.
///
/// One line per component: its name, then either `not downloaded` or the
/// short HEAD id, the attached branch (or `detached`) and a `dirty` marker.
/// A component whose HEAD disagrees with a commit-id revision is flagged.
pub fn cmd_status(manifest: &Path, names: &[String]) -> Result<()> {
    let prj = Project::load(manifest)?;
    for c in prj.select(names)? {
        let scm = match scm_create(c) {
            Ok(scm) => scm,
            Err(e) => {
                println!("{} {}", c.name().bold(), format!("{:#}", e).red());
                continue;
            }
        };
        if !scm.is_downloaded() {
            println!("{} {}", c.name().bold(), "not downloaded".yellow());
            continue;
        }
        match scm.status() {
            Ok(st) => println!("{} {}", c.name().bold(), describe(c, &st)),
            Err(e) => println!("{} {}", c.name().bold(), format!("{:#}", e).red()),
        }
    }
    Ok(())
}

fn describe(c: &dyn Component, st: &WorkingCopyStatus) -> String {
    let mut out = short_id(&st.head).cyan().to_string();
    match &st.branch {
        Some(b) => out.push_str(&format!(" on {}", b.green())),
        None => out.push_str(&format!(" {}", "detached".yellow())),
    }
    let rev = c.revision();
    if classify(rev) == RevisionKind::CommitId && !st.head.starts_with(&rev.to_lowercase()) {
        out.push_str(&format!(" {}", format!("(wants {})", short_id(rev)).red()));
    }
    if st.dirty {
        out.push_str(&format!(" {}", "dirty".red().bold()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentConfig;
    use crate::project::ProjectComponent;
    use std::path::PathBuf;

    fn component(rev: &str) -> ProjectComponent {
        ProjectComponent::new(
            ComponentConfig {
                name: "kernel".into(),
                scm: "git".into(),
                url: "u".into(),
                revision: rev.into(),
                post_download: vec![],
                post_update: vec![],
            },
            PathBuf::from("/p/src/kernel"),
        )
    }

    fn status(branch: Option<&str>, dirty: bool) -> WorkingCopyStatus {
        WorkingCopyStatus {
            head: "0123456789abcdef0123456789abcdef01234567".into(),
            branch: branch.map(str::to_string),
            dirty,
        }
    }

    #[test]
    fn describes_attached_clean_copy() {
        colored::control::set_override(false);
        let got = describe(&component("main"), &status(Some("main"), false));
        assert_eq!(got, "01234567 on main");
    }

    #[test]
    fn flags_detached_dirty_copy_off_its_commit() {
        colored::control::set_override(false);
        let got = describe(&component("deadbeef"), &status(None, true));
        assert_eq!(got, "01234567 detached (wants deadbeef) dirty");
    }

    #[test]
    fn matching_commit_revision_is_not_flagged() {
        colored::control::set_override(false);
        let got = describe(&component("0123456789"), &status(None, false));
        assert_eq!(got, "01234567 detached");
    }
}
