mod jobs;
mod progress;

use anyhow::{Context, Result, bail};
use indicatif::{MultiProgress, ProgressBar};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::project::{Project, ProjectComponent};
use crate::scm::revision::short_id;
use crate::scm::{Component, UpdateOutcome, scm_create};

use jobs::{Action, Mode, Report, plan};
use progress::{err_style, ok_style, skip_style, spinner};

/// Download every selected component that has no working copy yet.
///
/// `names` restricts the run to those components (all when empty);
/// `jobs` caps the number of parallel clones (CPU count when `None`).
pub fn cmd_download(manifest: &Path, names: &[String], jobs: Option<usize>) -> Result<()> {
    run(manifest, names, jobs, Mode::Download)
}

/// Fetch and move every selected component to the tip of its revision,
/// downloading the ones that are missing.
pub fn cmd_update(manifest: &Path, names: &[String], jobs: Option<usize>) -> Result<()> {
    run(manifest, names, jobs, Mode::Update)
}

/// Shared driver for both commands.
///
/// Components run in parallel on a dedicated rayon pool, one spinner
/// each. A failing component is reported on its own line and the others
/// carry on; the command fails afterwards if any component did.
fn run(manifest: &Path, names: &[String], jobs: Option<usize>, mode: Mode) -> Result<()> {
    let prj = Project::load(manifest)?;
    let selected = prj.select(names)?;
    if selected.is_empty() {
        eprintln!("no components in {}", prj.paths.manifest.display());
        return Ok(());
    }
    fs::create_dir_all(&prj.paths.src)
        .with_context(|| format!("create {}", prj.paths.src.display()))?;

    let threads = jobs.unwrap_or_else(num_cpus::get).max(1);
    debug!(project = prj.name.as_str(), threads, ?mode, "syncing");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("failed to start worker pool")?;

    let mp = MultiProgress::new();
    let bars: Vec<ProgressBar> = selected
        .iter()
        .map(|c| spinner(&mp, format!("syncing {}", c.name())))
        .collect();

    let failed = pool.install(|| {
        selected
            .par_iter()
            .enumerate()
            .map(|(idx, c)| {
                let pb = &bars[idx];
                match sync_one(c, mode, pb) {
                    Ok(report) => {
                        finish(pb, c.name(), &report);
                        false
                    }
                    Err(e) => {
                        error!(component = c.name(), "{:#}", e);
                        pb.set_style(err_style());
                        pb.finish_with_message(format!("{} (error: {:#})", c.name(), e));
                        true
                    }
                }
            })
            .filter(|failed| *failed)
            .count()
    });

    if failed > 0 {
        bail!("{} of {} components failed", failed, selected.len());
    }
    Ok(())
}

fn sync_one(c: &ProjectComponent, mode: Mode, pb: &ProgressBar) -> Result<Report> {
    let scm = scm_create(c)?;
    match plan(mode, scm.is_downloaded()) {
        Action::Download => {
            pb.set_message(format!("downloading {} @ {}", c.name(), c.revision()));
            scm.download()?;
            Ok(Report::Downloaded {
                head: scm.head_commit()?,
            })
        }
        Action::Update => {
            pb.set_message(format!("updating {} @ {}", c.name(), c.revision()));
            Ok(Report::Updated(scm.update()?))
        }
        Action::AlreadyPresent => Ok(Report::Skipped),
    }
}

fn finish(pb: &ProgressBar, name: &str, report: &Report) {
    let msg = match report {
        Report::Downloaded { head } => format!("{} downloaded at {}", name, short_id(head)),
        Report::Updated(UpdateOutcome::Updated { from, to }) => {
            format!("{} updated {}..{}", name, short_id(from), short_id(to))
        }
        Report::Updated(UpdateOutcome::UpToDate { head }) => {
            format!("{} up to date at {}", name, short_id(head))
        }
        Report::Skipped => {
            pb.set_style(skip_style());
            pb.finish_with_message(format!("{} already downloaded", name));
            return;
        }
    };
    pb.set_style(ok_style());
    pb.finish_with_message(msg);
}
