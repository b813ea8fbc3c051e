use crate::scm::UpdateOutcome;

/// Which command is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Download,
    Update,
}

/// What to do with one component, given the command and whether its
/// working copy exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Download,
    Update,
    /// `download` on a component that is already there.
    AlreadyPresent,
}

/// Decide the action for a component.
///
/// `update` downloads components that were never fetched, so a freshly
/// added manifest entry doesn't need a separate `download` run.
pub fn plan(mode: Mode, downloaded: bool) -> Action {
    match (mode, downloaded) {
        (_, false) => Action::Download,
        (Mode::Download, true) => Action::AlreadyPresent,
        (Mode::Update, true) => Action::Update,
    }
}

/// Outcome of one finished job, used for the final progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Downloaded { head: String },
    Updated(UpdateOutcome),
    Skipped,
}
