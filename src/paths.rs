use anyhow::{Context, Result};
use std::{
    env,
    path::{Path, PathBuf},
};

/// Environment variable overriding the default manifest location.
pub const PROJECT_ENV: &str = "BARBICAN_PROJECT";

const DEFAULT_MANIFEST: &str = "project.toml";
const DEFAULT_SRC_DIR: &str = "src";

/// Directory layout of a project, derived from its manifest location.
#[derive(Debug, Clone)]
pub struct Paths {
    pub manifest: PathBuf,
    pub project: PathBuf,
    pub src: PathBuf,
}

impl Paths {
    /// Working copy directory of the component called `name`.
    pub fn component_src(&self, name: &str) -> PathBuf {
        self.src.join(name)
    }
}

/// Resolve the manifest path.
///
/// Order: explicit path (from `--project`), then `$BARBICAN_PROJECT`,
/// then `./project.toml`.
pub fn manifest_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    env::var_os(PROJECT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
}

/// Build the project layout for `manifest`.
///
/// `src_dir` comes from the manifest; relative values are joined onto the
/// manifest's directory, absolute values are used as is.
pub fn paths(manifest: &Path, src_dir: Option<&Path>) -> Result<Paths> {
    let manifest = if manifest.is_absolute() {
        manifest.to_path_buf()
    } else {
        env::current_dir()
            .context("cannot determine current directory")?
            .join(manifest)
    };
    let project = manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let src = project.join(src_dir.unwrap_or(Path::new(DEFAULT_SRC_DIR)));
    Ok(Paths {
        manifest,
        project,
        src,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn explicit_manifest_wins_over_env() {
        unsafe { env::set_var(PROJECT_ENV, "/from/env.toml") };
        let got = manifest_path(Some(Path::new("/explicit/project.toml")));
        unsafe { env::remove_var(PROJECT_ENV) };
        assert_eq!(got, PathBuf::from("/explicit/project.toml"));
    }

    #[test]
    #[serial]
    fn env_manifest_used_when_no_explicit_path() {
        unsafe { env::set_var(PROJECT_ENV, "/from/env.toml") };
        let got = manifest_path(None);
        unsafe { env::remove_var(PROJECT_ENV) };
        assert_eq!(got, PathBuf::from("/from/env.toml"));
    }

    #[test]
    #[serial]
    fn default_manifest_in_current_dir() {
        unsafe { env::remove_var(PROJECT_ENV) };
        assert_eq!(manifest_path(None), PathBuf::from("project.toml"));
    }

    #[test]
    fn src_dir_defaults_next_to_manifest() {
        let p = paths(Path::new("/work/proj/project.toml"), None).unwrap();
        assert_eq!(p.project, PathBuf::from("/work/proj"));
        assert_eq!(p.src, PathBuf::from("/work/proj/src"));
        assert_eq!(
            p.component_src("kernel"),
            PathBuf::from("/work/proj/src/kernel")
        );
    }

    #[test]
    fn absolute_src_dir_is_kept() {
        let p = paths(
            Path::new("/work/proj/project.toml"),
            Some(Path::new("/elsewhere/sources")),
        )
        .unwrap();
        assert_eq!(p.src, PathBuf::from("/elsewhere/sources"));
    }
}
