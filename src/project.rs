use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::config::{ComponentConfig, load_config};
use crate::hooks::{HookEnv, run_hook};
use crate::paths::{Paths, paths};
use crate::scm::Component;

/// A component as configured in the manifest, bound to its working copy
/// location.
#[derive(Debug, Clone)]
pub struct ProjectComponent {
    cfg: ComponentConfig,
    src_dir: PathBuf,
}

impl ProjectComponent {
    pub fn new(cfg: ComponentConfig, src_dir: PathBuf) -> Self {
        Self { cfg, src_dir }
    }

    fn hook_env(&self) -> HookEnv<'_> {
        HookEnv {
            component: &self.cfg.name,
            revision: &self.cfg.revision,
        }
    }
}

impl Component for ProjectComponent {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn url(&self) -> &str {
        &self.cfg.url
    }

    fn revision(&self) -> &str {
        &self.cfg.revision
    }

    fn src_dir(&self) -> PathBuf {
        self.src_dir.clone()
    }

    fn scm_kind(&self) -> &str {
        &self.cfg.scm
    }

    fn post_download_hook(&self) -> Result<()> {
        run_hook(
            "post-download",
            &self.cfg.post_download,
            &self.src_dir,
            &self.hook_env(),
        )
    }

    fn post_update_hook(&self) -> Result<()> {
        run_hook(
            "post-update",
            &self.cfg.post_update,
            &self.src_dir,
            &self.hook_env(),
        )
    }
}

/// A loaded project: its layout plus every configured component.
#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub paths: Paths,
    pub components: Vec<ProjectComponent>,
}

impl Project {
    /// Load the manifest at `manifest` and resolve component locations.
    pub fn load(manifest: &Path) -> Result<Self> {
        let cfg = load_config(manifest)?;
        let p = paths(manifest, cfg.src_dir.as_deref())?;
        let components = cfg
            .components
            .into_iter()
            .map(|c| {
                let dir = p.component_src(&c.name);
                ProjectComponent::new(c, dir)
            })
            .collect();
        Ok(Self {
            name: cfg.name,
            paths: p,
            components,
        })
    }

    /// Components named in `names`, in manifest order, or all of them when
    /// `names` is empty.
    ///
    /// # Errors
    /// Any name that is not a configured component.
    pub fn select(&self, names: &[String]) -> Result<Vec<&ProjectComponent>> {
        if let Some(missing) = names
            .iter()
            .find(|n| !self.components.iter().any(|c| &c.cfg.name == *n))
        {
            bail!("unknown component: {}", missing);
        }
        Ok(self
            .components
            .iter()
            .filter(|c| names.is_empty() || names.contains(&c.cfg.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"
name = "demo"

[[components]]
name = "kernel"
url = "https://example.com/kernel.git"
revision = "main"

[[components]]
name = "libs"
url = "https://example.com/libs.git"
revision = "v1.0"
post_download = ["touch downloaded"]
"#;

    fn load(td: &Path) -> Project {
        let manifest = td.join("project.toml");
        fs::write(&manifest, MANIFEST).unwrap();
        Project::load(&manifest).unwrap()
    }

    #[test]
    fn components_live_under_src_dir() {
        let td = tempdir().unwrap();
        let prj = load(td.path());
        assert_eq!(prj.name, "demo");
        assert_eq!(prj.components[0].src_dir(), td.path().join("src").join("kernel"));
        assert_eq!(prj.components[1].revision(), "v1.0");
        assert_eq!(prj.components[1].scm_kind(), "git");
    }

    #[test]
    fn select_keeps_manifest_order() {
        let td = tempdir().unwrap();
        let prj = load(td.path());
        let all = prj.select(&[]).unwrap();
        assert_eq!(all.len(), 2);
        let some = prj
            .select(&["libs".to_string(), "kernel".to_string()])
            .unwrap();
        let names: Vec<_> = some.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["kernel", "libs"]);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let td = tempdir().unwrap();
        let prj = load(td.path());
        let err = prj.select(&["nope".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "unknown component: nope");
    }

    #[test]
    fn post_download_hook_runs_in_working_copy() {
        let td = tempdir().unwrap();
        let prj = load(td.path());
        let libs = &prj.components[1];
        fs::create_dir_all(libs.src_dir()).unwrap();
        libs.post_download_hook().unwrap();
        assert!(libs.src_dir().join("downloaded").exists());
        prj.components[0].post_update_hook().unwrap();
    }
}
