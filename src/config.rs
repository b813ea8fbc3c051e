use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level project manifest loaded from `project.toml`.
///
/// Example TOML:
/// ```toml
/// name = "my-project"
/// src_dir = "src"
///
/// [[components]]
/// name     = "kernel"
/// url      = "https://github.com/org/kernel.git"
/// revision = "main"
/// post_download = ["./bootstrap.sh"]
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub src_dir: Option<PathBuf>,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// A single `[[components]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct ComponentConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_scm")]
    pub scm: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub post_download: Vec<String>,
    #[serde(default)]
    pub post_update: Vec<String>,
}

fn default_scm() -> String {
    "git".to_string()
}

impl Config {
    /// Reject manifests whose components cannot be mapped to distinct
    /// working copies.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for c in &self.components {
            let name = c.name.as_str();
            if name.trim().is_empty() {
                bail!("component with url '{}' has no name", c.url);
            }
            if name != name.trim()
                || name == "."
                || name.contains("..")
                || name.contains(['/', '\\'])
            {
                bail!("invalid component name: {}", name);
            }
            if !seen.insert(name) {
                bail!("duplicate component: {}", name);
            }
            if c.url.trim().is_empty() {
                bail!("component {} has no url", name);
            }
            if c.revision.trim().is_empty() {
                bail!("component {} has no revision", name);
            }
        }
        Ok(())
    }
}

/// Parse manifest text. Exposed separately from [`load_config`] so callers
/// holding the text in memory don't need a file.
pub fn parse_config(txt: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(txt).context("failed to parse project manifest")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load and validate the manifest at `path`.
///
/// # Errors
/// - The file cannot be read (the message includes the path).
/// - The TOML is malformed or fails [`Config::validate`].
pub fn load_config(path: &Path) -> Result<Config> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("project manifest not found: {}", path.display()))?;
    parse_config(&txt).with_context(|| format!("in {}", path.display()))
}
