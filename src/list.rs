use anyhow::Result;
use std::path::Path;

use crate::project::Project;
use crate::scm::Component;

/// CLI command: print the components of the project.
///
/// Example output:
/// ```text
/// - kernel (git) @ main <https://github.com/org/kernel.git>
/// - libs (git) @ v1.0 <https://github.com/org/libs.git>
/// ```
///
/// # Errors
/// Returns an error if the manifest cannot be loaded or parsed.
pub fn cmd_list(manifest: &Path) -> Result<()> {
    let prj = Project::load(manifest)?;
    for c in &prj.components {
        println!("{}", list_line(c));
    }
    Ok(())
}

fn list_line(c: &dyn Component) -> String {
    format!(
        "- {} ({}) @ {} <{}>",
        c.name(),
        c.scm_kind(),
        c.revision(),
        c.url()
    )
}
