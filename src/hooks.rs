use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Environment handed to hook commands.
pub struct HookEnv<'a> {
    pub component: &'a str,
    pub revision: &'a str,
}

/// Run each command of a hook through `sh -c` inside `cwd`.
///
/// Stops at the first command that cannot be spawned or exits non-zero.
/// Output is captured and forwarded to the log (stdout at `info`, stderr at
/// `warn`) so it doesn't draw over the progress spinners.
pub fn run_hook(kind: &str, commands: &[String], cwd: &Path, env: &HookEnv) -> Result<()> {
    if commands.is_empty() {
        debug!(hook = kind, component = env.component, "no commands");
        return Ok(());
    }
    for cmd in commands {
        info!(hook = kind, component = env.component, cmd = cmd.as_str(), "running hook");
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .current_dir(cwd)
            .env("BARBICAN_COMPONENT", env.component)
            .env("BARBICAN_REVISION", env.revision)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn {} hook: {}", kind, cmd))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            info!(hook = kind, component = env.component, "{}", line);
        }
        for line in stderr.lines() {
            warn!(hook = kind, component = env.component, "{}", line);
        }

        if !output.status.success() {
            let detail = stderr.trim();
            if detail.is_empty() {
                bail!("{} hook `{}` failed ({})", kind, cmd, output.status);
            }
            bail!("{} hook `{}` failed ({}): {}", kind, cmd, output.status, detail);
        }
    }
    Ok(())
}
