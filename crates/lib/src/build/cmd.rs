//! Running external toolchain commands.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use super::types::{BuildError, BuildStep};
use crate::consts::SOURCE_DATE_EPOCH;

/// Run one build step to completion and return its trimmed stdout.
///
/// The inherited environment is kept (autotools needs `PATH`), with a fixed
/// `C` locale and `SOURCE_DATE_EPOCH` for reproducible output. `env` is
/// applied last and may override both. A nonzero exit becomes
/// [`BuildError::Toolchain`] carrying the captured output; there is no retry.
pub async fn run_step(
  step: BuildStep,
  program: &Path,
  args: &[String],
  cwd: &Path,
  env: &BTreeMap<String, String>,
) -> Result<String, BuildError> {
  let cmd = render(program, args);
  info!(%step, cmd = %cmd, "running build step");

  let mut command = Command::new(program);
  command
    .args(args)
    .current_dir(cwd)
    .env("LANG", "C")
    .env("LC_ALL", "C")
    .env("SOURCE_DATE_EPOCH", SOURCE_DATE_EPOCH)
    .envs(env);

  debug!(%step, working_dir = ?cwd, "spawning process");

  let output = command.output().await.map_err(|source| BuildError::Spawn {
    program: program.display().to_string(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
  let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

  if !output.status.success() {
    if !stderr.is_empty() {
      debug!(%step, stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(%step, stdout = %stdout, "command stdout");
    }

    return Err(BuildError::Toolchain {
      step,
      cmd,
      code: output.status.code(),
      stdout,
      stderr,
    });
  }

  let stdout = stdout.trim().to_string();
  if !stdout.is_empty() {
    debug!(%step, stdout = %stdout, "command output");
  }

  Ok(stdout)
}

fn render(program: &Path, args: &[String]) -> String {
  std::iter::once(program.display().to_string())
    .chain(args.iter().cloned())
    .collect::<Vec<_>>()
    .join(" ")
}
