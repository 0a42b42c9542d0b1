use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::util::hash::DirHashError;

/// Stages of a native build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStep {
  Autoreconf,
  Configure,
  Make,
  Install,
  Package,
}

impl fmt::Display for BuildStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Autoreconf => "autoreconf",
      Self::Configure => "configure",
      Self::Make => "make",
      Self::Install => "install",
      Self::Package => "package",
    };
    write!(f, "{}", s)
  }
}

#[derive(Debug, Error)]
pub enum BuildError {
  /// The external toolchain exited unsuccessfully. Output is kept verbatim.
  #[error("{step} failed with exit code {code:?}: {cmd}\n{stderr}")]
  Toolchain {
    step: BuildStep,
    cmd: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("source directory not found: {}", .0.display())]
  MissingSource(PathBuf),

  #[error("failed to hash source tree: {0}")]
  SourceHash(#[from] DirHashError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Captured output of one build step.
#[derive(Debug, Clone)]
pub struct StepOutput {
  pub step: BuildStep,
  pub stdout: String,
}

/// Result of a successful native build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
  /// Install prefix holding the packaged libraries and headers.
  pub package_dir: PathBuf,
  pub steps: Vec<StepOutput>,
  pub duration: Duration,
}

/// Knobs for [`AutotoolsDriver`](super::AutotoolsDriver).
#[derive(Debug, Clone)]
pub struct DriverConfig {
  /// Parallel jobs passed to `make`.
  pub jobs: usize,

  pub autoreconf: PathBuf,

  pub make: PathBuf,

  /// Extra environment for every step, applied last.
  pub env: BTreeMap<String, String>,

  /// Where scoped build directories are created. System temp dir if `None`.
  pub build_root: Option<PathBuf>,
}

impl Default for DriverConfig {
  fn default() -> Self {
    Self {
      jobs: num_cpus(),
      autoreconf: PathBuf::from("autoreconf"),
      make: PathBuf::from("make"),
      env: BTreeMap::new(),
      build_root: None,
    }
  }
}

fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
