//! Autotools build driver.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use super::cmd::run_step;
use super::dir::BuildDir;
use super::types::{BuildError, BuildOutput, BuildStep, DriverConfig, StepOutput};
use super::BuildDriver;
use crate::platform::Settings;
use crate::resolve::ResolvedConfiguration;
use crate::util::fs::{copy_dir_all, remove_dir_if_exists, remove_files_with_suffix};
use crate::util::hash::{ContentHash, hash_directory};

/// Ignored when identifying a source tree.
const SOURCE_EXCLUDES: &[&str] = &[".git"];

/// Builds an extracted lely-core source tree with autotools.
///
/// The source tree is never modified: it is copied into a scoped build
/// directory first, because `autoreconf` regenerates files in place.
#[derive(Debug, Clone)]
pub struct AutotoolsDriver {
  source_dir: PathBuf,
  config: DriverConfig,
}

impl AutotoolsDriver {
  pub fn new(source_dir: impl Into<PathBuf>, config: DriverConfig) -> Self {
    Self {
      source_dir: source_dir.into(),
      config,
    }
  }

  /// Environment shared by every step: compiler programs and flags, then
  /// the configured overrides.
  pub fn environment(&self, settings: &Settings) -> BTreeMap<String, String> {
    let (cc, cxx) = settings.compiler.programs();
    let cflags = settings.build_type.cflags();

    let mut env = BTreeMap::new();
    env.insert("CC".to_string(), cc.to_string());
    env.insert("CXX".to_string(), cxx.to_string());
    env.insert("CFLAGS".to_string(), cflags.to_string());
    env.insert("CXXFLAGS".to_string(), cflags.to_string());
    env.extend(self.config.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
  }
}

impl BuildDriver for AutotoolsDriver {
  fn source_hash(&self) -> Result<Option<ContentHash>, BuildError> {
    if !self.source_dir.is_dir() {
      return Err(BuildError::MissingSource(self.source_dir.clone()));
    }
    Ok(Some(hash_directory(&self.source_dir, SOURCE_EXCLUDES)?))
  }

  async fn build(&mut self, config: &ResolvedConfiguration, package_dir: &Path) -> Result<BuildOutput, BuildError> {
    let started = Instant::now();

    if !self.source_dir.is_dir() {
      return Err(BuildError::MissingSource(self.source_dir.clone()));
    }
    let source = dunce::canonicalize(&self.source_dir)?;

    fs::create_dir_all(package_dir)?;
    let package_dir = dunce::canonicalize(package_dir)?;

    let build_dir = BuildDir::create(self.config.build_root.as_deref())?;
    let work = build_dir.path().join("src");
    copy_dir_all(&source, &work)?;

    let env = self.environment(&config.settings);
    let mut steps = Vec::new();

    let stdout = run_step(
      BuildStep::Autoreconf,
      &self.config.autoreconf,
      &["--force".to_string(), "--install".to_string()],
      &work,
      &env,
    )
    .await?;
    steps.push(StepOutput {
      step: BuildStep::Autoreconf,
      stdout,
    });

    let mut configure_args = config.configure_args.clone();
    configure_args.push(format!("--prefix={}", package_dir.display()));
    let stdout = run_step(BuildStep::Configure, &work.join("configure"), &configure_args, &work, &env).await?;
    steps.push(StepOutput {
      step: BuildStep::Configure,
      stdout,
    });

    let jobs = format!("-j{}", self.config.jobs.max(1));
    let stdout = run_step(BuildStep::Make, &self.config.make, &[jobs], &work, &env).await?;
    steps.push(StepOutput {
      step: BuildStep::Make,
      stdout,
    });

    let stdout = run_step(BuildStep::Install, &self.config.make, &["install".to_string()], &work, &env).await?;
    steps.push(StepOutput {
      step: BuildStep::Install,
      stdout,
    });

    package(&source, &package_dir)?;
    steps.push(StepOutput {
      step: BuildStep::Package,
      stdout: String::new(),
    });

    let duration = started.elapsed();
    info!(package_dir = %package_dir.display(), ?duration, "native build finished");

    Ok(BuildOutput {
      package_dir,
      steps,
      duration,
    })
  }
}

/// Trim the install tree: libtool archives and pkg-config files are dropped
/// in favour of the published component graph, and the license is copied in.
fn package(source: &Path, package_dir: &Path) -> Result<(), BuildError> {
  let lib_dir = package_dir.join("lib");
  remove_dir_if_exists(&lib_dir.join("pkgconfig"))?;
  let removed = remove_files_with_suffix(&lib_dir, ".la")?;
  info!(removed, "removed libtool archives");

  let license = source.join("LICENSE");
  if license.is_file() {
    let licenses = package_dir.join("licenses");
    fs::create_dir_all(&licenses)?;
    fs::copy(&license, licenses.join("LICENSE"))?;
  } else {
    warn!(source = %source.display(), "source tree has no LICENSE file");
  }
  Ok(())
}
