//! The resolve, build and publish pipeline.
//!
//! Runs strictly in sequence: options are resolved against the settings,
//! one native build is awaited, then the component graph is published next
//! to the installed files. Any error stops the pipeline and is returned as
//! is; nothing is retried.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::build::{BuildDriver, BuildError, BuildOutput};
use crate::consts::{PACKAGE_INFO_FILE, PACKAGE_NAME};
use crate::graph::GraphError;
use crate::options::OptionRegistry;
use crate::platform::Settings;
use crate::publish::{PackageInfo, PublishError, PublishedComponent, publish, read_package_info, write_package_info};
use crate::resolve::{ConfigurationResolver, ResolveError, ResolvedConfiguration};
use crate::util::fs::remove_dir_if_exists;
use crate::util::hash::{ContentHash, DirHashError, HashError, Hashable, ObjectHash, hash_directory};

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Publish(#[from] PublishError),

  #[error("failed to hash configuration: {0}")]
  Hash(#[from] HashError),

  #[error("failed to hash package contents: {0}")]
  Content(#[from] DirHashError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Everything known about a configuration before building it.
#[derive(Debug, Clone)]
pub struct Plan {
  pub resolved: ResolvedConfiguration,
  pub hash: ObjectHash,
  pub components: BTreeMap<String, PublishedComponent>,
}

impl Plan {
  /// Hash naming the package built for this configuration from `source` at
  /// `version`.
  pub fn package_hash(&self, version: &str, source: Option<&ContentHash>) -> Result<ObjectHash, HashError> {
    PackageKey {
      name: PACKAGE_NAME,
      version,
      source,
      configuration: &self.hash,
    }
    .compute_hash()
  }
}

/// Everything that tells two builds of the package apart.
#[derive(Serialize)]
struct PackageKey<'a> {
  name: &'a str,
  version: &'a str,
  source: Option<&'a ContentHash>,
  configuration: &'a ObjectHash,
}

impl Hashable for PackageKey<'_> {}

/// Resolve a configuration and publish its component graph without building.
pub fn plan(options: OptionRegistry, settings: Settings) -> Result<Plan, PipelineError> {
  let mut resolver = ConfigurationResolver::new(options, settings);
  let resolved = resolver.resolve()?;
  let graph = resolver.component_graph()?;
  let components = publish(&graph, &resolved)?;
  let hash = resolved.compute_hash()?;

  Ok(Plan {
    resolved,
    hash,
    components,
  })
}

#[derive(Debug, Clone)]
pub struct RunOptions {
  /// Package directories are created under here, one per version, source
  /// tree and configuration.
  pub out_dir: PathBuf,
  pub version: String,
  /// Rebuild even if a finished package for the configuration exists.
  pub force: bool,
}

#[derive(Debug)]
pub struct Outcome {
  pub package_dir: PathBuf,
  pub info: PackageInfo,
  /// `None` when an existing package was reused.
  pub build: Option<BuildOutput>,
}

impl Outcome {
  pub fn is_cached(&self) -> bool {
    self.build.is_none()
  }
}

/// Resolve, build with `driver`, and publish.
///
/// The package info file is written last and marks a finished package. A
/// package directory without a readable info file, or whose info names a
/// different version or source tree, is discarded and rebuilt.
pub async fn run<D: BuildDriver>(
  options: OptionRegistry,
  settings: Settings,
  driver: &mut D,
  run_options: &RunOptions,
) -> Result<Outcome, PipelineError> {
  let plan = plan(options, settings)?;
  let source_hash = driver.source_hash()?;
  let package_hash = plan.package_hash(&run_options.version, source_hash.as_ref())?;
  let package_dir = run_options.out_dir.join(&package_hash.0);

  if !run_options.force
    && let Some(info) = finished_package(&package_dir)?
    && info.package_hash == package_hash
    && info.version == run_options.version
    && info.source_hash == source_hash
  {
    info!(package_dir = %package_dir.display(), "package already built");
    return Ok(Outcome {
      package_dir,
      info,
      build: None,
    });
  }

  if remove_dir_if_exists(&package_dir)? {
    info!(package_dir = %package_dir.display(), "removed stale package directory");
  }

  info!(
    hash = %package_hash,
    configuration = %plan.hash,
    version = %run_options.version,
    settings = %plan.resolved.settings,
    "building package"
  );
  let build = driver.build(&plan.resolved, &package_dir).await?;
  let content_hash = hash_directory(&build.package_dir, &[PACKAGE_INFO_FILE])?;

  let info = PackageInfo {
    name: PACKAGE_NAME.to_string(),
    version: run_options.version.clone(),
    package_hash,
    configuration_hash: plan.hash,
    source_hash,
    settings: plan.resolved.settings,
    options: plan.resolved.options,
    configure_args: plan.resolved.configure_args,
    components: plan.components,
    content_hash: Some(content_hash),
  };
  write_package_info(&build.package_dir, &info)?;

  Ok(Outcome {
    package_dir: build.package_dir.clone(),
    info,
    build: Some(build),
  })
}

/// Info of the finished package in `package_dir`, if any. An info file
/// that does not parse is treated as missing.
fn finished_package(package_dir: &Path) -> Result<Option<PackageInfo>, PublishError> {
  match read_package_info(package_dir) {
    Err(PublishError::Json { path, source }) => {
      warn!(path = %path, error = %source, "discarding unreadable package info");
      Ok(None)
    }
    other => other,
  }
}
