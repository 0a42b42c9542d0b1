//! Implementation of the `lelypkg build` command.
//!
//! Runs the full pipeline against an extracted source tree: resolve, one
//! autotools build, then publish the component graph into the package
//! directory `<out>/<package hash>`. The package hash covers the recipe
//! version, the source tree and the resolved configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use lelypkg_lib::build::{AutotoolsDriver, DriverConfig};
use lelypkg_lib::pipeline::{RunOptions, run};

use super::{GlobalArgs, load_inputs};
use crate::output::{format_duration, print_info, print_json, print_stat, print_success};

pub fn cmd_build(global: &GlobalArgs, source: PathBuf, out: PathBuf, jobs: Option<usize>, force: bool) -> Result<()> {
  let inputs = load_inputs(global)?;

  let mut config = DriverConfig::default();
  if let Some(jobs) = jobs {
    config.jobs = jobs;
  }
  let mut driver = AutotoolsDriver::new(source, config);

  let run_options = RunOptions {
    out_dir: out,
    version: inputs.recipe.version().to_string(),
    force,
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt
    .block_on(run(inputs.options, inputs.settings, &mut driver, &run_options))
    .context("Build failed")?;

  info!(package_dir = %outcome.package_dir.display(), "package ready");

  if global.json {
    return print_json(&outcome.info);
  }

  println!();
  match &outcome.build {
    Some(build) => {
      print_success("Build complete!");
      print_stat("Duration", &format_duration(build.duration));
      if global.verbose {
        for step in &build.steps {
          print_stat("Step", &step.step.to_string());
        }
      }
    }
    None => print_info("Package already built, nothing to do"),
  }
  print_stat("Version", &outcome.info.version);
  print_stat("Package hash", &outcome.info.package_hash.to_string());
  print_stat("Configuration", &outcome.info.configuration_hash.to_string());
  print_stat("Components", &outcome.info.components.len().to_string());
  print_stat("Package", &outcome.package_dir.display().to_string());

  Ok(())
}
