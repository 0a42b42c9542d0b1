//! Implementation of the `lelypkg graph` command.
//!
//! Prints the component graph consumers link against, as it would be
//! published for the current configuration, without building anything.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use lelypkg_lib::pipeline::plan;

use super::{GlobalArgs, load_inputs};
use crate::output::{print_json, symbols};

pub fn cmd_graph(global: &GlobalArgs) -> Result<()> {
  let inputs = load_inputs(global)?;
  let plan = plan(inputs.options, inputs.settings).context("Failed to resolve configuration")?;

  if global.json {
    return print_json(&plan.components);
  }

  for component in plan.components.values() {
    println!(
      "{} {}",
      component.name.if_supports_color(Stream::Stdout, |s| s.bold()),
      format!("({})", component.pkg_config_name).if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
    for requirement in &component.requires {
      println!("  {} {}", symbols::ARROW, requirement);
    }
    if global.verbose && !component.transitive_requires.is_empty() {
      let all: Vec<&str> = component.transitive_requires.iter().map(String::as_str).collect();
      println!("  transitive: {}", all.join(", "));
    }
    println!("  link: {}", component.link_flags().join(" "));
  }

  Ok(())
}
