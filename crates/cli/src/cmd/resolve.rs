//! Implementation of the `lelypkg resolve` command.

use anyhow::{Context, Result};
use serde_json::json;

use lelypkg_lib::pipeline::plan;

use super::{GlobalArgs, load_inputs};
use crate::output::{print_json, print_stat, print_success};

pub fn cmd_resolve(global: &GlobalArgs) -> Result<()> {
  let inputs = load_inputs(global)?;
  let plan = plan(inputs.options, inputs.settings).context("Failed to resolve configuration")?;
  let resolved = &plan.resolved;

  if global.json {
    return print_json(&json!({
      "hash": plan.hash,
      "version": inputs.recipe.version(),
      "configuration": resolved,
    }));
  }

  print_success(&format!("Resolved {}", plan.hash));
  print_stat("Settings", &resolved.settings.to_string());
  print_stat("Version", inputs.recipe.version());
  print_stat("Enabled options", &resolved.enabled_options.len().to_string());

  let flags = if resolved.feature_flags.is_empty() {
    "(none)".to_string()
  } else {
    resolved.feature_flags.join(" ")
  };
  print_stat("Feature flags", &flags);

  let components: Vec<&str> = resolved.enabled_components.iter().map(String::as_str).collect();
  print_stat("Components", &components.join(", "));

  println!();
  println!("Configure arguments:");
  for arg in &resolved.configure_args {
    println!("  {}", arg);
  }

  Ok(())
}
