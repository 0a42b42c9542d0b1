use anyhow::{Context, Result};
use serde_json::json;

use lelypkg_lib::consts::PACKAGE_NAME;
use lelypkg_lib::platform::Settings;

use super::{GlobalArgs, load_inputs};
use crate::output::{print_json, print_stat};

pub fn cmd_info(global: &GlobalArgs) -> Result<()> {
  let inputs = load_inputs(global)?;
  let version = inputs.recipe.version();
  let host = Settings::detect().context("Could not detect host settings")?;

  if global.json {
    return print_json(&json!({
      "package": PACKAGE_NAME,
      "version": version,
      "host": host,
      "target": inputs.settings,
    }));
  }

  println!("{} {}", PACKAGE_NAME, version);
  print_stat("Platform", &host.triple());
  print_stat("Compiler", host.compiler.as_str());
  print_stat("Build type", host.build_type.as_str());
  if inputs.settings != host {
    print_stat("Target", &inputs.settings.to_string());
  }
  Ok(())
}
