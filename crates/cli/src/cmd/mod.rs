mod build;
mod graph;
mod info;
mod options;
mod resolve;

use std::path::PathBuf;

use anyhow::{Context, Result};

use lelypkg_lib::config::RecipeConfig;
use lelypkg_lib::options::{OptionRegistry, parse_assignment};
use lelypkg_lib::platform::Settings;

pub use build::cmd_build;
pub use graph::cmd_graph;
pub use info::cmd_info;
pub use options::cmd_options;
pub use resolve::cmd_resolve;

/// Flags shared by every subcommand.
pub struct GlobalArgs {
  pub config: PathBuf,
  pub options: Vec<String>,
  pub verbose: bool,
  pub json: bool,
}

/// Recipe, settings and option values after applying `-o` overrides.
pub struct Inputs {
  pub recipe: RecipeConfig,
  pub settings: Settings,
  pub options: OptionRegistry,
}

pub fn load_inputs(global: &GlobalArgs) -> Result<Inputs> {
  let recipe = RecipeConfig::load_or_default(&global.config)
    .with_context(|| format!("Failed to load recipe: {}", global.config.display()))?;

  let overrides = global
    .options
    .iter()
    .map(|assignment| parse_assignment(assignment))
    .collect::<Result<Vec<_>, _>>()?;

  let options = recipe.option_registry(overrides).context("Invalid option")?;
  let settings = recipe.settings().context("Invalid settings")?;

  Ok(Inputs {
    recipe,
    settings,
    options,
  })
}
