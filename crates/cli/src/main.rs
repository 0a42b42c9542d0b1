mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lelypkg_lib::consts::DEFAULT_CONFIG_FILE;

use crate::cmd::GlobalArgs;
use crate::output::print_error;

/// lelypkg - feature-gated builds of lely-core
#[derive(Parser)]
#[command(name = "lelypkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Recipe configuration file
  #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
  config: PathBuf,

  /// Override an option, e.g. `-o sync=false`. Repeatable.
  #[arg(short = 'o', long = "option", global = true, value_name = "NAME=VALUE")]
  options: Vec<String>,

  /// Print structured output as JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List declared options with their defaults and effective values
  Options,

  /// Resolve the configuration without building
  Resolve,

  /// Show the published component graph without building
  Graph,

  /// Build and package lely-core from an extracted source tree
  Build {
    /// Extracted lely-core source directory
    #[arg(long)]
    source: PathBuf,

    /// Directory package directories are created under
    #[arg(long, default_value = "lelypkg-out")]
    out: PathBuf,

    /// Parallel make jobs (default: available CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Rebuild even if the package already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Show the recipe version and detected host settings
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let global = GlobalArgs {
    config: cli.config,
    options: cli.options,
    verbose: cli.verbose,
    json: cli.json,
  };

  let result = match cli.command {
    Commands::Options => cmd::cmd_options(&global),
    Commands::Resolve => cmd::cmd_resolve(&global),
    Commands::Graph => cmd::cmd_graph(&global),
    Commands::Build {
      source,
      out,
      jobs,
      force,
    } => cmd::cmd_build(&global, source, out, jobs, force),
    Commands::Info => cmd::cmd_info(&global),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&err);
      ExitCode::FAILURE
    }
  }
}
