//! Implementation of the `lelypkg options` command.
//!
//! Lists every declared option with its default and the value that will be
//! resolved for the current recipe and host. Options removed by platform
//! rules are shown as removed.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use lelypkg_lib::options::{OPTIONS, OptionKind};
use lelypkg_lib::resolve::ConfigurationResolver;

use super::{GlobalArgs, load_inputs};
use crate::output::{print_info, print_json, symbols};

#[derive(Serialize)]
struct OptionRow {
  name: &'static str,
  default: bool,
  kind: OptionKind,
  /// `None` when removed for the target platform.
  value: Option<bool>,
}

pub fn cmd_options(global: &GlobalArgs) -> Result<()> {
  let inputs = load_inputs(global)?;
  let resolver = ConfigurationResolver::new(inputs.options, inputs.settings);
  let options = resolver.options();

  let rows: Vec<OptionRow> = OPTIONS
    .iter()
    .map(|def| OptionRow {
      name: def.name,
      default: def.default,
      kind: def.kind,
      value: options.get_safe(def.name),
    })
    .collect();

  if global.json {
    return print_json(&rows);
  }

  print_info(&format!("Options for {}", resolver.settings()));
  for row in &rows {
    let value = match row.value {
      Some(value) => value.to_string(),
      None => "removed".to_string(),
    };
    let marker = if row.value == Some(row.default) {
      " "
    } else {
      symbols::MODIFY
    };
    let line = format!("  {} {:<16} {}", marker, row.name, value);
    if row.value == Some(row.default) {
      println!("{}", line);
    } else {
      println!("{}", line.if_supports_color(Stream::Stdout, |s| s.yellow()));
    }
    if global.verbose {
      println!(
        "      {}",
        format!("default {}", row.default).if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  Ok(())
}
