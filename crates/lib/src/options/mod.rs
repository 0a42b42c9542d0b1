//! Option registry.
//!
//! Holds the value of every declared option (see [`OPTIONS`]). Names outside
//! the declared table are rejected, so an undeclared option can never reach
//! the resolved configure flags.
//!
//! Platform rules may remove options (for example `fPIC` on Windows). Removal
//! happens once, before resolution, and is never re-evaluated.

mod types;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::{Os, Settings};

pub use types::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
  #[error("unknown option '{0}'")]
  UnknownOption(String),

  #[error("option '{0}' was removed for this platform")]
  RemovedOption(String),

  #[error("invalid option assignment '{input}': {reason}")]
  InvalidAssignment { input: String, reason: String },
}

/// Current option values, keyed by declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRegistry {
  values: BTreeMap<&'static str, bool>,
  platform_applied: bool,
}

impl Default for OptionRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl OptionRegistry {
  /// A registry with every declared option at its default.
  pub fn new() -> Self {
    Self {
      values: OPTIONS.iter().map(|def| (def.name, def.default)).collect(),
      platform_applied: false,
    }
  }

  /// Build a registry from defaults plus `overrides`, applied in order.
  pub fn with_overrides<'a, I>(overrides: I) -> Result<Self, OptionError>
  where
    I: IntoIterator<Item = (&'a str, bool)>,
  {
    let mut registry = Self::new();
    for (name, value) in overrides {
      registry.set(name, value)?;
    }
    Ok(registry)
  }

  pub fn get(&self, name: &str) -> Result<bool, OptionError> {
    let def = option_def(name).ok_or_else(|| OptionError::UnknownOption(name.to_string()))?;
    self
      .values
      .get(def.name)
      .copied()
      .ok_or_else(|| OptionError::RemovedOption(name.to_string()))
  }

  /// Value of `name`, or `None` when it is undeclared or removed.
  pub fn get_safe(&self, name: &str) -> Option<bool> {
    self.values.get(name).copied()
  }

  pub fn set(&mut self, name: &str, value: bool) -> Result<(), OptionError> {
    let def = option_def(name).ok_or_else(|| OptionError::UnknownOption(name.to_string()))?;
    let slot = self
      .values
      .get_mut(def.name)
      .ok_or_else(|| OptionError::RemovedOption(name.to_string()))?;
    *slot = value;
    Ok(())
  }

  /// Whether a declared option is still present.
  pub fn contains(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  /// Remove an option if it is present. Returns whether it was removed.
  fn remove(&mut self, name: &str) -> bool {
    self.values.remove(name).is_some()
  }

  /// Apply the platform rules to the registry.
  ///
  /// `fPIC` is removed on Windows and when `shared` is enabled. Only the first
  /// call has any effect.
  pub fn apply_platform_rules(&mut self, settings: &Settings) {
    if self.platform_applied {
      warn!("platform rules already applied, ignoring");
      return;
    }
    self.platform_applied = true;

    if settings.os == Os::Windows && self.remove(FPIC) {
      debug!(option = FPIC, os = %settings.os, "removed option for platform");
    }
    if self.get_safe(SHARED) == Some(true) && self.remove(FPIC) {
      debug!(option = FPIC, "removed option for shared build");
    }
  }

  pub fn platform_applied(&self) -> bool {
    self.platform_applied
  }

  /// Iterate present options in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
    self.values.iter().map(|(name, value)| (*name, *value))
  }

  /// Options whose value differs from the declared default.
  pub fn changed(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
    self
      .iter()
      .filter(|(name, value)| option_def(name).is_some_and(|def| def.default != *value))
  }
}

/// Parse a `name=value` assignment.
///
/// Values accept `true`/`false` in any case as well as `1`/`0`.
pub fn parse_assignment(input: &str) -> Result<(&str, bool), OptionError> {
  let invalid = |reason: &str| OptionError::InvalidAssignment {
    input: input.to_string(),
    reason: reason.to_string(),
  };

  let (name, value) = input.split_once('=').ok_or_else(|| invalid("expected name=value"))?;
  let name = name.trim();
  if name.is_empty() {
    return Err(invalid("missing option name"));
  }

  let value = match value.trim().to_ascii_lowercase().as_str() {
    "true" | "1" => true,
    "false" | "0" => false,
    _ => return Err(invalid("value must be true or false")),
  };

  Ok((name, value))
}
