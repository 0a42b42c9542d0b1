use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::platform::Settings;
use crate::util::hash::Hashable;

/// Arguments passed to every configure run, ahead of option flags.
pub const FIXED_CONFIGURE_ARGS: &[&str] = &[
  "--disable-cython",
  "--disable-python",
  "--disable-tools",
  "--disable-dependency-tracking",
  "--disable-maintainer-mode",
];

/// Lifecycle of a [`ConfigurationResolver`](super::ConfigurationResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveState {
  Unresolved,
  Validated,
  Resolved,
  /// Settings failed validation. Terminal.
  Rejected,
}

impl std::fmt::Display for ResolveState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::Unresolved => "unresolved",
      Self::Validated => "validated",
      Self::Resolved => "resolved",
      Self::Rejected => "rejected",
    };
    write!(f, "{}", s)
  }
}

/// The concrete configure invocation and component set for one option state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
  pub settings: Settings,

  /// Every present option and its value. Removed options are absent.
  pub options: BTreeMap<String, bool>,

  pub enabled_options: BTreeSet<String>,

  /// Flags derived from option values, in option-name order.
  pub feature_flags: Vec<String>,

  /// Complete argument list for `configure`, excluding the install prefix.
  pub configure_args: Vec<String>,

  pub enabled_components: BTreeSet<String>,
}

impl Hashable for ResolvedConfiguration {}

impl ResolvedConfiguration {
  /// Feature flags that turn off a default-enabled feature.
  pub fn disabled_flags(&self) -> impl Iterator<Item = &str> {
    self
      .feature_flags
      .iter()
      .map(String::as_str)
      .filter(|flag| flag.starts_with("--disable-"))
  }

  pub fn is_component_enabled(&self, component: &str) -> bool {
    self.enabled_components.contains(component)
  }
}
