use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::platform::Settings;
use crate::util::hash::{ContentHash, ObjectHash};

/// A component as consumers link against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedComponent {
  pub name: String,

  /// Linker name, e.g. `lely-can` for `-llely-can`.
  pub library_name: String,

  pub pkg_config_name: String,

  /// Direct requirements, in declaration order.
  pub requires: Vec<String>,

  pub transitive_requires: BTreeSet<String>,

  /// System libraries of the component and everything it requires.
  pub system_libs: BTreeSet<String>,
}

impl PublishedComponent {
  /// Linker flags for this component alone, without its requirements.
  pub fn link_flags(&self) -> Vec<String> {
    std::iter::once(format!("-l{}", self.library_name))
      .chain(self.system_libs.iter().map(|lib| format!("-l{}", lib)))
      .collect()
  }
}

/// Everything a consumer needs to know about an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
  pub name: String,
  pub version: String,
  /// Names the package directory. Covers version, sources and configuration.
  pub package_hash: ObjectHash,
  pub configuration_hash: ObjectHash,
  /// Hash of the source tree the package was built from, if known.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_hash: Option<ContentHash>,
  pub settings: Settings,
  pub options: BTreeMap<String, bool>,
  pub configure_args: Vec<String>,
  pub components: BTreeMap<String, PublishedComponent>,

  /// Hash of the installed files. Absent when nothing was built.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_hash: Option<ContentHash>,
}
