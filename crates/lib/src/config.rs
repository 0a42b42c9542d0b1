//! Recipe configuration.
//!
//! A recipe file pins the package version, target settings and option
//! values:
//!
//! ```toml
//! [package]
//! version = "2.3.2"
//!
//! [settings]
//! os = "linux"
//! compiler = "gcc"
//! build_type = "Release"
//!
//! [options]
//! shared = false
//! "ecss-compliance" = true
//! ```
//!
//! Every section is optional. Settings that are not given are detected from
//! the host.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::DEFAULT_VERSION;
use crate::options::{OptionError, OptionRegistry};
use crate::platform::{Arch, BuildType, Compiler, Os, SettingError, Settings};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error(transparent)]
  Option(#[from] OptionError),

  #[error(transparent)]
  Setting(#[from] SettingError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeConfig {
  #[serde(default)]
  pub package: PackageSection,

  #[serde(default)]
  pub settings: SettingsSection,

  #[serde(default)]
  pub options: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
  pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSection {
  pub os: Option<String>,
  pub arch: Option<String>,
  pub compiler: Option<String>,
  pub build_type: Option<String>,
}

impl RecipeConfig {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), options = config.options.len(), "loaded recipe configuration");
    Ok(config)
  }

  /// Load `path` if it exists, otherwise use an empty configuration.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if path.exists() {
      Self::load(path)
    } else {
      debug!(path = %path.display(), "no recipe configuration, using defaults");
      Ok(Self::default())
    }
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  pub fn version(&self) -> &str {
    self.package.version.as_deref().unwrap_or(DEFAULT_VERSION)
  }

  /// Settings from the file, with missing values detected from the host.
  pub fn settings(&self) -> Result<Settings, ConfigError> {
    let section = &self.settings;

    let os = match &section.os {
      Some(os) => os.parse::<Os>()?,
      None => Os::current().ok_or(SettingError::UndetectedHost("os"))?,
    };
    let arch = match &section.arch {
      Some(arch) => arch.parse::<Arch>()?,
      None => Arch::current().ok_or(SettingError::UndetectedHost("arch"))?,
    };
    let compiler = match &section.compiler {
      Some(compiler) => compiler.parse::<Compiler>()?,
      None => Compiler::detect(os),
    };
    let build_type = match &section.build_type {
      Some(build_type) => build_type.parse::<BuildType>()?,
      None => BuildType::default(),
    };

    Ok(Settings::new(os, arch, compiler, build_type))
  }

  /// Default options, then the file's options, then `overrides` in order.
  pub fn option_registry<'a, I>(&self, overrides: I) -> Result<OptionRegistry, ConfigError>
  where
    I: IntoIterator<Item = (&'a str, bool)>,
  {
    let from_file = self.options.iter().map(|(name, value)| (name.as_str(), *value));
    let mut registry = OptionRegistry::with_overrides(from_file)?;
    for (name, value) in overrides {
      registry.set(name, value)?;
    }
    Ok(registry)
  }
}
