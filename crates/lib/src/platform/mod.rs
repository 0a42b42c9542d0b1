//! Target settings for a recipe.
//!
//! A [`Settings`] value pins the operating system, architecture, compiler and
//! build type a configuration is resolved for. Values are either detected from
//! the host or read from the recipe configuration file.

pub mod arch;
pub mod compiler;
pub mod os;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use arch::Arch;
pub use compiler::{BuildType, Compiler};
pub use os::Os;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingError {
  #[error("unknown {setting} '{value}'")]
  UnknownValue { setting: &'static str, value: String },

  #[error("host {0} is not supported; set it explicitly in the recipe configuration")]
  UndetectedHost(&'static str),
}

/// The full set of settings a configuration is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
  pub os: Os,
  pub arch: Arch,
  pub compiler: Compiler,
  pub build_type: BuildType,
}

impl Settings {
  pub fn new(os: Os, arch: Arch, compiler: Compiler, build_type: BuildType) -> Self {
    Self {
      os,
      arch,
      compiler,
      build_type,
    }
  }

  /// Detect settings for the host.
  pub fn detect() -> Result<Self, SettingError> {
    let os = Os::current().ok_or(SettingError::UndetectedHost("os"))?;
    let arch = Arch::current().ok_or(SettingError::UndetectedHost("arch"))?;
    Ok(Self {
      os,
      arch,
      compiler: Compiler::detect(os),
      build_type: BuildType::default(),
    })
  }

  /// Returns the platform triple string (e.g., "x86_64-linux")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.triple(), self.compiler, self.build_type)
  }
}
