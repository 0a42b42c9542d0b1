use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Os, SettingError};

/// C/C++ compiler families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
  Gcc,
  Clang,
  AppleClang,
  Msvc,
}

impl Compiler {
  /// Detect the compiler from the `CC` environment variable, falling back to
  /// the usual toolchain of `os`.
  pub fn detect(os: Os) -> Self {
    std::env::var("CC")
      .ok()
      .and_then(|cc| Self::from_program(&cc))
      .unwrap_or_else(|| Self::default_for(os))
  }

  /// Classify a compiler program name such as `gcc-13` or `/usr/bin/clang`.
  pub fn from_program(program: &str) -> Option<Self> {
    let name = std::path::Path::new(program).file_name()?.to_str()?.to_ascii_lowercase();
    if name == "cl" || name == "cl.exe" {
      Some(Self::Msvc)
    } else if name.contains("clang") {
      Some(Self::Clang)
    } else if name.contains("gcc") || name == "cc" {
      Some(Self::Gcc)
    } else {
      None
    }
  }

  pub fn default_for(os: Os) -> Self {
    match os {
      Os::Linux => Self::Gcc,
      Os::MacOs => Self::AppleClang,
      Os::Windows => Self::Msvc,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Gcc => "gcc",
      Self::Clang => "clang",
      Self::AppleClang => "apple-clang",
      Self::Msvc => "msvc",
    }
  }

  /// Program names exported as `CC` and `CXX` to the native build.
  pub fn programs(&self) -> (&'static str, &'static str) {
    match self {
      Self::Gcc => ("gcc", "g++"),
      Self::Clang | Self::AppleClang => ("clang", "clang++"),
      Self::Msvc => ("cl", "cl"),
    }
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Compiler {
  type Err = SettingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "gcc" => Ok(Self::Gcc),
      "clang" => Ok(Self::Clang),
      "apple-clang" => Ok(Self::AppleClang),
      "msvc" => Ok(Self::Msvc),
      _ => Err(SettingError::UnknownValue {
        setting: "compiler",
        value: s.to_string(),
      }),
    }
  }
}

/// Optimization profile of the native build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
  #[default]
  Release,
  Debug,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Release => "Release",
      Self::Debug => "Debug",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }

  /// Optimization flags passed as `CFLAGS`/`CXXFLAGS`.
  pub fn cflags(&self) -> &'static str {
    match self {
      Self::Release => "-O3",
      Self::Debug => "-g",
      Self::RelWithDebInfo => "-O2 -g",
      Self::MinSizeRel => "-Os",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = SettingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "release" => Ok(Self::Release),
      "debug" => Ok(Self::Debug),
      "relwithdebinfo" => Ok(Self::RelWithDebInfo),
      "minsizerel" => Ok(Self::MinSizeRel),
      _ => Err(SettingError::UnknownValue {
        setting: "build_type",
        value: s.to_string(),
      }),
    }
  }
}
