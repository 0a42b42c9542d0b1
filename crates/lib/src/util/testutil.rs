//! Test helpers shared across modules.

use crate::platform::{Arch, BuildType, Compiler, Os, Settings};

/// Linux/GCC release settings, the supported target.
pub fn linux_gcc() -> Settings {
  Settings::new(Os::Linux, Arch::X86_64, Compiler::Gcc, BuildType::Release)
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &std::path::Path, body: &str) {
  use std::os::unix::fs::PermissionsExt;

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
