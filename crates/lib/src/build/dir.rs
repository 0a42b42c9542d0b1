//! Scoped build directories.

use std::io;
use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use crate::consts::APP_NAME;

/// A temporary directory holding one native build.
///
/// The directory and everything in it is removed when the value is dropped,
/// whether the build succeeded or not.
#[derive(Debug)]
pub struct BuildDir {
  dir: TempDir,
}

impl BuildDir {
  /// Create a fresh build directory under `root`, or the system temp dir.
  pub fn create(root: Option<&Path>) -> io::Result<Self> {
    let mut builder = tempfile::Builder::new();
    let prefix = format!("{}-build-", APP_NAME);
    builder.prefix(&prefix);
    let dir = match root {
      Some(root) => {
        std::fs::create_dir_all(root)?;
        builder.tempdir_in(root)?
      }
      None => builder.tempdir()?,
    };
    debug!(path = %dir.path().display(), "created build directory");
    Ok(Self { dir })
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }
}

impl Drop for BuildDir {
  fn drop(&mut self) {
    debug!(path = %self.dir.path().display(), "removing build directory");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn removed_on_drop() {
    let root = TempDir::new().unwrap();
    let path = {
      let dir = BuildDir::create(Some(root.path())).unwrap();
      std::fs::write(dir.path().join("config.log"), "checking for gcc").unwrap();
      dir.path().to_path_buf()
    };
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
  }

  #[test]
  fn creates_missing_root() {
    let root = TempDir::new().unwrap();
    let nested = root.path().join("a/b");
    let dir = BuildDir::create(Some(&nested)).unwrap();
    assert!(dir.path().starts_with(&nested));
  }
}
