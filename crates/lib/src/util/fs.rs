//! Filesystem helpers for staging sources and trimming installed packages.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Copy a directory tree, preserving file permissions and symlinks.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
  fs::create_dir_all(dst)?;
  for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(io::Error::other)?;
    let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
    let target = dst.join(rel);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      fs::create_dir_all(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(fs::read_link(src)?, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  fs::copy(src, dst).map(|_| ())
}

/// Remove files directly inside `dir` whose name ends with `suffix`.
///
/// Returns how many files were removed. A missing `dir` removes nothing.
pub fn remove_files_with_suffix(dir: &Path, suffix: &str) -> io::Result<usize> {
  if !dir.is_dir() {
    return Ok(0);
  }

  let mut removed = 0;
  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    let matches = entry.file_name().to_str().is_some_and(|name| name.ends_with(suffix));
    if matches && entry.file_type()?.is_file() {
      fs::remove_file(entry.path())?;
      removed += 1;
    }
  }
  Ok(removed)
}

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<bool> {
  match fs::remove_dir_all(dir) {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn copies_nested_tree() {
    let src = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("src/can")).unwrap();
    fs::write(src.path().join("configure.ac"), "AC_INIT").unwrap();
    fs::write(src.path().join("src/can/msg.c"), "int x;").unwrap();

    let dst = TempDir::new().unwrap();
    let target = dst.path().join("copy");
    copy_dir_all(src.path(), &target).unwrap();

    assert_eq!(fs::read_to_string(target.join("configure.ac")).unwrap(), "AC_INIT");
    assert_eq!(fs::read_to_string(target.join("src/can/msg.c")).unwrap(), "int x;");
  }

  #[cfg(unix)]
  #[test]
  fn copy_keeps_executable_bit() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let script = src.path().join("configure");
    fs::write(&script, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let dst = TempDir::new().unwrap();
    copy_dir_all(src.path(), dst.path()).unwrap();

    let mode = fs::metadata(dst.path().join("configure")).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
  }

  #[test]
  fn removes_only_matching_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("liblely-can.la"), "").unwrap();
    fs::write(dir.path().join("liblely-can.a"), "").unwrap();
    fs::create_dir(dir.path().join("pkgconfig")).unwrap();

    assert_eq!(remove_files_with_suffix(dir.path(), ".la").unwrap(), 1);
    assert!(!dir.path().join("liblely-can.la").exists());
    assert!(dir.path().join("liblely-can.a").exists());
    assert!(dir.path().join("pkgconfig").exists());
  }

  #[test]
  fn missing_paths_are_not_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("lib");
    assert_eq!(remove_files_with_suffix(&missing, ".la").unwrap(), 0);
    assert!(!remove_dir_if_exists(&missing.join("pkgconfig")).unwrap());
  }
}
