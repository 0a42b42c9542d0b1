//! Hashing for configuration identity and package contents.
//!
//! - [`ObjectHash`]: truncated hash of a serialized value, used to key
//!   package directories by resolved configuration
//! - [`ContentHash`]: full hash of installed package contents

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A truncated SHA-256 of a value's JSON form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    let full = hash_bytes(serialized.as_bytes());
    Ok(ObjectHash(full.0[..OBJ_HASH_PREFIX_LEN].to_string()))
  }
}

/// A full 64-character SHA-256, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Error)]
pub enum DirHashError {
  #[error("failed to walk directory: {0}")]
  WalkDir(#[from] walkdir::Error),

  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Hash the contents of a directory tree.
///
/// Covers file contents, directory structure and symlink targets, but no
/// metadata. Entries whose file name is in `exclude` are skipped along with
/// everything below them.
pub fn hash_directory(path: &Path, exclude: &[&str]) -> Result<ContentHash, DirHashError> {
  let walker = WalkDir::new(path)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.file_name().to_str().is_none_or(|name| !exclude.contains(&name)));

  let mut hasher = Sha256::new();
  for entry in walker {
    let entry = entry?;
    let entry_path = entry.path();
    let rel_path = entry_path.strip_prefix(path).unwrap_or(entry_path).to_string_lossy();
    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    let line = if file_type.is_file() {
      format!("F:{}:{}", rel_path, hash_file(entry_path)?)
    } else if file_type.is_dir() {
      format!("D:{}", rel_path)
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry_path).map_err(|source| DirHashError::Read {
        path: entry_path.display().to_string(),
        source,
      })?;
      format!("L:{}:{}", rel_path, hash_bytes(target.to_string_lossy().as_bytes()))
    } else {
      continue;
    };

    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let read_err = |source| DirHashError::Read {
    path: path.display().to_string(),
    source,
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];
  loop {
    let n = file.read(&mut buffer).map_err(read_err)?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[derive(Serialize)]
  struct Sample {
    flags: Vec<&'static str>,
  }

  impl Hashable for Sample {}

  #[test]
  fn object_hash_is_truncated_and_stable() {
    let a = Sample { flags: vec!["--disable-sync"] };
    let hash = a.compute_hash().unwrap();
    assert_eq!(hash.0.len(), OBJ_HASH_PREFIX_LEN);
    assert_eq!(hash, a.compute_hash().unwrap());

    let b = Sample { flags: vec!["--disable-rt"] };
    assert_ne!(hash, b.compute_hash().unwrap());
  }

  #[test]
  fn directory_hash_tracks_content() {
    let temp = tempdir().unwrap();
    fs::create_dir(temp.path().join("lib")).unwrap();
    fs::write(temp.path().join("lib/liblely-can.a"), "archive").unwrap();
    let first = hash_directory(temp.path(), &[]).unwrap();
    assert_eq!(first, hash_directory(temp.path(), &[]).unwrap());

    fs::write(temp.path().join("lib/liblely-can.a"), "rebuilt").unwrap();
    assert_ne!(first, hash_directory(temp.path(), &[]).unwrap());
  }

  #[test]
  fn directory_hash_skips_excluded_names() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("LICENSE"), "Apache-2.0").unwrap();
    let before = hash_directory(temp.path(), &["info.json"]).unwrap();

    fs::write(temp.path().join("info.json"), "{}").unwrap();
    assert_eq!(before, hash_directory(temp.path(), &["info.json"]).unwrap());
  }

  #[test]
  fn structure_changes_hash() {
    let flat = tempdir().unwrap();
    fs::write(flat.path().join("file"), "x").unwrap();

    let nested = tempdir().unwrap();
    fs::create_dir(nested.path().join("sub")).unwrap();
    fs::write(nested.path().join("sub/file"), "x").unwrap();

    assert_ne!(
      hash_directory(flat.path(), &[]).unwrap(),
      hash_directory(nested.path(), &[]).unwrap()
    );
  }
}
