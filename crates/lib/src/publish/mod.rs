//! Artifact publishing.
//!
//! Turns the enabled components of a resolved configuration into the
//! consumer-facing component graph: library names, transitive requirements
//! and the system libraries they pull in.

mod types;

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::PACKAGE_INFO_FILE;
use crate::graph::{ComponentGraph, GraphError};
use crate::resolve::ResolvedConfiguration;

pub use types::*;

#[derive(Debug, Error)]
pub enum PublishError {
  #[error("component '{component}' requires '{requirement}', which is not published")]
  DanglingRequirement { component: String, requirement: String },

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("failed to access package info {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid package info {path}: {source}")]
  Json {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Publish every enabled component of `resolved`.
pub fn publish(
  graph: &ComponentGraph,
  resolved: &ResolvedConfiguration,
) -> Result<BTreeMap<String, PublishedComponent>, PublishError> {
  let mut published = BTreeMap::new();

  for name in &resolved.enabled_components {
    let component = graph.get(name).ok_or_else(|| GraphError::NotFound(name.clone()))?;
    let transitive = graph.resolve_transitive(name)?;

    if let Some(requirement) = transitive.iter().find(|req| !resolved.is_component_enabled(req)) {
      return Err(PublishError::DanglingRequirement {
        component: name.clone(),
        requirement: requirement.clone(),
      });
    }

    let mut system_libs = component.system_libs.clone();
    for requirement in &transitive {
      if let Some(dep) = graph.get(requirement) {
        system_libs.extend(dep.system_libs.iter().cloned());
      }
    }

    debug!(component = %name, requires = transitive.len(), system_libs = ?system_libs, "publishing component");
    published.insert(
      name.clone(),
      PublishedComponent {
        name: name.clone(),
        library_name: format!("lely-{}", name),
        pkg_config_name: format!("liblely-{}", name),
        requires: component.requires.clone(),
        transitive_requires: transitive,
        system_libs,
      },
    );
  }

  info!(components = published.len(), "published component graph");
  Ok(published)
}

/// Write `info` as `lelypkg-info.json` in `package_dir`.
///
/// The file is written under a temporary name and renamed into place, so
/// readers see either no info file or a complete one.
pub fn write_package_info(package_dir: &Path, info: &PackageInfo) -> Result<(), PublishError> {
  let path = package_dir.join(PACKAGE_INFO_FILE);
  let io_error = |source: std::io::Error| PublishError::Io {
    path: path.display().to_string(),
    source,
  };

  let json = serde_json::to_string_pretty(info).map_err(|source| PublishError::Json {
    path: path.display().to_string(),
    source,
  })?;

  let mut file = NamedTempFile::new_in(package_dir).map_err(io_error)?;
  writeln!(file, "{}", json).map_err(io_error)?;
  file.persist(&path).map_err(|err| io_error(err.error))?;
  Ok(())
}

/// Read the package info of `package_dir`, or `None` if it was never written.
pub fn read_package_info(package_dir: &Path) -> Result<Option<PackageInfo>, PublishError> {
  let path = package_dir.join(PACKAGE_INFO_FILE);
  if !path.exists() {
    return Ok(None);
  }

  let content = fs::read_to_string(&path).map_err(|source| PublishError::Io {
    path: path.display().to_string(),
    source,
  })?;
  let info = serde_json::from_str(&content).map_err(|source| PublishError::Json {
    path: path.display().to_string(),
    source,
  })?;
  Ok(Some(info))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::Component;
  use crate::options::OptionRegistry;
  use crate::resolve::ConfigurationResolver;
  use crate::util::hash::{Hashable, ObjectHash};
  use crate::util::testutil::linux_gcc;
  use std::collections::BTreeSet;
  use tempfile::TempDir;

  fn publish_with(overrides: &[(&str, bool)]) -> BTreeMap<String, PublishedComponent> {
    let options = OptionRegistry::with_overrides(overrides.iter().copied()).unwrap();
    let mut resolver = ConfigurationResolver::new(options, linux_gcc());
    let resolved = resolver.resolve().unwrap();
    publish(&resolver.component_graph().unwrap(), &resolved).unwrap()
  }

  fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn publishes_all_components_by_default() {
    let published = publish_with(&[]);
    assert_eq!(published.len(), 8);

    let can = &published["can"];
    assert_eq!(can.library_name, "lely-can");
    assert_eq!(can.pkg_config_name, "liblely-can");
    assert_eq!(can.requires, vec!["libc", "util"]);
    assert_eq!(can.transitive_requires, set(&["libc", "util"]));
    assert_eq!(can.system_libs, set(&["m", "pthread"]));
  }

  #[test]
  fn threads_controls_pthread() {
    let published = publish_with(&[]);
    assert!(published["libc"].system_libs.contains("pthread"));

    let published = publish_with(&[("threads", false)]);
    assert!(published["libc"].system_libs.is_empty());
    assert_eq!(published["co"].system_libs, set(&["m"]));
  }

  #[test]
  fn requirements_are_always_published() {
    for overrides in [vec![], vec![("cxx", false)], vec![("threads", false)]] {
      let published = publish_with(&overrides);
      for component in published.values() {
        for req in component.requires.iter().chain(component.transitive_requires.iter()) {
          assert!(published.contains_key(req), "{} requires unpublished {}", component.name, req);
        }
      }
    }
  }

  #[test]
  fn disabled_components_are_not_published() {
    let published = publish_with(&[("cxx", false)]);
    assert!(!published.contains_key("coapp"));
    assert_eq!(published.len(), 7);
  }

  #[test]
  fn dangling_requirement_is_an_error() {
    let graph = ComponentGraph::new(vec![Component::new("a", &["b"]), Component::new("b", &[])]).unwrap();
    let resolved = ResolvedConfiguration {
      settings: linux_gcc(),
      options: BTreeMap::new(),
      enabled_options: BTreeSet::new(),
      feature_flags: Vec::new(),
      configure_args: Vec::new(),
      enabled_components: set(&["a"]),
    };

    let err = publish(&graph, &resolved).unwrap_err();
    assert!(matches!(
      err,
      PublishError::DanglingRequirement { ref component, ref requirement } if component == "a" && requirement == "b"
    ));
  }

  #[test]
  fn link_flags_list_library_then_system_libs() {
    let published = publish_with(&[]);
    assert_eq!(published["util"].link_flags(), vec!["-llely-util", "-lm", "-lpthread"]);
  }

  #[test]
  fn package_info_round_trips_through_disk() {
    let temp = TempDir::new().unwrap();
    assert!(read_package_info(temp.path()).unwrap().is_none());

    let mut resolver = ConfigurationResolver::new(OptionRegistry::new(), linux_gcc());
    let resolved = resolver.resolve().unwrap();
    let info = PackageInfo {
      name: "lely-core".to_string(),
      version: "2.3.2".to_string(),
      package_hash: ObjectHash("0123456789abcdef0123".to_string()),
      configuration_hash: resolved.compute_hash().unwrap(),
      source_hash: None,
      settings: resolved.settings,
      options: resolved.options.clone(),
      configure_args: resolved.configure_args.clone(),
      components: publish(&resolver.component_graph().unwrap(), &resolved).unwrap(),
      content_hash: None,
    };

    write_package_info(temp.path(), &info).unwrap();
    assert_eq!(read_package_info(temp.path()).unwrap(), Some(info));
  }

  #[test]
  fn package_info_write_replaces_whole_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(PACKAGE_INFO_FILE), r#"{"name": "lely-co"#).unwrap();

    let info = PackageInfo {
      name: "lely-core".to_string(),
      version: "2.3.3".to_string(),
      package_hash: ObjectHash("0123456789abcdef0123".to_string()),
      configuration_hash: ObjectHash("3210fedcba9876543210".to_string()),
      source_hash: None,
      settings: linux_gcc(),
      options: BTreeMap::new(),
      configure_args: Vec::new(),
      components: BTreeMap::new(),
      content_hash: None,
    };
    write_package_info(temp.path(), &info).unwrap();

    assert_eq!(read_package_info(temp.path()).unwrap(), Some(info));
    let names: Vec<_> = fs::read_dir(temp.path())
      .unwrap()
      .map(|entry| entry.unwrap().file_name().into_string().unwrap())
      .collect();
    assert_eq!(names, vec![PACKAGE_INFO_FILE]);
  }

  #[test]
  fn corrupt_package_info_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(PACKAGE_INFO_FILE), "{not json").unwrap();
    assert!(matches!(read_package_info(temp.path()), Err(PublishError::Json { .. })));
  }
}
