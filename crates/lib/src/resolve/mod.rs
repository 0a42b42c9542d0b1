//! Configuration resolution.
//!
//! The resolver owns the option registry for the rest of the pipeline, so
//! option values cannot change once resolution begins. It moves through
//! `Unresolved -> Validated -> Resolved`; a failed platform check moves it to
//! `Rejected`, from which nothing can be resolved.

mod types;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info};

use crate::graph::{ComponentGraph, GraphError};
use crate::options::{FPIC, OPTIONS, OptionRegistry, SHARED};
use crate::platform::{Compiler, Os, Settings};

pub use types::*;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
  #[error("lely-core is only compatible with Linux, not {os}")]
  UnsupportedPlatform { os: Os },

  #[error("lely-core can only be compiled with GCC, not {compiler}")]
  UnsupportedCompiler { compiler: Compiler },

  #[error("configuration was rejected: {reason}")]
  Rejected { reason: String },

  #[error(transparent)]
  Graph(#[from] GraphError),
}

pub struct ConfigurationResolver {
  options: OptionRegistry,
  settings: Settings,
  state: ResolveState,
  rejection: Option<ResolveError>,
}

impl ConfigurationResolver {
  /// Take ownership of `options`, applying the platform rules for `settings`.
  pub fn new(mut options: OptionRegistry, settings: Settings) -> Self {
    options.apply_platform_rules(&settings);
    Self {
      options,
      settings,
      state: ResolveState::Unresolved,
      rejection: None,
    }
  }

  pub fn state(&self) -> ResolveState {
    self.state
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn options(&self) -> &OptionRegistry {
    &self.options
  }

  /// The component graph for the current option values.
  pub fn component_graph(&self) -> Result<ComponentGraph, GraphError> {
    ComponentGraph::lely(&self.options)
  }

  /// Check the platform and compiler preconditions.
  pub fn validate(&mut self) -> Result<(), ResolveError> {
    match self.state {
      ResolveState::Validated | ResolveState::Resolved => return Ok(()),
      ResolveState::Rejected => return Err(self.rejected()),
      ResolveState::Unresolved => {}
    }

    match check_platform(&self.settings) {
      Ok(()) => {
        debug!(settings = %self.settings, "configuration validated");
        self.state = ResolveState::Validated;
        Ok(())
      }
      Err(err) => {
        info!(settings = %self.settings, error = %err, "configuration rejected");
        self.state = ResolveState::Rejected;
        self.rejection = Some(err.clone());
        Err(err)
      }
    }
  }

  /// Compute the resolved configuration, validating first if needed.
  ///
  /// Can be called again after success; each call recomputes from the
  /// current option values.
  pub fn resolve(&mut self) -> Result<ResolvedConfiguration, ResolveError> {
    self.validate()?;

    let options: BTreeMap<String, bool> = self
      .options
      .iter()
      .map(|(name, value)| (name.to_string(), value))
      .collect();
    let enabled_options = options
      .iter()
      .filter(|(_, value)| **value)
      .map(|(name, _)| name.clone())
      .collect();

    let feature_flags = self.feature_flags();
    let mut configure_args: Vec<String> = FIXED_CONFIGURE_ARGS.iter().map(|a| a.to_string()).collect();
    configure_args.extend(self.linkage_args());
    configure_args.extend(feature_flags.iter().cloned());

    let enabled_components = self.enabled_components(&self.component_graph()?);

    self.state = ResolveState::Resolved;
    info!(
      flags = feature_flags.len(),
      components = enabled_components.len(),
      "configuration resolved"
    );

    Ok(ResolvedConfiguration {
      settings: self.settings,
      options,
      enabled_options,
      feature_flags,
      configure_args,
      enabled_components,
    })
  }

  fn rejected(&self) -> ResolveError {
    ResolveError::Rejected {
      reason: self
        .rejection
        .as_ref()
        .map(|err| err.to_string())
        .unwrap_or_else(|| "unknown".to_string()),
    }
  }

  /// Option flags in table order. Options missing from the registry never
  /// produce a flag.
  fn feature_flags(&self) -> Vec<String> {
    OPTIONS
      .iter()
      .filter_map(|def| self.options.get_safe(def.name).and_then(|value| def.flag(value)))
      .collect()
  }

  fn linkage_args(&self) -> Vec<String> {
    let mut args = if self.options.get_safe(SHARED) == Some(true) {
      vec!["--enable-shared".to_string(), "--disable-static".to_string()]
    } else {
      vec!["--disable-shared".to_string(), "--enable-static".to_string()]
    };
    if self.options.get_safe(FPIC) == Some(true) {
      args.push("--with-pic".to_string());
    }
    args
  }

  /// Components whose gate option is on and whose requirements are all
  /// enabled, decided in topological order.
  fn enabled_components(&self, graph: &ComponentGraph) -> BTreeSet<String> {
    let mut enabled = BTreeSet::new();
    for name in graph.topological_order() {
      let Some(component) = graph.get(name) else {
        continue;
      };

      if let Some(gate) = &component.enabled_when
        && self.options.get_safe(gate) != Some(true)
      {
        debug!(component = %name, option = %gate, "component disabled by option");
        continue;
      }

      if let Some(missing) = component.requires.iter().find(|req| !enabled.contains(*req)) {
        debug!(component = %name, requirement = %missing, "component disabled by requirement");
        continue;
      }

      enabled.insert(name.clone());
    }
    enabled
  }
}

fn check_platform(settings: &Settings) -> Result<(), ResolveError> {
  if settings.os != Os::Linux {
    return Err(ResolveError::UnsupportedPlatform { os: settings.os });
  }
  if settings.compiler != Compiler::Gcc {
    return Err(ResolveError::UnsupportedCompiler {
      compiler: settings.compiler,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{Arch, BuildType};
  use crate::util::hash::Hashable;
  use crate::util::testutil::linux_gcc;

  fn resolver(overrides: &[(&str, bool)]) -> ConfigurationResolver {
    let options = OptionRegistry::with_overrides(overrides.iter().copied()).unwrap();
    ConfigurationResolver::new(options, linux_gcc())
  }

  #[test]
  fn defaults_emit_no_feature_flags() {
    let resolved = resolver(&[]).resolve().unwrap();
    assert!(resolved.feature_flags.is_empty());
    assert_eq!(
      resolved.configure_args,
      vec![
        "--disable-cython",
        "--disable-python",
        "--disable-tools",
        "--disable-dependency-tracking",
        "--disable-maintainer-mode",
        "--enable-shared",
        "--disable-static",
      ]
    );
  }

  #[test]
  fn new_applies_platform_rules() {
    let settings = Settings::new(Os::Windows, Arch::X86_64, Compiler::Msvc, BuildType::Release);
    let options = OptionRegistry::with_overrides([("shared", false)]).unwrap();
    let resolver = ConfigurationResolver::new(options, settings);

    assert_eq!(resolver.settings().os, Os::Windows);
    assert!(resolver.options().platform_applied());
    assert_eq!(resolver.options().get_safe(FPIC), None);
    assert_eq!(resolver.options().get_safe("sync"), Some(true));
  }

  #[test]
  fn static_build_keeps_pic() {
    let resolved = resolver(&[("shared", false)]).resolve().unwrap();
    assert!(resolved.configure_args.ends_with(&[
      "--disable-shared".to_string(),
      "--enable-static".to_string(),
      "--with-pic".to_string()
    ]));
    assert_eq!(resolved.options.get(FPIC), Some(&true));
    assert!(resolved.feature_flags.is_empty());
  }

  #[test]
  fn ecss_and_sync_example() {
    let resolved = resolver(&[("ecss-compliance", true), ("sync", false)]).resolve().unwrap();
    assert_eq!(resolved.feature_flags, vec!["--enable-ecss-compliance", "--disable-sync"]);
    assert_eq!(resolved.disabled_flags().collect::<Vec<_>>(), vec!["--disable-sync"]);
    assert!(resolved.configure_args.ends_with(&resolved.feature_flags));
  }

  #[test]
  fn flags_follow_option_name_order() {
    let resolved = resolver(&[("wtm", false), ("canfd", false), ("obj-name", false)])
      .resolve()
      .unwrap();
    assert_eq!(
      resolved.feature_flags,
      vec!["--disable-canfd", "--disable-obj-name", "--disable-wtm"]
    );
  }

  #[test]
  fn resolution_is_deterministic() {
    let overrides = [("threads", false), ("gw-txt", false), ("ecss-compliance", true), ("shared", false)];
    let mut first = resolver(&overrides);
    let a = first.resolve().unwrap();
    let b = first.resolve().unwrap();
    let c = resolver(&overrides).resolve().unwrap();

    assert_eq!(a.configure_args.join(" ").into_bytes(), b.configure_args.join(" ").into_bytes());
    assert_eq!(a, c);
    assert_eq!(a.compute_hash().unwrap(), c.compute_hash().unwrap());
  }

  #[test]
  fn shared_build_drops_pic() {
    let resolved = resolver(&[]).resolve().unwrap();
    assert!(resolved.configure_args.contains(&"--enable-shared".to_string()));
    assert!(!resolved.configure_args.contains(&"--with-pic".to_string()));
    assert!(!resolved.options.contains_key(FPIC));
  }

  #[test]
  fn only_declared_options_reach_flags() {
    let resolved = resolver(&[("rt", false), ("malloc", false)]).resolve().unwrap();
    for flag in &resolved.feature_flags {
      let name = flag
        .strip_prefix("--disable-")
        .or_else(|| flag.strip_prefix("--enable-"))
        .unwrap();
      assert!(crate::options::option_def(name).is_some(), "undeclared option in {}", flag);
    }
  }

  #[test]
  fn state_moves_through_lifecycle() {
    let mut resolver = resolver(&[]);
    assert_eq!(resolver.state(), ResolveState::Unresolved);
    resolver.validate().unwrap();
    assert_eq!(resolver.state(), ResolveState::Validated);
    resolver.resolve().unwrap();
    assert_eq!(resolver.state(), ResolveState::Resolved);
  }

  #[test]
  fn non_linux_is_rejected() {
    let settings = Settings::new(Os::Windows, Arch::X86_64, Compiler::Gcc, BuildType::Release);
    let mut resolver = ConfigurationResolver::new(OptionRegistry::new(), settings);

    assert_eq!(resolver.resolve(), Err(ResolveError::UnsupportedPlatform { os: Os::Windows }));
    assert_eq!(resolver.state(), ResolveState::Rejected);
  }

  #[test]
  fn non_gcc_is_rejected() {
    let settings = Settings::new(Os::Linux, Arch::X86_64, Compiler::Clang, BuildType::Release);
    let mut resolver = ConfigurationResolver::new(OptionRegistry::new(), settings);

    assert_eq!(
      resolver.validate(),
      Err(ResolveError::UnsupportedCompiler {
        compiler: Compiler::Clang
      })
    );
  }

  #[test]
  fn rejection_is_terminal() {
    let settings = Settings::new(Os::MacOs, Arch::Aarch64, Compiler::AppleClang, BuildType::Release);
    let mut resolver = ConfigurationResolver::new(OptionRegistry::new(), settings);
    resolver.validate().unwrap_err();

    let err = resolver.resolve().unwrap_err();
    assert!(matches!(err, ResolveError::Rejected { ref reason } if reason.contains("Linux")));
    assert_eq!(resolver.state(), ResolveState::Rejected);
  }

  #[test]
  fn cxx_gates_coapp() {
    let resolved = resolver(&[]).resolve().unwrap();
    assert!(resolved.is_component_enabled("coapp"));

    let resolved = resolver(&[("cxx", false)]).resolve().unwrap();
    assert!(!resolved.is_component_enabled("coapp"));
    assert!(resolved.is_component_enabled("io2"));
    assert!(resolved.feature_flags.contains(&"--disable-cxx".to_string()));
  }

  #[test]
  fn enabled_components_never_require_disabled_ones() {
    for overrides in [vec![], vec![("cxx", false)], vec![("threads", false), ("cxx", false)]] {
      let mut resolver = resolver(&overrides);
      let resolved = resolver.resolve().unwrap();
      let graph = resolver.component_graph().unwrap();
      for name in &resolved.enabled_components {
        for dep in graph.resolve_transitive(name).unwrap() {
          assert!(resolved.is_component_enabled(&dep), "{} requires disabled {}", name, dep);
        }
      }
    }
  }
}
