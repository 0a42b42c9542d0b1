use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::options::{CXX, OptionRegistry, THREADS};

/// A separately linkable library of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
  pub name: String,
  /// Direct requirements, in declaration order.
  pub requires: Vec<String>,
  pub system_libs: BTreeSet<String>,
  /// Option that must be enabled for the component to be built.
  pub enabled_when: Option<String>,
}

impl Component {
  pub fn new(name: &str, requires: &[&str]) -> Self {
    Self {
      name: name.to_string(),
      requires: requires.iter().map(|r| r.to_string()).collect(),
      system_libs: BTreeSet::new(),
      enabled_when: None,
    }
  }
}

/// A system library, optionally gated on an option.
#[derive(Debug, Clone, Copy)]
pub struct SystemLibDef {
  pub name: &'static str,
  pub when: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentDef {
  pub name: &'static str,
  pub requires: &'static [&'static str],
  pub system_libs: &'static [SystemLibDef],
  pub enabled_when: Option<&'static str>,
}

impl ComponentDef {
  const fn new(name: &'static str, requires: &'static [&'static str]) -> Self {
    Self {
      name,
      requires,
      system_libs: &[],
      enabled_when: None,
    }
  }

  /// Instantiate the component, keeping the system libraries whose gate is
  /// enabled in `options`.
  pub fn instantiate(&self, options: &OptionRegistry) -> Component {
    let mut component = Component::new(self.name, self.requires);
    component.enabled_when = self.enabled_when.map(str::to_string);
    component.system_libs = self
      .system_libs
      .iter()
      .filter(|lib| lib.when.is_none_or(|opt| options.get_safe(opt) == Some(true)))
      .map(|lib| lib.name.to_string())
      .collect();
    component
  }
}

/// The libraries shipped by lely-core.
pub static COMPONENTS: &[ComponentDef] = &[
  ComponentDef::new("can", &["libc", "util"]),
  ComponentDef::new("co", &["libc", "util", "can"]),
  ComponentDef {
    enabled_when: Some(CXX),
    ..ComponentDef::new("coapp", &["libc", "io2", "co"])
  },
  ComponentDef::new("ev", &["libc", "util"]),
  ComponentDef::new("io2", &["libc", "util", "can", "ev"]),
  ComponentDef {
    system_libs: &[SystemLibDef {
      name: "pthread",
      when: Some(THREADS),
    }],
    ..ComponentDef::new("libc", &[])
  },
  ComponentDef::new("tap", &["libc"]),
  ComponentDef {
    system_libs: &[SystemLibDef { name: "m", when: None }],
    ..ComponentDef::new("util", &["libc"])
  },
];
