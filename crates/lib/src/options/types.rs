use serde::Serialize;

/// How an option reaches the native configure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
  /// Selects shared/static output or position independent code.
  Linkage,
  /// On by default in the native build; `--disable-<name>` when false.
  DisableWhenOff,
  /// Off by default in the native build; `--enable-<name>` when true.
  EnableWhenOn,
}

/// A declared option and its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionDef {
  pub name: &'static str,
  pub default: bool,
  pub kind: OptionKind,
}

impl OptionDef {
  const fn feature(name: &'static str) -> Self {
    Self {
      name,
      default: true,
      kind: OptionKind::DisableWhenOff,
    }
  }

  /// The configure flag this option contributes for `value`, if any.
  pub fn flag(&self, value: bool) -> Option<String> {
    match (self.kind, value) {
      (OptionKind::DisableWhenOff, false) => Some(format!("--disable-{}", self.name)),
      (OptionKind::EnableWhenOn, true) => Some(format!("--enable-{}", self.name)),
      _ => None,
    }
  }
}

pub const SHARED: &str = "shared";
pub const FPIC: &str = "fPIC";
pub const THREADS: &str = "threads";
pub const CXX: &str = "cxx";

/// Every declared option, sorted by name.
///
/// Iteration order of this table is the order flags are emitted in.
pub static OPTIONS: &[OptionDef] = &[
  OptionDef::feature("canfd"),
  OptionDef::feature("coapp-master"),
  OptionDef::feature("coapp-slave"),
  OptionDef::feature("csdo"),
  OptionDef::feature(CXX),
  OptionDef::feature("daemon"),
  OptionDef::feature("dcf"),
  OptionDef::feature("dcf-restore"),
  OptionDef::feature("diag"),
  OptionDef {
    name: "ecss-compliance",
    default: false,
    kind: OptionKind::EnableWhenOn,
  },
  OptionDef::feature("emcy"),
  OptionDef::feature("errno"),
  OptionDef {
    name: FPIC,
    default: true,
    kind: OptionKind::Linkage,
  },
  OptionDef::feature("gw"),
  OptionDef::feature("gw-txt"),
  OptionDef::feature("lss"),
  OptionDef::feature("malloc"),
  OptionDef::feature("master"),
  OptionDef::feature("mpdo"),
  OptionDef::feature("ng"),
  OptionDef::feature("nmt-boot"),
  OptionDef::feature("nmt-cfg"),
  OptionDef::feature("obj-default"),
  OptionDef::feature("obj-file"),
  OptionDef::feature("obj-limits"),
  OptionDef::feature("obj-name"),
  OptionDef::feature("obj-upload"),
  OptionDef::feature("rpdo"),
  OptionDef::feature("rt"),
  OptionDef::feature("sdev"),
  OptionDef {
    name: SHARED,
    default: true,
    kind: OptionKind::Linkage,
  },
  OptionDef::feature("stdio"),
  OptionDef::feature("sync"),
  OptionDef::feature(THREADS),
  OptionDef::feature("time"),
  OptionDef::feature("tpdo"),
  OptionDef::feature("wtm"),
];

/// Look up a declared option by name.
pub fn option_def(name: &str) -> Option<&'static OptionDef> {
  OPTIONS
    .binary_search_by(|def| def.name.cmp(name))
    .ok()
    .map(|idx| &OPTIONS[idx])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_is_sorted_and_unique() {
    for pair in OPTIONS.windows(2) {
      assert!(pair[0].name < pair[1].name, "{} must sort before {}", pair[0].name, pair[1].name);
    }
  }

  #[test]
  fn declares_all_recipe_options() {
    assert_eq!(OPTIONS.len(), 37);
    let off_by_default: Vec<_> = OPTIONS.iter().filter(|d| !d.default).map(|d| d.name).collect();
    assert_eq!(off_by_default, vec!["ecss-compliance"]);
  }

  #[test]
  fn lookup_uses_exact_names() {
    assert_eq!(option_def("fPIC").map(|d| d.kind), Some(OptionKind::Linkage));
    assert!(option_def("fpic").is_none());
    assert!(option_def("dcf-restore").is_some());
  }

  #[test]
  fn flags_follow_option_kind() {
    let sync = option_def("sync").unwrap();
    assert_eq!(sync.flag(false).as_deref(), Some("--disable-sync"));
    assert_eq!(sync.flag(true), None);

    let ecss = option_def("ecss-compliance").unwrap();
    assert_eq!(ecss.flag(true).as_deref(), Some("--enable-ecss-compliance"));
    assert_eq!(ecss.flag(false), None);

    assert_eq!(option_def(SHARED).unwrap().flag(true), None);
  }
}
