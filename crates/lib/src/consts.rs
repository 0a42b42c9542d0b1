pub const APP_NAME: &str = "lelypkg";

/// Name of the wrapped native package.
pub const PACKAGE_NAME: &str = "lely-core";

/// Upstream release used when the recipe configuration does not pin one.
pub const DEFAULT_VERSION: &str = "2.3.2";

pub const DEFAULT_CONFIG_FILE: &str = "lelypkg.toml";

/// Written to the root of every package directory.
pub const PACKAGE_INFO_FILE: &str = "lelypkg-info.json";

/// Length of the truncated configuration hash used for package directories.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Value of `SOURCE_DATE_EPOCH` for native builds (1980-01-01, the ZIP epoch).
pub const SOURCE_DATE_EPOCH: &str = "315532800";
