//! Native build driver.
//!
//! A [`BuildDriver`] turns a [`ResolvedConfiguration`] into an installed
//! package directory. The pipeline awaits a single build to completion; a
//! failed build is reported, never retried, since the native build leaves
//! partial state behind.

mod autotools;
pub mod cmd;
pub mod dir;
mod types;

use std::path::Path;

use crate::resolve::ResolvedConfiguration;
use crate::util::hash::ContentHash;

pub use autotools::AutotoolsDriver;
pub use types::*;

#[allow(async_fn_in_trait)]
pub trait BuildDriver {
  /// Hash of the sources this driver builds from. `None` if the driver
  /// cannot tell, in which case only the version identifies the sources.
  fn source_hash(&self) -> Result<Option<ContentHash>, BuildError> {
    Ok(None)
  }

  /// Build and install into `package_dir`.
  async fn build(&mut self, config: &ResolvedConfiguration, package_dir: &Path) -> Result<BuildOutput, BuildError>;
}
