//! lelypkg-lib: feature-gated build and dependency resolution for lely-core
//!
//! - `options`: the declared build options and their values
//! - `graph`: components and their requirements
//! - `resolve`: options and settings to configure arguments and enabled components
//! - `build`: the native autotools build
//! - `publish`: the component graph as consumers link against it
//! - `pipeline`: resolve, build and publish in sequence

pub mod build;
pub mod config;
pub mod consts;
pub mod graph;
pub mod options;
pub mod pipeline;
pub mod platform;
pub mod publish;
pub mod resolve;
pub mod util;
