//! Package and target model for girder
//!
//! A build is described by a tree of packages, each owning library and
//! binary target declarations. The tree is constructed once at startup,
//! either programmatically, from a `girder.toml` manifest, or by
//! directory auto-discovery, and is immutable afterwards. The graph
//! builder in `girder-build` consumes it to derive the build graph.

pub mod discover;
pub mod error;
pub mod manifest;
pub mod package;

pub use discover::{discover, DiscoverOptions};
pub use error::{PackageError, PackageResult, Warning};
pub use manifest::Manifest;
pub use package::{BinTarget, LibTarget, Linkage, Package};
