//! Build-graph construction and incremental scheduling core
//!
//! Turns a declarative package tree into a dependency-ordered build
//! graph and serializes it for an external DAG executor:
//! - Relative path computation (`paths`)
//! - Rule map and artifact naming conventions (`rules`)
//! - Recursive graph construction (`graph`)
//! - Dependency edge injection (`linker`)
//! - Graph serialization (`ninja`)
//! - Executor subprocess launch (`executor`)

pub mod error;
pub mod executor;
pub mod graph;
pub mod linker;
pub mod ninja;
pub mod paths;
pub mod rules;

// Re-export main types
pub use error::{BuildError, BuildResult, Warning};
pub use graph::{GraphBuilder, Ruleset};
pub use ninja::NinjaWriter;
pub use paths::relative_path;
pub use rules::{Rule, RuleKind, RuleMap};

// Re-export the package model for convenience
pub use girder_package::{BinTarget, LibTarget, Linkage, Package};
