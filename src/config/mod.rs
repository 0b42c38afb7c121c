//! Configuration loading and management.
//!
//! Building a configuration runs once at startup: sources are loaded in order,
//! merged into one [`Node`] tree, and point overrides are applied on top.

mod builder;
mod de;
mod env;
mod error;
mod file;
mod merge;
mod node;
mod overrides;
mod parser;
mod path;
mod source;
mod tree;

pub use builder::Config;
pub use env::{derive_var_name, DeclaredVariable, Environment, EnvironmentBuilder};
pub use error::ConfigError;
pub use file::FileSource;
pub use merge::{combine, merge};
pub use node::{Node, NodeKind, Object};
pub use overrides::{apply_overrides, OverrideEntry};
pub use parser::{DocumentParser, Format};
pub use path::{ConfigPath, IndexSpec, PathSegment, SegmentKind, PAST_END_INDEX};
pub use source::{ConfigSource, DocumentSource, TextSource};
pub use tree::ConfigTree;
