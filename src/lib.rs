pub mod config;
pub mod context;
mod error;

pub use config::{Config, ConfigError, ConfigTree, Environment, Node, OverrideEntry};
pub use context::AppContext;
pub use error::Error;
