use std::path::Path;

use serde::de::DeserializeOwned;

use super::env::Environment;
use super::file::FileSource;
use super::merge::merge;
use super::node::Node;
use super::overrides::{apply_overrides, OverrideEntry};
use super::parser::Format;
use super::source::{ConfigSource, DocumentSource, TextSource};
use super::tree::ConfigTree;
use super::ConfigError;

/// Builder for loading configuration from multiple sources.
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Nested objects are merged recursively; other values
/// (including arrays) are replaced entirely.
///
/// ## Overrides
///
/// After merging, point overrides are applied by path:
///
/// ```text
/// jdbc.myds.url          object field
/// servers[0].host        array element
/// servers[.length]       append to an array
/// ```
///
/// Overrides derived from an [`Environment`] are applied first, then the ones
/// registered with [`with_override`](Self::with_override), so explicit
/// overrides win.
///
/// ## Example
///
/// ```no_run
/// use bootconf::Config;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct MyConfig {
///     name: String,
///     port: u16,
/// }
///
/// let config: MyConfig = Config::builder()
///     .with_file("config/default.yml", true)
///     .with_file("config/local.yml", false)
///     .with_override("port", "9000")
///     .build()?;
/// # Ok::<(), bootconf::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
    environment: Option<Environment>,
    overrides: Vec<OverrideEntry>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a configuration file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds a configuration fragment declared in code.
    pub fn with_document(self, name: impl Into<String>, document: Node) -> Self {
        self.with_source(DocumentSource::new(name, document))
    }

    /// Adds configuration text in the given format.
    pub fn with_str(self, name: impl Into<String>, text: impl Into<String>, format: Format) -> Self {
        self.with_source(TextSource::new(name, text, format))
    }

    /// Adds any [`ConfigSource`], e.g. one resolving remote resources.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Uses `environment` for property and variable overrides.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets `path` to `value` after all sources are merged.
    pub fn with_override(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push(OverrideEntry::new(path, value));
        self
    }

    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = OverrideEntry>,
    {
        self.overrides.extend(overrides);
        self
    }

    /// Loads and merges all sources, then applies overrides.
    ///
    /// Any failure aborts the build; no partially built tree is returned.
    pub fn build_tree(self) -> Result<ConfigTree, ConfigError> {
        let mut documents = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.load()? {
                Some(Node::Null) => {
                    tracing::debug!(origin = %source.origin(), "skipping empty config source");
                }
                Some(document) => {
                    tracing::debug!(origin = %source.origin(), "loaded config source");
                    documents.push(document);
                }
                None => {
                    tracing::debug!(origin = %source.origin(), "optional config source not found");
                }
            }
        }

        let mut root = merge(documents);

        let overrides = self
            .environment
            .as_ref()
            .map(Environment::overrides)
            .unwrap_or_default()
            .into_iter()
            .chain(self.overrides);
        apply_overrides(&mut root, overrides)?;

        Ok(ConfigTree::new(root))
    }

    /// Builds the configuration and deserializes its root into `T`.
    ///
    /// Use [`build_tree`](Self::build_tree) when sections are read separately.
    pub fn build<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        self.build_tree()?.config("")
    }
}
