//! Application context owning the configuration of one run.

use serde::de::DeserializeOwned;

use crate::config::{Config, ConfigTree};
use crate::Error;

/// Central application context holding the built configuration tree.
///
/// Each context owns its own tree, so several contexts (one per test, say)
/// never see each other's configuration. Typed sections are extracted on
/// demand with [`config()`](Self::config).
///
/// ## Example
///
/// ```no_run
/// use bootconf::{AppContext, Config};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Database {
///     url: String,
///     pool_size: u32,
/// }
///
/// let ctx = AppContext::builder()
///     .with_config(Config::builder().with_file("config.yml", true))
///     .build()?;
///
/// let db: Database = ctx.config("jdbc.main")?;
/// # Ok::<(), bootconf::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext {
    config: ConfigTree,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder { source: None }
    }

    pub fn config_tree(&self) -> &ConfigTree {
        &self.config
    }

    /// Decodes the configuration section at `prefix` into `T`.
    ///
    /// A prefix that is not present yields `T` decoded from an empty object.
    pub fn config<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, Error> {
        self.config.config(prefix).map_err(|source| Error::Subconfig {
            prefix: prefix.to_string(),
            source,
        })
    }
}

#[derive(Debug)]
enum ConfigInput {
    Builder(Config),
    Tree(ConfigTree),
}

/// Builder for constructing an [`AppContext`].
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    source: Option<ConfigInput>,
}

impl AppContextBuilder {
    /// Attaches a configuration builder, run when the context is built.
    pub fn with_config(mut self, config: Config) -> Self {
        self.source = Some(ConfigInput::Builder(config));
        self
    }

    /// Attaches an already built configuration tree.
    pub fn with_tree(mut self, tree: ConfigTree) -> Self {
        self.source = Some(ConfigInput::Tree(tree));
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Returns an error if no configuration was provided or it fails to build.
    pub fn build(self) -> Result<AppContext, Error> {
        let config = match self.source.ok_or(Error::MissingConfig)? {
            ConfigInput::Builder(builder) => builder.build_tree()?,
            ConfigInput::Tree(tree) => tree,
        };
        tracing::debug!("application context ready");

        Ok(AppContext { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Format, Node};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Bean {
        a: String,
        c: Option<String>,
    }

    #[test]
    fn test_context_requires_config() {
        let result = AppContext::builder().build();
        assert!(matches!(result, Err(Error::MissingConfig)));
    }

    #[test]
    fn test_context_builds_config() {
        let ctx = AppContext::builder()
            .with_config(
                Config::builder()
                    .with_str("app", "testOverride:\n  a: b\n", Format::Yaml)
                    .with_override("testOverride.c", "D"),
            )
            .build()
            .unwrap();

        let bean: Bean = ctx.config("testOverride").unwrap();
        assert_eq!(
            bean,
            Bean {
                a: "b".into(),
                c: Some("D".into())
            }
        );
    }

    #[test]
    fn test_context_from_tree() {
        let tree = Config::builder()
            .with_document("defaults", Node::from(serde_json::json!({"a": "x"})))
            .build_tree()
            .unwrap();

        let ctx = AppContext::builder().with_tree(tree).build().unwrap();
        assert_eq!(ctx.config_tree().get("a").unwrap(), Some(&Node::scalar("x")));
    }

    #[test]
    fn test_subconfig_error_names_prefix() {
        let ctx = AppContext::builder()
            .with_config(Config::builder().with_str("app", "section: {c: d}", Format::Yaml))
            .build()
            .unwrap();

        let err = ctx.config::<Bean>("section").unwrap_err();
        assert!(matches!(err, Error::Subconfig { ref prefix, .. } if prefix == "section"));
    }

    #[test]
    fn test_build_failure_surfaces() {
        let result = AppContext::builder()
            .with_config(Config::builder().with_file("/nonexistent/app.yml", true))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }
}
