use std::fmt;

use super::node::Node;
use super::parser::{DocumentParser, Format};
use super::ConfigError;

/// One configuration source in the build pipeline.
///
/// `load` returns `Ok(None)` when an optional source is absent.
pub trait ConfigSource: Send + Sync + fmt::Debug {
    /// Human readable name of the source, used in logs and errors.
    fn origin(&self) -> String;

    fn load(&self) -> Result<Option<Node>, ConfigError>;
}

/// A literal configuration fragment declared in code.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    name: String,
    document: Node,
}

impl DocumentSource {
    pub fn new(name: impl Into<String>, document: Node) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

impl ConfigSource for DocumentSource {
    fn origin(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Option<Node>, ConfigError> {
        Ok(Some(self.document.clone()))
    }
}

/// Configuration text held in memory, e.g. an embedded defaults file.
#[derive(Debug)]
pub struct TextSource {
    name: String,
    text: String,
    parser: Box<dyn DocumentParser>,
}

impl TextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>, format: Format) -> Self {
        Self::with_parser(name, text, format)
    }

    pub fn with_parser(
        name: impl Into<String>,
        text: impl Into<String>,
        parser: impl DocumentParser + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            parser: Box::new(parser),
        }
    }
}

impl ConfigSource for TextSource {
    fn origin(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Option<Node>, ConfigError> {
        self.parser
            .parse(&self.name, self.text.as_bytes())
            .map(Some)
    }
}
