use serde::de::DeserializeOwned;

use super::node::Node;
use super::path::ConfigPath;
use super::ConfigError;

/// A fully built configuration tree.
///
/// Produced by [`Config::build_tree`](super::Config::build_tree) and read-only
/// from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Node,
}

impl ConfigTree {
    pub(crate) fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_node(self) -> Node {
        self.root
    }

    /// Returns the node at `path`, or `None` if the tree does not reach it.
    pub fn get(&self, path: &str) -> Result<Option<&Node>, ConfigError> {
        Ok(ConfigPath::parse(path)?.read(&self.root))
    }

    /// Returns the sub-tree at `prefix`, or an empty object if there is none.
    ///
    /// Only a malformed prefix is an error.
    pub fn sub_tree(&self, prefix: &str) -> Result<Node, ConfigError> {
        Ok(self.get(prefix)?.cloned().unwrap_or_else(Node::empty_object))
    }

    /// Decodes the sub-tree at `prefix` into `T`. Use `""` for the root.
    ///
    /// A missing or null section (`jdbc:` with an empty body) decodes as an
    /// empty object.
    pub fn config<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, ConfigError> {
        match self.get(prefix)? {
            Some(Node::Null) | None => Node::empty_object().deserialize_into(),
            Some(node) => node.deserialize_into(),
        }
    }
}
