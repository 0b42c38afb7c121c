//! The generic configuration tree.
//!
//! Every parsed document, regardless of its source format, is converted into a
//! [`Node`]. Scalars keep their textual form; interpreting `"8080"` as a port
//! number is left to typed extraction (see [`Node::deserialize_into`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::ConfigError;

/// Key-to-node mapping of an object node.
pub type Object = BTreeMap<String, Node>;

/// A configuration document or sub-document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Null,
    Scalar(String),
    Object(Object),
    Array(Vec<Node>),
}

/// The shape of a [`Node`], used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Scalar,
    Object,
    Array,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Null => write!(f, "NULL"),
            NodeKind::Scalar => write!(f, "SCALAR"),
            NodeKind::Object => write!(f, "OBJECT"),
            NodeKind::Array => write!(f, "ARRAY"),
        }
    }
}

impl Node {
    pub fn empty_object() -> Self {
        Node::Object(Object::new())
    }

    pub fn empty_array() -> Self {
        Node::Array(Vec::new())
    }

    pub fn scalar(text: impl Into<String>) -> Self {
        Node::Scalar(text.into())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Scalar(_) => NodeKind::Scalar,
            Node::Object(_) => NodeKind::Object,
            Node::Array(_) => NodeKind::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the field `key` of an object node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Returns element `index` of an array node.
    pub fn get_index(&self, index: usize) -> Option<&Node> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Decodes this node into a strongly typed value.
    ///
    /// Scalar text is parsed on demand, so `{port: "8080"}` decodes into a
    /// struct with a `u16` port.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        T::deserialize(self)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Scalar(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Scalar(text)
    }
}

impl From<Option<String>> for Node {
    fn from(value: Option<String>) -> Self {
        value.map_or(Node::Null, Node::Scalar)
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Scalar(b.to_string()),
            Value::Number(n) => Node::Scalar(n.to_string()),
            Value::String(s) => Node::Scalar(s),
            Value::Sequence(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Mapping(mapping) => Node::Object(
                mapping
                    .into_iter()
                    .map(|(key, value)| (yaml_key(key), Node::from(value)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

/// Mapping keys are usually strings, but YAML allows any scalar.
fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        other => match serde_yaml::to_string(&other) {
            Ok(text) => text.trim_end().to_string(),
            Err(err) => {
                let fallback = format!("{other:?}");
                tracing::warn!(key = %fallback, error = %err, "cannot render YAML mapping key");
                fallback
            }
        },
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Scalar(b.to_string()),
            Value::Number(n) => Node::Scalar(n.to_string()),
            Value::String(s) => Node::Scalar(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Node::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for Node {
    fn from(value: toml::Value) -> Self {
        use toml::Value;

        match value {
            Value::String(s) => Node::Scalar(s),
            Value::Integer(i) => Node::Scalar(i.to_string()),
            Value::Float(f) => Node::Scalar(f.to_string()),
            Value::Boolean(b) => Node::Scalar(b.to_string()),
            Value::Datetime(dt) => Node::Scalar(dt.to_string()),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Table(table) => Node::from(table),
        }
    }
}

impl From<toml::Table> for Node {
    fn from(table: toml::Table) -> Self {
        Node::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, Node::from(value)))
                .collect(),
        )
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Scalar(text) => serializer.serialize_str(text),
            Node::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Node::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
        }
    }
}
