//! Dotted/bracketed paths into a configuration tree.
//!
//! # Path Syntax
//!
//! - Object fields: `jdbc.myds.url`
//! - Array elements: `servers[0].host`
//! - Append: `servers[.length]` addresses the slot one past the current end
//! - A single trailing `.` is ignored
//!
//! A path is parsed once into a chain of [`PathSegment`]s. Each segment keeps
//! the index of its parent segment, the text consumed to reach it and the text
//! still to be consumed. Reads walk the chain and stop at the first missing
//! node; writes create missing objects and arrays along the way.

use std::fmt;
use std::str::FromStr;

use super::node::{Node, NodeKind};
use super::ConfigError;

/// Symbolic array index resolving to the current array length.
pub const PAST_END_INDEX: &str = ".length";

const DOT: char = '.';
const INDEX_START: char = '[';
const INDEX_END: char = ']';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpec {
    At(usize),
    /// `[.length]`
    PastEnd,
}

impl IndexSpec {
    fn resolve(self, len: usize) -> usize {
        match self {
            IndexSpec::At(index) => index,
            IndexSpec::PastEnd => len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Root,
    Property(String),
    Index(IndexSpec),
}

/// One step of a parsed [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    kind: SegmentKind,
    parent: Option<usize>,
    incoming_path: String,
    remaining_path: String,
}

impl PathSegment {
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Position of the parent segment in [`ConfigPath::segments`].
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Path text consumed up to and including this segment.
    pub fn incoming_path(&self) -> &str {
        &self.incoming_path
    }

    /// Path text left to consume after this segment.
    pub fn remaining_path(&self) -> &str {
        &self.remaining_path
    }

    pub fn is_terminal(&self) -> bool {
        self.remaining_path.is_empty()
    }
}

/// A parsed configuration path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    source: String,
    segments: Vec<PathSegment>,
}

impl ConfigPath {
    /// Parses `path` into its segment chain.
    ///
    /// The empty path addresses the root node.
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let trimmed = path.strip_suffix(DOT).unwrap_or(path);
        let mut parser = ChainParser {
            source: path,
            trimmed,
            segments: vec![PathSegment {
                kind: SegmentKind::Root,
                parent: None,
                incoming_path: String::new(),
                remaining_path: trimmed.to_string(),
            }],
        };

        let mut rest = trimmed;
        while !rest.is_empty() {
            rest = parser.parse_property(rest)?;
        }

        Ok(ConfigPath {
            source: path.to_string(),
            segments: parser.segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The segment chain, root first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn terminal(&self) -> &PathSegment {
        // The root segment is always present.
        &self.segments[self.segments.len() - 1]
    }

    pub fn parent_of(&self, segment: &PathSegment) -> Option<&PathSegment> {
        segment.parent.and_then(|index| self.segments.get(index))
    }

    /// Walks the chain against `root`, yielding each segment with the node at
    /// its position, or `None` once the tree stops reaching that deep.
    pub fn positions<'a>(
        &'a self,
        root: &'a Node,
    ) -> impl Iterator<Item = (&'a PathSegment, Option<&'a Node>)> + 'a {
        let mut current = Some(root);
        self.segments.iter().map(move |segment| {
            current = current.and_then(|node| read_child(node, segment));
            (segment, current)
        })
    }

    /// Returns the node at this path, or `None` if the tree does not reach it.
    ///
    /// Never modifies the tree. `[.length]` never resolves on read.
    pub fn read<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| read_child(node, segment))
    }

    /// Writes a scalar, or an explicit null for `None`, at this path.
    pub fn write_scalar(&self, root: &mut Node, value: Option<String>) -> Result<(), ConfigError> {
        self.write_node(root, Node::from(value))
    }

    /// Writes a sub-tree at this path, creating missing parents.
    ///
    /// Parents created before a failing segment stay in `root`.
    pub fn write_node(&self, root: &mut Node, node: Node) -> Result<(), ConfigError> {
        if self.segments.len() < 2 {
            return Err(ConfigError::EmptyPath);
        }

        let mut current = root;
        for segment in &self.segments[1..] {
            current = self.slot(current, segment)?;
        }
        *current = node;
        Ok(())
    }

    /// Returns the child slot of `container` addressed by `segment`, turning a
    /// null container into an object or array and appending a null placeholder
    /// when the index is one past the end.
    fn slot<'n>(
        &self,
        container: &'n mut Node,
        segment: &PathSegment,
    ) -> Result<&'n mut Node, ConfigError> {
        let at = self
            .parent_of(segment)
            .map(PathSegment::incoming_path)
            .unwrap_or_default();

        match &segment.kind {
            SegmentKind::Root => Ok(container),
            SegmentKind::Property(name) => {
                if container.is_null() {
                    tracing::trace!(path = at, "synthesizing object node");
                    *container = Node::empty_object();
                }
                match container {
                    Node::Object(map) => Ok(map.entry(name.clone()).or_insert(Node::Null)),
                    other => Err(ConfigError::UnexpectedNode {
                        path: at.to_string(),
                        field: segment.incoming_path.clone(),
                        expected: NodeKind::Object,
                        found: other.kind(),
                    }),
                }
            }
            SegmentKind::Index(spec) => {
                if container.is_null() {
                    tracing::trace!(path = at, "synthesizing array node");
                    *container = Node::empty_array();
                }
                match container {
                    Node::Array(items) => {
                        let len = items.len();
                        let index = spec.resolve(len);
                        if index == len {
                            items.push(Node::Null);
                        }
                        items
                            .get_mut(index)
                            .ok_or_else(|| ConfigError::IndexOutOfBounds {
                                path: at.to_string(),
                                index,
                                len,
                            })
                    }
                    other => Err(ConfigError::UnexpectedNode {
                        path: at.to_string(),
                        field: segment.incoming_path.clone(),
                        expected: NodeKind::Array,
                        found: other.kind(),
                    }),
                }
            }
        }
    }
}

fn read_child<'a>(node: &'a Node, segment: &PathSegment) -> Option<&'a Node> {
    match (&segment.kind, node) {
        (SegmentKind::Root, node) => Some(node),
        (SegmentKind::Property(name), Node::Object(map)) => map.get(name),
        (SegmentKind::Index(IndexSpec::At(index)), Node::Array(items)) => items.get(*index),
        _ => None,
    }
}

impl FromStr for ConfigPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigPath::parse(s)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct ChainParser<'p> {
    source: &'p str,
    trimmed: &'p str,
    segments: Vec<PathSegment>,
}

impl<'p> ChainParser<'p> {
    fn error(&self, reason: &str) -> ConfigError {
        ConfigError::invalid_path(self.source, reason)
    }

    fn push(&mut self, kind: SegmentKind, consumed_to: usize, remaining: &str) {
        let parent = self.segments.len() - 1;
        self.segments.push(PathSegment {
            kind,
            parent: Some(parent),
            incoming_path: self.trimmed[..consumed_to].to_string(),
            remaining_path: remaining.to_string(),
        });
    }

    /// Consumes `name`, `name.` or `name[...]`, returning the unparsed rest.
    fn parse_property<'r>(&mut self, rest: &'r str) -> Result<&'r str, ConfigError> {
        let offset = self.trimmed.len() - rest.len();
        let split = rest
            .find(|c: char| c == DOT || c == INDEX_START)
            .unwrap_or(rest.len());
        let (name, tail) = rest.split_at(split);

        if name.is_empty() {
            return Err(self.error("empty property name"));
        }
        let kind = SegmentKind::Property(name.to_string());
        let consumed_to = offset + name.len();

        if let Some(after_dot) = tail.strip_prefix(DOT) {
            if after_dot.is_empty() {
                return Err(self.error("path must not end with a separator"));
            }
            self.push(kind, consumed_to, after_dot);
            Ok(after_dot)
        } else if tail.starts_with(INDEX_START) {
            self.push(kind, consumed_to, tail);
            self.parse_index(tail)
        } else {
            self.push(kind, consumed_to, "");
            Ok("")
        }
    }

    /// Consumes `[N]` or `[N].`, returning the unparsed rest.
    fn parse_index<'r>(&mut self, rest: &'r str) -> Result<&'r str, ConfigError> {
        if rest.len() < 3 {
            return Err(self.error("array index must be in the form [N]"));
        }

        let offset = self.trimmed.len() - rest.len();
        let close = rest[1..]
            .find(INDEX_END)
            .map(|i| i + 1)
            .ok_or_else(|| self.error("no closing array index bracket"))?;
        let spec = self.parse_index_body(&rest[1..close])?;
        let consumed_to = offset + close + 1;
        let after = &rest[close + 1..];

        if after.is_empty() {
            self.push(SegmentKind::Index(spec), consumed_to, "");
            Ok("")
        } else if let Some(after_dot) = after.strip_prefix(DOT) {
            if after_dot.is_empty() {
                return Err(self.error("path must not end with a separator"));
            }
            self.push(SegmentKind::Index(spec), consumed_to, after_dot);
            Ok(after_dot)
        } else if after.starts_with(INDEX_START) {
            Err(self.error("nested array indices are not supported"))
        } else {
            Err(self.error("invalid path after array index"))
        }
    }

    fn parse_index_body(&self, body: &str) -> Result<IndexSpec, ConfigError> {
        if body == PAST_END_INDEX {
            return Ok(IndexSpec::PastEnd);
        }

        match body.parse::<i64>() {
            Ok(index) if index < 0 => Err(self.error("negative array index")),
            Ok(index) => usize::try_from(index)
                .map(IndexSpec::At)
                .map_err(|_| self.error("array index is too large")),
            Err(_) => Err(self.error("non-integer array index")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    fn kinds(path: &str) -> Vec<SegmentKind> {
        ConfigPath::parse(path)
            .unwrap()
            .segments()
            .iter()
            .map(|s| s.kind().clone())
            .collect()
    }

    fn prop(name: &str) -> SegmentKind {
        SegmentKind::Property(name.to_string())
    }

    #[test]
    fn test_parse_dotted_path() {
        assert_eq!(
            kinds("jdbc.myds.url"),
            vec![SegmentKind::Root, prop("jdbc"), prop("myds"), prop("url")]
        );
    }

    #[test]
    fn test_parse_indexed_path() {
        assert_eq!(
            kinds("servers[1].host"),
            vec![
                SegmentKind::Root,
                prop("servers"),
                SegmentKind::Index(IndexSpec::At(1)),
                prop("host"),
            ]
        );
        assert_eq!(
            kinds("a[.length]"),
            vec![SegmentKind::Root, prop("a"), SegmentKind::Index(IndexSpec::PastEnd)]
        );
    }

    #[test]
    fn test_trailing_dot_is_ignored() {
        assert_eq!(kinds("a.b."), kinds("a.b"));
        assert_eq!(kinds("a[0]."), kinds("a[0]"));
    }

    #[test]
    fn test_empty_path_is_root() {
        let path = ConfigPath::parse("").unwrap();
        assert_eq!(path.segments().len(), 1);
        assert!(path.terminal().is_terminal());
    }

    #[test]
    fn test_segment_chain_tracks_consumed_and_remaining_text() {
        let path = ConfigPath::parse("a.b[2].c").unwrap();
        let chain: Vec<(&str, &str, Option<usize>)> = path
            .segments()
            .iter()
            .map(|s| (s.incoming_path(), s.remaining_path(), s.parent()))
            .collect();

        assert_eq!(
            chain,
            vec![
                ("", "a.b[2].c", None),
                ("a", "b[2].c", Some(0)),
                ("a.b", "[2].c", Some(1)),
                ("a.b[2]", "c", Some(2)),
                ("a.b[2].c", "", Some(3)),
            ]
        );
    }

    #[rstest]
    #[case("a[", "array index must be in the form [N]")]
    #[case("a[12", "no closing array index bracket")]
    #[case("a[x]", "non-integer array index")]
    #[case("a[-1]", "negative array index")]
    #[case("a[0][1]", "nested array indices are not supported")]
    #[case("a[0]b", "invalid path after array index")]
    #[case(".a", "empty property name")]
    #[case("a..b", "empty property name")]
    #[case("a.b..", "path must not end with a separator")]
    fn test_parse_errors(#[case] path: &str, #[case] reason: &str) {
        match ConfigPath::parse(path) {
            Err(ConfigError::InvalidPath { path: p, reason: r }) => {
                assert_eq!(p, path);
                assert_eq!(r, reason);
            }
            other => panic!("expected InvalidPath for {path:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_read_existing_and_absent() {
        let root = tree(json!({"a": {"b": ["x", {"c": "y"}]}}));

        let read = |p: &str| ConfigPath::parse(p).unwrap().read(&root).cloned();
        assert_eq!(read("a.b[0]"), Some(Node::scalar("x")));
        assert_eq!(read("a.b[1].c"), Some(Node::scalar("y")));
        assert_eq!(read("a.b[5]"), None);
        assert_eq!(read("a.b[.length]"), None);
        assert_eq!(read("a.missing.deeper"), None);
        assert_eq!(read("a.b.c"), None);
        assert_eq!(read("a.b[0].c"), None);
    }

    #[test]
    fn test_positions_stop_at_first_gap() {
        let root = tree(json!({"a": {"b": "c"}}));
        let path = ConfigPath::parse("a.x.y").unwrap();

        let found: Vec<bool> = path.positions(&root).map(|(_, n)| n.is_some()).collect();
        assert_eq!(found, vec![true, true, false, false]);
    }

    #[test]
    fn test_write_synthesizes_objects() {
        let mut root = Node::empty_object();
        ConfigPath::parse("c.m.k")
            .unwrap()
            .write_scalar(&mut root, Some("4".into()))
            .unwrap();

        assert_eq!(root, tree(json!({"c": {"m": {"k": "4"}}})));
    }

    #[test]
    fn test_write_synthesizes_arrays_under_index_segments() {
        let mut root = Node::empty_object();
        ConfigPath::parse("servers[0].host")
            .unwrap()
            .write_scalar(&mut root, Some("h1".into()))
            .unwrap();
        ConfigPath::parse("servers[.length].host")
            .unwrap()
            .write_scalar(&mut root, Some("h2".into()))
            .unwrap();

        assert_eq!(
            root,
            tree(json!({"servers": [{"host": "h1"}, {"host": "h2"}]}))
        );
    }

    #[test]
    fn test_write_replaces_explicit_null_parent() {
        let mut root = tree(json!({"a": null}));
        ConfigPath::parse("a.b")
            .unwrap()
            .write_scalar(&mut root, Some("c".into()))
            .unwrap();

        assert_eq!(root, tree(json!({"a": {"b": "c"}})));
    }

    #[test]
    fn test_write_null_value() {
        let mut root = tree(json!({"a": "b"}));
        ConfigPath::parse("a")
            .unwrap()
            .write_scalar(&mut root, None)
            .unwrap();

        assert_eq!(root, tree(json!({"a": null})));
    }

    #[test]
    fn test_write_node_subtree() {
        let mut root = tree(json!({"a": {"x": "1"}}));
        ConfigPath::parse("a.y")
            .unwrap()
            .write_node(&mut root, tree(json!({"z": ["q"]})))
            .unwrap();

        assert_eq!(root, tree(json!({"a": {"x": "1", "y": {"z": ["q"]}}})));
    }

    #[test]
    fn test_write_index_boundaries() {
        let mut root = tree(json!({"a": ["x"]}));
        let write = |root: &mut Node, p: &str, v: &str| {
            ConfigPath::parse(p)
                .unwrap()
                .write_scalar(root, Some(v.to_string()))
        };

        write(&mut root, "a[0]", "z").unwrap();
        assert_eq!(root, tree(json!({"a": ["z"]})));

        write(&mut root, "a[1]", "y").unwrap();
        assert_eq!(root, tree(json!({"a": ["z", "y"]})));

        let err = write(&mut root, "a[3]", "q").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IndexOutOfBounds { index: 3, len: 2, .. }
        ));
    }

    #[test]
    fn test_write_through_scalar_is_rejected() {
        let mut root = tree(json!({"a": "scalar"}));
        let err = ConfigPath::parse("a.b")
            .unwrap()
            .write_scalar(&mut root, Some("c".into()))
            .unwrap_err();

        match err {
            ConfigError::UnexpectedNode { path, field, expected, found } => {
                assert_eq!(path, "a");
                assert_eq!(field, "a.b");
                assert_eq!(expected, NodeKind::Object);
                assert_eq!(found, NodeKind::Scalar);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_index_into_object_is_rejected() {
        let mut root = tree(json!({"a": {"b": "c"}}));
        let err = ConfigPath::parse("a[0]")
            .unwrap()
            .write_scalar(&mut root, Some("x".into()))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::UnexpectedNode { expected: NodeKind::Array, found: NodeKind::Object, .. }
        ));
        assert!(err.to_string().contains("'a[0]'"), "got: {err}");
    }

    #[test]
    fn test_write_to_empty_path_is_rejected() {
        let mut root = Node::empty_object();
        let err = ConfigPath::parse("")
            .unwrap()
            .write_scalar(&mut root, Some("x".into()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::EmptyPath));
    }
}
