//! Decoding of raw source bytes into configuration trees.

use std::path::Path;

use super::node::Node;
use super::ConfigError;

/// Turns the bytes of one configuration source into a [`Node`].
///
/// `origin` names the source in error messages.
pub trait DocumentParser: Send + Sync + std::fmt::Debug {
    fn parse(&self, origin: &str, bytes: &[u8]) -> Result<Node, ConfigError>;
}

/// Built-in document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Picks a format from the file extension; anything unrecognized is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

fn parse_error(
    origin: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ConfigError {
    ConfigError::ParseError {
        origin: origin.to_string(),
        source: Box::new(source),
    }
}

impl DocumentParser for Format {
    fn parse(&self, origin: &str, bytes: &[u8]) -> Result<Node, ConfigError> {
        match self {
            Format::Yaml if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Node::Null),
            Format::Yaml => serde_yaml::from_slice::<serde_yaml::Value>(bytes)
                .map(Node::from)
                .map_err(|e| parse_error(origin, e)),
            Format::Json => serde_json::from_slice::<serde_json::Value>(bytes)
                .map(Node::from)
                .map_err(|e| parse_error(origin, e)),
            Format::Toml => {
                let text = std::str::from_utf8(bytes).map_err(|e| parse_error(origin, e))?;
                toml::from_str::<toml::Table>(text)
                    .map(Node::from)
                    .map_err(|e| parse_error(origin, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("app.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("app.TOML")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("app.yml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("app")), Format::Yaml);
    }

    #[test]
    fn test_each_format_decodes_to_same_tree() {
        let expected = Node::from(json!({"server": {"port": "8080", "hosts": ["a", "b"]}}));

        let yaml = Format::Yaml
            .parse("yaml", b"server:\n  port: 8080\n  hosts: [a, b]\n")
            .unwrap();
        let json = Format::Json
            .parse("json", br#"{"server": {"port": 8080, "hosts": ["a", "b"]}}"#)
            .unwrap();
        let toml = Format::Toml
            .parse("toml", b"[server]\nport = 8080\nhosts = [\"a\", \"b\"]\n")
            .unwrap();

        assert_eq!(yaml, expected);
        assert_eq!(json, expected);
        assert_eq!(toml, expected);
    }

    #[test]
    fn test_empty_yaml_is_null() {
        assert_eq!(Format::Yaml.parse("empty", b"").unwrap(), Node::Null);
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = Format::Json.parse("broken.json", b"{not json").unwrap_err();

        assert!(matches!(err, ConfigError::ParseError { ref origin, .. } if origin == "broken.json"));
    }
}
