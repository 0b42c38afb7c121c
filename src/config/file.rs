//! File-based configuration source.

use std::path::{Path, PathBuf};

use super::node::Node;
use super::parser::{DocumentParser, Format};
use super::source::ConfigSource;
use super::ConfigError;

/// A configuration source that loads from a file.
///
/// Files can be marked as required or optional. Required files that don't exist
/// cause an error; optional files that don't exist are silently skipped. The
/// format follows the extension unless a parser is given explicitly.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
    parser: Option<Box<dyn DocumentParser>>,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, the build will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
            parser: None,
        }
    }

    pub fn with_parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<Node>, ConfigError> {
        let Some(bytes) = read_config_file(&self.path, self.required)? else {
            return Ok(None);
        };

        let origin = self.origin();
        let node = match &self.parser {
            Some(parser) => parser.parse(&origin, &bytes)?,
            None => Format::from_path(&self.path).parse(&origin, &bytes)?,
        };
        Ok(Some(node))
    }
}

/// Reads a config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn read_config_file(path: &Path, required: bool) -> Result<Option<Vec<u8>>, ConfigError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_file_source_loads_yaml() {
        let file = temp_file(".yml", "key: value\n");

        let node = FileSource::new(file.path(), true).load().unwrap().unwrap();
        assert_eq!(node.get("key"), Some(&Node::scalar("value")));
    }

    #[test]
    fn test_file_source_picks_toml_by_extension() {
        let file = temp_file(".toml", "[server]\nport = 8080\n");

        let node = FileSource::new(file.path(), true).load().unwrap().unwrap();
        assert_eq!(
            node.get("server").and_then(|s| s.get("port")),
            Some(&Node::scalar("8080"))
        );
    }

    #[test]
    fn test_explicit_parser_wins_over_extension() {
        let file = temp_file(".conf", r#"{"a": [1]}"#);

        let node = FileSource::new(file.path(), true)
            .with_parser(Format::Json)
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(node.get("a").and_then(|a| a.get_index(0)), Some(&Node::scalar("1")));
    }

    #[test]
    fn test_file_source_required_missing() {
        let source = FileSource::new("/nonexistent/path/config.yml", true);
        let result = source.load();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::new("/nonexistent/path/config.yml", false);

        assert!(source.load().unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = temp_file(".json", "{\"a\":");

        let result = FileSource::new(file.path(), true).load();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
