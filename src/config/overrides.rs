//! Point overrides applied to a merged tree.

use super::node::Node;
use super::path::ConfigPath;
use super::ConfigError;

/// A single `path = value` override. A `None` value writes an explicit null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub path: String,
    pub value: Option<String>,
}

impl OverrideEntry {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn null(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: None,
        }
    }
}

impl<P: Into<String>, V: Into<String>> From<(P, V)> for OverrideEntry {
    fn from((path, value): (P, V)) -> Self {
        OverrideEntry::new(path, value)
    }
}

/// Applies `overrides` to `tree` in order; a later entry for the same path wins.
///
/// Missing intermediate objects and arrays are created. The first failing
/// entry aborts the whole application and is reported with its path.
///
/// On error `tree` is left partially modified: earlier entries stay applied,
/// and parents created for the failing entry are not removed. Discard the
/// tree, or apply to a clone when the original must survive a failure.
pub fn apply_overrides<I>(tree: &mut Node, overrides: I) -> Result<&mut Node, ConfigError>
where
    I: IntoIterator<Item = OverrideEntry>,
{
    for OverrideEntry { path, value } in overrides {
        tracing::debug!(path = %path, "applying config override");

        ConfigPath::parse(&path)
            .and_then(|target| target.write_scalar(tree, value))
            .map_err(|source| ConfigError::InvalidOverride {
                path,
                source: Box::new(source),
            })?;
    }

    Ok(tree)
}
