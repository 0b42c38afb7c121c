//! Properties and variables that become config overrides.
//!
//! Overrides are assembled in increasing order of precedence:
//!
//! 1. properties under the property prefix (`bq.a.b` overrides `a.b`)
//! 2. declared variables bound in code
//! 3. declared variables read from the process environment

use std::collections::BTreeMap;

use super::overrides::OverrideEntry;

pub const DEFAULT_PROPERTY_PREFIX: &str = "bq";
pub const DEFAULT_VAR_PREFIX: &str = "BQ";

/// Binds a configuration path to an environment variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredVariable {
    config_path: String,
    name: String,
}

impl DeclaredVariable {
    pub fn new(config_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            name: name.into(),
        }
    }

    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Derives a variable name from a config path.
///
/// `jdbc.myds.password` with prefix `BQ` becomes `BQ_JDBC_MYDS_PASSWORD`.
/// Runs of non-alphanumeric characters collapse into a single `_`.
pub fn derive_var_name(prefix: &str, config_path: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + config_path.len() + 1);
    name.push_str(prefix);

    let mut pending_separator = !prefix.is_empty();
    for ch in config_path.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator {
                name.push('_');
                pending_separator = false;
            }
            name.push(ch.to_ascii_uppercase());
        } else {
            pending_separator = !name.is_empty();
        }
    }

    name
}

/// Resolved properties and variables of one application run.
#[derive(Debug, Clone)]
pub struct Environment {
    properties: BTreeMap<String, String>,
    variables: BTreeMap<String, String>,
    system_variables: BTreeMap<String, String>,
    declared: Vec<DeclaredVariable>,
    property_prefix: String,
}

impl Environment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Properties under `prefix.`, keyed by the rest of their name.
    pub fn subproperties(&self, prefix: &str) -> BTreeMap<String, String> {
        filter_by_prefix(&self.properties, prefix, ".")
    }

    /// Looks a variable up, process environment first.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.system_variables
            .get(name)
            .or_else(|| self.variables.get(name))
            .map(String::as_str)
    }

    /// Variables under `prefix_`, keyed by the rest of their name.
    pub fn variables(&self, prefix: &str) -> BTreeMap<String, String> {
        let mut all = self.variables.clone();
        all.extend(
            self.system_variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        filter_by_prefix(&all, prefix, "_")
    }

    pub fn declared_variables(&self) -> &[DeclaredVariable] {
        &self.declared
    }

    /// The ordered override sequence; later entries take precedence.
    pub fn overrides(&self) -> Vec<OverrideEntry> {
        let mut entries: Vec<OverrideEntry> = self
            .subproperties(&self.property_prefix)
            .into_iter()
            .map(OverrideEntry::from)
            .collect();

        for vars in [&self.variables, &self.system_variables] {
            for declared in &self.declared {
                if let Some(value) = vars.get(&declared.name) {
                    tracing::debug!(
                        path = %declared.config_path,
                        variable = %declared.name,
                        "declared variable resolved"
                    );
                    entries.push(OverrideEntry::new(declared.config_path.clone(), value.clone()));
                }
            }
        }

        entries
    }
}

fn filter_by_prefix(
    unfiltered: &BTreeMap<String, String>,
    prefix: &str,
    separator: &str,
) -> BTreeMap<String, String> {
    let prefix = if prefix.ends_with(separator) {
        prefix.to_string()
    } else {
        format!("{prefix}{separator}")
    };

    unfiltered
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&prefix)
                .filter(|rest| !rest.is_empty())
                .map(|rest| (rest.to_string(), value.clone()))
        })
        .collect()
}

/// Builder for [`Environment`].
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct EnvironmentBuilder {
    properties: BTreeMap<String, String>,
    variables: BTreeMap<String, String>,
    declared: Vec<DeclaredVariable>,
    derived: Vec<String>,
    include_system_variables: bool,
    property_prefix: String,
    var_prefix: String,
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            variables: BTreeMap::new(),
            declared: Vec::new(),
            derived: Vec::new(),
            include_system_variables: false,
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            var_prefix: DEFAULT_VAR_PREFIX.to_string(),
        }
    }
}

impl EnvironmentBuilder {
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn vars<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Binds `config_path` to the variable `name`.
    pub fn declare_var(mut self, config_path: impl Into<String>, name: impl Into<String>) -> Self {
        self.declared.push(DeclaredVariable::new(config_path, name));
        self
    }

    /// Binds `config_path` to a variable named after it, see [`derive_var_name`].
    pub fn declare_var_derived(mut self, config_path: impl Into<String>) -> Self {
        self.derived.push(config_path.into());
        self
    }

    /// Reads process environment variables when building.
    pub fn include_system_variables(mut self) -> Self {
        self.include_system_variables = true;
        self
    }

    pub fn property_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.property_prefix = prefix.into();
        self
    }

    /// Prefix of derived variable names.
    pub fn var_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.var_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Environment {
        let mut declared = self.declared;
        declared.extend(self.derived.into_iter().map(|path| {
            let name = derive_var_name(&self.var_prefix, &path);
            DeclaredVariable::new(path, name)
        }));

        let system_variables = if self.include_system_variables {
            std::env::vars().collect()
        } else {
            BTreeMap::new()
        };

        Environment {
            properties: self.properties,
            variables: self.variables,
            system_variables,
            declared,
            property_prefix: self.property_prefix,
        }
    }
}
