//! Engine configuration: the name tables, overridable from YAML.

use crate::error::{Error, Result};
use crate::tables;
use fibre_injector::Kind;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

fn default_module_name() -> String {
  tables::MONOLITH_MODULE.to_string()
}

fn default_lazy_suffix() -> String {
  tables::LAZY_SUFFIX.to_string()
}

fn default_lazy_providers() -> Vec<String> {
  tables::LAZY_PROVIDERS.iter().map(|s| s.to_string()).collect()
}

fn default_container_exports() -> Vec<String> {
  tables::CONTAINER_EXPORTS.iter().map(|s| s.to_string()).collect()
}

fn default_default_providers() -> Vec<DefaultProvider> {
  vec![DefaultProvider {
    kind: Kind::Constant.as_str().to_string(),
    name: tables::DEFAULT_CONSTANT.to_string(),
    value: serde_json::Value::Object(serde_json::Map::new()),
  }]
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InteropConfig {
  /// Name given to the singleton module.
  #[serde(default = "default_module_name")]
  pub module_name: String,
  /// Suffix of post-bootstrap overrides for lazy providers.
  #[serde(default = "default_lazy_suffix")]
  pub lazy_suffix: String,
  /// Providers routed through the lazy-override channel.
  #[serde(default = "default_lazy_providers")]
  pub lazy_providers: Vec<String>,
  /// Container services exposed through the container-wide binding-set.
  #[serde(default = "default_container_exports")]
  pub container_exports: Vec<String>,
  /// Registered on the singleton module at install time.
  #[serde(default = "default_default_providers")]
  pub default_providers: Vec<DefaultProvider>,
}

/// A provider registered at install time. Only `constant` and `value`
/// kinds make sense here, since the definition is plain data.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DefaultProvider {
  pub kind: String,
  pub name: String,
  #[serde(default)]
  pub value: serde_json::Value,
}

impl DefaultProvider {
  pub fn kind(&self) -> Result<Kind> {
    let kind = self.kind.parse::<Kind>()?;
    match kind {
      Kind::Constant | Kind::Value => Ok(kind),
      other => Err(Error::InvalidConfigValue {
        field: format!("default_providers.{}.kind", self.name),
        message: format!("'{}' providers cannot be declared as data", other),
      }),
    }
  }
}

impl Default for InteropConfig {
  fn default() -> Self {
    Self {
      module_name: default_module_name(),
      lazy_suffix: default_lazy_suffix(),
      lazy_providers: default_lazy_providers(),
      container_exports: default_container_exports(),
      default_providers: default_default_providers(),
    }
  }
}

impl InteropConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    serde_yaml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  pub fn from_reader(reader: impl Read) -> Result<Self> {
    serde_yaml::from_reader(reader).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  /// Loads and validates a YAML configuration file.
  pub fn from_file(path: &Path) -> Result<Self> {
    debug!(path = %path.display(), "loading interop configuration");
    let file = File::open(path)?;
    let config = Self::from_reader(io::BufReader::new(file))?;
    config.validate()?;
    Ok(config)
  }

  pub fn is_lazy(&self, name: &str) -> bool {
    self.lazy_providers.iter().any(|lazy| lazy == name)
  }

  /// `<name><lazy_suffix>`.
  pub fn lazy_name(&self, name: &str) -> String {
    format!("{}{}", name, self.lazy_suffix)
  }

  pub fn validate(&self) -> Result<()> {
    if self.module_name.is_empty() {
      return Err(invalid("module_name", "must not be empty"));
    }
    if self.lazy_suffix.is_empty() {
      return Err(invalid("lazy_suffix", "must not be empty"));
    }
    ensure_unique("lazy_providers", &self.lazy_providers)?;
    ensure_unique("container_exports", &self.container_exports)?;
    let names: Vec<String> = self
      .default_providers
      .iter()
      .map(|provider| provider.name.clone())
      .collect();
    ensure_unique("default_providers", &names)?;
    for provider in &self.default_providers {
      provider.kind()?;
    }
    Ok(())
  }
}

fn invalid(field: &str, message: impl Into<String>) -> Error {
  Error::InvalidConfigValue {
    field: field.to_string(),
    message: message.into(),
  }
}

fn ensure_unique(field: &str, names: &[String]) -> Result<()> {
  let mut seen = HashSet::new();
  for name in names {
    if name.is_empty() {
      return Err(invalid(field, "names must not be empty"));
    }
    if !seen.insert(name.as_str()) {
      return Err(invalid(field, format!("'{}' is listed twice", name)));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn empty_document_yields_the_built_in_tables() {
    let config = InteropConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, InteropConfig::default());
    assert!(config.is_lazy("$exceptionHandler"));
    assert_eq!(config.lazy_name("$sanitize"), "$sanitizeLazy");
    config.validate().unwrap();
  }

  #[test]
  fn partial_document_overrides_only_named_fields() {
    let config = InteropConfig::from_yaml_str(
      r#"
lazy_suffix: Override
lazy_providers: ["$exceptionHandler", "$log"]
default_providers:
  - kind: value
    name: featureFlags
    value: { beta: true }
"#,
    )
    .unwrap();

    assert_eq!(config.lazy_suffix, "Override");
    assert_eq!(config.lazy_providers, vec!["$exceptionHandler", "$log"]);
    assert_eq!(config.module_name, "app");
    assert_eq!(config.default_providers[0].kind().unwrap(), Kind::Value);
    assert_eq!(config.default_providers[0].value["beta"], serde_json::Value::Bool(true));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(matches!(
      InteropConfig::from_yaml_str("lazy_providerz: []"),
      Err(Error::ConfigParse(_))
    ));
  }

  #[test]
  fn validation_rejects_bad_tables() {
    let mut config = InteropConfig::default();
    config.lazy_suffix.clear();
    assert!(matches!(config.validate(), Err(Error::InvalidConfigValue { .. })));

    let mut config = InteropConfig::default();
    config.lazy_providers.push("$exceptionHandler".to_string());
    assert!(matches!(config.validate(), Err(Error::InvalidConfigValue { .. })));

    let mut config = InteropConfig::default();
    config.default_providers[0].kind = "factory".to_string();
    assert!(matches!(config.validate(), Err(Error::InvalidConfigValue { .. })));

    let mut config = InteropConfig::default();
    config.default_providers[0].kind = "widget".to_string();
    assert!(matches!(
      config.validate(),
      Err(Error::Container(fibre_injector::Error::UnknownKind(_)))
    ));
  }
}
