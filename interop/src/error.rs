use crate::exporter::SourceLocation;
use thiserror::Error;

/// The main error type for the `fibre_interop` engine.
///
/// Every variant is fatal where it is raised; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Source unit {location} both registers providers and declares exports; pick one style per unit")]
  MixedRegistrationStyle { location: SourceLocation },

  #[error("Module {location} already has property: {name}")]
  DuplicateExport { location: SourceLocation, name: String },

  #[error("Unable to find provider: {name} (no {name}{suffix} registered and no built-in default)")]
  MissingLazyProvider { name: String, suffix: String },

  #[error("The container must be bootstrapped before '{name}' can be imported")]
  NotBootstrapped { name: String },

  #[error("Binding set has no export named '{0}'")]
  MissingExport(String),

  #[error("The interop engine is not installed on this container")]
  NotInstalled,

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },

  #[error(transparent)]
  Container(fibre_injector::Error),
}

impl Error {
  /// Hands an engine error to the container, e.g. from a module hook or a
  /// factory. [`From<fibre_injector::Error>`] undoes this.
  pub(crate) fn into_container(self) -> fibre_injector::Error {
    match self {
      Error::Container(inner) => inner,
      other => fibre_injector::Error::foreign(other),
    }
  }
}

impl From<fibre_injector::Error> for Error {
  fn from(err: fibre_injector::Error) -> Self {
    match err {
      fibre_injector::Error::Foreign(inner) => match inner.downcast::<Error>() {
        Ok(own) => *own,
        Err(other) => Error::Container(fibre_injector::Error::Foreign(other)),
      },
      other => Error::Container(other),
    }
  }
}

/// A specialized `Result` type for `fibre_interop` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
