use crate::core::{describe, Value};
use crate::injector::Phase;
use crate::kind::Kind;
use thiserror::Error;

/// The error type for every fallible container operation.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Unknown provider: {name} ({phase} injector)")]
  UnknownBinding { name: String, phase: Phase },

  #[error("Circular dependency found: {path}")]
  CircularDependency { path: String },

  #[error("Service '{name}' is not a {expected}")]
  TypeMismatch { name: String, expected: &'static str },

  #[error("A {kind} registration for '{name}' was given the wrong kind of definition")]
  DefinitionMismatch { kind: Kind, name: String },

  #[error("Registrar '{registrar}' cannot register a {kind}")]
  UnsupportedKind { registrar: String, kind: Kind },

  #[error("Unknown provider kind: {0}")]
  UnknownKind(String),

  #[error("Controller '{0}' is not registered")]
  UnknownController(String),

  #[error("Module '{0}' is not available. Register it with a list of required modules first")]
  ModuleUnavailable(String),

  #[error("The container has already been bootstrapped")]
  AlreadyBootstrapped,

  #[error("Uncaught exception: {}", describe(.0))]
  Thrown(Value),

  #[error("{0}")]
  Foreign(Box<dyn std::error::Error>),
}

impl Error {
  /// Wraps an error raised by code running inside the container.
  pub fn foreign(err: impl std::error::Error + 'static) -> Self {
    Error::Foreign(Box::new(err))
  }

  /// Returns the thrown value if this error carries one.
  pub fn thrown(&self) -> Option<&Value> {
    match self {
      Error::Thrown(value) => Some(value),
      _ => None,
    }
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
