//! Provider definitions and the registrations that carry them.

use crate::core::{DecoratorFn, FactoryFn, ProviderFn, ProviderInstance, Value};
use crate::error::{Error, Result};
use crate::injector::Injector;
use crate::kind::Kind;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// The implementation half of a registration.
#[derive(Clone)]
pub enum Definition {
  /// A ready-made value (`constant`, `value`).
  Value(Value),
  /// A factory invoked with the run injector.
  Factory(FactoryFn),
  /// A provider constructor invoked with the config injector.
  Provider(ProviderFn),
  /// A decorator receiving the service it wraps.
  Decorator(DecoratorFn),
}

impl Definition {
  pub fn value<T: Any>(value: T) -> Self {
    Definition::Value(Rc::new(value))
  }

  pub fn factory<T: Any>(f: impl Fn(&Injector) -> Result<T> + 'static) -> Self {
    Definition::Factory(Rc::new(move |injector| f(injector).map(|v| Rc::new(v) as Value)))
  }

  /// A factory that already produces type-erased values.
  pub fn factory_value(f: impl Fn(&Injector) -> Result<Value> + 'static) -> Self {
    Definition::Factory(Rc::new(f))
  }

  pub fn provider(f: impl Fn(&Injector) -> Result<ProviderInstance> + 'static) -> Self {
    Definition::Provider(Rc::new(f))
  }

  pub fn decorator(f: impl Fn(&Injector, Value) -> Result<Value> + 'static) -> Self {
    Definition::Decorator(Rc::new(f))
  }
}

impl fmt::Debug for Definition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let shape = match self {
      Definition::Value(_) => "Value",
      Definition::Factory(_) => "Factory",
      Definition::Provider(_) => "Provider",
      Definition::Decorator(_) => "Decorator",
    };
    write!(f, "Definition::{}(..)", shape)
  }
}

/// A validated `(kind, name, definition)` triple.
#[derive(Clone, Debug)]
pub struct Registration {
  kind: Kind,
  name: String,
  definition: Definition,
}

impl Registration {
  pub fn new(kind: Kind, name: impl Into<String>, definition: Definition) -> Result<Self> {
    let name = name.into();
    if !kind.accepts(&definition) {
      return Err(Error::DefinitionMismatch { kind, name });
    }
    Ok(Self {
      kind,
      name,
      definition,
    })
  }

  pub fn kind(&self) -> Kind {
    self.kind
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn definition(&self) -> &Definition {
    &self.definition
  }

  /// The same registration under a different name.
  pub fn renamed(self, name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..self
    }
  }

  pub(crate) fn into_parts(self) -> (Kind, String, Definition) {
    (self.kind, self.name, self.definition)
  }
}
