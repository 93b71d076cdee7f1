//! Config-time and run-time injectors.

use crate::core::{ResolutionGuard, Value};
use crate::error::{Error, Result};
use crate::registry::{Recipe, Registry};
use crate::services::{ControllerService, RegistrarService, CONTROLLER, INJECTOR};
use std::any::{type_name, Any};
use std::fmt;
use std::rc::Rc;

/// Suffix of the config-time handle of a `provider` registration.
pub const PROVIDER_SUFFIX: &str = "Provider";

/// Which side of the bootstrap an injector serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  /// Sees provider handles, constants and the live registrars.
  Config,
  /// Sees service instances.
  Run,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Config => f.write_str("config"),
      Phase::Run => f.write_str("run"),
    }
  }
}

/// A resolver handle over the container's registry.
///
/// Injectors are cheap to clone; every clone shares the same registry and
/// instance cache.
#[derive(Clone)]
pub struct Injector {
  phase: Phase,
  registry: Rc<Registry>,
}

impl Injector {
  pub(crate) fn new(phase: Phase, registry: Rc<Registry>) -> Self {
    Self { phase, registry }
  }

  pub(crate) fn registry(&self) -> &Rc<Registry> {
    &self.registry
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Resolves `name` to its type-erased value.
  pub fn get_value(&self, name: &str) -> Result<Value> {
    match self.phase {
      Phase::Config => self.get_config(name),
      Phase::Run => self.get_run(name),
    }
  }

  /// Resolves `name` and downcasts it to `T`.
  pub fn get<T: Any>(&self, name: &str) -> Result<Rc<T>> {
    self
      .get_value(name)?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        name: name.to_owned(),
        expected: type_name::<T>(),
      })
  }

  /// Whether `name` would resolve, without instantiating anything.
  pub fn has(&self, name: &str) -> bool {
    match self.phase {
      Phase::Config => {
        name == INJECTOR
          || RegistrarService::lookup(name, &self.registry).is_some()
          || matches!(self.registry.recipe(name), Some(Recipe::Constant(_)))
          || name
            .strip_suffix(PROVIDER_SUFFIX)
            .is_some_and(|base| {
              matches!(self.registry.recipe(base), Some(Recipe::Provider(_)))
            })
      }
      Phase::Run => {
        name == INJECTOR
          || name == CONTROLLER
          || self.registry.cached(name).is_some()
          || self.registry.has_recipe(name)
      }
    }
  }

  /// Runs `f` with this injector.
  pub fn invoke<R>(&self, f: impl FnOnce(&Injector) -> Result<R>) -> Result<R> {
    f(self)
  }

  fn unknown(&self, name: &str) -> Error {
    Error::UnknownBinding {
      name: name.to_owned(),
      phase: self.phase,
    }
  }

  fn get_config(&self, name: &str) -> Result<Value> {
    if name == INJECTOR {
      return Ok(Rc::new(self.clone()));
    }
    if let Some(service) = RegistrarService::lookup(name, &self.registry) {
      return Ok(Rc::new(service));
    }
    if let Some(base) = name.strip_suffix(PROVIDER_SUFFIX) {
      if let Some(Recipe::Provider(slot)) = self.registry.recipe(base) {
        let _guard = ResolutionGuard::enter(&self.registry.resolving, name)?;
        return Ok(slot.instance(self)?.handle());
      }
    }
    match self.registry.recipe(name) {
      Some(Recipe::Constant(value)) => Ok(value),
      _ => Err(self.unknown(name)),
    }
  }

  fn get_run(&self, name: &str) -> Result<Value> {
    match name {
      INJECTOR => return Ok(Rc::new(self.clone())),
      CONTROLLER => return Ok(Rc::new(ControllerService::new(self.clone()))),
      _ => {}
    }
    if let Some(instance) = self.registry.cached(name) {
      return Ok(instance);
    }

    let recipe = self.registry.recipe(name).ok_or_else(|| self.unknown(name))?;
    let _guard = ResolutionGuard::enter(&self.registry.resolving, name)?;

    let mut instance = match recipe {
      Recipe::Constant(value) | Recipe::Value(value) => value,
      Recipe::Factory(factory) => factory(self)?,
      Recipe::Provider(slot) => {
        let config = Injector::new(Phase::Config, self.registry.clone());
        let provider = {
          let handle_name = format!("{}{}", name, PROVIDER_SUFFIX);
          let _guard = ResolutionGuard::enter(&self.registry.resolving, &handle_name)?;
          slot.instance(&config)?
        };
        provider.instantiate(self)?
      }
    };
    for decorator in self.registry.decorators(name) {
      instance = decorator(self, instance)?;
    }

    self.registry.cache(name, instance.clone());
    Ok(instance)
  }
}

impl fmt::Debug for Injector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Injector").field("phase", &self.phase).finish()
  }
}
