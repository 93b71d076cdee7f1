//! The shared provider registry behind both injectors.

use crate::core::{DecoratorFn, FactoryFn, ProviderFn, ProviderInstance, Value};
use crate::definition::{Definition, Registration};
use crate::error::{Error, Result};
use crate::injector::Injector;
use crate::kind::Kind;
use crate::services;
use once_cell::unsync::OnceCell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// How a run-time name is produced.
#[derive(Clone)]
pub(crate) enum Recipe {
  Constant(Value),
  Value(Value),
  Factory(FactoryFn),
  Provider(Rc<ProviderSlot>),
}

/// A provider constructor and its lazily created instance.
pub(crate) struct ProviderSlot {
  definition: ProviderFn,
  instance: OnceCell<ProviderInstance>,
}

impl ProviderSlot {
  fn new(definition: ProviderFn) -> Self {
    Self {
      definition,
      instance: OnceCell::new(),
    }
  }

  pub(crate) fn instance(&self, config: &Injector) -> Result<ProviderInstance> {
    self
      .instance
      .get_or_try_init(|| (self.definition)(config))
      .cloned()
  }
}

#[derive(Default)]
pub(crate) struct Registry {
  recipes: RefCell<HashMap<String, Recipe>>,
  decorators: RefCell<HashMap<String, Vec<DecoratorFn>>>,
  controllers: RefCell<HashMap<String, FactoryFn>>,
  instances: RefCell<HashMap<String, Value>>,
  pub(crate) resolving: RefCell<Vec<String>>,
}

impl Registry {
  /// A registry pre-populated with the container's built-in services.
  pub(crate) fn with_builtins() -> Self {
    let registry = Self::default();
    registry.insert(services::LOG, Recipe::Value(Rc::new(services::Log)));
    registry.insert(
      services::EXCEPTION_HANDLER,
      Recipe::Value(Rc::new(services::default_exception_handler())),
    );
    registry
  }

  fn insert(&self, name: impl Into<String>, recipe: Recipe) {
    self.recipes.borrow_mut().insert(name.into(), recipe);
  }

  /// Records a registration. The last registration for a name wins, but an
  /// instance that has already been created stays cached.
  pub(crate) fn apply(&self, registration: Registration) -> Result<()> {
    let (kind, name, definition) = registration.into_parts();
    match (kind, definition) {
      (Kind::Constant, Definition::Value(value)) => self.insert(name, Recipe::Constant(value)),
      (Kind::Value, Definition::Value(value)) => self.insert(name, Recipe::Value(value)),
      (Kind::Factory | Kind::Service, Definition::Factory(factory)) => {
        self.insert(name, Recipe::Factory(factory))
      }
      (Kind::Provider, Definition::Provider(definition)) => {
        self.insert(name, Recipe::Provider(Rc::new(ProviderSlot::new(definition))))
      }
      (Kind::Decorator, Definition::Decorator(decorator)) => self
        .decorators
        .borrow_mut()
        .entry(name)
        .or_default()
        .push(decorator),
      (Kind::Controller, Definition::Factory(factory)) => {
        self.controllers.borrow_mut().insert(name, factory);
      }
      (kind @ (Kind::Directive | Kind::Filter | Kind::Animation), Definition::Factory(factory)) => {
        let suffix = kind.component_suffix().unwrap_or_default();
        self.insert(format!("{}{}", name, suffix), Recipe::Factory(factory))
      }
      (kind, _) => return Err(Error::DefinitionMismatch { kind, name }),
    }
    Ok(())
  }

  pub(crate) fn recipe(&self, name: &str) -> Option<Recipe> {
    self.recipes.borrow().get(name).cloned()
  }

  pub(crate) fn has_recipe(&self, name: &str) -> bool {
    self.recipes.borrow().contains_key(name)
  }

  pub(crate) fn decorators(&self, name: &str) -> Vec<DecoratorFn> {
    self
      .decorators
      .borrow()
      .get(name)
      .cloned()
      .unwrap_or_default()
  }

  pub(crate) fn controller(&self, name: &str) -> Option<FactoryFn> {
    self.controllers.borrow().get(name).cloned()
  }

  pub(crate) fn cached(&self, name: &str) -> Option<Value> {
    self.instances.borrow().get(name).cloned()
  }

  pub(crate) fn cache(&self, name: &str, value: Value) {
    self.instances.borrow_mut().insert(name.to_owned(), value);
  }
}
