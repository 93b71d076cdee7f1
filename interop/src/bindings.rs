//! Binding-sets: per-unit export namespaces whose entries resolve lazily.

use crate::error::{Error, Result};
use crate::exporter::SourceLocation;
use crate::lifecycle::Lifecycle;
use fibre_injector::{Phase, Value};
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// A deferred export: which name to resolve, and through which injector.
#[derive(Clone)]
pub(crate) struct LazyDescriptor {
  name: String,
  phase: Phase,
  lifecycle: Rc<Lifecycle>,
}

impl LazyDescriptor {
  pub(crate) fn new(name: impl Into<String>, phase: Phase, lifecycle: Rc<Lifecycle>) -> Self {
    Self {
      name: name.into(),
      phase,
      lifecycle,
    }
  }

  fn resolve(&self) -> Result<Value> {
    let injector = self
      .lifecycle
      .resolver(self.phase)
      .ok_or_else(|| Error::NotBootstrapped {
        name: self.name.clone(),
      })?;
    Ok(injector.get_value(&self.name)?)
  }
}

#[derive(Clone)]
enum Binding {
  Pending(LazyDescriptor),
  Resolved(Value),
}

/// One source unit's export namespace.
///
/// Each name is installed once. Entries installed by the engine start out
/// pending and are resolved against the container on first access; the
/// resolved value then replaces the descriptor for good.
///
/// Cloning yields another handle to the same namespace.
#[derive(Clone, Default)]
pub struct BindingSet {
  entries: Rc<RefCell<BTreeMap<String, Binding>>>,
}

impl BindingSet {
  /// Creates a new, empty `BindingSet`.
  pub fn new() -> Self {
    Self::default()
  }

  /// The value exported under `name`, resolving it on first access.
  pub fn get(&self, name: &str) -> Result<Value> {
    let descriptor = match self.entries.borrow().get(name) {
      None => return Err(Error::MissingExport(name.to_owned())),
      Some(Binding::Resolved(value)) => return Ok(value.clone()),
      Some(Binding::Pending(descriptor)) => descriptor.clone(),
    };

    let value = descriptor.resolve()?;

    let mut entries = self.entries.borrow_mut();
    // A factory run during resolution may have imported this very name.
    if let Some(Binding::Resolved(existing)) = entries.get(name) {
      return Ok(existing.clone());
    }
    trace!(name, phase = %descriptor.phase, "binding resolved");
    entries.insert(name.to_owned(), Binding::Resolved(value.clone()));
    Ok(value)
  }

  /// Typed variant of [`BindingSet::get`].
  pub fn get_as<T: Any>(&self, name: &str) -> Result<Rc<T>> {
    self.get(name)?.downcast::<T>().map_err(|_| {
      Error::Container(fibre_injector::Error::TypeMismatch {
        name: name.to_owned(),
        expected: type_name::<T>(),
      })
    })
  }

  /// Adds an already-resolved export, e.g. one a unit declares itself.
  pub fn insert_value(&self, location: &SourceLocation, name: &str, value: Value) -> Result<()> {
    self.install(location, name, Binding::Resolved(value))
  }

  pub(crate) fn install_lazy(
    &self,
    location: &SourceLocation,
    descriptor: LazyDescriptor,
  ) -> Result<()> {
    let name = descriptor.name.clone();
    self.install(location, &name, Binding::Pending(descriptor))
  }

  fn install(&self, location: &SourceLocation, name: &str, binding: Binding) -> Result<()> {
    let mut entries = self.entries.borrow_mut();
    if entries.contains_key(name) {
      return Err(Error::DuplicateExport {
        location: location.clone(),
        name: name.to_owned(),
      });
    }
    entries.insert(name.to_owned(), binding);
    Ok(())
  }

  /// Whether `name` has been installed, resolved or not.
  pub fn contains(&self, name: &str) -> bool {
    self.entries.borrow().contains_key(name)
  }

  /// Whether `name` has been resolved (or was installed resolved).
  pub fn is_resolved(&self, name: &str) -> bool {
    matches!(self.entries.borrow().get(name), Some(Binding::Resolved(_)))
  }

  /// Export names in sorted order.
  pub fn names(&self) -> Vec<String> {
    self.entries.borrow().keys().cloned().collect()
  }

  /// Number of installed exports.
  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  /// Whether nothing has been installed yet.
  pub fn is_empty(&self) -> bool {
    self.entries.borrow().is_empty()
  }

  pub(crate) fn resolved_entries(&self) -> Vec<(String, Value)> {
    self
      .entries
      .borrow()
      .iter()
      .filter_map(|(name, binding)| match binding {
        Binding::Resolved(value) => Some((name.clone(), value.clone())),
        Binding::Pending(_) => None,
      })
      .collect()
  }
}

impl fmt::Debug for BindingSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let entries = self.entries.borrow();
    f.debug_map()
      .entries(entries.iter().map(|(name, binding)| {
        let state = match binding {
          Binding::Pending(descriptor) => format!("pending ({})", descriptor.phase),
          Binding::Resolved(_) => "resolved".to_string(),
        };
        (name, state)
      }))
      .finish()
  }
}
