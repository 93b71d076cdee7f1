//! Core value and callable types shared by the container and its injectors.

use crate::error::{Error, Result};
use crate::injector::Injector;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A resolved service. Every value the container hands out is type-erased
/// behind an `Rc` and downcast at the point of use.
pub type Value = Rc<dyn Any>;

pub(crate) type FactoryFn = Rc<dyn Fn(&Injector) -> Result<Value>>;
pub(crate) type ProviderFn = Rc<dyn Fn(&Injector) -> Result<ProviderInstance>>;
pub(crate) type DecoratorFn = Rc<dyn Fn(&Injector, Value) -> Result<Value>>;

/// A config or run block.
pub type Block = Rc<dyn Fn(&Injector) -> Result<()>>;

/// Wraps any value as a container [`Value`].
pub fn value<T: Any>(value: T) -> Value {
  Rc::new(value)
}

/// Best-effort human readable rendering of a thrown value.
pub(crate) fn describe(value: &Value) -> String {
  if let Some(s) = value.downcast_ref::<String>() {
    s.clone()
  } else if let Some(s) = value.downcast_ref::<&'static str>() {
    (*s).to_owned()
  } else if let Some(err) = value.downcast_ref::<Error>() {
    err.to_string()
  } else {
    "<opaque value>".to_owned()
  }
}

/// A callable service, e.g. `$exceptionHandler`.
///
/// Handlers receive their arguments as container values and may raise by
/// returning [`Error::Thrown`].
#[derive(Clone)]
pub struct Invocable(Rc<dyn Fn(&[Value]) -> Result<Value>>);

impl Invocable {
  /// Wraps `f` as a callable service.
  pub fn new(f: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
    Self(Rc::new(f))
  }

  /// Invokes the callable with `args`.
  pub fn call(&self, args: &[Value]) -> Result<Value> {
    (self.0)(args)
  }
}

impl fmt::Debug for Invocable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Invocable(..)")
  }
}

/// What a `provider` registration produces at config time: a handle that is
/// injectable as `<name>Provider` during the config phase, and the `$get`
/// factory that builds the run-time service.
#[derive(Clone)]
pub struct ProviderInstance {
  handle: Value,
  get: FactoryFn,
}

impl ProviderInstance {
  pub fn new<H: Any, T: Any>(
    handle: Rc<H>,
    get: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Self {
    Self {
      handle,
      get: Rc::new(move |injector| get(injector).map(|v| Rc::new(v) as Value)),
    }
  }

  /// A provider with no configurable state of its own.
  pub fn from_get<T: Any>(get: impl Fn(&Injector) -> Result<T> + 'static) -> Self {
    Self::new(Rc::new(()), get)
  }

  pub fn handle(&self) -> Value {
    self.handle.clone()
  }

  pub(crate) fn instantiate(&self, injector: &Injector) -> Result<Value> {
    (self.get)(injector)
  }
}

/// Tracks the names currently being instantiated so that cycles are reported
/// instead of recursing forever.
///
/// Entering pushes the name; dropping the guard pops it again.
pub(crate) struct ResolutionGuard<'a> {
  stack: &'a RefCell<Vec<String>>,
}

impl<'a> ResolutionGuard<'a> {
  pub(crate) fn enter(stack: &'a RefCell<Vec<String>>, name: &str) -> Result<Self> {
    let mut entries = stack.borrow_mut();
    if entries.iter().any(|entry| entry == name) {
      let mut path: Vec<&str> = entries.iter().map(String::as_str).collect();
      path.push(name);
      return Err(Error::CircularDependency {
        path: path.join(" -> "),
      });
    }
    entries.push(name.to_owned());
    Ok(Self { stack })
  }
}

impl Drop for ResolutionGuard<'_> {
  fn drop(&mut self) {
    self.stack.borrow_mut().pop();
  }
}
