//! Named modules: queues of registrations and blocks applied at bootstrap.

use crate::core::{Block, ProviderInstance, Value};
use crate::definition::{Definition, Registration};
use crate::error::Result;
use crate::injector::Injector;
use crate::kind::Kind;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

/// Intercepts a module's registration surface.
///
/// When hooks are attached, `register`, `config` and `run` are handed to
/// them instead of being queued. Hooks call back into [`Module::enqueue`]
/// and friends for the plain queueing behavior.
pub trait ModuleHooks {
  fn register(&self, module: &Module, registration: Registration) -> Result<()>;
  fn config(&self, module: &Module, block: Block) -> Result<()>;
  fn run(&self, module: &Module, block: Block) -> Result<()>;
}

/// A named module: its dependency list and the registrations, config
/// blocks and run blocks queued for bootstrap.
pub struct Module {
  name: String,
  requires: Vec<String>,
  invoke_queue: RefCell<Vec<Registration>>,
  config_blocks: RefCell<Vec<Block>>,
  run_blocks: RefCell<Vec<Block>>,
  hooks: RefCell<Option<Weak<dyn ModuleHooks>>>,
}

impl Module {
  pub(crate) fn new(name: &str, requires: &[&str]) -> Self {
    Self {
      name: name.to_owned(),
      requires: requires.iter().map(|r| (*r).to_owned()).collect(),
      invoke_queue: RefCell::new(Vec::new()),
      config_blocks: RefCell::new(Vec::new()),
      run_blocks: RefCell::new(Vec::new()),
      hooks: RefCell::new(None),
    }
  }

  /// The name the module was created with.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Names of the modules loaded before this one.
  pub fn requires(&self) -> &[String] {
    &self.requires
  }

  /// Routes this module's registration surface through `hooks` from now on.
  pub fn set_hooks(&self, hooks: Weak<dyn ModuleHooks>) {
    *self.hooks.borrow_mut() = Some(hooks);
  }

  fn hooks(&self) -> Option<Rc<dyn ModuleHooks>> {
    self.hooks.borrow().as_ref().and_then(Weak::upgrade)
  }

  // --- Registration ---

  /// Registers `definition` as a `kind` provider named `name`.
  pub fn register(&self, kind: Kind, name: &str, definition: Definition) -> Result<&Self> {
    let registration = Registration::new(kind, name, definition)?;
    match self.hooks() {
      Some(hooks) => hooks.register(self, registration)?,
      None => self.enqueue(registration),
    }
    Ok(self)
  }

  /// Registers a factory, invoked once with the run injector.
  pub fn factory<T: Any>(
    &self,
    name: &str,
    factory: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Factory, name, Definition::factory(factory))
  }

  /// Registers a service constructor. Behaves like [`Module::factory`].
  pub fn service<T: Any>(
    &self,
    name: &str,
    constructor: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Service, name, Definition::factory(constructor))
  }

  /// Registers a constant, visible to both injectors.
  pub fn constant<T: Any>(&self, name: &str, value: T) -> Result<&Self> {
    self.register(Kind::Constant, name, Definition::value(value))
  }

  /// Registers a value, visible to the run injector only.
  pub fn value<T: Any>(&self, name: &str, value: T) -> Result<&Self> {
    self.register(Kind::Value, name, Definition::value(value))
  }

  /// Registers a provider, whose handle is injectable at config time as
  /// `<name>Provider`.
  pub fn provider(
    &self,
    name: &str,
    provider: impl Fn(&Injector) -> Result<ProviderInstance> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Provider, name, Definition::provider(provider))
  }

  /// Registers a decorator wrapping the service named `name`.
  pub fn decorator(
    &self,
    name: &str,
    decorator: impl Fn(&Injector, Value) -> Result<Value> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Decorator, name, Definition::decorator(decorator))
  }

  /// Registers a controller, instantiated through `$controller`.
  pub fn controller<T: Any>(
    &self,
    name: &str,
    constructor: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Controller, name, Definition::factory(constructor))
  }

  /// Registers a directive, resolvable as `<name>Directive`.
  pub fn directive<T: Any>(
    &self,
    name: &str,
    factory: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Directive, name, Definition::factory(factory))
  }

  /// Registers a filter, resolvable as `<name>Filter`.
  pub fn filter<T: Any>(
    &self,
    name: &str,
    factory: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Filter, name, Definition::factory(factory))
  }

  /// Registers an animation, resolvable as `<name>Animation`.
  pub fn animation<T: Any>(
    &self,
    name: &str,
    factory: impl Fn(&Injector) -> Result<T> + 'static,
  ) -> Result<&Self> {
    self.register(Kind::Animation, name, Definition::factory(factory))
  }

  // --- Blocks ---

  /// Adds a block to run against the config injector.
  pub fn config(&self, block: impl Fn(&Injector) -> Result<()> + 'static) -> Result<&Self> {
    let block: Block = Rc::new(block);
    match self.hooks() {
      Some(hooks) => hooks.config(self, block)?,
      None => self.enqueue_config(block),
    }
    Ok(self)
  }

  /// Adds a block to run against the run injector.
  pub fn run(&self, block: impl Fn(&Injector) -> Result<()> + 'static) -> Result<&Self> {
    let block: Block = Rc::new(block);
    match self.hooks() {
      Some(hooks) => hooks.run(self, block)?,
      None => self.enqueue_run(block),
    }
    Ok(self)
  }

  // --- Raw queues ---

  /// Queues `registration`, bypassing any hooks.
  pub fn enqueue(&self, registration: Registration) {
    self.invoke_queue.borrow_mut().push(registration);
  }

  /// Queues a config block, bypassing any hooks.
  pub fn enqueue_config(&self, block: Block) {
    self.config_blocks.borrow_mut().push(block);
  }

  /// Queues a run block, bypassing any hooks.
  pub fn enqueue_run(&self, block: Block) {
    self.run_blocks.borrow_mut().push(block);
  }

  /// Registrations queued and not yet applied.
  pub fn pending_registrations(&self) -> usize {
    self.invoke_queue.borrow().len()
  }

  pub(crate) fn take_invoke_queue(&self) -> Vec<Registration> {
    mem::take(&mut *self.invoke_queue.borrow_mut())
  }

  pub(crate) fn take_config_blocks(&self) -> Vec<Block> {
    mem::take(&mut *self.config_blocks.borrow_mut())
  }

  pub(crate) fn take_run_blocks(&self) -> Vec<Block> {
    mem::take(&mut *self.run_blocks.borrow_mut())
  }
}

impl fmt::Debug for Module {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Module")
      .field("name", &self.name)
      .field("requires", &self.requires)
      .field("pending_registrations", &self.pending_registrations())
      .finish()
  }
}
