//! The main `Container` struct and its associated methods.

use crate::error::{Error, Result};
use crate::injector::{Injector, Phase};
use crate::module::Module;
use crate::registry::Registry;
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, info};

/// Replaces how `Container::module` creates and looks up modules.
pub trait ModuleResolver {
  fn resolve(&self, container: &Container, name: &str, requires: Option<&[&str]>) -> Result<Rc<Module>>;
}

/// Replaces what `Container::bootstrap` does. Implementations decide when
/// (and whether) to call [`Container::bootstrap_now`].
pub trait BootstrapHook {
  fn bootstrap(&self, container: &Container, modules: &[&str]) -> Result<()>;
}

#[derive(Clone)]
struct Injectors {
  config: Injector,
  run: Injector,
}

/// The dependency injection container.
///
/// Providers are registered on named modules and stay frozen until the
/// container is bootstrapped, which happens exactly once: module queues are
/// applied, config blocks run against the config injector, then run blocks
/// run against the run injector.
pub struct Container {
  registry: Rc<Registry>,
  modules: RefCell<HashMap<String, Rc<Module>>>,
  resolver: RefCell<Option<Rc<dyn ModuleResolver>>>,
  bootstrap_hook: RefCell<Option<Rc<dyn BootstrapHook>>>,
  bootstrapped: Cell<bool>,
  injectors: RefCell<Option<Injectors>>,
  extensions: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

impl Default for Container {
  fn default() -> Self {
    Self {
      registry: Rc::new(Registry::with_builtins()),
      modules: RefCell::new(HashMap::new()),
      resolver: RefCell::new(None),
      bootstrap_hook: RefCell::new(None),
      bootstrapped: Cell::new(false),
      injectors: RefCell::new(None),
      extensions: RefCell::new(HashMap::new()),
    }
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Modules ---

  /// Creates a module when `requires` is given, otherwise looks one up.
  pub fn module(&self, name: &str, requires: Option<&[&str]>) -> Result<Rc<Module>> {
    let resolver = self.resolver.borrow().clone();
    match resolver {
      Some(resolver) => resolver.resolve(self, name, requires),
      None => self.named_module(name, requires),
    }
  }

  /// The container's own module bookkeeping, ignoring any resolver.
  pub fn named_module(&self, name: &str, requires: Option<&[&str]>) -> Result<Rc<Module>> {
    match requires {
      Some(requires) => {
        let module = Rc::new(Module::new(name, requires));
        self
          .modules
          .borrow_mut()
          .insert(name.to_owned(), module.clone());
        debug!(module = name, ?requires, "module created");
        Ok(module)
      }
      None => self
        .modules
        .borrow()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::ModuleUnavailable(name.to_owned())),
    }
  }

  pub fn replace_module_resolver(&self, resolver: Rc<dyn ModuleResolver>) {
    *self.resolver.borrow_mut() = Some(resolver);
  }

  // --- Bootstrap ---

  pub fn set_bootstrap_hook(&self, hook: Rc<dyn BootstrapHook>) {
    *self.bootstrap_hook.borrow_mut() = Some(hook);
  }

  /// Bootstraps the container, through the installed hook if there is one.
  pub fn bootstrap(&self, modules: &[&str]) -> Result<()> {
    let hook = self.bootstrap_hook.borrow().clone();
    match hook {
      Some(hook) => hook.bootstrap(self, modules),
      None => self.bootstrap_now(modules),
    }
  }

  /// The real bootstrap. It can only ever succeed once; a failure part-way
  /// leaves the container bootstrapped but unusable.
  ///
  /// Meant for [`BootstrapHook`] implementations. Everyone else should call
  /// [`Container::bootstrap`], which goes through the installed hook.
  pub fn bootstrap_now(&self, modules: &[&str]) -> Result<()> {
    if self.bootstrapped.replace(true) {
      return Err(Error::AlreadyBootstrapped);
    }
    let order = self.load_order(modules)?;
    info!(
      modules = ?order.iter().map(|m| m.name()).collect::<Vec<_>>(),
      "bootstrapping container"
    );

    let config = Injector::new(Phase::Config, self.registry.clone());
    for module in &order {
      for registration in module.take_invoke_queue() {
        self.registry.apply(registration)?;
      }
      for block in module.take_config_blocks() {
        block(&config)?;
      }
    }

    let run = Injector::new(Phase::Run, self.registry.clone());
    *self.injectors.borrow_mut() = Some(Injectors {
      config,
      run: run.clone(),
    });

    let run_blocks: Vec<_> = order.iter().flat_map(|m| m.take_run_blocks()).collect();
    for block in run_blocks {
      block(&run)?;
    }
    info!("container bootstrapped");
    Ok(())
  }

  pub fn is_bootstrapped(&self) -> bool {
    self.bootstrapped.get()
  }

  /// The injector for `phase`, once the container has been bootstrapped.
  pub fn injector(&self, phase: Phase) -> Option<Injector> {
    self
      .injectors
      .borrow()
      .as_ref()
      .map(|injectors| match phase {
        Phase::Config => injectors.config.clone(),
        Phase::Run => injectors.run.clone(),
      })
  }

  /// Modules to load for `roots`, dependencies first, each once.
  fn load_order(&self, roots: &[&str]) -> Result<Vec<Rc<Module>>> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    for root in roots {
      self.visit(root, &mut seen, &mut order)?;
    }
    Ok(order)
  }

  fn visit(&self, name: &str, seen: &mut HashSet<String>, order: &mut Vec<Rc<Module>>) -> Result<()> {
    let module = self.module(name, None)?;
    if !seen.insert(module.name().to_owned()) {
      return Ok(());
    }
    for dependency in module.requires() {
      self.visit(dependency, seen, order)?;
    }
    order.push(module);
    Ok(())
  }

  // --- Extensions ---

  /// Attaches `extension` to the container unless one of the same type is
  /// already present. Returns whether it was inserted.
  pub fn insert_extension<T: Any>(&self, extension: Rc<T>) -> bool {
    let mut extensions = self.extensions.borrow_mut();
    if extensions.contains_key(&TypeId::of::<T>()) {
      return false;
    }
    extensions.insert(TypeId::of::<T>(), extension);
    true
  }

  pub fn extension<T: Any>(&self) -> Option<Rc<T>> {
    self
      .extensions
      .borrow()
      .get(&TypeId::of::<T>())
      .cloned()
      .and_then(|extension| extension.downcast::<T>().ok())
  }
}
