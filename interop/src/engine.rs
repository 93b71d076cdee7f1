//! The engine handle and its entry points.

use crate::bindings::{BindingSet, LazyDescriptor};
use crate::config::InteropConfig;
use crate::error::{Error, Result};
use crate::exporter::{ExportTarget, SourceLocation, UnitStyle};
use crate::facade::SingletonModules;
use crate::lazy;
use crate::lifecycle::{Lifecycle, Stage};
use crate::tables;
use fibre_injector::{
  BootstrapHook, Container, Definition, Injector, Kind, Module, ModuleHooks, Phase, Registration,
};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

/// The binding interop engine installed on a [`Container`].
///
/// There is at most one per container. It owns the singleton module every
/// `Container::module` call returns, decides how that module's
/// registrations and blocks are handled on either side of the bootstrap,
/// and fills binding-sets with lazily resolved exports.
pub struct Interop {
  pub(crate) config: InteropConfig,
  pub(crate) module: Rc<Module>,
  pub(crate) lifecycle: Rc<Lifecycle>,
  pub(crate) exporter: RefCell<Option<ExportTarget>>,
  pub(crate) units: RefCell<HashMap<SourceLocation, UnitStyle>>,
  container_bindings: BindingSet,
}

/// Installs the engine with the built-in name tables.
pub fn install(container: &Container) -> Result<Rc<Interop>> {
  install_with_config(container, InteropConfig::default())
}

/// Installs the engine on `container`. Installing twice returns the engine
/// that is already there and ignores `config`.
pub fn install_with_config(container: &Container, config: InteropConfig) -> Result<Rc<Interop>> {
  if let Some(installed) = container.extension::<Interop>() {
    debug!("interop engine already installed");
    return Ok(installed);
  }
  config.validate()?;
  if container.is_bootstrapped() {
    return Err(fibre_injector::Error::AlreadyBootstrapped.into());
  }

  let module = container.named_module(&config.module_name, Some(&[]))?;
  let lifecycle = Lifecycle::new();

  // The capture blocks go first so that everything queued after them
  // already sees the live registrars.
  module.enqueue_config(lifecycle.capture_block());
  module.enqueue_run(lifecycle.capture_block());
  module.enqueue_config(lazy::channel_block(&config));

  let container_bindings = BindingSet::new();
  let location = SourceLocation::container();
  for name in &config.container_exports {
    let descriptor = LazyDescriptor::new(name.as_str(), tables::resolution_phase(name), lifecycle.clone());
    container_bindings.install_lazy(&location, descriptor)?;
  }

  let interop = Rc::new(Interop {
    config,
    module: module.clone(),
    lifecycle,
    exporter: RefCell::new(None),
    units: RefCell::new(HashMap::new()),
    container_bindings,
  });

  container.replace_module_resolver(Rc::new(SingletonModules::new(module.clone())));
  container.set_bootstrap_hook(interop.clone());
  let hooks: Rc<dyn ModuleHooks> = interop.clone();
  module.set_hooks(Rc::downgrade(&hooks));
  container.insert_extension(interop.clone());

  for provider in &interop.config.default_providers {
    module.register(provider.kind()?, &provider.name, Definition::value(provider.value.clone()))?;
  }

  info!(
    module = %interop.config.module_name,
    lazy_providers = ?interop.config.lazy_providers,
    "interop engine installed"
  );
  Ok(interop)
}

/// Routes the singleton module's subsequent registrations into `bindings`
/// as well as into the container.
pub fn export_providers(
  container: &Container,
  bindings: &BindingSet,
  directory: impl AsRef<Path>,
  file: impl AsRef<Path>,
) -> Result<()> {
  Interop::installed(container)?.install_exporter(bindings.clone(), SourceLocation::new(directory, file))
}

/// Makes the resolved entries of an export-declaring unit injectable.
pub fn publish_exports(
  container: &Container,
  bindings: &BindingSet,
  directory: impl AsRef<Path>,
  file: impl AsRef<Path>,
) -> Result<()> {
  Interop::installed(container)?.publish_bindings(bindings, SourceLocation::new(directory, file))
}

impl Interop {
  /// The engine installed on `container`.
  pub fn installed(container: &Container) -> Result<Rc<Interop>> {
    container.extension::<Interop>().ok_or(Error::NotInstalled)
  }

  /// The configuration the engine was installed with.
  pub fn config(&self) -> &InteropConfig {
    &self.config
  }

  /// The singleton module every module request resolves to.
  pub fn module(&self) -> Rc<Module> {
    self.module.clone()
  }

  /// Which side of the bootstrap the engine is on.
  pub fn stage(&self) -> Stage {
    self.lifecycle.stage()
  }

  /// Whether the engine has seen the bootstrap complete.
  pub fn is_bootstrapped(&self) -> bool {
    self.stage() == Stage::PostBootstrap
  }

  /// Lazy bindings for the container's own services (`$http`, `$provide`,
  /// ...).
  pub fn container_bindings(&self) -> BindingSet {
    self.container_bindings.clone()
  }

  /// Registers a directive from its dashed tag name, e.g. `my-tag-name`
  /// becomes the `myTagName` directive.
  pub fn register_directive<T: Any>(
    &self,
    tag: &str,
    factory: impl Fn(&Injector) -> fibre_injector::Result<T> + 'static,
  ) -> Result<()> {
    let name = tables::directive_name(tag);
    debug!(tag, name = %name, "registering directive");
    self.module.directive(&name, factory)?;
    Ok(())
  }

  /// Registers a `value` provider without exporting it anywhere.
  pub fn provide_value<T: Any>(&self, name: &str, value: T) -> Result<()> {
    let registration = Registration::new(Kind::Value, name, Definition::value(value))?;
    self.lifecycle.registrar().register(&self.module, registration)?;
    Ok(())
  }

  /// Runs `f` against the live run-time injector.
  pub fn inject<R>(&self, f: impl FnOnce(&Injector) -> Result<R>) -> Result<R> {
    let injector = self
      .lifecycle
      .resolver(Phase::Run)
      .ok_or_else(|| Error::NotBootstrapped {
        name: fibre_injector::services::INJECTOR.to_owned(),
      })?;
    f(&injector)
  }
}

impl BootstrapHook for Interop {
  fn bootstrap(&self, container: &Container, modules: &[&str]) -> fibre_injector::Result<()> {
    let monolith = [self.config.module_name.as_str()];
    let roots = if modules.is_empty() { &monolith[..] } else { modules };
    self.lifecycle.transition(container, roots, || self.reanchor_exporter())
  }
}

impl std::fmt::Debug for Interop {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Interop")
      .field("module", &self.module.name())
      .field("stage", &self.stage())
      .field("units", &self.units.borrow().len())
      .finish()
  }
}
