//! The singleton facade: every module request resolves to the one shared
//! module, and that module's registration surface is routed through the
//! engine.

use crate::engine::Interop;
use fibre_injector::{Block, Container, Module, ModuleHooks, ModuleResolver, Registration, Result};
use std::rc::Rc;
use tracing::trace;

pub(crate) struct SingletonModules {
  module: Rc<Module>,
}

impl SingletonModules {
  pub(crate) fn new(module: Rc<Module>) -> Self {
    Self { module }
  }
}

impl ModuleResolver for SingletonModules {
  fn resolve(&self, _container: &Container, name: &str, requires: Option<&[&str]>) -> Result<Rc<Module>> {
    trace!(requested = name, ?requires, module = self.module.name(), "module request collapsed");
    Ok(self.module.clone())
  }
}

impl ModuleHooks for Interop {
  fn register(&self, module: &Module, registration: Registration) -> Result<()> {
    self
      .register_and_export(module, registration)
      .map_err(|err| err.into_container())
  }

  fn config(&self, module: &Module, block: Block) -> Result<()> {
    self.lifecycle.registrar().config(module, block)
  }

  fn run(&self, module: &Module, block: Block) -> Result<()> {
    self.lifecycle.registrar().run(module, block)
  }
}
