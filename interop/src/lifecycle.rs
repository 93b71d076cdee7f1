//! The phase transition controller.
//!
//! Before bootstrap, registrations and blocks are queued on the singleton
//! module like any other module's. Once the container hands out its config
//! injector, registrations go straight to the live registrars instead, and
//! after bootstrap completes config and run blocks are invoked on the spot.
//! Code written for module-initialization time therefore behaves the same on
//! either side of the bootstrap.

use fibre_injector::{Block, Container, Injector, Module, Phase, Registration, RegistrarService};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

use crate::tables;

/// Which side of the single bootstrap event the engine is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  PreBootstrap,
  PostBootstrap,
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
  stage: Cell<Stage>,
  started: Cell<bool>,
  config: RefCell<Option<Injector>>,
  run: RefCell<Option<Injector>>,
}

impl Lifecycle {
  pub(crate) fn new() -> Rc<Self> {
    Rc::new(Self {
      stage: Cell::new(Stage::PreBootstrap),
      started: Cell::new(false),
      config: RefCell::new(None),
      run: RefCell::new(None),
    })
  }

  pub(crate) fn stage(&self) -> Stage {
    self.stage.get()
  }

  /// A block that records the injector it is invoked with. Queued on the
  /// singleton module as both a config and a run block.
  pub(crate) fn capture_block(self: &Rc<Self>) -> Block {
    let lifecycle = self.clone();
    Rc::new(move |injector: &Injector| -> fibre_injector::Result<()> {
      trace!(phase = %injector.phase(), "captured live injector");
      let slot = match injector.phase() {
        Phase::Config => &lifecycle.config,
        Phase::Run => &lifecycle.run,
      };
      *slot.borrow_mut() = Some(injector.clone());
      Ok(())
    })
  }

  /// The live injector for `phase`, once the container has produced it.
  /// Injectors are only ever captured by a running bootstrap.
  pub(crate) fn resolver(&self, phase: Phase) -> Option<Injector> {
    match phase {
      Phase::Config => self.config.borrow().clone(),
      Phase::Run => self.run.borrow().clone(),
    }
  }

  /// Chooses how registrations and blocks are handled right now.
  pub(crate) fn registrar(&self) -> Registrar {
    match self.config.borrow().clone() {
      None => Registrar::PreBootstrap,
      Some(config) => Registrar::PostBootstrap {
        config,
        run: self.run.borrow().clone(),
      },
    }
  }

  /// Runs the real bootstrap at most once, then flips to
  /// [`Stage::PostBootstrap`] and calls `continuation`.
  ///
  /// Later calls are ignored. A failing bootstrap propagates its error and
  /// leaves the engine started, with no way back. If the container was
  /// bootstrapped behind the engine's back, only the switch to
  /// [`Stage::PostBootstrap`] happens.
  pub(crate) fn transition(
    &self,
    container: &Container,
    modules: &[&str],
    continuation: impl FnOnce(),
  ) -> fibre_injector::Result<()> {
    if self.started.replace(true) {
      debug!("container already bootstrapped; ignoring bootstrap call");
      return Ok(());
    }
    if container.is_bootstrapped() {
      warn!("container was bootstrapped without the interop engine; catching up");
    } else {
      info!(?modules, "bootstrapping");
      container.bootstrap_now(modules)?;
    }
    self.stage.set(Stage::PostBootstrap);
    continuation();
    info!("bootstrap complete; registrations now take effect immediately");
    Ok(())
  }
}

/// Registration strategy for the singleton module.
pub(crate) enum Registrar {
  /// Queue on the module, applied by the container at bootstrap.
  PreBootstrap,
  /// Talk to the container's live registrars and injectors directly.
  PostBootstrap {
    config: Injector,
    run: Option<Injector>,
  },
}

impl Registrar {
  pub(crate) fn register(
    &self,
    module: &Module,
    registration: Registration,
  ) -> fibre_injector::Result<()> {
    match self {
      Registrar::PreBootstrap => {
        trace!(kind = %registration.kind(), name = registration.name(), "queued registration");
        module.enqueue(registration);
        Ok(())
      }
      Registrar::PostBootstrap { config, .. } => {
        let registrar = config.get::<RegistrarService>(tables::live_registrar(registration.kind()))?;
        registrar.register(registration)
      }
    }
  }

  pub(crate) fn config(&self, module: &Module, block: Block) -> fibre_injector::Result<()> {
    match self {
      Registrar::PreBootstrap => {
        module.enqueue_config(block);
        Ok(())
      }
      Registrar::PostBootstrap { config, .. } => block(config),
    }
  }

  pub(crate) fn run(&self, module: &Module, block: Block) -> fibre_injector::Result<()> {
    match self {
      Registrar::PostBootstrap { run: Some(run), .. } => block(run),
      // No run injector yet: the container drains run blocks after the
      // config phase, so queueing still gets this one executed.
      _ => {
        module.enqueue_run(block);
        Ok(())
      }
    }
  }
}
