//! Built-in services every container exposes.

use crate::core::{describe, Invocable, Value};
use crate::definition::Registration;
use crate::error::{Error, Result};
use crate::injector::Injector;
use crate::kind::Kind;
use crate::registry::Registry;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

pub const INJECTOR: &str = "$injector";
pub const CONTROLLER: &str = "$controller";
pub const LOG: &str = "$log";
pub const EXCEPTION_HANDLER: &str = "$exceptionHandler";

pub const PROVIDE: &str = "$provide";
pub const CONTROLLER_PROVIDER: &str = "$controllerProvider";
pub const COMPILE_PROVIDER: &str = "$compileProvider";
pub const FILTER_PROVIDER: &str = "$filterProvider";
pub const ANIMATE_PROVIDER: &str = "$animateProvider";

/// The config-time registrar services and the kinds each one accepts.
pub const REGISTRAR_SERVICES: [(&str, &[Kind]); 5] = [
  (
    PROVIDE,
    &[
      Kind::Provider,
      Kind::Factory,
      Kind::Service,
      Kind::Constant,
      Kind::Value,
      Kind::Decorator,
    ],
  ),
  (CONTROLLER_PROVIDER, &[Kind::Controller]),
  (COMPILE_PROVIDER, &[Kind::Directive]),
  (FILTER_PROVIDER, &[Kind::Filter]),
  (ANIMATE_PROVIDER, &[Kind::Animation]),
];

/// A live registrar, injectable at config time (`$provide`,
/// `$compileProvider`, ...). Unlike module registration it takes effect
/// immediately, so it keeps working once the container is bootstrapped.
pub struct RegistrarService {
  name: &'static str,
  accepts: &'static [Kind],
  registry: Rc<Registry>,
}

impl RegistrarService {
  pub(crate) fn lookup(name: &str, registry: &Rc<Registry>) -> Option<Self> {
    REGISTRAR_SERVICES
      .iter()
      .find(|&&(service, _)| service == name)
      .map(|&(service, accepts)| Self {
        name: service,
        accepts,
        registry: registry.clone(),
      })
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn register(&self, registration: Registration) -> Result<()> {
    if !self.accepts.contains(&registration.kind()) {
      return Err(Error::UnsupportedKind {
        registrar: self.name.to_owned(),
        kind: registration.kind(),
      });
    }
    debug!(
      registrar = self.name,
      kind = %registration.kind(),
      name = registration.name(),
      "live registration"
    );
    self.registry.apply(registration)
  }
}

/// `$controller`: instantiates a fresh controller on every call.
pub struct ControllerService {
  injector: Injector,
}

impl ControllerService {
  pub(crate) fn new(injector: Injector) -> Self {
    Self { injector }
  }

  pub fn instantiate(&self, name: &str) -> Result<Value> {
    let factory = self
      .injector
      .registry()
      .controller(name)
      .ok_or_else(|| Error::UnknownController(name.to_owned()))?;
    factory(&self.injector)
  }
}

/// `$log`, backed by `tracing`.
pub struct Log;

impl Log {
  pub fn debug(&self, message: &str) {
    debug!(target: "fibre_injector::log", "{}", message);
  }

  pub fn info(&self, message: &str) {
    info!(target: "fibre_injector::log", "{}", message);
  }

  pub fn warn(&self, message: &str) {
    warn!(target: "fibre_injector::log", "{}", message);
  }

  pub fn error(&self, message: &str) {
    error!(target: "fibre_injector::log", "{}", message);
  }
}

/// The container's own `$exceptionHandler`: report and carry on.
pub(crate) fn default_exception_handler() -> Invocable {
  Invocable::new(|args| {
    match args.first() {
      Some(exception) => error!(exception = %describe(exception), "unhandled exception"),
      None => error!("unhandled exception"),
    }
    Ok(Rc::new(()))
  })
}
