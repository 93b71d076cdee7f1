//! The lazy-override channel.
//!
//! The container never lets a service be replaced once it has been
//! instantiated. For the names listed as lazy providers, the engine
//! registers a thin indirection instead: every call re-resolves
//! `<name><suffix>` and falls back to a built-in default when nothing has
//! been registered under it.

use crate::config::InteropConfig;
use crate::error::Error;
use crate::tables;
use fibre_injector::services::PROVIDE;
use fibre_injector::{
  Block, Definition, Error as ContainerError, Injector, Invocable, Kind, Registration,
  RegistrarService, Result, Value,
};
use std::rc::Rc;
use tracing::{debug, trace};

/// The config block that puts the indirections in place. It registers
/// through the live `$provide`, after every queued registration, so the
/// indirection wins over any same-named provider registered before it.
pub(crate) fn channel_block(config: &InteropConfig) -> Block {
  let providers: Vec<(String, String)> = config
    .lazy_providers
    .iter()
    .map(|name| (name.clone(), config.lazy_name(name)))
    .collect();
  let suffix = config.lazy_suffix.clone();

  Rc::new(move |injector: &Injector| -> Result<()> {
    let provide = injector.get::<RegistrarService>(PROVIDE)?;
    for (name, lazy_name) in &providers {
      debug!(name = %name, overridden_by = %lazy_name, "registering lazy provider");
      let definition = indirection(name.clone(), lazy_name.clone(), suffix.clone());
      provide.register(Registration::new(Kind::Factory, name.as_str(), definition)?)?;
    }
    Ok(())
  })
}

fn indirection(name: String, lazy_name: String, suffix: String) -> Definition {
  Definition::factory(move |injector: &Injector| {
    let injector = injector.clone();
    let name = name.clone();
    let lazy_name = lazy_name.clone();
    let suffix = suffix.clone();
    let default = tables::builtin_lazy_default(&name);
    Ok(Invocable::new(move |args: &[Value]| {
      dispatch(&injector, &name, &lazy_name, &suffix, default.as_ref(), args)
    }))
  })
}

/// Calls the override if one is registered, else the default.
fn dispatch(
  injector: &Injector,
  name: &str,
  lazy_name: &str,
  suffix: &str,
  default: Option<&Invocable>,
  args: &[Value],
) -> Result<Value> {
  match injector.get::<Invocable>(lazy_name) {
    Ok(handler) => {
      trace!(name, "dispatching to override");
      handler.call(args)
    }
    Err(ContainerError::UnknownBinding { name: missing, .. }) if missing == lazy_name => match default {
      Some(default) => {
        trace!(name, "no override registered, using built-in default");
        default.call(args)
      }
      None => Err(
        Error::MissingLazyProvider {
          name: name.to_owned(),
          suffix: suffix.to_owned(),
        }
        .into_container(),
      ),
    },
    Err(other) => Err(other),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fibre_injector::{value, Container, Phase};

  fn bootstrapped(config: &InteropConfig, setup: impl FnOnce(&fibre_injector::Module)) -> Injector {
    let container = Container::new();
    let module = container.module("app", Some(&[])).unwrap();
    module.enqueue_config(channel_block(config));
    setup(&module);
    container.bootstrap(&["app"]).unwrap();
    container.injector(Phase::Run).unwrap()
  }

  #[test]
  fn indirection_replaces_builtin_exception_handler() {
    let run = bootstrapped(&InteropConfig::default(), |_| {});
    let handler = run.get::<Invocable>("$exceptionHandler").unwrap();

    // The container's own handler swallows; the built-in default rethrows.
    let err = handler.call(&[value("boom".to_string())]).unwrap_err();
    let thrown = err.thrown().unwrap();
    assert_eq!(thrown.downcast_ref::<String>().unwrap(), "boom");
  }

  #[test]
  fn override_is_looked_up_on_every_call() {
    let run = bootstrapped(&InteropConfig::default(), |module| {
      module
        .factory("$sanitizeLazy", |_| {
          Ok(Invocable::new(|args| Ok(args[0].clone())))
        })
        .unwrap();
    });
    let sanitize = run.get::<Invocable>("$sanitize").unwrap();
    let out = sanitize.call(&[value(7u8)]).unwrap();
    assert_eq!(*out.downcast::<u8>().unwrap(), 7);
  }

  #[test]
  fn missing_override_without_default_is_an_engine_error() {
    let run = bootstrapped(&InteropConfig::default(), |_| {});
    let sanitize = run.get::<Invocable>("$sanitize").unwrap();
    let err = Error::from(sanitize.call(&[]).unwrap_err());
    assert!(matches!(
      err,
      Error::MissingLazyProvider { ref name, .. } if name == "$sanitize"
    ));
  }

  #[test]
  fn failures_inside_the_override_are_not_masked() {
    let run = bootstrapped(&InteropConfig::default(), |module| {
      module
        .factory("$exceptionHandlerLazy", |injector| {
          // Depends on something that does not exist.
          injector.get::<u32>("missingDependency")?;
          Ok(Invocable::new(|_| Ok(value(()))))
        })
        .unwrap();
    });
    let handler = run.get::<Invocable>("$exceptionHandler").unwrap();
    let err = handler.call(&[]).unwrap_err();
    assert!(matches!(
      err,
      ContainerError::UnknownBinding { ref name, .. } if name == "missingDependency"
    ));
  }
}
