use fibre_injector::{value, Container, Invocable, Value};
use fibre_interop::{export_providers, install, BindingSet, Error, Interop};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

// --- Test Fixtures ---

fn message(value: &Value) -> String {
  value.downcast_ref::<String>().cloned().unwrap_or_default()
}

fn recording_handler(log: Rc<RefCell<Vec<String>>>) -> Invocable {
  Invocable::new(move |args| {
    log.borrow_mut().push(args.first().map(message).unwrap_or_default());
    Ok(value(()))
  })
}

fn exception_handler(interop: &Interop) -> Invocable {
  interop
    .inject(|run| Ok(run.get::<Invocable>("$exceptionHandler")?))
    .map(|handler| (*handler).clone())
    .unwrap()
}

// --- Override Channel ---

#[test]
fn test_exception_handler_override_registered_after_bootstrap() -> fibre_interop::Result<()> {
  let container = Container::new();
  let interop = install(&container)?;
  container.bootstrap(&["app"])?;

  // No override yet: the built-in default rethrows.
  let handler = exception_handler(&interop);
  let err = handler.call(&[value("first".to_string())]).unwrap_err();
  assert_eq!(err.thrown().map(message), Some("first".to_string()));

  // A unit loaded after bootstrap registers its own handler.
  let seen = Rc::new(RefCell::new(Vec::new()));
  let unit = BindingSet::new();
  export_providers(&container, &unit, "src/errors", "src/errors/handler.rs")?;
  let sink = seen.clone();
  container
    .module("errors", None)?
    .factory("$exceptionHandler", move |_| Ok(recording_handler(sink.clone())))?;

  // The handler resolved earlier picks it up on its next call.
  handler.call(&[value("second".to_string())])?;
  assert_eq!(*seen.borrow(), vec!["second".to_string()]);
  assert_eq!(unit.names(), vec!["$exceptionHandlerLazy"]);
  Ok(())
}

#[test]
fn test_override_registered_before_bootstrap_is_used_from_the_start() -> fibre_interop::Result<()> {
  let container = Container::new();
  let interop = install(&container)?;
  let seen = Rc::new(RefCell::new(Vec::new()));

  let unit = BindingSet::new();
  export_providers(&container, &unit, "src", "src/reporting.rs")?;
  let sink = seen.clone();
  container
    .module("reporting", None)?
    .factory("$exceptionHandler", move |_| Ok(recording_handler(sink.clone())))?;
  container.bootstrap(&["app"])?;

  exception_handler(&interop).call(&[value("early".to_string())])?;
  assert_eq!(*seen.borrow(), vec!["early".to_string()]);

  // The unit imports its own registration under the suffixed name.
  let own = unit.get_as::<Invocable>("$exceptionHandlerLazy")?;
  own.call(&[value("direct".to_string())])?;
  assert_eq!(seen.borrow().len(), 2);
  Ok(())
}

#[test]
fn test_name_without_default_fails_until_overridden() -> fibre_interop::Result<()> {
  let container = Container::new();
  let interop = install(&container)?;
  container.bootstrap(&["app"])?;

  let sanitize = interop.inject(|run| Ok(run.get::<Invocable>("$sanitize")?))?;
  let err = Error::from(sanitize.call(&[value("<b>".to_string())]).unwrap_err());
  assert!(matches!(err, Error::MissingLazyProvider { ref name, .. } if name == "$sanitize"));
  assert_eq!(
    err.to_string(),
    "Unable to find provider: $sanitize (no $sanitizeLazy registered and no built-in default)"
  );

  interop.provide_value(
    "$sanitizeLazy",
    Invocable::new(|args| Ok(value(message(&args[0]).replace('<', "&lt;")))),
  )?;
  let clean = sanitize.call(&[value("<b>".to_string())])?;
  assert_eq!(message(&clean), "&lt;b>");
  Ok(())
}

#[test]
fn test_container_handler_is_replaced_by_the_channel() -> fibre_interop::Result<()> {
  // Without the engine, the container's handler swallows errors.
  let plain = Container::new();
  plain.module("app", Some(&[]))?;
  plain.bootstrap(&["app"])?;
  let swallowing = plain
    .injector(fibre_injector::Phase::Run)
    .ok_or(Error::NotInstalled)?
    .get::<Invocable>("$exceptionHandler")?;
  assert!(swallowing.call(&[value("ignored".to_string())]).is_ok());

  // With it, the same name is the rethrowing indirection.
  let container = Container::new();
  let interop = install(&container)?;
  container.bootstrap(&["app"])?;
  assert!(exception_handler(&interop).call(&[value("raised".to_string())]).is_err());

  // Also reachable through the container-wide bindings.
  let via_bindings = interop.container_bindings().get_as::<Invocable>("$exceptionHandler")?;
  assert!(via_bindings.call(&[]).is_err());
  Ok(())
}
