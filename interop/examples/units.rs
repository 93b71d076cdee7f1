use fibre_injector::{value, Container, Invocable};
use fibre_interop::{export_providers, install, publish_exports, BindingSet, SourceLocation};

fn main() -> fibre_interop::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

  let container = Container::new();
  let interop = install(&container)?;

  // --- A provider-registering unit ---
  // The module name and dependency list no longer matter.
  let greetings = BindingSet::new();
  export_providers(&container, &greetings, "src/greetings", "src/greetings/mod.rs")?;
  container
    .module("greetings", Some(&["core", "i18n"]))?
    .value("salutation", "Hello")?
    .factory("greeter", |run| {
      let salutation = run.get::<&str>("salutation")?;
      Ok(format!("{}, world", salutation))
    })?;

  // --- An export-declaring unit ---
  let settings = BindingSet::new();
  let location = SourceLocation::new("src/settings", "src/settings/mod.rs");
  settings.insert_value(&location, "retries", value(3u8))?;
  publish_exports(&container, &settings, "src/settings", "src/settings/mod.rs")?;

  // Imports fail until the one bootstrap has happened.
  if let Err(err) = greetings.get("greeter") {
    println!("before bootstrap: {}", err);
  }

  container.bootstrap(&["app"])?;
  println!("greeter = {}", greetings.get_as::<String>("greeter")?);
  println!(
    "retries = {}",
    interop.inject(|run| Ok(*run.get::<u8>("retries")?))?
  );

  // --- A unit loaded after bootstrap ---
  // `$exceptionHandler` cannot be replaced any more, but registering it
  // feeds the override channel instead.
  let reporting = BindingSet::new();
  export_providers(&container, &reporting, "src/reporting", "src/reporting/mod.rs")?;
  container.module("reporting", None)?.factory("$exceptionHandler", |_| {
    Ok(Invocable::new(|args| {
      let message = args
        .first()
        .and_then(|arg| arg.downcast_ref::<String>())
        .cloned()
        .unwrap_or_default();
      println!("reported: {}", message);
      Ok(value(()))
    }))
  })?;

  let handler = interop
    .container_bindings()
    .get_as::<Invocable>("$exceptionHandler")?;
  handler.call(&[value("something went wrong".to_string())])?;
  Ok(())
}
