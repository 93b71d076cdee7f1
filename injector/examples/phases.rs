use fibre_injector::{resolve, Container, Phase, ProviderInstance, RegistrarService};
use std::cell::RefCell;
use std::rc::Rc;

fn main() -> fibre_injector::Result<()> {
  let container = Container::new();

  // --- Registration ---
  // Nothing registered on a module is visible until bootstrap.
  let core = container.module("core", Some(&[]))?;
  core.provider("greeter", |_| {
    let salutation = Rc::new(RefCell::new(String::from("Hello")));
    let for_get = salutation.clone();
    Ok(ProviderInstance::new(salutation, move |_| {
      Ok(format!("{}, world", for_get.borrow()))
    }))
  })?;

  let app = container.module("app", Some(&["core"]))?;
  app
    .config(|config| {
      // Config blocks see provider handles, never instances.
      *config.get::<RefCell<String>>("greeterProvider")?.borrow_mut() = String::from("Howdy");
      Ok(())
    })?
    .run(|run| {
      let greeting = resolve!(run, String, "greeter");
      println!("run block says: {}", greeting);
      Ok(())
    })?;

  // --- Bootstrap ---
  container.bootstrap(&["app"])?;

  // Module registration no longer reaches the registry; the live
  // registrar does.
  let config = container.injector(Phase::Config).expect("bootstrapped");
  let run = container.injector(Phase::Run).expect("bootstrapped");
  let provide = config.get::<RegistrarService>("$provide")?;
  provide.register(fibre_injector::Registration::new(
    fibre_injector::Kind::Value,
    "late",
    fibre_injector::Definition::value("registered after bootstrap"),
  )?)?;

  println!("{}", run.get::<&str>("late")?);
  Ok(())
}
