//! Public macros for ergonomic service resolution.

/// Resolves a service from an injector, propagating failure with `?`.
///
/// Intended for use inside factories and blocks, which all return
/// `fibre_injector::Result`.
///
/// # Examples
///
/// ```
/// use fibre_injector::{resolve, Container};
///
/// let container = Container::new();
/// let module = container.module("app", Some(&[])).unwrap();
/// module.value("greeting", String::from("hello")).unwrap();
/// module
///   .factory("shout", |injector| {
///     let greeting = resolve!(injector, String, "greeting");
///     Ok(greeting.to_uppercase())
///   })
///   .unwrap();
///
/// container.bootstrap(&["app"]).unwrap();
/// let run = container.injector(fibre_injector::Phase::Run).unwrap();
/// assert_eq!(*run.get::<String>("shout").unwrap(), "HELLO");
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for a typed service: resolve!(injector, MyService, "name")
  ($injector:expr, $type:ty, $name:expr) => {
    $injector.get::<$type>($name)?
  };

  // Arm for a type-erased value: resolve!(injector, "name")
  ($injector:expr, $name:expr) => {
    $injector.get_value($name)?
  };
}
