//! # Fibre Interop
//!
//! Makes a phase-frozen [`fibre_injector::Container`] usable from code that
//! expects independently importable bindings, before and after the
//! container's one-time bootstrap.
//!
//! ## Core Concepts
//!
//! - **Singleton module**: once installed, every `Container::module` call
//!   returns the same module, whatever name or dependency list is given.
//! - **Phase transparency**: before bootstrap, registrations and blocks are
//!   queued; after it, they go straight to the live registrars and
//!   injectors. Calling code does not need to know which side it is on.
//! - **Binding-sets**: a source unit hands its [`BindingSet`] to
//!   [`export_providers`]; from then on each provider it registers also
//!   appears there as a lazy binding, resolved on first access after
//!   bootstrap and memoized.
//! - **Lazy overrides**: `$exceptionHandler` and `$sanitize` are registered
//!   as indirections that consult `<name>Lazy` on every call, so they can be
//!   replaced after bootstrap.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_injector::Container;
//! use fibre_interop::{export_providers, install, BindingSet};
//!
//! let container = Container::new();
//! install(&container).unwrap();
//!
//! let widgets = BindingSet::new();
//! export_providers(&container, &widgets, "src/widgets", "src/widgets/mod.rs").unwrap();
//! container
//!   .module("widgets", Some(&[]))
//!   .unwrap()
//!   .factory("widget", |_| Ok("ok"))
//!   .unwrap();
//!
//! container.bootstrap(&["app"]).unwrap();
//! assert_eq!(*widgets.get_as::<&str>("widget").unwrap(), "ok");
//! ```

mod bindings;
mod config;
mod engine;
mod error;
mod exporter;
mod facade;
mod lazy;
mod lifecycle;
pub mod tables;

pub use bindings::BindingSet;
pub use config::{DefaultProvider, InteropConfig};
pub use engine::{export_providers, install, install_with_config, publish_exports, Interop};
pub use error::{Error, Result};
pub use exporter::SourceLocation;
pub use lifecycle::Stage;
