//! # Fibre Injector
//!
//! A single-threaded dependency injection container built around named
//! modules and a one-time bootstrap.
//!
//! ## Core Concepts
//!
//! - **Module**: a named bag of provider registrations, config blocks and
//!   run blocks. Nothing registered on a module takes effect until bootstrap.
//! - **Bootstrap**: happens once. Module queues are applied dependencies-first,
//!   config blocks run against the config injector, then run blocks run
//!   against the run injector.
//! - **Injectors**: the config injector sees `<name>Provider` handles,
//!   constants and live registrars (`$provide`, ...); the run injector sees
//!   service instances, each created once and cached.
//! - **Seams**: [`ModuleResolver`], [`BootstrapHook`] and [`ModuleHooks`]
//!   let an embedding layer take over module creation, bootstrap and
//!   registration without patching the container.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_injector::{Container, Phase};
//!
//! let container = Container::new();
//! let module = container.module("app", Some(&[])).unwrap();
//! module.factory("answer", |_| Ok(42u32)).unwrap();
//!
//! container.bootstrap(&["app"]).unwrap();
//!
//! let run = container.injector(Phase::Run).unwrap();
//! assert_eq!(*run.get::<u32>("answer").unwrap(), 42);
//! ```

mod container;
mod core;
mod definition;
mod error;
mod injector;
mod kind;
mod macros;
mod module;
mod registry;
pub mod services;

pub use crate::core::{value, Block, Invocable, ProviderInstance, Value};
pub use container::{BootstrapHook, Container, ModuleResolver};
pub use definition::{Definition, Registration};
pub use error::{Error, Result};
pub use injector::{Injector, Phase, PROVIDER_SUFFIX};
pub use kind::Kind;
pub use module::{Module, ModuleHooks};
pub use services::{ControllerService, Log, RegistrarService};
