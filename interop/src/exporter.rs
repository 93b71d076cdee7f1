//! The provider exporter: mirrors registrations on the singleton module into
//! the binding-set of the source unit that made them.

use crate::bindings::{BindingSet, LazyDescriptor};
use crate::engine::Interop;
use crate::error::{Error, Result};
use crate::tables;
use fibre_injector::{Definition, Kind, Module, Phase, Registration, PROVIDER_SUFFIX};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Where a source unit lives. Used to name the unit in errors and to track
/// which registration style it uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
  directory: PathBuf,
  file: PathBuf,
}

impl SourceLocation {
  pub fn new(directory: impl AsRef<Path>, file: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      file: file.as_ref().to_path_buf(),
    }
  }

  /// The pseudo-unit owning the container-wide binding-set.
  pub(crate) fn container() -> Self {
    Self::new("", "<container>")
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn file(&self) -> &Path {
    &self.file
  }
}

impl fmt::Display for SourceLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.file.display())
  }
}

/// The two mutually exclusive ways a source unit talks to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitStyle {
  /// Registers providers on the module; its binding-set is filled by us.
  ProviderRegistering,
  /// Declares its exports itself; they are published into the container.
  ExportDeclaring,
}

/// The binding-set currently receiving exports.
#[derive(Debug, Clone)]
pub(crate) struct ExportTarget {
  bindings: BindingSet,
  location: SourceLocation,
}

impl Interop {
  /// Directs exports of subsequent registrations on the singleton module
  /// into `bindings`, until the next call or the bootstrap.
  pub fn install_exporter(&self, bindings: BindingSet, location: SourceLocation) -> Result<()> {
    self.mark_unit(&location, UnitStyle::ProviderRegistering)?;
    debug!(unit = %location, "exporter installed");
    *self.exporter.borrow_mut() = Some(ExportTarget { bindings, location });
    Ok(())
  }

  /// Registers every resolved entry of an export-declaring unit as a
  /// `value` provider, so that container code can inject it.
  pub fn publish_bindings(&self, bindings: &BindingSet, location: SourceLocation) -> Result<()> {
    self.mark_unit(&location, UnitStyle::ExportDeclaring)?;
    let registrar = self.lifecycle.registrar();
    for (name, value) in bindings.resolved_entries() {
      let name = self.registered_name(&name);
      trace!(unit = %location, name = %name, "publishing export");
      let registration = Registration::new(Kind::Value, name, Definition::Value(value))?;
      registrar.register(&self.module, registration)?;
    }
    debug!(unit = %location, "exports published");
    Ok(())
  }

  /// Drops the active export target. Runs after bootstrap, once the
  /// registration surface has switched to live registrars.
  pub(crate) fn reanchor_exporter(&self) {
    if let Some(target) = self.exporter.borrow_mut().take() {
      debug!(unit = %target.location, "exporter released at bootstrap");
    }
  }

  /// Registers on the container and, if an exporter is installed and the
  /// kind is exportable, installs lazy bindings for the registered names.
  pub(crate) fn register_and_export(&self, module: &Module, registration: Registration) -> Result<()> {
    let registrar = self.lifecycle.registrar();
    let target = self.exporter.borrow().clone();
    let target = match target {
      Some(target) if tables::is_exported(registration.kind()) => target,
      _ => return Ok(registrar.register(module, registration)?),
    };

    let kind = registration.kind();
    let name = self.registered_name(registration.name());
    let mut exports = vec![(name.clone(), tables::resolution_phase(&name))];
    if kind == Kind::Provider {
      exports.push((format!("{}{}", name, PROVIDER_SUFFIX), Phase::Config));
    }

    // Nothing is registered if any of the names would collide.
    if let Some((duplicate, _)) = exports.iter().find(|(export, _)| target.bindings.contains(export)) {
      return Err(Error::DuplicateExport {
        location: target.location.clone(),
        name: duplicate.clone(),
      });
    }

    let registration = if name == registration.name() {
      registration
    } else {
      registration.renamed(name.as_str())
    };
    registrar.register(module, registration)?;

    for (export, phase) in exports {
      debug!(unit = %target.location, %kind, name = %export, %phase, "export installed");
      let descriptor = LazyDescriptor::new(export, phase, self.lifecycle.clone());
      target.bindings.install_lazy(&target.location, descriptor)?;
    }
    Ok(())
  }

  /// Overridable providers are registered under their suffixed name so that
  /// they feed the override channel instead of replacing it.
  fn registered_name(&self, name: &str) -> String {
    if self.config.is_lazy(name) {
      self.config.lazy_name(name)
    } else {
      name.to_owned()
    }
  }

  fn mark_unit(&self, location: &SourceLocation, style: UnitStyle) -> Result<()> {
    let mut units = self.units.borrow_mut();
    let recorded = *units.entry(location.clone()).or_insert(style);
    if recorded != style {
      return Err(Error::MixedRegistrationStyle {
        location: location.clone(),
      });
    }
    Ok(())
  }
}
