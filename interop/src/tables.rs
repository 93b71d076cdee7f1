//! Static name and registrar tables.

use fibre_injector::services::{
  ANIMATE_PROVIDER, COMPILE_PROVIDER, CONTROLLER_PROVIDER, FILTER_PROVIDER, PROVIDE,
};
use fibre_injector::{value, Error as ContainerError, Invocable, Kind, Phase, PROVIDER_SUFFIX};

/// Name of the singleton module every `module()` call resolves to.
pub const MONOLITH_MODULE: &str = "app";

/// Suffix under which overrides of lazy providers are registered.
pub const LAZY_SUFFIX: &str = "Lazy";

/// Kinds whose registrations are also exported into a binding-set.
pub const EXPORTED_KINDS: [Kind; 5] = [
  Kind::Factory,
  Kind::Service,
  Kind::Constant,
  Kind::Provider,
  Kind::Value,
];

/// Container services importable from the container-wide binding-set. There
/// is no way to enumerate these from the container, hence the list.
pub const CONTAINER_EXPORTS: &[&str] = &[
  "$window",
  "$document",
  "$provide",
  "$rootElement",
  "$compileProvider",
  "$rootScope",
  "$compile",
  "$injector",
  "$locationProvider",
  "$animateProvider",
  "$filterProvider",
  "$controllerProvider",
  "$http",
  "$log",
  "$location",
  "$anchorScroll",
  "$animate",
  "$q",
  "$sniffer",
  "$cacheFactory",
  "$exceptionHandler",
  "$interpolate",
  "$templateRequest",
  "$parse",
  "$controller",
  "$sce",
  "$httpParamSerializerJQLike",
  "$timeout",
  "$httpParamSerializer",
  "$httpBackend",
  "$templateCache",
  "$xhrFactory",
  "$browser",
  "$interval",
  "$sanitize",
  "$filter",
  "$sceDelegate",
];

/// Providers routed through the lazy-override channel, so that they can be
/// replaced after bootstrap.
pub const LAZY_PROVIDERS: &[&str] = &["$exceptionHandler", "$sanitize"];

/// Constant registered on every install, with an empty object as its value.
pub const DEFAULT_CONSTANT: &str = "uiAliasConfig";

/// The live registrar service that accepts `kind` once the config phase has
/// started.
pub fn live_registrar(kind: Kind) -> &'static str {
  match kind {
    Kind::Provider
    | Kind::Factory
    | Kind::Service
    | Kind::Constant
    | Kind::Value
    | Kind::Decorator => PROVIDE,
    Kind::Controller => CONTROLLER_PROVIDER,
    Kind::Directive => COMPILE_PROVIDER,
    Kind::Filter => FILTER_PROVIDER,
    Kind::Animation => ANIMATE_PROVIDER,
  }
}

/// Whether registrations of `kind` are mirrored into binding-sets.
pub fn is_exported(kind: Kind) -> bool {
  EXPORTED_KINDS.contains(&kind)
}

/// Which injector a binding named `name` resolves against: `$provide` and
/// provider handles live at config time, everything else at run time.
pub fn resolution_phase(name: &str) -> Phase {
  if name == PROVIDE || name.ends_with(PROVIDER_SUFFIX) {
    Phase::Config
  } else {
    Phase::Run
  }
}

/// The built-in fallback for a lazy provider with no override registered.
pub fn builtin_lazy_default(name: &str) -> Option<Invocable> {
  match name {
    // Rethrow whatever was handed in.
    "$exceptionHandler" => Some(Invocable::new(|args| {
      Err(ContainerError::Thrown(
        args.first().cloned().unwrap_or_else(|| value(())),
      ))
    })),
    _ => None,
  }
}

/// `my-tag-name` -> `myTagName`.
pub fn directive_name(tag: &str) -> String {
  let mut name = String::with_capacity(tag.len());
  let mut chars = tag.chars().peekable();
  while let Some(c) = chars.next() {
    match (c, chars.peek().copied()) {
      ('-', Some(next)) if next.is_ascii_lowercase() => {
        name.push(next.to_ascii_uppercase());
        chars.next();
      }
      _ => name.push(c),
    }
  }
  name
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn provider_handles_resolve_at_config_time() {
    assert_eq!(resolution_phase("$provide"), Phase::Config);
    assert_eq!(resolution_phase("$compileProvider"), Phase::Config);
    assert_eq!(resolution_phase("widgetProvider"), Phase::Config);
    assert_eq!(resolution_phase("$injector"), Phase::Run);
    assert_eq!(resolution_phase("widget"), Phase::Run);
  }

  #[test]
  fn every_kind_has_a_live_registrar() {
    for kind in Kind::ALL {
      assert!(live_registrar(kind).starts_with('$'));
    }
    assert_eq!(live_registrar(Kind::Filter), "$filterProvider");
  }

  #[test]
  fn dashed_tags_become_camel_case() {
    assert_eq!(directive_name("my-tag-name"), "myTagName");
    assert_eq!(directive_name("plain"), "plain");
    assert_eq!(directive_name("trailing-"), "trailing-");
    assert_eq!(directive_name("x-9"), "x-9");
  }

  #[test]
  fn only_the_exception_handler_has_a_default() {
    assert!(builtin_lazy_default("$exceptionHandler").is_some());
    assert!(builtin_lazy_default("$sanitize").is_none());
  }

  #[test]
  fn container_exports_are_unique() {
    let mut names = CONTAINER_EXPORTS.to_vec();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), CONTAINER_EXPORTS.len());
    assert_eq!(CONTAINER_EXPORTS.len(), 37);
  }
}
