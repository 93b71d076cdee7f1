use crate::definition::Definition;
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Every kind of provider a module can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
  Factory,
  Service,
  Constant,
  Provider,
  Value,
  Decorator,
  Controller,
  Directive,
  Filter,
  Animation,
}

impl Kind {
  pub const ALL: [Kind; 10] = [
    Kind::Factory,
    Kind::Service,
    Kind::Constant,
    Kind::Provider,
    Kind::Value,
    Kind::Decorator,
    Kind::Controller,
    Kind::Directive,
    Kind::Filter,
    Kind::Animation,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Kind::Factory => "factory",
      Kind::Service => "service",
      Kind::Constant => "constant",
      Kind::Provider => "provider",
      Kind::Value => "value",
      Kind::Decorator => "decorator",
      Kind::Controller => "controller",
      Kind::Directive => "directive",
      Kind::Filter => "filter",
      Kind::Animation => "animation",
    }
  }

  /// Whether `definition` is the right shape for this kind.
  pub fn accepts(self, definition: &Definition) -> bool {
    match self {
      Kind::Constant | Kind::Value => matches!(definition, Definition::Value(_)),
      Kind::Provider => matches!(definition, Definition::Provider(_)),
      Kind::Decorator => matches!(definition, Definition::Decorator(_)),
      Kind::Factory
      | Kind::Service
      | Kind::Controller
      | Kind::Directive
      | Kind::Filter
      | Kind::Animation => matches!(definition, Definition::Factory(_)),
    }
  }

  /// Suffix under which component kinds are exposed by the run injector.
  pub(crate) fn component_suffix(self) -> Option<&'static str> {
    match self {
      Kind::Directive => Some("Directive"),
      Kind::Filter => Some("Filter"),
      Kind::Animation => Some("Animation"),
      _ => None,
    }
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Kind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Kind::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| Error::UnknownKind(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_every_kind_by_name() {
    for kind in Kind::ALL {
      assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
    }
    assert!(matches!("module".parse::<Kind>(), Err(Error::UnknownKind(_))));
  }

  #[test]
  fn value_kinds_reject_factories() {
    let factory = Definition::factory(|_| Ok(1u8));
    assert!(!Kind::Constant.accepts(&factory));
    assert!(Kind::Filter.accepts(&factory));
    assert!(Kind::Value.accepts(&Definition::value(1u8)));
  }
}
