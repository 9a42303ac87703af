//! Serialization options.
//!
//! An ```Opt``` is assembled by folding a list of ```OptAtom```s over a copy of
//! the process-wide default. The default starts out as ```Opt::default()``` and
//! can be replaced with [`set_default_marshal_options`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::path::PathElem;
use crate::value::Value;

/// Where in the tree an object being sorted lives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentInfo {
  /// Path from the root to the object whose keys are compared.
  pub key_path: Vec<PathElem>,
}

/// Comparator for object keys: ```(parent, key_a, key_b, value_a, value_b)```,
/// returns ```true``` when ```key_a``` sorts before ```key_b```.
pub type LessFunc = Arc<dyn Fn(&ParentInfo, &str, &str, &Value, &Value) -> bool + Send + Sync>;

/// What to do with a NaN met during marshal.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatNaNPolicy {
  Error,
  ToFloat(f64),
  Null,
  ToString(String),
}

/// What to do with ±Inf met during marshal.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatInfPolicy {
  Error,
  /// Positive infinity becomes the value, negative infinity its negation.
  ToFloat(f64),
  Null,
  ToString { positive: String, negative: String },
}

#[derive(Clone, Default)]
pub(crate) enum KeyOrder {
  #[default]
  Default,
  Keys(Vec<String>),
  Less(LessFunc),
  SetSequence,
  Dictionary,
}

impl core::fmt::Debug for KeyOrder {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      KeyOrder::Default => f.write_str("Default"),
      KeyOrder::Keys(k) => f.debug_tuple("Keys").field(k).finish(),
      KeyOrder::Less(_) => f.write_str("Less(<fn>)"),
      KeyOrder::SetSequence => f.write_str("SetSequence"),
      KeyOrder::Dictionary => f.write_str("Dictionary"),
    }
  }
}

/// The effective configuration of one marshal (or import) call.
#[derive(Debug, Clone)]
pub struct Opt {
  pub(crate) escape_html: bool,
  pub(crate) escape_slash: bool,
  pub(crate) utf8: bool,
  /// ```(prefix, indent)``` when pretty printing.
  pub(crate) indent: Option<(String, String)>,
  pub(crate) omit_null: bool,
  pub(crate) key_order: KeyOrder,
  pub(crate) ignore_omitempty: bool,
  pub(crate) nan: FloatNaNPolicy,
  pub(crate) inf: FloatInfPolicy,
}

impl Default for Opt {
  fn default() -> Self {
    Opt {
      escape_html: true,
      escape_slash: true,
      utf8: false,
      indent: None,
      omit_null: false,
      key_order: KeyOrder::Default,
      ignore_omitempty: false,
      nan: FloatNaNPolicy::Error,
      inf: FloatInfPolicy::Error,
    }
  }
}

impl Opt {
  /// Starts from the current global default and applies ```atoms``` in order.
  pub fn combine(atoms: &[OptAtom]) -> Opt {
    let mut opt = DEFAULT_OPT.read().clone();
    for a in atoms {
      a.merge_into(&mut opt);
    }
    opt
  }

  pub fn ignore_omitempty(&self) -> bool {
    self.ignore_omitempty
  }
}

/// One option. Later atoms override earlier ones touching the same setting;
/// all key ordering atoms share a single setting.
#[derive(Clone)]
pub enum OptAtom {
  EscapeSlash(bool),
  EscapeHTML(bool),
  Utf8,
  Indent { prefix: String, indent: String },
  OmitNull(bool),
  KeySequence(Vec<String>),
  KeySequenceWithLessFunc(LessFunc),
  DefaultStringSequence,
  SetSequence,
  IgnoreOmitempty,
  FloatNaN(FloatNaNPolicy),
  FloatInf(FloatInfPolicy),
}

impl core::fmt::Debug for OptAtom {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      OptAtom::EscapeSlash(b) => f.debug_tuple("EscapeSlash").field(b).finish(),
      OptAtom::EscapeHTML(b) => f.debug_tuple("EscapeHTML").field(b).finish(),
      OptAtom::Utf8 => f.write_str("Utf8"),
      OptAtom::Indent { prefix, indent } => {
        f.debug_struct("Indent").field("prefix", prefix).field("indent", indent).finish()
      }
      OptAtom::OmitNull(b) => f.debug_tuple("OmitNull").field(b).finish(),
      OptAtom::KeySequence(k) => f.debug_tuple("KeySequence").field(k).finish(),
      OptAtom::KeySequenceWithLessFunc(_) => f.write_str("KeySequenceWithLessFunc(<fn>)"),
      OptAtom::DefaultStringSequence => f.write_str("DefaultStringSequence"),
      OptAtom::SetSequence => f.write_str("SetSequence"),
      OptAtom::IgnoreOmitempty => f.write_str("IgnoreOmitempty"),
      OptAtom::FloatNaN(p) => f.debug_tuple("FloatNaN").field(p).finish(),
      OptAtom::FloatInf(p) => f.debug_tuple("FloatInf").field(p).finish(),
    }
  }
}

impl OptAtom {
  pub fn merge_into(&self, opt: &mut Opt) {
    match self {
      OptAtom::EscapeSlash(b) => opt.escape_slash = *b,
      OptAtom::EscapeHTML(b) => opt.escape_html = *b,
      OptAtom::Utf8 => opt.utf8 = true,
      OptAtom::Indent { prefix, indent } => opt.indent = Some((prefix.clone(), indent.clone())),
      OptAtom::OmitNull(b) => opt.omit_null = *b,
      OptAtom::KeySequence(keys) => opt.key_order = KeyOrder::Keys(keys.clone()),
      OptAtom::KeySequenceWithLessFunc(f) => opt.key_order = KeyOrder::Less(f.clone()),
      OptAtom::DefaultStringSequence => opt.key_order = KeyOrder::Dictionary,
      OptAtom::SetSequence => opt.key_order = KeyOrder::SetSequence,
      OptAtom::IgnoreOmitempty => opt.ignore_omitempty = true,
      OptAtom::FloatNaN(p) => opt.nan = p.clone(),
      OptAtom::FloatInf(p) => opt.inf = p.clone(),
    }
  }

  // --- Constructors ---

  pub fn escape_slash(on: bool) -> OptAtom { OptAtom::EscapeSlash(on) }
  pub fn escape_html(on: bool) -> OptAtom { OptAtom::EscapeHTML(on) }
  pub fn utf8() -> OptAtom { OptAtom::Utf8 }

  pub fn indent(prefix: &str, indent: &str) -> OptAtom {
    OptAtom::Indent { prefix: prefix.to_string(), indent: indent.to_string() }
  }

  pub fn omit_null(on: bool) -> OptAtom { OptAtom::OmitNull(on) }

  pub fn key_sequence<S: AsRef<str>>(keys: &[S]) -> OptAtom {
    OptAtom::KeySequence(keys.iter().map(|k| k.as_ref().to_string()).collect())
  }

  pub fn key_sequence_with_less_func<F>(f: F) -> OptAtom
  where
    F: Fn(&ParentInfo, &str, &str, &Value, &Value) -> bool + Send + Sync + 'static,
  {
    OptAtom::KeySequenceWithLessFunc(Arc::new(f))
  }

  pub fn default_string_sequence() -> OptAtom { OptAtom::DefaultStringSequence }
  pub fn set_sequence() -> OptAtom { OptAtom::SetSequence }
  pub fn ignore_omitempty() -> OptAtom { OptAtom::IgnoreOmitempty }

  pub fn float_nan_to_float(f: f64) -> OptAtom { OptAtom::FloatNaN(FloatNaNPolicy::ToFloat(f)) }
  pub fn float_nan_to_null() -> OptAtom { OptAtom::FloatNaN(FloatNaNPolicy::Null) }
  pub fn float_nan_to_string_nan() -> OptAtom { OptAtom::float_nan_to_string("") }

  /// An empty string selects ```"NaN"```.
  pub fn float_nan_to_string(s: &str) -> OptAtom {
    let s = if s.is_empty() { "NaN" } else { s };
    OptAtom::FloatNaN(FloatNaNPolicy::ToString(s.to_string()))
  }

  pub fn float_inf_to_float(f: f64) -> OptAtom { OptAtom::FloatInf(FloatInfPolicy::ToFloat(f)) }
  pub fn float_inf_to_null() -> OptAtom { OptAtom::FloatInf(FloatInfPolicy::Null) }
  pub fn float_inf_to_string_inf() -> OptAtom { OptAtom::float_inf_to_string("", "") }

  /// Empty ```positive``` selects ```"+Inf"```; empty ```negative``` is derived
  /// from the positive form by stripping leading ```+``` and prepending ```-```.
  pub fn float_inf_to_string(positive: &str, negative: &str) -> OptAtom {
    let positive = if positive.is_empty() { "+Inf".to_string() } else { positive.to_string() };
    let negative = if negative.is_empty() {
      format!("-{}", positive.trim_start_matches('+'))
    } else {
      negative.to_string()
    };
    OptAtom::FloatInf(FloatInfPolicy::ToString { positive, negative })
  }
}

// --- Global default ---

static DEFAULT_OPT: Lazy<RwLock<Opt>> = Lazy::new(|| RwLock::new(Opt::default()));

/// Replaces the process-wide default with ```Opt::default()``` plus ```atoms```.
pub fn set_default_marshal_options(atoms: &[OptAtom]) {
  let mut opt = Opt::default();
  for a in atoms {
    a.merge_into(&mut opt);
  }
  log::debug!("default marshal options set to {:?}", opt);
  *DEFAULT_OPT.write() = opt;
}

pub fn reset_default_marshal_options() {
  log::debug!("default marshal options reset");
  *DEFAULT_OPT.write() = Opt::default();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn later_atoms_win() {
    let opt = Opt::combine(&[
      OptAtom::escape_slash(false),
      OptAtom::set_sequence(),
      OptAtom::escape_slash(true),
      OptAtom::key_sequence(&["b", "a"]),
    ]);
    assert!(opt.escape_slash);
    assert!(matches!(opt.key_order, KeyOrder::Keys(ref k) if k == &["b".to_string(), "a".to_string()]));

    let opt = Opt::combine(&[OptAtom::key_sequence(&["x"]), OptAtom::default_string_sequence()]);
    assert!(matches!(opt.key_order, KeyOrder::Dictionary));
  }

  #[test]
  fn inf_string_defaults() {
    match OptAtom::float_inf_to_string_inf() {
      OptAtom::FloatInf(FloatInfPolicy::ToString { positive, negative }) => {
        assert_eq!(positive, "+Inf");
        assert_eq!(negative, "-Inf");
      }
      other => panic!("unexpected {:?}", other),
    }
    match OptAtom::float_inf_to_string("++Infinity", "") {
      OptAtom::FloatInf(FloatInfPolicy::ToString { negative, .. }) => assert_eq!(negative, "-Infinity"),
      other => panic!("unexpected {:?}", other),
    }
    match OptAtom::float_nan_to_string_nan() {
      OptAtom::FloatNaN(FloatNaNPolicy::ToString(s)) => assert_eq!(s, "NaN"),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn defaults() {
    let opt = Opt::default();
    assert!(opt.escape_html && opt.escape_slash);
    assert!(!opt.utf8 && !opt.omit_null && !opt.ignore_omitempty);
    assert_eq!(opt.nan, FloatNaNPolicy::Error);
    assert_eq!(opt.inf, FloatInfPolicy::Error);
  }
}
