use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::number::{self, Number};
use crate::valueobject::Object;

/// The kind of a ```Value```.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
  NotExist,
  Null,
  Boolean,
  Number,
  String,
  Array,
  Object,
}

impl core::fmt::Display for ValueType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let s = match self {
      ValueType::NotExist => "not_exist",
      ValueType::Null => "null",
      ValueType::Boolean => "boolean",
      ValueType::Number => "number",
      ValueType::String => "string",
      ValueType::Array => "array",
      ValueType::Object => "object",
    };
    f.write_str(s)
  }
}

/// Represents a JSON value and, for containers, everything below it.
///
/// A ```Value``` exclusively owns its children; ```clone()``` is a deep copy.
#[derive(Debug, Clone, Default)]
pub enum Value {
  /// The zero value. Never stored inside a container.
  #[default]
  NotExist,
  /// Contains no value
  ///
  /// ```
  /// # use jsonvalue::Value;
  /// let v = Value::new_null();
  /// assert_eq!(v.marshal_string(&[]).unwrap(), "null");
  /// ```
  Null,
  Bool(bool),
  /// Contains a number together with its lexical text
  ///
  /// ```
  /// # use jsonvalue::Value;
  /// let v = Value::new_float64(1.5);
  /// assert_eq!(v.string(), "1.5");
  /// ```
  Number(Number),
  String(String),
  Array(Vec<Value>),
  Object(Object),
}

impl Value {
  // --- Constructors ---

  pub fn new_null() -> Value { Value::Null }
  pub fn new_bool(b: bool) -> Value { Value::Bool(b) }
  pub fn new_int(i: i64) -> Value { Value::Number(Number::from_i64(i)) }
  pub fn new_int32(i: i32) -> Value { Value::Number(Number::from_i64(i64::from(i))) }
  pub fn new_int64(i: i64) -> Value { Value::Number(Number::from_i64(i)) }
  pub fn new_uint(u: u64) -> Value { Value::Number(Number::from_u64(u)) }
  pub fn new_uint32(u: u32) -> Value { Value::Number(Number::from_u64(u64::from(u))) }
  pub fn new_uint64(u: u64) -> Value { Value::Number(Number::from_u64(u)) }

  /// Creates a float whose text is the shortest form that round-trips.
  pub fn new_float64(f: f64) -> Value { Value::Number(Number::from_f64(f)) }

  /// Creates a float formatted with ```fmt``` (```'f'```, ```'e'```, ```'g'```, ...)
  /// and ```prec``` digits, ```-1``` meaning shortest.
  ///
  /// ```
  /// # use jsonvalue::Value;
  /// assert_eq!(Value::new_float64f(3.14159, 'f', 2).string(), "3.14");
  /// ```
  pub fn new_float64f(f: f64, fmt: char, prec: i32) -> Value { Value::Number(Number::from_f64_format(f, fmt, prec)) }

  pub fn new_float32(f: f32) -> Value { Value::Number(Number::from_f32(f)) }
  pub fn new_float32f(f: f32, fmt: char, prec: i32) -> Value { Value::Number(Number::from_f32_format(f, fmt, prec)) }

  pub fn new_string(s: impl Into<String>) -> Value { Value::String(s.into()) }

  /// Creates a string holding the standard base64 encoding of ```b```.
  pub fn new_bytes(b: &[u8]) -> Value { Value::String(BASE64.encode(b)) }

  pub fn new_object() -> Value { Value::Object(Object::new()) }
  pub fn new_array() -> Value { Value::Array(Vec::new()) }

  // --- Type predicates ---

  pub fn value_type(&self) -> ValueType {
    match self {
      Value::NotExist => ValueType::NotExist,
      Value::Null => ValueType::Null,
      Value::Bool(_) => ValueType::Boolean,
      Value::Number(_) => ValueType::Number,
      Value::String(_) => ValueType::String,
      Value::Array(_) => ValueType::Array,
      Value::Object(_) => ValueType::Object,
    }
  }

  pub fn is_exist(&self) -> bool { !matches!(self, Value::NotExist) }
  pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
  pub fn is_bool(&self) -> bool { matches!(self, Value::Bool(_)) }
  pub fn is_number(&self) -> bool { matches!(self, Value::Number(_)) }
  pub fn is_string(&self) -> bool { matches!(self, Value::String(_)) }
  pub fn is_array(&self) -> bool { matches!(self, Value::Array(_)) }
  pub fn is_object(&self) -> bool { matches!(self, Value::Object(_)) }

  /// Returns ```true``` if the value is a number written with a fraction or exponent.
  pub fn is_float(&self) -> bool {
    matches!(self, Value::Number(n) if n.is_floated())
  }

  pub fn is_integer(&self) -> bool {
    matches!(self, Value::Number(n) if !n.is_floated())
  }

  pub fn is_negative(&self) -> bool {
    matches!(self, Value::Number(n) if n.is_negative())
  }

  pub fn is_positive(&self) -> bool {
    matches!(self, Value::Number(n) if !n.is_negative() && !n.is_nan() && n.as_f64() != 0.0)
  }

  pub fn greater_than_int64_max(&self) -> bool {
    matches!(self, Value::Number(n) if n.greater_than_int64_max())
  }

  /// Children count of an array or object, 0 for anything else.
  pub fn len(&self) -> usize {
    match self {
      Value::Array(a) => a.len(),
      Value::Object(o) => o.len(),
      _ => 0,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  // --- Borrowing accessors ---

  pub fn as_number(&self) -> Option<&Number> {
    if let Value::Number(n) = self { Some(n) } else { None }
  }

  pub fn as_str(&self) -> Option<&str> {
    if let Value::String(s) = self { Some(s) } else { None }
  }

  pub fn as_array(&self) -> Option<&Vec<Value>> {
    if let Value::Array(a) = self { Some(a) } else { None }
  }

  pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
    if let Value::Array(a) = self { Some(a) } else { None }
  }

  pub fn as_object(&self) -> Option<&Object> {
    if let Value::Object(o) = self { Some(o) } else { None }
  }

  pub fn as_object_mut(&mut self) -> Option<&mut Object> {
    if let Value::Object(o) = self { Some(o) } else { None }
  }

  // --- Lenient scalar accessors ---
  //
  // These never fail: a mismatching variant yields the zero value. Numeric
  // accessors also read strings that hold a JSON number.

  fn numeric(&self) -> Option<Number> {
    match self {
      Value::Number(n) => Some(n.clone()),
      Value::String(s) => number::parse_number_str(s).ok(),
      _ => None,
    }
  }

  pub fn bool(&self) -> bool {
    matches!(self, Value::Bool(true))
  }

  pub fn int(&self) -> i64 { self.int64() }
  pub fn int32(&self) -> i32 { self.numeric().map_or(0, |n| n.as_i64() as i32) }
  pub fn int64(&self) -> i64 { self.numeric().map_or(0, |n| n.as_i64()) }
  pub fn uint(&self) -> u64 { self.uint64() }
  pub fn uint32(&self) -> u32 { self.numeric().map_or(0, |n| n.as_u64() as u32) }
  pub fn uint64(&self) -> u64 { self.numeric().map_or(0, |n| n.as_u64()) }
  pub fn float32(&self) -> f32 { self.numeric().map_or(0.0, |n| n.as_f64() as f32) }
  pub fn float64(&self) -> f64 { self.numeric().map_or(0.0, |n| n.as_f64()) }

  /// Decodes a base64 string; anything else (or bad base64) gives an empty vector.
  pub fn bytes(&self) -> Vec<u8> {
    match self {
      Value::String(s) => BASE64.decode(s.as_bytes()).unwrap_or_default(),
      _ => Vec::new(),
    }
  }

  /// Returns a ```String``` representation of the value.
  ///
  /// Strings come back unescaped, numbers as their lexical text, containers
  /// as their default serialization and ```NotExist``` as an empty string.
  pub fn string(&self) -> String {
    match self {
      Value::NotExist => String::new(),
      Value::Null => "null".to_string(),
      Value::Bool(b) => b.to_string(),
      Value::Number(n) => n.as_str().to_string(),
      Value::String(s) => s.clone(),
      Value::Array(_) | Value::Object(_) => self.marshal_string(&[]).unwrap_or_default(),
    }
  }
}

impl core::fmt::Display for Value {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(&self.string())
  }
}

// --- Conversions ---

impl From<bool> for Value {
  fn from(b: bool) -> Value { Value::new_bool(b) }
}

macro_rules! from_signed {
  ($($t:ty),*) => {$(
    impl From<$t> for Value {
      fn from(i: $t) -> Value { Value::new_int(i as i64) }
    }
  )*};
}

macro_rules! from_unsigned {
  ($($t:ty),*) => {$(
    impl From<$t> for Value {
      fn from(u: $t) -> Value { Value::new_uint(u as u64) }
    }
  )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
  fn from(f: f32) -> Value { Value::new_float32(f) }
}

impl From<f64> for Value {
  fn from(f: f64) -> Value { Value::new_float64(f) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Value { Value::new_string(s) }
}

impl From<String> for Value {
  fn from(s: String) -> Value { Value::String(s) }
}

impl From<Vec<Value>> for Value {
  fn from(a: Vec<Value>) -> Value { Value::Array(a) }
}

impl From<Object> for Value {
  fn from(o: Object) -> Value { Value::Object(o) }
}
