//! Conversion between native Rust data and ```Value``` trees.
//!
//! ```Import``` turns a native value into a tree, ```Export``` reads one back.
//! Both are implemented for booleans, every integer width, both float widths,
//! strings, vectors, fixed arrays, maps keyed by strings or integers,
//! ```Option```, ```Box``` and ```Value``` itself. Byte buffers travel as
//! base64 strings through the [`Bytes`] wrapper. Structs implement the traits
//! by hand with [`StructImporter`] and [`StructExporter`], which understand
//! field tags of the form ```name,omitempty,string``` (a lone ```-``` skips the
//! field).

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::json_util::unmarshal_string;
use crate::options::{Opt, OptAtom};
use crate::value::Value;
use crate::valueobject::Object;

/// Native → ```Value```.
pub trait Import {
  fn import(&self, opt: &Opt) -> Result<Value>;

  /// Whether an ```omitempty``` field holding this value is left out.
  fn is_zero(&self) -> bool {
    false
  }
}

/// ```Value``` → native.
pub trait Export: Sized {
  fn export(v: &Value) -> Result<Self>;
}

impl Value {
  /// Builds a tree from ```native```. Of the options only ```IgnoreOmitempty```
  /// matters here.
  pub fn import<T: Import + ?Sized>(native: &T, atoms: &[OptAtom]) -> Result<Value> {
    native.import(&Opt::combine(atoms))
  }

  /// Reads the tree into a native value.
  ///
  /// ```
  /// use jsonvalue::Value;
  ///
  /// let v: Value = "[1,2,3]".parse().unwrap();
  /// let n: Vec<u8> = v.export().unwrap();
  /// assert_eq!(n, vec![1, 2, 3]);
  /// ```
  pub fn export<T: Export>(&self) -> Result<T> {
    T::export(self)
  }
}

fn type_error(v: &Value, want: &str) -> Error {
  Error::TypeNotMatch(format!("cannot export {} into {}", v.value_type(), want))
}

// --- Scalars ---

impl Import for bool {
  fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_bool(*self)) }
  fn is_zero(&self) -> bool { !*self }
}

impl Export for bool {
  fn export(v: &Value) -> Result<bool> {
    match v {
      Value::Bool(b) => Ok(*b),
      _ => Err(type_error(v, "bool")),
    }
  }
}

macro_rules! signed {
  ($($t:ty),*) => {$(
    impl Import for $t {
      fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_int(*self as i64)) }
      fn is_zero(&self) -> bool { *self == 0 }
    }

    impl Export for $t {
      fn export(v: &Value) -> Result<$t> {
        let Value::Number(n) = v else { return Err(type_error(v, stringify!($t))) };
        if n.is_floated() {
          return Err(Error::TypeNotMatch(format!("{} is not an integer", n.as_str())));
        }
        if n.greater_than_int64_max() {
          return Err(Error::OutOfRange(format!("{} overflows {}", n.as_str(), stringify!($t))));
        }
        <$t>::try_from(n.as_i64())
          .map_err(|_| Error::OutOfRange(format!("{} overflows {}", n.as_str(), stringify!($t))))
      }
    }
  )*};
}

macro_rules! unsigned {
  ($($t:ty),*) => {$(
    impl Import for $t {
      fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_uint(*self as u64)) }
      fn is_zero(&self) -> bool { *self == 0 }
    }

    impl Export for $t {
      fn export(v: &Value) -> Result<$t> {
        let Value::Number(n) = v else { return Err(type_error(v, stringify!($t))) };
        if n.is_floated() {
          return Err(Error::TypeNotMatch(format!("{} is not an integer", n.as_str())));
        }
        if n.is_negative() {
          return Err(Error::OutOfRange(format!("{} is negative", n.as_str())));
        }
        <$t>::try_from(n.as_u64())
          .map_err(|_| Error::OutOfRange(format!("{} overflows {}", n.as_str(), stringify!($t))))
      }
    }
  )*};
}

signed!(i8, i16, i32, i64, isize);
unsigned!(u8, u16, u32, u64, usize);

impl Import for f32 {
  fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_float32(*self)) }
  fn is_zero(&self) -> bool { *self == 0.0 }
}

impl Import for f64 {
  fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_float64(*self)) }
  fn is_zero(&self) -> bool { *self == 0.0 }
}

impl Export for f32 {
  fn export(v: &Value) -> Result<f32> {
    match v {
      Value::Number(n) => Ok(n.as_f64() as f32),
      _ => Err(type_error(v, "f32")),
    }
  }
}

impl Export for f64 {
  fn export(v: &Value) -> Result<f64> {
    match v {
      Value::Number(n) => Ok(n.as_f64()),
      _ => Err(type_error(v, "f64")),
    }
  }
}

impl Import for str {
  fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_string(self)) }
  fn is_zero(&self) -> bool { self.is_empty() }
}

impl Import for String {
  fn import(&self, opt: &Opt) -> Result<Value> { self.as_str().import(opt) }
  fn is_zero(&self) -> bool { self.is_empty() }
}

impl Export for String {
  fn export(v: &Value) -> Result<String> {
    match v {
      Value::String(s) => Ok(s.clone()),
      _ => Err(type_error(v, "String")),
    }
  }
}

/// Binary data carried as a standard base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Import for Bytes {
  fn import(&self, _: &Opt) -> Result<Value> { Ok(Value::new_bytes(&self.0)) }
  fn is_zero(&self) -> bool { self.0.is_empty() }
}

impl Export for Bytes {
  fn export(v: &Value) -> Result<Bytes> {
    let Value::String(s) = v else { return Err(type_error(v, "bytes")) };
    BASE64
      .decode(s.as_bytes())
      .map(Bytes)
      .map_err(|e| Error::IllegalString(format!("invalid base64: {}", e)))
  }
}

// --- Containers ---

impl<T: Import> Import for [T] {
  fn import(&self, opt: &Opt) -> Result<Value> {
    let items = self.iter().map(|x| x.import(opt)).collect::<Result<Vec<Value>>>()?;
    Ok(Value::Array(items))
  }
  fn is_zero(&self) -> bool { self.is_empty() }
}

impl<T: Import> Import for Vec<T> {
  fn import(&self, opt: &Opt) -> Result<Value> { self.as_slice().import(opt) }
  fn is_zero(&self) -> bool { self.is_empty() }
}

impl<T: Import, const N: usize> Import for [T; N] {
  fn import(&self, opt: &Opt) -> Result<Value> { self.as_slice().import(opt) }
  fn is_zero(&self) -> bool { self.iter().all(|x| x.is_zero()) }
}

impl<T: Export> Export for Vec<T> {
  fn export(v: &Value) -> Result<Vec<T>> {
    match v {
      Value::Array(a) => a.iter().map(T::export).collect(),
      _ => Err(type_error(v, "Vec")),
    }
  }
}

impl<T: Export, const N: usize> Export for [T; N] {
  fn export(v: &Value) -> Result<[T; N]> {
    let items: Vec<T> = Vec::export(v)?;
    let len = items.len();
    items
      .try_into()
      .map_err(|_| Error::OutOfRange(format!("array of length {} does not fit [_; {}]", len, N)))
  }
}

/// Types usable as map keys. Keys travel as object member names.
pub trait MapKey: Sized {
  fn to_key(&self) -> String;
  fn from_key(key: &str) -> Result<Self>;
}

impl MapKey for String {
  fn to_key(&self) -> String { self.clone() }
  fn from_key(key: &str) -> Result<String> { Ok(key.to_string()) }
}

macro_rules! int_key {
  ($($t:ty),*) => {$(
    impl MapKey for $t {
      fn to_key(&self) -> String { self.to_string() }
      fn from_key(key: &str) -> Result<$t> {
        key.parse().map_err(|_| Error::ParseNumberFromString(format!("map key {:?} is not a {}", key, stringify!($t))))
      }
    }
  )*};
}

int_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn import_map<'a, K, V, I>(entries: I, opt: &Opt) -> Result<Value>
where
  K: MapKey + 'a,
  V: Import + 'a,
  I: Iterator<Item = (&'a K, &'a V)>,
{
  let mut o = Object::new();
  for (k, v) in entries {
    o.set(&k.to_key(), v.import(opt)?);
  }
  Ok(Value::Object(o))
}

impl<K: MapKey, V: Import, S> Import for HashMap<K, V, S> {
  fn import(&self, opt: &Opt) -> Result<Value> { import_map(self.iter(), opt) }
  fn is_zero(&self) -> bool { self.is_empty() }
}

impl<K: MapKey, V: Import> Import for BTreeMap<K, V> {
  fn import(&self, opt: &Opt) -> Result<Value> { import_map(self.iter(), opt) }
  fn is_zero(&self) -> bool { self.is_empty() }
}

impl<K: MapKey + Eq + Hash, V: Export> Export for HashMap<K, V> {
  fn export(v: &Value) -> Result<HashMap<K, V>> {
    let Value::Object(o) = v else { return Err(type_error(v, "HashMap")) };
    o.iter().map(|(k, x)| -> Result<(K, V)> { Ok((K::from_key(k)?, V::export(x)?)) }).collect()
  }
}

impl<K: MapKey + Ord, V: Export> Export for BTreeMap<K, V> {
  fn export(v: &Value) -> Result<BTreeMap<K, V>> {
    let Value::Object(o) = v else { return Err(type_error(v, "BTreeMap")) };
    o.iter().map(|(k, x)| -> Result<(K, V)> { Ok((K::from_key(k)?, V::export(x)?)) }).collect()
  }
}

// --- Indirection ---

impl<T: Import> Import for Option<T> {
  fn import(&self, opt: &Opt) -> Result<Value> {
    match self {
      Some(x) => x.import(opt),
      None => Ok(Value::new_null()),
    }
  }
  fn is_zero(&self) -> bool { self.is_none() }
}

impl<T: Export> Export for Option<T> {
  fn export(v: &Value) -> Result<Option<T>> {
    match v {
      Value::Null => Ok(None),
      _ => T::export(v).map(Some),
    }
  }
}

impl<T: Import + ?Sized> Import for Box<T> {
  fn import(&self, opt: &Opt) -> Result<Value> { (**self).import(opt) }
  fn is_zero(&self) -> bool { (**self).is_zero() }
}

impl<T: Export> Export for Box<T> {
  fn export(v: &Value) -> Result<Box<T>> { T::export(v).map(Box::new) }
}

impl<T: Import + ?Sized> Import for &T {
  fn import(&self, opt: &Opt) -> Result<Value> { (**self).import(opt) }
  fn is_zero(&self) -> bool { (**self).is_zero() }
}

impl Import for Value {
  fn import(&self, _: &Opt) -> Result<Value> {
    if !self.is_exist() {
      log::warn!("import of a NotExist value");
      return Err(Error::ValueUninitialized("cannot import a NotExist value".to_string()));
    }
    Ok(self.clone())
  }
  fn is_zero(&self) -> bool { !self.is_exist() || self.is_null() }
}

impl Export for Value {
  fn export(v: &Value) -> Result<Value> { Ok(v.clone()) }
}

// --- Structs ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tag {
  name: String,
  skip: bool,
  omitempty: bool,
  string: bool,
}

fn parse_tag(tag: &str) -> Result<Tag> {
  if tag == "-" {
    return Ok(Tag { skip: true, ..Tag::default() });
  }
  let mut parts = tag.split(',');
  let name = parts.next().unwrap_or_default();
  if name.is_empty() {
    return Err(Error::NilParameter(format!("field tag {:?} has no name", tag)));
  }
  let mut t = Tag { name: name.to_string(), ..Tag::default() };
  for p in parts {
    match p {
      "omitempty" => t.omitempty = true,
      "string" => t.string = true,
      other => log::debug!("ignoring unknown field tag option {:?}", other),
    }
  }
  Ok(t)
}

/// Collects struct fields into an object, in field order.
///
/// ```
/// use jsonvalue::{Import, Opt, OptAtom, Result, StructImporter, Value};
///
/// struct Point { x: i32, label: Option<String> }
///
/// impl Import for Point {
///   fn import(&self, opt: &Opt) -> Result<Value> {
///     Ok(StructImporter::new(opt).field("x", &self.x)?.field("label,omitempty", &self.label)?.finish())
///   }
/// }
///
/// let v = Value::import(&Point { x: 3, label: None }, &[]).unwrap();
/// assert_eq!(v.marshal_string(&[OptAtom::set_sequence()]).unwrap(), r#"{"x":3}"#);
/// ```
pub struct StructImporter<'o> {
  opt: &'o Opt,
  obj: Object,
}

impl<'o> StructImporter<'o> {
  pub fn new(opt: &'o Opt) -> Self {
    StructImporter { opt, obj: Object::new() }
  }

  pub fn field<T: Import + ?Sized>(mut self, tag: &str, v: &T) -> Result<Self> {
    let tag = parse_tag(tag)?;
    if tag.skip || (tag.omitempty && !self.opt.ignore_omitempty() && v.is_zero()) {
      return Ok(self);
    }
    let mut value = v.import(self.opt)?;
    if tag.string {
      value = match value {
        Value::Number(n) => Value::new_string(n.as_str()),
        Value::Bool(b) => Value::new_string(b.to_string()),
        other => other,
      };
    }
    self.obj.set(&tag.name, value);
    Ok(self)
  }

  pub fn finish(self) -> Value {
    Value::Object(self.obj)
  }
}

/// Reads struct fields out of an object.
pub struct StructExporter<'v> {
  obj: &'v Object,
}

impl<'v> StructExporter<'v> {
  pub fn new(v: &'v Value) -> Result<Self> {
    match v {
      Value::Object(obj) => Ok(StructExporter { obj }),
      _ => Err(Error::NotObjectValue(format!("cannot export {} into a struct", v.value_type()))),
    }
  }

  /// Reads the field named by ```tag```. Missing fields, nulls and skipped
  /// fields give ```T::default()```.
  pub fn field<T: Export + Default>(&self, tag: &str) -> Result<T> {
    let tag = parse_tag(tag)?;
    if tag.skip {
      return Ok(T::default());
    }
    match self.obj.get(&tag.name) {
      None | Some(Value::Null) => Ok(T::default()),
      Some(Value::String(s)) if tag.string => T::export(&unmarshal_string(s)?),
      Some(v) => T::export(v),
    }
  }
}
