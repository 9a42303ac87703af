//! Path addressed access to a ```Value``` tree.
//!
//! A path is a slice of ```PathElem```: keys step into objects, signed indexes
//! step into arrays (negative indexes count from the end). The [`path!`]
//! macro builds one inline:
//!
//! ```
//! use jsonvalue::{path, Value};
//!
//! let mut v = Value::new_object();
//! v.set("hello").at(path!["data", "list", 0]).unwrap();
//! assert_eq!(v.get(path!["data", "list", -1]).unwrap().string(), "hello");
//! ```
//!
//! Mutations either complete or leave the tree exactly as it was.

use crate::error::{Error, Result};
use crate::number::{self, Number};
use crate::value::Value;
use crate::valueobject::Object;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElem {
  Key(String),
  Index(isize),
}

impl core::fmt::Display for PathElem {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      PathElem::Key(k) => write!(f, "{:?}", k),
      PathElem::Index(i) => write!(f, "[{}]", i),
    }
  }
}

impl From<&str> for PathElem {
  fn from(k: &str) -> Self { PathElem::Key(k.to_string()) }
}

impl From<String> for PathElem {
  fn from(k: String) -> Self { PathElem::Key(k) }
}

impl From<&String> for PathElem {
  fn from(k: &String) -> Self { PathElem::Key(k.clone()) }
}

macro_rules! index_from {
  ($($t:ty),*) => {$(
    impl From<$t> for PathElem {
      fn from(i: $t) -> Self { PathElem::Index(i as isize) }
    }
  )*};
}

index_from!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

/// Builds a ```&[PathElem]``` from keys and indexes.
#[macro_export]
macro_rules! path {
  () => {
    &[] as &[$crate::PathElem]
  };
  ($($e:expr),+ $(,)?) => {
    &[$($crate::PathElem::from($e)),+] as &[$crate::PathElem]
  };
}

fn describe(path: &[PathElem]) -> String {
  path.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(".")
}

fn normalize(index: isize, len: usize) -> Option<usize> {
  let i = if index < 0 { index + len as isize } else { index };
  if i >= 0 && (i as usize) < len {
    Some(i as usize)
  } else {
    None
  }
}

fn unsupported(v: &Value, elem: &PathElem) -> Error {
  match (v, elem) {
    (Value::NotExist, _) => Error::ValueUninitialized(format!("cannot step into {}", elem)),
    (Value::Object(_), PathElem::Index(_)) => Error::TypeNotMatch(format!("index {} used on an object", elem)),
    (Value::Array(_), PathElem::Key(_)) => Error::TypeNotMatch(format!("key {} used on an array", elem)),
    _ => Error::TypeNotMatch(format!("{} does not support Get of {}", v.value_type(), elem)),
  }
}

// --- Navigation ---

fn step<'v>(cur: &'v Value, elem: &PathElem) -> Result<&'v Value> {
  match (cur, elem) {
    (Value::Object(o), PathElem::Key(k)) => o.get(k).ok_or_else(|| Error::NotFound(format!("key {}", elem))),
    (Value::Array(a), PathElem::Index(i)) => normalize(*i, a.len())
      .map(|p| &a[p])
      .ok_or_else(|| Error::OutOfRange(format!("index {} of array with length {}", i, a.len()))),
    _ => Err(unsupported(cur, elem)),
  }
}

pub(crate) fn step_mut<'v>(cur: &'v mut Value, elem: &PathElem, caseless: bool) -> Result<&'v mut Value> {
  match (cur, elem) {
    (Value::Object(o), PathElem::Key(k)) => {
      let found = if caseless { o.get_caseless_mut(k) } else { o.get_mut(k) };
      found.ok_or_else(|| Error::NotFound(format!("key {}", elem)))
    }
    (Value::Array(a), PathElem::Index(i)) => {
      let len = a.len();
      match normalize(*i, len) {
        Some(p) => Ok(&mut a[p]),
        None => Err(Error::OutOfRange(format!("index {} of array with length {}", i, len))),
      }
    }
    (cur, _) => Err(unsupported(cur, elem)),
  }
}

pub(crate) fn lookup_mut<'v>(root: &'v mut Value, path: &[PathElem], caseless: bool) -> Result<&'v mut Value> {
  if !root.is_exist() {
    return Err(Error::ValueUninitialized(format!("get {}", describe(path))));
  }
  let mut cur = root;
  for elem in path {
    cur = step_mut(cur, elem, caseless)?;
  }
  Ok(cur)
}

pub(crate) fn remove_at(root: &mut Value, path: &[PathElem], caseless: bool) -> Result<Value> {
  let Some((last, parents)) = path.split_last() else {
    return Err(Error::NilParameter("delete needs a non-empty path".to_string()));
  };
  let parent = lookup_mut(root, parents, caseless)?;
  match (parent, last) {
    (Value::Object(o), PathElem::Key(k)) => {
      let removed = if caseless { o.remove_caseless(k) } else { o.remove(k) };
      removed.ok_or_else(|| Error::NotFound(format!("key {}", last)))
    }
    (Value::Array(a), PathElem::Index(i)) => match normalize(*i, a.len()) {
      Some(p) => Ok(a.remove(p)),
      None => Err(Error::OutOfRange(format!("index {} of array with length {}", i, a.len()))),
    },
    (parent, _) => Err(unsupported(parent, last)),
  }
}

// --- Set ---

/// Wraps ```child``` in freshly created containers so that it sits at ```rest```.
fn materialize(rest: &[PathElem], child: Value) -> Result<Value> {
  let mut v = child;
  for elem in rest.iter().rev() {
    v = match elem {
      PathElem::Key(k) => {
        let mut o = Object::new();
        o.set(k, v);
        Value::Object(o)
      }
      PathElem::Index(0) => Value::Array(vec![v]),
      PathElem::Index(i) => {
        return Err(Error::OutOfRange(format!("cannot create array at index {}", i)));
      }
    };
  }
  Ok(v)
}

/// Puts ```v``` directly under ```cur``` at ```elem```. Arrays accept their
/// current length as an append position.
fn install<'v>(cur: &'v mut Value, elem: &PathElem, v: Value) -> Result<&'v mut Value> {
  match (cur, elem) {
    (Value::Object(o), PathElem::Key(k)) => Ok(o.set(k, v)),
    (Value::Array(a), PathElem::Index(i)) => {
      let len = a.len();
      if *i >= 0 && *i as usize == len {
        a.push(v);
        return Ok(&mut a[len]);
      }
      match normalize(*i, len) {
        Some(p) => {
          a[p] = v;
          Ok(&mut a[p])
        }
        None => Err(Error::OutOfRange(format!("index {} of array with length {}", i, len))),
      }
    }
    (cur, _) => Err(unsupported(cur, elem)),
  }
}

/// Containers never hold ```NotExist```.
fn check_child(child: &Value) -> Result<()> {
  if child.is_exist() {
    Ok(())
  } else {
    Err(Error::ValueUninitialized("cannot store a NotExist value".to_string()))
  }
}

fn set_at<'v>(root: &'v mut Value, path: &[PathElem], child: Value) -> Result<&'v mut Value> {
  check_child(&child)?;
  if path.is_empty() {
    return Err(Error::NilParameter("set needs a non-empty path".to_string()));
  }
  if !root.is_exist() {
    return Err(Error::ValueUninitialized(format!("set at {}", describe(path))));
  }

  // Descend through the part of the path that already exists.
  let mut cur = root;
  let mut depth = 0;
  while depth + 1 < path.len() {
    let exists = match (&*cur, &path[depth]) {
      (Value::Object(o), PathElem::Key(k)) => o.contains_key(k),
      (Value::Array(a), PathElem::Index(i)) => normalize(*i, a.len()).is_some(),
      (other, elem) => return Err(unsupported(other, elem)),
    };
    if !exists {
      break;
    }
    cur = step_mut(cur, &path[depth], false)?;
    depth += 1;
  }

  let subtree = materialize(&path[depth + 1..], child)?;
  let mut installed = install(cur, &path[depth], subtree)?;
  for elem in &path[depth + 1..] {
    installed = step_mut(installed, elem, false)?;
  }
  Ok(installed)
}

/// Pending ```set```; see [`Value::set`].
pub struct Setter<'v> {
  target: &'v mut Value,
  child: Value,
}

impl<'v> Setter<'v> {
  /// Installs the child at ```path```, creating missing containers: a key
  /// creates an object, index ```0``` an array. Any other missing index fails
  /// with ```OutOfRange```. Setting an array at its length appends.
  pub fn at(self, path: &[PathElem]) -> Result<&'v mut Value> {
    set_at(self.target, path, self.child)
  }
}

// --- Append ---

/// Pending ```append```; see [`Value::append`].
pub struct Appender<'v> {
  target: &'v mut Value,
  child: Value,
}

impl<'v> Appender<'v> {
  pub fn in_the_beginning(self, path: &[PathElem]) -> Result<&'v mut Value> {
    self.append(path, true)
  }

  pub fn in_the_end(self, path: &[PathElem]) -> Result<&'v mut Value> {
    self.append(path, false)
  }

  fn append(self, path: &[PathElem], front: bool) -> Result<&'v mut Value> {
    check_child(&self.child)?;
    let missing = match self.target.get(path) {
      Ok(_) => false,
      Err(e) if !path.is_empty() && (e.is_not_found() || e.is_out_of_range()) => true,
      Err(e) => return Err(e),
    };
    if missing {
      let arr = set_at(self.target, path, Value::Array(vec![self.child]))?;
      return step_mut(arr, &PathElem::Index(0), false);
    }

    match lookup_mut(self.target, path, false)? {
      Value::Array(a) => {
        let at = if front { 0 } else { a.len() };
        a.insert(at, self.child);
        Ok(&mut a[at])
      }
      other => Err(Error::NotArrayValue(format!("append to {} at {}", other.value_type(), describe(path)))),
    }
  }
}

// --- Insert ---

/// Pending ```insert```; see [`Value::insert`].
pub struct Inserter<'v> {
  target: &'v mut Value,
  child: Value,
}

impl<'v> Inserter<'v> {
  /// Inserts so that the child takes the place of the element at ```path```.
  pub fn before(self, path: &[PathElem]) -> Result<&'v mut Value> {
    self.insert(path, false)
  }

  /// Inserts right behind the element at ```path```; ```-1``` appends.
  pub fn after(self, path: &[PathElem]) -> Result<&'v mut Value> {
    self.insert(path, true)
  }

  fn insert(self, path: &[PathElem], after: bool) -> Result<&'v mut Value> {
    check_child(&self.child)?;
    let Some((last, parents)) = path.split_last() else {
      return Err(Error::NilParameter("insert needs a non-empty path".to_string()));
    };
    let PathElem::Index(i) = last else {
      return Err(Error::TypeNotMatch(format!("insert position {} is not an index", last)));
    };
    let a = match lookup_mut(self.target, parents, false)? {
      Value::Array(a) => a,
      other => {
        return Err(Error::NotArrayValue(format!("insert into {} at {}", other.value_type(), describe(parents))));
      }
    };
    let Some(p) = normalize(*i, a.len()) else {
      return Err(Error::OutOfRange(format!("index {} of array with length {}", i, a.len())));
    };
    let at = if after { p + 1 } else { p };
    a.insert(at, self.child);
    Ok(&mut a[at])
  }
}

// --- Value API ---

impl Value {
  /// Returns the child at ```path```; an empty path returns ```self```.
  pub fn get(&self, path: &[PathElem]) -> Result<&Value> {
    if !self.is_exist() {
      return Err(Error::ValueUninitialized(format!("get {}", describe(path))));
    }
    let mut cur = self;
    for elem in path {
      cur = step(cur, elem)?;
    }
    Ok(cur)
  }

  pub fn get_mut(&mut self, path: &[PathElem]) -> Result<&mut Value> {
    lookup_mut(self, path, false)
  }

  pub fn must_get(&self, path: &[PathElem]) -> &Value {
    match self.get(path) {
      Ok(v) => v,
      Err(e) => panic!("must_get {}: {}", describe(path), e),
    }
  }

  /// Starts a set. Finish with ```.at(path)```.
  pub fn set(&mut self, child: impl Into<Value>) -> Setter<'_> {
    Setter { target: self, child: child.into() }
  }

  /// Starts an append. Finish with ```.in_the_beginning(path)``` or
  /// ```.in_the_end(path)```. A missing array is created.
  pub fn append(&mut self, child: impl Into<Value>) -> Appender<'_> {
    Appender { target: self, child: child.into() }
  }

  /// Starts an insert. Finish with ```.before(path)``` or ```.after(path)```;
  /// the last path element is a position in an existing array.
  pub fn insert(&mut self, child: impl Into<Value>) -> Inserter<'_> {
    Inserter { target: self, child: child.into() }
  }

  /// Removes the child at ```path```. Siblings keep their order.
  pub fn delete(&mut self, path: &[PathElem]) -> Result<()> {
    remove_at(self, path, false).map(|_| ())
  }

  pub fn must_delete(&mut self, path: &[PathElem]) {
    if let Err(e) = self.delete(path) {
      panic!("must_delete {}: {}", describe(path), e);
    }
  }

  // --- Typed getters ---

  fn number_at(&self, path: &[PathElem]) -> Result<&Number> {
    match self.get(path)? {
      Value::Number(n) => Ok(n),
      Value::String(s) => match number::parse_number_str(s) {
        Ok(_) => Err(Error::TypeNotMatch(format!("value at {} is a string holding a number", describe(path)))),
        Err(_) => Err(Error::ParseNumberFromString(format!("value at {} is {:?}", describe(path), s))),
      },
      other => Err(Error::TypeNotMatch(format!("value at {} is {}, not number", describe(path), other.value_type()))),
    }
  }

  pub fn get_string(&self, path: &[PathElem]) -> Result<&str> {
    match self.get(path)? {
      Value::String(s) => Ok(s),
      other => Err(Error::TypeNotMatch(format!("value at {} is {}, not string", describe(path), other.value_type()))),
    }
  }

  pub fn get_int(&self, path: &[PathElem]) -> Result<i64> { self.number_at(path).map(|n| n.as_i64()) }
  pub fn get_int32(&self, path: &[PathElem]) -> Result<i32> { self.number_at(path).map(|n| n.as_i64() as i32) }
  pub fn get_int64(&self, path: &[PathElem]) -> Result<i64> { self.number_at(path).map(|n| n.as_i64()) }
  pub fn get_uint(&self, path: &[PathElem]) -> Result<u64> { self.number_at(path).map(|n| n.as_u64()) }
  pub fn get_uint32(&self, path: &[PathElem]) -> Result<u32> { self.number_at(path).map(|n| n.as_u64() as u32) }
  pub fn get_uint64(&self, path: &[PathElem]) -> Result<u64> { self.number_at(path).map(|n| n.as_u64()) }
  pub fn get_float32(&self, path: &[PathElem]) -> Result<f32> { self.number_at(path).map(|n| n.as_f64() as f32) }
  pub fn get_float64(&self, path: &[PathElem]) -> Result<f64> { self.number_at(path).map(|n| n.as_f64()) }

  pub fn get_bool(&self, path: &[PathElem]) -> Result<bool> {
    match self.get(path)? {
      Value::Bool(b) => Ok(*b),
      other => Err(Error::TypeNotMatch(format!("value at {} is {}, not boolean", describe(path), other.value_type()))),
    }
  }

  pub fn get_null(&self, path: &[PathElem]) -> Result<()> {
    match self.get(path)? {
      Value::Null => Ok(()),
      other => Err(Error::TypeNotMatch(format!("value at {} is {}, not null", describe(path), other.value_type()))),
    }
  }

  pub fn get_object(&self, path: &[PathElem]) -> Result<&Object> {
    match self.get(path)? {
      Value::Object(o) => Ok(o),
      other => Err(Error::TypeNotMatch(format!("value at {} is {}, not object", describe(path), other.value_type()))),
    }
  }

  pub fn get_array(&self, path: &[PathElem]) -> Result<&Vec<Value>> {
    match self.get(path)? {
      Value::Array(a) => Ok(a),
      other => Err(Error::TypeNotMatch(format!("value at {} is {}, not array", describe(path), other.value_type()))),
    }
  }

  // --- Iteration ---

  /// Calls ```f``` for each member of an object until it returns ```false```.
  /// Does nothing for other variants.
  pub fn range_objects<F>(&self, mut f: F)
  where
    F: FnMut(&str, &Value) -> bool,
  {
    for (k, v) in self.object_iter() {
      if !f(k, v) {
        break;
      }
    }
  }

  /// Like ```range_objects``` but in the order the members were last set.
  pub fn range_objects_by_set_sequence<F>(&self, mut f: F)
  where
    F: FnMut(&str, &Value) -> bool,
  {
    let Value::Object(o) = self else { return };
    for (k, v) in o.iter_by_set_sequence() {
      if !f(k, v) {
        break;
      }
    }
  }

  pub fn range_array<F>(&self, mut f: F)
  where
    F: FnMut(usize, &Value) -> bool,
  {
    for (i, v) in self.array_iter().enumerate() {
      if !f(i, v) {
        break;
      }
    }
  }

  pub fn object_iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.as_object().into_iter().flat_map(|o| o.iter())
  }

  pub fn array_iter(&self) -> impl Iterator<Item = &Value> {
    self.as_array().into_iter().flat_map(|a| a.iter())
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.as_object().into_iter().flat_map(|o| o.keys())
  }
}
