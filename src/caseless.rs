//! Case-insensitive view over a ```Value```.
//!
//! Object keys are matched ignoring case. When several keys fold to the same
//! lowercase form, an exact match is preferred, then the key set earliest.
//! The first lookup on an object builds its lowercase index, which is why the
//! view needs ```&mut```.

use crate::error::{Error, Result};
use crate::path::{self, PathElem};
use crate::value::Value;

pub struct Caseless<'v> {
  v: &'v mut Value,
}

impl Value {
  /// Returns a view whose lookups ignore the case of object keys.
  ///
  /// ```
  /// use jsonvalue::{path, Value};
  ///
  /// let mut v: Value = r#"{"Name":"x"}"#.parse().unwrap();
  /// assert!(v.get(path!["name"]).is_err());
  /// assert_eq!(v.caseless().get(path!["NAME"]).unwrap().string(), "x");
  /// ```
  pub fn caseless(&mut self) -> Caseless<'_> {
    Caseless { v: self }
  }
}

impl<'v> Caseless<'v> {
  pub fn get(&mut self, path: &[PathElem]) -> Result<&Value> {
    path::lookup_mut(self.v, path, true).map(|v| &*v)
  }

  pub fn get_mut(&mut self, path: &[PathElem]) -> Result<&mut Value> {
    path::lookup_mut(self.v, path, true)
  }

  pub fn get_string(&mut self, path: &[PathElem]) -> Result<&str> {
    match self.get(path)? {
      Value::String(s) => Ok(s),
      other => Err(Error::TypeNotMatch(format!("value is {}, not string", other.value_type()))),
    }
  }

  pub fn get_int(&mut self, path: &[PathElem]) -> Result<i64> {
    match self.get(path)? {
      Value::Number(n) => Ok(n.as_i64()),
      other => Err(Error::TypeNotMatch(format!("value is {}, not number", other.value_type()))),
    }
  }

  pub fn get_bool(&mut self, path: &[PathElem]) -> Result<bool> {
    match self.get(path)? {
      Value::Bool(b) => Ok(*b),
      other => Err(Error::TypeNotMatch(format!("value is {}, not boolean", other.value_type()))),
    }
  }

  /// Removes the child at ```path```, resolving every key ignoring case.
  pub fn delete(&mut self, path: &[PathElem]) -> Result<()> {
    path::remove_at(self.v, path, true).map(|_| ())
  }
}

#[cfg(test)]
mod tests {
  use crate::{path, unmarshal_string, Value};

  #[test]
  fn exact_match_wins_then_earliest() {
    let mut v = unmarshal_string(r#"{"A":1,"a":2}"#).unwrap();
    assert_eq!(v.get(path!["a"]).unwrap().int(), 2);
    assert_eq!(v.caseless().get(path!["a"]).unwrap().int(), 2);
    assert_eq!(v.caseless().get(path!["A"]).unwrap().int(), 1);

    v.delete(path!["A"]).unwrap();
    assert_eq!(v.caseless().get(path!["A"]).unwrap().int(), 2);
  }

  #[test]
  fn nested_paths_and_delete() {
    let mut v = unmarshal_string(r#"{"Data":{"List":[{"ID":7}]}}"#).unwrap();
    let mut view = v.caseless();
    assert_eq!(view.get_int(path!["data", "list", 0, "id"]).unwrap(), 7);
    view.delete(path!["DATA", "LIST", 0, "Id"]).unwrap();
    assert!(view.get(path!["data", "list", 0, "id"]).unwrap_err().is_not_found());
    assert_eq!(v.marshal_string(&[]).unwrap(), r#"{"Data":{"List":[{}]}}"#);
  }

  #[test]
  fn typed_getters() {
    let mut v = unmarshal_string(r#"{"Flag":true,"Name":"n"}"#).unwrap();
    assert!(v.caseless().get_bool(path!["flag"]).unwrap());
    assert_eq!(v.caseless().get_string(path!["NAME"]).unwrap(), "n");
    assert!(v.caseless().get_string(path!["flag"]).unwrap_err().is_type_not_match());
    assert!(Value::NotExist.caseless().get(path!["x"]).is_err());
  }
}
