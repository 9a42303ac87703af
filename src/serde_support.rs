//! Bridge to ```serde_json::Value```, enabled by the ```serde_support``` feature.

use core::str::FromStr;

use crate::number::{self, Number};
use crate::value::Value;
use crate::valueobject::Object;

impl Value {
  /// Converts a ```serde_json::Value```. Numbers keep their text.
  pub fn from_json(j: serde_json::Value) -> Value {
    match j {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(b),
      serde_json::Value::Number(n) => {
        let text = n.to_string();
        match number::parse_number_str(&text) {
          Ok(parsed) => Value::Number(parsed),
          Err(_) => Value::Number(Number::from_f64(n.as_f64().unwrap_or(0.0))),
        }
      }
      serde_json::Value::String(s) => Value::String(s),
      serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from_json).collect()),
      serde_json::Value::Object(m) => {
        let mut o = Object::new();
        for (k, v) in m {
          o.set(&k, Value::from_json(v));
        }
        Value::Object(o)
      }
    }
  }

  /// Converts into a ```serde_json::Value```. ```NotExist``` and numbers
  /// serde cannot represent (NaN, ±Inf) become ```Null```. Object members are
  /// inserted in set-sequence order.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Value::NotExist | Value::Null => serde_json::Value::Null,
      Value::Bool(b) => serde_json::Value::Bool(*b),
      Value::Number(n) => match serde_json::Number::from_str(n.as_str()) {
        Ok(num) => serde_json::Value::Number(num),
        Err(_) => serde_json::Value::Null,
      },
      Value::String(s) => serde_json::Value::String(s.clone()),
      Value::Array(a) => serde_json::Value::Array(a.iter().map(Value::to_json).collect()),
      Value::Object(o) => {
        let mut m = serde_json::Map::new();
        for (k, v) in o.iter_by_set_sequence() {
          m.insert(k.to_string(), v.to_json());
        }
        serde_json::Value::Object(m)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::path;

  #[test]
  fn round_trip_through_serde() {
    let j = serde_json::json!({"a": [1, 2.5, null, true], "b": {"c": "d"}, "big": 18446744073709551615u64});
    let v = Value::from_json(j.clone());
    assert_eq!(v.get(path!["a", 1]).unwrap().float64(), 2.5);
    assert!(v.get(path!["big"]).unwrap().greater_than_int64_max());
    assert_eq!(v.to_json(), j);
  }

  #[test]
  fn special_floats_become_null() {
    assert_eq!(Value::new_float64(f64::NAN).to_json(), serde_json::Value::Null);
    assert_eq!(Value::NotExist.to_json(), serde_json::Value::Null);
  }
}
