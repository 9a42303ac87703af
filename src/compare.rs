//! Structural equality and numeric ordering.

use core::cmp::Ordering;
use core::str::FromStr;

use bigdecimal::BigDecimal;

use crate::number::Number;
use crate::value::Value;

fn decimal(n: &Number) -> Option<BigDecimal> {
  BigDecimal::from_str(n.as_str()).ok()
}

/// Orders two numbers by value. Texts that do not parse as decimals (NaN and
/// infinities created programmatically) fall back to their float values.
fn number_cmp(a: &Number, b: &Number) -> Option<Ordering> {
  if a.as_str() == b.as_str() && !a.is_nan() {
    return Some(Ordering::Equal);
  }
  match (decimal(a), decimal(b)) {
    (Some(x), Some(y)) => Some(x.cmp(&y)),
    _ => a.as_f64().partial_cmp(&b.as_f64()),
  }
}

fn numbers<'a>(a: &'a Value, b: &'a Value) -> Option<(&'a Number, &'a Number)> {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => Some((x, y)),
    _ => None,
  }
}

impl Value {
  /// Deep equality. Numbers compare by value (```1.0``` equals ```1```),
  /// objects ignore member order.
  pub fn equal(&self, other: &Value) -> bool {
    match (self, other) {
      (Value::NotExist, Value::NotExist) | (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => number_cmp(a, b) == Some(Ordering::Equal),
      (Value::Array(a), Value::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equal(y)),
      (Value::Object(a), Value::Object(b)) => {
        a.len() == b.len() && a.iter().all(|(k, x)| b.get(k).map_or(false, |y| x.equal(y)))
      }
      _ => false,
    }
  }

  /// ```true``` only if both are numbers and ```self > other```.
  pub fn greater_than(&self, other: &Value) -> bool {
    numbers(self, other).and_then(|(a, b)| number_cmp(a, b)) == Some(Ordering::Greater)
  }

  pub fn less_than(&self, other: &Value) -> bool {
    numbers(self, other).and_then(|(a, b)| number_cmp(a, b)) == Some(Ordering::Less)
  }

  pub fn greater_than_or_equal(&self, other: &Value) -> bool {
    matches!(numbers(self, other).and_then(|(a, b)| number_cmp(a, b)), Some(Ordering::Greater | Ordering::Equal))
  }

  pub fn less_than_or_equal(&self, other: &Value) -> bool {
    matches!(numbers(self, other).and_then(|(a, b)| number_cmp(a, b)), Some(Ordering::Less | Ordering::Equal))
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Value) -> bool {
    self.equal(other)
  }
}

/// Only number pairs are ordered.
impl PartialOrd for Value {
  fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
    numbers(self, other).and_then(|(a, b)| number_cmp(a, b))
  }
}
