//! This module defines the `Object` struct, the key → child mapping behind
//! ```Value::Object```.
//!
//! Besides the children themselves an object keeps a monotonically
//! increasing counter. Every entry remembers the counter value current when
//! it was installed, which gives the *set-sequence* order. A case-insensitive
//! index (`lowercase(key) → {actual keys}`) is built on the first caseless
//! lookup and maintained by every later insert and delete.

use hashbrown::{HashMap, HashSet};

use crate::value::Value;

#[derive(Debug, Clone)]
struct Entry {
  value: Value,
  seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Object {
  entries: HashMap<String, Entry>,
  counter: u64,
  lowercase: Option<HashMap<String, HashSet<String>>>,
}

impl Object {
  pub fn new() -> Self {
    Object { entries: HashMap::new(), counter: 0, lowercase: None }
  }

  // --- Accessors ---

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.entries.get(key).map(|e| &e.value)
  }

  pub fn get_key_value(&self, key: &str) -> Option<(&str, &Value)> {
    self.entries.get_key_value(key).map(|(k, e)| (k.as_str(), &e.value))
  }

  pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
    self.entries.get_mut(key).map(|e| &mut e.value)
  }

  /// The set-sequence stamp of ```key```, if present.
  pub fn sequence_of(&self, key: &str) -> Option<u64> {
    self.entries.get(key).map(|e| e.seq)
  }

  /// Iterates in the map's own (unspecified) order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.entries.iter().map(|(k, e)| (k.as_str(), &e.value))
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
    self.entries.iter_mut().map(|(k, e)| (k.as_str(), &mut e.value))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(|k| k.as_str())
  }

  /// Entries sorted by the moment they were last set.
  pub fn iter_by_set_sequence(&self) -> Vec<(&str, &Value)> {
    let mut items: Vec<(&String, &Entry)> = self.entries.iter().collect();
    items.sort_by_key(|(_, e)| e.seq);
    items.into_iter().map(|(k, e)| (k.as_str(), &e.value)).collect()
  }

  // --- Mutators ---

  /// Sets or replaces the value for ```key``` and moves the key to the back of
  /// the set-sequence. Returns the installed child.
  pub fn set(&mut self, key: &str, value: Value) -> &mut Value {
    self.counter += 1;
    let seq = self.counter;
    if let Some(index) = self.lowercase.as_mut() {
      index.entry(key.to_lowercase()).or_default().insert(key.to_string());
    }
    let entry = self.entries.entry(key.to_string()).or_insert(Entry { value: Value::Null, seq });
    entry.value = value;
    entry.seq = seq;
    &mut entry.value
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    let removed = self.entries.remove(key)?;
    if let Some(index) = self.lowercase.as_mut() {
      let lower = key.to_lowercase();
      if let Some(set) = index.get_mut(&lower) {
        set.remove(key);
        if set.is_empty() {
          index.remove(&lower);
        }
      }
    }
    Some(removed.value)
  }

  // --- Case-insensitive access ---

  fn ensure_lowercase_index(&mut self) {
    if self.lowercase.is_some() {
      return;
    }
    let mut index: HashMap<String, HashSet<String>> = HashMap::new();
    for key in self.entries.keys() {
      index.entry(key.to_lowercase()).or_default().insert(key.clone());
    }
    self.lowercase = Some(index);
  }

  /// Resolves ```key``` case-insensitively to a key actually present.
  ///
  /// An exact match wins; otherwise the earliest-set key among the
  /// case-insensitive matches is chosen.
  pub(crate) fn resolve_caseless(&mut self, key: &str) -> Option<String> {
    if self.entries.contains_key(key) {
      return Some(key.to_string());
    }
    self.ensure_lowercase_index();
    let candidates = self.lowercase.as_ref()?.get(&key.to_lowercase())?;
    candidates
      .iter()
      .filter_map(|k| self.entries.get(k).map(|e| (k, e.seq)))
      .min_by_key(|(_, seq)| *seq)
      .map(|(k, _)| k.clone())
  }

  pub fn get_caseless(&mut self, key: &str) -> Option<&Value> {
    let actual = self.resolve_caseless(key)?;
    self.get(&actual)
  }

  pub fn get_caseless_mut(&mut self, key: &str) -> Option<&mut Value> {
    let actual = self.resolve_caseless(key)?;
    self.get_mut(&actual)
  }

  pub fn remove_caseless(&mut self, key: &str) -> Option<Value> {
    let actual = self.resolve_caseless(key)?;
    self.remove(&actual)
  }

  pub(crate) fn has_lowercase_index(&self) -> bool {
    self.lowercase.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn keys_by_sequence(o: &Object) -> Vec<String> {
    o.iter_by_set_sequence().into_iter().map(|(k, _)| k.to_string()).collect()
  }

  #[test]
  fn set_sequence_and_refresh() {
    let mut o = Object::new();
    o.set("a", Value::new_int(1));
    o.set("b", Value::new_int(2));
    o.set("c", Value::new_int(3));
    assert_eq!(keys_by_sequence(&o), vec!["a", "b", "c"]);

    o.set("a", Value::new_int(4));
    assert_eq!(keys_by_sequence(&o), vec!["b", "c", "a"]);
    assert_eq!(o.get("a").map(|v| v.int()), Some(4));
    assert_eq!(o.len(), 3);
  }

  #[test]
  fn remove_keeps_remaining_order() {
    let mut o = Object::new();
    for k in ["x", "y", "z"] {
      o.set(k, Value::new_null());
    }
    assert!(o.remove("y").is_some());
    assert!(o.remove("y").is_none());
    assert_eq!(keys_by_sequence(&o), vec!["x", "z"]);
  }

  #[test]
  fn caseless_index_is_lazy_and_maintained() {
    let mut o = Object::new();
    o.set("Name", Value::new_string("upper"));
    assert!(!o.has_lowercase_index());

    assert_eq!(o.get_caseless("NAME").map(|v| v.string()), Some("upper".to_string()));
    assert!(o.has_lowercase_index());

    o.set("name", Value::new_string("lower"));
    assert_eq!(o.get_caseless("name").map(|v| v.string()), Some("lower".to_string()));
    assert_eq!(o.get_caseless("NAME").map(|v| v.string()), Some("upper".to_string()));

    assert!(o.remove("Name").is_some());
    assert_eq!(o.get_caseless("NAME").map(|v| v.string()), Some("lower".to_string()));

    assert!(o.remove_caseless("NaMe").is_some());
    assert!(o.get_caseless("name").is_none());
    assert!(o.is_empty());
  }
}
