//! Serialization of a ```Value``` tree back to JSON text.

use hashbrown::HashSet;

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::escape::EscapeTable;
use crate::number::{format_float, Number};
use crate::options::{FloatInfPolicy, FloatNaNPolicy, KeyOrder, Opt, OptAtom, ParentInfo};
use crate::path::PathElem;
use crate::value::Value;
use crate::valueobject::Object;

impl Value {
  /// Serializes the tree using the global default options overridden by
  /// ```atoms```.
  ///
  /// ```
  /// use jsonvalue::{OptAtom, Value};
  ///
  /// let v: Value = r#"{"b":1,"a":"</>"}"#.parse().unwrap();
  /// let s = v.marshal_string(&[OptAtom::default_string_sequence(), OptAtom::escape_html(false)]).unwrap();
  /// assert_eq!(s, r#"{"a":"<\/>","b":1}"#);
  /// ```
  pub fn marshal(&self, atoms: &[OptAtom]) -> Result<Vec<u8>> {
    let opt = Opt::combine(atoms);
    self.marshal_with(&opt)
  }

  pub fn marshal_string(&self, atoms: &[OptAtom]) -> Result<String> {
    let b = self.marshal(atoms)?;
    String::from_utf8(b).map_err(|e| Error::IllegalString(e.to_string()))
  }

  /// Serializes with an already combined ```Opt```.
  pub fn marshal_with(&self, opt: &Opt) -> Result<Vec<u8>> {
    if !self.is_exist() {
      return Err(Error::ValueUninitialized("cannot marshal a NotExist value".to_string()));
    }
    let mut m = Marshaller {
      opt,
      table: EscapeTable::compile(opt.escape_html, opt.escape_slash, opt.utf8),
      buf: Buffer::new(),
      track_path: matches!(opt.key_order, KeyOrder::Less(_)),
      path: Vec::new(),
    };
    m.write_value(self, 0)?;
    Ok(m.buf.into_bytes())
  }

  pub fn must_marshal(&self, atoms: &[OptAtom]) -> Vec<u8> {
    match self.marshal(atoms) {
      Ok(b) => b,
      Err(e) => panic!("must_marshal: {}", e),
    }
  }

  pub fn must_marshal_string(&self, atoms: &[OptAtom]) -> String {
    match self.marshal_string(atoms) {
      Ok(s) => s,
      Err(e) => panic!("must_marshal_string: {}", e),
    }
  }
}

struct Marshaller<'o> {
  opt: &'o Opt,
  table: EscapeTable,
  buf: Buffer,
  /// Only maintained for comparator ordering, which receives the parent path.
  track_path: bool,
  path: Vec<PathElem>,
}

fn check_replacement(f: f64, what: &str) -> Result<f64> {
  if f.is_nan() || f.is_infinite() {
    return Err(Error::UnsupportedFloatInOpt(format!("{} replacement {} is not a finite number", what, f)));
  }
  Ok(f)
}

impl<'o> Marshaller<'o> {
  fn newline(&mut self, depth: usize) {
    if let Some((prefix, indent)) = &self.opt.indent {
      self.buf.push_byte(b'\n');
      self.buf.push_str(prefix);
      self.buf.push_repeated(indent, depth);
    }
  }

  fn write_value(&mut self, v: &Value, depth: usize) -> Result<()> {
    match v {
      Value::NotExist => Err(Error::ValueUninitialized("NotExist found inside a tree".to_string())),
      Value::Null => {
        self.buf.push_str("null");
        Ok(())
      }
      Value::Bool(b) => {
        self.buf.push_str(if *b { "true" } else { "false" });
        Ok(())
      }
      Value::Number(n) => self.write_number(n),
      Value::String(s) => {
        self.table.write_quoted(s, &mut self.buf);
        Ok(())
      }
      Value::Array(a) => self.write_array(a, depth),
      Value::Object(o) => self.write_object(o, depth),
    }
  }

  fn write_number(&mut self, n: &Number) -> Result<()> {
    if n.is_nan() {
      match &self.opt.nan {
        FloatNaNPolicy::Error => return Err(Error::UnsupportedFloat("NaN".to_string())),
        FloatNaNPolicy::ToFloat(f) => {
          let f = check_replacement(*f, "NaN")?;
          self.buf.push_str(&format_float(f, 'g', -1, 64));
        }
        FloatNaNPolicy::Null => self.buf.push_str("null"),
        FloatNaNPolicy::ToString(s) => self.table.write_quoted(s, &mut self.buf),
      }
      return Ok(());
    }
    if n.is_inf() {
      let positive = n.as_f64() > 0.0;
      match &self.opt.inf {
        FloatInfPolicy::Error => return Err(Error::UnsupportedFloat(n.as_str().to_string())),
        FloatInfPolicy::ToFloat(f) => {
          let f = check_replacement(*f, "Inf")?;
          let f = if positive { f } else { -f };
          self.buf.push_str(&format_float(f, 'g', -1, 64));
        }
        FloatInfPolicy::Null => self.buf.push_str("null"),
        FloatInfPolicy::ToString { positive: p, negative: m } => {
          let s = if positive { p } else { m };
          self.table.write_quoted(s, &mut self.buf);
        }
      }
      return Ok(());
    }
    self.buf.push_str(n.as_str());
    Ok(())
  }

  fn write_array(&mut self, a: &[Value], depth: usize) -> Result<()> {
    if a.is_empty() {
      self.buf.push_str("[]");
      return Ok(());
    }
    self.buf.push_byte(b'[');
    for (i, child) in a.iter().enumerate() {
      if i > 0 {
        self.buf.push_byte(b',');
      }
      self.newline(depth + 1);
      if self.track_path {
        self.path.push(PathElem::Index(i as isize));
      }
      self.write_value(child, depth + 1)?;
      if self.track_path {
        self.path.pop();
      }
    }
    self.newline(depth);
    self.buf.push_byte(b']');
    Ok(())
  }

  fn write_object(&mut self, o: &Object, depth: usize) -> Result<()> {
    let mut members = self.ordered_members(o);
    if self.opt.omit_null {
      members.retain(|(_, v)| !v.is_null());
    }
    if members.is_empty() {
      self.buf.push_str("{}");
      return Ok(());
    }
    self.buf.push_byte(b'{');
    for (i, (k, child)) in members.into_iter().enumerate() {
      if i > 0 {
        self.buf.push_byte(b',');
      }
      self.newline(depth + 1);
      self.table.write_quoted(k, &mut self.buf);
      self.buf.push_byte(b':');
      if self.opt.indent.is_some() {
        self.buf.push_byte(b' ');
      }
      if self.track_path {
        self.path.push(PathElem::Key(k.to_string()));
      }
      self.write_value(child, depth + 1)?;
      if self.track_path {
        self.path.pop();
      }
    }
    self.newline(depth);
    self.buf.push_byte(b'}');
    Ok(())
  }

  fn ordered_members<'a>(&self, o: &'a Object) -> Vec<(&'a str, &'a Value)> {
    match &self.opt.key_order {
      KeyOrder::Default => o.iter().collect(),
      KeyOrder::SetSequence => o.iter_by_set_sequence(),
      KeyOrder::Dictionary => {
        let mut members: Vec<(&str, &Value)> = o.iter().collect();
        members.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        members
      }
      KeyOrder::Keys(keys) => {
        let mut members: Vec<(&str, &Value)> = Vec::with_capacity(o.len());
        let mut listed: HashSet<&str> = HashSet::new();
        for k in keys {
          if let Some((key, v)) = o.get_key_value(k) {
            if listed.insert(key) {
              members.push((key, v));
            }
          }
        }
        members.extend(o.iter().filter(|(k, _)| !listed.contains(k)));
        members
      }
      KeyOrder::Less(less) => {
        let parent = ParentInfo { key_path: self.path.clone() };
        let mut members: Vec<(&str, &Value)> = o.iter().collect();
        members.sort_by(|a, b| {
          if less(&parent, a.0, b.0, a.1, b.1) {
            core::cmp::Ordering::Less
          } else if less(&parent, b.0, a.0, b.1, a.1) {
            core::cmp::Ordering::Greater
          } else {
            core::cmp::Ordering::Equal
          }
        });
        members
      }
    }
  }
}
