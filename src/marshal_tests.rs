use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::json_util::unmarshal_string;
use crate::options::{reset_default_marshal_options, set_default_marshal_options, KeyOrder, Opt, OptAtom};
use crate::path::PathElem;
use crate::value::Value;

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn parse(s: &str) -> Value {
    unmarshal_string(s).unwrap()
  }

  fn ordered(v: &Value) -> String {
    v.marshal_string(&[OptAtom::set_sequence()]).unwrap()
  }

  // --- Strings ---

  #[test]
  fn test_all_ascii_default_escapes() {
    for b in 0u8..128 {
      let s = (b as char).to_string();
      let want = match b {
        b'"' => "\\\"".to_string(),
        b'\\' => "\\\\".to_string(),
        b'/' => "\\/".to_string(),
        0x08 => "\\b".to_string(),
        0x09 => "\\t".to_string(),
        0x0A => "\\n".to_string(),
        0x0C => "\\f".to_string(),
        0x0D => "\\r".to_string(),
        0x00..=0x1F | 0x7F | b'<' | b'>' | b'&' => format!("\\u{:04X}", b),
        _ => s.clone(),
      };
      assert_eq!(Value::new_string(s).marshal_string(&[]).unwrap(), format!("\"{}\"", want), "byte {:#04x}", b);
    }
  }

  #[test_case('\u{2028}', "\"\\u2028\"", "\"\\u2028\"")]
  #[test_case('\u{2029}', "\"\\u2029\"", "\"\\u2029\"")]
  #[test_case('\u{10000}', "\"\\uD800\\uDC00\"", "\"\u{10000}\"")]
  #[test_case('\u{2F804}', "\"\\uD87E\\uDC04\"", "\"\u{2F804}\"")]
  fn test_non_ascii_escapes(c: char, escaped: &str, utf8: &str) {
    let v = Value::new_string(c.to_string());
    assert_eq!(v.marshal_string(&[]).unwrap(), escaped);
    assert_eq!(v.marshal_string(&[OptAtom::utf8()]).unwrap(), utf8);
  }

  #[test]
  fn test_html_and_slash_switches() {
    let v = Value::new_string("<a href='/'>&</a>");
    assert_eq!(
      v.marshal_string(&[OptAtom::escape_html(false), OptAtom::escape_slash(false)]).unwrap(),
      "\"<a href='/'>&</a>\""
    );
    assert_eq!(
      v.marshal_string(&[OptAtom::escape_slash(false)]).unwrap(),
      "\"\\u003Ca href='/'\\u003E\\u0026\\u003C/a\\u003E\""
    );
  }

  // --- Key order ---

  #[test]
  fn test_set_sequence() {
    let mut v = Value::new_object();
    for k in ["c", "a", "b"] {
      v.set(k).at(&[PathElem::from(k)]).unwrap();
    }
    assert_eq!(ordered(&v), r#"{"c":"c","a":"a","b":"b"}"#);
    v.set(1).at(&[PathElem::from("c")]).unwrap();
    assert_eq!(ordered(&v), r#"{"a":"a","b":"b","c":1}"#);
  }

  #[test]
  fn test_key_sequence() {
    let v = parse(r#"{"a":1,"b":2,"c":3}"#);
    let s = v.marshal_string(&[OptAtom::key_sequence(&["c", "missing", "a", "c"])]).unwrap();
    assert_eq!(s, r#"{"c":3,"a":1,"b":2}"#);
  }

  #[test]
  fn test_dictionary_order() {
    let v = parse(r#"{"b":{"z":1,"y":2},"B":0,"a":[{"d":1,"c":2}]}"#);
    let s = v.marshal_string(&[OptAtom::default_string_sequence()]).unwrap();
    assert_eq!(s, r#"{"B":0,"a":[{"c":2,"d":1}],"b":{"y":2,"z":1}}"#);
  }

  #[test]
  fn test_less_func_sees_parent_path() {
    let seen: Arc<Mutex<Vec<Vec<PathElem>>>> = Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();
    let less = OptAtom::key_sequence_with_less_func(move |parent, a, b, _, _| {
      if let Ok(mut s) = record.lock() {
        if !s.contains(&parent.key_path) {
          s.push(parent.key_path.clone());
        }
      }
      a > b
    });
    let v = parse(r#"{"x":[{"p":1,"q":2}],"w":0}"#);
    assert_eq!(v.marshal_string(&[less]).unwrap(), r#"{"x":[{"q":2,"p":1}],"w":0}"#);

    let seen = seen.lock().unwrap();
    assert!(seen.contains(&vec![]));
    assert!(seen.contains(&vec![PathElem::from("x"), PathElem::from(0)]));
  }

  #[test]
  fn test_last_order_option_wins() {
    let v = parse(r#"{"b":1,"a":2}"#);
    let s = v.marshal_string(&[OptAtom::key_sequence(&["b", "a"]), OptAtom::default_string_sequence()]).unwrap();
    assert_eq!(s, r#"{"a":2,"b":1}"#);
  }

  // --- Layout ---

  #[test]
  fn test_omit_null() {
    let v = parse(r#"{"a":null,"b":[null],"c":{"d":null}}"#);
    assert_eq!(
      v.marshal_string(&[OptAtom::set_sequence(), OptAtom::omit_null(true)]).unwrap(),
      r#"{"b":[null],"c":{}}"#
    );
    assert_eq!(ordered(&v), r#"{"a":null,"b":[null],"c":{"d":null}}"#);
  }

  #[test]
  fn test_indent() {
    let v = parse(r#"{"a":[1,2],"b":{},"c":[]}"#);
    let s = v.marshal_string(&[OptAtom::set_sequence(), OptAtom::indent("", "  ")]).unwrap();
    assert_eq!(s, "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {},\n  \"c\": []\n}");

    let v = parse(r#"{"a":1}"#);
    let s = v.marshal_string(&[OptAtom::indent(">", "\t")]).unwrap();
    assert_eq!(s, "{\n>\t\"a\": 1\n>}");
  }

  // --- Special floats ---

  #[test]
  fn test_nan_to_null() {
    let v = Value::new_float64(f64::NAN);
    assert_eq!(v.marshal_string(&[OptAtom::float_nan_to_null()]).unwrap(), "null");
  }

  #[test]
  fn test_special_floats_fail_by_default() {
    assert!(matches!(Value::new_float64(f64::NAN).marshal(&[]), Err(Error::UnsupportedFloat(_))));
    assert!(matches!(Value::new_float64(f64::INFINITY).marshal(&[]), Err(Error::UnsupportedFloat(_))));
    let mut v = Value::new_array();
    v.append(f64::NEG_INFINITY).in_the_end(&[]).unwrap();
    assert!(matches!(v.marshal(&[]), Err(Error::UnsupportedFloat(_))));
  }

  #[test_case(OptAtom::float_nan_to_float(1.5), "1.5")]
  #[test_case(OptAtom::float_nan_to_string_nan(), "\"NaN\"")]
  #[test_case(OptAtom::float_nan_to_string("n/a"), "\"n\\/a\"")]
  fn test_nan_policies(atom: OptAtom, want: &str) {
    assert_eq!(Value::new_float64(f64::NAN).marshal_string(&[atom]).unwrap(), want);
  }

  #[test_case(OptAtom::float_inf_to_float(1e300), "1e+300", "-1e+300")]
  #[test_case(OptAtom::float_inf_to_null(), "null", "null")]
  #[test_case(OptAtom::float_inf_to_string_inf(), "\"+Inf\"", "\"-Inf\"")]
  #[test_case(OptAtom::float_inf_to_string("Infinity", ""), "\"Infinity\"", "\"-Infinity\"")]
  #[test_case(OptAtom::float_inf_to_string("big", "small"), "\"big\"", "\"small\"")]
  fn test_inf_policies(atom: OptAtom, positive: &str, negative: &str) {
    let atoms = [atom];
    assert_eq!(Value::new_float64(f64::INFINITY).marshal_string(&atoms).unwrap(), positive);
    assert_eq!(Value::new_float32(f32::NEG_INFINITY).marshal_string(&atoms).unwrap(), negative);
  }

  #[test]
  fn test_invalid_replacement() {
    let nan = Value::new_float64(f64::NAN);
    assert!(matches!(nan.marshal(&[OptAtom::float_nan_to_float(f64::NAN)]), Err(Error::UnsupportedFloatInOpt(_))));
    let inf = Value::new_float64(f64::INFINITY);
    assert!(matches!(
      inf.marshal(&[OptAtom::float_inf_to_float(f64::INFINITY)]),
      Err(Error::UnsupportedFloatInOpt(_))
    ));
  }

  // --- Misc ---

  #[test]
  fn test_programmatic_numbers() {
    let mut v = Value::new_array();
    v.append(Value::new_float64f(3.14159, 'f', 2)).in_the_end(&[]).unwrap();
    v.append(Value::new_float32(0.1)).in_the_end(&[]).unwrap();
    v.append(Value::new_uint64(u64::MAX)).in_the_end(&[]).unwrap();
    v.append(Value::new_float64(1e21)).in_the_end(&[]).unwrap();
    v.append(Value::new_bytes(b"hi")).in_the_end(&[]).unwrap();
    assert_eq!(v.marshal_string(&[]).unwrap(), r#"[3.14,0.1,18446744073709551615,1e+21,"aGk="]"#);
  }

  #[test]
  fn test_not_exist_cannot_marshal() {
    assert!(matches!(Value::NotExist.marshal(&[]), Err(Error::ValueUninitialized(_))));
  }

  #[test]
  fn test_must_marshal() {
    assert_eq!(Value::new_bool(true).must_marshal_string(&[]), "true");
    assert_eq!(Value::new_null().must_marshal(&[]), b"null".to_vec());
  }

  #[test]
  fn test_global_default() {
    set_default_marshal_options(&[OptAtom::key_sequence(&["zz_global_second", "zz_global_first"])]);
    let v = parse(r#"{"zz_global_first":1,"zz_global_second":2}"#);
    assert_eq!(v.marshal_string(&[]).unwrap(), r#"{"zz_global_second":2,"zz_global_first":1}"#);
    reset_default_marshal_options();
    assert!(matches!(Opt::combine(&[]).key_order, KeyOrder::Default));
  }
}
