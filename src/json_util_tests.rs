use crate::error::Error;
use crate::json_util::{must_unmarshal, unmarshal, unmarshal_no_copy, unmarshal_string, MAX_DEPTH};
use crate::path;
use crate::value::{Value, ValueType};

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn parse(s: &str) -> Value {
    unmarshal_string(s).unwrap()
  }

  fn parse_err(s: &str) -> Error {
    unmarshal_string(s).unwrap_err()
  }

  // --- Scalars and literals ---

  #[test]
  fn test_scalars() {
    assert_eq!(parse("null").value_type(), ValueType::Null);
    assert!(parse("true").bool());
    assert!(!parse(" false ").bool());
    assert_eq!(parse("-12").int(), -12);
    assert_eq!(parse("\"hi\"").string(), "hi");
    assert_eq!(parse("[]").len(), 0);
    assert_eq!(parse("{}").value_type(), ValueType::Object);
  }

  #[test]
  fn test_backspace_is_whitespace() {
    let v = parse("\u{8}\n [1,\u{8}2] \t\r");
    assert_eq!(v.len(), 2);
  }

  #[test_case("tru")]
  #[test_case("trUe")]
  #[test_case("fals")]
  fn test_bad_bool(s: &str) {
    assert!(matches!(parse_err(s), Error::NotValidBoolValue(_)));
  }

  #[test]
  fn test_bad_null() {
    assert!(matches!(parse_err("nul"), Error::NotValidNullValue(_)));
    assert!(matches!(parse_err("[nil]"), Error::NotValidNullValue(_)));
  }

  #[test_case("")]
  #[test_case("   ")]
  #[test_case("x")]
  #[test_case("1 2")]
  #[test_case("{} {}")]
  #[test_case("truex")]
  #[test_case("'a'")]
  fn test_unrecognized(s: &str) {
    assert!(matches!(parse_err(s), Error::RawBytesUnrecognized(_)), "{:?}", s);
  }

  // --- Numbers ---

  #[test_case("0")]
  #[test_case("-1")]
  #[test_case("1234567890")]
  #[test_case("9223372036854775807")]
  #[test_case("-9223372036854775808")]
  #[test_case("18446744073709551615")]
  #[test_case("1.5e300")]
  #[test_case("-0.000001")]
  #[test_case("5.456067032277228e-19")]
  fn test_number_text_is_kept(s: &str) {
    let v = parse(s);
    assert_eq!(v.marshal_string(&[]).unwrap(), s);
    assert_eq!(v.float64(), s.parse::<f64>().unwrap());
  }

  #[test_case("-9223372036854775809")]
  #[test_case("18446744073709551616")]
  #[test_case("99999999999999999999")]
  #[test_case("123456789012345678901234")]
  #[test_case("01")]
  #[test_case("-")]
  #[test_case("1.")]
  #[test_case("[1e]")]
  fn test_number_rejected(s: &str) {
    assert!(matches!(parse_err(s), Error::NotValidNumberValue(_)), "{:?}", s);
  }

  #[test]
  fn test_above_int64_max() {
    let v = parse("9223372036854775808");
    assert!(v.greater_than_int64_max());
    assert_eq!(v.uint64(), 9223372036854775808);
  }

  // --- Strings ---

  #[test]
  fn test_string_escapes() {
    let v = parse(r#""\"\\\/\b\f\n\r\t中😀\'""#);
    assert_eq!(v.string(), "\"\\/\u{8}\u{c}\n\r\t中😀'");
  }

  #[test]
  fn test_raw_utf8_is_copied() {
    let v = parse("\"aé中😀z\"");
    assert_eq!(v.string(), "aé中😀z");
  }

  #[test_case(r#""\ud800""#)]
  #[test_case(r#""\ud800x""#)]
  #[test_case(r#""\ud800A""#)]
  #[test_case(r#""\udc00""#)]
  #[test_case(r#""\u12""#)]
  #[test_case(r#""\uZZZZ""#)]
  #[test_case(r#""\x""#)]
  #[test_case("\"abc")]
  #[test_case("\"abc\\")]
  #[test_case("\"a\tb\"")]
  #[test_case("\"\u{1}\"")]
  fn test_illegal_string(s: &str) {
    assert!(matches!(parse_err(s), Error::IllegalString(_)), "{:?}", s);
  }

  #[test]
  fn test_invalid_utf8_bytes() {
    for b in [&b"\"\xe4\xb8\""[..], &b"\"\xe4"[..], &b"\"\xff\""[..], &b"\"\xc0\x80\""[..]] {
      assert!(matches!(unmarshal(b), Err(Error::IllegalString(_))), "{:?}", b);
    }
  }

  #[test]
  fn test_no_copy_rewrites_input() {
    let mut buf = br#"{"k":"a\nb"}"#.to_vec();
    let v = unmarshal_no_copy(&mut buf).unwrap();
    assert_eq!(v.get(path!["k"]).unwrap().string(), "a\nb");
    assert_ne!(buf, br#"{"k":"a\nb"}"#.to_vec());

    let original = br#"{"k":"a\nb"}"#;
    let _ = unmarshal(original).unwrap();
    assert_eq!(original, br#"{"k":"a\nb"}"#);
  }

  // --- Containers ---

  #[test_case(r#"{"a"::1}"#, "duplicate colon")]
  #[test_case(r#"{:1}"#, "missing key")]
  #[test_case(r#"{1}"#, "missing key")]
  #[test_case(r#"{"a" 1}"#, "missing colon")]
  #[test_case(r#"{"a"}"#, "missing colon")]
  #[test_case(r#"{"a":}"#, "missing value")]
  #[test_case(r#"{"a":,"b":1}"#, "missing value")]
  #[test_case(r#"{"a":1"#, "cannot find '}'")]
  #[test_case(r#"{"a":1,}"#, "missing key")]
  #[test_case(r#"{"a":1 "b":2}"#, "missing comma")]
  fn test_object_errors(s: &str, want: &str) {
    match parse_err(s) {
      Error::NotObjectValue(m) => assert!(m.starts_with(want), "{:?}: {}", s, m),
      other => panic!("{:?}: unexpected {:?}", s, other),
    }
  }

  #[test_case("[1,]", "missing value")]
  #[test_case("[,1]", "missing value")]
  #[test_case("[1 2]", "missing comma")]
  #[test_case("[1", "cannot find ']'")]
  fn test_array_errors(s: &str, want: &str) {
    match parse_err(s) {
      Error::NotArrayValue(m) => assert!(m.starts_with(want), "{:?}: {}", s, m),
      other => panic!("{:?}: unexpected {:?}", s, other),
    }
  }

  #[test]
  fn test_error_offsets() {
    assert_eq!(parse_err("[1, x]").to_string(), "unrecognized raw bytes: unexpected byte 0x78 at offset 4");
  }

  #[test]
  fn test_duplicate_keys_last_wins() {
    let v = parse(r#"{"a":1,"b":2,"a":3}"#);
    assert_eq!(v.len(), 2);
    assert_eq!(v.get(path!["a"]).unwrap().int(), 3);
    let mut keys = Vec::new();
    v.range_objects_by_set_sequence(|k, _| {
      keys.push(k.to_string());
      true
    });
    assert_eq!(keys, vec!["b", "a"]);
  }

  #[test]
  fn test_nesting_limit() {
    let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
    assert!(unmarshal_string(&ok).is_ok());
    let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
    assert!(matches!(parse_err(&deep), Error::RawBytesUnrecognized(_)));
  }

  #[test]
  fn test_nesting_limit_with_objects() {
    let ok = format!("{}1{}", r#"{"k":"#.repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
    let v = unmarshal_string(&ok).unwrap();
    assert_eq!(v.marshal_string(&[]).unwrap(), ok);
    let deep = format!("[{}1{}]", r#"{"k":"#.repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
    assert!(matches!(parse_err(&deep), Error::RawBytesUnrecognized(_)));
  }

  // --- Scenarios ---

  #[test]
  fn test_get_last_of_array() {
    let v = parse(r#"{"data":{"message":["hello","world",true,null]}}"#);
    assert!(v.get(path!["data", "message", -1]).unwrap().is_null());
  }

  #[test]
  fn test_float_text_survives() {
    let v = parse(r#"{"tunnels":[{"metrics":{"conns":{"rate1":5.456067032277228e-19}}}]}"#);
    assert_eq!(v.get(path!["tunnels", 0, "metrics", "conns", "rate1"]).unwrap().string(), "5.456067032277228e-19");
  }

  #[test_case(r#"{"a":[1,2.5,-3e-7,"x\u0000y"],"b":{"c":null,"d":true,"e":{}}}"#)]
  #[test_case(r#"["<a href=\"/x\">&amp;</a>","  ","😀",[[[]]]]"#)]
  #[test_case(r#""\u007f\u001f""#)]
  #[test_case("18446744073709551615")]
  fn test_round_trip(s: &str) {
    let first = parse(s);
    let text = first.marshal(&[]).unwrap();
    let second = unmarshal(&text).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn test_from_str() {
    let v: Value = "[1,2]".parse().unwrap();
    assert_eq!(v.len(), 2);
    assert!("[1,".parse::<Value>().is_err());
  }

  #[test]
  #[should_panic]
  fn test_must_unmarshal_panics() {
    must_unmarshal(b"{");
  }
}
