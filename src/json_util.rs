//! Single pass JSON parser.
//!
//! The parser walks a mutable byte buffer once. String escapes are decoded in
//! place: the write cursor never overtakes the read cursor, so the decoded
//! text simply overwrites the escaped text behind it. Callers handing over an
//! immutable input go through [`unmarshal`], which copies into a scratch
//! buffer first.

use core::str::FromStr;

use crate::error::{Error, Result};
use crate::number;
use crate::value::Value;
use crate::valueobject::Object;

/// Containers nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 200;

// --- Entry points ---

/// Parses ```b``` into a new tree. The input is left untouched.
///
/// ```
/// let v = jsonvalue::unmarshal(br#"{"a":[1,2]}"#).unwrap();
/// assert_eq!(v.len(), 1);
/// ```
pub fn unmarshal(b: &[u8]) -> Result<Value> {
  let mut scratch = b.to_vec();
  unmarshal_no_copy(&mut scratch)
}

pub fn unmarshal_string(s: &str) -> Result<Value> {
  unmarshal(s.as_bytes())
}

/// Parses ```b``` in place. On return (success or failure) the buffer holds
/// partially rewritten bytes and should be treated as garbage.
pub fn unmarshal_no_copy(b: &mut [u8]) -> Result<Value> {
  let mut p = Parser { b, pos: 0, depth: 0 };
  let result = p.parse_document();
  if let Err(e) = &result {
    log::debug!("unmarshal failed: {}", e);
  }
  result
}

/// Like ```unmarshal``` but panics on malformed input.
pub fn must_unmarshal(b: &[u8]) -> Value {
  match unmarshal(b) {
    Ok(v) => v,
    Err(e) => panic!("must_unmarshal: {}", e),
  }
}

pub fn must_unmarshal_string(s: &str) -> Value {
  match unmarshal_string(s) {
    Ok(v) => v,
    Err(e) => panic!("must_unmarshal_string: {}", e),
  }
}

impl FromStr for Value {
  type Err = Error;

  fn from_str(s: &str) -> Result<Value> {
    unmarshal_string(s)
  }
}

// --- String scanner ---

fn hex4(b: &[u8], at: usize) -> Result<u32> {
  let Some(digits) = b.get(at..at + 4) else {
    return Err(Error::IllegalString("truncated \\u escape".to_string()).at(at));
  };
  let mut code = 0u32;
  for d in digits {
    let v = match d {
      b'0'..=b'9' => d - b'0',
      b'a'..=b'f' => d - b'a' + 10,
      b'A'..=b'F' => d - b'A' + 10,
      _ => return Err(Error::IllegalString("invalid hex digit in \\u escape".to_string()).at(at)),
    };
    code = (code << 4) | u32::from(v);
  }
  Ok(code)
}

fn utf8_len(lead: u8) -> Option<usize> {
  match lead {
    0xC0..=0xDF => Some(2),
    0xE0..=0xEF => Some(3),
    0xF0..=0xF7 => Some(4),
    _ => None,
  }
}

/// Decodes the string whose opening quote sits at ```offset```, rewriting
/// ```b``` in place.
///
/// Returns ```(bytes_written, end)```: the decoded text occupies
/// ```b[offset + 1 .. offset + 1 + bytes_written]``` and ```end``` is the offset
/// just past the closing quote.
pub fn parse_string_in_place(b: &mut [u8], offset: usize) -> Result<(usize, usize)> {
  let start = offset + 1;
  let mut r = start;
  let mut w = start;
  let mut escapes = 0usize;

  loop {
    let Some(&c) = b.get(r) else {
      return Err(Error::IllegalString("unterminated string".to_string()).at(offset));
    };
    match c {
      b'"' => {
        if escapes > 0 {
          log::trace!("decoded {} escapes in place for string at offset {}", escapes, offset);
        }
        return Ok((w - start, r + 1));
      }
      b'\\' => {
        escapes += 1;
        let Some(&e) = b.get(r + 1) else {
          return Err(Error::IllegalString("unterminated string".to_string()).at(offset));
        };
        let literal = match e {
          b'"' | b'\'' | b'/' | b'\\' => Some(e),
          b'b' => Some(0x08),
          b'f' => Some(0x0C),
          b'r' => Some(b'\r'),
          b'n' => Some(b'\n'),
          b't' => Some(b'\t'),
          b'u' => None,
          _ => return Err(Error::IllegalString(format!("unrecognized escape '\\{}'", e as char)).at(r)),
        };
        if let Some(l) = literal {
          b[w] = l;
          w += 1;
          r += 2;
          continue;
        }

        let hi = hex4(b, r + 2)?;
        let (code, consumed) = match hi {
          0xD800..=0xDBFF => {
            if b.get(r + 6) != Some(&b'\\') || b.get(r + 7) != Some(&b'u') {
              return Err(Error::IllegalString("high surrogate without low surrogate".to_string()).at(r));
            }
            let lo = hex4(b, r + 8)?;
            if !(0xDC00..=0xDFFF).contains(&lo) {
              return Err(Error::IllegalString("high surrogate followed by non-low surrogate".to_string()).at(r));
            }
            (((hi - 0xD800) << 10) + (lo - 0xDC00) + 0x10000, 12)
          }
          0xDC00..=0xDFFF => {
            return Err(Error::IllegalString("lone low surrogate".to_string()).at(r));
          }
          _ => (hi, 6),
        };
        let ch = char::from_u32(code)
          .ok_or_else(|| Error::IllegalString(format!("invalid code point {:#X}", code)).at(r))?;
        let mut tmp = [0u8; 4];
        let encoded = ch.encode_utf8(&mut tmp).as_bytes();
        b[w..w + encoded.len()].copy_from_slice(encoded);
        w += encoded.len();
        r += consumed;
      }
      0x00..=0x1F => {
        return Err(Error::IllegalString("control character in string".to_string()).at(r));
      }
      0x20..=0x7F => {
        b[w] = c;
        w += 1;
        r += 1;
      }
      _ => {
        let Some(n) = utf8_len(c) else {
          return Err(Error::IllegalString("invalid UTF-8 leading byte".to_string()).at(r));
        };
        let Some(seq) = b.get(r..r + n) else {
          return Err(Error::IllegalString("truncated UTF-8 sequence".to_string()).at(r));
        };
        if core::str::from_utf8(seq).is_err() {
          return Err(Error::IllegalString("invalid UTF-8 sequence".to_string()).at(r));
        }
        b.copy_within(r..r + n, w);
        w += n;
        r += n;
      }
    }
  }
}

// --- Parser ---

struct Parser<'a> {
  b: &'a mut [u8],
  pos: usize,
  depth: usize,
}

impl<'a> Parser<'a> {
  fn skip_whitespace(&mut self) {
    while let Some(c) = self.b.get(self.pos) {
      match c {
        b' ' | b'\r' | b'\n' | b'\t' | 0x08 => self.pos += 1,
        _ => break,
      }
    }
  }

  fn peek(&self) -> Option<u8> {
    self.b.get(self.pos).copied()
  }

  fn parse_document(&mut self) -> Result<Value> {
    self.skip_whitespace();
    if self.peek().is_none() {
      return Err(Error::RawBytesUnrecognized("empty input".to_string()).at(self.pos));
    }
    let v = self.parse_value()?;
    self.skip_whitespace();
    if self.pos < self.b.len() {
      return Err(Error::RawBytesUnrecognized("unexpected trailing bytes".to_string()).at(self.pos));
    }
    Ok(v)
  }

  fn parse_value(&mut self) -> Result<Value> {
    let Some(c) = self.peek() else {
      return Err(Error::RawBytesUnrecognized("unexpected end of input".to_string()).at(self.pos));
    };
    match c {
      b'{' => self.parse_object(),
      b'[' => self.parse_array(),
      b'-' | b'0'..=b'9' => {
        let scanned = number::scan_number(self.b, self.pos)?;
        self.pos = scanned.end;
        Ok(Value::Number(scanned.number))
      }
      b'"' => Ok(Value::String(self.parse_string()?)),
      b't' => self.parse_literal(b"true", Value::Bool(true), Error::NotValidBoolValue),
      b'f' => self.parse_literal(b"false", Value::Bool(false), Error::NotValidBoolValue),
      b'n' => self.parse_literal(b"null", Value::Null, Error::NotValidNullValue),
      _ => Err(Error::RawBytesUnrecognized(format!("unexpected byte {:#04x}", c)).at(self.pos)),
    }
  }

  fn parse_literal(&mut self, word: &[u8], v: Value, kind: fn(String) -> Error) -> Result<Value> {
    if self.b.get(self.pos..self.pos + word.len()) != Some(word) {
      return Err(kind(format!("expected '{}'", String::from_utf8_lossy(word))).at(self.pos));
    }
    self.pos += word.len();
    Ok(v)
  }

  fn parse_string(&mut self) -> Result<String> {
    let (written, end) = parse_string_in_place(self.b, self.pos)?;
    let body = &self.b[self.pos + 1..self.pos + 1 + written];
    let s = core::str::from_utf8(body)
      .map_err(|e| Error::IllegalString(e.to_string()).at(self.pos))?
      .to_string();
    self.pos = end;
    Ok(s)
  }

  fn enter(&mut self) -> Result<()> {
    self.depth += 1;
    if self.depth > MAX_DEPTH {
      return Err(Error::RawBytesUnrecognized(format!("nesting deeper than {}", MAX_DEPTH)).at(self.pos));
    }
    Ok(())
  }

  fn parse_object(&mut self) -> Result<Value> {
    let open = self.pos;
    self.enter()?;
    self.pos += 1;

    let mut obj = Object::new();
    let mut key: Option<String> = None;
    let mut colon_seen = false;
    let mut need_comma = false;
    let mut after_comma = false;
    let fail = |m: &str, at: usize| -> Result<Value> { Err(Error::NotObjectValue(m.to_string()).at(at)) };

    loop {
      self.skip_whitespace();
      let at = self.pos;
      let Some(c) = self.peek() else {
        return fail("cannot find '}'", open);
      };
      match c {
        b'}' => {
          if key.is_some() {
            return fail(if colon_seen { "missing value" } else { "missing colon" }, at);
          }
          if after_comma {
            return fail("missing key", at);
          }
          self.pos += 1;
          self.depth -= 1;
          return Ok(Value::Object(obj));
        }
        b',' => {
          if key.is_some() {
            return fail(if colon_seen { "missing value" } else { "missing colon" }, at);
          }
          if !need_comma {
            return fail("missing key", at);
          }
          need_comma = false;
          after_comma = true;
          self.pos += 1;
        }
        b':' => {
          if key.is_none() {
            return fail("missing key", at);
          }
          if colon_seen {
            return fail("duplicate colon", at);
          }
          colon_seen = true;
          self.pos += 1;
        }
        b'"' if key.is_none() => {
          if need_comma {
            return fail("missing comma", at);
          }
          key = Some(self.parse_string()?);
        }
        _ => {
          let Some(k) = key.take() else {
            return fail(if need_comma { "missing comma" } else { "missing key" }, at);
          };
          if !colon_seen {
            return fail("missing colon", at);
          }
          let v = self.parse_value()?;
          obj.set(&k, v);
          colon_seen = false;
          need_comma = true;
          after_comma = false;
        }
      }
    }
  }

  fn parse_array(&mut self) -> Result<Value> {
    let open = self.pos;
    self.enter()?;
    self.pos += 1;

    let mut arr: Vec<Value> = Vec::new();
    let mut need_comma = false;
    let mut after_comma = false;
    let fail = |m: &str, at: usize| -> Result<Value> { Err(Error::NotArrayValue(m.to_string()).at(at)) };

    loop {
      self.skip_whitespace();
      let at = self.pos;
      let Some(c) = self.peek() else {
        return fail("cannot find ']'", open);
      };
      match c {
        b']' => {
          if after_comma {
            return fail("missing value", at);
          }
          self.pos += 1;
          self.depth -= 1;
          return Ok(Value::Array(arr));
        }
        b',' => {
          if !need_comma {
            return fail("missing value", at);
          }
          need_comma = false;
          after_comma = true;
          self.pos += 1;
        }
        _ => {
          if need_comma {
            return fail("missing comma", at);
          }
          arr.push(self.parse_value()?);
          need_comma = true;
          after_comma = false;
        }
      }
    }
  }
}
