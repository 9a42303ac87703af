//! JSON numbers: the stored representation, the byte-level scanner and the
//! float formatter used for programmatically created numbers.

use crate::error::{Error, Result};

const MAX_UINT64_DIGITS: &[u8] = b"18446744073709551615";
const MIN_INT64_MAGNITUDE: &[u8] = b"9223372036854775808";

// --- Number ---

/// A JSON number together with the text it was read from (or formatted to).
///
/// All three numeric interpretations are kept. For integers the signed,
/// unsigned and float fields describe the same value whenever it fits; for
/// integers in `[2^63, 2^64)` ```u64``` is authoritative and ```i64``` holds
/// the two's-complement bit pattern. For floats ```f64``` is authoritative.
#[derive(Debug, Clone)]
pub struct Number {
  negative: bool,
  floated: bool,
  i64: i64,
  u64: u64,
  f64: f64,
  raw: String,
}

impl Number {
  pub fn from_i64(i: i64) -> Number {
    Number {
      negative: i < 0,
      floated: false,
      i64: i,
      u64: i as u64,
      f64: i as f64,
      raw: itoa::Buffer::new().format(i).to_string(),
    }
  }

  pub fn from_u64(u: u64) -> Number {
    Number {
      negative: false,
      floated: false,
      i64: u as i64,
      u64: u,
      f64: u as f64,
      raw: itoa::Buffer::new().format(u).to_string(),
    }
  }

  /// Creates a float using the shortest representation that round-trips.
  pub fn from_f64(f: f64) -> Number {
    Number::from_f64_format(f, 'g', -1)
  }

  /// Creates a float whose text is produced by ```format_float(f, fmt, prec, 64)```.
  pub fn from_f64_format(f: f64, fmt: char, prec: i32) -> Number {
    let raw = format_float(f, fmt, prec, 64);
    Number::float_with_raw(f, raw)
  }

  pub fn from_f32(f: f32) -> Number {
    Number::from_f32_format(f, 'g', -1)
  }

  pub fn from_f32_format(f: f32, fmt: char, prec: i32) -> Number {
    let raw = format_float(f as f64, fmt, prec, 32);
    Number::float_with_raw(f as f64, raw)
  }

  fn float_with_raw(f: f64, raw: String) -> Number {
    Number {
      negative: f.is_sign_negative() && !f.is_nan(),
      floated: true,
      i64: f as i64,
      u64: f as u64,
      f64: f,
      raw,
    }
  }

  // --- Accessors ---

  pub fn is_negative(&self) -> bool { self.negative }
  pub fn is_floated(&self) -> bool { self.floated }
  pub fn as_i64(&self) -> i64 { self.i64 }
  pub fn as_u64(&self) -> u64 { self.u64 }
  pub fn as_f64(&self) -> f64 { self.f64 }

  /// The lexical text of this number.
  pub fn as_str(&self) -> &str { &self.raw }

  /// Returns ```true``` if this is a non-negative integer above ```i64::MAX```.
  pub fn greater_than_int64_max(&self) -> bool {
    !self.negative && !self.floated && self.u64 > i64::MAX as u64
  }

  pub(crate) fn is_nan(&self) -> bool {
    self.floated && self.f64.is_nan()
  }

  pub(crate) fn is_inf(&self) -> bool {
    self.floated && self.f64.is_infinite()
  }
}

// --- Scanner ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
  Start,
  LeadingZero,
  LeadingNegative,
  LeadingDigit,
  IntegerDigit,
  Fraction,
  FractionDigit,
  Exponent,
  ExponentSign,
  ExponentDigit,
}

impl State {
  fn accepting(self) -> bool {
    matches!(
      self,
      State::LeadingZero | State::LeadingDigit | State::IntegerDigit | State::FractionDigit | State::ExponentDigit
    )
  }
}

/// Outcome of scanning one number.
#[derive(Debug)]
pub(crate) struct Scanned {
  pub number: Number,
  /// Offset one past the last consumed byte.
  pub end: usize,
  /// ```true``` when the number ran up to the end of the input.
  pub reached_end: bool,
}

fn invalid(msg: &str, offset: usize) -> Error {
  Error::NotValidNumberValue(msg.to_string()).at(offset)
}

/// Scans a JSON number starting at ```offset```.
///
/// The scan stops at the first byte that cannot continue the number; that
/// byte is left for the caller. Errors carry the offset of the bad byte.
pub(crate) fn scan_number(b: &[u8], offset: usize) -> Result<Scanned> {
  let mut state = State::Start;
  let mut floated = false;
  let mut i = offset;

  while i < b.len() {
    let c = b[i];
    let next = match (state, c) {
      (State::Start, b'-') => State::LeadingNegative,
      (State::Start, b'0') => State::LeadingZero,
      (State::Start, b'1'..=b'9') => State::LeadingDigit,
      (State::Start, _) => return Err(invalid("illegal leading byte of number", i)),

      (State::LeadingNegative, b'0') => State::LeadingZero,
      (State::LeadingNegative, b'1'..=b'9') => State::LeadingDigit,
      (State::LeadingNegative, _) => return Err(invalid("'-' must be followed by a digit", i)),

      (State::LeadingZero, b'.') => State::Fraction,
      (State::LeadingZero, b'e' | b'E') => State::Exponent,
      (State::LeadingZero, b'0'..=b'9') => return Err(invalid("leading zero followed by digit", i)),

      (State::LeadingDigit | State::IntegerDigit, b'0'..=b'9') => State::IntegerDigit,
      (State::LeadingDigit | State::IntegerDigit, b'.') => State::Fraction,
      (State::LeadingDigit | State::IntegerDigit, b'e' | b'E') => State::Exponent,

      (State::Fraction, b'0'..=b'9') => State::FractionDigit,
      (State::Fraction, _) => return Err(invalid("fraction requires a digit after '.'", i)),

      (State::FractionDigit, b'0'..=b'9') => State::FractionDigit,
      (State::FractionDigit, b'e' | b'E') => State::Exponent,

      (State::Exponent, b'+' | b'-') => State::ExponentSign,
      (State::Exponent, b'0'..=b'9') => State::ExponentDigit,
      (State::Exponent, _) => return Err(invalid("exponent requires a digit", i)),

      (State::ExponentSign, b'0'..=b'9') => State::ExponentDigit,
      (State::ExponentSign, _) => return Err(invalid("exponent sign requires a digit", i)),

      (State::ExponentDigit, b'0'..=b'9') => State::ExponentDigit,

      // Any other byte ends the number; legality is decided below.
      _ => break,
    };
    if matches!(next, State::Fraction | State::Exponent) {
      floated = true;
    }
    state = next;
    i += 1;
  }

  if !state.accepting() {
    return Err(invalid("incomplete number", i));
  }

  let text = &b[offset..i];
  let number = if floated {
    parse_float_text(text, offset)?
  } else {
    parse_integer_text(text, offset)?
  };
  Ok(Scanned { number, end: i, reached_end: i >= b.len() })
}

fn digits_exceed(digits: &[u8], limit: &[u8]) -> bool {
  digits.len() > limit.len() || (digits.len() == limit.len() && digits > limit)
}

fn parse_integer_text(text: &[u8], offset: usize) -> Result<Number> {
  let negative = text.first() == Some(&b'-');
  let digits = if negative { &text[1..] } else { text };

  if negative {
    if digits_exceed(digits, MIN_INT64_MAGNITUDE) {
      return Err(invalid("integer overflows int64", offset));
    }
  } else if digits_exceed(digits, MAX_UINT64_DIGITS) {
    return Err(invalid("integer overflows uint64", offset));
  }

  // The checks above guarantee the magnitude fits into a u64.
  let mut magnitude: u64 = 0;
  for d in digits {
    magnitude = magnitude * 10 + u64::from(d - b'0');
  }

  let raw = String::from_utf8_lossy(text).into_owned();
  if negative {
    let i = (magnitude as i64).wrapping_neg();
    Ok(Number { negative: magnitude != 0, floated: false, i64: i, u64: i as u64, f64: i as f64, raw })
  } else {
    Ok(Number { negative: false, floated: false, i64: magnitude as i64, u64: magnitude, f64: magnitude as f64, raw })
  }
}

fn parse_float_text(text: &[u8], offset: usize) -> Result<Number> {
  let s = core::str::from_utf8(text).map_err(|_| invalid("number is not ASCII", offset))?;
  let f: f64 = s
    .parse()
    .map_err(|e: core::num::ParseFloatError| Error::NotValidNumberValue(e.to_string()).at(offset))?;
  if f.is_infinite() {
    return Err(invalid("float value out of range", offset));
  }
  Ok(Number {
    negative: text.first() == Some(&b'-'),
    floated: true,
    i64: f as i64,
    u64: f as u64,
    f64: f,
    raw: s.to_string(),
  })
}

/// Parses a complete string as one JSON number, rejecting trailing bytes.
pub(crate) fn parse_number_str(s: &str) -> Result<Number> {
  let b = s.as_bytes();
  let scanned = scan_number(b, 0)?;
  if !scanned.reached_end {
    return Err(invalid("trailing bytes after number", scanned.end));
  }
  Ok(scanned.number)
}

// --- Float formatting ---

/// Decimal digits of a float: ```0.d1d2d3... * 10^dp```. An empty digit list
/// means zero.
struct Digits {
  d: Vec<u8>,
  dp: i32,
}

/// Splits the output of Rust's ```{:e}``` formatting into digits and exponent.
fn digits_from_exp(s: &str) -> Digits {
  let s = s.trim_start_matches('-');
  let (mantissa, exp) = match s.split_once('e') {
    Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
    None => (s, 0),
  };
  let mut d: Vec<u8> = mantissa.bytes().filter(|c| c.is_ascii_digit()).collect();
  while d.last() == Some(&b'0') {
    d.pop();
  }
  if d.is_empty() {
    return Digits { d, dp: 0 };
  }
  Digits { d, dp: exp + 1 }
}

fn shortest_digits(f: f64, bits: u32) -> Digits {
  if bits == 32 {
    digits_from_exp(&format!("{:e}", f as f32))
  } else {
    digits_from_exp(&format!("{:e}", f))
  }
}

fn rounded_digits(f: f64, significant: usize) -> Digits {
  digits_from_exp(&format!("{:.*e}", significant.saturating_sub(1), f))
}

fn fmt_e(out: &mut String, digits: &Digits, prec: usize, e: char) {
  out.push(digits.d.first().map_or('0', |c| *c as char));
  if prec > 0 {
    out.push('.');
    for i in 1..=prec {
      out.push(digits.d.get(i).map_or('0', |c| *c as char));
    }
  }
  out.push(e);
  let exp = if digits.d.is_empty() { 0 } else { digits.dp - 1 };
  out.push(if exp < 0 { '-' } else { '+' });
  let exp = exp.unsigned_abs();
  if exp < 10 {
    out.push('0');
  }
  out.push_str(itoa::Buffer::new().format(exp));
}

fn fmt_f(out: &mut String, digits: &Digits, prec: usize) {
  if digits.dp > 0 {
    for i in 0..digits.dp as usize {
      out.push(digits.d.get(i).map_or('0', |c| *c as char));
    }
  } else {
    out.push('0');
  }
  if prec > 0 {
    out.push('.');
    for i in 1..=prec as i32 {
      let j = digits.dp - 1 + i;
      let c = if j >= 0 { digits.d.get(j as usize).map_or('0', |c| *c as char) } else { '0' };
      out.push(c);
    }
  }
}

/// Formats a float the way a C-family ```%e/%f/%g``` formatter would, with
/// ```prec == -1``` selecting the shortest text that parses back to the same
/// value at the given bit size (32 or 64).
///
/// NaN and infinities become ```NaN```, ```+Inf``` and ```-Inf```.
pub fn format_float(f: f64, fmt: char, prec: i32, bits: u32) -> String {
  if f.is_nan() {
    return "NaN".to_string();
  }
  if f.is_infinite() {
    return if f > 0.0 { "+Inf".to_string() } else { "-Inf".to_string() };
  }

  let mut out = String::new();
  if f.is_sign_negative() {
    out.push('-');
  }
  let f = f.abs();
  let shortest = prec < 0;

  match fmt {
    'e' | 'E' => {
      let digits = if shortest { shortest_digits(f, bits) } else { rounded_digits(f, prec as usize + 1) };
      let p = if shortest { digits.d.len().saturating_sub(1) } else { prec as usize };
      fmt_e(&mut out, &digits, p, fmt);
    }
    'g' | 'G' => {
      let digits = if shortest {
        shortest_digits(f, bits)
      } else {
        rounded_digits(f, prec.max(1) as usize)
      };
      let nd = digits.d.len() as i32;
      let mut p = if shortest { nd } else { prec.max(1) };
      let mut eprec = p;
      if eprec > nd && nd >= digits.dp {
        eprec = nd;
      }
      if shortest {
        eprec = 6;
      }
      let exp = if nd == 0 { 0 } else { digits.dp - 1 };
      let e = if fmt == 'g' { 'e' } else { 'E' };
      if exp < -4 || exp >= eprec {
        if p > nd {
          p = nd;
        }
        fmt_e(&mut out, &digits, (p - 1).max(0) as usize, e);
      } else {
        if p > digits.dp {
          p = nd;
        }
        fmt_f(&mut out, &digits, (p - digits.dp).max(0) as usize);
      }
    }
    _ => {
      // 'f' and anything unknown
      if shortest {
        let digits = shortest_digits(f, bits);
        let p = (digits.d.len() as i32 - digits.dp).max(0) as usize;
        fmt_f(&mut out, &digits, p);
      } else {
        out.push_str(&format!("{:.*}", prec as usize, f));
      }
    }
  }
  out
}
