//! Per-byte escape dispatch for JSON string bodies.
//!
//! A table is compiled from the escaping switches of an ```Opt``` and then
//! consulted once per byte (ASCII) or once per code point (non-ASCII).

use crate::buffer::Buffer;

/// Writes one ASCII byte, escaped or not.
pub(crate) type AsciiEscapeFn = fn(u8, &mut Buffer);
/// Writes one non-ASCII code point, escaped or not.
pub(crate) type RuneEscapeFn = fn(char, &mut Buffer);

const HEX: &[u8; 16] = b"0123456789ABCDEF";

// --- Escape routines ---

fn write_short(b: u8, buf: &mut Buffer) {
  let c = match b {
    b'"' => b'"',
    b'\\' => b'\\',
    b'/' => b'/',
    0x08 => b'b',
    0x0C => b'f',
    b'\n' => b'n',
    b'\r' => b'r',
    b'\t' => b't',
    _ => return write_unicode_byte(b, buf),
  };
  buf.push_byte(b'\\');
  buf.push_byte(c);
}

fn write_unicode_byte(b: u8, buf: &mut Buffer) {
  write_u16(u16::from(b), buf);
}

fn write_u16(u: u16, buf: &mut Buffer) {
  buf.push_bytes(b"\\u");
  buf.push_byte(HEX[usize::from(u >> 12) & 0xF]);
  buf.push_byte(HEX[usize::from(u >> 8) & 0xF]);
  buf.push_byte(HEX[usize::from(u >> 4) & 0xF]);
  buf.push_byte(HEX[usize::from(u) & 0xF]);
}

fn write_rune_utf8(c: char, buf: &mut Buffer) {
  match c {
    '\u{2028}' | '\u{2029}' => write_u16(c as u16, buf),
    _ => buf.push_rune(c),
  }
}

fn write_rune_escaped(c: char, buf: &mut Buffer) {
  let mut units = [0u16; 2];
  for u in c.encode_utf16(&mut units) {
    write_u16(*u, buf);
  }
}

// --- Table ---

/// The compiled dispatch table. ASCII bytes mapped to ```None``` are copied
/// verbatim.
pub(crate) struct EscapeTable {
  ascii: [Option<AsciiEscapeFn>; 128],
  non_ascii: RuneEscapeFn,
}

impl EscapeTable {
  /// Builds the table. Control bytes, DEL, ```"``` and ```\``` are escaped
  /// no matter what the switches say.
  pub fn compile(escape_html: bool, escape_slash: bool, utf8: bool) -> EscapeTable {
    let mut ascii: [Option<AsciiEscapeFn>; 128] = [None; 128];
    for (b, f) in ascii.iter_mut().enumerate() {
      *f = match b as u8 {
        0x08 | 0x09 | 0x0A | 0x0C | 0x0D | b'"' | b'\\' => Some(write_short as AsciiEscapeFn),
        0x00..=0x1F | 0x7F => Some(write_unicode_byte as AsciiEscapeFn),
        b'<' | b'>' | b'&' if escape_html => Some(write_unicode_byte as AsciiEscapeFn),
        b'/' if escape_slash => Some(write_short as AsciiEscapeFn),
        _ => None,
      };
    }
    let non_ascii: RuneEscapeFn = if utf8 { write_rune_utf8 } else { write_rune_escaped };
    EscapeTable { ascii, non_ascii }
  }

  /// Writes ```s``` (without surrounding quotes) through the table.
  pub fn write_str(&self, s: &str, buf: &mut Buffer) {
    let bytes = s.as_bytes();
    let mut plain_from = 0;
    for (i, c) in s.char_indices() {
      if c.is_ascii() {
        let Some(f) = self.ascii[c as usize] else { continue };
        buf.push_bytes(&bytes[plain_from..i]);
        f(c as u8, buf);
      } else {
        buf.push_bytes(&bytes[plain_from..i]);
        (self.non_ascii)(c, buf);
      }
      plain_from = i + c.len_utf8();
    }
    buf.push_bytes(&bytes[plain_from..]);
  }

  /// Writes ```s``` wrapped in double quotes.
  pub fn write_quoted(&self, s: &str, buf: &mut Buffer) {
    buf.push_byte(b'"');
    self.write_str(s, buf);
    buf.push_byte(b'"');
  }
}
