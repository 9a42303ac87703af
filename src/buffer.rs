//! Append-only byte sink used by the serializer.

/// Accumulates the bytes of one serialization pass.
///
/// A `Buffer` has a single writer and no internal locking. It only ever
/// grows; `bytes()` exposes everything written so far.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
  /// Raw data currently held in the buffer
  data: Vec<u8>,
}

impl Buffer {
  pub fn new() -> Self {
    Buffer { data: Vec::new() }
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Buffer { data: Vec::with_capacity(capacity) }
  }

  // --- Writers ---

  #[inline]
  pub fn push_byte(&mut self, b: u8) {
    self.data.push(b);
  }

  #[inline]
  pub fn push_bytes(&mut self, buf: &[u8]) {
    self.data.extend_from_slice(buf);
  }

  #[inline]
  pub fn push_str(&mut self, s: &str) {
    self.data.extend_from_slice(s.as_bytes());
  }

  /// Encodes a Unicode scalar value as UTF-8 and appends it.
  #[inline]
  pub fn push_rune(&mut self, c: char) {
    let mut tmp = [0u8; 4];
    self.data.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
  }

  /// Appends ```n``` copies of ```s```.
  pub fn push_repeated(&mut self, s: &str, n: usize) {
    for _ in 0..n {
      self.push_str(s);
    }
  }

  // --- Readers ---

  pub fn bytes(&self) -> &[u8] {
    &self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn push_variants() {
    let mut b = Buffer::new();
    b.push_byte(b'[');
    b.push_bytes(b"12");
    b.push_str(",\"");
    b.push_rune('中');
    b.push_rune('😀');
    b.push_str("\"]");
    assert_eq!(core::str::from_utf8(b.bytes()).unwrap(), "[12,\"中😀\"]");
    assert_eq!(b.len(), 14);
  }

  #[test]
  fn repeated() {
    let mut b = Buffer::with_capacity(8);
    assert!(b.is_empty());
    b.push_repeated("  ", 3);
    assert_eq!(b.into_bytes(), b"      ".to_vec());
  }
}
