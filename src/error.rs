//! Error type shared by the parser, the path API and the serializer.

use thiserror::Error;

/// Every failure surfaced by this crate.
///
/// The set is closed: each variant names one kind of failure and carries a
/// human readable message. Parser messages end with the byte offset where the
/// problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A required parameter (usually a path) was empty.
  #[error("nil parameter: {0}")]
  NilParameter(String),
  /// The value is `NotExist` and cannot be used for the requested operation.
  #[error("jsonvalue instance is not initialized: {0}")]
  ValueUninitialized(String),
  /// The input could not be recognised as any JSON value.
  #[error("unrecognized raw bytes: {0}")]
  RawBytesUnrecognized(String),
  #[error("not a valid bool value: {0}")]
  NotValidBoolValue(String),
  #[error("not a valid null value: {0}")]
  NotValidNullValue(String),
  #[error("not a valid number value: {0}")]
  NotValidNumberValue(String),
  #[error("illegal string: {0}")]
  IllegalString(String),
  #[error("out of range: {0}")]
  OutOfRange(String),
  #[error("not found: {0}")]
  NotFound(String),
  #[error("type not match: {0}")]
  TypeNotMatch(String),
  #[error("not an array value: {0}")]
  NotArrayValue(String),
  #[error("not an object value: {0}")]
  NotObjectValue(String),
  /// A numeric getter met a string that does not hold a JSON number.
  #[error("failed to parse number from string: {0}")]
  ParseNumberFromString(String),
  /// NaN or ±Inf met while the matching float policy is `Error`.
  #[error("unsupported float value: {0}")]
  UnsupportedFloat(String),
  /// A float policy was configured with NaN or ±Inf as its replacement.
  #[error("unsupported float value in option: {0}")]
  UnsupportedFloatInOpt(String),
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
  pub(crate) fn at(self, offset: usize) -> Error {
    let suffix = |m: String| format!("{} at offset {}", m, offset);
    match self {
      Error::NilParameter(m) => Error::NilParameter(suffix(m)),
      Error::ValueUninitialized(m) => Error::ValueUninitialized(suffix(m)),
      Error::RawBytesUnrecognized(m) => Error::RawBytesUnrecognized(suffix(m)),
      Error::NotValidBoolValue(m) => Error::NotValidBoolValue(suffix(m)),
      Error::NotValidNullValue(m) => Error::NotValidNullValue(suffix(m)),
      Error::NotValidNumberValue(m) => Error::NotValidNumberValue(suffix(m)),
      Error::IllegalString(m) => Error::IllegalString(suffix(m)),
      Error::OutOfRange(m) => Error::OutOfRange(suffix(m)),
      Error::NotFound(m) => Error::NotFound(suffix(m)),
      Error::TypeNotMatch(m) => Error::TypeNotMatch(suffix(m)),
      Error::NotArrayValue(m) => Error::NotArrayValue(suffix(m)),
      Error::NotObjectValue(m) => Error::NotObjectValue(suffix(m)),
      Error::ParseNumberFromString(m) => Error::ParseNumberFromString(suffix(m)),
      Error::UnsupportedFloat(m) => Error::UnsupportedFloat(suffix(m)),
      Error::UnsupportedFloatInOpt(m) => Error::UnsupportedFloatInOpt(suffix(m)),
    }
  }

  /// Returns ```true``` for ```Error::NotFound```.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound(_))
  }

  /// Returns ```true``` for ```Error::TypeNotMatch```.
  pub fn is_type_not_match(&self) -> bool {
    matches!(self, Error::TypeNotMatch(_))
  }

  /// Returns ```true``` for ```Error::OutOfRange```.
  pub fn is_out_of_range(&self) -> bool {
    matches!(self, Error::OutOfRange(_))
  }
}
