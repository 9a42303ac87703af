//! This crate provides a mutable, self-owned JSON value tree.
//!
//! A [`Value`] holds null, booleans, numbers, strings, arrays and objects.
//! Numbers keep the exact text they were parsed from, objects remember the
//! order their members were set in, and lookups can optionally ignore key
//! case. Text is read with [`unmarshal`] and written with [`Value::marshal`].
//!
//! ```
//! use jsonvalue::{path, unmarshal_string, OptAtom};
//!
//! let mut v = unmarshal_string(r#"{"arr":[1,2,3]}"#).unwrap();
//! v.append(0).in_the_beginning(path!["arr"]).unwrap();
//! v.set("x").at(path!["obj", "key"]).unwrap();
//! assert_eq!(
//!   v.marshal_string(&[OptAtom::set_sequence()]).unwrap(),
//!   r#"{"arr":[0,1,2,3],"obj":{"key":"x"}}"#
//! );
//! ```

pub mod buffer;
pub mod caseless;
pub mod compare;
pub mod error;
mod escape;
pub mod import;
pub mod json_util;
pub mod marshal;
pub mod number;
pub mod options;
pub mod path;
pub mod value;
pub mod valueobject;

#[cfg(feature = "serde_support")]
pub mod serde_support;

#[cfg(test)]
mod json_util_tests;
#[cfg(test)]
mod marshal_tests;
#[cfg(test)]
mod path_tests;

pub use crate::caseless::Caseless;
pub use crate::error::{Error, Result};
pub use crate::import::{Bytes, Export, Import, MapKey, StructExporter, StructImporter};
pub use crate::json_util::{must_unmarshal, must_unmarshal_string, unmarshal, unmarshal_no_copy, unmarshal_string};
pub use crate::number::{format_float, Number};
pub use crate::options::{
  reset_default_marshal_options, set_default_marshal_options, FloatInfPolicy, FloatNaNPolicy, LessFunc, Opt, OptAtom,
  ParentInfo,
};
pub use crate::path::{Appender, Inserter, PathElem, Setter};
pub use crate::value::{Value, ValueType};
pub use crate::valueobject::Object;
