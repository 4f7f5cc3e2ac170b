//! rawpack packs tuples of typed fields into the byte layout used by an embedded storage
//! engine's raw key/value cursors, and unpacks them again.
//!
//! Each record is described by a format string: a sequence of single-character directives, each
//! optionally preceded by a decimal count.
//!
//! | Directive  | Field                          | Count            |
//! |------------|--------------------------------|------------------|
//! | `b` / `B`  | `i8` / `u8`                    | repeat           |
//! | `h` / `H`  | `i16` / `u16`                  | repeat           |
//! | `i` `l` / `I` `L` | `i32` / `u32`           | repeat           |
//! | `q` / `Q` `r` | `i64` / `u64`               | repeat           |
//! | `s`        | fixed-size string              | byte size        |
//! | `S`        | null-terminated string         | byte size (optional) |
//!
//! Integers use a variable-length encoding (see [`intpack`]) that keeps small values small and
//! sorts bytewise in numeric order. Strings are written as-is with no length prefix; their
//! extent comes from the format string or from a terminating null byte.
//!
//! The byte layout has to match the engine's own encoder exactly, including a few lossy cases:
//!
//! - A fixed-size `s` field silently truncates longer input.
//! - A bounded `S` field writes oversized input in full, but only unpacks its declared size.
//! - An `S` field drops everything after the last embedded null byte.
//!
//! ```
//! use rawpack::{Format, Value};
//!
//! let format = Format::parse("3sSq").unwrap();
//! let packed = format
//!     .pack(&[Value::fixed_str("hello"), Value::cstr("world"), Value::I64(-65)])
//!     .unwrap();
//! assert_eq!(packed, b"helworld\0\x3f\xff");
//!
//! let values = format.unpack(&packed).unwrap();
//! assert_eq!(values[0], Value::fixed_str("hel"));
//! ```
//!
//! For whole tables, [`RecordFormat`] holds the key and value formats together, and
//! [`RecordCursor`] drives any engine cursor that implements [`RawCursor`].

mod error;
mod field;
mod format;
mod marker;
mod record;
mod value;

pub mod intpack;

pub use self::error::{Error, Result};
pub use self::field::FieldCodec;
pub use self::format::Format;
pub use self::record::{RawCursor, RecordCursor, RecordFormat, TableSchema};
pub use self::value::Value;

/// The maximum number of fields a single format string may expand to. Repeat counts make it
/// possible to describe very large records in a few characters, so this caps the memory a
/// parsed format can take.
pub const MAX_FIELDS: usize = 1usize << 16;

/// The largest byte size an `s` or `S` directive may declare.
pub const MAX_FIELD_SIZE: usize = u32::MAX as usize;
