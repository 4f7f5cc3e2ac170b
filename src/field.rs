use crate::error::{Error, Result};
use crate::intpack;
use crate::value::Value;

/// Codec for a single field of a record.
///
/// Integer codecs carry no state. String codecs carry their byte size from the format string;
/// for [`FieldCodec::CStr`] a size of 0 means the field is bounded only by its terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldCodec {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    FixedStr(usize),
    CStr(usize),
}

impl FieldCodec {
    /// Name of the value type this field accepts, for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldCodec::I8 => "i8",
            FieldCodec::U8 => "u8",
            FieldCodec::I16 => "i16",
            FieldCodec::U16 => "u16",
            FieldCodec::I32 => "i32",
            FieldCodec::U32 => "u32",
            FieldCodec::I64 => "i64",
            FieldCodec::U64 => "u64",
            FieldCodec::FixedStr(_) => "fixed-size string",
            FieldCodec::CStr(_) => "null-terminated string",
        }
    }

    /// The format directive that produces this codec.
    pub fn directive(&self) -> char {
        match self {
            FieldCodec::I8 => 'b',
            FieldCodec::U8 => 'B',
            FieldCodec::I16 => 'h',
            FieldCodec::U16 => 'H',
            FieldCodec::I32 => 'i',
            FieldCodec::U32 => 'I',
            FieldCodec::I64 => 'q',
            FieldCodec::U64 => 'Q',
            FieldCodec::FixedStr(_) => 's',
            FieldCodec::CStr(_) => 'S',
        }
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::TypeMismatch {
            expected: self.type_name(),
            actual: value.type_name(),
        }
    }

    /// Append the packed form of `value` to `buf`. Fails if the value's type doesn't match the
    /// field exactly, in which case nothing is written.
    pub fn pack(&self, value: &Value, buf: &mut Vec<u8>) -> Result<()> {
        match (*self, value) {
            (FieldCodec::I8, Value::I8(v)) => intpack::pack_int(buf, *v as i64),
            (FieldCodec::I16, Value::I16(v)) => intpack::pack_int(buf, *v as i64),
            (FieldCodec::I32, Value::I32(v)) => intpack::pack_int(buf, *v as i64),
            (FieldCodec::I64, Value::I64(v)) => intpack::pack_int(buf, *v),
            (FieldCodec::U8, Value::U8(v)) => intpack::pack_uint(buf, *v as u64),
            (FieldCodec::U16, Value::U16(v)) => intpack::pack_uint(buf, *v as u64),
            (FieldCodec::U32, Value::U32(v)) => intpack::pack_uint(buf, *v as u64),
            (FieldCodec::U64, Value::U64(v)) => intpack::pack_uint(buf, *v),
            (FieldCodec::FixedStr(size), Value::FixedStr(v)) => pack_fixed_str(buf, v, size),
            (FieldCodec::CStr(size), Value::CStr(v)) => pack_cstr(buf, v, size),
            _ => return Err(self.mismatch(value)),
        }
        Ok(())
    }

    /// Number of bytes [`FieldCodec::pack`] would write for `value`.
    pub fn packed_len(&self, value: &Value) -> Result<usize> {
        let len = match (*self, value) {
            (FieldCodec::I8, Value::I8(v)) => intpack::packed_len_int(*v as i64),
            (FieldCodec::I16, Value::I16(v)) => intpack::packed_len_int(*v as i64),
            (FieldCodec::I32, Value::I32(v)) => intpack::packed_len_int(*v as i64),
            (FieldCodec::I64, Value::I64(v)) => intpack::packed_len_int(*v),
            (FieldCodec::U8, Value::U8(v)) => intpack::packed_len_uint(*v as u64),
            (FieldCodec::U16, Value::U16(v)) => intpack::packed_len_uint(*v as u64),
            (FieldCodec::U32, Value::U32(v)) => intpack::packed_len_uint(*v as u64),
            (FieldCodec::U64, Value::U64(v)) => intpack::packed_len_uint(*v),
            (FieldCodec::FixedStr(size), Value::FixedStr(_)) => size,
            (FieldCodec::CStr(size), Value::CStr(v)) => {
                if size > 0 && v.len() != size {
                    v.len().max(size)
                } else {
                    match last_null(v) {
                        Some(n) => n + 1,
                        None => v.len() + 1,
                    }
                }
            }
            _ => return Err(self.mismatch(value)),
        };
        Ok(len)
    }

    /// Decode one field from the front of `buf`, advancing it past the field.
    ///
    /// Integer fields are always decoded as signed 64-bit values and then truncated to the
    /// field's width, for both signed and unsigned fields. Values packed by a matching field
    /// come back unchanged; out-of-range input wraps silently.
    pub fn unpack(&self, buf: &mut &[u8]) -> Result<Value> {
        let value = match *self {
            FieldCodec::I8 => Value::I8(intpack::unpack_int(buf)? as i8),
            FieldCodec::U8 => Value::U8(intpack::unpack_int(buf)? as u8),
            FieldCodec::I16 => Value::I16(intpack::unpack_int(buf)? as i16),
            FieldCodec::U16 => Value::U16(intpack::unpack_int(buf)? as u16),
            FieldCodec::I32 => Value::I32(intpack::unpack_int(buf)? as i32),
            FieldCodec::U32 => Value::U32(intpack::unpack_int(buf)? as u32),
            FieldCodec::I64 => Value::I64(intpack::unpack_int(buf)?),
            FieldCodec::U64 => Value::U64(intpack::unpack_int(buf)? as u64),
            FieldCodec::FixedStr(size) => {
                Value::FixedStr(take(buf, size, "unpack fixed-size string")?.to_vec())
            }
            FieldCodec::CStr(size) => Value::CStr(unpack_cstr(buf, size)?),
        };
        Ok(value)
    }
}

fn last_null(v: &[u8]) -> Option<usize> {
    v.iter().rposition(|b| *b == 0)
}

fn pad_zero(buf: &mut Vec<u8>, count: usize) {
    buf.resize(buf.len() + count, 0);
}

// Exact size is copied, short input is zero-padded, long input is cut off.
fn pack_fixed_str(buf: &mut Vec<u8>, v: &[u8], size: usize) {
    if v.len() >= size {
        buf.extend_from_slice(&v[..size]);
    } else {
        buf.extend_from_slice(v);
        pad_zero(buf, size - v.len());
    }
}

// Write through the last embedded null, or the whole input plus a terminator if there is none.
// Anything after the last null is dropped.
fn pack_terminated(buf: &mut Vec<u8>, v: &[u8]) {
    match last_null(v) {
        Some(n) => buf.extend_from_slice(&v[..=n]),
        None => {
            buf.extend_from_slice(v);
            buf.push(0);
        }
    }
}

fn pack_cstr(buf: &mut Vec<u8>, v: &[u8], size: usize) {
    if size == 0 || v.len() == size {
        pack_terminated(buf, v);
    } else if v.len() > size {
        // Oversized input overflows the bound as-is, with no terminator
        buf.extend_from_slice(v);
    } else {
        buf.extend_from_slice(v);
        pad_zero(buf, size - v.len());
    }
}

fn take<'a>(buf: &mut &'a [u8], size: usize, step: &'static str) -> Result<&'a [u8]> {
    if buf.len() < size {
        return Err(Error::TruncatedInput {
            step,
            actual: buf.len(),
            expected: size,
        });
    }
    let (head, rest) = buf.split_at(size);
    *buf = rest;
    Ok(head)
}

fn unpack_cstr(buf: &mut &[u8], size: usize) -> Result<Vec<u8>> {
    if size > 0 {
        // Bounded fields keep all `size` bytes, embedded nulls included. A terminator right
        // after the field is consumed but not returned.
        let v = take(buf, size, "unpack bounded string")?.to_vec();
        if let Some((&0, rest)) = buf.split_first() {
            *buf = rest;
        }
        return Ok(v);
    }
    match buf.iter().position(|b| *b == 0) {
        Some(n) => {
            let v = buf[..n].to_vec();
            *buf = &buf[n + 1..];
            Ok(v)
        }
        None => Err(Error::MalformedField(
            "null-terminated string is missing its terminator",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(codec: FieldCodec, value: Value) -> Vec<u8> {
        let mut buf = Vec::new();
        codec.pack(&value, &mut buf).unwrap();
        assert_eq!(codec.packed_len(&value).unwrap(), buf.len(), "packed_len for {:?}", value);
        buf
    }

    fn unpack(codec: FieldCodec, data: &[u8]) -> (Value, &[u8]) {
        let mut rest = data;
        let v = codec.unpack(&mut rest).unwrap();
        (v, rest)
    }

    #[test]
    fn fixed_str_pad_and_truncate() {
        assert_eq!(pack(FieldCodec::FixedStr(5), Value::fixed_str("hello")), b"hello");
        assert_eq!(pack(FieldCodec::FixedStr(3), Value::fixed_str("hello")), b"hel");
        assert_eq!(pack(FieldCodec::FixedStr(7), Value::fixed_str("hello")), b"hello\0\0");
        assert_eq!(pack(FieldCodec::FixedStr(1), Value::fixed_str("hello")), b"h");
        assert_eq!(pack(FieldCodec::FixedStr(2), Value::fixed_str("")), b"\0\0");
    }

    #[test]
    fn fixed_str_unpack_keeps_padding() {
        let (v, rest) = unpack(FieldCodec::FixedStr(7), b"hello\0\0tail");
        assert_eq!(v, Value::fixed_str("hello\0\0"));
        assert_eq!(rest, b"tail");
    }

    #[test]
    fn cstr_unbounded_pack() {
        assert_eq!(pack(FieldCodec::CStr(0), Value::cstr("hello")), b"hello\0");
        assert_eq!(pack(FieldCodec::CStr(0), Value::cstr("hello\0")), b"hello\0");
        assert_eq!(pack(FieldCodec::CStr(0), Value::cstr("")), b"\0");
        // Anchored on the last null, not the first
        assert_eq!(pack(FieldCodec::CStr(0), Value::cstr("a\0b\0c")), b"a\0b\0");
    }

    #[test]
    fn cstr_bounded_pack() {
        // Oversized: written in full, no terminator
        assert_eq!(pack(FieldCodec::CStr(3), Value::cstr("hello")), b"hello");
        // Undersized: zero padded to the bound
        assert_eq!(pack(FieldCodec::CStr(7), Value::cstr("hello")), b"hello\0\0");
        // Exact size grows by a terminator
        assert_eq!(pack(FieldCodec::CStr(5), Value::cstr("hello")), b"hello\0");
        assert_eq!(pack(FieldCodec::CStr(6), Value::cstr("hello\0")), b"hello\0");
        assert_eq!(pack(FieldCodec::CStr(4), Value::cstr("ab\0c")), b"ab\0");
    }

    #[test]
    fn cstr_bounded_unpack() {
        // The raw bytes come back, with no terminator stripping
        let (v, rest) = unpack(FieldCodec::CStr(3), b"hello");
        assert_eq!(v, Value::cstr("hel"));
        assert_eq!(rest, b"lo");

        let (v, rest) = unpack(FieldCodec::CStr(7), b"hello\0\0");
        assert_eq!(v, Value::cstr("hello\0\0"));
        assert!(rest.is_empty());

        // A trailing terminator is consumed
        let (v, rest) = unpack(FieldCodec::CStr(5), b"hello\0\x81");
        assert_eq!(v, Value::cstr("hello"));
        assert_eq!(rest, b"\x81");
    }

    #[test]
    fn cstr_unbounded_unpack() {
        let (v, rest) = unpack(FieldCodec::CStr(0), b"\0abc");
        assert_eq!(v, Value::cstr(""));
        assert_eq!(rest, b"abc");

        let (v, rest) = unpack(FieldCodec::CStr(0), b"hello\0world\0");
        assert_eq!(v, Value::cstr("hello"));
        assert_eq!(rest, b"world\0");

        let mut rest: &[u8] = b"no terminator";
        assert!(matches!(
            FieldCodec::CStr(0).unpack(&mut rest),
            Err(Error::MalformedField(_))
        ));
        assert_eq!(rest, b"no terminator");
    }

    #[test]
    fn short_string_input() {
        let mut rest: &[u8] = b"hi";
        assert!(matches!(
            FieldCodec::FixedStr(3).unpack(&mut rest),
            Err(Error::TruncatedInput { actual: 2, expected: 3, .. })
        ));
        assert!(matches!(
            FieldCodec::CStr(3).unpack(&mut rest),
            Err(Error::TruncatedInput { .. })
        ));
        assert_eq!(rest, b"hi");
    }

    #[test]
    fn integer_fields() {
        assert_eq!(pack(FieldCodec::I8, Value::I8(-1)), vec![0x7f]);
        assert_eq!(pack(FieldCodec::U16, Value::U16(8256)), vec![0xe1, 0x00]);
        assert_eq!(pack(FieldCodec::I32, Value::I32(i32::MIN)), {
            let mut buf = Vec::new();
            intpack::pack_int(&mut buf, i32::MIN as i64);
            buf
        });

        let cases = vec![
            (FieldCodec::I8, Value::I8(i8::MIN)),
            (FieldCodec::U8, Value::U8(u8::MAX)),
            (FieldCodec::I16, Value::I16(i16::MIN)),
            (FieldCodec::U16, Value::U16(u16::MAX)),
            (FieldCodec::I32, Value::I32(i32::MAX)),
            (FieldCodec::U32, Value::U32(u32::MAX)),
            (FieldCodec::I64, Value::I64(i64::MIN)),
            (FieldCodec::U64, Value::U64(u64::MAX)),
        ];
        for (codec, value) in cases {
            let buf = pack(codec, value.clone());
            let (v, rest) = unpack(codec, &buf);
            assert_eq!(v, value);
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn unsigned_fields_decode_through_signed_path() {
        // A value too wide for the field is truncated to the field width on unpack
        let mut buf = Vec::new();
        intpack::pack_int(&mut buf, 300);
        assert_eq!(unpack(FieldCodec::U8, &buf).0, Value::U8(300u16 as u8));
        assert_eq!(unpack(FieldCodec::I8, &buf).0, Value::I8(300u16 as i8));

        // Negative encodings read into unsigned fields wrap
        buf.clear();
        intpack::pack_int(&mut buf, -1);
        assert_eq!(unpack(FieldCodec::U32, &buf).0, Value::U32(u32::MAX));
    }

    #[test]
    fn type_mismatch_writes_nothing() {
        let mut buf = vec![0xaa];
        let err = FieldCodec::I32.pack(&Value::I64(1), &mut buf).unwrap_err();
        match err {
            Error::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "i32");
                assert_eq!(actual, "i64");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(buf, vec![0xaa]);

        assert!(FieldCodec::U8.pack(&Value::I8(1), &mut buf).is_err());
        assert!(FieldCodec::CStr(0).pack(&Value::fixed_str("a"), &mut buf).is_err());
        assert!(FieldCodec::FixedStr(1).pack(&Value::cstr("a"), &mut buf).is_err());
        assert!(FieldCodec::FixedStr(1).packed_len(&Value::U8(1)).is_err());
        assert_eq!(buf, vec![0xaa]);
    }
}
