use std::fmt;
use std::str::FromStr;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::field::FieldCodec;
use crate::value::Value;
use crate::{MAX_FIELDS, MAX_FIELD_SIZE};

/// A parsed format string: the ordered list of field codecs for one record.
///
/// A format is immutable once parsed and can be shared between threads and reused for any
/// number of records.
///
/// ```
/// use rawpack::{Format, Value};
///
/// let format: Format = "S2hQ".parse().unwrap();
/// assert_eq!(format.len(), 4);
///
/// let values = vec![
///     Value::cstr("name"),
///     Value::I16(-3),
///     Value::I16(900),
///     Value::U64(1 << 40),
/// ];
/// let packed = format.pack(&values).unwrap();
/// assert_eq!(format.unpack(&packed).unwrap(), values);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Format {
    fields: Vec<FieldCodec>,
}

impl Format {
    /// Parse a format string.
    ///
    /// Each directive may be preceded by a decimal count. For integer directives the count is
    /// a repeat count: `3i` is three independent `i32` fields. For `s` and `S` it is the byte
    /// size of a single string field. A count of 0 is the same as no count.
    pub fn parse(format: &str) -> Result<Format> {
        let mut fields = Vec::with_capacity(4);
        let mut count: Option<usize> = None;

        for c in format.chars() {
            if let Some(digit) = c.to_digit(10) {
                let n = count
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(digit as usize))
                    .ok_or_else(|| {
                        Error::ParseLimit(format!("count in format \"{}\" is too large", format))
                    })?;
                count = Some(n);
                continue;
            }

            let given = count.take().unwrap_or(0);
            let repeat = given.max(1);
            let codec = match c {
                'b' => FieldCodec::I8,
                'B' => FieldCodec::U8,
                'h' => FieldCodec::I16,
                'H' => FieldCodec::U16,
                'i' | 'l' => FieldCodec::I32,
                'I' | 'L' => FieldCodec::U32,
                'q' => FieldCodec::I64,
                'Q' | 'r' => FieldCodec::U64,
                's' => {
                    check_size(repeat, format)?;
                    push_fields(&mut fields, FieldCodec::FixedStr(repeat), 1, format)?;
                    continue;
                }
                'S' => {
                    check_size(given, format)?;
                    push_fields(&mut fields, FieldCodec::CStr(given), 1, format)?;
                    continue;
                }
                other => return Err(Error::UnsupportedFormat(other)),
            };
            push_fields(&mut fields, codec, repeat, format)?;
        }

        if let Some(n) = count {
            warn!(format = format, count = n, "ignoring trailing count in format string");
        }
        trace!(format = format, fields = fields.len(), "parsed record format");
        Ok(Format { fields })
    }

    pub fn fields(&self) -> &[FieldCodec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldCodec> {
        self.fields.iter()
    }

    fn check_count(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::FieldCount {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// Pack a record into a new buffer.
    pub fn pack(&self, values: &[Value]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.pack_into(&mut buf, values)?;
        Ok(buf)
    }

    /// Append a packed record to `buf`.
    ///
    /// The number of values is checked before anything is written. If a value has the wrong
    /// type, the fields before it are left in `buf`; the caller should discard the buffer.
    pub fn pack_into(&self, buf: &mut Vec<u8>, values: &[Value]) -> Result<()> {
        self.check_count(values)?;
        for (field, value) in self.iter().zip(values) {
            field.pack(value, buf)?;
        }
        Ok(())
    }

    /// Number of bytes [`Format::pack`] would produce for `values`.
    pub fn packed_len(&self, values: &[Value]) -> Result<usize> {
        self.check_count(values)?;
        self.iter()
            .zip(values)
            .try_fold(0usize, |acc, (field, value)| -> Result<usize> {
                acc.checked_add(field.packed_len(value)?).ok_or_else(|| {
                    Error::ParseLimit("packed record size overflows usize".to_string())
                })
            })
    }

    /// Unpack a record from the start of `data`.
    ///
    /// Bytes left over after the last field are ignored; an oversized bounded `S` field, for
    /// example, packs more bytes than it unpacks. Use [`Format::unpack_from`] to see them.
    pub fn unpack(&self, data: &[u8]) -> Result<Vec<Value>> {
        let mut buf = data;
        self.unpack_from(&mut buf)
    }

    /// Unpack one record from the front of `buf`, advancing it past the record. On error `buf`
    /// is left where it was.
    pub fn unpack_from(&self, buf: &mut &[u8]) -> Result<Vec<Value>> {
        let mut rest = *buf;
        let values = self
            .iter()
            .map(|field| field.unpack(&mut rest))
            .collect::<Result<Vec<Value>>>()?;
        *buf = rest;
        Ok(values)
    }
}

fn push_fields(
    fields: &mut Vec<FieldCodec>,
    codec: FieldCodec,
    repeat: usize,
    format: &str,
) -> Result<()> {
    if fields.len().saturating_add(repeat) > MAX_FIELDS {
        return Err(Error::ParseLimit(format!(
            "format \"{}\" has more than {} fields",
            format, MAX_FIELDS
        )));
    }
    fields.extend(std::iter::repeat(codec).take(repeat));
    Ok(())
}

fn check_size(size: usize, format: &str) -> Result<()> {
    if size > MAX_FIELD_SIZE {
        return Err(Error::ParseLimit(format!(
            "string size {} in format \"{}\" is larger than {}",
            size, format, MAX_FIELD_SIZE
        )));
    }
    Ok(())
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::parse(s)
    }
}

impl<'a> IntoIterator for &'a Format {
    type Item = &'a FieldCodec;
    type IntoIter = std::slice::Iter<'a, FieldCodec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Renders the canonical format string. Runs of the same integer field collapse into a repeat
/// count, and aliased directives use their primary letter.
impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut i = 0;
        while i < self.fields.len() {
            let field = self.fields[i];
            match field {
                FieldCodec::FixedStr(1) | FieldCodec::CStr(0) => {
                    write!(f, "{}", field.directive())?;
                    i += 1;
                }
                FieldCodec::FixedStr(n) | FieldCodec::CStr(n) => {
                    write!(f, "{}{}", n, field.directive())?;
                    i += 1;
                }
                _ => {
                    let run = self.fields[i..].iter().take_while(|c| **c == field).count();
                    if run > 1 {
                        write!(f, "{}", run)?;
                    }
                    write!(f, "{}", field.directive())?;
                    i += run;
                }
            }
        }
        Ok(())
    }
}
