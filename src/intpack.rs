//! Variable-length integer packing.
//!
//! Integers are stored in as few bytes as possible, with the top bits of the first byte acting
//! as a class marker:
//!
//! | First byte   | Class                 | Range                   |
//! |--------------|-----------------------|-------------------------|
//! | `0x10..0x1f` | negative, multi-byte  | `i64::MIN..=-8257`      |
//! | `0x20..0x3f` | negative, 2-byte      | `-8256..=-65`           |
//! | `0x40..0x7f` | negative, 1-byte      | `-64..=-1`              |
//! | `0x80..0xbf` | positive, 1-byte      | `0..=63`                |
//! | `0xc0..0xdf` | positive, 2-byte      | `64..=8255`             |
//! | `0xe0..0xef` | positive, multi-byte  | `8256..=u64::MAX`       |
//!
//! The 2-byte and positive multi-byte classes store their value rebased against the class
//! minimum. Multi-byte classes store big-endian bytes with leading zero (positive) or `0xff`
//! (negative) bytes dropped; the low nibble of the marker holds the remaining byte count
//! (positive) or the dropped byte count (negative).
//!
//! Because every class occupies a contiguous range of first-byte values, packed integers sort
//! bytewise in numeric order.

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::marker::Marker;

const NEG_1BYTE_MIN: i64 = -(1 << 6); // -64
const NEG_2BYTE_MIN: i64 = -(1 << 13) + NEG_1BYTE_MIN; // -8256
const POS_1BYTE_MAX: u64 = (1 << 6) - 1; // 63
const POS_2BYTE_MAX: u64 = (1 << 13) + POS_1BYTE_MAX; // 8255

/// Count the leading zero bytes of a 64-bit value. Zero has 8.
pub fn leading_zero_bytes(x: u64) -> u8 {
    (x.leading_zeros() / 8) as u8
}

fn pack_pos_multi(buf: &mut Vec<u8>, x: u64) {
    let lz = leading_zero_bytes(x) as usize;
    buf.push(Marker::PosMulti((8 - lz) as u8).into());
    buf.extend_from_slice(&x.to_be_bytes()[lz..]);
}

fn pack_neg_multi(buf: &mut Vec<u8>, x: u64) {
    let lz = leading_zero_bytes(!x) as usize;
    buf.push(Marker::NegMulti(lz as u8).into());
    buf.extend_from_slice(&x.to_be_bytes()[lz..]);
}

/// Append the packed form of an unsigned integer to `buf`.
pub fn pack_uint(buf: &mut Vec<u8>, x: u64) {
    if x <= POS_1BYTE_MAX {
        buf.push(Marker::Pos1(x as u8).into());
    } else if x <= POS_2BYTE_MAX {
        let x = x - (POS_1BYTE_MAX + 1);
        buf.push(Marker::Pos2(((x >> 8) & 0x1f) as u8).into());
        buf.push(x as u8);
    } else if x == POS_2BYTE_MAX + 1 {
        // The smallest multi-byte value is written with one explicit zero byte rather than an
        // empty payload.
        buf.push(Marker::PosMulti(1).into());
        buf.push(0);
    } else {
        pack_pos_multi(buf, x - (POS_2BYTE_MAX + 1));
    }
}

/// Append the packed form of a signed integer to `buf`. Non-negative values are packed
/// identically to [`pack_uint`].
pub fn pack_int(buf: &mut Vec<u8>, x: i64) {
    if x < NEG_2BYTE_MIN {
        pack_neg_multi(buf, x as u64);
    } else if x < NEG_1BYTE_MIN {
        let x = (x - NEG_2BYTE_MIN) as u64;
        buf.push(Marker::Neg2(((x >> 8) & 0x1f) as u8).into());
        buf.push(x as u8);
    } else if x < 0 {
        let x = (x - NEG_1BYTE_MIN) as u8;
        buf.push(Marker::Neg1(x & 0x3f).into());
    } else {
        pack_uint(buf, x as u64);
    }
}

/// Number of bytes [`pack_uint`] would write for `x`.
pub fn packed_len_uint(x: u64) -> usize {
    if x <= POS_1BYTE_MAX {
        1
    } else if x <= POS_2BYTE_MAX + 1 {
        2
    } else {
        1 + 8 - leading_zero_bytes(x - (POS_2BYTE_MAX + 1)) as usize
    }
}

/// Number of bytes [`pack_int`] would write for `x`.
pub fn packed_len_int(x: i64) -> usize {
    if x < NEG_2BYTE_MIN {
        1 + 8 - leading_zero_bytes(!(x as u64)) as usize
    } else if x < NEG_1BYTE_MIN {
        2
    } else if x < 0 {
        1
    } else {
        packed_len_uint(x as u64)
    }
}

// Peek at the marker and make sure the whole encoding is present. Doesn't advance the buffer.
fn peek_marker(buf: &[u8], step: &'static str) -> Result<(Marker, usize)> {
    let first = *buf.first().ok_or(Error::TruncatedInput {
        step,
        actual: 0,
        expected: 1,
    })?;
    let marker = Marker::from_u8(first);
    let len = marker.trailing_len().ok_or_else(|| {
        Error::MalformedInput(format!("0x{:02x} is not a packed integer marker", first))
    })?;
    if buf.len() < len + 1 {
        return Err(Error::TruncatedInput {
            step,
            actual: buf.len(),
            expected: len + 1,
        });
    }
    Ok((marker, len))
}

fn read_tail(buf: &mut &[u8], len: usize, step: &'static str) -> Result<u64> {
    if len == 0 {
        return Ok(0);
    }
    let actual = buf.len();
    buf.read_uint::<BigEndian>(len)
        .map_err(|_| Error::TruncatedInput {
            step,
            actual,
            expected: len,
        })
}

/// Decode an unsigned integer from the front of `buf`, advancing it past the encoding.
///
/// Fails on a negative-class marker. On failure, `buf` is left untouched.
pub fn unpack_uint(buf: &mut &[u8]) -> Result<u64> {
    const STEP: &str = "unpack unsigned integer";
    let (marker, len) = peek_marker(buf, STEP)?;
    let x = match marker {
        Marker::Pos1(v) => {
            *buf = &buf[1..];
            v as u64
        }
        Marker::Pos2(hi) => {
            *buf = &buf[1..];
            let lo = read_tail(buf, len, STEP)?;
            (((hi as u64) << 8) | lo) + POS_1BYTE_MAX + 1
        }
        Marker::PosMulti(_) => {
            *buf = &buf[1..];
            read_tail(buf, len, STEP)?.wrapping_add(POS_2BYTE_MAX + 1)
        }
        other => {
            return Err(Error::MalformedInput(format!(
                "0x{:02x} marks a negative integer, expected an unsigned one",
                other.into_u8()
            )))
        }
    };
    Ok(x)
}

/// Decode a signed integer from the front of `buf`, advancing it past the encoding.
///
/// Positive-class encodings are decoded as unsigned values and reinterpreted bit-for-bit. On
/// failure, `buf` is left untouched.
pub fn unpack_int(buf: &mut &[u8]) -> Result<i64> {
    const STEP: &str = "unpack signed integer";
    let (marker, len) = peek_marker(buf, STEP)?;
    let x = match marker {
        Marker::NegMulti(_) => {
            *buf = &buf[1..];
            let tail = read_tail(buf, len, STEP)?;
            if len == 8 {
                tail as i64
            } else {
                ((u64::MAX << (8 * len)) | tail) as i64
            }
        }
        Marker::Neg2(hi) => {
            *buf = &buf[1..];
            let lo = read_tail(buf, len, STEP)?;
            ((((hi as u64) << 8) | lo) as i64) + NEG_2BYTE_MIN
        }
        Marker::Neg1(v) => {
            *buf = &buf[1..];
            NEG_1BYTE_MIN + v as i64
        }
        _ => unpack_uint(buf)? as i64,
    };
    Ok(x)
}
