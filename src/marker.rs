/// Packed integer class markers. For internal use only.
///
/// Only the top 1-3 bits of a marker byte are significant for the 1- and 2-byte classes, so
/// several high nibbles alias to the same class. The payload carried by each variant is
/// already masked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Negative, multi-byte. Carries the count of leading 0xFF bytes that were dropped.
    NegMulti(u8),
    /// Negative, 2-byte. Carries the high 5 bits of the rebased value.
    Neg2(u8),
    /// Negative, 1-byte. Carries the 6-bit rebased value.
    Neg1(u8),
    /// Positive, 1-byte. Carries the 6-bit value.
    Pos1(u8),
    /// Positive, 2-byte. Carries the high 5 bits of the rebased value.
    Pos2(u8),
    /// Positive, multi-byte. Carries the number of big-endian bytes that follow.
    PosMulti(u8),
    /// Not a valid first byte for a packed integer.
    Invalid(u8),
}

pub const NEG_MULTI_MARKER: u8 = 0x10;
pub const NEG_2BYTE_MARKER: u8 = 0x20;
pub const NEG_1BYTE_MARKER: u8 = 0x40;
pub const POS_1BYTE_MARKER: u8 = 0x80;
pub const POS_2BYTE_MARKER: u8 = 0xc0;
pub const POS_MULTI_MARKER: u8 = 0xe0;

impl Marker {
    /// Construct a marker from a single byte.
    pub fn from_u8(n: u8) -> Marker {
        match n {
            0x10..=0x1f => Marker::NegMulti(n & 0x0f),
            0x20..=0x3f => Marker::Neg2(n & 0x1f),
            0x40..=0x7f => Marker::Neg1(n & 0x3f),
            0x80..=0xbf => Marker::Pos1(n & 0x3f),
            0xc0..=0xdf => Marker::Pos2(n & 0x1f),
            0xe0..=0xef => Marker::PosMulti(n & 0x0f),
            _ => Marker::Invalid(n),
        }
    }

    /// Converts a marker into its single-byte representation.
    /// Assumes the content of the marker is already masked appropriately.
    pub fn into_u8(self) -> u8 {
        match self {
            Marker::NegMulti(v) => NEG_MULTI_MARKER | v,
            Marker::Neg2(v) => NEG_2BYTE_MARKER | v,
            Marker::Neg1(v) => NEG_1BYTE_MARKER | v,
            Marker::Pos1(v) => POS_1BYTE_MARKER | v,
            Marker::Pos2(v) => POS_2BYTE_MARKER | v,
            Marker::PosMulti(v) => POS_MULTI_MARKER | v,
            Marker::Invalid(v) => v,
        }
    }

    /// Number of bytes following the marker byte, if the marker is valid.
    pub fn trailing_len(self) -> Option<usize> {
        match self {
            Marker::Neg1(_) | Marker::Pos1(_) => Some(0),
            Marker::Neg2(_) | Marker::Pos2(_) => Some(1),
            Marker::PosMulti(len) if len <= 8 => Some(len as usize),
            Marker::NegMulti(lz) if lz <= 8 => Some(8 - lz as usize),
            _ => None,
        }
    }
}

impl From<u8> for Marker {
    fn from(val: u8) -> Marker {
        Marker::from_u8(val)
    }
}

impl From<Marker> for u8 {
    fn from(val: Marker) -> u8 {
        val.into_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliased_nibbles() {
        assert_eq!(Marker::from_u8(0x80), Marker::Pos1(0));
        assert_eq!(Marker::from_u8(0xbf), Marker::Pos1(0x3f));
        assert_eq!(Marker::from_u8(0xd5), Marker::Pos2(0x15));
        assert_eq!(Marker::from_u8(0x7f), Marker::Neg1(0x3f));
        assert_eq!(Marker::from_u8(0x3f), Marker::Neg2(0x1f));
        assert_eq!(Marker::from_u8(0x16), Marker::NegMulti(6));
        assert_eq!(Marker::from_u8(0xe3), Marker::PosMulti(3));
    }

    #[test]
    fn invalid_ranges() {
        for n in (0x00..=0x0f).chain(0xf0..=0xff) {
            assert_eq!(Marker::from_u8(n), Marker::Invalid(n));
            assert_eq!(Marker::from_u8(n).trailing_len(), None);
        }
        assert_eq!(Marker::from_u8(0xe9).trailing_len(), None);
        assert_eq!(Marker::from_u8(0x19).trailing_len(), None);
    }

    #[test]
    fn byte_roundtrip() {
        for n in 0..=u8::MAX {
            assert_eq!(u8::from(Marker::from(n)), n);
        }
    }
}
