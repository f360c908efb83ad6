//! Sample words as they come off the bus.

/// SPI word sizes the MCP3903 can be read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum WordSize {
    Bits8,
    Bits16,
    Bits24,
}

impl WordSize {
    /// Width of one word in bits.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits24 => 24,
        }
    }

    /// Number of bytes one word occupies on the wire.
    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

impl TryFrom<u8> for WordSize {
    type Error = u8;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            24 => Ok(Self::Bits24),
            other => Err(other),
        }
    }
}

/// Decode a raw MSB-first frame into a signed sample.
///
/// Samples are two's complement with the width of `word`. Only the first `word.bytes()`
/// bytes of `frame` are used; a short frame is padded with zeros on the right.
pub fn decode_sample(word: WordSize, frame: &[u8]) -> i32 {
    let mut raw: u32 = 0;

    for index in 0..word.bytes() {
        raw = (raw << 8) | frame.get(index).copied().unwrap_or(0) as u32;
    }

    // Shift the sign bit into bit 31 then back down to extend it
    let unused = 32 - word.bits() as u32;

    ((raw << unused) as i32) >> unused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_size_from_bits() {
        assert_eq!(WordSize::try_from(8), Ok(WordSize::Bits8));
        assert_eq!(WordSize::try_from(16), Ok(WordSize::Bits16));
        assert_eq!(WordSize::try_from(24), Ok(WordSize::Bits24));
        assert_eq!(WordSize::try_from(32), Err(32));
        assert_eq!(WordSize::Bits24.bytes(), 3);
    }

    #[test]
    fn full_scale_24_bit() {
        assert_eq!(decode_sample(WordSize::Bits24, &[0x7F, 0xFF, 0xFF]), 8_388_607);
        assert_eq!(decode_sample(WordSize::Bits24, &[0x80, 0x00, 0x00]), -8_388_608);
        assert_eq!(decode_sample(WordSize::Bits24, &[0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(decode_sample(WordSize::Bits24, &[0x00, 0x00, 0x00]), 0);
    }

    #[test]
    fn narrower_words_sign_extend() {
        assert_eq!(decode_sample(WordSize::Bits16, &[0x80, 0x00]), i16::MIN as i32);
        assert_eq!(decode_sample(WordSize::Bits16, &[0x12, 0x34]), 0x1234);
        assert_eq!(decode_sample(WordSize::Bits8, &[0xFE]), -2);
    }

    #[test]
    fn extra_bytes_are_ignored_and_short_frames_padded() {
        assert_eq!(decode_sample(WordSize::Bits8, &[0x01, 0xFF, 0xFF]), 1);
        assert_eq!(decode_sample(WordSize::Bits16, &[0x01]), 0x0100);
    }
}
