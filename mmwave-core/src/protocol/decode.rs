//! Payload field decoders and encoders.
//!
//! The R60 firmware packs signed quantities (coordinates, angles, speeds)
//! as 16 bit *signed-magnitude* values: the top bit is the sign and the low
//! 15 bits are the magnitude. This is not two's complement, so `0xFF 0xFF`
//! is -32767 and not -1.
//!
//! All multi-byte fields are big-endian. Decoders follow the device's
//! lenient convention of returning zero when the slice has the wrong length,
//! so a truncated telemetry frame never aborts dispatch.

/// Sign flag of a signed-magnitude field
const SIGN_BIT: u16 = 0x8000;

/// Largest magnitude a signed-magnitude field can carry
pub const MAX_MAGNITUDE: i16 = 0x7FFF;

/// Decode a 2 byte signed-magnitude value. Returns 0 unless exactly 2 bytes.
///
/// # Example
/// ```
/// use mmwave_core::protocol::decode::sign_magnitude_i16;
/// assert_eq!(sign_magnitude_i16(&[0x80, 0x05]), -5);
/// assert_eq!(sign_magnitude_i16(&[0x00, 0x05]), 5);
/// assert_eq!(sign_magnitude_i16(&[0xFF, 0xFF]), -32767);
/// ```
pub fn sign_magnitude_i16(bytes: &[u8]) -> i16 {
    let raw = match bytes {
        [hi, lo] => u16::from_be_bytes([*hi, *lo]),
        _ => return 0,
    };
    let magnitude = (raw & !SIGN_BIT) as i16;
    if raw & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encode a value as 2 byte signed-magnitude. -32768 saturates to -32767.
pub fn encode_sign_magnitude(value: i16) -> [u8; 2] {
    let magnitude = value.unsigned_abs().min(MAX_MAGNITUDE as u16);
    let raw = if value < 0 {
        magnitude | SIGN_BIT
    } else {
        magnitude
    };
    raw.to_be_bytes()
}

/// Decode a big-endian u16. Returns 0 unless exactly 2 bytes.
pub fn be_u16(bytes: &[u8]) -> u16 {
    match bytes {
        [hi, lo] => u16::from_be_bytes([*hi, *lo]),
        _ => 0,
    }
}

/// Decode a big-endian u32. Returns 0 unless exactly 4 bytes.
pub fn be_u32(bytes: &[u8]) -> u32 {
    match bytes {
        [a, b, c, d] => u32::from_be_bytes([*a, *b, *c, *d]),
        _ => 0,
    }
}

/// Signed-magnitude field at `offset`, 0 if the payload is too short
pub fn sm16_at(data: &[u8], offset: usize) -> i16 {
    data.get(offset..offset + 2).map_or(0, sign_magnitude_i16)
}

/// Big-endian u16 at `offset`, 0 if the payload is too short
pub fn u16_at(data: &[u8], offset: usize) -> u16 {
    data.get(offset..offset + 2).map_or(0, be_u16)
}

/// Big-endian u32 at `offset`, 0 if the payload is too short
pub fn u32_at(data: &[u8], offset: usize) -> u32 {
    data.get(offset..offset + 4).map_or(0, be_u32)
}

/// Decode an identity string.
///
/// Bytes up to the first NUL (or the whole payload) are decoded as UTF-8,
/// falling back to ASCII, and trimmed. Returns an empty string when neither
/// decoding works.
pub fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let valid = &bytes[..end];
    match std::str::from_utf8(valid) {
        Ok(s) => s.trim().to_string(),
        // ASCII is a subset of UTF-8, nothing left to fall back to
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_magnitude_examples() {
        assert_eq!(sign_magnitude_i16(&[0x80, 0x05]), -5);
        assert_eq!(sign_magnitude_i16(&[0x00, 0x05]), 5);
        assert_eq!(sign_magnitude_i16(&[0xFF, 0xFF]), -32767);
        assert_eq!(sign_magnitude_i16(&[0x80, 0x00]), 0);
        assert_eq!(sign_magnitude_i16(&[0x01, 0x2C]), 300);
    }

    #[test]
    fn test_sign_magnitude_wrong_length() {
        assert_eq!(sign_magnitude_i16(&[]), 0);
        assert_eq!(sign_magnitude_i16(&[0x80]), 0);
        assert_eq!(sign_magnitude_i16(&[0x80, 0x05, 0x00]), 0);
    }

    #[test]
    fn test_encode_sign_magnitude() {
        assert_eq!(encode_sign_magnitude(-5), [0x80, 0x05]);
        assert_eq!(encode_sign_magnitude(5), [0x00, 0x05]);
        assert_eq!(encode_sign_magnitude(i16::MIN), [0xFF, 0xFF]);
        assert_eq!(sign_magnitude_i16(&encode_sign_magnitude(-120)), -120);
    }

    #[test]
    fn test_big_endian() {
        assert_eq!(be_u16(&[0x01, 0x2C]), 300);
        assert_eq!(be_u32(&[0x00, 0x00, 0x07, 0x08]), 1800);
        assert_eq!(be_u32(&[0x01, 0x02]), 0);
        assert_eq!(u32_at(&[0xAA, 0x00, 0x00, 0x00, 0x3C], 1), 60);
        assert_eq!(u16_at(&[0x00], 0), 0);
        assert_eq!(sm16_at(&[0x00, 0x80, 0x0A], 1), -10);
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"R60ABD1\0\0\0"), "R60ABD1");
        assert_eq!(decode_text(b"  G60SM1SYv010309 "), "G60SM1SYv010309");
        assert_eq!(decode_text(b""), "");
        assert_eq!(decode_text(&[0xFF, 0xFE, 0x00]), "");
    }
}
