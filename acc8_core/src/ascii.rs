//! Fixed 7-bit character table used for string constants on the heap.

/// Byte that unsupported characters map to. Also the string terminator.
pub const UNSUPPORTED: u8 = 0x00;

/// Whether the character has a slot in the table.
#[inline]
pub fn is_supported(c: char) -> bool {
    matches!(c, ' '..='~' | '\n' | '\t')
}

/// Map a character to its table byte.
#[inline]
pub fn encode_char(c: char) -> u8 {
    if is_supported(c) {
        c as u8
    } else {
        UNSUPPORTED
    }
}

/// Map a table byte back to its character.
///
/// Returns `None` for bytes without a slot, including the terminator.
#[inline]
pub fn decode_byte(byte: u8) -> Option<char> {
    let c = byte as char;
    if is_supported(c) {
        Some(c)
    } else {
        None
    }
}

/// Encode a string into a null-terminated byte sequence.
pub fn encode(s: &str) -> Vec<u8> {
    s.chars().map(encode_char).chain(std::iter::once(0)).collect()
}

/// Decode bytes until the first null terminator, or the end of the slice.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().take_while(|b| **b != 0).filter_map(|b| decode_byte(*b)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_roundtrip_supported_set() {
        let all: String = (' '..='~').chain(['\n', '\t']).collect();
        let bytes = encode(&all);
        assert_eq!(bytes.len(), all.len() + 1);
        assert_eq!(decode(&bytes), all);
    }

    #[test]
    fn test_terminator() {
        assert_eq!(encode("hi"), vec![0x68, 0x69, 0x00]);
        assert_eq!(encode(""), vec![0x00]);
    }

    #[test]
    fn test_unsupported_maps_to_sentinel() {
        assert_eq!(encode_char('é'), UNSUPPORTED);
        assert_eq!(encode_char('\u{7f}'), UNSUPPORTED);
        assert_eq!(encode("a€b"), vec![b'a', UNSUPPORTED, b'b', 0x00]);
        assert_eq!(decode_byte(0x80), None);
    }
}
