//! Byte classes of the PDF lexical grammar (ISO 32000-1 Section 7.2.2)

use bitflags::bitflags;

bitflags! {
    /// Classes a single byte can belong to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharClass: u8 {
        /// NUL, TAB, LF, FF, CR, SPACE
        const WHITESPACE = 0b0000_0001;
        /// ( ) < > [ ] { } / %
        const DELIMITER  = 0b0000_0010;
        /// 0-9
        const DIGIT      = 0b0000_0100;
        /// 0-7, the digits of a literal string escape
        const OCTAL      = 0b0000_1000;
        /// 0-9 a-f A-F
        const HEX        = 0b0001_0000;
    }
}

const fn class_of(byte: u8) -> CharClass {
    match byte {
        0x00 | b'\t' | b'\n' | 0x0C | b'\r' | b' ' => CharClass::WHITESPACE,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' => {
            CharClass::DELIMITER
        }
        b'0'..=b'7' => CharClass::DIGIT
            .union(CharClass::OCTAL)
            .union(CharClass::HEX),
        b'8' | b'9' => CharClass::DIGIT.union(CharClass::HEX),
        b'a'..=b'f' | b'A'..=b'F' => CharClass::HEX,
        _ => CharClass::empty(),
    }
}

static CLASSES: [CharClass; 256] = {
    let mut table = [CharClass::empty(); 256];
    let mut i = 0;
    while i < 256 {
        table[i] = class_of(i as u8);
        i += 1;
    }
    table
};

#[inline]
pub fn class(byte: u8) -> CharClass {
    CLASSES[byte as usize]
}

#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    class(byte).contains(CharClass::WHITESPACE)
}

/// Whitespace or delimiter: the bytes that end a bare token or a name
#[inline]
pub fn is_token_boundary(byte: u8) -> bool {
    class(byte).intersects(CharClass::WHITESPACE.union(CharClass::DELIMITER))
}

#[inline]
pub fn is_digit(byte: u8) -> bool {
    class(byte).contains(CharClass::DIGIT)
}

#[inline]
pub fn is_octal(byte: u8) -> bool {
    class(byte).contains(CharClass::OCTAL)
}

/// Value of an ASCII hex digit
#[inline]
pub fn hex_value(byte: u8) -> Option<u8> {
    if !class(byte).contains(CharClass::HEX) {
        return None;
    }
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_set() {
        for byte in [0x00, b'\t', b'\n', 0x0C, b'\r', b' '] {
            assert!(is_whitespace(byte), "{byte:#04x} should be whitespace");
            assert!(is_token_boundary(byte));
        }
        // Vertical tab is not PDF whitespace
        assert!(!is_whitespace(0x0B));
        assert!(!is_whitespace(b'a'));
    }

    #[test]
    fn test_delimiter_set() {
        for byte in b"()<>[]{}/%" {
            assert!(class(*byte).contains(CharClass::DELIMITER));
            assert!(is_token_boundary(*byte));
        }
        assert!(!is_token_boundary(b'#'));
        assert!(!is_token_boundary(b'\\'));
    }

    #[test]
    fn test_numeric_classes() {
        assert!(is_octal(b'0') && is_octal(b'7'));
        assert!(!is_octal(b'8'));
        assert!(is_digit(b'9'));
        assert!(!is_digit(b'a'));
        assert!(class(b'F').contains(CharClass::HEX));
        assert!(!class(b'g').contains(CharClass::HEX));
    }

    #[test]
    fn test_hex_value() {
        assert_eq!(hex_value(b'0'), Some(0));
        assert_eq!(hex_value(b'a'), Some(10));
        assert_eq!(hex_value(b'F'), Some(15));
        assert_eq!(hex_value(b'G'), None);
        assert_eq!(hex_value(b' '), None);
        for byte in 0..=255u8 {
            assert_eq!(hex_value(byte).is_some(), class(byte).contains(CharClass::HEX));
        }
    }
}
