//! Character membership tables used by the lexer.

/// A set of ASCII characters backed by a 256 entry lookup table.
pub struct CharClass([bool; 256]);

impl CharClass {
    pub const fn new(accepted: &[u8]) -> Self {
        let mut lut = [false; 256];
        let mut i = 0;
        while i < accepted.len() {
            lut[accepted[i] as usize] = true;
            i += 1;
        }
        CharClass(lut)
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.0[c as usize]
    }
}

pub static WHITESPACE: CharClass = CharClass::new(b" \t\n\r\x0b\x0c");

pub static DIGITS: CharClass = CharClass::new(b"0123456789");

/// Characters that may continue a decimal literal, both decimal points included.
pub static NUMERIC: CharClass = CharClass::new(b".,0123456789");

pub static OPERATORS: CharClass = CharClass::new(b"*+-/");

/// Every character used by a unit name.
pub static UNIT_LETTERS: CharClass = CharClass::new(b"mMkKcfootfeetinchesyardsmilesthou'\"");

pub static HEX_DIGITS: CharClass = CharClass::new(b"0123456789abcdefABCDEF");

pub static BINARY_DIGITS: CharClass = CharClass::new(b"01");

/// Can this character start a unit or symbol?
pub fn starts_symbol(c: char) -> bool {
    UNIT_LETTERS.contains(c) || c.is_ascii_alphabetic() || c == '_'
}

/// Can this character continue a unit or symbol?
pub fn continues_symbol(c: char) -> bool {
    starts_symbol(c) || DIGITS.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert!(WHITESPACE.contains('\t'));
        assert!(!WHITESPACE.contains('_'));
        assert!(NUMERIC.contains(','));
        assert!(!DIGITS.contains(','));
        assert!(OPERATORS.contains('/'));
        assert!(!OPERATORS.contains('%'));
        assert!(HEX_DIGITS.contains('F'));
        assert!(!HEX_DIGITS.contains('g'));
        assert!(!BINARY_DIGITS.contains('2'));
    }

    #[test]
    fn unit_names_are_covered() {
        for name in ["mm", "Km", "thou", "yards", "miles", "\"", "'"] {
            assert!(name.chars().all(|c| UNIT_LETTERS.contains(c)), "{name}");
        }
    }

    #[test]
    fn non_ascii_is_never_a_member() {
        assert!(!UNIT_LETTERS.contains('µ'));
        assert!(!starts_symbol('µ'));
        assert!(continues_symbol('9'));
        assert!(!starts_symbol('9'));
    }
}
