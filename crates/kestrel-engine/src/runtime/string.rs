//! Immutable shared strings.
//!
//! A string is a sequence of UTF-16 code units, which is what `length`,
//! indexing, comparison and the iteration protocol see. Lone surrogates are
//! kept as they are; UTF-8 only appears when a string is displayed.

use std::fmt;
use std::rc::Rc;

/// An immutable, cheaply cloneable string value.
///
/// Ordering compares code units, which is the relational order of the
/// language.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<[u16]>);

impl JsString {
    /// Creates a string from UTF-8 text.
    pub fn new(value: &str) -> Self {
        Self(value.encode_utf16().collect())
    }

    /// The empty string.
    pub fn empty() -> Self {
        Self::from_code_units(&[])
    }

    /// The length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The UTF-16 code units of the string.
    pub fn code_units(&self) -> &[u16] {
        &self.0
    }

    /// The code unit at `index`, if in range.
    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        self.0.get(index).copied()
    }

    /// Builds a string from UTF-16 code units, surrogates included.
    pub fn from_code_units(units: &[u16]) -> Self {
        Self(Rc::from(units))
    }

    /// The substring between two code unit offsets (clamped, `start <= end`).
    pub fn substring(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        if start == 0 && end == self.len() {
            return self.clone();
        }
        Self::from_code_units(&self.0[start..end])
    }

    /// Concatenates two strings.
    pub fn concat(&self, other: &JsString) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut joined = Vec::with_capacity(self.len() + other.len());
        joined.extend_from_slice(&self.0);
        joined.extend_from_slice(&other.0);
        Self(joined.into())
    }

    /// Concatenates a sequence of strings, placing `separator` between them.
    pub fn join<'a>(parts: impl IntoIterator<Item = &'a JsString>, separator: &JsString) -> Self {
        let mut joined = Vec::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                joined.extend_from_slice(&separator.0);
            }
            joined.extend_from_slice(&part.0);
        }
        Self(joined.into())
    }

    /// Returns true if the string equals the given text exactly.
    pub fn eq_str(&self, text: &str) -> bool {
        self.0.iter().copied().eq(text.encode_utf16())
    }

    /// Decodes the string as UTF-8, replacing lone surrogates with U+FFFD.
    pub fn to_std_string(&self) -> String {
        char::decode_utf16(self.0.iter().copied())
            .map(|decoded| decoded.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }

    /// Returns the canonical array index this string denotes, if any:
    /// a decimal integer without leading zeros below 2^32 - 1.
    pub fn to_array_index(&self) -> Option<u32> {
        let units = &self.0;
        if units.is_empty() || units.len() > 10 || (units.len() > 1 && units[0] == u16::from(b'0')) {
            return None;
        }
        let mut value: u64 = 0;
        for unit in units.iter() {
            let digit = char::from_u32(u32::from(*unit))?.to_digit(10)?;
            value = value * 10 + u64::from(digit);
        }
        (value < u64::from(u32::MAX)).then_some(value as u32)
    }
}

impl Default for JsString {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for JsString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JsString {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<Rc<str>> for JsString {
    fn from(value: Rc<str>) -> Self {
        Self::new(&value)
    }
}

impl From<Vec<u16>> for JsString {
    fn from(units: Vec<u16>) -> Self {
        Self(units.into())
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.eq_str(other)
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.eq_str(other)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_std_string())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match String::from_utf16(&self.0) {
            Ok(text) => write!(f, "{text:?}"),
            Err(_) => write!(f, "{:?}", &*self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_utf16_code_units() {
        assert_eq!(JsString::from("abc").len(), 3);
        assert_eq!(JsString::from("é").len(), 1);
        assert_eq!(JsString::from("😀").len(), 2);
        assert!(JsString::empty().is_empty());
    }

    #[test]
    fn test_substring_and_code_units() {
        let s = JsString::from("a😀b");
        assert_eq!(s.code_unit_at(0), Some(0x61));
        assert_eq!(s.code_unit_at(1), Some(0xD83D));
        assert_eq!(s.code_unit_at(4), None);
        assert_eq!(s.substring(1, 3), "😀");
        assert_eq!(s.substring(3, 10), "b");
        assert_eq!(s.substring(1, 2).code_units(), &[0xD83D]);
    }

    #[test]
    fn test_lone_surrogates_are_preserved() {
        let high = JsString::from_code_units(&[0xD83D]);
        let low = JsString::from_code_units(&[0xDE00]);
        assert_ne!(high, low);
        assert_ne!(high, JsString::from("\u{FFFD}"));
        assert_eq!(high.concat(&low), JsString::from("😀"));
        assert_eq!(high.to_std_string(), "\u{FFFD}");
        let s = JsString::from("😀");
        assert_eq!(s.substring(0, 1).concat(&s.substring(1, 2)), s);
    }

    #[test]
    fn test_ordering_compares_code_units() {
        // U+FF61 precedes U+1F600 as a code point but its single code
        // unit is above the high surrogate of U+1F600
        assert!(JsString::from("\u{FF61}") > JsString::from("😀"));
        assert!(JsString::from("a") < JsString::from("ab"));
    }

    #[test]
    fn test_array_index() {
        assert_eq!(JsString::from("0").to_array_index(), Some(0));
        assert_eq!(JsString::from("42").to_array_index(), Some(42));
        assert_eq!(JsString::from("4294967294").to_array_index(), Some(4_294_967_294));
        assert_eq!(JsString::from("4294967295").to_array_index(), None);
        assert_eq!(JsString::from("01").to_array_index(), None);
        assert_eq!(JsString::from("-1").to_array_index(), None);
        assert_eq!(JsString::from("1.5").to_array_index(), None);
        assert_eq!(JsString::from("").to_array_index(), None);
    }

    #[test]
    fn test_concat_and_join() {
        let joined = JsString::from("foo").concat(&JsString::from("bar"));
        assert_eq!(joined, "foobar");
        let parts = [JsString::from("a"), JsString::from("b"), JsString::from("c")];
        assert_eq!(JsString::join(&parts, &JsString::from(", ")), "a, b, c");
        assert_eq!(JsString::join(&[], &JsString::from(",")), "");
    }
}
