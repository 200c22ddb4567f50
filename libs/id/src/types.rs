//! Prospect ID components and string-level validation.
//!
//! A prospect ID is nine ASCII characters: a 5-digit area code, a 3-digit
//! family number, and a 1-letter version suffix, e.g. `01001002B`.

use crate::define_code;
use crate::IdError;

/// Length of a full prospect ID.
pub const ID_LEN: usize = 9;

/// Length of the `area_code + family` prefix.
pub const PREFIX_LEN: usize = AreaCode::WIDTH + FamilyNumber::WIDTH;

// =============================================================================
// String predicates
// =============================================================================

/// Returns true if `s` is non-empty and made only of ASCII digits, and, when
/// `length` is given, exactly that many bytes long.
pub fn is_numeric_string(s: &str, length: Option<usize>) -> bool {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    length.is_none_or(|len| s.len() == len)
}

/// Returns true if `id` has the prospect ID shape: 8 digits followed by one
/// alphabetic character. Case is not checked.
pub fn is_valid(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == ID_LEN
        && bytes[..PREFIX_LEN].iter().all(u8::is_ascii_digit)
        && bytes[PREFIX_LEN].is_ascii_alphabetic()
}

/// Splits an ID string into `(area_code, family, letter)` slices.
///
/// No content validation is done; callers check [`is_valid`] first. Returns
/// `None` only if the string cannot be sliced at those positions.
pub fn decompose(id: &str) -> Option<(&str, &str, &str)> {
    Some((
        id.get(..AreaCode::WIDTH)?,
        id.get(AreaCode::WIDTH..PREFIX_LEN)?,
        id.get(PREFIX_LEN..ID_LEN)?,
    ))
}

// =============================================================================
// Numeric codes
// =============================================================================

define_code!(AreaCode, u32, 5, InvalidAreaCode, area_code);
define_code!(FamilyNumber, u16, 3, InvalidFamily, family);

impl FamilyNumber {
    /// The lowest family number handed out by allocation.
    pub const FIRST: Self = Self(1);
}

// =============================================================================
// Letter suffix
// =============================================================================

/// Alphabetic version suffix of a prospect ID.
///
/// Any ASCII letter is accepted; allocation only ever produces letters in the
/// same case as the letter it follows, starting from `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Letter(u8);

impl Letter {
    /// The first letter in a family.
    pub const FIRST: Self = Self(b'A');

    /// Creates a letter from a char. Returns `None` if it is not an ASCII
    /// letter.
    #[must_use]
    pub const fn new(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            Some(Self(c as u8))
        } else {
            None
        }
    }

    /// Returns the letter as a char.
    #[must_use]
    pub const fn as_char(&self) -> char {
        self.0 as char
    }

    /// Returns the next letter of the alphabet, or `None` after `Z`/`z`.
    #[must_use]
    pub const fn successor(&self) -> Option<Self> {
        match self.0 {
            b'Z' | b'z' => None,
            b => Some(Self(b + 1)),
        }
    }

    /// Parses a single-letter string.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c).ok_or_else(|| IdError::InvalidIdentifier {
                id: s.to_string(),
            }),
            _ => Err(IdError::InvalidIdentifier { id: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for Letter {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Letter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Letter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Prospect ID
// =============================================================================

/// A full prospect ID: area code, family number, and letter.
///
/// Ordering matches the ordering of the canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProspectId {
    area_code: AreaCode,
    family: FamilyNumber,
    letter: Letter,
}

impl ProspectId {
    /// Recomposes an ID from its parts.
    #[must_use]
    pub const fn from_parts(area_code: AreaCode, family: FamilyNumber, letter: Letter) -> Self {
        Self {
            area_code,
            family,
            letter,
        }
    }

    /// Parses an ID from its 9-character string form.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let invalid = || IdError::InvalidIdentifier { id: s.to_string() };

        if !is_valid(s) {
            return Err(invalid());
        }
        let (area_code, family, letter) = decompose(s).ok_or_else(invalid)?;

        Ok(Self {
            area_code: AreaCode::parse(area_code)?,
            family: FamilyNumber::parse(family)?,
            letter: Letter::parse(letter)?,
        })
    }

    /// Parses an 8-digit `area_code + family` prefix.
    pub fn parse_prefix(s: &str) -> Result<(AreaCode, FamilyNumber), IdError> {
        if !is_numeric_string(s, Some(PREFIX_LEN)) {
            return Err(IdError::InvalidIdentifier { id: s.to_string() });
        }
        let (area_code, family) = s.split_at(AreaCode::WIDTH);
        Ok((AreaCode::parse(area_code)?, FamilyNumber::parse(family)?))
    }

    /// Returns the area code.
    #[must_use]
    pub const fn area_code(&self) -> AreaCode {
        self.area_code
    }

    /// Returns the family number.
    #[must_use]
    pub const fn family(&self) -> FamilyNumber {
        self.family
    }

    /// Returns the letter suffix.
    #[must_use]
    pub const fn letter(&self) -> Letter {
        self.letter
    }

    /// Returns `(area_code, family, letter)`.
    #[must_use]
    pub const fn parts(&self) -> (AreaCode, FamilyNumber, Letter) {
        (self.area_code, self.family, self.letter)
    }

    /// Returns the 8-digit `area_code + family` prefix.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{}{}", self.area_code, self.family)
    }
}

impl std::fmt::Display for ProspectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.area_code, self.family, self.letter)
    }
}

impl std::str::FromStr for ProspectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ProspectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ProspectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(is_valid("01001001A"));
        assert!(is_valid("01001001a"));
        assert!(!is_valid("01001001"));
        assert!(!is_valid("01001001AB"));
        assert!(!is_valid("0100100AA"));
        assert!(!is_valid("010010011"));
        assert!(!is_valid(""));
        assert!(!is_valid("0100100é"));
    }

    #[test]
    fn test_is_numeric_string() {
        assert!(is_numeric_string("12345", None));
        assert!(is_numeric_string("12345", Some(5)));
        assert!(!is_numeric_string("1234", Some(5)));
        assert!(!is_numeric_string("1234a", None));
        assert!(!is_numeric_string("", None));
        assert!(!is_numeric_string("-1234", Some(5)));
    }

    #[test]
    fn test_decompose() {
        assert_eq!(decompose("01001002B"), Some(("01001", "002", "B")));
        assert_eq!(decompose("0100100"), None);
    }

    #[test]
    fn test_area_code_zero_padded() {
        let code = AreaCode::parse("00042").unwrap();
        assert_eq!(code.value(), 42);
        assert_eq!(code.to_string(), "00042");
    }

    #[test]
    fn test_area_code_invalid() {
        assert!(matches!(
            AreaCode::parse("1234"),
            Err(IdError::InvalidAreaCode { .. })
        ));
        assert!(matches!(
            AreaCode::parse("1234x"),
            Err(IdError::InvalidAreaCode { .. })
        ));
    }

    #[test]
    fn test_family_number_bounds() {
        assert_eq!(FamilyNumber::new(999).unwrap().to_string(), "999");
        assert!(FamilyNumber::new(1000).is_none());
        assert_eq!(FamilyNumber::MAX, 999);
        assert_eq!(FamilyNumber::FIRST.to_string(), "001");
    }

    #[test]
    fn test_letter_successor() {
        assert_eq!(Letter::FIRST.successor(), Letter::new('B'));
        assert_eq!(Letter::new('Y').unwrap().successor(), Letter::new('Z'));
        assert_eq!(Letter::new('Z').unwrap().successor(), None);
        assert_eq!(Letter::new('c').unwrap().successor(), Letter::new('d'));
        assert_eq!(Letter::new('z').unwrap().successor(), None);
        assert!(Letter::new('1').is_none());
    }

    #[test]
    fn test_prospect_id_roundtrip() {
        let id = ProspectId::parse("01001002B").unwrap();
        assert_eq!(id.area_code().to_string(), "01001");
        assert_eq!(id.family().value(), 2);
        assert_eq!(id.letter().as_char(), 'B');
        assert_eq!(id.prefix(), "01001002");
        assert_eq!(id.to_string(), "01001002B");

        let (area_code, family, letter) = id.parts();
        assert_eq!(ProspectId::from_parts(area_code, family, letter), id);
    }

    #[test]
    fn test_prospect_id_invalid() {
        assert!(matches!(
            "01001002".parse::<ProspectId>(),
            Err(IdError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_parse_prefix() {
        let (area_code, family) = ProspectId::parse_prefix("12345007").unwrap();
        assert_eq!(area_code.to_string(), "12345");
        assert_eq!(family.value(), 7);
        assert!(ProspectId::parse_prefix("12345007A").is_err());
    }

    #[test]
    fn test_prospect_id_ordering_matches_strings() {
        let mut ids: Vec<ProspectId> = ["12345002A", "01001010C", "01001002B", "01001002A"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["01001002A", "01001002B", "01001010C", "12345002A"]
        );
    }

    #[test]
    fn test_binary_roundtrip() {
        let letter = Letter::new('B').unwrap();
        let bytes = bincode::serialize(&letter).unwrap();
        assert_eq!(bincode::deserialize::<Letter>(&bytes).unwrap(), letter);

        let id: ProspectId = "01001002B".parse().unwrap();
        let bytes = bincode::serialize(&id).unwrap();
        assert_eq!(bincode::deserialize::<ProspectId>(&bytes).unwrap(), id);

        let family = FamilyNumber::new(7).unwrap();
        let bytes = bincode::serialize(&family).unwrap();
        assert_eq!(bincode::deserialize::<FamilyNumber>(&bytes).unwrap(), family);
    }

    #[test]
    fn test_letter_serializes_as_string() {
        let letter = Letter::new('c').unwrap();
        assert_eq!(serde_json::to_string(&letter).unwrap(), "\"c\"");
        assert!(serde_json::from_str::<Letter>("\"cd\"").is_err());
    }

    #[test]
    fn test_prospect_id_json_roundtrip() {
        let id: ProspectId = "01001002B".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"01001002B\"");
        let parsed: ProspectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
