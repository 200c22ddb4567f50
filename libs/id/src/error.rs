//! Error types for prospect ID validation and registry operations.

use thiserror::Error;

/// Errors returned by prospect ID parsing and registry operations.
///
/// A rejected operation never modifies the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is not an 8-digit + 1-letter identifier (or, where
    /// accepted, an 8-digit area/family prefix).
    #[error("ID '{id}' is invalid: must be 8 digits + 1 letter")]
    InvalidIdentifier { id: String },

    /// The area code is not a 5-digit numeric string.
    #[error("area code '{area_code}' is invalid: must be 5 digits")]
    InvalidAreaCode { area_code: String },

    /// The family number is not a 3-digit numeric string.
    #[error("family '{family}' is invalid: must be 3 digits")]
    InvalidFamily { family: String },

    /// The identifier is already registered.
    #[error("ID '{id}' already exists")]
    DuplicateIdentifier { id: String },

    /// The identifier is not registered.
    #[error("ID '{id}' does not exist")]
    UnknownIdentifier { id: String },

    /// The last letter used in the family is already 'Z'.
    #[error("letter suffixes are exhausted for ID '{id}' (encountered 'Z')")]
    LetterExhausted { id: String },

    /// Every family number from 001 to 999 is taken in the area code.
    #[error("family numbers are exhausted for area code '{area_code}'")]
    FamilyExhausted { area_code: String },
}

impl IdError {
    /// Returns true if the input was malformed.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            IdError::InvalidIdentifier { .. }
                | IdError::InvalidAreaCode { .. }
                | IdError::InvalidFamily { .. }
        )
    }

    /// Returns true if the input was well-formed but conflicts with the
    /// registry contents.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            IdError::DuplicateIdentifier { .. } | IdError::UnknownIdentifier { .. }
        )
    }

    /// Returns true if an allocation axis has no free slot left.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            IdError::LetterExhausted { .. } | IdError::FamilyExhausted { .. }
        )
    }
}
