//! In-memory registry of issued prospect IDs.
//!
//! The registry is a two-level map `area_code -> family -> letters`, where
//! each letter list keeps insertion order. It is built once from the IDs
//! already issued elsewhere and then mutated with [`Registry::add`] and
//! [`Registry::remove`]. Allocation queries fill the lowest free family
//! number before extending the range, and hand out the letter after the
//! most recently appended one.
//!
//! # Invariants
//!
//! - A letter appears at most once per family (for IDs entered via `add`)
//! - Families and area codes with no letters are pruned on removal
//! - Keys are fixed-width codes, so they always render zero-padded
//!
//! The registry has no internal locking; wrap it in a lock to share it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{decompose, is_numeric_string, is_valid, PREFIX_LEN};
use crate::{AreaCode, FamilyNumber, IdError, Letter, ProspectId};

type Families = BTreeMap<FamilyNumber, Vec<Letter>>;

/// Registry of issued prospect IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    areas: BTreeMap<AreaCode, Families>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from already-issued IDs.
    ///
    /// Letters are appended in the order given; the input is expected to be
    /// sorted by ID string. No duplicate check is performed.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ProspectId>,
    {
        let mut registry = Self::new();
        registry.extend(ids);
        debug!(
            area_codes = registry.areas.len(),
            ids = registry.len(),
            "registry loaded"
        );
        registry
    }

    fn push(&mut self, id: ProspectId) {
        self.areas
            .entry(id.area_code())
            .or_default()
            .entry(id.family())
            .or_default()
            .push(id.letter());
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns true if the ID string is not registered.
    ///
    /// Strings that cannot name a registered ID are always novel.
    pub fn is_novel(&self, id: &str) -> bool {
        let Some((area_code, family, letter)) = decompose(id) else {
            return true;
        };
        let (Ok(area_code), Ok(family), Ok(letter)) = (
            AreaCode::parse(area_code),
            FamilyNumber::parse(family),
            Letter::parse(letter),
        ) else {
            return true;
        };
        !self.contains(&ProspectId::from_parts(area_code, family, letter))
    }

    /// Returns true if the ID is registered.
    pub fn contains(&self, id: &ProspectId) -> bool {
        self.letters(&id.area_code(), &id.family())
            .is_some_and(|letters| letters.contains(&id.letter()))
    }

    /// Returns the number of registered IDs.
    pub fn len(&self) -> usize {
        self.areas
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Returns true if no IDs are registered.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Returns the registered area codes in ascending order.
    pub fn area_codes(&self) -> impl Iterator<Item = AreaCode> + '_ {
        self.areas.keys().copied()
    }

    /// Returns the registered families of an area code in ascending order.
    pub fn families(&self, area_code: &AreaCode) -> impl Iterator<Item = FamilyNumber> + '_ {
        self.areas
            .get(area_code)
            .into_iter()
            .flat_map(|families| families.keys().copied())
    }

    /// Returns the letters of a family in insertion order.
    pub fn letters(&self, area_code: &AreaCode, family: &FamilyNumber) -> Option<&[Letter]> {
        self.areas
            .get(area_code)
            .and_then(|families| families.get(family))
            .map(Vec::as_slice)
    }

    /// Iterates over all registered IDs, by area code and family, with
    /// letters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ProspectId> + '_ {
        self.areas.iter().flat_map(|(area_code, families)| {
            families.iter().flat_map(move |(family, letters)| {
                letters
                    .iter()
                    .map(move |letter| ProspectId::from_parts(*area_code, *family, *letter))
            })
        })
    }

    /// Returns a serializable copy of the registry contents.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot(
            self.areas
                .iter()
                .map(|(area_code, families)| {
                    let families = families
                        .iter()
                        .map(|(family, letters)| {
                            (
                                family.to_string(),
                                letters.iter().map(ToString::to_string).collect(),
                            )
                        })
                        .collect();
                    (area_code.to_string(), families)
                })
                .collect(),
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Registers an ID string.
    ///
    /// Fails with `InvalidIdentifier` if the string is malformed and with
    /// `DuplicateIdentifier` if it is already registered.
    pub fn add(&mut self, id: &str) -> Result<(), IdError> {
        let id = ProspectId::parse(id)?;
        self.add_id(id)
    }

    /// Registers a parsed ID. Fails with `DuplicateIdentifier` if it is
    /// already registered.
    pub fn add_id(&mut self, id: ProspectId) -> Result<(), IdError> {
        if self.contains(&id) {
            return Err(IdError::DuplicateIdentifier { id: id.to_string() });
        }
        self.push(id);
        debug!(%id, "registered prospect id");
        Ok(())
    }

    /// Unregisters an ID string.
    ///
    /// Fails with `InvalidIdentifier` if the string is malformed and with
    /// `UnknownIdentifier` if it is not registered.
    pub fn remove(&mut self, id: &str) -> Result<(), IdError> {
        let id = ProspectId::parse(id)?;
        self.remove_id(id)
    }

    /// Unregisters a parsed ID, removing one occurrence of its letter and
    /// pruning the family and area code if they become empty.
    pub fn remove_id(&mut self, id: ProspectId) -> Result<(), IdError> {
        let unknown = || IdError::UnknownIdentifier { id: id.to_string() };
        let (area_code, family, letter) = id.parts();

        let families = self.areas.get_mut(&area_code).ok_or_else(unknown)?;
        let letters = families.get_mut(&family).ok_or_else(unknown)?;
        let position = letters
            .iter()
            .position(|l| *l == letter)
            .ok_or_else(unknown)?;

        letters.remove(position);
        if letters.is_empty() {
            families.remove(&family);
        }
        if families.is_empty() {
            self.areas.remove(&area_code);
        }

        debug!(%id, "unregistered prospect id");
        Ok(())
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Returns the lowest free family number for an area code.
    ///
    /// Gaps in `1..=max` are reused before the range is extended; an
    /// unknown area code starts at `001`.
    pub fn next_available_family(&self, area_code: &str) -> Result<FamilyNumber, IdError> {
        if !is_numeric_string(area_code, Some(AreaCode::WIDTH)) {
            return Err(IdError::InvalidAreaCode {
                area_code: area_code.to_string(),
            });
        }
        let code = AreaCode::parse(area_code)?;

        let mut candidate = FamilyNumber::FIRST.value();
        for family in self.families(&code) {
            if family.value() > candidate {
                break;
            }
            if family.value() == candidate {
                candidate += 1;
            }
        }

        FamilyNumber::new(candidate).ok_or_else(|| IdError::FamilyExhausted {
            area_code: area_code.to_string(),
        })
    }

    /// Returns the letter following the last letter appended to a family.
    ///
    /// Accepts a full ID (its letter is ignored) or an 8-digit
    /// `area_code + family` prefix. The successor is taken from the most
    /// recently appended letter, not the alphabetically greatest one. An
    /// unknown family starts at `A`; a family ending in `Z` fails with
    /// `LetterExhausted`.
    pub fn next_available_letter(&self, id_or_prefix: &str) -> Result<Letter, IdError> {
        let prefix = if is_valid(id_or_prefix) {
            &id_or_prefix[..PREFIX_LEN]
        } else if is_numeric_string(id_or_prefix, Some(PREFIX_LEN)) {
            id_or_prefix
        } else {
            return Err(IdError::InvalidIdentifier {
                id: id_or_prefix.to_string(),
            });
        };
        let (area_code, family) = ProspectId::parse_prefix(prefix)?;

        match self
            .letters(&area_code, &family)
            .and_then(|letters| letters.last())
        {
            Some(last) => last.successor().ok_or_else(|| IdError::LetterExhausted {
                id: id_or_prefix.to_string(),
            }),
            None => Ok(Letter::FIRST),
        }
    }

    /// Returns the first ID of the next free family in an area code
    /// (`<area_code><next family>A`).
    pub fn next_new_family_id(&self, area_code: &str) -> Result<ProspectId, IdError> {
        let family = self.next_available_family(area_code)?;
        Ok(ProspectId::from_parts(
            AreaCode::parse(area_code)?,
            family,
            Letter::FIRST,
        ))
    }

    /// Returns the next version of a family (`<prefix><next letter>`).
    pub fn next_id_in_family(&self, id_or_prefix: &str) -> Result<ProspectId, IdError> {
        let letter = self.next_available_letter(id_or_prefix)?;
        let (area_code, family) = ProspectId::parse_prefix(&id_or_prefix[..PREFIX_LEN])?;
        Ok(ProspectId::from_parts(area_code, family, letter))
    }
}

impl Extend<ProspectId> for Registry {
    fn extend<I: IntoIterator<Item = ProspectId>>(&mut self, ids: I) {
        for id in ids {
            self.push(id);
        }
    }
}

impl FromIterator<ProspectId> for Registry {
    fn from_iter<I: IntoIterator<Item = ProspectId>>(ids: I) -> Self {
        Self::from_ids(ids)
    }
}

/// Plain-string copy of the registry: `area_code -> family -> letters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot(pub BTreeMap<String, BTreeMap<String, Vec<String>>>);

// =============================================================================
// Tests
// =============================================================================
