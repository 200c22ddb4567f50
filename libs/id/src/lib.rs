//! # prospect-id
//!
//! Prospect ID types, validation, and allocation.
//!
//! ## ID Format
//!
//! A prospect ID is nine characters: `{area_code}{family}{letter}`
//!
//! - `area_code`: 5 digits identifying the wider area (e.g. a county)
//! - `family`: 3 digits numbering an area of interest within the area code
//! - `letter`: 1 letter versioning the area of interest within its family
//!
//! Examples:
//! - `01001001A`
//! - `01001001B` (second version of the same family)
//! - `01001002A` (next family in the same area code)
//!
//! ## Allocation
//!
//! The [`Registry`] holds every issued ID and answers "what comes next":
//! - [`Registry::next_available_family`] reuses the lowest gap before
//!   extending the family range
//! - [`Registry::next_available_letter`] returns the letter after the one
//!   most recently appended to the family
//!
//! The registry never talks to storage. It is built from an already-fetched
//! list of IDs and callers decide when to persist what they mint.

mod error;
mod macros;
mod registry;
mod types;

pub use error::IdError;
pub use registry::{Registry, RegistrySnapshot};
pub use types::*;
