//! # prospect-source
//!
//! Sources for the IDs that have already been issued, used to build the
//! initial [`Registry`].
//!
//! ## Design Principles
//!
//! - The registry never knows where its IDs came from; sources fetch and
//!   filter, then hand over an ordered list
//! - Every source applies the same row filter: 9 characters, a non-zero
//!   8-digit numeric prefix, and an alphabetic last character
//! - Rows that fail the filter are skipped with a warning, never an error
//! - Results are ordered by ID string before loading
//!
//! ## Sources
//!
//! - [`FileSource`]: newline-delimited file, also writable for persisting
//!   minted IDs
//! - [`PgSource`]: a Postgres table with a prospect ID column

mod error;
mod file;
mod postgres;

pub use error::SourceError;
pub use file::{FileLock, FileSource};
pub use postgres::{DbConfig, PgSource, DEFAULT_TABLE};

use async_trait::async_trait;
use prospect_id::{ProspectId, Registry, ID_LEN, PREFIX_LEN};
use tracing::{info, warn};

/// A supplier of already-issued prospect IDs.
#[async_trait]
pub trait IdSource: Send + Sync {
    /// Fetches every issued ID, filtered and sorted by ID string.
    async fn fetch(&self) -> Result<Vec<ProspectId>, SourceError>;

    /// Human-readable description for logs and output.
    fn describe(&self) -> String;
}

/// Fetches all IDs from a source and builds a registry from them.
pub async fn load_registry(source: &dyn IdSource) -> Result<Registry, SourceError> {
    let ids = source.fetch().await?;
    info!(source = %source.describe(), ids = ids.len(), "loaded issued prospect ids");
    Ok(Registry::from_ids(ids))
}

/// Applies the issued-ID row filter to a raw value.
///
/// Accepts exactly 9 characters with a numeric, non-zero 8-character prefix
/// and an alphabetic final character.
pub fn accept_row(raw: &str) -> Option<ProspectId> {
    if raw.len() != ID_LEN || raw.bytes().take(PREFIX_LEN).all(|b| b == b'0') {
        return None;
    }
    ProspectId::parse(raw).ok()
}

/// Filters raw rows and orders the survivors by ID string.
pub(crate) fn normalize<I, S>(rows: I, origin: &str) -> Vec<ProspectId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<ProspectId> = rows
        .into_iter()
        .filter_map(|row| {
            let row = row.as_ref();
            let id = accept_row(row);
            if id.is_none() {
                warn!(origin, row, "skipping malformed prospect id");
            }
            id
        })
        .collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_row() {
        assert!(accept_row("01001001A").is_some());
        assert!(accept_row("01001001a").is_some());
        assert!(accept_row("00000000A").is_none());
        assert!(accept_row("0100100A").is_none());
        assert!(accept_row("01001001AB").is_none());
        assert!(accept_row("0100100XA").is_none());
        assert!(accept_row("010010011").is_none());
    }

    #[test]
    fn test_normalize_filters_and_sorts() {
        let ids = normalize(["12345001A", "junk", "01001002B", "01001001A"], "test");
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["01001001A", "01001002B", "12345001A"]);
    }
}
