//! Newline-delimited ID file source.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use prospect_id::ProspectId;
use tracing::{debug, info};

use crate::{accept_row, normalize, IdSource, SourceError};

/// Reads issued IDs from a text file with one ID per line.
///
/// Surrounding whitespace is trimmed; blank lines and lines starting with
/// `#` are ignored. A missing file is treated as an empty source.
///
/// Comments and rows that fail the row filter are kept when the file is
/// rewritten with [`FileSource::write_all`].
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the sibling lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Takes an exclusive advisory lock on the ID file, waiting for other
    /// holders to release it.
    ///
    /// Hold the lock across load, mutation, and [`FileSource::write_all`]
    /// so that concurrent writers do not issue the same ID.
    pub async fn lock(&self) -> Result<FileLock, SourceError> {
        let lock_path = self.lock_path();
        let path = lock_path.clone();

        let file = tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?;
            file.lock_exclusive()?;
            Ok::<_, std::io::Error>(file)
        })
        .await
        .map_err(|e| SourceError::io(&lock_path, std::io::Error::other(e)))?
        .map_err(|e| SourceError::io(&lock_path, e))?;

        debug!(path = ?lock_path, "acquired id file lock");
        Ok(FileLock { file })
    }

    /// Replaces the IDs in the file with the given IDs, one per line, sorted.
    ///
    /// Comments and rows rejected by the row filter are kept, in their
    /// original order, ahead of the IDs. The file is written to a sibling
    /// temp file first and renamed into place.
    pub async fn write_all<I>(&self, ids: I) -> Result<(), SourceError>
    where
        I: IntoIterator<Item = ProspectId>,
    {
        let mut ids: Vec<ProspectId> = ids.into_iter().collect();
        ids.sort();

        let existing = match tokio::fs::read_to_string(&self.path).await {
            Ok(existing) => existing,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(SourceError::io(&self.path, e)),
        };
        let kept = kept_lines(&existing);

        let mut contents = String::with_capacity(ids.len() * (prospect_id::ID_LEN + 1));
        for line in &kept {
            contents.push_str(line);
            contents.push('\n');
        }
        for id in &ids {
            contents.push_str(&id.to_string());
            contents.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| SourceError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SourceError::io(&self.path, e))?;

        info!(
            path = ?self.path,
            ids = ids.len(),
            kept_lines = kept.len(),
            "wrote prospect id file"
        );
        Ok(())
    }
}

/// Exclusive lock on an ID file, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Lines of an existing ID file that are not loaded as IDs: comments and
/// rows rejected by the row filter.
fn kept_lines(existing: &str) -> Vec<&str> {
    existing
        .lines()
        .map(str::trim_end)
        .filter(|line| {
            let row = line.trim();
            !row.is_empty() && (row.starts_with('#') || accept_row(row).is_none())
        })
        .collect()
}

#[async_trait]
impl IdSource for FileSource {
    async fn fetch(&self) -> Result<Vec<ProspectId>, SourceError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "id file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(SourceError::io(&self.path, e)),
        };

        let rows = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        Ok(normalize(rows, &self.describe()))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_registry;

    #[tokio::test]
    async fn test_fetch_skips_comments_and_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        tokio::fs::write(
            &path,
            "# issued ids\n12345001B\n\n  01001001A  \nnot-an-id\n00000000A\n12345001A\n",
        )
        .await
        .unwrap();

        let source = FileSource::new(&path);
        let ids: Vec<String> = source
            .fetch()
            .await
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["01001001A", "12345001A", "12345001B"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("missing.txt"));
        assert!(source.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_all_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("ids.txt"));

        let ids = ["12345002A", "12345001A", "12345001B"]
            .iter()
            .map(|s| s.parse::<ProspectId>().unwrap());
        source.write_all(ids).await.unwrap();

        let contents = tokio::fs::read_to_string(source.path()).await.unwrap();
        assert_eq!(contents, "12345001A\n12345001B\n12345002A\n");

        let registry = load_registry(&source).await.unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.next_available_letter("12345001").unwrap().as_char(), 'C');
        assert_eq!(registry.next_available_family("12345").unwrap().to_string(), "003");
    }

    #[tokio::test]
    async fn test_write_all_keeps_comments_and_rejected_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        tokio::fs::write(&path, "# owner: gis team\n01001001A\n0100100XB\n00000000A\n")
            .await
            .unwrap();

        let source = FileSource::new(&path);
        let mut registry = load_registry(&source).await.unwrap();
        let minted = registry.next_new_family_id("01001").unwrap();
        assert_eq!(minted.to_string(), "01001002A");
        registry.add_id(minted).unwrap();
        source.write_all(registry.iter()).await.unwrap();

        let after = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            after,
            "# owner: gis team\n0100100XB\n00000000A\n01001001A\n01001002A\n"
        );

        // A second write does not duplicate the kept lines.
        source.write_all(registry.iter()).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), after);
        assert_eq!(load_registry(&source).await.unwrap(), registry);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("ids.txt"));

        let lock = source.lock().await.unwrap();
        let other = File::open(source.lock_path()).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
        other.unlock().unwrap();
    }
}
