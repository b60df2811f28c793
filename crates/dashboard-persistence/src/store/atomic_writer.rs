use dashboard_core::{DashboardError, DashboardResult};
use std::path::Path;
use tokio::fs;

/// Whole-file writes for document files.
///
/// Content goes to a sibling temp file that is then persisted over the
/// target, so readers and the file watcher never observe a partial document.
pub struct AtomicWriter;

impl AtomicWriter {
    /// Replace `path` with `data`, creating the collection directory on first use.
    pub async fn write_atomic(path: &Path, data: &[u8]) -> DashboardResult<()> {
        // Same directory, same filesystem: the persist is a plain rename.
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await?;
        let temp_file = tempfile::NamedTempFile::new_in(parent)?;

        fs::write(temp_file.path(), data).await?;

        temp_file
            .persist(path)
            .map_err(|e| DashboardError::Io(e.error))?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    pub async fn read_all(path: &Path) -> DashboardResult<Vec<u8>> {
        let data = fs::read(path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_atomic_write_creates_parents() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("boards").join("u1.json");

        AtomicWriter::write_atomic(&file_path, b"{}").await.unwrap();

        let read_data = AtomicWriter::read_all(&file_path).await.unwrap();
        assert_eq!(read_data, b"{}");
    }

    #[tokio::test]
    async fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");

        AtomicWriter::write_atomic(&file_path, b"First").await.unwrap();
        AtomicWriter::write_atomic(&file_path, b"Second").await.unwrap();

        let read_data = AtomicWriter::read_all(&file_path).await.unwrap();
        assert_eq!(read_data, b"Second");

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
