use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mailwright_core::ReadError;
use tracing::debug;

/// Reads the raw text of file-backed content fields.
#[async_trait]
pub trait FileLoader: Send + Sync + std::fmt::Debug {
    /// Read the full UTF-8 contents at `path`.
    async fn load(&self, path: &Path) -> Result<String, ReadError>;
}

/// Loads files from the local filesystem.
///
/// Relative paths are resolved against `base_dir` when one is set, and
/// against the process working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base_dir: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl FileLoader for FsLoader {
    async fn load(&self, path: &Path) -> Result<String, ReadError> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), "loading raw content file");
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| ReadError::new(resolved, e))
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;

    fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    #[tokio::test]
    async fn loads_file_contents() {
        let loader = FsLoader::new().with_base_dir(fixture_dir());
        let contents = loader.load(Path::new("Cargo.toml")).await.unwrap();
        assert!(contents.contains("mailwright-views"));
    }

    #[tokio::test]
    async fn absolute_paths_ignore_base_dir() {
        let loader = FsLoader::new().with_base_dir("/nonexistent");
        let path = fixture_dir().join("Cargo.toml");
        assert!(loader.load(&path).await.is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let loader = FsLoader::new().with_base_dir(fixture_dir());
        let err = loader.load(Path::new("missing.html")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.path.ends_with("missing.html"));
    }
}
