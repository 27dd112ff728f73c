use super::ListingSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read listings file: {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name,country\nA,B\n").unwrap();
        let source = FileSource::new(file.path());
        let text = source.fetch().await.unwrap();
        assert!(text.starts_with("name,country"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let source = FileSource::new("/definitely/not/here.csv");
        let err = source.fetch().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read listings file"));
    }
}
