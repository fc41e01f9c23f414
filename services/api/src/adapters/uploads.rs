//! services/api/src/adapters/uploads.rs
//!
//! Disk storage for uploaded question papers. Files are written under a single
//! server-managed directory and served back from `/uploads/<filename>`.

use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

/// Public URL prefix the upload directory is mounted at.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Form field that carries the PDF; also the prefix of stored file names.
pub const PDF_FIELD: &str = "pdfFile";

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    /// Relative URL of the file, e.g. `/uploads/pdfFile-1700000000000-42.pdf`.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Writes `data` under a fresh collision-resistant name that keeps the
    /// original file's extension.
    pub async fn store(&self, original_name: &str, data: Bytes) -> std::io::Result<StoredFile> {
        self.ensure_dir().await?;
        let file_name = generate_file_name(original_name);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &data).await?;
        info!(file = %path.display(), bytes = data.len(), "Stored upload");
        Ok(StoredFile {
            url: format!("{}/{}", UPLOADS_ROUTE, file_name),
            file_name,
        })
    }

    /// Deletes a stored file whose record could not be saved.
    pub async fn discard(&self, file: &StoredFile) -> std::io::Result<()> {
        tokio::fs::remove_file(self.dir.join(&file.file_name)).await?;
        info!(file = %file.file_name, "Discarded upload");
        Ok(())
    }
}

/// `pdfFile-<unix millis>-<random 0..1e9><.ext>`. Only the extension of the client's
/// file name is kept, so path components in it are never used.
pub fn generate_file_name(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{}{}",
        PDF_FIELD,
        Utc::now().timestamp_millis(),
        suffix,
        extension_of(original_name)
    )
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_keep_the_extension_only() {
        let name = generate_file_name("../../etc/Maths 2023.pdf");
        assert!(name.starts_with("pdfFile-"));
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains('/'));

        assert!(!generate_file_name("noext").contains('.'));
    }

    #[test]
    fn generated_names_do_not_repeat() {
        let a = generate_file_name("a.pdf");
        let b = generate_file_name("a.pdf");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn store_writes_into_the_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        let stored = store
            .store("paper.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();

        assert_eq!(stored.url, format!("/uploads/{}", stored.file_name));
        let written = std::fs::read(store.dir().join(&stored.file_name)).unwrap();
        assert_eq!(written, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn discard_removes_the_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let stored = store
            .store("paper.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();

        store.discard(&stored).await.unwrap();
        assert!(!store.dir().join(&stored.file_name).exists());
    }
}
