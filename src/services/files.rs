//! Attachment storage (invoices and event documents)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Longest kept part of an uploaded file name
const MAX_NAME_LEN: usize = 100;

/// File received with a request
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Upload {
    /// PDF documents and images are accepted
    pub fn is_allowed_type(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        content_type == "application/pdf" || content_type.starts_with("image/")
    }

    /// Add the upload's rule violations to `errors`
    pub fn check(&self, label: &str, max_size: usize, errors: &mut Vec<String>) {
        if self.bytes.len() > max_size {
            errors.push(format!(
                "{} is too large (maximum {} MB).",
                label,
                max_size / 1024 / 1024
            ));
        }
        if !self.is_allowed_type() {
            errors.push(format!("{} must be a PDF or an image.", label));
        }
    }
}

/// Where attachments live. References are opaque to callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes and return the new reference
    async fn save(&self, suggested_name: &str, bytes: &[u8]) -> AppResult<String>;

    async fn open(&self, file_ref: &str) -> AppResult<Vec<u8>>;

    async fn delete(&self, file_ref: &str) -> AppResult<()>;
}

/// Files in a local directory, named `<uuid>-<sanitized name>`
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, file_ref: &str) -> AppResult<PathBuf> {
        let plain = !file_ref.is_empty()
            && !file_ref.starts_with('.')
            && !file_ref.contains(['/', '\\'])
            && !file_ref.contains("..");
        if !plain {
            return Err(AppError::NotFound(format!("File {} not found", file_ref)));
        }
        Ok(self.root.join(file_ref))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, suggested_name: &str, bytes: &[u8]) -> AppResult<String> {
        let file_ref = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(suggested_name));
        let path = self.root.join(&file_ref);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            AppError::Internal(format!("Failed to store file: {}", e))
        })?;
        tracing::debug!("Stored {} ({} bytes)", file_ref, bytes.len());
        Ok(file_ref)
    }

    async fn open(&self, file_ref: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(file_ref)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File {} not found", file_ref)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, file_ref: &str) -> AppResult<()> {
        let path = self.resolve(file_ref)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep ASCII letters, digits, `.`, `-` and `_`; accents are folded first
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut cleaned: String = base
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.len() > MAX_NAME_LEN {
        cleaned = cleaned[cleaned.len() - MAX_NAME_LEN..].to_string();
    }
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Content type for serving a stored file back
pub fn content_type_for(file_ref: &str) -> &'static str {
    let extension = file_ref
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Delete files that are no longer referenced; failures are only logged
pub async fn discard(store: &dyn FileStore, refs: impl IntoIterator<Item = String>) {
    for file_ref in refs {
        if let Err(e) = store.delete(&file_ref).await {
            tracing::warn!("Failed to delete stored file {}: {}", file_ref, e);
        }
    }
}
