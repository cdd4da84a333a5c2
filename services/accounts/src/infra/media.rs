use std::path::PathBuf;

use anyhow::Context as _;
use tokio::fs;
use uuid::Uuid;

use crate::domain::repository::MediaStorage;
use crate::domain::types::{MediaUpload, StoredMedia};
use crate::error::AccountsServiceError;

/// Writes uploads under a local directory served at `base_url`.
#[derive(Clone)]
pub struct DiskMediaStorage {
    pub root: PathBuf,
    pub base_url: String,
}

impl DiskMediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Fresh time-ordered name, keeping a short alphanumeric extension from
    /// the client's file name when there is one.
    fn object_name(file_name: &str) -> String {
        let id = Uuid::now_v7();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8)
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
        match ext {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }
}

impl MediaStorage for DiskMediaStorage {
    async fn upload(&self, upload: &MediaUpload) -> Result<StoredMedia, AccountsServiceError> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create media dir {}", self.root.display()))?;

        let name = Self::object_name(&upload.file_name);
        let path = self.root.join(&name);
        fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("write media {}", path.display()))?;

        tracing::debug!(path = %path.display(), size = upload.bytes.len(), "media stored");
        Ok(StoredMedia {
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), name),
            duration: None,
        })
    }
}
