use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;

/// Object storage collaborator. The portal only needs to put bytes under a
/// caller-chosen key and hand out a public URL for a stored key; retrieval
/// goes through that URL, not through the service.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError>;
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;
    fn public_url(&self, key: &str) -> Option<String>;
}

/// Filesystem-backed storage. Public URLs are formed against the configured
/// base, which is expected to be served by a static file host in front of
/// `base_path`.
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .await
                .map_err(|e| AppError::StorageError(anyhow::Error::new(e)))?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError> {
        let path = self.base_path.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::StorageError(anyhow::Error::new(e)))?;
        }
        fs::write(path, data)
            .await
            .map_err(|e| AppError::StorageError(anyhow::Error::new(e)))?;
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.base_path.join(key);
        let data = fs::read(path)
            .await
            .map_err(|e| AppError::StorageError(anyhow::Error::new(e)))?;
        Ok(data)
    }

    fn public_url(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.public_base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_download_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:9000/files")
            .await
            .unwrap();

        storage
            .upload("abc/evidence_1.pdf", b"hello".to_vec())
            .await
            .unwrap();
        let data = storage.download("abc/evidence_1.pdf").await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn download_of_missing_key_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:9000/files")
            .await
            .unwrap();

        let err = storage.download("nope.bin").await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }

    #[tokio::test]
    async fn public_url_joins_base_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:9000/files/")
            .await
            .unwrap();

        assert_eq!(
            storage.public_url("u1/type_x.pdf").as_deref(),
            Some("http://localhost:9000/files/u1/type_x.pdf")
        );
        assert_eq!(storage.public_url(""), None);
    }
}
