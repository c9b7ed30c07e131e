use crate::config::StorageConfig;
use crate::error::AppResult;
use crate::models::ProofFile;
use std::path::PathBuf;
use uuid::Uuid;

/// Persists proof images on local disk and hands back a public URL.
/// Callers validate size and content type before storing.
#[derive(Clone)]
pub struct StorageService {
    config: StorageConfig,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub async fn store_proof(&self, proof: &ProofFile) -> AppResult<String> {
        let ext = proof
            .content_type
            .split('/')
            .nth(1)
            .filter(|s| !s.is_empty())
            .unwrap_or("bin");
        let filename = format!("{}.{}", Uuid::new_v4(), ext);

        let dir = PathBuf::from(&self.config.upload_dir);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&filename), &proof.bytes).await?;

        Ok(format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            filename
        ))
    }
}
