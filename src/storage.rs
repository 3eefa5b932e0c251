//! Archive of uploaded research papers in an S3-compatible bucket.

use std::time::Duration;

use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Object key of an archived paper: one prefix per user so an account's
/// files can be found without the database.
pub fn paper_key(user_id: Uuid, entry_id: Uuid) -> String {
    format!("papers/{}/{}.pdf", user_id, entry_id)
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;

    /// Best-effort bulk delete. Returns how many keys could not be removed.
    async fn delete_all(&self, keys: &[String]) -> usize {
        let mut failed = 0;
        for key in keys {
            if let Err(e) = self.delete_object(key).await {
                warn!(error = %e, key = %key, "object not deleted");
                failed += 1;
            }
        }
        failed
    }
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub async fn connect(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        // MinIO needs path-style addressing
        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        let storage = Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        };
        storage.ensure_bucket().await;
        Ok(storage)
    }

    /// Creates the bucket on first start. Failure only disables archiving.
    async fn ensure_bucket(&self) {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return;
        }
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => info!(bucket = %self.bucket, "bucket created"),
            Err(e) => warn!(error = %e, bucket = %self.bucket, "bucket unavailable; paper archiving will fail"),
        }
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {key}"))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("s3 delete_object {key}"))?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(Duration::from_secs(seconds))?)
            .await
            .with_context(|| format!("s3 presign {key}"))?;
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fails deletes for keys containing "locked".
    #[derive(Default)]
    struct Recording {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageClient for Recording {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            if key.contains("locked") {
                anyhow::bail!("access denied");
            }
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
        async fn presign_get(&self, k: &str, _s: u64) -> anyhow::Result<String> {
            Ok(k.to_string())
        }
    }

    #[test]
    fn paper_keys_are_grouped_by_user() {
        let user = Uuid::nil();
        let entry = Uuid::from_u128(1);
        assert_eq!(
            paper_key(user, entry),
            "papers/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000001.pdf"
        );
    }

    #[tokio::test]
    async fn delete_all_keeps_going_after_failures() {
        let store = Recording::default();
        let keys = vec!["a.pdf".to_string(), "locked.pdf".to_string(), "b.pdf".to_string()];
        assert_eq!(store.delete_all(&keys).await, 1);
        assert_eq!(*store.deleted.lock().unwrap(), vec!["a.pdf", "b.pdf"]);
    }
}
