use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;

/// Media upload collaborator. Gallery, catalog and testimonial handlers
/// only ever see the public URL an upload produced; downstream the URL
/// is an opaque string.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    fn object_url(&self, key: &str) -> String;
    /// Inverse of `object_url`; None for URLs this storage never produced.
    fn key_of(&self, url: &str) -> Option<String>;
}

pub fn key_from_url(public_base_url: &str, url: &str) -> Option<String> {
    url.strip_prefix(public_base_url.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
        .map(String::from)
}

/// Uploads one media blob under a keyspace prefix and returns its
/// public URL.
pub async fn store_media(
    storage: &dyn StorageClient,
    prefix: &str,
    body: Bytes,
    content_type: &str,
) -> anyhow::Result<String> {
    let key = format!("{}/{}", prefix, uuid::Uuid::new_v4());
    storage.put_object(&key, body, content_type).await?;
    Ok(storage.object_url(&key))
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl Storage {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
        public_base_url: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
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
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn key_of(&self, url: &str) -> Option<String> {
        key_from_url(&self.public_base_url, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips_through_the_public_url() {
        let base = "https://cdn.example.com/media";
        let url = format!("{base}/gallery/abc-123");
        assert_eq!(key_from_url(base, &url), Some("gallery/abc-123".to_string()));
        assert_eq!(key_from_url("https://cdn.example.com/media/", &url).as_deref(), Some("gallery/abc-123"));
    }

    #[test]
    fn foreign_urls_yield_no_key() {
        let base = "https://cdn.example.com/media";
        assert_eq!(key_from_url(base, "https://elsewhere.com/gallery/abc"), None);
        assert_eq!(key_from_url(base, base), None);
        assert_eq!(key_from_url(base, &format!("{base}/")), None);
    }
}
