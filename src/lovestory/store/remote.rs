use super::{MediaSource, Partition, StoreBackend};
use crate::error::{LoveStoryError, Result};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Environment variables holding the remote service endpoint and access key.
pub const REMOTE_URL_VAR: &str = "LOVESTORY_REMOTE_URL";
pub const REMOTE_KEY_VAR: &str = "LOVESTORY_REMOTE_KEY";

/// Storage bucket holding media payloads.
const STORAGE_BUCKET: &str = "love-story-images";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote database-plus-object-storage backend.
///
/// Key/value records live in a `kv_store` table exposed over the service's
/// REST interface (one row per partition/key pair, upserted on write);
/// payloads live in a public storage bucket and are served by URL. The
/// bucket itself is provisioned out of band.
pub struct RemoteStore {
    client: Client,
    url: String,
    key: String,
}

#[derive(Deserialize)]
struct KvRow {
    value: Value,
}

impl RemoteStore {
    /// Build a handle from explicit credentials. Missing or placeholder
    /// values are a configuration error here, at construction: a handle
    /// that exists is a handle that can be called.
    pub fn new(url: &str, key: &str) -> Result<Self> {
        if !is_configured(url) {
            return Err(LoveStoryError::Config(format!(
                "{} is missing or still a placeholder",
                REMOTE_URL_VAR
            )));
        }
        if !is_configured(key) {
            return Err(LoveStoryError::Config(format!(
                "{} is missing or still a placeholder",
                REMOTE_KEY_VAR
            )));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    /// Build a handle from `LOVESTORY_REMOTE_URL` / `LOVESTORY_REMOTE_KEY`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(REMOTE_URL_VAR).unwrap_or_default();
        let key = std::env::var(REMOTE_KEY_VAR).unwrap_or_default();
        Self::new(&url, &key)
    }

    fn kv_endpoint(&self) -> String {
        format!("{}/rest/v1/kv_store", self.url)
    }

    fn object_endpoint(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, STORAGE_BUCKET, name)
    }

    /// Publicly fetchable URL for a payload.
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url, STORAGE_BUCKET, name
        )
    }

    fn auth(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        req.header("apikey", &self.key)
            .header(AUTHORIZATION, format!("Bearer {}", self.key))
    }
}

fn is_configured(value: &str) -> bool {
    !value.trim().is_empty() && !value.starts_with("YOUR_")
}

impl StoreBackend for RemoteStore {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
        let rows: Vec<KvRow> = self
            .auth(self.client.get(self.kv_endpoint()))
            .query(&[
                ("partition", format!("eq.{}", partition.name())),
                ("key", format!("eq.{}", key)),
                ("select", "value".to_string()),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(rows.into_iter().next().map(|row| row.value))
    }

    fn set(&mut self, partition: Partition, key: &str, value: Value) -> Result<()> {
        self.auth(self.client.post(self.kv_endpoint()))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!([{
                "partition": partition.name(),
                "key": key,
                "value": value,
            }]))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn remove(&mut self, partition: Partition, key: &str) -> Result<()> {
        self.auth(self.client.delete(self.kv_endpoint()))
            .query(&[
                ("partition", format!("eq.{}", partition.name())),
                ("key", format!("eq.{}", key)),
            ])
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn put_blob(&mut self, name: &str, bytes: &[u8], mime: &str) -> Result<()> {
        self.auth(self.client.post(self.object_endpoint(name)))
            .header(CONTENT_TYPE, mime.to_string())
            .header("x-upsert", "true")
            .body(bytes.to_vec())
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn get_blob(&self, name: &str) -> Result<Option<MediaSource>> {
        // The bucket is public; renderers get a fetchable URL and the
        // object server answers 404 for ids that never uploaded.
        Ok(Some(MediaSource::Url(self.public_url(name))))
    }

    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let response = self.client.get(self.public_url(name)).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = response.error_for_status()?.bytes()?;
        Ok(Some(bytes.to_vec()))
    }

    fn remove_blob(&mut self, name: &str) -> Result<()> {
        self.auth(self.client.delete(self.object_endpoint(name)))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}
