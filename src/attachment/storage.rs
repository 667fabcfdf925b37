use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Binary object storage. Keys are `/`-separated paths inside one bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Client for the hosted storage REST API
/// (`{base}/object/{bucket}/{key}`, bearer service key).
#[derive(Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpObjectStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            bucket: bucket.into(),
            service_key: service_key.into(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let size = data.len();
        self.client
            .post(self.object_url(key))
            .bearer_auth(&self.service_key)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(key, size, "Object stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(self.object_url(key))
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Attachment content not found".to_string()));
        }

        Ok(response.error_for_status()?.bytes().await?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(key, "Object already absent");
            return Ok(());
        }

        response.error_for_status()?;
        Ok(())
    }
}

/// Storage path of an attachment: `{user_id}/{note_id}/{attachment_id}`.
pub fn object_key(user_id: Uuid, note_id: Uuid, attachment_id: Uuid) -> String {
    format!("{user_id}/{note_id}/{attachment_id}")
}

/// Detects the supported image formats from their magic bytes.
pub fn sniff_image_type(data: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

    if data.starts_with(PNG) {
        Some("image/png")
    } else if data.starts_with(JPEG) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE},
            HeaderMap, StatusCode,
        },
        routing::post,
        Router,
    };
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    type Objects = Arc<Mutex<HashMap<String, (String, Bytes)>>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) == Some("Bearer service-key")
    }

    async fn put_object(
        State(objects): State<Objects>,
        Path((bucket, key)): Path<(String, String)>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        objects
            .lock()
            .expect("lock")
            .insert(format!("{bucket}/{key}"), (content_type, body));
        StatusCode::OK
    }

    async fn get_object(
        State(objects): State<Objects>,
        Path((bucket, key)): Path<(String, String)>,
        headers: HeaderMap,
    ) -> std::result::Result<Bytes, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        objects
            .lock()
            .expect("lock")
            .get(&format!("{bucket}/{key}"))
            .map(|(_, body)| body.clone())
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn delete_object(
        State(objects): State<Objects>,
        Path((bucket, key)): Path<(String, String)>,
    ) -> StatusCode {
        match objects.lock().expect("lock").remove(&format!("{bucket}/{key}")) {
            Some(_) => StatusCode::OK,
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn spawn_storage() -> (String, Objects) {
        let objects: Objects = Arc::default();
        let app = Router::new()
            .route(
                "/object/:bucket/*key",
                post(put_object).get(get_object).delete(delete_object),
            )
            .with_state(objects.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        (format!("http://{addr}"), objects)
    }

    #[test]
    fn test_object_url_and_key() {
        let store = HttpObjectStore::new(
            reqwest::Client::new(),
            "https://storage.example.com/storage/v1/",
            "attachments",
            "key",
        );
        let user = Uuid::nil();
        let key = object_key(user, user, user);

        assert_eq!(key, format!("{user}/{user}/{user}"));
        assert_eq!(
            store.object_url(&key),
            format!("https://storage.example.com/storage/v1/object/attachments/{key}")
        );
    }

    #[test]
    fn test_sniff_image_type() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(sniff_image_type(&png), Some("image/png"));
        assert_eq!(sniff_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_image_type(b"GIF89a..."), Some("image/gif"));
        assert_eq!(sniff_image_type(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_image_type(b"RIFF\x10\x00\x00\x00WAVEfmt "), None);
        assert_eq!(sniff_image_type(b"%PDF-1.7"), None);
        assert_eq!(sniff_image_type(&[]), None);
    }

    #[tokio::test]
    async fn test_http_store_round_trip() {
        let (base_url, objects) = spawn_storage().await;
        let store = HttpObjectStore::new(reqwest::Client::new(), base_url, "attachments", "service-key");
        let key = "user/note/image";

        store
            .put(key, Bytes::from_static(b"GIF89a-pixels"), "image/gif")
            .await
            .expect("put");
        assert_eq!(
            objects
                .lock()
                .expect("lock")
                .get("attachments/user/note/image")
                .map(|(ct, _)| ct.clone()),
            Some("image/gif".to_string())
        );

        let fetched = store.get(key).await.expect("get");
        assert_eq!(&fetched[..], b"GIF89a-pixels");

        store.delete(key).await.expect("delete");
        assert!(matches!(store.get(key).await, Err(AppError::NotFound(_))));

        // second delete hits a 404 and still succeeds
        store.delete(key).await.expect("idempotent delete");
    }

    #[tokio::test]
    async fn test_http_store_surfaces_auth_failures() {
        let (base_url, _objects) = spawn_storage().await;
        let store = HttpObjectStore::new(reqwest::Client::new(), base_url, "attachments", "wrong-key");

        let result = store.put("a/b/c", Bytes::from_static(b"x"), "image/png").await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
