use futures::Stream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::domain::{Blob, SaveError, OCTET_STREAM};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to download: {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for SaveError {
    fn from(err: ApiError) -> Self {
        SaveError::Network(err.to_string())
    }
}

/// Outcome of the cross-origin probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Cross-origin and shareable with the page: bytes can be read back.
    CorsReadable,
    /// Same-origin, not shareable, or unreachable. Navigate instead.
    Opaque,
}

#[derive(Clone, Default)]
pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Issue a HEAD request carrying the page origin and classify the response.
    pub async fn probe(&self, url: &Url, page: Option<&Url>) -> Result<Probe> {
        let page_origin = page.map(|p| p.origin());
        if page_origin.as_ref() == Some(&url.origin()) {
            return Ok(Probe::Opaque);
        }

        let mut request = self.client.head(url.clone());
        if let Some(origin) = page_origin.as_ref().filter(|o| o.is_tuple()) {
            request = request.header(ORIGIN, origin.ascii_serialization());
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Ok(Probe::Opaque);
        }

        let allowed = response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);
        let shareable = match (allowed, page_origin.as_ref()) {
            (Some("*"), _) => true,
            (Some(allowed), Some(origin)) => allowed == origin.ascii_serialization(),
            _ => false,
        };

        Ok(if shareable {
            Probe::CorsReadable
        } else {
            Probe::Opaque
        })
    }

    /// Returns (total_size, content_type, stream)
    pub async fn download_stream(
        &self,
        url: &Url,
    ) -> Result<(
        Option<u64>,
        Option<String>,
        impl Stream<Item = Result<bytes::Bytes>>,
    )> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let total_size = response.content_length();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, content_type, stream))
    }

    /// Download the whole resource into a blob, calling `on_chunk(loaded, total)`
    /// after every chunk.
    pub async fn fetch_blob(
        &self,
        url: &Url,
        mut on_chunk: impl FnMut(u64, Option<u64>),
    ) -> Result<Blob> {
        let (total, content_type, stream) = self.download_stream(url).await?;
        let mut stream = std::pin::pin!(stream);

        let mut chunks = Vec::new();
        let mut loaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            loaded += chunk.len() as u64;
            chunks.push(chunk);
            on_chunk(loaded, total);
        }

        let mime = content_type.unwrap_or_else(|| OCTET_STREAM.to_string());
        Ok(Blob::from_chunks(chunks, mime))
    }
}
