use std::fmt;

use bytes::{Bytes, BytesMut};

use super::SaveError;

pub const DEFAULT_FILENAME: &str = "download";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Immutable binary content with a MIME type and, for file-like values, an
/// embedded name.
///
/// Content is kept as a list of chunks so that prefixes (such as a BOM) can be
/// added by composition without touching the caller's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    chunks: Vec<Bytes>,
    mime: String,
    name: Option<String>,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        Self::from_chunks(vec![data.into()], mime)
    }

    pub fn from_chunks(chunks: Vec<Bytes>, mime: impl Into<String>) -> Self {
        Self {
            chunks,
            mime: mime.into(),
            name: None,
        }
    }

    /// Attach an embedded file name, like a `File` carries one.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contiguous view of the content.
    pub fn to_bytes(&self) -> Bytes {
        match self.chunks.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            chunks => {
                let mut buf = BytesMut::with_capacity(self.len());
                for chunk in chunks {
                    buf.extend_from_slice(chunk);
                }
                buf.freeze()
            }
        }
    }

    /// New blob whose content is `chunk` followed by this blob's content.
    pub fn prepend(&self, chunk: impl Into<Bytes>) -> Blob {
        let mut chunks = Vec::with_capacity(self.chunks.len() + 1);
        chunks.push(chunk.into());
        chunks.extend(self.chunks.iter().cloned());
        Blob {
            chunks,
            mime: self.mime.clone(),
            name: self.name.clone(),
        }
    }
}

/// Builds the opaque payload every strategy accepts from raw bytes and a MIME
/// string.
pub fn make_blob(data: impl Into<Bytes>, mime: &str) -> Blob {
    Blob::new(data, mime)
}

/// What a caller hands to `save`: binary content or a remote locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Blob(Blob),
    Url(String),
}

impl Payload {
    pub fn embedded_name(&self) -> Option<&str> {
        match self {
            Payload::Blob(blob) => blob.name(),
            Payload::Url(_) => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), SaveError> {
        match self {
            Payload::Url(url) if url.trim().is_empty() => Err(SaveError::InvalidPayload(
                "URL payload must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl From<Blob> for Payload {
    fn from(blob: Blob) -> Self {
        Payload::Blob(blob)
    }
}

impl From<String> for Payload {
    fn from(url: String) -> Self {
        Payload::Url(url)
    }
}

impl From<&str> for Payload {
    fn from(url: &str) -> Self {
        Payload::Url(url.to_string())
    }
}

impl From<url::Url> for Payload {
    fn from(url: url::Url) -> Self {
        Payload::Url(url.into())
    }
}

/// Explicit name, then the payload's embedded name, then [`DEFAULT_FILENAME`].
pub fn resolve_filename(explicit: Option<&str>, payload: &Payload) -> String {
    explicit
        .filter(|name| !name.is_empty())
        .or_else(|| payload.embedded_name().filter(|name| !name.is_empty()))
        .unwrap_or(DEFAULT_FILENAME)
        .to_string()
}

/// A synthesized anchor element handed to the host for click dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub download: Option<String>,
    pub rel: Option<String>,
    pub target: Option<String>,
}

impl Anchor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    CurrentDocument,
    Popup(PopupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStrategy {
    NativeAttribute,
    LegacySave,
    ReaderFallback,
}

impl fmt::Display for SaveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveStrategy::NativeAttribute => "native-attribute",
            SaveStrategy::LegacySave => "legacy-save",
            SaveStrategy::ReaderFallback => "reader-fallback",
        };
        f.write_str(name)
    }
}
