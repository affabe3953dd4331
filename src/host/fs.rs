use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};
use url::Url;

use crate::api::{ApiError, RemoteClient};
use crate::detect::{AnchorPrototype, Environment, Navigator, Window};
use crate::domain::{Anchor, Blob, NavigationTarget, PopupId, SaveError, DEFAULT_FILENAME};
use crate::utils::{decode_data_url, sanitize_filename};

use super::Host;

pub const DEFAULT_USER_AGENT: &str = concat!("tinysaver/", env!("CARGO_PKG_VERSION"));

/// Which save primitives the host advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostProfile {
    #[default]
    Native,
    Legacy,
    Reader,
}

/// Headless desktop host that materialises every save as a file in a
/// directory.
pub struct FsHost {
    dir: PathBuf,
    location: Url,
    user_agent: String,
    profile: HostProfile,
    client: RemoteClient,
    objects: Mutex<HashMap<String, Blob>>,
    popups: Mutex<HashMap<PopupId, String>>,
    next_id: AtomicU64,
}

impl FsHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            location: Url::parse("http://localhost/").expect("static URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            profile: HostProfile::default(),
            client: RemoteClient::new(),
            objects: Mutex::new(HashMap::new()),
            popups: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_profile(mut self, profile: HostProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_location(mut self, location: Url) -> Self {
        self.location = location;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_client(mut self, client: RemoteClient) -> Self {
        self.client = client;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of object references not yet revoked.
    pub fn live_object_urls(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn target_path(&self, name: &str) -> PathBuf {
        let name = sanitize_filename(name);
        if name.is_empty() {
            self.dir.join(DEFAULT_FILENAME)
        } else {
            self.dir.join(name)
        }
    }

    async fn resolve(&self, href: &str) -> Result<Bytes, SaveError> {
        let object = {
            let objects = self
                .objects
                .lock()
                .map_err(|_| SaveError::Platform("object URL table poisoned".to_string()))?;
            objects.get(href).cloned()
        };
        if let Some(blob) = object {
            return Ok(blob.to_bytes());
        }
        if href.starts_with("blob:") {
            return Err(SaveError::Platform(format!("Object URL revoked: {}", href)));
        }
        if href.starts_with("data:") {
            return decode_data_url(href)
                .map(Bytes::from)
                .ok_or_else(SaveError::read_file);
        }

        let url = self.location.join(href).map_err(ApiError::from)?;
        let blob = self.client.fetch_blob(&url, |_, _| {}).await?;
        Ok(blob.to_bytes())
    }

    async fn write(&self, name: &str, href: &str) -> Result<(), SaveError> {
        let content = self.resolve(href).await?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.target_path(name);
        tokio::fs::write(&path, &content).await?;
        debug!(path = %path.display(), bytes = content.len(), "saved");
        Ok(())
    }
}

fn name_from_href(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.path_segments()?
        .next_back()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Environment for FsHost {
    fn navigator(&self) -> Option<Navigator> {
        Some(Navigator {
            user_agent: self.user_agent.clone(),
            vendor: String::new(),
            legacy_save_blob: self.profile == HostProfile::Legacy,
        })
    }

    fn window(&self) -> Option<Window> {
        Some(Window {
            safari: false,
            location: self.location.clone(),
        })
    }

    fn anchor_prototype(&self) -> Option<AnchorPrototype> {
        Some(AnchorPrototype {
            download: self.profile == HostProfile::Native,
        })
    }

    fn has_file_reader(&self) -> bool {
        true
    }
}

#[async_trait]
impl Host for FsHost {
    fn create_object_url(&self, blob: &Blob) -> Result<String, SaveError> {
        let url = format!(
            "blob:{}/{}",
            self.location.origin().ascii_serialization(),
            self.next_id()
        );
        self.objects
            .lock()
            .map_err(|_| SaveError::Platform("object URL table poisoned".to_string()))?
            .insert(url.clone(), blob.clone());
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.remove(url);
        }
    }

    async fn click(&self, anchor: &Anchor) -> Result<(), SaveError> {
        let name = anchor
            .download
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| name_from_href(&anchor.href))
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        self.write(&name, &anchor.href).await
    }

    fn legacy_save_blob(&self, blob: &Blob, name: &str) -> bool {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(error = %e, "cannot create output directory");
            return false;
        }
        let path = self.target_path(name);
        match std::fs::write(&path, blob.to_bytes()) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "legacy save failed");
                false
            }
        }
    }

    fn open_popup(&self, title: &str) -> Option<PopupId> {
        let id = PopupId(self.next_id());
        self.popups.lock().ok()?.insert(id, title.to_string());
        Some(id)
    }

    async fn navigate(&self, target: NavigationTarget, url: &str) -> Result<(), SaveError> {
        let name = match target {
            NavigationTarget::Popup(id) => self
                .popups
                .lock()
                .ok()
                .and_then(|popups| popups.get(&id).cloned()),
            NavigationTarget::CurrentDocument => None,
        }
        .or_else(|| name_from_href(url))
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        self.write(&name, url).await
    }
}
