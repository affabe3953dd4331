#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use tinysaver::api::RemoteClient;
use tinysaver::detect::{AnchorPrototype, Environment, Navigator, StaticEnvironment, Window};
use tinysaver::domain::PopupId;
use tinysaver::{Anchor, Blob, Host, NavigationTarget, SaveError, SaveOptions};

pub const PAGE: &str = "https://app.example.com/index.html";
pub const DESKTOP_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const MAC_SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
pub const MAC_WEBVIEW: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko)";
pub const IOS_CHROME: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/120.0.6099.119 Mobile/15E148 Safari/604.1";
pub const OLD_EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Trident/7.0; rv:11.0) like Gecko";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CreateObjectUrl { url: String, blob: Blob },
    RevokeObjectUrl(String),
    Click(Anchor),
    LegacySave { name: String, blob: Blob },
    OpenPopup(String),
    Navigate { target: NavigationTarget, url: String },
}

/// Host double that records every primitive call.
pub struct RecordingHost {
    pub env: StaticEnvironment,
    pub legacy_accepts: bool,
    events: Mutex<Vec<Event>>,
    next_id: AtomicU64,
}

impl RecordingHost {
    pub fn new(env: StaticEnvironment) -> Self {
        Self {
            env,
            legacy_accepts: true,
            events: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn browser(user_agent: &str, download: bool, legacy: bool) -> Self {
        Self::new(StaticEnvironment {
            navigator: Some(Navigator {
                user_agent: user_agent.to_string(),
                vendor: if user_agent.contains("Chrome") {
                    "Google Inc.".to_string()
                } else {
                    "Apple Computer, Inc.".to_string()
                },
                legacy_save_blob: legacy,
            }),
            window: Some(Window {
                safari: false,
                location: Url::parse(PAGE).unwrap(),
            }),
            anchor_prototype: Some(AnchorPrototype { download }),
            file_reader: true,
        })
    }

    pub fn native() -> Self {
        Self::browser(DESKTOP_CHROME, true, false)
    }

    pub fn legacy() -> Self {
        Self::browser(OLD_EDGE, false, true)
    }

    pub fn reader() -> Self {
        Self::browser(DESKTOP_CHROME, false, false)
    }

    pub fn rejecting_legacy(mut self) -> Self {
        self.legacy_accepts = false;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> Vec<Anchor> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Click(anchor) => Some(anchor),
                _ => None,
            })
            .collect()
    }

    pub fn created_blobs(&self) -> Vec<Blob> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::CreateObjectUrl { blob, .. } => Some(blob),
                _ => None,
            })
            .collect()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::RevokeObjectUrl(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Environment for RecordingHost {
    fn navigator(&self) -> Option<Navigator> {
        self.env.navigator()
    }

    fn window(&self) -> Option<Window> {
        self.env.window()
    }

    fn anchor_prototype(&self) -> Option<AnchorPrototype> {
        self.env.anchor_prototype()
    }

    fn has_file_reader(&self) -> bool {
        self.env.has_file_reader()
    }
}

#[async_trait]
impl Host for RecordingHost {
    fn create_object_url(&self, blob: &Blob) -> Result<String, SaveError> {
        let url = format!(
            "blob:https://app.example.com/{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        );
        self.record(Event::CreateObjectUrl {
            url: url.clone(),
            blob: blob.clone(),
        });
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.record(Event::RevokeObjectUrl(url.to_string()));
    }

    async fn click(&self, anchor: &Anchor) -> Result<(), SaveError> {
        self.record(Event::Click(anchor.clone()));
        Ok(())
    }

    fn legacy_save_blob(&self, blob: &Blob, name: &str) -> bool {
        self.record(Event::LegacySave {
            name: name.to_string(),
            blob: blob.clone(),
        });
        self.legacy_accepts
    }

    fn open_popup(&self, title: &str) -> Option<PopupId> {
        self.record(Event::OpenPopup(title.to_string()));
        Some(PopupId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn navigate(&self, target: NavigationTarget, url: &str) -> Result<(), SaveError> {
        self.record(Event::Navigate {
            target,
            url: url.to_string(),
        });
        Ok(())
    }
}

/// Collects callback invocations in order.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with start, complete and error callbacks wired to this recorder.
    pub fn options(&self) -> SaveOptions {
        let calls = Arc::clone(&self.calls);
        self.options_without_error()
            .on_error(move |err| calls.lock().unwrap().push(format!("error:{}", err)))
    }

    /// Like [`Recorder::options`] but with no `on_error` handler.
    pub fn options_without_error(&self) -> SaveOptions {
        let start = Arc::clone(&self.calls);
        let complete = Arc::clone(&self.calls);
        SaveOptions::new()
            .on_start(move || start.lock().unwrap().push("start".to_string()))
            .on_complete(move || complete.lock().unwrap().push("complete".to_string()))
    }

    /// [`Recorder::options`] plus a progress callback.
    pub fn progress_options(&self) -> SaveOptions {
        let progress = Arc::clone(&self.calls);
        self.options().on_progress(move |loaded, total| {
            progress
                .lock()
                .unwrap()
                .push(format!("progress:{}/{}", loaded, total))
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub fn client() -> RemoteClient {
    RemoteClient::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

pub fn host_arc(host: RecordingHost) -> (Arc<RecordingHost>, Arc<dyn Host>) {
    let host = Arc::new(host);
    let dyn_host: Arc<dyn Host> = host.clone();
    (host, dyn_host)
}
