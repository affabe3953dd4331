use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SaverConfig;

use super::SaveError;

pub type Callback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&SaveError) + Send + Sync>;
/// Receives `(loaded, total)` byte counts.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_start: Option<Callback>,
    pub on_complete: Option<Callback>,
    pub on_error: Option<ErrorCallback>,
    pub on_progress: Option<ProgressCallback>,
}

/// Per-call overrides. Anything left unset falls back to the downloader's
/// [`SaverConfig`].
#[derive(Clone, Default)]
pub struct SaveOptions {
    auto_bom: Option<bool>,
    revoke_timeout: Option<Duration>,
    click_delay: Option<Duration>,
    open_in_new_tab: Option<bool>,
    disable_click: Option<bool>,
    callbacks: Callbacks,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_bom(mut self, enabled: bool) -> Self {
        self.auto_bom = Some(enabled);
        self
    }

    pub fn revoke_timeout(mut self, timeout: Duration) -> Self {
        self.revoke_timeout = Some(timeout);
        self
    }

    pub fn click_delay(mut self, delay: Duration) -> Self {
        self.click_delay = Some(delay);
        self
    }

    pub fn open_in_new_tab(mut self, enabled: bool) -> Self {
        self.open_in_new_tab = Some(enabled);
        self
    }

    /// Skip the synthetic click; completion is reported immediately instead.
    pub fn disable_click(mut self, disabled: bool) -> Self {
        self.disable_click = Some(disabled);
        self
    }

    pub fn on_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_complete = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&SaveError) + Send + Sync + 'static) -> Self {
        self.callbacks.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_progress(mut self, f: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.callbacks.on_progress = Some(Arc::new(f));
        self
    }

    pub fn has_error_handler(&self) -> bool {
        self.callbacks.on_error.is_some()
    }

    pub fn resolve(&self, config: &SaverConfig) -> SaveSettings {
        SaveSettings {
            auto_bom: self.auto_bom.unwrap_or(config.auto_bom),
            revoke_timeout: self
                .revoke_timeout
                .unwrap_or_else(|| Duration::from_millis(config.revoke_timeout_ms)),
            click_delay: self
                .click_delay
                .unwrap_or_else(|| Duration::from_millis(config.click_delay_ms)),
            open_in_new_tab: self.open_in_new_tab.unwrap_or(config.open_in_new_tab),
            disable_click: self.disable_click.unwrap_or(config.disable_click),
        }
    }

    pub(crate) fn into_callbacks(self) -> Callbacks {
        self.callbacks
    }
}

impl fmt::Debug for SaveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveOptions")
            .field("auto_bom", &self.auto_bom)
            .field("revoke_timeout", &self.revoke_timeout)
            .field("click_delay", &self.click_delay)
            .field("open_in_new_tab", &self.open_in_new_tab)
            .field("disable_click", &self.disable_click)
            .field("on_start", &self.callbacks.on_start.is_some())
            .field("on_complete", &self.callbacks.on_complete.is_some())
            .field("on_error", &self.callbacks.on_error.is_some())
            .field("on_progress", &self.callbacks.on_progress.is_some())
            .finish()
    }
}

/// Effective settings for one save call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSettings {
    pub auto_bom: bool,
    pub revoke_timeout: Duration,
    pub click_delay: Duration,
    pub open_in_new_tab: bool,
    pub disable_click: bool,
}
