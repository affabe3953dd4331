//! The mutually exclusive save mechanisms and what they share.

pub(crate) mod legacy;
pub(crate) mod native;
pub(crate) mod reader;
pub(crate) mod remote;

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::api::RemoteClient;
use crate::detect::{Capabilities, Environment};
use crate::domain::{Anchor, SaveError, SaveSettings, SaveStrategy};
use crate::host::Host;

use super::lifecycle::Lifecycle;

/// Strict priority: native attribute, then the legacy primitive, then the
/// reader fallback.
pub fn select_strategy(caps: &Capabilities) -> SaveStrategy {
    if caps.native_download_attribute {
        SaveStrategy::NativeAttribute
    } else if caps.legacy_save_blob {
        SaveStrategy::LegacySave
    } else {
        SaveStrategy::ReaderFallback
    }
}

/// How a strategy failed.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Before any asynchronous step began. Always raised to the caller.
    Immediate(SaveError),
    /// After an asynchronous step. Consumed by `on_error` when registered.
    Deferred(SaveError),
}

impl Failure {
    pub(crate) fn into_deferred(self) -> Self {
        match self {
            Failure::Immediate(err) | Failure::Deferred(err) => Failure::Deferred(err),
        }
    }
}

pub(crate) type StrategyResult = Result<(), Failure>;

pub(crate) struct SaveContext {
    pub host: Arc<dyn Host>,
    pub client: RemoteClient,
    pub settings: SaveSettings,
    pub lifecycle: Arc<Lifecycle>,
    pub caps: Capabilities,
    pub name: String,
}

impl SaveContext {
    pub(crate) fn page_location(&self) -> Option<Url> {
        self.host.window().map(|w| w.location)
    }

    /// Resolve a possibly relative locator against the page location.
    pub(crate) fn resolve_url(&self, raw: &str) -> Result<Url, Failure> {
        let parsed = match self.page_location() {
            Some(base) => base.join(raw),
            None => Url::parse(raw),
        };
        parsed.map_err(|e| Failure::Immediate(SaveError::InvalidPayload(format!("{}: {}", raw, e))))
    }

    pub(crate) fn is_same_origin(&self, url: &Url) -> bool {
        self.page_location()
            .is_some_and(|page| page.origin() == url.origin())
    }

    /// Dispatch the synthetic click after `click_delay`, or report completion
    /// straight away when clicks are disabled.
    pub(crate) async fn trigger(&self, anchor: Anchor) -> StrategyResult {
        if self.settings.disable_click {
            debug!(href = %anchor.href, "click disabled");
            self.lifecycle.complete();
            return Ok(());
        }
        if !self.settings.click_delay.is_zero() {
            tokio::time::sleep(self.settings.click_delay).await;
        }
        self.host.click(&anchor).await.map_err(Failure::Deferred)?;
        self.lifecycle.complete();
        Ok(())
    }
}
