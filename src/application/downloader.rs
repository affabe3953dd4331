use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::RemoteClient;
use crate::canvas::{Canvas, CanvasEncoding};
use crate::config::SaverConfig;
use crate::detect::Capabilities;
use crate::domain::{
    resolve_filename, Blob, Payload, SaveError, SaveOptions, SaveStrategy,
};
use crate::host::Host;
use crate::utils::apply_bom;

use super::lifecycle::Lifecycle;
use super::strategy::{self, select_strategy, Failure, SaveContext};

pub const DEFAULT_TEXT_MIME: &str = "text/plain;charset=utf-8";
pub const DEFAULT_JSON_MIME: &str = "application/json;charset=utf-8";

/// Completion is reported at the latest this long after dispatch.
pub const COMPLETION_GRACE: Duration = Duration::from_millis(100);

/// Chooses a save strategy for the host and runs it.
#[derive(Clone)]
pub struct Downloader {
    host: Arc<dyn Host>,
    client: RemoteClient,
    config: SaverConfig,
}

impl Downloader {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, SaverConfig::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: SaverConfig) -> Self {
        Self {
            host,
            client: RemoteClient::new(),
            config,
        }
    }

    pub fn with_client(mut self, client: RemoteClient) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &SaverConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::detect(self.host.as_ref())
    }

    /// The strategy a save would use right now.
    pub fn strategy(&self) -> SaveStrategy {
        select_strategy(&self.capabilities())
    }

    /// Save a blob or a URL under `name`.
    ///
    /// Resolves once the strategy has dispatched. Failures before any
    /// asynchronous step are always returned; later failures go to
    /// `on_error` when one is registered and are returned otherwise.
    pub async fn save(
        &self,
        payload: impl Into<Payload>,
        name: Option<&str>,
        options: SaveOptions,
    ) -> Result<(), SaveError> {
        let payload = payload.into();
        let settings = options.resolve(&self.config);
        let lifecycle = Arc::new(Lifecycle::new(options.into_callbacks()));
        let name = resolve_filename(name, &payload);

        lifecycle.start();
        if let Err(err) = payload.validate() {
            lifecycle.fail(&err);
            return Err(err);
        }

        let caps = self.capabilities();
        let chosen = select_strategy(&caps);
        debug!(strategy = %chosen, ?caps, name = %name, "dispatching save");

        let payload = match payload {
            Payload::Blob(blob) => Payload::Blob(apply_bom(&blob, settings.auto_bom)),
            url => url,
        };
        let ctx = SaveContext {
            host: Arc::clone(&self.host),
            client: self.client.clone(),
            settings,
            lifecycle: Arc::clone(&lifecycle),
            caps,
            name,
        };

        let result = match chosen {
            SaveStrategy::NativeAttribute => strategy::native::run(&ctx, payload).await,
            SaveStrategy::LegacySave => strategy::legacy::run(&ctx, payload).await,
            SaveStrategy::ReaderFallback => strategy::reader::run(&ctx, payload).await,
        };

        match result {
            Ok(()) => {
                schedule_completion(lifecycle);
                Ok(())
            }
            Err(Failure::Immediate(err)) => {
                warn!(strategy = %chosen, error = %err, "save failed");
                lifecycle.fail(&err);
                Err(err)
            }
            Err(Failure::Deferred(err)) => {
                warn!(strategy = %chosen, error = %err, "save failed");
                if lifecycle.fail(&err) {
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Save text with a BOM check forced on. `mime` defaults to
    /// [`DEFAULT_TEXT_MIME`].
    pub async fn save_text(
        &self,
        text: &str,
        filename: &str,
        mime: Option<&str>,
        options: SaveOptions,
    ) -> Result<(), SaveError> {
        let blob = text_blob(text, mime);
        self.save(blob, Some(filename), options.auto_bom(true)).await
    }

    /// Serialize `data` as JSON, indented by `space` when given.
    /// Serialization errors are returned without touching the callbacks.
    pub async fn save_json<T: Serialize + ?Sized>(
        &self,
        data: &T,
        filename: &str,
        space: Option<usize>,
        options: SaveOptions,
    ) -> Result<(), SaveError> {
        let blob = json_blob(data, space)?;
        self.save(blob, Some(filename), options.auto_bom(true)).await
    }

    pub async fn save_canvas(
        &self,
        canvas: &(impl Canvas + ?Sized),
        filename: &str,
        encoding: CanvasEncoding,
        options: SaveOptions,
    ) -> Result<(), SaveError> {
        match canvas.to_blob(&encoding.mime, encoding.quality) {
            Some(blob) => self.save(blob, Some(filename), options).await,
            None => {
                let err = SaveError::canvas_conversion();
                warn!(mime = %encoding.mime, "canvas encoding produced no data");
                Lifecycle::new(options.into_callbacks()).fail(&err);
                Err(err)
            }
        }
    }
}

fn schedule_completion(lifecycle: Arc<Lifecycle>) {
    if lifecycle.is_terminal() {
        return;
    }
    tokio::spawn(async move {
        tokio::time::sleep(COMPLETION_GRACE).await;
        if lifecycle.complete() {
            debug!("completion reported after grace period");
        }
    });
}

pub fn text_blob(text: &str, mime: Option<&str>) -> Blob {
    Blob::new(text.to_owned(), mime.unwrap_or(DEFAULT_TEXT_MIME))
}

pub fn json_blob<T: Serialize + ?Sized>(data: &T, space: Option<usize>) -> Result<Blob, SaveError> {
    let body = match space {
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            data.serialize(&mut ser)?;
            buf
        }
        None => serde_json::to_vec(data)?,
    };
    Ok(Blob::new(body, DEFAULT_JSON_MIME))
}
