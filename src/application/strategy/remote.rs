use tracing::{debug, warn};
use url::Url;

use crate::api::Probe;
use crate::domain::{Anchor, Blob, SaveError};
use crate::utils::apply_bom;

use super::{Failure, SaveContext};

pub(crate) enum RemoteOutcome {
    /// The bytes were read back and still need the strategy's blob path.
    Fetched(Blob),
    /// A direct navigation was dispatched; nothing left to do.
    Navigated,
}

/// Stream a CORS-readable resource when progress is tracked, otherwise
/// navigate to it directly.
pub(crate) async fn fetch_or_navigate(
    ctx: &SaveContext,
    url: &Url,
) -> Result<RemoteOutcome, Failure> {
    let page = ctx.page_location();
    let probe = match ctx.client.probe(url, page.as_ref()).await {
        Ok(probe) => probe,
        Err(e) => {
            warn!(url = %url, error = %e, "CORS probe failed, navigating directly");
            Probe::Opaque
        }
    };
    debug!(url = %url, ?probe, "probed remote resource");

    if probe == Probe::CorsReadable && ctx.lifecycle.tracks_progress() {
        let lifecycle = &ctx.lifecycle;
        let blob = ctx
            .client
            .fetch_blob(url, |loaded, total| {
                if let Some(total) = total {
                    lifecycle.progress(loaded, total);
                }
            })
            .await
            .map_err(|e| Failure::Deferred(SaveError::from(e)))?;
        return Ok(RemoteOutcome::Fetched(apply_bom(&blob, ctx.settings.auto_bom)));
    }

    let anchor = Anchor {
        href: url.to_string(),
        target: Some("_blank".to_string()),
        ..Default::default()
    };
    ctx.trigger(anchor).await.map_err(Failure::into_deferred)?;
    Ok(RemoteOutcome::Navigated)
}
