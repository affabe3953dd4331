use tracing::debug;

use crate::application::lifecycle::ObjectUrlLease;
use crate::detect::Environment;
use crate::domain::{Blob, NavigationTarget, Payload, SaveError, OCTET_STREAM};
use crate::host::Host;
use crate::utils::{force_attachment, to_data_url};

use super::remote::{self, RemoteOutcome};
use super::{Failure, SaveContext, StrategyResult};

pub(crate) async fn run(ctx: &SaveContext, payload: Payload) -> StrategyResult {
    match payload {
        Payload::Blob(blob) => save_blob(ctx, blob).await,
        Payload::Url(raw) => {
            let url = ctx.resolve_url(&raw)?;
            match remote::fetch_or_navigate(ctx, &url).await? {
                RemoteOutcome::Fetched(blob) => save_blob(ctx, blob)
                    .await
                    .map_err(Failure::into_deferred),
                RemoteOutcome::Navigated => Ok(()),
            }
        }
    }
}

/// Restrictive environments only open data URIs reliably.
fn needs_data_url(ctx: &SaveContext, blob: &Blob) -> bool {
    let caps = &ctx.caps;
    let force = blob.mime() == OCTET_STREAM;
    (caps.chromium_on_ios
        || (force && caps.first_party_desktop_browser)
        || caps.apple_desktop_embedded_webview)
        && ctx.host.has_file_reader()
}

async fn save_blob(ctx: &SaveContext, blob: Blob) -> StrategyResult {
    // Open the popup before any await so it still counts as user-initiated.
    let popup = if ctx.settings.open_in_new_tab {
        ctx.host.open_popup(&ctx.name)
    } else {
        None
    };
    let target = popup
        .map(NavigationTarget::Popup)
        .unwrap_or(NavigationTarget::CurrentDocument);

    if needs_data_url(ctx, &blob) {
        let keep_media_type = ctx.caps.chromium_on_ios;
        let data_url = tokio::task::spawn_blocking(move || to_data_url(&blob))
            .await
            .map_err(|_| Failure::Deferred(SaveError::read_file()))?;
        let data_url = if keep_media_type {
            data_url
        } else {
            force_attachment(&data_url)
        };
        debug!(?target, "navigating to data URL");
        ctx.host
            .navigate(target, &data_url)
            .await
            .map_err(Failure::Deferred)?;
        ctx.lifecycle.complete();
        return Ok(());
    }

    let lease = ObjectUrlLease::acquire(&ctx.host, &blob, ctx.settings.revoke_timeout)
        .map_err(Failure::Immediate)?;
    debug!(?target, url = lease.url(), "navigating to object URL");
    ctx.host
        .navigate(target, lease.url())
        .await
        .map_err(Failure::Deferred)?;
    ctx.lifecycle.complete();
    Ok(())
}
