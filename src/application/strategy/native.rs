use tracing::debug;

use crate::application::lifecycle::ObjectUrlLease;
use crate::domain::{Anchor, Blob, Payload};

use super::remote::{self, RemoteOutcome};
use super::{Failure, SaveContext, StrategyResult};

pub(crate) async fn run(ctx: &SaveContext, payload: Payload) -> StrategyResult {
    match payload {
        Payload::Blob(blob) => save_blob(ctx, &blob).await,
        Payload::Url(raw) => {
            let url = ctx.resolve_url(&raw)?;
            if ctx.is_same_origin(&url) {
                debug!(url = %url, "same-origin download");
                return ctx.trigger(anchor(ctx, url.as_str())).await;
            }
            match remote::fetch_or_navigate(ctx, &url).await? {
                RemoteOutcome::Fetched(blob) => save_blob(ctx, &blob)
                    .await
                    .map_err(Failure::into_deferred),
                RemoteOutcome::Navigated => Ok(()),
            }
        }
    }
}

async fn save_blob(ctx: &SaveContext, blob: &Blob) -> StrategyResult {
    let lease = ObjectUrlLease::acquire(&ctx.host, blob, ctx.settings.revoke_timeout)
        .map_err(Failure::Immediate)?;
    ctx.trigger(anchor(ctx, lease.url())).await
}

fn anchor(ctx: &SaveContext, href: &str) -> Anchor {
    Anchor {
        href: href.to_string(),
        download: Some(ctx.name.clone()),
        rel: Some("noopener".to_string()),
        target: ctx.settings.open_in_new_tab.then(|| "_blank".to_string()),
    }
}
