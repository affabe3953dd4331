use crate::domain::{Blob, Payload, SaveError};
use crate::host::Host;

use super::remote::{self, RemoteOutcome};
use super::{Failure, SaveContext, StrategyResult};

pub(crate) async fn run(ctx: &SaveContext, payload: Payload) -> StrategyResult {
    match payload {
        Payload::Blob(blob) => save_blob(ctx, &blob),
        Payload::Url(raw) => {
            let url = ctx.resolve_url(&raw)?;
            match remote::fetch_or_navigate(ctx, &url).await? {
                RemoteOutcome::Fetched(blob) => {
                    save_blob(ctx, &blob).map_err(Failure::into_deferred)
                }
                RemoteOutcome::Navigated => Ok(()),
            }
        }
    }
}

fn save_blob(ctx: &SaveContext, blob: &Blob) -> StrategyResult {
    if ctx.host.legacy_save_blob(blob, &ctx.name) {
        ctx.lifecycle.complete();
        Ok(())
    } else {
        Err(Failure::Immediate(SaveError::legacy_save()))
    }
}
