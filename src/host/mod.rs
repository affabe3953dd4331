//! Platform primitives the save strategies drive.

pub mod fs;

use async_trait::async_trait;

use crate::detect::Environment;
use crate::domain::{Anchor, Blob, NavigationTarget, PopupId, SaveError};

pub use fs::FsHost;

/// A hosting environment: ambient facts plus the primitives needed to hand
/// content to the user.
#[async_trait]
pub trait Host: Environment + Send + Sync {
    /// Create a temporary, revocable reference to `blob` usable as an href.
    fn create_object_url(&self, blob: &Blob) -> Result<String, SaveError>;

    fn revoke_object_url(&self, url: &str);

    /// Dispatch a synthetic click on `anchor`.
    async fn click(&self, anchor: &Anchor) -> Result<(), SaveError>;

    /// The legacy save-or-open-blob primitive. Returns whether the host accepted it.
    fn legacy_save_blob(&self, blob: &Blob, name: &str) -> bool;

    /// Open a placeholder window. `None` when blocked or unsupported.
    fn open_popup(&self, title: &str) -> Option<PopupId>;

    async fn navigate(&self, target: NavigationTarget, url: &str) -> Result<(), SaveError>;
}
