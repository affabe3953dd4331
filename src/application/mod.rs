pub mod downloader;
pub(crate) mod lifecycle;
pub(crate) mod strategy;

pub use downloader::{json_blob, text_blob, Downloader, COMPLETION_GRACE};
pub use strategy::select_strategy;
