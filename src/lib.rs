//! Save in-memory content or remote resources as a named file, picking the
//! save mechanism the host environment actually supports.

pub mod api;
pub mod application;
pub mod canvas;
pub mod config;
pub mod detect;
pub mod domain;
pub mod host;
pub mod utils;

pub use application::{json_blob, select_strategy, text_blob, Downloader};
pub use canvas::{Canvas, CanvasEncoding};
pub use config::SaverConfig;
pub use detect::{Capabilities, Environment};
pub use domain::{make_blob, Anchor, Blob, NavigationTarget, Payload, SaveError, SaveOptions, SaveStrategy};
pub use host::{FsHost, Host};
