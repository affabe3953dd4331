pub mod error;
pub mod model;
pub mod options;

pub use error::SaveError;
pub use model::{
    make_blob, resolve_filename, Anchor, Blob, NavigationTarget, Payload, PopupId, SaveStrategy,
    DEFAULT_FILENAME, OCTET_STREAM,
};
pub use options::{SaveOptions, SaveSettings};
