pub mod client;

pub use client::{ApiError, Probe, RemoteClient};
