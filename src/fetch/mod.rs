//! Snapshot acquisition

pub mod http;

pub use http::{HttpFetcher, SnapshotFetcher};
