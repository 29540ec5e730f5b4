//! Configuration: supervisor settings and the stream spec store

pub mod settings;
pub mod store;

pub use settings::{Credentials, SupervisorConfig};
pub use store::{SpecStore, StreamSpec};
