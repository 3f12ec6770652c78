// botdesk-api: Async Rust client for the botdesk admin settings backend

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::AdminClient;
pub use error::{Error, FieldIssue};
pub use transport::{TlsMode, TransportConfig};
