//! Document AI extraction: credentials, wire types and the HTTP client.

mod client;
pub mod credentials;
pub mod document;

pub use client::DocumentAiClient;
pub use credentials::{Credentials, CredentialsConfig};
pub use document::ProcessorPath;
