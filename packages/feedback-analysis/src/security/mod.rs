//! Credential handling and SSRF protection.

pub mod credentials;
pub mod url_guard;

pub use credentials::SecretString;
pub use url_guard::UrlGuard;
