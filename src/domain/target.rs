//! Target appliance identity and credential

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

/// Pre-encoded `Authorization` header value for one appliance.
///
/// Stored as a `SecretString` so it never leaks through `Debug` or logs.
#[derive(Clone)]
pub struct Credential {
    header: SecretString,
}

impl Credential {
    /// Encode a `user:password` pair into a basic-auth header value.
    pub fn basic(user_pass: &str) -> Self {
        let encoded = STANDARD.encode(user_pass.as_bytes());
        Self {
            header: SecretString::from(format!("Basic {encoded}")),
        }
    }

    /// The full header value, e.g. `Basic YWRtaW46YWRtaW4=`.
    pub fn header_value(&self) -> &str {
        self.header.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// One appliance, addressed by its management address.
#[derive(Debug, Clone)]
pub struct Target {
    address: String,
    credential: Credential,
}

impl Target {
    pub fn new(address: impl Into<String>, credential: Credential) -> Self {
        Self {
            address: address.into(),
            credential,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
