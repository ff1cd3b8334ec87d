//! Credentials for the remote authentication handshake.
//!
//! Identity strings come from asset configuration in one of two forms:
//! - `DOMAIN\user` (down-level logon name)
//! - `user@domain` (UPN)
//!
//! Anything else is treated as a local account with an empty domain.

use std::fmt;

/// Domain credentials used for the NTLM challenge/response.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    domain: String,
    username: String,
    password: String,
}

impl Credential {
    /// Derives a credential from a raw identity string and secret.
    pub fn from_identity(identity: &str, password: impl Into<String>) -> Self {
        let (domain, username) = split_identity(identity);
        Self {
            domain,
            username,
            password: password.into(),
        }
    }

    /// Returns the domain, empty for local accounts.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the bare username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// Only transports should read this, to compute the handshake response.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &format_args!("*** {} bytes ***", self.password.len()))
            .finish()
    }
}

/// Splits an identity into `(domain, username)`.
fn split_identity(identity: &str) -> (String, String) {
    if identity.contains('\\') {
        // Config files often carry an escaped separator
        let identity = identity.replace("\\\\", "\\");
        if let Some((domain, username)) = identity.split_once('\\') {
            return (domain.to_string(), username.to_string());
        }
    }

    if let Some((username, domain)) = identity.split_once('@') {
        return (domain.to_string(), username.to_string());
    }

    (String::new(), identity.to_string())
}
