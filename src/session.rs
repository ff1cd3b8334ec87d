//! Session management for hvprobe.
//!
//! Opens and authenticates management sessions and owns their teardown.

use std::sync::Arc;

use tracing::{debug, error};

use crate::credential::Credential;
use crate::error::{ProbeError, Result};
use crate::transport::{Connection, Service, Transport};

/// An authenticated management session to one host.
///
/// Released by [`Session::close`] or, failing that, on drop.
pub struct Session {
    host: String,
    connection: ConnectionGuard,
    service: Box<dyn Service>,
    released: bool,
}

impl Session {
    /// Name of the asset this session was opened for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The authenticated management service.
    pub fn service(&self) -> &dyn Service {
        self.service.as_ref()
    }

    /// Releases the service and the connection.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.service.close();
        self.connection.close();
        debug!("Closed session for {}", self.host);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("released", &self.released)
            .finish()
    }
}

/// Owns a connection and closes it on drop.
///
/// Held from `connect` onwards so a dropped `open` future does not leak a
/// half-open connection.
struct ConnectionGuard(Box<dyn Connection>);

impl ConnectionGuard {
    fn get_mut(&mut self) -> &mut dyn Connection {
        self.0.as_mut()
    }

    fn close(&mut self) {
        self.0.close();
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Opens sessions over a pluggable transport.
#[derive(Clone)]
pub struct SessionManager {
    transport: Arc<dyn Transport>,
}

impl SessionManager {
    /// Creates a session manager over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Opens an authenticated session for `host` through `hypervisor`.
    ///
    /// The hypervisor is the management endpoint actually connected to; `host`
    /// identifies the checked asset in diagnostics.
    pub async fn open(
        &self,
        host: &str,
        identity: Option<&str>,
        secret: Option<&str>,
        hypervisor: Option<&str>,
    ) -> Result<Session> {
        let hypervisor = hypervisor
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProbeError::config("missing hypervisor in collector configuration"))?;

        let (identity, secret) = match (identity, secret) {
            (Some(identity), Some(secret)) if !identity.is_empty() && !secret.is_empty() => {
                (identity, secret)
            }
            _ => {
                error!("missing credentials for {}", host);
                return Err(ProbeError::CredentialMissing(host.to_string()));
            }
        };

        let credential = Credential::from_identity(identity, secret);

        debug!("Connecting to {} for {}", hypervisor, host);
        let mut connection = self
            .transport
            .connect(hypervisor)
            .await
            .map(ConnectionGuard)
            .map_err(|e| ProbeError::connect(e.describe()))?;

        let service = match connection.get_mut().negotiate(&credential).await {
            Ok(service) => service,
            Err(e) => {
                connection.close();
                return Err(ProbeError::auth(e.describe()));
            }
        };

        debug!(
            "Authenticated to {} as {}\\{}",
            hypervisor,
            credential.domain(),
            credential.username()
        );

        Ok(Session {
            host: host.to_string(),
            connection,
            service,
            released: false,
        })
    }
}
