//! Remote management transport abstraction for hvprobe.
//!
//! The DCOM/RPC wire protocol lives outside this crate. Implementations plug
//! in through these traits; `MockTransport` provides a scripted in-memory
//! backend for tests.

mod mock;
mod types;

pub use mock::{MockQuery, MockTransport, MockTransportStats};
pub use types::{PropertySet, PropertyType, PropertyValue, RawValue};

use crate::credential::Credential;
use crate::query::Query;
use async_trait::async_trait;
use thiserror::Error;

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// WBEM_E_INVALID_CLASS
    InvalidClass,
    /// WBEM_E_INVALID_NAMESPACE
    InvalidNamespace,
    /// WBEM_E_ACCESS_DENIED or NTLM rejection.
    AccessDenied,
    /// The transport gave up waiting on the remote side.
    Timeout,
    /// Socket-level failure.
    Io,
    /// Malformed or unexpected RPC/DCOM response.
    Protocol,
    Other,
}

impl TransportErrorKind {
    /// Returns the kind's name, used when a failure carries no message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidClass => "InvalidClass",
            Self::InvalidNamespace => "InvalidNamespace",
            Self::AccessDenied => "AccessDenied",
            Self::Timeout => "Timeout",
            Self::Io => "Io",
            Self::Protocol => "Protocol",
            Self::Other => "Other",
        }
    }
}

/// A failure reported by the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.describe())]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the message, or the kind's name when the message is empty.
    pub fn describe(&self) -> String {
        if self.message.is_empty() {
            self.kind.name().to_string()
        } else {
            self.message.clone()
        }
    }
}

/// Result type alias for transport calls.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Opens connections to remote hosts.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens an unauthenticated connection to `host`.
    async fn connect(&self, host: &str) -> TransportResult<Box<dyn Connection>>;
}

/// An open, not yet authenticated connection.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Runs the challenge/response handshake and returns the management service.
    async fn negotiate(&mut self, credential: &Credential) -> TransportResult<Box<dyn Service>>;

    /// Closes the connection. Must be idempotent.
    fn close(&mut self);
}

/// An authenticated management service.
#[async_trait]
pub trait Service: Send + Sync {
    /// Starts a query and returns its forward-only enumerator.
    async fn exec_query(&self, query: &Query) -> TransportResult<Box<dyn QueryHandle>>;

    /// Fetches the instance an object path points at.
    async fn get_object(&self, path: &str) -> TransportResult<PropertySet>;

    /// Releases the service. Must be idempotent.
    fn close(&mut self);
}

/// Forward-only enumerator over a running query.
#[async_trait]
pub trait QueryHandle: Send {
    /// Returns the next instance, or `None` once the enumerator is exhausted.
    async fn next(&mut self) -> TransportResult<Option<PropertySet>>;

    /// Releases the remote enumerator. Must be idempotent.
    fn release(&mut self);
}
