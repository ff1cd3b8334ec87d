//! hvprobe - Hyper-V guest state over remote WMI queries.
//!
//! This library exposes the query core and the guest check for use by probe
//! runners and integration tests.

pub mod check;
pub mod config;
pub mod credential;
pub mod error;
pub mod logging;
pub mod query;
pub mod session;
pub mod transport;

pub use credential::Credential;
pub use error::{ProbeError, Result};
pub use query::{Outcome, Query, QueryExecutor, ResultRow, Value};
pub use session::{Session, SessionManager};
