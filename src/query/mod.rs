//! Query execution and normalization for hvprobe.
//!
//! This module isolates query execution, value coercion and failure
//! classification from the checks that build queries and interpret rows.

pub mod classify;
pub mod coerce;
pub mod executor;
mod types;

pub use classify::{classify, Outcome, QueryFailure};
pub use coerce::coerce;
pub use executor::{ObjectResolver, QueryContext, QueryExecutor, ReferenceResolver, Resolvers};
pub use types::{Query, ResultRow, Value, DEFAULT_NAMESPACE, QUERY_TIMEOUT_SECS};
