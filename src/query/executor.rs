//! Query execution with timeout and failure classification.
//!
//! Streams instances from the session's service, normalizes each property and
//! hands back fully materialized rows.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, error, warn};

use super::classify::{classify, Outcome, QueryFailure};
use super::coerce::coerce;
use super::{Query, ResultRow};
use crate::session::Session;
use crate::transport::{
    PropertySet, PropertyValue, QueryHandle, Service, TransportError, TransportResult,
};

/// Resolves a reference property into row entries.
///
/// Resolvers may call back into the session to fetch the referenced object.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// Writes zero or more entries for `prop` into `row`.
    async fn resolve(
        &self,
        session: &Session,
        prop: &PropertyValue,
        row: &mut ResultRow,
    ) -> TransportResult<()>;
}

/// Resolvers keyed by property name.
pub type Resolvers = HashMap<String, Arc<dyn ReferenceResolver>>;

/// Resolver that fetches the referenced instance and copies selected
/// properties into the row under new names.
#[derive(Debug, Clone, Default)]
pub struct ObjectResolver {
    fields: Vec<(String, String)>,
}

impl ObjectResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies property `source` of the referenced instance to `target`.
    pub fn field(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.fields.push((source.into(), target.into()));
        self
    }
}

#[async_trait]
impl ReferenceResolver for ObjectResolver {
    async fn resolve(
        &self,
        session: &Session,
        prop: &PropertyValue,
        row: &mut ResultRow,
    ) -> TransportResult<()> {
        let Some(path) = prop.reference_path() else {
            return Ok(());
        };

        let object = session.service().get_object(path).await?;
        for (source, target) in &self.fields {
            if let Some((_, value)) = object.iter().find(|(name, _)| name == source) {
                row.insert(target.clone(), coerce(value));
            }
        }
        Ok(())
    }
}

/// Scoped enumerator over a running query.
///
/// The remote enumerator is released exactly once: by [`QueryContext::close`]
/// or on drop, which covers errors, timeouts and cancellation.
pub struct QueryContext {
    handle: Box<dyn QueryHandle>,
    torn_down: Arc<AtomicBool>,
}

impl QueryContext {
    /// Starts `query` on `service`.
    pub async fn open(service: &dyn Service, query: &Query) -> TransportResult<Self> {
        let handle = service.exec_query(query).await?;
        Ok(Self {
            handle,
            torn_down: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Lazily streams instances as the endpoint returns them.
    ///
    /// The stream ends after the first error.
    pub fn results(&mut self) -> impl Stream<Item = TransportResult<PropertySet>> + Send + '_ {
        stream::try_unfold(&mut self.handle, |handle| async move {
            let next = handle.next().await?;
            Ok::<_, TransportError>(next.map(|props| (props, handle)))
        })
    }

    /// Returns a flag that flips once the context is torn down.
    pub fn teardown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.torn_down)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Releases the remote enumerator.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            self.handle.release();
        }
    }
}

impl Drop for QueryContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Runs queries on an open session.
pub struct QueryExecutor<'a> {
    session: &'a Session,
    resolvers: Resolvers,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor with no reference resolvers.
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            resolvers: Resolvers::new(),
        }
    }

    /// Registers a resolver for reference property `name`.
    pub fn with_resolver(
        mut self,
        name: impl Into<String>,
        resolver: Arc<dyn ReferenceResolver>,
    ) -> Self {
        self.resolvers.insert(name.into(), resolver);
        self
    }

    /// Replaces the resolver table.
    pub fn with_resolvers(mut self, resolvers: Resolvers) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Executes `query` and returns its rows in the order the endpoint sent them.
    ///
    /// Missing classes and namespaces come back as [`Outcome::Ignorable`] with
    /// no partial rows.
    pub async fn execute(&self, query: &Query) -> Result<Vec<ResultRow>, Outcome> {
        let start = Instant::now();

        let result = match tokio::time::timeout(query.timeout(), self.run(query)).await {
            Ok(rows) => rows.map_err(QueryFailure::from),
            Err(_) => Err(QueryFailure::Elapsed(query.timeout())),
        };

        match result {
            Ok(rows) => {
                debug!(
                    "Query on {} returned {} rows in {:?}",
                    self.session.host(),
                    rows.len(),
                    start.elapsed()
                );
                Ok(rows)
            }
            Err(failure) => {
                let outcome = classify(&failure);
                match &outcome {
                    Outcome::Ignorable => {
                        debug!("Query on {} not applicable: {:?}", self.session.host(), failure)
                    }
                    Outcome::TimedOut => warn!(
                        "Query on {} timed out after {:?}",
                        self.session.host(),
                        query.timeout()
                    ),
                    Outcome::Failed(msg) => error!(
                        host = %self.session.host(),
                        namespace = %query.namespace(),
                        query = %query.text(),
                        failure = ?failure,
                        "query error: {msg};"
                    ),
                }
                Err(outcome)
            }
        }
    }

    async fn run(&self, query: &Query) -> TransportResult<Vec<ResultRow>> {
        let mut context = QueryContext::open(self.session.service(), query).await?;

        let mut rows = Vec::new();
        let result = {
            let mut results = std::pin::pin!(context.results());
            loop {
                match results.try_next().await {
                    Ok(Some(props)) => match self.build_row(props).await {
                        Ok(row) => rows.push(row),
                        Err(e) => break Err(e),
                    },
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                }
            }
        };

        context.close();
        result.map(|()| rows)
    }

    async fn build_row(&self, props: PropertySet) -> TransportResult<ResultRow> {
        let mut row = ResultRow::new();
        for (name, prop) in props {
            match self.resolvers.get(&name) {
                Some(resolver) if prop.is_reference() => {
                    resolver.resolve(self.session, &prop, &mut row).await?
                }
                _ => row.insert(name, coerce(&prop)),
            }
        }
        Ok(row)
    }
}
