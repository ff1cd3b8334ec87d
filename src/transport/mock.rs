//! Mock transport for testing.
//!
//! Replays scripted query results and records connection, service and
//! enumerator lifecycle so tests can assert that everything is torn down.

use super::{
    Connection, PropertySet, QueryHandle, Service, Transport, TransportError, TransportResult,
};
use crate::credential::Credential;
use crate::query::Query;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted step of a query's result stream.
#[derive(Debug, Clone)]
enum Step {
    Row(PropertySet),
    Fail(TransportError),
    /// Never yields; used to exercise timeouts.
    Stall,
}

/// Scripted response for `exec_query`.
#[derive(Debug, Clone, Default)]
pub struct MockQuery {
    exec_error: Option<TransportError>,
    steps: Vec<Step>,
}

impl MockQuery {
    /// A query that streams the given instances and then completes.
    pub fn rows(rows: Vec<PropertySet>) -> Self {
        Self {
            exec_error: None,
            steps: rows.into_iter().map(Step::Row).collect(),
        }
    }

    /// A query rejected by the service before any instance is returned.
    pub fn rejected(error: TransportError) -> Self {
        Self {
            exec_error: Some(error),
            steps: Vec::new(),
        }
    }

    /// Appends a failure after the scripted instances.
    pub fn then_fail(mut self, error: TransportError) -> Self {
        self.steps.push(Step::Fail(error));
        self
    }

    /// Appends a step that never completes.
    pub fn then_stall(mut self) -> Self {
        self.steps.push(Step::Stall);
        self
    }
}

/// Lifecycle counters recorded by a `MockTransport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockTransportStats {
    pub connects: usize,
    pub connections_closed: usize,
    pub negotiations: usize,
    pub services_closed: usize,
    pub queries: usize,
    pub enumerators_released: usize,
    pub object_fetches: usize,
}

#[derive(Default)]
struct Counters {
    connects: AtomicUsize,
    connections_closed: AtomicUsize,
    negotiations: AtomicUsize,
    services_closed: AtomicUsize,
    queries: AtomicUsize,
    enumerators_released: AtomicUsize,
    object_fetches: AtomicUsize,
}

#[derive(Default)]
struct Script {
    connect_error: Option<TransportError>,
    auth_error: Option<TransportError>,
    stall_auth: bool,
    query: MockQuery,
    objects: HashMap<String, PropertySet>,
    last_host: Option<String>,
    last_credential: Option<Credential>,
    last_query: Option<Query>,
}

/// A transport that never touches the network.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    counters: Arc<Counters>,
}

impl MockTransport {
    /// Creates a transport whose queries return no instances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response for every `exec_query`.
    pub fn with_query(self, query: MockQuery) -> Self {
        self.lock().query = query;
        self
    }

    /// Makes `connect` fail.
    pub fn with_connect_error(self, error: TransportError) -> Self {
        self.lock().connect_error = Some(error);
        self
    }

    /// Makes `negotiate` fail.
    pub fn with_auth_error(self, error: TransportError) -> Self {
        self.lock().auth_error = Some(error);
        self
    }

    /// Makes `negotiate` never complete.
    pub fn with_stalled_auth(self) -> Self {
        self.lock().stall_auth = true;
        self
    }

    /// Registers an instance reachable through `get_object`.
    pub fn with_object(self, path: impl Into<String>, props: PropertySet) -> Self {
        self.lock().objects.insert(path.into(), props);
        self
    }

    /// Returns a snapshot of the lifecycle counters.
    pub fn stats(&self) -> MockTransportStats {
        let c = &self.counters;
        MockTransportStats {
            connects: c.connects.load(Ordering::SeqCst),
            connections_closed: c.connections_closed.load(Ordering::SeqCst),
            negotiations: c.negotiations.load(Ordering::SeqCst),
            services_closed: c.services_closed.load(Ordering::SeqCst),
            queries: c.queries.load(Ordering::SeqCst),
            enumerators_released: c.enumerators_released.load(Ordering::SeqCst),
            object_fetches: c.object_fetches.load(Ordering::SeqCst),
        }
    }

    /// Returns the host of the most recent `connect`.
    pub fn last_host(&self) -> Option<String> {
        self.lock().last_host.clone()
    }

    /// Returns the credential of the most recent `negotiate`.
    pub fn last_credential(&self) -> Option<Credential> {
        self.lock().last_credential.clone()
    }

    /// Returns the most recent query passed to `exec_query`.
    pub fn last_query(&self) -> Option<Query> {
        self.lock().last_query.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from the others
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, host: &str) -> TransportResult<Box<dyn Connection>> {
        let connect_error = {
            let mut script = self.lock();
            script.last_host = Some(host.to_string());
            script.connect_error.clone()
        };
        if let Some(err) = connect_error {
            return Err(err);
        }

        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            transport: self.clone(),
            closed: false,
        }))
    }
}

struct MockConnection {
    transport: MockTransport,
    closed: bool,
}

#[async_trait]
impl Connection for MockConnection {
    async fn negotiate(&mut self, credential: &Credential) -> TransportResult<Box<dyn Service>> {
        self.transport
            .counters
            .negotiations
            .fetch_add(1, Ordering::SeqCst);

        let (auth_error, stall) = {
            let mut script = self.transport.lock();
            script.last_credential = Some(credential.clone());
            (script.auth_error.clone(), script.stall_auth)
        };
        if stall {
            return std::future::pending().await;
        }
        if let Some(err) = auth_error {
            return Err(err);
        }

        Ok(Box::new(MockService {
            transport: self.transport.clone(),
            closed: false,
        }))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.transport
                .counters
                .connections_closed
                .fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MockService {
    transport: MockTransport,
    closed: bool,
}

#[async_trait]
impl Service for MockService {
    async fn exec_query(&self, query: &Query) -> TransportResult<Box<dyn QueryHandle>> {
        self.transport.counters.queries.fetch_add(1, Ordering::SeqCst);

        let scripted = {
            let mut script = self.transport.lock();
            script.last_query = Some(query.clone());
            script.query.clone()
        };
        if let Some(err) = scripted.exec_error {
            return Err(err);
        }

        let mut steps = scripted.steps;
        steps.reverse();
        Ok(Box::new(MockQueryHandle {
            transport: self.transport.clone(),
            steps,
            released: false,
        }))
    }

    async fn get_object(&self, path: &str) -> TransportResult<PropertySet> {
        self.transport
            .counters
            .object_fetches
            .fetch_add(1, Ordering::SeqCst);

        self.transport
            .lock()
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| {
                TransportError::new(
                    super::TransportErrorKind::Other,
                    format!("object not found: {path}"),
                )
            })
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.transport
                .counters
                .services_closed
                .fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MockQueryHandle {
    transport: MockTransport,
    /// Remaining steps, last element first.
    steps: Vec<Step>,
    released: bool,
}

#[async_trait]
impl QueryHandle for MockQueryHandle {
    async fn next(&mut self) -> TransportResult<Option<PropertySet>> {
        match self.steps.pop() {
            None => Ok(None),
            Some(Step::Row(props)) => Ok(Some(props)),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Stall) => std::future::pending().await,
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.transport
                .counters
                .enumerators_released
                .fetch_add(1, Ordering::SeqCst);
        }
    }
}
