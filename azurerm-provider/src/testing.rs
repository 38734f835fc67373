//! In-memory ARM client for tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use azurerm_core::identifier::ResourceIdentifier;

use crate::client::{
    ArmClient, OperationHandle, OperationStatus, PollKind, RemoteError, RemoteResource,
    RemoteResult, Submitted,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Delete,
    Poll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub target: String,
}

/// Resources keyed by lower-cased ID, with scripted failures and LRO statuses
#[derive(Default)]
pub struct FakeArmClient {
    resources: Mutex<HashMap<String, RemoteResource>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Method, VecDeque<RemoteError>>>,
    statuses: Mutex<VecDeque<RemoteResult<OperationStatus>>>,
    asynchronous: Mutex<bool>,
    stalled: Mutex<bool>,
}

impl FakeArmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutations answer 202 and must be polled
    pub fn asynchronous(self) -> Self {
        *self.asynchronous.lock().unwrap() = true;
        self
    }

    /// Polls never reach a terminal state
    pub fn stalled(self) -> Self {
        *self.stalled.lock().unwrap() = true;
        self.asynchronous()
    }

    /// Statuses returned by successive polls; `Succeeded` once exhausted
    pub fn with_poll_statuses(self, statuses: Vec<RemoteResult<OperationStatus>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self.asynchronous()
    }

    pub fn fail_next(&self, method: Method, error: RemoteError) {
        self.failures
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(error);
    }

    pub fn insert(&self, id: &str, resource: RemoteResource) {
        self.resources
            .lock()
            .unwrap()
            .insert(id.to_ascii_lowercase(), resource);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources
            .lock()
            .unwrap()
            .contains_key(&id.to_ascii_lowercase())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    pub fn count(&self, method: Method) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    fn record(&self, method: Method, target: String) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(Call { method, target });
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(&method)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn submitted(&self, id: &ResourceIdentifier, body: Option<RemoteResource>) -> Submitted {
        if *self.asynchronous.lock().unwrap() {
            Submitted::Accepted(OperationHandle {
                url: format!("https://management.azure.com/operations{}", id),
                kind: PollKind::AsyncOperation,
                retry_after: None,
            })
        } else {
            Submitted::Done(body)
        }
    }
}

#[async_trait]
impl ArmClient for FakeArmClient {
    async fn get(&self, id: &ResourceIdentifier, _: &str) -> RemoteResult<RemoteResource> {
        let target = id.to_string();
        self.record(Method::Get, target.clone())?;
        self.resources
            .lock()
            .unwrap()
            .get(&target.to_ascii_lowercase())
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn put(
        &self,
        id: &ResourceIdentifier,
        _: &str,
        body: &RemoteResource,
    ) -> RemoteResult<Submitted> {
        let target = id.to_string();
        self.record(Method::Put, target.clone())?;
        let stored = RemoteResource {
            id: Some(target.clone()),
            name: Some(id.name().to_string()),
            ..body.clone()
        };
        self.insert(&target, stored.clone());
        Ok(self.submitted(id, Some(stored)))
    }

    async fn delete(&self, id: &ResourceIdentifier, _: &str) -> RemoteResult<Submitted> {
        let target = id.to_string();
        self.record(Method::Delete, target.clone())?;
        let removed = self
            .resources
            .lock()
            .unwrap()
            .remove(&target.to_ascii_lowercase());
        match removed {
            Some(_) => Ok(self.submitted(id, None)),
            None => Err(RemoteError::NotFound),
        }
    }

    async fn poll(&self, handle: &OperationHandle) -> RemoteResult<OperationStatus> {
        self.record(Method::Poll, handle.url.clone())?;
        if *self.stalled.lock().unwrap() {
            return Ok(OperationStatus::InProgress { retry_after: None });
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(OperationStatus::Succeeded))
    }
}
