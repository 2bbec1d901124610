//! # Mock Connector
//!
//! Test double for the connector seams.
//!
//! Queue replies with the `expect_*` builders, run the code under test, then
//! [`verify`](MockConnector::verify) that everything queued was consumed. A
//! call with no queued reply — or a reply of the wrong kind — panics.
//!
//! A [`gated`](MockConnector::gated) mock additionally holds every call open
//! until the test releases it, so state can be observed deterministically
//! between an action's pre-mutation and the connector's resolution:
//!
//! ```ignore
//! let connector = MockConnector::gated();
//! connector.expect_create().return_ok(response);
//! let handle = tokio::spawn(async move { action.run(&collection, body).await });
//! connector.entered().await;   // the call is now in flight
//! // ... assert intermediate state ...
//! connector.release();
//! handle.await.unwrap().unwrap();
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::connector::{
    ConnectorResult, CreateConnector, FetchOneConnector, FetchPageConnector, Page, PageQuery,
    PatchConnector, Record,
};
use crate::error::ConnectorError;
use crate::item::ItemId;

/// A connector invocation recorded by [`MockConnector`], for argument
/// assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Create { params: Record, body: Record },
    FetchOne { params: Record, id: ItemId },
    FetchPage { params: Record, query: PageQuery },
    Patch { params: Record, id: ItemId, body: Record },
}

#[derive(Debug)]
enum MockReply {
    Create(ConnectorResult<Record>),
    FetchOne(ConnectorResult<Record>),
    FetchPage(ConnectorResult<Page>),
    Patch(ConnectorResult<Record>),
}

struct Gate {
    entered: Semaphore,
    release: Semaphore,
}

/// Scripted connector implementing all four connector traits.
#[derive(Clone, Default)]
pub struct MockConnector {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    gate: Option<Arc<Gate>>,
}

impl MockConnector {
    /// A mock whose calls resolve as soon as a queued reply is available.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose calls block until [`release`](Self::release) is invoked.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Gate {
                entered: Semaphore::new(0),
                release: Semaphore::new(0),
            })),
            ..Self::default()
        }
    }

    /// Queues a reply for the next `create` call.
    pub fn expect_create(&self) -> ReplyBuilder<'_, Record> {
        ReplyBuilder {
            mock: self,
            wrap: MockReply::Create,
        }
    }

    /// Queues a reply for the next `fetch_one` call.
    pub fn expect_fetch_one(&self) -> ReplyBuilder<'_, Record> {
        ReplyBuilder {
            mock: self,
            wrap: MockReply::FetchOne,
        }
    }

    /// Queues a reply for the next `fetch_page` call.
    pub fn expect_fetch_page(&self) -> ReplyBuilder<'_, Page> {
        ReplyBuilder {
            mock: self,
            wrap: MockReply::FetchPage,
        }
    }

    /// Queues a reply for the next `patch` call.
    pub fn expect_patch(&self) -> ReplyBuilder<'_, Record> {
        ReplyBuilder {
            mock: self,
            wrap: MockReply::Patch,
        }
    }

    /// Every invocation recorded so far, in call order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recent invocation, if any.
    pub fn last_call(&self) -> Option<MockCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Panics when queued replies were never consumed.
    pub fn verify(&self) {
        let replies = self.replies.lock().unwrap();
        if !replies.is_empty() {
            panic!("{} queued replies were never consumed", replies.len());
        }
    }

    /// Waits until a gated call has entered the connector.
    pub async fn entered(&self) {
        let gate = self.gate.as_ref().expect("not a gated mock");
        gate.entered.acquire().await.expect("gate closed").forget();
    }

    /// Lets one gated call proceed.
    pub fn release(&self) {
        let gate = self.gate.as_ref().expect("not a gated mock");
        gate.release.add_permits(1);
    }

    fn record_call(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.add_permits(1);
            gate.release.acquire().await.expect("gate closed").forget();
        }
    }

    fn pop(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("connector called with no queued reply")
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ReplyBuilder<'a, T> {
    mock: &'a MockConnector,
    wrap: fn(ConnectorResult<T>) -> MockReply,
}

impl<T> ReplyBuilder<'_, T> {
    /// Queues a successful reply.
    pub fn return_ok(self, value: T) {
        self.push((self.wrap)(Ok(value)));
    }

    /// Queues a failure with the given opaque message.
    pub fn return_err(self, message: &str) {
        self.push((self.wrap)(Err(ConnectorError::from(message))));
    }

    fn push(&self, reply: MockReply) {
        self.mock.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl CreateConnector for MockConnector {
    async fn create(&self, params: &Record, body: &Record) -> ConnectorResult<Record> {
        self.record_call(MockCall::Create {
            params: params.clone(),
            body: body.clone(),
        });
        self.pass_gate().await;
        match self.pop() {
            MockReply::Create(reply) => reply,
            other => panic!("create called but the next queued reply is {other:?}"),
        }
    }
}

#[async_trait]
impl FetchOneConnector for MockConnector {
    async fn fetch_one(&self, params: &Record, id: &ItemId) -> ConnectorResult<Record> {
        self.record_call(MockCall::FetchOne {
            params: params.clone(),
            id: id.clone(),
        });
        self.pass_gate().await;
        match self.pop() {
            MockReply::FetchOne(reply) => reply,
            other => panic!("fetch_one called but the next queued reply is {other:?}"),
        }
    }
}

#[async_trait]
impl FetchPageConnector for MockConnector {
    async fn fetch_page(&self, params: &Record, query: &PageQuery) -> ConnectorResult<Page> {
        self.record_call(MockCall::FetchPage {
            params: params.clone(),
            query: query.clone(),
        });
        self.pass_gate().await;
        match self.pop() {
            MockReply::FetchPage(reply) => reply,
            other => panic!("fetch_page called but the next queued reply is {other:?}"),
        }
    }
}

#[async_trait]
impl PatchConnector for MockConnector {
    async fn patch(&self, params: &Record, id: &ItemId, body: &Record) -> ConnectorResult<Record> {
        self.record_call(MockCall::Patch {
            params: params.clone(),
            id: id.clone(),
            body: body.clone(),
        });
        self.pass_gate().await;
        match self.pop() {
            MockReply::Patch(reply) => reply,
            other => panic!("patch called but the next queued reply is {other:?}"),
        }
    }
}
