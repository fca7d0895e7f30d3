//! # Remote Fetching
//!
//! The boundary between the stream graph and the remote data source.
//!
//! - [`Resource`]: what a remote collection holds (a product, a supplier, ...).
//! - [`RemoteFetcher`]: the collaborator services depend on. It turns "fetch the
//!   collection" and "fetch one item" into cold, single-value [`Stream`]s.
//! - [`ResourceClient`]: the production fetcher. It talks to a
//!   [`ResourceStore`](crate::store::ResourceStore) task over a channel, with an
//!   optional simulated latency per request.
//!
//! Services hold an `Rc<dyn RemoteFetcher<T>>`, so tests can swap in
//! [`MockFetcher`](crate::mock::MockFetcher) without touching the graph.

use crate::error::{FetchError, StreamError};
use crate::store::ResourceRequest;
use crate::stream::Stream;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// An item of a remote collection.
pub trait Resource: Clone + Debug + Send + 'static {
    /// Identifier within the collection.
    type Id: Eq + Clone + Display + Debug + Send + 'static;

    /// Collection name; the default locator is `api/{COLLECTION}`.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;
}

/// Fetches a remote collection as streams.
///
/// Both methods are lazy: the request is issued on subscription, once per
/// subscription. The stream emits one value and completes, or errors.
pub trait RemoteFetcher<T: Resource> {
    /// `GET {locator}`: every item of the collection.
    fn fetch_all(&self) -> Stream<Vec<T>>;

    /// `GET {locator}/{id}`: one item.
    fn fetch_one(&self, id: T::Id) -> Stream<T>;
}

/// Client for a [`ResourceStore`](crate::store::ResourceStore).
///
/// Cheap to clone; all clones talk to the same store.
#[derive(Clone)]
pub struct ResourceClient<T: Resource> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    locator: String,
    latency: Duration,
    latency_overrides: Arc<HashMap<String, Duration>>,
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self {
            sender,
            locator: format!("api/{}", T::COLLECTION),
            latency: Duration::ZERO,
            latency_overrides: Arc::new(HashMap::new()),
        }
    }

    /// Overrides the collection locator, e.g. with a configured URL.
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = locator.into();
        self
    }

    /// Delays every fetch by `latency` before the request is sent.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Delays fetches of one item by `latency`, replacing the default.
    pub fn with_latency_for(mut self, id: T::Id, latency: Duration) -> Self {
        let target = self.item_locator(&id);
        Arc::make_mut(&mut self.latency_overrides).insert(target, latency);
        self
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    fn item_locator(&self, id: &T::Id) -> String {
        format!("{}/{}", self.locator, id)
    }

    async fn simulate_latency(&self, target: &str) {
        let latency = self
            .latency_overrides
            .get(target)
            .copied()
            .unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::List { respond_to }).await?;
        response.await.map_err(|_| self.dropped())?
    }

    pub async fn get(&self, id: T::Id) -> Result<T, FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Get { id, respond_to }).await?;
        response.await.map_err(|_| self.dropped())?
    }

    pub async fn insert(&self, item: T) -> Result<T::Id, FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Insert { item, respond_to }).await?;
        response.await.map_err(|_| self.dropped())?
    }

    /// Makes every later read fail with `fault` until cleared with `None`.
    pub async fn inject_fault(&self, fault: Option<FetchError>) -> Result<(), FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::InjectFault { fault, respond_to })
            .await?;
        response.await.map_err(|_| self.dropped())?
    }

    async fn send(&self, request: ResourceRequest<T>) -> Result<(), FetchError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| FetchError::Unavailable(format!("{} is closed", self.locator)))
    }

    fn dropped(&self) -> FetchError {
        FetchError::Unavailable(format!("{} dropped the request", self.locator))
    }
}

impl<T: Resource> RemoteFetcher<T> for ResourceClient<T> {
    fn fetch_all(&self) -> Stream<Vec<T>> {
        let client = self.clone();
        Stream::from_future(move || {
            let client = client.clone();
            async move {
                client.simulate_latency(&client.locator).await;
                debug!(locator = %client.locator, "GET");
                client.list().await.map_err(StreamError::from)
            }
        })
    }

    fn fetch_one(&self, id: T::Id) -> Stream<T> {
        let client = self.clone();
        Stream::from_future(move || {
            let client = client.clone();
            let id = id.clone();
            async move {
                let target = client.item_locator(&id);
                client.simulate_latency(&target).await;
                debug!(locator = %target, "GET");
                client.get(id).await.map_err(StreamError::from)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::create_mock_client;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: u32,
    }

    impl Resource for Widget {
        type Id = u32;
        const COLLECTION: &'static str = "widgets";
        fn id(&self) -> u32 {
            self.id
        }
    }

    #[tokio::test]
    async fn test_default_locator_and_override() {
        let (client, _receiver) = create_mock_client::<Widget>(4);
        assert_eq!(client.locator(), "api/widgets");
        let client = client.with_locator("http://localhost/api/widgets");
        assert_eq!(client.item_locator(&7), "http://localhost/api/widgets/7");
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let (client, receiver) = create_mock_client::<Widget>(4);
        drop(receiver);
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_dropped_response_is_unavailable() {
        let (client, mut receiver) = create_mock_client::<Widget>(4);
        let responder = tokio::spawn(async move {
            // Receive the request and drop its reply channel.
            let _ = receiver.recv().await;
        });
        let err = client.get(1).await.unwrap_err();
        assert!(err.to_string().contains("dropped"));
        responder.await.unwrap();
    }
}
