//! # In-Memory Resource Store
//!
//! [`ResourceStore`] is a small actor that serves one remote collection. It owns
//! the items and the receiving end of a channel, and handles requests one at a
//! time in its own Tokio task. The [`ResourceClient`] returned alongside it is
//! the only way in.
//!
//! It stands in for the remote API: reads can be made to fail on purpose with
//! [`ResourceClient::inject_fault`], which is how error scenarios are staged.

use crate::error::FetchError;
use crate::fetch::{Resource, ResourceClient};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// One-shot reply channel carried by every request.
pub type Response<T> = oneshot::Sender<Result<T, FetchError>>;

/// Requests understood by a [`ResourceStore`].
#[derive(Debug)]
pub enum ResourceRequest<T: Resource> {
    List {
        respond_to: Response<Vec<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T>,
    },
    Insert {
        item: T,
        respond_to: Response<T::Id>,
    },
    InjectFault {
        fault: Option<FetchError>,
        respond_to: Response<()>,
    },
}

/// Serves one collection from memory, in insertion order.
pub struct ResourceStore<T: Resource> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    items: Vec<T>,
    fault: Option<FetchError>,
}

impl<T: Resource> ResourceStore<T> {
    /// Creates a store holding `seed` and the client that talks to it.
    ///
    /// `buffer_size` bounds the request channel; senders wait when it is full.
    pub fn new(buffer_size: usize, seed: Vec<T>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            items: seed,
            fault: None,
        };
        (store, ResourceClient::new(sender))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        let collection = T::COLLECTION;
        info!(collection, size = self.items.len(), "Store started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                ResourceRequest::List { respond_to } => {
                    let result = match &self.fault {
                        Some(fault) => Err(fault.clone()),
                        None => Ok(self.items.clone()),
                    };
                    match &result {
                        Ok(items) => info!(collection, size = items.len(), "Listed"),
                        Err(e) => warn!(collection, error = %e, "List failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let result = match &self.fault {
                        Some(fault) => Err(fault.clone()),
                        None => self
                            .items
                            .iter()
                            .find(|item| item.id() == id)
                            .cloned()
                            .ok_or_else(|| {
                                FetchError::status(404, format!("{collection} {id} not found"))
                            }),
                    };
                    match &result {
                        Ok(_) => debug!(collection, %id, "Get"),
                        Err(e) => warn!(collection, %id, error = %e, "Get failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Insert { item, respond_to } => {
                    let id = item.id();
                    if self.items.iter().any(|existing| existing.id() == id) {
                        warn!(collection, %id, "Already exists");
                        let _ = respond_to.send(Err(FetchError::status(
                            409,
                            format!("{collection} {id} already exists"),
                        )));
                        continue;
                    }
                    self.items.push(item);
                    info!(collection, %id, size = self.items.len(), "Inserted");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::InjectFault { fault, respond_to } => {
                    match &fault {
                        Some(e) => warn!(collection, error = %e, "Fault injected"),
                        None => info!(collection, "Fault cleared"),
                    }
                    self.fault = fault;
                    let _ = respond_to.send(Ok(()));
                }
            }
        }

        info!(collection, size = self.items.len(), "Shutdown");
    }
}
