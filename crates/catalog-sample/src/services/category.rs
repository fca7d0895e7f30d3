use crate::model::Category;
use reactive_framework::{RemoteFetcher, Stream};
use std::rc::Rc;
use tracing::info;

/// Owns the cached category list.
#[derive(Clone)]
pub struct CategoryService {
    categories: Stream<Vec<Category>>,
}

impl CategoryService {
    pub fn new(fetcher: Rc<dyn RemoteFetcher<Category>>) -> Self {
        let categories = fetcher
            .fetch_all()
            .tap(|categories| info!(count = categories.len(), "Categories loaded"))
            .share_replay();
        Self { categories }
    }

    /// `categories$`: fetched once on first subscription, then replayed.
    pub fn categories(&self) -> Stream<Vec<Category>> {
        self.categories.clone()
    }
}
