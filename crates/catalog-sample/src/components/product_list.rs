//! Product list with a category picker and local additions.

use crate::model::{Category, CategoryId, Product, ProductWithCategory};
use crate::services::{CategoryService, ProductService};
use reactive_framework::{combine_latest2, ActionStream, MessageChannel, Stream};
use tracing::debug;

pub struct ProductListComponent {
    service: ProductService,
    channel: MessageChannel,
    category_selection: ActionStream<Option<CategoryId>>,
    categories: Stream<Vec<Category>>,
    products: Stream<Vec<ProductWithCategory>>,
}

impl ProductListComponent {
    pub const PAGE_TITLE: &'static str = "Product List";

    pub fn new(service: &ProductService, categories: &CategoryService) -> Self {
        let channel = MessageChannel::new();
        let category_selection = ActionStream::with_initial(None);

        // A categories failure also fails the product list, which reports it.
        let categories = categories
            .categories()
            .catch_error(|_| Stream::empty())
            .share_replay();
        let guarded = service.products_with_add().catch_into(&channel).share_replay();
        let products = combine_latest2(&guarded, &category_selection.stream()).map(
            |(products, selected): (Vec<ProductWithCategory>, Option<CategoryId>)| match selected {
                Some(category) => products
                    .into_iter()
                    .filter(|p| p.listing.category_id == category)
                    .collect(),
                None => products,
            },
        );

        Self {
            service: service.clone(),
            channel,
            category_selection,
            categories,
            products,
        }
    }

    pub fn page_title(&self) -> &'static str {
        Self::PAGE_TITLE
    }

    /// Categories for the picker.
    pub fn categories(&self) -> Stream<Vec<Category>> {
        self.categories.clone()
    }

    /// Products in the selected category, or all of them when none is selected.
    pub fn products(&self) -> Stream<Vec<ProductWithCategory>> {
        self.products.clone()
    }

    pub fn error_message(&self) -> Stream<String> {
        self.channel.messages()
    }

    /// Narrows the list to `category`; `None` shows every category.
    pub fn on_selected(&self, category: Option<CategoryId>) {
        debug!(category = ?category, "Category filter changed");
        self.category_selection.emit(category);
    }

    pub fn on_add(&self, product: Option<Product>) {
        self.service.add_product(product);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{category, product, record, Harness};
    use crate::model::ProductId;
    use reactive_framework::FetchError;

    fn ids(list: &[ProductWithCategory]) -> Vec<u32> {
        list.iter().map(|p| p.id().0).collect()
    }

    #[test]
    fn test_category_filter_narrows_and_resets() {
        let h = Harness::new();
        h.products.expect_list().return_ok(vec![
            product(1, "Leaf Rake", 1, &[]),
            product(5, "Hammer", 3, &[]),
        ]);
        h.categories
            .expect_list()
            .return_ok(vec![category(1, "Garden"), category(3, "Toolbox")]);

        let component = ProductListComponent::new(&h.product_service, &h.categories_service);
        let lists = record(&component.products());
        assert_eq!(ids(&lists.borrow()[0]), vec![1, 5]);

        component.on_selected(Some(CategoryId(3)));
        assert_eq!(ids(lists.borrow().last().unwrap()), vec![5]);

        component.on_selected(None);
        assert_eq!(ids(lists.borrow().last().unwrap()), vec![1, 5]);
        assert_eq!(component.page_title(), "Product List");
    }

    #[test]
    fn test_added_sample_respects_filter() {
        let h = Harness::new();
        h.products
            .expect_list()
            .return_ok(vec![product(1, "Leaf Rake", 1, &[])]);
        h.categories
            .expect_list()
            .return_ok(vec![category(1, "Garden"), category(3, "Toolbox")]);

        let component = ProductListComponent::new(&h.product_service, &h.categories_service);
        let lists = record(&component.products());
        component.on_selected(Some(CategoryId(3)));
        assert!(lists.borrow().last().unwrap().is_empty());

        component.on_add(None);
        let last = lists.borrow().last().cloned().unwrap();
        assert_eq!(ids(&last), vec![42]);
        assert_eq!(last[0].id(), ProductId(42));
        assert_eq!(last[0].category.as_deref(), Some("Toolbox"));
    }

    #[test]
    fn test_failure_is_reported_once() {
        let h = Harness::new();
        h.products
            .expect_list()
            .return_err(FetchError::status(500, "Internal Server Error"));
        h.categories.expect_list().return_ok(vec![category(1, "Garden")]);

        let component = ProductListComponent::new(&h.product_service, &h.categories_service);
        let messages = record(&component.error_message());
        let first = record(&component.products());
        let second = record(&component.products());

        assert!(first.borrow().is_empty() && second.borrow().is_empty());
        assert_eq!(messages.borrow().len(), 1);
        assert!(messages.borrow()[0].contains("500"));
        assert_eq!(record(&component.categories()).borrow().len(), 1);
    }

    #[test]
    fn test_categories_failure_is_reported_once() {
        let h = Harness::new();
        h.products
            .expect_list()
            .return_ok(vec![product(1, "Leaf Rake", 1, &[])]);
        h.categories
            .expect_list()
            .return_err(FetchError::status(500, "Internal Server Error"));

        let component = ProductListComponent::new(&h.product_service, &h.categories_service);
        let messages = record(&component.error_message());
        let picker = record(&component.categories());
        let lists = record(&component.products());

        assert!(picker.borrow().is_empty() && lists.borrow().is_empty());
        assert_eq!(messages.borrow().len(), 1);
        assert!(messages.borrow()[0].contains("500"));
    }
}
