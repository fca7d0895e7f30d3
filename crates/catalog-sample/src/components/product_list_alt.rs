//! Product list shown beside the detail panel; clicking a row selects it.

use crate::model::{ProductId, ProductWithCategory};
use crate::services::ProductService;
use reactive_framework::{compose_view2, MessageChannel, Stream};

/// Everything the list renders, in one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListVm {
    pub products: Vec<ProductWithCategory>,
    pub selected_product: Option<ProductWithCategory>,
}

pub struct ProductListAltComponent {
    service: ProductService,
    channel: MessageChannel,
    products: Stream<Vec<ProductWithCategory>>,
    selected_product: Stream<Option<ProductWithCategory>>,
    vm: Stream<ProductListVm>,
}

impl ProductListAltComponent {
    pub const PAGE_TITLE: &'static str = "Products";

    pub fn new(service: &ProductService) -> Self {
        let channel = MessageChannel::new();
        let products = service
            .products_with_category()
            .catch_into(&channel)
            .share_replay();
        // Selection fails only when the products it is drawn from fail, and
        // that failure is already reported through `products`.
        let selected_product = service.selected_product().catch_error(|_| Stream::empty());
        let vm = compose_view2(&products, &selected_product, |products, selected_product| {
            ProductListVm {
                products,
                selected_product,
            }
        });

        Self {
            service: service.clone(),
            channel,
            products,
            selected_product,
            vm,
        }
    }

    pub fn page_title(&self) -> &'static str {
        Self::PAGE_TITLE
    }

    pub fn products(&self) -> Stream<Vec<ProductWithCategory>> {
        self.products.clone()
    }

    pub fn selected_product(&self) -> Stream<Option<ProductWithCategory>> {
        self.selected_product.clone()
    }

    /// Emits once products are loaded, then on every selection change.
    pub fn vm(&self) -> Stream<ProductListVm> {
        self.vm.clone()
    }

    pub fn error_message(&self) -> Stream<String> {
        self.channel.messages()
    }

    pub fn on_selected(&self, id: ProductId) {
        self.service.select_product(Some(id));
    }
}
