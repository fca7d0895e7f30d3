//! Detail panel for the selected product and its suppliers.

use crate::model::{ProductWithCategory, Supplier};
use crate::services::ProductService;
use reactive_framework::{compose_view3, MessageChannel, Stream};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetailVm {
    /// Always `Some`: the view model is only built for a selected product.
    pub product: Option<ProductWithCategory>,
    pub suppliers: Vec<Supplier>,
    pub page_title: String,
}

pub struct ProductDetailComponent {
    channel: MessageChannel,
    product: Stream<Option<ProductWithCategory>>,
    page_title: Stream<String>,
    product_suppliers: Stream<Vec<Supplier>>,
    vm: Stream<ProductDetailVm>,
}

impl ProductDetailComponent {
    pub fn new(service: &ProductService) -> Self {
        let channel = MessageChannel::new();
        let product = service
            .selected_product()
            .catch_into(&channel)
            .share_replay();
        let page_title = product.map(|product| {
            product
                .map(|p| format!("Product Detail for: {}", p.name()))
                .unwrap_or_default()
        });
        let product_suppliers = service
            .selected_product_suppliers()
            .catch_into(&channel)
            .share_replay();
        let vm = compose_view3(
            &product,
            &product_suppliers,
            &page_title,
            |product, suppliers, page_title| ProductDetailVm {
                product,
                suppliers,
                page_title,
            },
        );

        Self {
            channel,
            product,
            page_title,
            product_suppliers,
            vm,
        }
    }

    pub fn product(&self) -> Stream<Option<ProductWithCategory>> {
        self.product.clone()
    }

    /// Empty while nothing is selected.
    pub fn page_title(&self) -> Stream<String> {
        self.page_title.clone()
    }

    pub fn product_suppliers(&self) -> Stream<Vec<Supplier>> {
        self.product_suppliers.clone()
    }

    pub fn vm(&self) -> Stream<ProductDetailVm> {
        self.vm.clone()
    }

    pub fn error_message(&self) -> Stream<String> {
        self.channel.messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{category, product, record, supplier, Harness};
    use crate::model::{ProductId, SupplierId};
    use reactive_framework::FetchError;

    fn loaded() -> Harness {
        let h = Harness::new();
        h.products
            .expect_list()
            .return_ok(vec![product(5, "Hammer", 3, &[1, 5])]);
        h.categories.expect_list().return_ok(vec![category(3, "Toolbox")]);
        h
    }

    #[test]
    fn test_vm_waits_for_a_selection() {
        let h = loaded();
        h.suppliers.expect_get(SupplierId(1)).return_ok(supplier(1));
        h.suppliers.expect_get(SupplierId(5)).return_ok(supplier(5));

        let component = ProductDetailComponent::new(&h.product_service);
        let views = record(&component.vm());
        let titles = record(&component.page_title());
        assert!(views.borrow().is_empty());
        assert_eq!(*titles.borrow(), vec![String::new()]);

        h.product_service.select_product(Some(ProductId(5)));

        let vm = views.borrow().last().cloned().unwrap();
        assert_eq!(vm.page_title, "Product Detail for: Hammer");
        assert_eq!(vm.product.map(|p| p.id()), Some(ProductId(5)));
        assert_eq!(
            vm.suppliers.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![SupplierId(1), SupplierId(5)]
        );
        h.suppliers.verify();
    }

    #[test]
    fn test_failed_supplier_fetch_is_reported_as_join_error() {
        let h = loaded();
        h.suppliers.expect_get(SupplierId(1)).return_ok(supplier(1));
        h.suppliers
            .expect_get(SupplierId(5))
            .return_err(FetchError::status(404, "Not Found"));

        let component = ProductDetailComponent::new(&h.product_service);
        let messages = record(&component.error_message());
        let suppliers = record(&component.product_suppliers());
        h.product_service.select_product(Some(ProductId(5)));

        assert_eq!(*suppliers.borrow(), vec![Vec::new()]);
        assert_eq!(messages.borrow().len(), 1);
        assert!(messages.borrow()[0].starts_with("Dependent fetch failed"));
        assert!(messages.borrow()[0].contains("404"));
    }
}
