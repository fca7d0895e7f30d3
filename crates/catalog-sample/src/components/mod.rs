//! # Components
//!
//! The stream surface a UI binds to. A component never subscribes on its own:
//! it exposes read-only streams (`products`, `vm`, `error_message`, ...) and
//! command methods (`on_selected`, `on_add`), each of which is a single emit
//! on a service action.
//!
//! ## Error Guarding
//!
//! Every data stream a component exposes is guarded by its own
//! [`MessageChannel`](reactive_framework::MessageChannel): a failure becomes a
//! message on `error_message()` and the guarded stream completes without
//! values. Guarded streams are cached so that binding them more than once does
//! not report the same failure twice. A stream whose failure already reaches
//! the channel through another guarded stream only swallows its error.

pub mod product_detail;
pub mod product_list;
pub mod product_list_alt;

pub use product_detail::{ProductDetailComponent, ProductDetailVm};
pub use product_list::ProductListComponent;
pub use product_list_alt::{ProductListAltComponent, ProductListVm};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{Category, CategoryId, Product, ProductId, Supplier, SupplierId};
    use crate::services::{CategoryService, ProductService, SupplierService};
    use reactive_framework::{MockFetcher, Stream};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Services backed by mock fetchers.
    pub struct Harness {
        pub products: MockFetcher<Product>,
        pub categories: MockFetcher<Category>,
        pub suppliers: MockFetcher<Supplier>,
        pub categories_service: CategoryService,
        pub product_service: ProductService,
    }

    impl Harness {
        pub fn new() -> Self {
            let products = MockFetcher::<Product>::new();
            let categories = MockFetcher::<Category>::new();
            let suppliers = MockFetcher::<Supplier>::new();
            let categories_service = CategoryService::new(Rc::new(categories.clone()));
            let supplier_service = SupplierService::new(Rc::new(suppliers.clone()), Vec::new());
            let product_service = ProductService::new(
                Rc::new(products.clone()),
                &categories_service,
                &supplier_service,
                1.5,
            );
            Self {
                products,
                categories,
                suppliers,
                categories_service,
                product_service,
            }
        }
    }

    pub fn product(id: u32, name: &str, category: u32, suppliers: &[u32]) -> Product {
        Product {
            id: ProductId(id),
            product_name: name.to_string(),
            product_code: format!("TBX-{id:04}"),
            description: String::new(),
            price: 10.0,
            category_id: CategoryId(category),
            quantity_in_stock: 5,
            supplier_ids: suppliers.iter().copied().map(SupplierId).collect(),
        }
    }

    pub fn category(id: u32, name: &str) -> Category {
        Category {
            id: CategoryId(id),
            name: name.to_string(),
        }
    }

    pub fn supplier(id: u32) -> Supplier {
        Supplier {
            id: SupplierId(id),
            name: format!("Supplier {id}"),
            cost: 2.0,
            minimum_quantity: 10,
        }
    }

    /// Records every value `stream` emits while the test runs.
    pub fn record<T: Clone + 'static>(stream: &Stream<T>) -> Rc<RefCell<Vec<T>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _ = stream.for_each(move |value| sink.borrow_mut().push(value));
        seen
    }
}
