//! Demo data served by the in-memory stores.

use crate::model::{Category, CategoryId, Product, ProductId, Supplier, SupplierId};

#[allow(clippy::too_many_arguments)]
fn product(
    id: u32,
    name: &str,
    code: &str,
    description: &str,
    price: f64,
    category: u32,
    stock: u32,
    suppliers: &[u32],
) -> Product {
    Product {
        id: ProductId(id),
        product_name: name.to_string(),
        product_code: code.to_string(),
        description: description.to_string(),
        price,
        category_id: CategoryId(category),
        quantity_in_stock: stock,
        supplier_ids: suppliers.iter().copied().map(SupplierId).collect(),
    }
}

pub fn products() -> Vec<Product> {
    vec![
        product(1, "Leaf Rake", "GDN-0011", "Leaf rake with 48-inch wooden handle", 19.95, 1, 15, &[1, 2]),
        product(2, "Garden Cart", "GDN-0023", "15 gallon capacity rolling garden cart", 32.99, 1, 2, &[3, 4]),
        product(5, "Hammer", "TBX-0048", "Curved claw steel hammer", 8.9, 3, 8, &[5, 6]),
        product(8, "Saw", "TBX-0022", "15-inch steel blade hand saw", 11.55, 3, 6, &[7, 8]),
        product(10, "Video Game Controller", "GMG-0042", "Standard two-button video game controller", 35.95, 5, 12, &[9, 10]),
    ]
}

pub fn categories() -> Vec<Category> {
    [(1, "Garden"), (3, "Toolbox"), (5, "Gaming")]
        .into_iter()
        .map(|(id, name)| Category {
            id: CategoryId(id),
            name: name.to_string(),
        })
        .collect()
}

pub fn suppliers() -> Vec<Supplier> {
    [
        (1, "Acme Gardening Supply", 16.95, 12),
        (2, "Standard Gardening", 15.95, 24),
        (3, "Acme General Supply", 25.0, 2),
        (4, "Acme General Supply", 21.0, 2),
        (5, "Acme General Supply", 2.0, 24),
        (6, "Acme Tool Supply", 4.0, 12),
        (7, "Tools Are Us", 8.0, 8),
        (8, "Tools Are Us", 12.0, 2),
        (9, "Acme Game Supply", 25.0, 2),
        (10, "Acme General Supply", 26.0, 2),
    ]
    .into_iter()
    .map(|(id, name, cost, minimum_quantity)| Supplier {
        id: SupplierId(id),
        name: name.to_string(),
        cost,
        minimum_quantity,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reference_resolves() {
        let categories = categories();
        let suppliers = suppliers();
        for product in products() {
            assert!(categories.iter().any(|c| c.id == product.category_id));
            for id in &product.supplier_ids {
                assert!(suppliers.iter().any(|s| &s.id == id), "{} -> {id}", product.product_name);
            }
        }
    }
}
