//! Shopping cart held in the visitor's session.
//!
//! Lines keep the order in which products were first added. A product id
//! appears on at most one line.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// A product snapshot paired with a quantity (always at least 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Insertion-ordered cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product, or appends a new line
    /// holding a snapshot of it.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
    }

    /// Remove the line for `product_id`. Absent ids are ignored.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    /// Shift a line's quantity by `delta`, never going below 1.
    ///
    /// Decrementing a single unit leaves the line in place; only `remove`
    /// deletes a line. Absent ids are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i32) {
        if let Some(line) = self.line_mut(product_id) {
            let next = (i64::from(line.quantity) + i64::from(delta)).max(1);
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_price).sum()
    }

    /// Sum of quantities over all lines, for the cart badge.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};

    fn cake(id: i32, rubles: u64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Cake {id}"),
            Price::from_major(rubles),
            "A cake",
            "/static/images/placeholder.svg",
            Some(Category::Desserts),
        )
    }

    fn assert_totals_match_lines(cart: &Cart) {
        let items: u64 = cart.lines().iter().map(|l| u64::from(l.quantity)).sum();
        let price: Price = cart
            .lines()
            .iter()
            .map(|l| l.product.price.times(l.quantity))
            .sum();
        assert_eq!(cart.total_items(), items);
        assert_eq!(cart.total_price(), price);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_adding_twice_yields_one_line_with_quantity_two() {
        let bakery = Catalog::bakery();
        for product in bakery.products() {
            let mut cart = Cart::new();
            cart.add(product);
            cart.add(product);
            assert_eq!(cart.len(), 1);
            assert_eq!(cart.line(product.id).unwrap().quantity, 2);
        }
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&cake(3, 100));
        cart.add(&cake(1, 100));
        cart.add(&cake(3, 100));
        cart.add(&cake(2, 100));

        let ids: Vec<i32> = cart.lines().iter().map(|l| l.product.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_line_holds_snapshot_of_product() {
        let mut product = cake(1, 100);
        let mut cart = Cart::new();
        cart.add(&product);

        product.name = "Renamed".to_string();
        cart.add(&product);

        let line = cart.line(ProductId::new(1)).unwrap();
        assert_eq!(line.product.name, "Cake 1");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add(&cake(1, 100));
        cart.add(&cake(2, 200));

        cart.remove(ProductId::new(1));
        let once = cart.clone();
        cart.remove(ProductId::new(1));

        assert_eq!(cart, once);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(&cake(1, 100));
        let before = cart.clone();
        cart.remove(ProductId::new(42));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(&cake(1, 100));
        cart.update_quantity(ProductId::new(1), 4);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 5);

        cart.update_quantity(ProductId::new(1), -100);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 1);

        cart.update_quantity(ProductId::new(1), -1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_extreme_deltas() {
        let mut cart = Cart::new();
        cart.add(&cake(1, 100));
        cart.update_quantity(ProductId::new(1), i32::MIN);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 1);

        cart.update_quantity(ProductId::new(1), i32::MAX);
        cart.update_quantity(ProductId::new(1), i32::MAX);
        cart.update_quantity(ProductId::new(1), i32::MAX);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, u32::MAX);
        assert_totals_match_lines(&cart);
    }

    #[test]
    fn test_update_quantity_absent_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(&cake(1, 100));
        let before = cart.clone();
        cart.update_quantity(ProductId::new(2), 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_totals_track_every_operation() {
        let mut cart = Cart::new();
        cart.add(&cake(1, 2500));
        assert_totals_match_lines(&cart);
        cart.add(&cake(2, 380));
        assert_totals_match_lines(&cart);
        cart.update_quantity(ProductId::new(2), 3);
        assert_totals_match_lines(&cart);
        cart.add(&cake(1, 2500));
        assert_totals_match_lines(&cart);
        cart.remove(ProductId::new(1));
        assert_totals_match_lines(&cart);

        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_price(), Price::from_major(1520));
    }

    #[test]
    fn test_checkout_scenario() {
        let product = Product::new(
            ProductId::new(1),
            "Шоколадный вихрь",
            Price::from_minor(2500),
            "",
            "",
            Some(Category::Desserts),
        );
        let mut cart = Cart::new();
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.total_items(), 0);

        cart.add(&product);
        assert_eq!(cart.total_price(), Price::from_minor(2500));
        assert_eq!(cart.total_items(), 1);

        cart.add(&product);
        assert_eq!(cart.total_price(), Price::from_minor(5000));
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.len(), 1);

        cart.update_quantity(ProductId::new(1), -1);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 1);
        assert_eq!(cart.total_price(), Price::from_minor(2500));

        cart.remove(ProductId::new(1));
        assert!(cart.is_empty());
    }
}
