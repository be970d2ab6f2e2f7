//! Shopping cart for a single store.

use crate::catalog::to_minor;
use crate::Product;
use serde::{Deserialize, Serialize};

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub qty: u32,
}

impl CartLine {
    pub fn subtotal_minor(&self) -> i64 {
        to_minor(self.price) * i64::from(self.qty)
    }
}

/// Cart lines in the order they were first added.
///
/// Totals are kept in pesewas so summing many lines never drifts.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    store: String,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            lines: Vec::new(),
        }
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines, not units.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add one unit of `product`, creating its line if needed.
    pub fn add(&mut self, product: &Product) {
        self.add_qty(product, 1);
    }

    /// Add `qty` units of `product`. Zero is ignored.
    pub fn add_qty(&mut self, product: &Product, qty: u32) {
        if qty == 0 {
            return;
        }
        match self.line_mut(&product.id) {
            Some(line) => line.qty = line.qty.saturating_add(qty),
            None => self.lines.push(CartLine {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                qty,
            }),
        }
    }

    /// Returns false if `id` is not in the cart.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.line_mut(id) {
            Some(line) => {
                line.qty = line.qty.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrease by one, never below 1. Use [`Cart::remove`] to drop a line.
    pub fn decrement(&mut self, id: &str) -> bool {
        match self.line_mut(id) {
            Some(line) => {
                line.qty = line.qty.saturating_sub(1).max(1);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_minor(&self) -> i64 {
        self.lines.iter().map(CartLine::subtotal_minor).sum()
    }

    /// Confirmation line shown before checkout.
    pub fn summary(&self) -> String {
        format!(
            "You are ordering {} item(s). Total: {}",
            self.lines.len(),
            format_ghs(self.total_minor())
        )
    }

    fn line_mut(&mut self, id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id == id)
    }
}

/// Format pesewas as `GHS 12.50`.
pub fn format_ghs(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("GHS {}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price,
            image: String::new(),
        }
    }

    #[test]
    fn add_merges_lines() {
        let mut cart = Cart::new("shoprite");
        let milk = product("shop-1", "Fresh Milk (2L)", 12.0);

        cart.add(&milk);
        cart.add(&milk);
        cart.add(&product("shop-2", "Bread Loaf", 10.0));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].qty, 2);
        assert_eq!(cart.total_minor(), 3_400);
    }

    #[test]
    fn decrement_floors_at_one() {
        let mut cart = Cart::new("shoprite");
        cart.add_qty(&product("shop-1", "Milk", 12.0), 2);

        assert!(cart.decrement("shop-1"));
        assert!(cart.decrement("shop-1"));
        assert_eq!(cart.lines()[0].qty, 1);

        assert!(cart.increment("shop-1"));
        assert_eq!(cart.lines()[0].qty, 2);

        assert!(!cart.decrement("shop-9"));
        assert!(!cart.increment("shop-9"));
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new("citymall");
        cart.add(&product("city-1", "Chocolate", 15.0));
        cart.add(&product("city-2", "Water", 5.0));

        assert!(cart.remove("city-1"));
        assert!(!cart.remove("city-1"));
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_minor(), 0);
    }

    #[test]
    fn totals_do_not_drift() {
        let mut cart = Cart::new("citymall");
        cart.add_qty(&product("a", "A", 0.1), 3);
        cart.add_qty(&product("b", "B", 0.2), 1);
        assert_eq!(cart.total_minor(), 50);
        assert_eq!(format_ghs(cart.total_minor()), "GHS 0.50");
    }

    #[test]
    fn summary_counts_lines() {
        let mut cart = Cart::new("citymall");
        cart.add_qty(&product("city-3", "Indomie Noodles (Pack)", 3.5), 4);
        cart.add(&product("city-2", "Voltic Water (1.5L)", 5.0));

        assert_eq!(cart.summary(), "You are ordering 2 item(s). Total: GHS 19.00");
    }

    #[test]
    fn ghs_formatting() {
        assert_eq!(format_ghs(0), "GHS 0.00");
        assert_eq!(format_ghs(1_250), "GHS 12.50");
        assert_eq!(format_ghs(5), "GHS 0.05");
        assert_eq!(format_ghs(-150), "GHS -1.50");
    }
}
