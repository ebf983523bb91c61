//! # Cart Grouping
//!
//! Pure functions that turn a flat list of lines into the restaurant-grouped
//! view used by both the cart and checkout responses.
//!
//! ## Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Lines (insertion order)            Groups (first-seen restaurant)      │
//! │                                                                         │
//! │  #1 Nasi Goreng ×2  (resto 1)  ──►  Warung Nusantara  subtotal 100.000  │
//! │  #2 Es Teh      ×1  (resto 2)  ──►  Kopi Kenangan     subtotal  15.000  │
//! │  #3 Sate Ayam   ×1  (resto 1)  ──►  (joins Warung Nusantara group)      │
//! │                                                                         │
//! │  Summary: total_items = Σ quantity                                      │
//! │           total_price = Σ line totals                                   │
//! │           restaurant_count = number of groups                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::collections::HashMap;

use crate::money::Money;
use crate::types::{CartLine, OrderItem};

// =============================================================================
// Line Abstraction
// =============================================================================

/// Anything that belongs to one restaurant and carries a quantity and a
/// line total. Implemented by live cart lines and frozen order items.
pub trait LineItem {
    fn restaurant_id(&self) -> i64;
    fn restaurant_name(&self) -> &str;
    fn quantity(&self) -> i64;
    fn line_total(&self) -> Money;
}

impl LineItem for CartLine {
    fn restaurant_id(&self) -> i64 {
        self.restaurant_id
    }

    fn restaurant_name(&self) -> &str {
        &self.restaurant_name
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn line_total(&self) -> Money {
        self.item_total()
    }
}

impl LineItem for OrderItem {
    fn restaurant_id(&self) -> i64 {
        self.restaurant_id
    }

    fn restaurant_name(&self) -> &str {
        &self.restaurant_name
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn line_total(&self) -> Money {
        self.item_total
    }
}

// =============================================================================
// Restaurant Group
// =============================================================================

/// Lines of one restaurant with their subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantGroup<T> {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub subtotal: Money,
    pub items: Vec<T>,
}

impl<T> RestaurantGroup<T> {
    /// Converts every item, keeping restaurant and subtotal.
    pub fn map_items<U, F: FnMut(T) -> U>(self, f: F) -> RestaurantGroup<U> {
        RestaurantGroup {
            restaurant_id: self.restaurant_id,
            restaurant_name: self.restaurant_name,
            subtotal: self.subtotal,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Groups lines by restaurant.
///
/// Groups appear in the order their restaurant is first seen; lines keep
/// their relative order inside a group.
///
/// ## Example
/// ```rust
/// use feast_core::cart::group_by_restaurant;
/// use feast_core::{CartLine, Money};
///
/// let line = |id, resto: i64, price| CartLine {
///     id,
///     restaurant_id: resto,
///     restaurant_name: format!("Resto {}", resto),
///     menu_id: id,
///     menu_name: format!("Menu {}", id),
///     menu_image: None,
///     unit_price: Money::from_minor(price),
///     quantity: 1,
/// };
///
/// let groups = group_by_restaurant(vec![line(1, 2, 100), line(2, 1, 50), line(3, 2, 25)]);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].restaurant_id, 2);
/// assert_eq!(groups[0].subtotal.minor(), 125);
/// ```
pub fn group_by_restaurant<T, I>(lines: I) -> Vec<RestaurantGroup<T>>
where
    T: LineItem,
    I: IntoIterator<Item = T>,
{
    let mut groups: Vec<RestaurantGroup<T>> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for line in lines {
        let slot = *index.entry(line.restaurant_id()).or_insert_with(|| {
            groups.push(RestaurantGroup {
                restaurant_id: line.restaurant_id(),
                restaurant_name: line.restaurant_name().to_string(),
                subtotal: Money::zero(),
                items: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.subtotal += line.line_total();
        group.items.push(line);
    }

    groups
}

// =============================================================================
// Cart View
// =============================================================================

/// One cart line as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    /// Cart entry id.
    pub id: i64,
    pub menu_id: i64,
    pub menu_name: String,
    pub menu_image: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
    pub item_total: Money,
}

impl From<CartLine> for CartItem {
    fn from(line: CartLine) -> Self {
        let item_total = line.item_total();
        CartItem {
            id: line.id,
            menu_id: line.menu_id,
            menu_name: line.menu_name,
            menu_image: line.menu_image,
            unit_price: line.unit_price,
            quantity: line.quantity,
            item_total,
        }
    }
}

/// Totals over a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
    /// Σ quantity.
    pub total_items: i64,
    /// Σ line totals.
    pub total_price: Money,
    /// Distinct restaurants.
    pub restaurant_count: usize,
}

impl CartSummary {
    /// Summarizes already-grouped lines.
    pub fn of<T: LineItem>(groups: &[RestaurantGroup<T>]) -> Self {
        CartSummary {
            total_items: groups
                .iter()
                .flat_map(|g| g.items.iter())
                .map(|item| item.quantity())
                .sum(),
            total_price: groups.iter().map(|g| g.subtotal).sum(),
            restaurant_count: groups.len(),
        }
    }
}

/// The complete grouped cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub restaurants: Vec<RestaurantGroup<CartItem>>,
    pub summary: CartSummary,
}

impl CartView {
    /// Builds the view from lines in entry insertion order.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let groups = group_by_restaurant(lines);
        let summary = CartSummary::of(&groups);
        let restaurants = groups
            .into_iter()
            .map(|g| g.map_items(CartItem::from))
            .collect();

        CartView {
            restaurants,
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, restaurant_id: i64, menu_id: i64, price: i64, qty: i64) -> CartLine {
        CartLine {
            id,
            restaurant_id,
            restaurant_name: format!("Restaurant {}", restaurant_id),
            menu_id,
            menu_name: format!("Menu {}", menu_id),
            menu_image: None,
            unit_price: Money::from_minor(price),
            quantity: qty,
        }
    }

    #[test]
    fn test_two_restaurant_scenario() {
        let view = CartView::from_lines(vec![
            line(1, 1, 5, 50_000, 2),
            line(2, 2, 9, 15_000, 1),
        ]);

        assert_eq!(view.restaurants.len(), 2);
        assert_eq!(view.restaurants[0].subtotal, Money::from_minor(100_000));
        assert_eq!(view.restaurants[1].subtotal, Money::from_minor(15_000));
        assert_eq!(view.restaurants[0].items[0].item_total, Money::from_minor(100_000));

        assert_eq!(view.summary.total_items, 3);
        assert_eq!(view.summary.total_price, Money::from_minor(115_000));
        assert_eq!(view.summary.restaurant_count, 2);
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let groups = group_by_restaurant(vec![
            line(1, 3, 1, 100, 1),
            line(2, 1, 2, 100, 1),
            line(3, 3, 3, 100, 2),
            line(4, 2, 4, 100, 1),
        ]);

        let ids: Vec<i64> = groups.iter().map(|g| g.restaurant_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let entry_ids: Vec<i64> = groups[0].items.iter().map(|l| l.id).collect();
        assert_eq!(entry_ids, vec![1, 3]);
        assert_eq!(groups[0].subtotal, Money::from_minor(300));
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from_lines(Vec::new());
        assert!(view.is_empty());
        assert_eq!(view.summary, CartSummary::default());
    }

    #[test]
    fn test_summary_totals_match_groups() {
        let groups = group_by_restaurant(vec![
            line(1, 1, 1, 1_250, 3),
            line(2, 2, 2, 990, 7),
            line(3, 1, 3, 10, 1),
        ]);
        let summary = CartSummary::of(&groups);

        let by_lines: Money = groups
            .iter()
            .flat_map(|g| g.items.iter())
            .map(|l| l.item_total())
            .sum();
        assert_eq!(summary.total_price, by_lines);
        assert_eq!(summary.total_items, 11);
    }

    #[test]
    fn test_view_serializes_nested_groups() {
        let view = CartView::from_lines(vec![line(1, 1, 5, 50_000, 2)]);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["summary"]["total_price"], 100_000);
        assert_eq!(json["restaurants"][0]["restaurant_name"], "Restaurant 1");
        assert_eq!(json["restaurants"][0]["items"][0]["quantity"], 2);
    }
}
