//! The dual-ordered flex item list.
//!
//! [§ 5.4 'order'](https://www.w3.org/TR/css-flexbox-1/#order-property)
//!
//! "The order property controls the order in which flex items appear
//! within the flex container, by assigning them to ordinal groups."
//!
//! Items live in one arena in logical (source document) order; a separate
//! index array holds the same items sorted by `(order, logical position)`,
//! the stable tie-break required by the spec. Layout and painting walk the
//! flex order; removal and cleanup walk the logical order. The two walks
//! must never be conflated.

use crate::item::FlexItem;

/// Ordered storage for a container's flex items.
#[derive(Debug, Default)]
pub struct ItemList {
    /// Items in logical (insertion/DOM) order.
    items: Vec<FlexItem>,
    /// Indices into `items`, sorted by `(order, logical index)`.
    flex_order: Vec<usize>,
}

impl ItemList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item in logical order; the flex order is re-derived.
    /// Returns the item's logical index.
    pub fn push(&mut self, item: FlexItem) -> usize {
        self.items.push(item);
        self.rebuild_flex_order();
        self.items.len() - 1
    }

    /// Remove the item at a logical index. Removal always happens in
    /// logical terms, regardless of `order`.
    pub fn remove(&mut self, logical_index: usize) -> FlexItem {
        let item = self.items.remove(logical_index);
        self.rebuild_flex_order();
        item
    }

    /// Replace an item's style (e.g. after a style recascade); the flex
    /// order is re-derived since `order` may have changed.
    pub fn set_style(&mut self, logical_index: usize, style: crate::style::ItemStyle) {
        self.items[logical_index].style = style;
        self.rebuild_flex_order();
    }

    /// Item by logical index.
    #[must_use]
    pub fn get(&self, logical_index: usize) -> &FlexItem {
        &self.items[logical_index]
    }

    /// Mutable item by logical index.
    pub fn get_mut(&mut self, logical_index: usize) -> &mut FlexItem {
        &mut self.items[logical_index]
    }

    /// The flex-order sequence: logical indices sorted by
    /// `(order, logical index)`.
    #[must_use]
    pub fn flex_sequence(&self) -> &[usize] {
        &self.flex_order
    }

    /// Iterate items in logical order.
    pub fn iter_logical(&self) -> impl Iterator<Item = &FlexItem> {
        self.items.iter()
    }

    /// Iterate items in flex (paint) order.
    pub fn iter_flex(&self) -> impl Iterator<Item = &FlexItem> {
        self.flex_order.iter().map(|&idx| &self.items[idx])
    }

    fn rebuild_flex_order(&mut self) {
        self.flex_order = (0..self.items.len()).collect();
        // Stable by construction: sort_by_key keeps the logical-index
        // ordering within each ordinal group.
        self.flex_order.sort_by_key(|&idx| self.items[idx].style.order);
    }
}
