//! CSS flexible box layout algorithm for the Wombat layout engine.
//!
//! # Scope
//!
//! This crate implements the flex formatting context of
//! [CSS Flexible Box Layout Module Level 1](https://www.w3.org/TR/css-flexbox-1/):
//!
//! - **Flex base sizes and hypothetical sizes** ([§ 9.2](https://www.w3.org/TR/css-flexbox-1/#algo-main-item))
//!   with `box-sizing` aware min/max clamping and `min-size: auto`
//! - **Line division** ([§ 9.3](https://www.w3.org/TR/css-flexbox-1/#algo-main-container))
//!   including `flex-wrap`, `wrap-reverse`, and the `order` property's
//!   dual-ordered item list
//! - **Resolving flexible lengths** ([§ 9.7](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths))
//!   via the iterative violation/freeze loop
//! - **Main-axis alignment** ([§ 8.1–8.2](https://www.w3.org/TR/css-flexbox-1/#auto-margins)):
//!   auto margins and `justify-content`
//! - **Cross-axis alignment** ([§ 8.3–8.4](https://www.w3.org/TR/css-flexbox-1/#align-items-property)):
//!   `align-self` (including baseline alignment) and `align-content`
//! - **Absolutely positioned children** ([§ 4.1](https://www.w3.org/TR/css-flexbox-1/#abspos-items)):
//!   static positions for their anonymous placeholders
//! - **Fragmentation** ([CSS Fragmentation Level 3](https://www.w3.org/TR/css-break-3/)):
//!   page/column break discovery for the breakable container shapes
//! - **Scrollable containers**: scrollbar reservation and the
//!   scrollbar-visibility reflow feedback loop
//!
//! The generic box tree, style computation, painting, and the reflow
//! scheduler are external collaborators reached through the traits in
//! [`content`] and [`engine`].
//!
//! # Multi-pass layout
//!
//! A flex container may need several reflow passes to settle (intrinsic
//! size discovery, line division, stretching, scrollbar feedback). The
//! driver loop looks like:
//!
//! ```
//! use wombat_layout::{
//!     BlockContent, ContainerStyle, FlexContainer, ItemStyle, LayoutInfo, NoPagination,
//!     SizeInput,
//! };
//!
//! let mut container = FlexContainer::new();
//! let _ = container.add_item(ItemStyle::default(), Box::new(BlockContent::fixed(50, 20)));
//!
//! let style = ContainerStyle::default();
//! let input = SizeInput::block(300);
//! let mut host = NoPagination::default();
//!
//! let mut external_change = true;
//! for _ in 0..6 {
//!     let mut info = LayoutInfo::new(&mut host);
//!     info.external_layout_change = external_change;
//!     external_change = false;
//!
//!     let _ = container.compute_size(&style, &input);
//!     let pass = container.layout(&style, &input, &mut info).unwrap();
//!     let finished = container
//!         .finish_layout(&style, &input, &mut info, Some(pass))
//!         .unwrap();
//!     if !finished.needs_reflow {
//!         break;
//!     }
//! }
//! ```

/// Fragmentation policies and page/column break discovery per
/// [CSS Fragmentation Level 3](https://www.w3.org/TR/css-break-3/).
pub mod breaks;
/// The flex container and the core layout algorithm per
/// [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm).
pub mod container;
/// The item-content seam to the generic box tree.
pub mod content;
/// The contract with the surrounding layout engine (errors, pagination,
/// reflow scheduling).
pub mod engine;
/// Layout coordinates and box geometry per
/// [CSS Box Model Level 3](https://www.w3.org/TR/css-box-3/).
pub mod geometry;
/// Flex item boxes per [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items).
pub mod item;
/// Flex lines per [§ 9.3](https://www.w3.org/TR/css-flexbox-1/#algo-main-container).
pub mod line;
/// The dual-ordered item list per
/// [§ 5.4 'order'](https://www.w3.org/TR/css-flexbox-1/#order-property).
pub mod list;
/// Scrollable flex containers per
/// [CSS Overflow Level 3](https://www.w3.org/TR/css-overflow-3/).
pub mod scrollable;
/// Pre-resolved style inputs.
pub mod style;
/// Auto and percentage value types.
pub mod values;

// Re-exports for convenience
pub use breaks::{
    BreakPolicy, BreakStatus, ColumnFinder, Columnizer, break_allowed_between, break_forced,
    combine_break_policies,
};
pub use container::{
    FinishedLayout, FlexContainer, FlexPass, NestedFlexContainer, PropagatedHeights, SizeInput,
};
pub use content::{BlockContent, HeightBasis, ItemConstraints, ItemContent, ItemMetrics};
pub use engine::{
    BreakType, LayoutError, LayoutHost, LayoutInfo, LayoutResult, NoPagination, PagedMedia,
    PageInfo,
};
pub use geometry::{EdgeSizes, LAYOUT_COORD_MAX, LAYOUT_COORD_MIN, LayoutCoord, Rect};
pub use item::{FlexItem, TrailingBreak, Violation};
pub use line::{FlexLine, FlexLineState, LineAccumulator};
pub use list::ItemList;
pub use scrollable::ScrollableFlexContainer;
pub use style::{
    AlignContent, AlignSelf, AutoEdges, BoxSizing, ContainerStyle, Direction, ItemStyle,
    JustifyContent, Overflow, Visibility, Wrap,
};
pub use values::{AutoOr, SizeValue};
