//! Pre-resolved style inputs for flex layout.
//!
//! [CSS Flexible Box Layout Module Level 1](https://www.w3.org/TR/css-flexbox-1/)
//!
//! The cascade and style computation are external collaborators; by the time
//! a value reaches this crate it has been resolved as far as possible
//! without layout. Main/cross axis mapping of the sizing properties is done
//! by the style resolver; margins stay physical because the algorithm itself
//! maps them to main/cross sides, accounting for reversed axes.

use serde::{Deserialize, Serialize};

use crate::breaks::BreakPolicy;
use crate::geometry::{EdgeSizes, LayoutCoord};
use crate::values::{AutoOr, SizeValue};

/// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
///
/// "The flex-direction property specifies how flex items are placed in the
/// flex container, by setting the direction of the flex container's main
/// axis."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Main axis is horizontal, items flow left to right.
    #[default]
    Row,
    /// Main axis is horizontal, items flow right to left.
    RowReverse,
    /// Main axis is vertical, items flow top to bottom.
    Column,
    /// Main axis is vertical, items flow bottom to top.
    ColumnReverse,
}

impl Direction {
    /// True for column and column-reverse (vertical main axis).
    #[must_use]
    pub const fn is_vertical(&self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }

    /// True when item progression runs against the physical axis direction.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
///
/// "The flex-wrap property controls whether the flex container is
/// single-line or multi-line, and the direction of the cross-axis."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wrap {
    /// Single line; items do not wrap.
    #[default]
    Nowrap,
    /// Multi-line; lines stack in the cross-axis direction.
    Wrap,
    /// Multi-line; lines stack against the cross-axis direction.
    WrapReverse,
}

impl Wrap {
    /// True when the container may break items into multiple lines.
    #[must_use]
    pub const fn is_wrappable(&self) -> bool {
        !matches!(self, Self::Nowrap)
    }
}

/// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
///
/// "The justify-content property aligns flex items along the main axis of
/// the current line of the flex container."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JustifyContent {
    /// "Flex items are packed toward the start of the line."
    #[default]
    FlexStart,
    /// "Flex items are packed toward the end of the line."
    FlexEnd,
    /// "Flex items are packed toward the center of the line."
    Center,
    /// "Flex items are evenly distributed in the line."
    SpaceBetween,
    /// "Flex items are evenly distributed in the line, with half-size
    /// spaces on either end."
    SpaceAround,
}

/// [§ 8.4 'align-content'](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
///
/// "The align-content property aligns a flex container's lines within the
/// flex container when there is extra space in the cross-axis."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignContent {
    /// "Lines stretch to take up the remaining space."
    #[default]
    Stretch,
    /// "Lines are packed toward the start of the flex container."
    FlexStart,
    /// "Lines are packed toward the end of the flex container."
    FlexEnd,
    /// "Lines are packed toward the center of the flex container."
    Center,
    /// "Lines are evenly distributed in the flex container."
    SpaceBetween,
    /// "Lines are evenly distributed in the flex container, with half-size
    /// spaces on either end."
    SpaceAround,
}

/// [§ 8.3 'align-items' / 'align-self'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
///
/// The per-item cross-axis alignment mode. The `auto` keyword of
/// `align-self` is resolved against the container's `align-items` by the
/// style collaborator before layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignSelf {
    /// "Flex items are stretched ... to fill the line."
    #[default]
    Stretch,
    /// "The cross-start margin edge of the flex item is placed flush with
    /// the cross-start edge of the line."
    FlexStart,
    /// "The cross-end margin edge of the flex item is placed flush with the
    /// cross-end edge of the line."
    FlexEnd,
    /// "The flex item's margin box is centered in the cross axis within the
    /// line."
    Center,
    /// "The flex item participates in baseline alignment."
    Baseline,
}

/// [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
///
/// "The box-sizing property defines whether the width and height (and
/// respective min/max properties) on an element include padding and borders
/// or not."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    /// Width/height apply to the content box.
    #[default]
    ContentBox,
    /// Width/height apply to the border box.
    BorderBox,
}

impl BoxSizing {
    /// True for `border-box`.
    #[must_use]
    pub const fn is_border_box(&self) -> bool {
        matches!(self, Self::BorderBox)
    }
}

/// [§ 4.2 'visibility'](https://www.w3.org/TR/CSS2/visufx.html#visibility)
///
/// Only the `collapse` keyword is observable by the flex algorithm: a
/// collapsed item contributes zero size to its line but keeps its box alive
/// so that it can reappear in a later pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// The box is visible.
    #[default]
    Visible,
    /// The box is collapsed out of the layout (zero contributions).
    Collapse,
}

/// [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
///
/// Per-axis overflow mode; drives scrollbar reservation on scrollable flex
/// containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// Content is not clipped.
    #[default]
    Visible,
    /// Content is clipped; no scrollbar.
    Hidden,
    /// Scrollbar appears only when content overflows.
    Auto,
    /// Scrollbar is always reserved.
    Scroll,
}

impl Overflow {
    /// True when this axis may carry a scrollbar (`auto` or `scroll`).
    #[must_use]
    pub const fn is_scrollable(&self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

/// The initial margin value: zero, not 'auto'.
const fn zero_margin() -> AutoOr {
    AutoOr::Px(0)
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// Physical per-side margins where each side may be 'auto'. Auto margins
/// absorb positive free space before `justify-content`/`align-self` apply
/// ([§ 8.1](https://www.w3.org/TR/css-flexbox-1/#auto-margins)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoEdges {
    /// Top margin.
    #[serde(default = "zero_margin")]
    pub top: AutoOr,
    /// Right margin.
    #[serde(default = "zero_margin")]
    pub right: AutoOr,
    /// Bottom margin.
    #[serde(default = "zero_margin")]
    pub bottom: AutoOr,
    /// Left margin.
    #[serde(default = "zero_margin")]
    pub left: AutoOr,
}

impl Default for AutoEdges {
    fn default() -> Self {
        Self {
            top: zero_margin(),
            right: zero_margin(),
            bottom: zero_margin(),
            left: zero_margin(),
        }
    }
}

impl AutoEdges {
    /// Sum of left and right margins, with 'auto' counting as zero.
    #[must_use]
    pub const fn horizontal_px(&self) -> LayoutCoord {
        self.left.px_or(0) + self.right.px_or(0)
    }

    /// Sum of top and bottom margins, with 'auto' counting as zero.
    #[must_use]
    pub const fn vertical_px(&self) -> LayoutCoord {
        self.top.px_or(0) + self.bottom.px_or(0)
    }
}

/// Pre-resolved style of one flex item.
///
/// [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
///
/// Sizing properties are expressed in main/cross axis terms (the style
/// resolver maps `width`/`height` depending on the container's direction);
/// margins stay physical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStyle {
    /// [§ 7.1 'flex-basis'](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
    ///
    /// The preferred main size: `flex-basis`, falling back to the main-axis
    /// size property (`width` or `height`) when `flex-basis` is `auto`.
    pub preferred_main_size: SizeValue,

    /// The preferred cross size (`height` or `width`).
    pub preferred_cross_size: SizeValue,

    /// [§ 10.4 'min-width' / 'min-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    ///
    /// Minimum main size; `auto` resolves to the min-content size, never to
    /// zero ([§ 4.5](https://www.w3.org/TR/css-flexbox-1/#min-size-auto)).
    pub min_main_size: AutoOr,

    /// Maximum main size; `None` means no constraint.
    pub max_main_size: Option<LayoutCoord>,

    /// Minimum cross size; `auto` resolves to the min-content size.
    pub min_cross_size: AutoOr,

    /// Maximum cross size; `None` means no constraint.
    pub max_cross_size: Option<LayoutCoord>,

    /// Physical margins; each side may be 'auto'.
    pub margin: AutoEdges,

    /// Border plus padding sum along the main axis (both edges).
    pub main_border_padding: LayoutCoord,

    /// Border plus padding sum along the cross axis (both edges).
    pub cross_border_padding: LayoutCoord,

    /// [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
    pub box_sizing: BoxSizing,

    /// [§ 7.2 'flex-grow'](https://www.w3.org/TR/css-flexbox-1/#flex-grow-property)
    ///
    /// "The flex-grow property sets the flex grow factor." Initial: 0.
    pub flex_grow: f32,

    /// [§ 7.3 'flex-shrink'](https://www.w3.org/TR/css-flexbox-1/#flex-shrink-property)
    ///
    /// "The flex-shrink property sets the flex shrink factor." Initial: 1.
    pub flex_shrink: f32,

    /// [§ 5.4 'order'](https://www.w3.org/TR/css-flexbox-1/#order-property)
    ///
    /// "Flex items are, by default, displayed and laid out in the same
    /// order as they appear in the source document. The order property can
    /// be used to change this ordering."
    pub order: i32,

    /// Resolved cross-axis alignment for this item.
    pub align_self: AlignSelf,

    /// [§ 4.2 'visibility'](https://www.w3.org/TR/CSS2/visufx.html#visibility)
    pub visibility: Visibility,

    /// [§ 4.1 Absolutely-Positioned Flex Children](https://www.w3.org/TR/css-flexbox-1/#abspos-items)
    ///
    /// True for the anonymous zero-size placeholder that an absolutely
    /// positioned child leaves in the item list; it does not participate in
    /// flex layout but inherits a static position from its neighbors.
    pub is_abspos_placeholder: bool,

    /// Page break policy before this item.
    pub page_break_before: BreakPolicy,
    /// Page break policy after this item.
    pub page_break_after: BreakPolicy,
    /// Column break policy before this item.
    pub column_break_before: BreakPolicy,
    /// Column break policy after this item.
    pub column_break_after: BreakPolicy,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            preferred_main_size: SizeValue::Auto,
            preferred_cross_size: SizeValue::Auto,
            min_main_size: AutoOr::Auto,
            max_main_size: None,
            min_cross_size: AutoOr::Auto,
            max_cross_size: None,
            margin: AutoEdges::default(),
            main_border_padding: 0,
            cross_border_padding: 0,
            box_sizing: BoxSizing::default(),
            flex_grow: 0.0,
            flex_shrink: 1.0,
            order: 0,
            align_self: AlignSelf::default(),
            visibility: Visibility::default(),
            is_abspos_placeholder: false,
            page_break_before: BreakPolicy::default(),
            page_break_after: BreakPolicy::default(),
            column_break_before: BreakPolicy::default(),
            column_break_after: BreakPolicy::default(),
        }
    }
}

impl ItemStyle {
    /// Margin sum along the container's main axis, 'auto' counting as zero.
    #[must_use]
    pub const fn main_margins(&self, vertical: bool) -> LayoutCoord {
        if vertical {
            self.margin.vertical_px()
        } else {
            self.margin.horizontal_px()
        }
    }

    /// Margin sum along the container's cross axis, 'auto' counting as zero.
    #[must_use]
    pub const fn cross_margins(&self, vertical: bool) -> LayoutCoord {
        if vertical {
            self.margin.horizontal_px()
        } else {
            self.margin.vertical_px()
        }
    }
}

/// Pre-resolved style of the flex container itself.
///
/// [§ 5 Ordering and Orientation](https://www.w3.org/TR/css-flexbox-1/#flow-order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerStyle {
    /// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
    pub direction: Direction,

    /// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
    pub wrap: Wrap,

    /// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
    pub justify_content: JustifyContent,

    /// [§ 8.4 'align-content'](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
    pub align_content: AlignContent,

    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: SizeValue,

    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: SizeValue,

    /// [§ 10.4 'min-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub min_width: LayoutCoord,

    /// [§ 10.4 'max-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub max_width: Option<LayoutCoord>,

    /// [§ 10.7 'min-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: LayoutCoord,

    /// [§ 10.7 'max-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub max_height: Option<LayoutCoord>,

    /// True when the computed `min-height` was a percentage. Percentages of
    /// an indefinite containing block make line wrapping unpredictable for
    /// vertical containers.
    pub min_height_is_percent: bool,

    /// True when the computed `max-height` was a percentage.
    pub max_height_is_percent: bool,

    /// [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
    pub box_sizing: BoxSizing,

    /// Resolved border widths.
    pub border: EdgeSizes,

    /// Resolved padding.
    pub padding: EdgeSizes,

    /// Resolved margins (the container's own; no 'auto' semantics here).
    pub margin: EdgeSizes,

    /// Whether the container's width falls back to shrink-to-fit when both
    /// `width` and a percentage are absent (floats, inline-blocks,
    /// absolutely positioned boxes).
    pub is_shrink_to_fit: bool,

    /// `break-inside: avoid` for page breaks, resolved by the cascade.
    pub avoid_page_break_inside: bool,

    /// `break-inside: avoid` for column breaks, resolved by the cascade.
    pub avoid_column_break_inside: bool,

    /// [§ 3 'overflow-x'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow_x: Overflow,

    /// [§ 3 'overflow-y'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow_y: Overflow,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            wrap: Wrap::default(),
            justify_content: JustifyContent::default(),
            align_content: AlignContent::default(),
            width: SizeValue::Auto,
            height: SizeValue::Auto,
            min_width: 0,
            max_width: None,
            min_height: 0,
            max_height: None,
            min_height_is_percent: false,
            max_height_is_percent: false,
            box_sizing: BoxSizing::default(),
            border: EdgeSizes::default(),
            padding: EdgeSizes::default(),
            margin: EdgeSizes::default(),
            is_shrink_to_fit: false,
            avoid_page_break_inside: false,
            avoid_column_break_inside: false,
            overflow_x: Overflow::default(),
            overflow_y: Overflow::default(),
        }
    }
}

impl ContainerStyle {
    /// Border plus padding sum on the left edge.
    #[must_use]
    pub const fn left_border_padding(&self) -> LayoutCoord {
        self.border.left + self.padding.left
    }

    /// Border plus padding sum on the top edge.
    #[must_use]
    pub const fn top_border_padding(&self) -> LayoutCoord {
        self.border.top + self.padding.top
    }

    /// Border plus padding sum along the horizontal axis (both edges).
    #[must_use]
    pub const fn horizontal_border_padding(&self) -> LayoutCoord {
        self.border.horizontal() + self.padding.horizontal()
    }

    /// Border plus padding sum along the vertical axis (both edges).
    #[must_use]
    pub const fn vertical_border_padding(&self) -> LayoutCoord {
        self.border.vertical() + self.padding.vertical()
    }

    /// [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    ///
    /// Clamp a content-box width to the `min-width`/`max-width` bounds.
    #[must_use]
    pub fn check_width_bounds(&self, width: LayoutCoord) -> LayoutCoord {
        let mut width = width;
        if let Some(max) = self.max_width {
            width = width.min(max);
        }
        width.max(self.min_width)
    }

    /// [§ 10.7](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    ///
    /// Clamp a content-box height to the `min-height`/`max-height` bounds.
    #[must_use]
    pub fn check_height_bounds(&self, height: LayoutCoord) -> LayoutCoord {
        let mut height = height;
        if let Some(max) = self.max_height {
            height = height.min(max);
        }
        height.max(self.min_height)
    }
}
