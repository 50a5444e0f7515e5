//! Flex item boxes.
//!
//! [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
//!
//! A [`FlexItem`] is the per-child record a flex container keeps for each of
//! its in-flow children (plus the anonymous placeholders absolutely
//! positioned children leave behind). The record persists across reflow
//! passes; its computed fields are simply overwritten each pass.

use crate::breaks::BreakPolicy;
use crate::content::{ItemContent, ItemMetrics};
use crate::geometry::{LAYOUT_COORD_MAX, LayoutCoord, Rect};
use crate::style::ItemStyle;
use crate::values::AutoOr;

/// Outcome of min/max clamping during the flex loop.
///
/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
///
/// The sign records the direction in which the constrained size differs
/// from the unconstrained flexed size. A violated item is frozen: it keeps
/// its clamped size and is excluded from space distribution in subsequent
/// sub-passes of the same line. Only a fresh top-level pass unfreezes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Violation {
    /// Not clamped; still participates in flexing.
    #[default]
    None,
    /// Clamped down (the max constraint shrank it below its flexed size).
    Negative,
    /// Clamped up (the min constraint grew it above its flexed size).
    Positive,
}

/// A page break recorded after an item during fragmentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingBreak {
    /// No break after this item.
    #[default]
    None,
    /// A forced (`break-after: page`) break.
    Explicit,
    /// An implicit break inserted because the next item overflowed its
    /// page.
    Implicit,
}

/// One flex item: pre-resolved style, the content behind it, measurements
/// carried over from previous passes, and the geometry outputs of the
/// current pass.
///
/// Main/cross positions are kept in logical axis space (relative to the
/// container's content box, main-start and cross-start at zero); the
/// physical margin-box position is derived once per pass after flexing,
/// mirroring reversed axes.
#[derive(Debug)]
pub struct FlexItem {
    pub(crate) style: ItemStyle,
    pub(crate) content: Box<dyn ItemContent>,

    // ===== Measurements persisted across passes =====
    /// Hypothetical margin-box height from the most recent content layout:
    /// the height the item would have before any stretching, clamped by its
    /// own min/max. Used as the flex base fallback for vertical containers
    /// and as the cross size for horizontal ones.
    pub(crate) hypothetical_margin_height: LayoutCoord,
    /// Intrinsic min-content border-box width.
    pub(crate) min_content_width: LayoutCoord,
    /// Intrinsic max-content border-box width.
    pub(crate) max_content_width: LayoutCoord,
    /// Intrinsic minimum border-box height.
    pub(crate) content_min_height: LayoutCoord,
    /// First baseline from the border-box top, if any.
    pub(crate) baseline: Option<LayoutCoord>,

    // ===== Outputs of the current pass =====
    /// Main-axis margin-edge position, logical (main-start relative).
    pub(crate) new_main_edge: LayoutCoord,
    /// Main-axis margin-box size.
    pub(crate) new_main_size: LayoutCoord,
    /// Cross-axis margin-edge position, logical (cross-start relative).
    pub(crate) new_cross_edge: LayoutCoord,
    /// Cross-axis margin-box size.
    pub(crate) new_cross_size: LayoutCoord,
    /// Physical margin-box left edge.
    pub(crate) new_x: LayoutCoord,
    /// Physical margin-box top edge.
    pub(crate) new_y: LayoutCoord,
    /// Min/max clamp marker for the flex loop.
    pub(crate) violation: Violation,

    // ===== Fragmentation bookkeeping =====
    pub(crate) trailing_page_break: TrailingBreak,
    pub(crate) pending_page_break: bool,
}

impl FlexItem {
    /// Create an item for a child entering layout.
    #[must_use]
    pub fn new(style: ItemStyle, content: Box<dyn ItemContent>) -> Self {
        Self {
            style,
            content,
            hypothetical_margin_height: 0,
            min_content_width: 0,
            max_content_width: 0,
            content_min_height: 0,
            baseline: None,
            new_main_edge: 0,
            new_main_size: 0,
            new_cross_edge: 0,
            new_cross_size: 0,
            new_x: 0,
            new_y: 0,
            violation: Violation::None,
            trailing_page_break: TrailingBreak::None,
            pending_page_break: false,
        }
    }

    /// The item's pre-resolved style.
    #[must_use]
    pub fn style(&self) -> &ItemStyle {
        &self.style
    }

    /// The `order` property value.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.style.order
    }

    /// Mutable access to the content behind this item.
    pub fn content_mut(&mut self) -> &mut dyn ItemContent {
        &mut *self.content
    }

    /// True for the anonymous placeholder of an absolutely positioned
    /// child.
    ///
    /// [§ 4.1](https://www.w3.org/TR/css-flexbox-1/#abspos-items)
    /// "An absolutely-positioned child of a flex container does not
    /// participate in flex layout."
    #[must_use]
    pub fn is_abspos_placeholder(&self) -> bool {
        self.style.is_abspos_placeholder
    }

    /// True when the item is `visibility: collapse`.
    #[must_use]
    pub fn is_visibility_collapse(&self) -> bool {
        self.style.visibility == crate::style::Visibility::Collapse
    }

    /// Physical margin-box rectangle from the last pass, relative to the
    /// container's border box.
    #[must_use]
    pub fn margin_rect(&self, container_is_vertical: bool) -> Rect {
        let (width, height) = if container_is_vertical {
            (self.new_cross_size, self.new_main_size)
        } else {
            (self.new_main_size, self.new_cross_size)
        };
        Rect {
            x: self.new_x,
            y: self.new_y,
            width,
            height,
        }
    }

    /// Physical border-box rectangle from the last pass.
    #[must_use]
    pub fn border_rect(&self, container_is_vertical: bool) -> Rect {
        let margin_rect = self.margin_rect(container_is_vertical);
        Rect {
            x: margin_rect.x + self.style.margin.left.px_or(0),
            y: margin_rect.y + self.style.margin.top.px_or(0),
            width: margin_rect.width - self.style.margin.horizontal_px(),
            height: margin_rect.height - self.style.margin.vertical_px(),
        }
    }

    // ── Flex base and constrained sizes ────────────────────────────────

    /// [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    ///
    /// Compute the flex base size as a margin-box main size. If the
    /// preferred main size is `auto`, or a percentage that cannot be
    /// resolved because the containing block's main size is indefinite,
    /// fall back to content-based sizing: the hypothetical margin-box
    /// height for vertical items, the max-content width plus margins for
    /// horizontal ones.
    #[must_use]
    pub fn flex_base_size(
        &self,
        containing_block_size: Option<LayoutCoord>,
        vertical: bool,
    ) -> LayoutCoord {
        match self.style.preferred_main_size.resolve(containing_block_size) {
            None => {
                if vertical {
                    self.hypothetical_margin_height
                } else {
                    self.max_content_width + self.style.margin.horizontal_px()
                }
            }
            Some(mut size) => {
                if !self.style.box_sizing.is_border_box() {
                    size += self.style.main_border_padding;
                }
                size + self.style.main_margins(vertical)
            }
        }
    }

    /// [§ 9.2 step 3E](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    ///
    /// "The hypothetical main size is the item's flex base size clamped
    /// according to its used min and max main sizes."
    #[must_use]
    pub fn hypothetical_main_size(
        &self,
        containing_block_size: Option<LayoutCoord>,
        vertical: bool,
    ) -> LayoutCoord {
        self.constrained_main_size(self.flex_base_size(containing_block_size, vertical), vertical)
    }

    /// Clamp a margin-box main size to the item's min/max main sizes.
    ///
    /// [§ 4.5 Automatic Minimum Size](https://www.w3.org/TR/css-flexbox-1/#min-size-auto)
    ///
    /// Clamping happens in border-box terms; `min: auto` resolves to the
    /// min-content size (intrinsic min width, or the intrinsic min height
    /// for vertical items) rather than zero.
    #[must_use]
    pub fn constrained_main_size(&self, margin_box_size: LayoutCoord, vertical: bool) -> LayoutCoord {
        let auto_min = if vertical {
            self.content_min_height
        } else {
            self.min_content_width
        };
        self.constrained_size(
            margin_box_size,
            self.style.min_main_size,
            self.style.max_main_size,
            auto_min,
            self.style.main_border_padding,
            self.style.main_margins(vertical),
        )
    }

    /// Clamp a margin-box cross size to the item's min/max cross sizes.
    /// Symmetric to [`Self::constrained_main_size`].
    #[must_use]
    pub fn constrained_cross_size(
        &self,
        margin_box_size: LayoutCoord,
        vertical: bool,
    ) -> LayoutCoord {
        let auto_min = if vertical {
            self.min_content_width
        } else {
            self.content_min_height
        };
        self.constrained_size(
            margin_box_size,
            self.style.min_cross_size,
            self.style.max_cross_size,
            auto_min,
            self.style.cross_border_padding,
            self.style.cross_margins(vertical),
        )
    }

    fn constrained_size(
        &self,
        margin_box_size: LayoutCoord,
        min: AutoOr,
        max: Option<LayoutCoord>,
        auto_min_border_box: LayoutCoord,
        border_padding: LayoutCoord,
        margins: LayoutCoord,
    ) -> LayoutCoord {
        let border_box = margin_box_size - margins;

        let min_border_box = match min {
            AutoOr::Auto => auto_min_border_box,
            AutoOr::Px(v) => {
                if self.style.box_sizing.is_border_box() {
                    v
                } else {
                    v + border_padding
                }
            }
        };
        let max_border_box = max.map_or(LAYOUT_COORD_MAX, |v| {
            if self.style.box_sizing.is_border_box() {
                v
            } else {
                v + border_padding
            }
        });

        // A min that exceeds max wins, per CSS min/max resolution order.
        let clamped = border_box.min(max_border_box).max(min_border_box);

        clamped + margins
    }

    /// [§ 8.3 'align-self: stretch'](https://www.w3.org/TR/css-flexbox-1/#valdef-align-items-stretch)
    ///
    /// Stretching only applies when the cross size property computes to
    /// 'auto'; absolutely positioned placeholders never stretch.
    pub(crate) fn allow_stretch(&self) -> bool {
        !self.style.is_abspos_placeholder && self.style.preferred_cross_size.is_auto()
    }

    // ── Violation protocol ─────────────────────────────────────────────

    /// Record the clamp direction from the flex loop; zero clears the
    /// marker.
    pub(crate) fn set_violation(&mut self, diff: LayoutCoord) {
        self.violation = match diff.cmp(&0) {
            std::cmp::Ordering::Less => Violation::Negative,
            std::cmp::Ordering::Equal => Violation::None,
            std::cmp::Ordering::Greater => Violation::Positive,
        };
    }

    /// True once the item was clamped in an earlier sub-pass of the
    /// current flex loop (frozen for the rest of the loop).
    pub(crate) fn is_violated(&self) -> bool {
        self.violation != Violation::None
    }

    // ── Margin predicates ──────────────────────────────────────────────

    /// True when `margin-left` is 'auto'.
    #[must_use]
    pub fn is_margin_left_auto(&self) -> bool {
        self.style.margin.left.is_auto()
    }

    /// True when `margin-right` is 'auto'.
    #[must_use]
    pub fn is_margin_right_auto(&self) -> bool {
        self.style.margin.right.is_auto()
    }

    /// True when `margin-top` is 'auto'.
    #[must_use]
    pub fn is_margin_top_auto(&self) -> bool {
        self.style.margin.top.is_auto()
    }

    /// True when `margin-bottom` is 'auto'.
    #[must_use]
    pub fn is_margin_bottom_auto(&self) -> bool {
        self.style.margin.bottom.is_auto()
    }

    // ── Content layout bookkeeping ─────────────────────────────────────

    /// Absorb the metrics from a content layout and recompute the
    /// hypothetical margin-box height. Returns true when that height
    /// changed, which forces another reflow pass (auto-height and
    /// shrink-to-fit chains depend on it).
    pub(crate) fn finish_content_layout(
        &mut self,
        metrics: &ItemMetrics,
        vertical: bool,
        containing_height: Option<LayoutCoord>,
    ) -> bool {
        self.min_content_width = metrics.min_content_width;
        self.max_content_width = metrics.max_content_width;
        self.content_min_height = metrics.min_height;
        self.baseline = metrics.baseline;

        let hypothetical_border_height = metrics.hypothetical_height.unwrap_or_else(|| {
            // Preferred height is the main size for vertical containers and
            // the cross size for horizontal ones.
            let preferred = if vertical {
                self.style.preferred_main_size
            } else {
                self.style.preferred_cross_size
            };
            match preferred.resolve(containing_height) {
                Some(mut v) => {
                    if !self.style.box_sizing.is_border_box() {
                        let border_padding = if vertical {
                            self.style.main_border_padding
                        } else {
                            self.style.cross_border_padding
                        };
                        v += border_padding;
                    }
                    v
                }
                None => metrics.natural_height,
            }
        });

        let margin_height = hypothetical_border_height + self.style.margin.vertical_px();
        let hypothetical = if vertical {
            self.constrained_main_size(margin_height, vertical)
        } else {
            self.constrained_cross_size(margin_height, vertical)
        };

        let changed = hypothetical != self.hypothetical_margin_height;
        self.hypothetical_margin_height = hypothetical;
        changed
    }

    // ── Break bookkeeping ──────────────────────────────────────────────

    /// Page break policy before this item, from style.
    #[must_use]
    pub fn page_break_policy_before(&self) -> BreakPolicy {
        self.style.page_break_before
    }

    /// Page break policy after this item, from style.
    #[must_use]
    pub fn page_break_policy_after(&self) -> BreakPolicy {
        self.style.page_break_after
    }

    /// Column break policy before this item, from style.
    #[must_use]
    pub fn column_break_policy_before(&self) -> BreakPolicy {
        self.style.column_break_before
    }

    /// Column break policy after this item, from style.
    #[must_use]
    pub fn column_break_policy_after(&self) -> BreakPolicy {
        self.style.column_break_after
    }

    /// Mark a decided explicit break after this item, so future implicit
    /// break searches don't reconsider anything preceding it.
    pub(crate) fn add_trailing_page_break(&mut self) {
        self.trailing_page_break = TrailingBreak::Explicit;
    }

    /// Mark an implicit break after this item and flag it as pending so
    /// the next break-finding pass can locate it.
    pub(crate) fn add_trailing_implicit_page_break(&mut self) {
        self.trailing_page_break = TrailingBreak::Implicit;
        self.pending_page_break = true;
    }

    /// True when any break was decided after this item.
    #[must_use]
    pub fn has_trailing_page_break(&self) -> bool {
        self.trailing_page_break != TrailingBreak::None
    }

    /// Clear residual break marks from earlier passes.
    pub(crate) fn remove_trailing_page_break(&mut self) {
        self.trailing_page_break = TrailingBreak::None;
        self.pending_page_break = false;
    }

    /// Check for (and reset) the pending page break mark.
    pub(crate) fn find_pending_page_break(&mut self) -> bool {
        std::mem::take(&mut self.pending_page_break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BlockContent;
    use crate::style::BoxSizing;
    use crate::values::SizeValue;

    fn item(style: ItemStyle) -> FlexItem {
        FlexItem::new(style, Box::new(BlockContent::fixed(50, 20)))
    }

    #[test]
    fn flex_base_size_resolves_percent_against_containing_block() {
        let mut style = ItemStyle::default();
        style.preferred_main_size = SizeValue::Percent(0.25);
        let item = item(style);
        assert_eq!(item.flex_base_size(Some(400), false), 100);
    }

    #[test]
    fn flex_base_size_percent_unresolvable_falls_back_to_content() {
        let mut style = ItemStyle::default();
        style.preferred_main_size = SizeValue::Percent(0.25);
        let mut item = item(style);
        item.max_content_width = 70;
        assert_eq!(item.flex_base_size(None, false), 70);
    }

    #[test]
    fn flex_base_size_adds_border_padding_for_content_box() {
        let mut style = ItemStyle::default();
        style.preferred_main_size = SizeValue::Px(100);
        style.main_border_padding = 12;
        let content_box_item = item(style.clone());
        assert_eq!(content_box_item.flex_base_size(Some(0), false), 112);

        style.box_sizing = BoxSizing::BorderBox;
        let border_box_item = item(style);
        assert_eq!(border_box_item.flex_base_size(Some(0), false), 100);
    }

    #[test]
    fn constrained_main_size_clamps_in_border_box_terms() {
        let mut style = ItemStyle::default();
        style.min_main_size = AutoOr::Px(40);
        style.max_main_size = Some(80);
        style.main_border_padding = 10;
        let item = item(style);

        // 100 margin-box with no margins: border box 100, max 80+10=90.
        assert_eq!(item.constrained_main_size(100, false), 90);
        // Below min 40+10=50.
        assert_eq!(item.constrained_main_size(30, false), 50);
    }

    #[test]
    fn auto_min_main_size_resolves_to_min_content() {
        let mut i = item(ItemStyle::default());
        i.min_content_width = 60;
        assert_eq!(i.constrained_main_size(10, false), 60);
    }

    #[test]
    fn violation_sign_matches_clamp_direction() {
        let mut i = item(ItemStyle::default());
        i.set_violation(-5);
        assert_eq!(i.violation, Violation::Negative);
        i.set_violation(3);
        assert_eq!(i.violation, Violation::Positive);
        i.set_violation(0);
        assert!(!i.is_violated());
    }
}
