//! The flex container and its layout algorithm.
//!
//! [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! A [`FlexContainer`] owns its items and lines and runs the multi-pass
//! constraint solver: the parent engine calls [`FlexContainer::compute_size`]
//! (cheap width resolution), then [`FlexContainer::layout`] (line division,
//! flexing, positioning, child layout), then [`FlexContainer::finish_layout`]
//! (min/max propagation and the another-pass decision). One call to `layout`
//! produces a [`FlexPass`] value holding all transient state; `finish_layout`
//! consumes it, so nothing can leak from one pass into the next.
//!
//! Lines are divided using the geometry registered by the *previous* pass;
//! the current pass re-registers every item for the next one. That is what
//! makes the container converge over up to four passes (intrinsic size
//! discovery, line division, stretching, scrollbar feedback).

use wombat_common::warn_once;

use crate::content::{ItemConstraints, ItemContent, ItemMetrics};
use crate::engine::{LayoutInfo, LayoutResult, PagedMedia};
use crate::geometry::{LAYOUT_COORD_MAX, LAYOUT_COORD_MIN, LayoutCoord, Rect};
use crate::item::FlexItem;
use crate::line::{FlexLine, LineAccumulator};
use crate::list::ItemList;
use crate::style::{AlignContent, AlignSelf, ContainerStyle, ItemStyle, JustifyContent};
use crate::values::SizeValue;

/// Persistent container flags, re-derived by `compute_size` each pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FlexFlags {
    /// Main axis is vertical (column / column-reverse).
    pub is_vertical: bool,
    /// Item progression runs against the physical axis (row-reverse /
    /// column-reverse).
    pub items_reversed: bool,
    /// Line stacking runs against the physical cross axis (wrap-reverse).
    pub lines_reversed: bool,
    /// Width falls back to shrink-to-fit when unspecified.
    pub is_shrink_to_fit: bool,
    /// Height depends on the containing block (percentage height, or
    /// nested in a vertical flexbox).
    pub relative_height: bool,
    /// `break-inside: avoid` for pages.
    pub avoid_page_break_inside: bool,
    /// `break-inside: avoid` for columns.
    pub avoid_column_break_inside: bool,
    /// True once min/max widths have been computed at least once. While
    /// false, min/max accumulators are being (re)built and must not be
    /// trusted, and item geometry from previous passes may be stale, so
    /// line division is skipped.
    pub content_uptodate: bool,
    /// The last `finish_layout` decided another pass is required.
    pub needs_reflow: bool,
    /// Budget of self-triggered reflow passes remaining after the last
    /// externally triggered layout change.
    pub additional_reflows_allowed: u8,
}

/// Geometry inputs from the parent engine for one sizing/layout pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeInput {
    /// Available width from the containing block.
    pub available_width: LayoutCoord,
    /// Containing block height, if definite (percentage resolution).
    pub containing_height: Option<LayoutCoord>,
    /// Border-box width imposed by a parent flex container.
    pub imposed_width: Option<LayoutCoord>,
    /// Border-box height imposed by a parent flex container.
    pub imposed_height: Option<LayoutCoord>,
    /// True when this container is itself a flex item.
    pub nested_in_flexbox: bool,
    /// True when the parent flex container's main axis is vertical.
    pub nested_in_vertical_flexbox: bool,
}

impl SizeInput {
    /// Inputs for a container laid out as an ordinary block.
    #[must_use]
    pub fn block(available_width: LayoutCoord) -> Self {
        Self {
            available_width,
            ..Self::default()
        }
    }
}

/// Transient state of one layout pass.
///
/// Created by [`FlexContainer::layout`], consumed by
/// [`FlexContainer::finish_layout`]. It does not exist outside a pass, which
/// is what guarantees that no per-pass state survives into the next pass.
#[derive(Debug, Default)]
pub struct FlexPass {
    /// Resolved CSS height (in the container's box-sizing units), if any.
    pub(crate) css_height: Option<LayoutCoord>,
    /// Containing block main size items resolve percentages against.
    pub(crate) containing_block_size: Option<LayoutCoord>,
    /// Largest main size a single line may occupy for next-pass line
    /// estimation; `LAYOUT_COORD_MIN` means "assume one item per line".
    pub(crate) max_line_main_size: LayoutCoord,
    /// Content box width.
    pub(crate) content_width: LayoutCoord,
    /// Content box height (resolved by the end of `layout`).
    pub(crate) content_height: LayoutCoord,
    /// Running bottom edge of registered items (min/max height
    /// propagation).
    pub(crate) items_bottom: LayoutCoord,
    /// Widest min width registered since the last item finished (vertical
    /// containers).
    pub(crate) cur_minimum_width: LayoutCoord,
    /// Widest max width registered since the last item finished.
    pub(crate) cur_maximum_width: LayoutCoord,
    /// Accumulator for the line currently being registered.
    pub(crate) line_acc: LineAccumulator,
    /// An item's hypothetical height changed this pass; shrink-to-fit and
    /// auto-height chains need another pass to settle.
    pub(crate) hypothetical_item_height_changed: bool,
    /// The pass saw `visibility: collapse` items.
    pub(crate) has_collapsed_items: bool,
}

/// Heights a nested flex container propagates to the flex item holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagatedHeights {
    /// Border-box height with `height: auto`.
    pub auto_height: LayoutCoord,
    /// Hypothetical border-box height (CSS height if any, else auto
    /// height), clamped.
    pub hypothetical_height: LayoutCoord,
}

/// Results `finish_layout` hands back to the parent engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedLayout {
    /// Minimum (border-box) content width to propagate.
    pub minimum_width: LayoutCoord,
    /// Maximum (border-box) content width to propagate.
    pub maximum_width: LayoutCoord,
    /// Minimum border-box height to propagate.
    pub min_height: LayoutCoord,
    /// Another reflow pass is required.
    pub needs_reflow: bool,
    /// Height propagation for nested flex containers.
    pub heights: Option<PropagatedHeights>,
}

/// Extra space reserved by a scrollable wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScrollExtras {
    /// Width added to min/max widths (vertical scrollbar reservation).
    pub extra_min_max_width: LayoutCoord,
    /// Height added to the minimum height (horizontal scrollbar).
    pub extra_min_height: LayoutCoord,
    /// Current horizontal scrollbar height.
    pub hor_scrollbar_height: LayoutCoord,
    /// Current vertical scrollbar width.
    pub ver_scrollbar_width: LayoutCoord,
}

/// A flex container: the sizing and positioning engine for a set of flex
/// items.
#[derive(Debug, Default)]
pub struct FlexContainer {
    /// Border-box width.
    pub(crate) width: LayoutCoord,
    /// Border-box height.
    pub(crate) height: LayoutCoord,
    /// Propagated minimum width (border-box once content is up to date).
    pub(crate) minimum_width: LayoutCoord,
    /// Propagated maximum width.
    pub(crate) maximum_width: LayoutCoord,
    /// Propagated minimum height.
    pub(crate) min_height: LayoutCoord,
    /// Top border plus padding, cached for fragmentation geometry.
    pub(crate) top_border_padding: LayoutCoord,
    pub(crate) flags: FlexFlags,
    pub(crate) items: ItemList,
    pub(crate) lines: Vec<FlexLine>,
}

impl FlexContainer {
    /// Create an empty flex container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Item management (logical order) ────────────────────────────────

    /// Register a child entering layout. Returns its logical index.
    pub fn add_item(&mut self, style: ItemStyle, content: Box<dyn ItemContent>) -> usize {
        self.items.push(FlexItem::new(style, content))
    }

    /// Remove a child leaving layout, by logical index. Removal always
    /// walks logical order, never flex order.
    pub fn remove_item(&mut self, logical_index: usize) -> FlexItem {
        self.items.remove(logical_index)
    }

    /// The container's items.
    #[must_use]
    pub fn items(&self) -> &ItemList {
        &self.items
    }

    /// Mutable access to the container's items.
    pub fn items_mut(&mut self) -> &mut ItemList {
        &mut self.items
    }

    /// The nested flex container behind an item, if its content
    /// establishes one (the tagged capability the ancestor engine queries
    /// instead of downcasting).
    pub fn item_as_flex(&mut self, logical_index: usize) -> Option<&mut FlexContainer> {
        self.items.get_mut(logical_index).content_mut().as_flex()
    }

    /// The flex lines from the last pass. Cross geometry stays readable
    /// between passes; per-pass aggregates do not.
    #[must_use]
    pub fn lines(&self) -> &[FlexLine] {
        &self.lines
    }

    // ── Geometry accessors ─────────────────────────────────────────────

    /// Border-box width from the last `compute_size`.
    #[must_use]
    pub fn width(&self) -> LayoutCoord {
        self.width
    }

    /// Border-box height from the last `layout`.
    #[must_use]
    pub fn height(&self) -> LayoutCoord {
        self.height
    }

    /// Minimum border-box height for intrinsic sizing.
    #[must_use]
    pub fn min_height(&self) -> LayoutCoord {
        self.min_height
    }

    /// Minimum and maximum content width for intrinsic sizing.
    ///
    /// Only meaningful once content is up to date (a full pass finished);
    /// ancestors must not read it while min/max values are being rebuilt.
    #[must_use]
    pub fn min_max_width(&self) -> (LayoutCoord, LayoutCoord) {
        (self.minimum_width, self.maximum_width)
    }

    /// Invalidate min/max widths; the next pass recomputes them.
    pub fn clear_min_max_width(&mut self) {
        self.flags.content_uptodate = false;
        self.minimum_width = 0;
        self.maximum_width = 0;
    }

    /// True when `finish_layout` decided another pass is required.
    #[must_use]
    pub fn needs_reflow(&self) -> bool {
        self.flags.needs_reflow
    }

    /// True for column / column-reverse containers.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.flags.is_vertical
    }

    /// Physical margin-box rectangle of an item (logical index), relative
    /// to the container's border box.
    #[must_use]
    pub fn item_margin_rect(&self, logical_index: usize) -> Rect {
        self.items.get(logical_index).margin_rect(self.flags.is_vertical)
    }

    /// Physical border-box rectangle of an item (logical index).
    #[must_use]
    pub fn item_border_rect(&self, logical_index: usize) -> Rect {
        self.items.get(logical_index).border_rect(self.flags.is_vertical)
    }

    /// Dirty the element for reflow when content may have changed.
    pub fn signal_change(&self, host: &mut dyn crate::engine::LayoutHost) {
        if self.flags.needs_reflow {
            host.request_reflow();
        }
    }

    // ── Baselines ──────────────────────────────────────────────────────

    /// First baseline of the flexbox, if one can be derived from its
    /// items.
    ///
    /// [§ 8.5 Flex Container Baselines](https://www.w3.org/TR/css-flexbox-1/#flex-baselines)
    #[must_use]
    pub fn calculate_baseline(&self) -> Option<LayoutCoord> {
        let line = self.lines.first()?;
        let seq = self.items.flex_sequence();
        let (start, end) = self.line_range(0);

        if !self.flags.is_vertical {
            // The items' main axis is parallel with the inline axis, so we
            // can do proper baseline alignment if there's a baseline-aligned
            // item on the first line.
            for &idx in &seq[start..end] {
                let item = self.items.get(idx);
                if item.style().align_self == AlignSelf::Baseline {
                    if let Some(baseline) = item.baseline {
                        let border = item.border_rect(false);
                        return Some(border.y + baseline);
                    }
                }
            }
        }

        // No baseline-aligned items on the first flex line, or the main
        // axis isn't horizontal. Then examine the line's first item and see
        // if it has a baseline at all.
        let start_item = self.items.get(seq[line.start]);
        let border = start_item.border_rect(self.flags.is_vertical);
        match start_item.baseline {
            Some(baseline) => Some(border.y + baseline),
            // The first item has no baseline. Use its height then.
            None => Some(border.y + border.height),
        }
    }

    /// Baseline for block-level flexboxes; falls back to the flexbox
    /// height when there are no items.
    #[must_use]
    pub fn baseline(&self) -> LayoutCoord {
        self.calculate_baseline().unwrap_or(self.height)
    }

    /// Baseline for inline-level flexboxes; falls back to the bottom of
    /// the content box.
    #[must_use]
    pub fn inline_baseline(&self, style: &ContainerStyle) -> LayoutCoord {
        self.calculate_baseline()
            .unwrap_or(self.height - style.border.bottom - style.padding.bottom)
    }

    /// The baseline if the maximum width is satisfied. Room for
    /// improvement here, but good enough for now.
    #[must_use]
    pub fn min_baseline(&self) -> LayoutCoord {
        self.min_height
    }

    // ── ComputeSize ────────────────────────────────────────────────────

    /// Cheap width-only recomputation, called before full layout.
    ///
    /// [§ 9.2 Line Length Determination](https://www.w3.org/TR/css-flexbox-1/#algo-available)
    ///
    /// Re-derives the axis/reversal flags and resolves the border-box
    /// width: imposed by the parent flexbox when nested, otherwise from
    /// CSS width (fixed or percentage), falling back to shrink-to-fit
    /// against the accumulated intrinsic widths. Returns true when the
    /// width changed or the height is relative, i.e. when a full layout is
    /// needed.
    pub fn compute_size(&mut self, style: &ContainerStyle, input: &SizeInput) -> bool {
        self.flags.is_shrink_to_fit = style.is_shrink_to_fit;
        self.flags.relative_height = style.height.is_percent() || input.nested_in_vertical_flexbox;
        self.flags.is_vertical = style.direction.is_vertical();
        self.flags.items_reversed = style.direction.is_reversed();
        self.flags.lines_reversed = style.wrap == crate::style::Wrap::WrapReverse;

        let old_width = self.width;

        if input.nested_in_flexbox {
            if let Some(imposed) = input.imposed_width {
                self.width = imposed;
            }
        } else {
            let hor_border_padding = style.horizontal_border_padding();

            let content_width = match style.width {
                SizeValue::Px(width) => {
                    if style.box_sizing.is_border_box() {
                        width - hor_border_padding
                    } else {
                        width
                    }
                }
                SizeValue::Percent(_) => {
                    let resolved = style
                        .width
                        .resolve(Some(input.available_width))
                        .unwrap_or(0);
                    if style.box_sizing.is_border_box() {
                        resolved - hor_border_padding
                    } else {
                        resolved
                    }
                }
                SizeValue::Auto => {
                    let available = input.available_width
                        - (style.margin.horizontal() + hor_border_padding);

                    if self.flags.is_shrink_to_fit {
                        // May go negative before min/max widths have been
                        // calculated.
                        let minimum_content_width =
                            (self.minimum_width - hor_border_padding).max(0);
                        let maximum_content_width =
                            (self.maximum_width - hor_border_padding).max(0);

                        minimum_content_width.max(available.min(maximum_content_width))
                    } else {
                        available
                    }
                }
            };

            self.width = if style.box_sizing.is_border_box() {
                style.check_width_bounds(content_width.max(0) + hor_border_padding)
            } else {
                style.check_width_bounds(content_width) + hor_border_padding
            };
        }

        self.width != old_width || self.flags.relative_height
    }

    // ── Layout ─────────────────────────────────────────────────────────

    /// Run one full layout pass.
    ///
    /// [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
    ///
    /// Divides items into lines (from the previous pass's registered
    /// sizes), resolves flexible lengths, positions lines and items on
    /// both axes, finds fragmentation breaks, and lays out each item's
    /// content. Returns the pass state for [`Self::finish_layout`].
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from content layout and
    /// pagination callbacks.
    pub fn layout(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
    ) -> LayoutResult<FlexPass> {
        self.layout_with_scrollbars(style, input, info, ScrollExtras::default())
    }

    pub(crate) fn layout_with_scrollbars(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
        scroll: ScrollExtras,
    ) -> LayoutResult<FlexPass> {
        let vertical = self.flags.is_vertical;
        let wrappable = style.wrap.is_wrappable();
        let allow_collapse = info.allow_visibility_collapse;
        let hor_scrollbar_height = scroll.hor_scrollbar_height;
        let ver_scrollbar_width = scroll.ver_scrollbar_width;

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[FLEX] layout pass: {} items, vertical={vertical}, wrappable={wrappable}, \
             content_uptodate={}",
            self.items.len(),
            self.flags.content_uptodate
        );

        self.top_border_padding = style.top_border_padding();
        let ver_border_padding = style.vertical_border_padding();

        let mut pass = FlexPass {
            css_height: style.height.resolve(input.containing_height),
            ..FlexPass::default()
        };

        // Set up 'break-inside' policies.
        if info.paged_media != PagedMedia::Off || info.in_multipane {
            self.flags.avoid_page_break_inside = style.avoid_page_break_inside;
            self.flags.avoid_column_break_inside = style.avoid_column_break_inside;
        }

        // Calculate content box width.
        let content_width =
            (self.width - style.horizontal_border_padding() - ver_scrollbar_width).max(0);

        // Calculate maximum content height.
        let max_content_height = style.max_height.map_or(LAYOUT_COORD_MAX, |max_height| {
            let mut max = max_height - hor_scrollbar_height;
            if style.box_sizing.is_border_box() {
                max -= ver_border_padding;
            }
            max.max(0)
        });

        /* Calculate content box height. We may not be able to resolve it
        fully at this point, in which case it is left as auto until we have
        examined the lines. */
        let mut content_height: Option<LayoutCoord> = None;

        if let Some(imposed) = input.imposed_height {
            // Nested flexbox.
            content_height = Some(imposed - ver_border_padding);
        }

        if content_height.is_none() {
            if let Some(css_height) = pass.css_height {
                let mut resolved = css_height;
                if style.box_sizing.is_border_box() {
                    resolved -= ver_border_padding;
                }
                content_height = Some(resolved);
            }
        }

        if let Some(resolved) = content_height.as_mut() {
            let mut min_content_height = style.min_height;
            if style.box_sizing.is_border_box() {
                min_content_height = (min_content_height - ver_border_padding).max(0);
            }

            *resolved -= hor_scrollbar_height;
            *resolved = (*resolved).min(max_content_height).max(min_content_height);
        }

        // Set up main content size and restrictions.
        let mut max_main_content_size;

        if vertical {
            max_main_content_size = max_content_height;
            if let Some(main) = content_height {
                if max_main_content_size > main {
                    max_main_content_size = main;
                }
            }

            pass.containing_block_size = content_height;

            /* If a vertical flexbox is multi-line, we can only tell where
            the lines will wrap if the height is fixed. */
            pass.max_line_main_size = if !wrappable
                || (!self.flags.relative_height
                    && !style.min_height_is_percent
                    && !style.max_height_is_percent)
            {
                max_main_content_size
            } else {
                /* Since we have no clue about where lines might end, assume
                that there won't be room for more than one item per line.
                This is the only way to ensure that the flexbox becomes wide
                enough to contain all the items. */
                LAYOUT_COORD_MIN
            };
        } else {
            max_main_content_size = content_width;
            pass.containing_block_size = Some(content_width);
            pass.max_line_main_size = content_width;
        }

        self.lines.clear();

        if !self.flags.content_uptodate {
            self.min_height = 0; // will be recalculated now.
        }

        let flex_seq: Vec<usize> = self.items.flex_sequence().to_vec();
        let mut lines_cross_size_used: LayoutCoord = 0;
        let mut lines_max_cross_size_diff: LayoutCoord = 0;
        let mut has_pending_stf_items = false;
        let mut align_content = style.align_content;
        let mut first_skipped_abspos_item: Option<usize> = None;

        /* If content isn't "up-to-date" (because of DOM changes or
        dirtiness), it is dangerous to refer to per-item geometry from the
        previous pass, since it may not correspond to the current item set.
        Skip line division in that case; this pass only (re)registers the
        items. */
        if self.flags.content_uptodate {
            /* Prepare for flexing. Divide into lines. Reset previous
            flexing. Count number of auto margins per line and find total
            hypothetical sizes. Set tentative cross size of each item (may
            have to be modified again later if stretched or if shrink-to-fit
            has to be delayed until all line sizes are known). */
            for (position, &idx) in flex_seq.iter().enumerate() {
                if self.items.get(idx).is_abspos_placeholder() {
                    /* Skip past absolutely positioned items.

                    Also try to avoid putting them at the end of a line.
                    This has to do with how their static position is
                    calculated; the first thing we try is to look at the
                    next in-flow item on the line, so there better be one,
                    or things will look stupider than necessary. */
                    if first_skipped_abspos_item.is_none() {
                        // This may be a start item candidate for the next line.
                        first_skipped_abspos_item = Some(position);
                    }
                    continue;
                }

                let (base_size, hypothetical_size) = {
                    let item = self.items.get(idx);
                    if allow_collapse && item.is_visibility_collapse() {
                        (0, 0)
                    } else {
                        let base = item.flex_base_size(pass.containing_block_size, vertical);
                        (base, item.constrained_main_size(base, vertical))
                    }
                };

                if wrappable {
                    if let Some(line) = self.lines.last_mut() {
                        if line.state().hypothetical_size_sum + hypothetical_size
                            > max_main_content_size
                        {
                            // The current line is full. Need a new one. It
                            // will start with this item.
                            line.finish();
                            lines_cross_size_used += line.cross_size();
                            lines_max_cross_size_diff += line.max_cross_size_diff();
                            self.lines.push(FlexLine::new(
                                first_skipped_abspos_item.unwrap_or(position),
                            ));
                        }
                    }
                }

                if self.lines.is_empty() {
                    self.lines
                        .push(FlexLine::new(first_skipped_abspos_item.unwrap_or(position)));
                }

                first_skipped_abspos_item = None;

                if allow_collapse && self.items.get(idx).is_visibility_collapse() {
                    /* A collapsed item keeps its box but contributes
                    nothing: zero main and cross size, no auto margins, no
                    baseline. It reappears (sizes resumed) once visibility
                    changes back and another pass runs. */
                    self.items.get_mut(idx).new_cross_size = 0;
                    let line = self.lines.last_mut().expect("line exists");
                    line.add_item(0, 0, 0, 0);
                    self.items.get_mut(idx).set_violation(0);
                    continue;
                }

                let mut auto_margin_count: u32 = 0;
                let cross_size;

                if vertical {
                    let item = self.items.get(idx);
                    let hor_margins = item.style().margin.horizontal_px();
                    let mut size = match item.style().preferred_cross_size {
                        SizeValue::Auto => {
                            let min_width = item.min_content_width + hor_margins;
                            let max_width = item.max_content_width + hor_margins;

                            if wrappable {
                                /* Line width is unknown here, so we cannot
                                do shrink-to-fit yet. Need to wait until all
                                lines are finished and stretched. Record
                                maximum cross size. */
                                let line = self.lines.last_mut().expect("line exists");
                                line.propagate_max_cross_size(max_width);
                                has_pending_stf_items = true;
                                min_width
                            } else {
                                min_width.max(content_width.min(max_width))
                            }
                        }
                        preferred => {
                            let mut resolved =
                                preferred.resolve(Some(content_width)).unwrap_or(0);
                            if !item.style().box_sizing.is_border_box() {
                                resolved += item.style().cross_border_padding;
                            }
                            resolved + hor_margins
                        }
                    };

                    size = item.constrained_cross_size(size, vertical);
                    cross_size = size;

                    if item.is_margin_top_auto() {
                        auto_margin_count += 1;
                    }
                    if item.is_margin_bottom_auto() {
                        auto_margin_count += 1;
                    }

                    self.items.get_mut(idx).new_cross_size = size;
                } else {
                    let item = self.items.get(idx);
                    let margin_size = item.hypothetical_margin_height;
                    let mut line_cross_size = margin_size;

                    if item.style().align_self == AlignSelf::Baseline
                        && !item.is_margin_top_auto()
                        && !item.is_margin_bottom_auto()
                    {
                        if let Some(baseline) = item.baseline {
                            let above_baseline = baseline + item.style().margin.top.px_or(0);
                            let below_baseline = margin_size - above_baseline;

                            let line = self.lines.last_mut().expect("line exists");
                            line.add_baseline(above_baseline, below_baseline);
                            // Baseline info is used to determine cross size.
                            line_cross_size = 0;
                        }
                    }

                    if item.is_margin_left_auto() {
                        auto_margin_count += 1;
                    }
                    if item.is_margin_right_auto() {
                        auto_margin_count += 1;
                    }

                    cross_size = line_cross_size;
                    self.items.get_mut(idx).new_cross_size = margin_size;
                }

                let line = self.lines.last_mut().expect("line exists");
                line.add_item(base_size, hypothetical_size, cross_size, auto_margin_count);
                self.items.get_mut(idx).set_violation(0);
            }
        }

        if let Some(line) = self.lines.last_mut() {
            // Finish the last line.
            line.finish();

            if self.lines.len() == 1 {
                /* Single line; either because we were not allowed to wrap,
                or because it wasn't necessary to do so. Then this line
                should be stretched to take all available cross space, no
                matter what 'align-content' says. */
                align_content = AlignContent::Stretch;

                /* Also, the cross-size of a line in a single-line flexbox
                must be the same as the cross-size of the flex container.
                Perform the actual line stretching or shrinking now, if
                cross size is definite. */
                let line = &mut self.lines[0];
                if vertical {
                    line.set_cross_size(content_width);
                } else if let Some(definite) = content_height {
                    line.set_cross_size(definite.min(max_content_height));
                } else if line.cross_size() > max_content_height {
                    line.set_cross_size(max_content_height);
                }
            }

            let line = self.lines.last().expect("line exists");
            lines_cross_size_used += line.cross_size();
            lines_max_cross_size_diff += line.max_cross_size_diff();
        }

        /* Resolve and constrain content box height (and thus main content
        size, if previously unresolved). */
        let content_height = content_height.unwrap_or_else(|| {
            if vertical {
                if self.lines.is_empty() {
                    0
                } else if self.lines.len() > 1 {
                    // Wrapped. Max-height must have been reached.
                    max_main_content_size
                } else {
                    self.lines[0].state().hypothetical_size_sum
                }
            } else {
                lines_cross_size_used
            }
        });

        // Finally we can set the actual border box height.
        self.height =
            Self::calculate_height(style, input, &pass, content_height, hor_scrollbar_height);
        let content_height = (self.height - ver_border_padding - hor_scrollbar_height).max(0);

        pass.content_width = content_width;
        pass.content_height = content_height;

        // Figure out how much extra cross space is left for the lines.
        let main_content_size;
        let mut lines_extra_space;

        if vertical {
            main_content_size = content_height;
            lines_extra_space = content_width - lines_cross_size_used;
        } else {
            main_content_size = content_width;
            lines_extra_space = content_height - lines_cross_size_used;
        }

        if has_pending_stf_items {
            /* This is a multi-line vertical flexbox and at least one item
            needed the line width before it could calculate its own width. */
            debug_assert!(vertical && wrappable);

            if lines_max_cross_size_diff > 0 && lines_extra_space > 0 {
                /* There is space available to grow the lines, to make the
                pending shrink-to-fit items fit better. */
                let total_extra_space = lines_max_cross_size_diff.min(lines_extra_space);
                let mut diff_processed: LayoutCoord = 0; // Avoid rounding errors.
                let mut extra_space_processed: LayoutCoord = 0;

                for line in &mut self.lines {
                    diff_processed += line.max_cross_size_diff();
                    let next_extra_space =
                        total_extra_space * diff_processed / lines_max_cross_size_diff;

                    line.set_cross_size(line.cross_size() + next_extra_space - extra_space_processed);
                    extra_space_processed = next_extra_space;
                }

                // Adjust remaining extra cross space for 'align-content'.
                lines_extra_space -= total_extra_space;
                debug_assert!(lines_extra_space >= 0);
            }

            // Then apply shrink-to-fit to the items that still need it.
            for line_index in 0..self.lines.len() {
                let line_width = self.lines[line_index].cross_size();
                let (start, end) = self.line_range(line_index);

                for &idx in &flex_seq[start..end] {
                    let item = self.items.get(idx);
                    if item.style().preferred_cross_size.is_auto() {
                        // This is one such item. Set correct width.
                        let hor_margins = item.style().margin.horizontal_px();
                        let min_width = item.min_content_width + hor_margins;
                        let max_width = item.max_content_width + hor_margins;

                        // Shrink-to-fit.
                        self.items.get_mut(idx).new_cross_size =
                            min_width.max(line_width.min(max_width));
                    }
                }
            }
        }

        debug_assert!(main_content_size >= 0);

        let line_count = self.lines.len() as LayoutCoord;
        let mut unpacked_line_cross_pos: LayoutCoord = 0;
        let mut extra_space_distributed: LayoutCoord = 0;

        for line_index in 0..self.lines.len() {
            // Arrange line and items along the cross axis. Stretch line
            // and/or items as appropriate.
            let line_no = line_index as LayoutCoord;
            let unstretched_size = self.lines[line_index].cross_size();

            {
                let line = &mut self.lines[line_index];
                if align_content == AlignContent::Stretch && lines_extra_space > 0 {
                    // Also make sure that we distribute rounding errors.
                    let new_extra_space_distributed =
                        lines_extra_space * (line_no + 1) / line_count;

                    line.set_cross_position(unpacked_line_cross_pos + extra_space_distributed);
                    line.set_cross_size(
                        unstretched_size + new_extra_space_distributed - extra_space_distributed,
                    );
                    extra_space_distributed = new_extra_space_distributed;
                } else if align_content == AlignContent::SpaceBetween
                    && line_no > 0
                    && lines_extra_space > 0
                {
                    line.set_cross_position(
                        unpacked_line_cross_pos + lines_extra_space * line_no / (line_count - 1),
                    );
                } else if matches!(
                    align_content,
                    AlignContent::Stretch | AlignContent::SpaceBetween | AlignContent::FlexStart
                ) {
                    // 'stretch' without positive extra space and
                    // 'space-between' on the first line behave as
                    // 'flex-start'.
                    line.set_cross_position(unpacked_line_cross_pos);
                } else if align_content == AlignContent::FlexEnd {
                    line.set_cross_position(unpacked_line_cross_pos + lines_extra_space);
                } else if align_content == AlignContent::SpaceAround
                    && line_count > 1
                    && lines_extra_space > 0
                {
                    line.set_cross_position(
                        unpacked_line_cross_pos
                            + lines_extra_space * (line_no * 2 + 1) / (line_count * 2),
                    );
                } else {
                    // 'space-around' with one line or no positive extra
                    // space behaves as 'center'.
                    line.set_cross_position(unpacked_line_cross_pos + lines_extra_space / 2);
                }
            }

            unpacked_line_cross_pos += unstretched_size;

            self.position_line_items(line_index, &flex_seq, &pass, main_content_size, style, info);
        }

        self.finalize_physical_positions(&flex_seq, style, main_content_size, content_width, content_height);

        if info.in_multipane || info.paged_media != PagedMedia::Off {
            let stretch = self.find_breaks(style, info)?;

            /* Page breaking adds gaps between the end of content on one
            page and the start of content on the next. This affects the
            final height of the flexbox (and the position of the flex
            items, which has already been dealt with), but it must never
            affect flexbox flexing (main axis) or stretching (cross axis). */
            self.height += stretch;
        }

        // Lay out each item's content and re-register it for the next pass.
        self.layout_children(style, input, info, &mut pass)?;

        Ok(pass)
    }

    /// Item range of a line as positions in the flex-order sequence.
    pub(crate) fn line_range(&self, line_index: usize) -> (usize, usize) {
        let start = self.lines[line_index].start;
        let end = self
            .lines
            .get(line_index + 1)
            .map_or(self.items.len(), |next| next.start);
        (start, end)
    }

    /// Calculate the flexbox border box height.
    fn calculate_height(
        style: &ContainerStyle,
        input: &SizeInput,
        pass: &FlexPass,
        content_height: LayoutCoord,
        hor_scrollbar_height: LayoutCoord,
    ) -> LayoutCoord {
        let ver_border_padding = style.vertical_border_padding();
        let mut content_height = content_height;

        if let Some(flex_height) = input.imposed_height {
            // Nested flexbox.
            content_height = flex_height - ver_border_padding;
        } else if let Some(css_height) = pass.css_height {
            content_height = css_height;
            debug_assert!(content_height >= 0);

            if style.box_sizing.is_border_box() {
                content_height -= ver_border_padding;
            }
        } else {
            content_height += hor_scrollbar_height;
        }

        if style.box_sizing.is_border_box() {
            style.check_height_bounds(content_height + ver_border_padding)
        } else {
            style.check_height_bounds(content_height) + ver_border_padding
        }
    }

    /// Cross-align, flex, and justify the items of one line.
    fn position_line_items(
        &mut self,
        line_index: usize,
        flex_seq: &[usize],
        pass: &FlexPass,
        main_content_size: LayoutCoord,
        style: &ContainerStyle,
        info: &LayoutInfo<'_>,
    ) {
        let vertical = self.flags.is_vertical;
        let lines_reversed = self.flags.lines_reversed;
        let items_reversed = self.flags.items_reversed;
        let allow_collapse = info.allow_visibility_collapse;
        let (start, end) = self.line_range(line_index);
        let line_cross_size = self.lines[line_index].cross_size();
        let line_cross_position = self.lines[line_index].cross_position();
        let line_baseline = self.lines[line_index].baseline();
        let line_main_base_size = self.lines[line_index].state().base_size_sum;
        let line_item_count = self.lines[line_index].state().item_count as LayoutCoord;
        let line_auto_margin_count = self.lines[line_index].state().auto_margin_count as LayoutCoord;

        // Set items' cross size and position.
        for &idx in &flex_seq[start..end] {
            let item = self.items.get(idx);

            if allow_collapse && item.is_visibility_collapse() {
                // No cross box for collapsed items.
                self.items.get_mut(idx).new_cross_edge = line_cross_position;
                continue;
            }

            let extra_cross_space = line_cross_size - item.new_cross_size;
            let mut align_self = item.style().align_self;

            let (cross_start_margin_auto, cross_end_margin_auto) = if vertical {
                if lines_reversed {
                    (item.is_margin_right_auto(), item.is_margin_left_auto())
                } else {
                    (item.is_margin_left_auto(), item.is_margin_right_auto())
                }
            } else if lines_reversed {
                (item.is_margin_bottom_auto(), item.is_margin_top_auto())
            } else {
                (item.is_margin_top_auto(), item.is_margin_bottom_auto())
            };

            if (cross_start_margin_auto || cross_end_margin_auto) && extra_cross_space > 0 {
                // Map to new alignment values based on auto margins.
                align_self = if cross_start_margin_auto {
                    if cross_end_margin_auto {
                        AlignSelf::Center
                    } else {
                        AlignSelf::FlexEnd
                    }
                } else {
                    AlignSelf::FlexStart
                };
            }

            let mut cross_offset: LayoutCoord = 0;

            match align_self {
                AlignSelf::Stretch => {
                    if item.allow_stretch() && extra_cross_space != 0 {
                        let old_size = item.new_cross_size;
                        let stretched =
                            item.constrained_cross_size(old_size + extra_cross_space, vertical);
                        self.items.get_mut(idx).new_cross_size = stretched;
                    }
                }
                AlignSelf::FlexStart => {}
                AlignSelf::Baseline => {
                    if !vertical && !item.is_margin_top_auto() && !item.is_margin_bottom_auto() {
                        if let Some(baseline) = item.baseline {
                            cross_offset =
                                line_baseline - baseline - item.style().margin.top.px_or(0);

                            if lines_reversed {
                                // The bottom margin edge of the item is the
                                // cross-start edge.
                                cross_offset =
                                    line_cross_size - cross_offset - item.new_cross_size;
                            }
                        }
                    }
                }
                AlignSelf::FlexEnd => {
                    cross_offset = extra_cross_space;
                }
                AlignSelf::Center => {
                    cross_offset = extra_cross_space / 2;
                }
            }

            self.items.get_mut(idx).new_cross_edge = line_cross_position + cross_offset;
        }

        // Arrange items along the main axis. Flex and justify.
        let mut extra_space = main_content_size - line_main_base_size;

        // The free space that we had initially is what determines whether
        // to grow or shrink.
        let initial_extra_space = extra_space;

        // First: flex (change box sizes).
        let mut abspos_item_count = 0;
        let mut main_position: LayoutCoord = 0;
        let mut violation: LayoutCoord;
        let mut flex_iterations: u32 = 0;

        loop {
            /* One or several passes. If flexing violates min/max-width/height
            constraints on any of the items, perform another pass, to
            redistribute the extra space on the items that didn't get their
            constraints violated. Repeat until everyone's happy. If no
            violation occurs, on the other hand, there will only be one
            pass. */
            flex_iterations += 1;
            debug_assert!(
                flex_iterations <= self.lines[line_index].state().item_count + 1,
                "flex loop failed to converge"
            );

            let mut total_flex: f32 = 0.0;

            for &idx in &flex_seq[start..end] {
                let item = self.items.get(idx);
                if !item.is_violated()
                    && (!allow_collapse || !item.is_visibility_collapse())
                    && !item.is_abspos_placeholder()
                {
                    if initial_extra_space > 0 {
                        total_flex += item.style().flex_grow;
                    } else {
                        /* Shrinking is done with respect to the items' base
                        size. Larger items will shrink more than smaller
                        items. Because so says the spec. */
                        total_flex += item.style().flex_shrink
                            * item.flex_base_size(pass.containing_block_size, vertical) as f32;
                    }
                }
            }

            let mut frozen_space_distributed: LayoutCoord = 0;
            let mut space_flexed: LayoutCoord = 0; // Total amount of space flexed so far.
            let mut flex_processed: f32 = 0.0; // Total amount of flexibility processed so far.

            abspos_item_count = 0;
            main_position = 0;
            violation = 0;

            for &idx in &flex_seq[start..end] {
                self.items.get_mut(idx).new_main_edge = main_position;
                let item = self.items.get(idx);

                if allow_collapse && item.is_visibility_collapse() {
                    self.items.get_mut(idx).new_main_size = 0;
                    continue;
                }

                if item.is_abspos_placeholder() {
                    self.items.get_mut(idx).new_main_size = 0;
                    abspos_item_count += 1;
                    continue;
                }

                if !item.is_violated() {
                    let base_size = item.flex_base_size(pass.containing_block_size, vertical);
                    let mut item_size = base_size;

                    if extra_space != 0 && total_flex > 0.0 {
                        /* Stretch or shrink the item according to its
                        flexibility and extra space. Also be sure to
                        distribute rounding errors, to avoid undesired
                        unused space or overflow at the end of the line. */
                        if initial_extra_space > 0 {
                            flex_processed += item.style().flex_grow;
                        } else {
                            flex_processed += item.style().flex_shrink
                                * item.flex_base_size(pass.containing_block_size, vertical) as f32;
                        }

                        let new_space_flexed =
                            (extra_space as f32 * flex_processed / total_flex) as LayoutCoord;

                        item_size += new_space_flexed - space_flexed;
                        space_flexed = new_space_flexed;
                    }

                    let constrained_size = item.constrained_main_size(item_size, vertical);
                    let item_mut = self.items.get_mut(idx);
                    item_mut.new_main_size = constrained_size;

                    // Check for violation.
                    if constrained_size != item_size {
                        let diff = constrained_size - item_size;

                        item_mut.set_violation(diff);
                        violation += diff;
                        frozen_space_distributed += constrained_size - base_size;
                    }
                }

                main_position += self.items.get(idx).new_main_size;
            }

            if violation != 0 {
                extra_space -= frozen_space_distributed;
            }

            if violation == 0 || extra_space == 0 {
                break;
            }
        }

        extra_space = main_content_size - main_position;

        if extra_space != 0 {
            // Still extra space after flexing.
            if line_auto_margin_count > 0 && extra_space > 0 {
                // Give all extra space to auto margins.
                let mut extra_pos: LayoutCoord = 0;
                let mut cur_margin: LayoutCoord = 0;

                for &idx in &flex_seq[start..end] {
                    let item = self.items.get(idx);
                    if allow_collapse && item.is_visibility_collapse() {
                        continue;
                    }

                    let (main_start_margin_auto, main_end_margin_auto) = if vertical {
                        if items_reversed {
                            (item.is_margin_bottom_auto(), item.is_margin_top_auto())
                        } else {
                            (item.is_margin_top_auto(), item.is_margin_bottom_auto())
                        }
                    } else if items_reversed {
                        (item.is_margin_right_auto(), item.is_margin_left_auto())
                    } else {
                        (item.is_margin_left_auto(), item.is_margin_right_auto())
                    };

                    if main_start_margin_auto {
                        cur_margin += 1;
                        extra_pos = extra_space * cur_margin / line_auto_margin_count;
                    }

                    let item_mut = self.items.get_mut(idx);
                    item_mut.new_main_edge += extra_pos;

                    if main_end_margin_auto {
                        cur_margin += 1;
                        extra_pos = extra_space * cur_margin / line_auto_margin_count;
                    }
                }
            } else {
                // Otherwise, justify (change gaps between boxes).
                let mut item_no: LayoutCoord = 0;

                for &idx in &flex_seq[start..end] {
                    let item = self.items.get(idx);
                    if (allow_collapse && item.is_visibility_collapse())
                        || (abspos_item_count > 0 && item.is_abspos_placeholder())
                    {
                        continue;
                    }

                    let offset = match style.justify_content {
                        JustifyContent::SpaceBetween if line_item_count > 1 && extra_space > 0 => {
                            extra_space * item_no / (line_item_count - 1)
                        }
                        // 'space-between' otherwise behaves as 'flex-start'.
                        JustifyContent::FlexStart | JustifyContent::SpaceBetween => 0,
                        JustifyContent::FlexEnd => extra_space,
                        JustifyContent::SpaceAround if line_item_count > 1 && extra_space > 0 => {
                            extra_space * (item_no * 2 + 1) / (line_item_count * 2)
                        }
                        // 'space-around' otherwise behaves as 'center'.
                        JustifyContent::SpaceAround | JustifyContent::Center => extra_space / 2,
                    };

                    self.items.get_mut(idx).new_main_edge += offset;
                    item_no += 1;
                }
            }
        }

        if abspos_item_count > 0 {
            /* Position special anonymous items for absolutely positioned
            boxes. If an absolutely positioned "item" has auto position, it
            will use this to find its "static" position. */
            let mut first_pending_abspos_item: Option<usize> = None;
            let mut last_in_flow_main_end = LAYOUT_COORD_MIN;

            for pos in start..end {
                let idx = flex_seq[pos];
                let item = self.items.get(idx);

                if item.is_abspos_placeholder() {
                    if first_pending_abspos_item.is_none() {
                        first_pending_abspos_item = Some(pos);
                    }
                    continue;
                }

                /* Found an in-flow item. Copy its main position to any
                preceding absolutely positioned items. */
                let main_edge = item.new_main_edge;
                let main_end = main_edge + item.new_main_size;

                if let Some(first_pending) = first_pending_abspos_item {
                    for &abspos_idx in &flex_seq[first_pending..pos] {
                        let abspos = self.items.get_mut(abspos_idx);
                        if abspos.is_abspos_placeholder() {
                            abspos.new_main_edge = main_edge;
                            abspos.new_cross_edge = line_cross_position;
                        }
                    }
                }

                /* Remember the main-end edge of this one. It will be used
                to position any absolutely positioned items that are last on
                line. */
                last_in_flow_main_end = main_end;
                first_pending_abspos_item = None;
            }

            if let Some(first_pending) = first_pending_abspos_item {
                // Trailing absolutely positioned items on line.
                let main_position = if last_in_flow_main_end == LAYOUT_COORD_MIN {
                    /* No in-flow items on this line. Pretend that the
                    abspos items are 0x0 items and apply 'justify-content'. */
                    match style.justify_content {
                        JustifyContent::FlexEnd => main_content_size,
                        JustifyContent::SpaceAround | JustifyContent::Center => {
                            main_content_size / 2
                        }
                        JustifyContent::FlexStart | JustifyContent::SpaceBetween => 0,
                    }
                } else {
                    last_in_flow_main_end
                };

                for &abspos_idx in &flex_seq[first_pending..end] {
                    let abspos = self.items.get_mut(abspos_idx);
                    if abspos.is_abspos_placeholder() {
                        abspos.new_main_edge = main_position;
                        abspos.new_cross_edge = line_cross_position;
                    }
                }
            }
        }
    }

    /// Convert logical main/cross margin edges into physical margin-box
    /// positions, mirroring reversed item or line progression.
    fn finalize_physical_positions(
        &mut self,
        flex_seq: &[usize],
        style: &ContainerStyle,
        main_content_size: LayoutCoord,
        content_width: LayoutCoord,
        content_height: LayoutCoord,
    ) {
        let vertical = self.flags.is_vertical;
        let items_reversed = self.flags.items_reversed;
        let lines_reversed = self.flags.lines_reversed;
        let left_border_padding = style.left_border_padding();
        let top_border_padding = self.top_border_padding;
        let cross_content_size = if vertical { content_width } else { content_height };

        for &idx in flex_seq {
            let item = self.items.get_mut(idx);

            let main_physical = if items_reversed {
                main_content_size - item.new_main_edge - item.new_main_size
            } else {
                item.new_main_edge
            };
            let cross_physical = if lines_reversed {
                cross_content_size - item.new_cross_edge - item.new_cross_size
            } else {
                item.new_cross_edge
            };

            if vertical {
                item.new_x = left_border_padding + cross_physical;
                item.new_y = top_border_padding + main_physical;
            } else {
                item.new_x = left_border_padding + main_physical;
                item.new_y = top_border_padding + cross_physical;
            }
        }
    }

    // ── Child layout and item registration ─────────────────────────────

    /// Lay out every item's content (logical order) and re-register the
    /// items' measurements for the next pass.
    fn layout_children(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
        pass: &mut FlexPass,
    ) -> LayoutResult<()> {
        let vertical = self.flags.is_vertical;

        for idx in 0..self.items.len() {
            self.get_new_item(idx, pass);

            let constraints = self.item_constraints(idx, pass);

            let metrics = self.items.get_mut(idx).content.layout(&constraints, info)?;

            let containing_height = if vertical {
                pass.containing_block_size
            } else {
                Some(pass.content_height)
            };
            let changed =
                self.items
                    .get_mut(idx)
                    .finish_content_layout(&metrics, vertical, containing_height);
            pass.hypothetical_item_height_changed |= changed;

            let margins = self.items.get(idx).style().margin.horizontal_px();
            self.propagate_min_max_widths(
                pass,
                style,
                input,
                metrics.min_content_width + margins,
                metrics.max_content_width + margins,
            );

            self.finish_new_item(idx, pass, style, &metrics);
        }

        Ok(())
    }

    /// Constraints an item's content lays out under.
    fn item_constraints(&self, idx: usize, pass: &FlexPass) -> ItemConstraints {
        let vertical = self.flags.is_vertical;
        let item = self.items.get(idx);
        let style = item.style();
        let hor_margins = style.margin.horizontal_px();
        let ver_margins = style.margin.vertical_px();

        let (border_box_width, border_box_height) = if self.flags.content_uptodate {
            if vertical {
                (
                    item.new_cross_size - hor_margins,
                    Some(item.new_main_size - ver_margins),
                )
            } else {
                let width = item.new_main_size - hor_margins;
                let height = if style.align_self == AlignSelf::Stretch && item.allow_stretch() {
                    Some(item.new_cross_size - ver_margins)
                } else {
                    style.preferred_cross_size.resolve(Some(pass.content_height)).map(
                        |resolved| {
                            if style.box_sizing.is_border_box() {
                                resolved
                            } else {
                                resolved + style.cross_border_padding
                            }
                        },
                    )
                };
                (width, height)
            }
        } else {
            /* No trustworthy flexed geometry yet (first pass, or the item
            set changed). Lay the content out at a tentative width; the
            registered measurements make the next pass accurate. */
            let width = if vertical {
                item.min_content_width
                    .max(pass.content_width.min(item.max_content_width))
            } else {
                item.hypothetical_main_size(Some(pass.content_width), false) - hor_margins
            };
            (width.max(0), None)
        };

        ItemConstraints {
            border_box_width: border_box_width.max(0),
            border_box_height,
            containing_width: pass.content_width,
            containing_height: if vertical {
                pass.containing_block_size
            } else {
                Some(pass.content_height)
            },
            parent_is_vertical: vertical,
        }
    }

    /// A child is about to lay out and re-register.
    fn get_new_item(&mut self, idx: usize, pass: &mut FlexPass) {
        if !pass.has_collapsed_items {
            pass.has_collapsed_items = self.items.get(idx).is_visibility_collapse();
        }
    }

    /// A child finished laying out; fold its registered measurements into
    /// the next-pass line estimation and min/max propagation.
    fn finish_new_item(
        &mut self,
        idx: usize,
        pass: &mut FlexPass,
        style: &ContainerStyle,
        metrics: &ItemMetrics,
    ) {
        let vertical = self.flags.is_vertical;
        let wrappable = style.wrap.is_wrappable();
        let item = self.items.get(idx);
        let hyp_item_size = item.hypothetical_main_size(pass.containing_block_size, vertical);

        if pass.line_acc.item_count > 0
            && wrappable
            && pass.line_acc.hyp_main_space_used + hyp_item_size > pass.max_line_main_size
        {
            /* Line is assumed to be full, so assume that we move to the
            next. One note here: Since we register in logical order, this
            won't work perfectly if items are re-ordered by the 'order'
            property and end up on a different line than they otherwise
            would do. But we are only human... (this only affects min/max
            calculation, not flexbox layout in general, though) */
            if vertical && pass.max_line_main_size >= 0 {
                pass.items_bottom = pass.max_line_main_size;

                if !self.flags.content_uptodate {
                    // Update minimum (intrinsic) height.
                    self.min_height = pass.max_line_main_size;
                }
            }

            self.finish_line(pass);
        }

        pass.line_acc.hyp_main_space_used += hyp_item_size;

        let item = self.items.get(idx);

        if vertical {
            // Increase assumed bottom, unless we have already assumed that
            // we have wrapped.
            if pass.items_bottom < pass.max_line_main_size {
                pass.items_bottom += hyp_item_size;
            }

            if !self.flags.content_uptodate {
                // Update minimum (intrinsic) height.
                let item_min_height = metrics.min_height;

                if pass.max_line_main_size == LAYOUT_COORD_MIN {
                    // Assuming one line per item.
                    if self.min_height < item_min_height {
                        self.min_height = item_min_height;
                    }
                } else if self.min_height < pass.max_line_main_size {
                    // Not wrapped yet. Add to minimum height.
                    self.min_height += item_min_height;
                }
            }

            // Adjust min/max line width values if this item affects them.
            if pass.line_acc.minimum_width < pass.cur_minimum_width {
                pass.line_acc.minimum_width = pass.cur_minimum_width;
            }
            if pass.line_acc.maximum_width < pass.cur_maximum_width {
                pass.line_acc.maximum_width = pass.cur_maximum_width;
            }

            // Done with this item. Prepare for another one.
            pass.cur_minimum_width = 0;
            pass.cur_maximum_width = 0;
        } else {
            // Horizontal item.
            let cross_size = item.hypothetical_margin_height;
            let min_height = metrics.min_height;

            let baseline = if item.style().align_self == AlignSelf::Baseline
                && !item.is_margin_top_auto()
                && !item.is_margin_bottom_auto()
            {
                item.baseline
            } else {
                None
            };

            if let Some(baseline) = baseline {
                /* Baseline aligned item. Record amount of space used below
                and above baseline. */
                let above_baseline = baseline + item.style().margin.top.px_or(0);
                let below_baseline = cross_size - above_baseline;

                if pass.line_acc.max_above_baseline < above_baseline {
                    pass.line_acc.max_above_baseline = above_baseline;
                }
                if pass.line_acc.max_below_baseline < below_baseline {
                    pass.line_acc.max_below_baseline = below_baseline;
                }
            } else {
                // Non-baseline aligned item. Just record cross space used.
                if pass.line_acc.cross_space_used < cross_size {
                    pass.line_acc.cross_space_used = cross_size;
                }

                if !self.flags.content_uptodate {
                    let min_margin_height = min_height + item.style().margin.vertical_px();

                    if pass.line_acc.min_height_used < min_margin_height {
                        pass.line_acc.min_height_used = min_margin_height;
                    }
                }
            }
        }

        pass.line_acc.item_count += 1;
    }

    /// Finish the line currently being registered.
    fn finish_line(&mut self, pass: &mut FlexPass) {
        let line_cross_size = pass.line_acc.cross_size();

        if self.flags.is_vertical {
            if !self.flags.content_uptodate {
                // We're calculating min/max widths. Let this line contribute.
                self.minimum_width += pass.line_acc.minimum_width;
                self.maximum_width += pass.line_acc.maximum_width;
            }
        } else {
            // Height propagation needs the unstretched height of the lines.
            pass.items_bottom += line_cross_size;

            if !self.flags.content_uptodate {
                self.min_height += pass.line_acc.min_height();
            }
        }

        // Prepare for a new line.
        pass.line_acc.reset();
    }

    /// Fold an item's min/max widths into the container's intrinsic width
    /// accumulation.
    fn propagate_min_max_widths(
        &mut self,
        pass: &mut FlexPass,
        style: &ContainerStyle,
        input: &SizeInput,
        min_width: LayoutCoord,
        max_width: LayoutCoord,
    ) {
        if self.flags.content_uptodate {
            return;
        }

        if let SizeValue::Px(specified) = style.width {
            if !input.nested_in_flexbox {
                // Honor specified width.
                let content_width = if style.box_sizing.is_border_box() {
                    specified - style.horizontal_border_padding()
                } else {
                    specified
                };
                self.minimum_width = content_width;
                self.maximum_width = content_width;
                return;
            }
        }

        if self.flags.is_vertical {
            if pass.cur_minimum_width < min_width {
                pass.cur_minimum_width = min_width;
            }
            if pass.cur_maximum_width < max_width {
                pass.cur_maximum_width = max_width;
            }
        } else {
            if !style.wrap.is_wrappable() {
                self.minimum_width += min_width;
            } else if self.minimum_width < min_width {
                /* Line breaking is allowed. We don't need more width than
                that of the widest item. */
                self.minimum_width = min_width;
            }

            self.maximum_width += max_width;
        }
    }

    // ── FinishLayout ───────────────────────────────────────────────────

    /// Finalize the pass: decide whether another reflow is required,
    /// convert first-time min/max widths to border-box values, and hand
    /// the propagated measurements to the parent engine.
    ///
    /// Pass `None` when this container's layout was skipped; previously
    /// calculated widths are re-propagated unchanged.
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from engine callbacks.
    pub fn finish_layout(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
        pass: Option<FlexPass>,
    ) -> LayoutResult<FinishedLayout> {
        self.finish_layout_with_extras(style, input, info, pass, ScrollExtras::default())
    }

    pub(crate) fn finish_layout_with_extras(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
        pass: Option<FlexPass>,
        scroll: ScrollExtras,
    ) -> LayoutResult<FinishedLayout> {
        let Some(mut pass) = pass else {
            // Reflow was skipped. Propagate previously calculated widths.
            return Ok(FinishedLayout {
                minimum_width: self.minimum_width,
                maximum_width: self.maximum_width,
                min_height: self.min_height,
                needs_reflow: self.flags.needs_reflow,
                heights: None,
            });
        };

        self.finish_line(&mut pass);

        self.flags.needs_reflow = false;

        if self.flags.content_uptodate {
            // Content was up to date in this reflow pass, but we might
            // still need another pass.
            let reflow = if pass.has_collapsed_items {
                /* If we were not allowed to collapse items in this pass, we
                need another one. */
                !info.allow_visibility_collapse
            } else {
                pass.hypothetical_item_height_changed
            };

            if reflow {
                if info.external_layout_change {
                    self.flags.needs_reflow = true;
                } else if self.flags.additional_reflows_allowed > 0 {
                    self.flags.needs_reflow = true;
                    self.flags.additional_reflows_allowed -= 1;
                } else {
                    /* We are not allowed to add another reflow pass, but
                    something with the layout still hasn't settled. This is
                    either caused by an engine bug, or by an unanticipated
                    situation so complex that the number of reflows allowed
                    for a flexbox needs to be increased. Using stale layout
                    is preferable to looping forever. */
                    warn_once(
                        "layout",
                        "flexbox layout still unstable after its reflow budget was exhausted",
                    );
                }
            }
        } else {
            self.flags.needs_reflow = true;
        }

        if info.external_layout_change {
            /* This reflow was triggered by a DOM/style/viewport size
            change. Allow the next reflow pass to trigger up to two
            additional reflow passes, then. This is required because
            flexboxes may sometimes need as many as four (!) reflow passes:
            min/max width calculation, flexing, cross size stretching, and
            presence of auto scrollbars. Auto scrollbars may not be added as
            long as we have more reflow passes coming up, as early passes
            may be done with unresolved min/max widths (which may cause
            wider content than what's correct, so that we would incorrectly
            add auto scrollbars).

            For horizontal flexboxes it typically goes like this:

              Pass 1: Calculate items' hypothetical main sizes (width), to
              be able to distribute flex.

              Pass 2: With known hypothetical main sizes, we are ready to
              correctly divide into lines. Use correctly flexed main sizes
              (width) to calculate hypothetical cross sizes (height).

              Pass 3: Stretch stretchable items (height) and lay out.

            For vertical flexboxes it typically goes like this:

              Pass 1: Calculate items' min/max cross sizes (width), to be
              able to calculate hypothetical main sizes (height).

              Pass 2: Flex using the base flex sizes found in the previous
              pass (as one always does). The hypothetical cross sizes
              (widths) of the items can now be found, based on the min/max
              widths and stretching policies. A layout pass with the correct
              widths will give us the correct base main size (height), for
              flexing, so that we can get it right in the next pass.

              Pass 3: With known hypothetical main sizes, we are ready to
              correctly divide into lines. Flex main sizes (height) and lay
              out.

            Pass 4: relayout with auto scrollbars applied. */
            self.flags.additional_reflows_allowed = 2;
        }

        if self.flags.needs_reflow {
            info.host.request_reflow();
        }

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[FLEX] finish: needs_reflow={}, reflows_left={}, hyp_height_changed={}",
            self.flags.needs_reflow,
            self.flags.additional_reflows_allowed,
            pass.hypothetical_item_height_changed
        );

        if !self.flags.content_uptodate {
            // Calculate min/max width and minimum height.
            let hor_border_padding = style.horizontal_border_padding();
            let ver_border_padding = style.vertical_border_padding();
            let extra_minmax_width = scroll.extra_min_max_width;

            // Convert from content-box to border-box values.
            self.minimum_width += hor_border_padding + extra_minmax_width;
            self.maximum_width += hor_border_padding + extra_minmax_width;

            if let SizeValue::Px(css_height) = style.height {
                /* The calculated (auto) min height isn't interesting, since
                we have a fixed height. */
                self.min_height = css_height;

                if !style.box_sizing.is_border_box() {
                    self.min_height += ver_border_padding;
                }
            } else {
                self.min_height += ver_border_padding;
            }

            self.min_height += scroll.extra_min_height;

            // Constrain propagated widths and height to min-width,
            // max-width, min-height and max-height.
            if style.box_sizing.is_border_box() {
                self.minimum_width = style.check_width_bounds(self.minimum_width);
                self.maximum_width = style.check_width_bounds(self.maximum_width);
                self.min_height = style.check_height_bounds(self.min_height);
            } else {
                self.minimum_width = style
                    .check_width_bounds(self.minimum_width - hor_border_padding)
                    + hor_border_padding;
                self.maximum_width = style
                    .check_width_bounds(self.maximum_width - hor_border_padding)
                    + hor_border_padding;
                self.min_height = style
                    .check_height_bounds(self.min_height - ver_border_padding)
                    + ver_border_padding;
            }
        }

        let heights = if input.nested_in_flexbox {
            // Nested flexbox. Propagate hypothetical border box height.
            let ver_border_padding = style.vertical_border_padding();
            let mut auto_height = pass.items_bottom + scroll.hor_scrollbar_height;

            if style.box_sizing.is_border_box() {
                auto_height += ver_border_padding;
            }

            let hypothetical_height = pass.css_height.unwrap_or(auto_height);

            let mut auto_height = style.check_height_bounds(auto_height);
            let mut hypothetical_height = style.check_height_bounds(hypothetical_height);

            if !style.box_sizing.is_border_box() {
                auto_height += ver_border_padding;
                hypothetical_height += ver_border_padding;
            }

            Some(PropagatedHeights {
                auto_height,
                hypothetical_height,
            })
        } else {
            None
        };

        for line in &mut self.lines {
            line.finish_layout();
        }

        self.flags.content_uptodate = true;

        Ok(FinishedLayout {
            minimum_width: self.minimum_width,
            maximum_width: self.maximum_width,
            min_height: self.min_height,
            needs_reflow: self.flags.needs_reflow,
            heights,
        })
    }
}

/// A flex container living inside another flex container, wired into the
/// parent through the [`ItemContent`] seam.
///
/// The parent imposes flexed sizes through the constraints; the nested
/// container propagates its hypothetical height back so the parent can
/// compute its own items' flex base sizes.
#[derive(Debug)]
pub struct NestedFlexContainer {
    /// The nested container's pre-resolved style.
    pub style: ContainerStyle,
    /// The nested container itself.
    pub container: FlexContainer,
}

impl NestedFlexContainer {
    /// Wrap a container and its style as flex item content.
    #[must_use]
    pub fn new(style: ContainerStyle, container: FlexContainer) -> Self {
        Self { style, container }
    }
}

impl ItemContent for NestedFlexContainer {
    fn layout(
        &mut self,
        constraints: &ItemConstraints,
        info: &mut LayoutInfo<'_>,
    ) -> LayoutResult<ItemMetrics> {
        let input = SizeInput {
            available_width: constraints.containing_width,
            containing_height: constraints.containing_height,
            imposed_width: Some(constraints.border_box_width),
            imposed_height: constraints.border_box_height,
            nested_in_flexbox: true,
            nested_in_vertical_flexbox: constraints.parent_is_vertical,
        };

        let _ = self.container.compute_size(&self.style, &input);
        let pass = self.container.layout(&self.style, &input, info)?;
        let finished = self
            .container
            .finish_layout(&self.style, &input, info, Some(pass))?;

        let heights = finished.heights.unwrap_or(PropagatedHeights {
            auto_height: self.container.height(),
            hypothetical_height: self.container.height(),
        });

        Ok(ItemMetrics {
            content_height: self.container.height(),
            natural_height: heights.auto_height,
            min_content_width: finished.minimum_width,
            max_content_width: finished.maximum_width,
            min_height: finished.min_height,
            baseline: self.container.calculate_baseline(),
            hypothetical_height: Some(heights.hypothetical_height),
        })
    }

    fn as_flex(&mut self) -> Option<&mut FlexContainer> {
        Some(&mut self.container)
    }
}
