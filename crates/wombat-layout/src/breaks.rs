//! Fragmentation: page and column breaking of flex containers.
//!
//! [CSS Fragmentation Module Level 3](https://www.w3.org/TR/css-break-3/)
//!
//! Only single-line vertical flexboxes with non-reversed item order, or
//! horizontal flexboxes with non-reversed line order, are breakable;
//! fragmenting reversed stacking is unsupported because of the mismatch
//! between logical and visual order. These restrictions are deliberate
//! simplifications carried over from the engine this design follows;
//! "fixing" them would change observable layout.

use crate::container::FlexContainer;
use crate::engine::{BreakType, LayoutInfo, LayoutResult, PagedMedia};
use crate::geometry::LayoutCoord;
use crate::item::FlexItem;
use crate::style::ContainerStyle;
use serde::{Deserialize, Serialize};

/// [§ 2 Controlling Breaks](https://www.w3.org/TR/css-break-3/#breaking-controls)
///
/// Resolved `break-before`/`break-after` policy for one boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakPolicy {
    /// Breaking is allowed but not required.
    #[default]
    Allow,
    /// Breaking should be avoided (`break-*: avoid`).
    Avoid,
    /// A forced break (`break-*: page` / `column`).
    Always,
    /// A forced break to a left page.
    Left,
    /// A forced break to a right page.
    Right,
}

/// Combine the policies of two adjacent boundaries: the strongest wins
/// (forced beats avoid beats allow).
#[must_use]
pub fn combine_break_policies(first: BreakPolicy, second: BreakPolicy) -> BreakPolicy {
    first.max(second)
}

/// True for policies that force a break.
#[must_use]
pub fn break_forced(policy: BreakPolicy) -> bool {
    matches!(
        policy,
        BreakPolicy::Always | BreakPolicy::Left | BreakPolicy::Right
    )
}

/// True when an implicit break may be inserted between two boundaries.
#[must_use]
pub fn break_allowed_between(previous: BreakPolicy, current: BreakPolicy) -> bool {
    combine_break_policies(previous, current) != BreakPolicy::Avoid
}

/// Outcome of one implicit break-insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakStatus {
    /// A pending break was inserted.
    Found,
    /// A previously decided break blocks any earlier insertion.
    NotFound,
    /// No opportunity here; the caller should keep searching elsewhere.
    KeepLooking,
}

/// Break policies aggregated over one flex line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineBreakPolicies {
    pub column_before: BreakPolicy,
    pub page_before: BreakPolicy,
    pub column_after: BreakPolicy,
    pub page_after: BreakPolicy,
}

/// Sink for distributing a flex container into a multicolumn ancestor.
/// Items are identified by their logical index.
pub trait Columnizer {
    /// Record a forced page break before the given item. False on
    /// allocation failure.
    fn explicitly_break_page(&mut self, before_item: usize) -> bool;

    /// Record a forced column break before the given item. False on
    /// allocation failure.
    fn explicitly_break_column(&mut self, before_item: usize) -> bool;

    /// Columns remaining in the current row of columns.
    fn columns_left(&self) -> u32;

    /// Commit content allocated so far, moving to a new column or page if
    /// necessary. False on allocation failure.
    fn commit_content(&mut self) -> bool;

    /// Allocate the given item at a virtual position.
    fn allocate_content(&mut self, virtual_y: LayoutCoord, item: usize);

    /// Advance past the given virtual position.
    fn advance_head(&mut self, virtual_y: LayoutCoord);
}

/// Locates the column or page a target descendant box landed in.
pub trait ColumnFinder {
    /// True once the target box's end has been located.
    fn is_box_end_found(&self) -> bool;

    /// Update the current virtual position.
    fn set_position(&mut self, virtual_y: LayoutCoord);

    /// True when the target box lives inside the given item (logical
    /// index).
    fn is_target_within(&self, item: usize) -> bool;

    /// Descend into the given item.
    fn enter_child(&mut self, virtual_y: LayoutCoord);

    /// Record that the target box's start was found.
    fn set_box_start_found(&mut self);

    /// Record that the target box's end was found.
    fn set_box_end_found(&mut self);

    /// Ascend out of the item again.
    fn leave_child(&mut self, virtual_y: LayoutCoord);
}

impl FlexItem {
    /// Read and clear the page break policy before this item, so it is not
    /// applied twice once propagated to the container's own edge.
    pub(crate) fn steal_page_break_policy_before(&mut self) -> BreakPolicy {
        std::mem::take(&mut self.style.page_break_before)
    }

    /// Read and clear the page break policy after this item.
    pub(crate) fn steal_page_break_policy_after(&mut self) -> BreakPolicy {
        std::mem::take(&mut self.style.page_break_after)
    }

    /// Read and clear the column break policy before this item.
    pub(crate) fn steal_column_break_policy_before(&mut self) -> BreakPolicy {
        std::mem::take(&mut self.style.column_break_before)
    }

    /// Read and clear the column break policy after this item.
    pub(crate) fn steal_column_break_policy_after(&mut self) -> BreakPolicy {
        std::mem::take(&mut self.style.column_break_after)
    }
}

impl FlexContainer {
    /// True when this container can be split across pages or columns: only
    /// single-line vertical stacks and non-reversed horizontal line stacks
    /// fragment.
    fn vertical_fragmentable(&self) -> bool {
        self.lines.len() <= 1 && !self.flags.items_reversed
    }

    /// Break policies for one line, combined over its items.
    pub(crate) fn line_break_policies(&self, line_index: usize) -> LineBreakPolicies {
        let mut policies = LineBreakPolicies {
            column_before: BreakPolicy::Allow,
            page_before: BreakPolicy::Allow,
            column_after: BreakPolicy::Allow,
            page_after: BreakPolicy::Allow,
        };

        let seq = self.items.flex_sequence();
        let (start, end) = self.line_range(line_index);

        for &idx in &seq[start..end] {
            let item = self.items.get(idx);
            policies.column_before =
                combine_break_policies(policies.column_before, item.column_break_policy_before());
            policies.page_before =
                combine_break_policies(policies.page_before, item.page_break_policy_before());
            policies.column_after =
                combine_break_policies(policies.column_after, item.column_break_policy_after());
            policies.page_after =
                combine_break_policies(policies.page_after, item.page_break_policy_after());
        }

        policies
    }

    /// Find and set / propagate explicit (column/page) breaks.
    ///
    /// Walks items (vertical) or lines (horizontal) in flex order,
    /// combining each boundary's break-before policy with the previous
    /// boundary's break-after policy. Forced breaks propagate to multipane
    /// ancestors or advance the page; overflow of the current page
    /// triggers implicit break insertion with increasing strength.
    ///
    /// Returns the vertical stretch added by inserted page gaps.
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from pagination callbacks.
    pub(crate) fn find_breaks(
        &mut self,
        _style: &ContainerStyle,
        info: &mut LayoutInfo<'_>,
    ) -> LayoutResult<LayoutCoord> {
        let mut prev_page_break_policy = BreakPolicy::Avoid;
        let mut prev_column_break_policy = BreakPolicy::Avoid;

        /* Set to something other than `None` if we should insert a page
        break (either implicit or explicit) before processing any more
        items. */
        let mut insert_break: Option<BreakPolicy> = None;

        /* The last flex item we're past; on the previous line if this is a
        horizontal wrappable flexbox. */
        let mut prev_box: Option<usize> = None;

        let mut stretch: LayoutCoord = 0;
        let flex_seq: Vec<usize> = self.items.flex_sequence().to_vec();

        if self.flags.is_vertical {
            if !self.vertical_fragmentable() {
                return Ok(stretch);
            }

            for (position, &idx) in flex_seq.iter().enumerate() {
                let y = self.items.get(idx).new_y;
                let page_break_policy = combine_break_policies(
                    prev_page_break_policy,
                    self.items.get(idx).page_break_policy_before(),
                );
                let column_break_policy = combine_break_policies(
                    prev_column_break_policy,
                    self.items.get(idx).column_break_policy_before(),
                );

                if info.in_multipane {
                    if break_forced(page_break_policy) || break_forced(column_break_policy) {
                        let break_type = if break_forced(page_break_policy) {
                            BreakType::Page
                        } else {
                            BreakType::Column
                        };

                        info.host.propagate_breakpoint(y, break_type)?;
                    }
                } else {
                    if info.paged_media == PagedMedia::On && break_forced(page_break_policy) {
                        insert_break = Some(page_break_policy);

                        /* Break policies on the first line of boxes have
                        been propagated to the flex container, so we should
                        never find explicit breaks on the first item. */
                        debug_assert!(prev_box.is_some());

                        if let Some(prev) = prev_box {
                            /* Need to mark the break, so that future
                            attempts to insert implicit page breaks don't
                            consider anything preceding this item. */
                            self.items.get_mut(flex_seq[prev]).add_trailing_page_break();
                        }
                    }

                    if let Some(policy) = insert_break.take() {
                        stretch += self.break_page(info, position, None, y, policy)?;
                    }

                    if info.keep_page_breaks {
                        if self.items.get_mut(idx).find_pending_page_break() {
                            /* Found (and reset) the pending page break mark.
                            Resume normal page breaking. */
                            debug_assert_eq!(info.paged_media, PagedMedia::Find);
                            info.paged_media = PagedMedia::On;
                        }

                        if self.items.get(idx).has_trailing_page_break() {
                            insert_break = Some(BreakPolicy::Allow);
                        }
                    } else {
                        /* We're either looking for new page breaks, or page
                        breaking is disabled. Any page break here is just
                        residue and no longer valid. */
                        self.items.get_mut(idx).remove_trailing_page_break();

                        if info.paged_media == PagedMedia::On
                            && y + self.items.get(idx).new_main_size > info.host.page_bottom()
                        {
                            // This item overflows the current page. Try to break.
                            self.insert_implicit_page_break(info)?;
                        }
                    }

                    prev_box = Some(position);
                }

                prev_page_break_policy = self.items.get(idx).page_break_policy_after();
                prev_column_break_policy = self.items.get(idx).column_break_policy_after();
            }
        } else {
            /* Cannot fragment reverse line stacking, because of the
            mismatch between logical and visual order. */
            if self.flags.lines_reversed {
                return Ok(stretch);
            }

            for line_index in 0..self.lines.len() {
                let y = self.lines[line_index].cross_position() + self.top_border_padding;
                let policies = self.line_break_policies(line_index);

                let column_break_policy =
                    combine_break_policies(prev_column_break_policy, policies.column_before);
                let page_break_policy =
                    combine_break_policies(prev_page_break_policy, policies.page_before);

                if info.in_multipane {
                    if break_forced(page_break_policy) || break_forced(column_break_policy) {
                        let break_type = if break_forced(page_break_policy) {
                            BreakType::Page
                        } else {
                            BreakType::Column
                        };

                        info.host.propagate_breakpoint(y, break_type)?;
                    }
                } else {
                    let (start, end) = self.line_range(line_index);

                    if info.paged_media == PagedMedia::On && break_forced(page_break_policy) {
                        insert_break = Some(page_break_policy);

                        debug_assert!(prev_box.is_some());

                        if let Some(prev) = prev_box {
                            self.items.get_mut(flex_seq[prev]).add_trailing_page_break();
                        }
                    }

                    if let Some(policy) = insert_break.take() {
                        stretch += self.break_page(info, start, Some(line_index), y, policy)?;
                    }

                    for pos in start..end {
                        let idx = flex_seq[pos];

                        if info.keep_page_breaks {
                            if self.items.get_mut(idx).find_pending_page_break() {
                                debug_assert_eq!(info.paged_media, PagedMedia::Find);
                                info.paged_media = PagedMedia::On;
                            }

                            if self.items.get(idx).has_trailing_page_break() {
                                insert_break = Some(BreakPolicy::Allow);
                            }
                        } else {
                            self.items.get_mut(idx).remove_trailing_page_break();

                            if info.paged_media == PagedMedia::On
                                && y + self.lines[line_index].cross_size()
                                    > info.host.page_bottom()
                            {
                                // This line overflows the current page.
                                self.insert_implicit_page_break(info)?;
                            }
                        }
                    }

                    prev_box = Some(start);
                }

                prev_page_break_policy = policies.page_after;
                prev_column_break_policy = policies.column_after;
            }
        }

        Ok(stretch)
    }

    /// Bounded-strength retries of implicit break insertion, increasingly
    /// permissive about 'avoid' policies. On success, page breaking is
    /// disabled for the rest of this reflow pass; the inserted pending
    /// break is located again in the next pass.
    fn insert_implicit_page_break(&mut self, info: &mut LayoutInfo<'_>) -> LayoutResult<()> {
        for strength in 0..=3 {
            if self.attempt_page_break(info, strength)? == BreakStatus::Found {
                info.paged_media = PagedMedia::Find;
                break;
            }
        }
        Ok(())
    }

    /// Walk items (or lines) from the end looking for the last
    /// still-undecided breakable boundary before the page bottom.
    ///
    /// 'avoid' policies are honored unless `strength >= 2`.
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from pagination callbacks.
    pub fn attempt_page_break(
        &mut self,
        info: &mut LayoutInfo<'_>,
        strength: u32,
    ) -> LayoutResult<BreakStatus> {
        if strength == 0 && self.flags.avoid_page_break_inside {
            return Ok(BreakStatus::KeepLooking);
        }

        let page_bottom = info.host.page_bottom();
        let mut prev_policy = BreakPolicy::Avoid;
        let flex_seq: Vec<usize> = self.items.flex_sequence().to_vec();

        if self.flags.is_vertical {
            if self.vertical_fragmentable() {
                for &idx in flex_seq.iter().rev() {
                    let item = self.items.get(idx);

                    if item.has_trailing_page_break() {
                        /* Found a previously inserted break. Do not attempt
                        to insert anything before that one. */
                        return Ok(BreakStatus::NotFound);
                    }

                    let position = item.new_y;
                    let height = item.new_main_size;
                    let cur_policy = item.page_break_policy_after();

                    if position + height < page_bottom {
                        // Found an item that ends on the current page.
                        if strength >= 2
                            || combine_break_policies(prev_policy, cur_policy)
                                != BreakPolicy::Avoid
                        {
                            // Found a break opportunity. Break after this item.
                            self.items.get_mut(idx).add_trailing_implicit_page_break();
                            info.host.request_page_break();

                            return Ok(BreakStatus::Found);
                        }
                    }

                    prev_policy = self.items.get(idx).page_break_policy_before();
                }
            }
        } else if !self.flags.lines_reversed {
            for line_index in (0..self.lines.len()).rev() {
                let (start, end) = self.line_range(line_index);

                for &idx in &flex_seq[start..end] {
                    if self.items.get(idx).has_trailing_page_break() {
                        return Ok(BreakStatus::NotFound);
                    }
                }

                let position = self.lines[line_index].cross_position() + self.top_border_padding;
                let height = self.lines[line_index].cross_size();
                let policies = self.line_break_policies(line_index);

                if position + height < page_bottom {
                    // Found a line that ends on the current page.
                    if strength >= 2
                        || combine_break_policies(prev_policy, policies.page_after)
                            != BreakPolicy::Avoid
                    {
                        // Found a break opportunity. Break after this line.
                        let start_idx = flex_seq[self.lines[line_index].start];
                        self.items
                            .get_mut(start_idx)
                            .add_trailing_implicit_page_break();
                        info.host.request_page_break();

                        return Ok(BreakStatus::Found);
                    }
                }

                prev_policy = policies.page_before;
            }
        }

        Ok(BreakStatus::KeepLooking)
    }

    /// Insert a page break before the given flex-order position, advancing
    /// pages until the left/right parity of the break policy is honored.
    /// Returns the offset subsequent content moved down by.
    fn break_page(
        &mut self,
        info: &mut LayoutInfo<'_>,
        break_before_position: usize,
        break_before_line: Option<usize>,
        mut virtual_y: LayoutCoord,
        page_break: BreakPolicy,
    ) -> LayoutResult<LayoutCoord> {
        let mut offset: LayoutCoord = 0;

        debug_assert_ne!(info.paged_media, PagedMedia::Off);

        loop {
            let next_page = info.host.advance_page(virtual_y)?;
            let page_top = next_page.top;

            offset += page_top - virtual_y;
            virtual_y = page_top;

            if page_break == BreakPolicy::Left {
                if next_page.number % 2 == 1 {
                    continue; // Wrong side - need a blank page.
                }
            } else if page_break == BreakPolicy::Right && next_page.number % 2 == 0 {
                continue; // Wrong side - need a blank page.
            }

            break;
        }

        if offset > 0 {
            // Page break moved items and lines further down.
            if let Some(first_line) = break_before_line {
                // Only for horizontal flexboxes.
                for line in &mut self.lines[first_line..] {
                    line.set_cross_position(line.cross_position() + offset);
                }
            }

            let flex_seq: Vec<usize> = self.items.flex_sequence().to_vec();
            for &idx in &flex_seq[break_before_position..] {
                self.items.get_mut(idx).new_y += offset;
            }
        }

        Ok(offset)
    }

    /// Distribute this container's items (or lines) into an enclosing
    /// multicolumn container. Returns true when the container could be
    /// columnized (and all sink calls succeeded).
    pub fn columnize(&mut self, columnizer: &mut dyn Columnizer) -> bool {
        let mut prev_page_break_policy = BreakPolicy::Avoid;
        let mut prev_column_break_policy = BreakPolicy::Avoid;
        let mut columnized = false;
        let flex_seq: Vec<usize> = self.items.flex_sequence().to_vec();

        if self.flags.is_vertical {
            if self.vertical_fragmentable() {
                for &idx in &flex_seq {
                    let item = self.items.get(idx);
                    let virtual_position = item.new_y;
                    let cur_column_break_policy = item.column_break_policy_before();
                    let column_break_policy =
                        combine_break_policies(prev_column_break_policy, cur_column_break_policy);
                    let cur_page_break_policy = item.page_break_policy_before();
                    let page_break_policy =
                        combine_break_policies(prev_page_break_policy, cur_page_break_policy);
                    let height = item.border_rect(true).height;
                    let next_page_policy = item.page_break_policy_after();
                    let next_column_policy = item.column_break_policy_after();

                    if break_forced(page_break_policy) {
                        if !columnizer.explicitly_break_page(idx) {
                            return false;
                        }
                    } else if break_forced(column_break_policy)
                        && !columnizer.explicitly_break_column(idx)
                    {
                        return false;
                    }

                    if !self.flags.avoid_column_break_inside
                        && break_allowed_between(prev_column_break_policy, cur_column_break_policy)
                        && (columnizer.columns_left() > 0
                            || (!self.flags.avoid_page_break_inside
                                && break_allowed_between(
                                    prev_page_break_policy,
                                    cur_page_break_policy,
                                )))
                    {
                        // We are allowed to move on to the next column/page,
                        // if necessary.
                        if !columnizer.commit_content() {
                            return false;
                        }
                    }

                    columnizer.allocate_content(virtual_position, idx);
                    columnizer.advance_head(virtual_position + height);

                    prev_page_break_policy = next_page_policy;
                    prev_column_break_policy = next_column_policy;
                }

                columnized = true;
            }
        } else if !self.flags.lines_reversed {
            for line_index in 0..self.lines.len() {
                let virtual_position =
                    self.lines[line_index].cross_position() + self.top_border_padding;
                let (start, end) = self.line_range(line_index);
                let policies = self.line_break_policies(line_index);

                let column_break_policy =
                    combine_break_policies(prev_column_break_policy, policies.column_before);
                let page_break_policy =
                    combine_break_policies(prev_page_break_policy, policies.page_before);

                let start_idx = flex_seq[start];
                let last_idx = flex_seq[end - 1];

                if break_forced(page_break_policy) {
                    if !columnizer.explicitly_break_page(start_idx) {
                        return false;
                    }
                } else if break_forced(column_break_policy)
                    && !columnizer.explicitly_break_column(start_idx)
                {
                    return false;
                }

                if !self.flags.avoid_column_break_inside
                    && break_allowed_between(prev_column_break_policy, policies.column_before)
                    && (columnizer.columns_left() > 0
                        || (!self.flags.avoid_page_break_inside
                            && break_allowed_between(prev_page_break_policy, policies.page_before)))
                {
                    // We are allowed to move on to the next column/page.
                    if !columnizer.commit_content() {
                        return false;
                    }
                }

                columnizer.allocate_content(virtual_position, start_idx);
                columnizer.allocate_content(virtual_position, last_idx);
                columnizer.advance_head(virtual_position + self.lines[line_index].cross_size());

                prev_page_break_policy = policies.page_after;
                prev_column_break_policy = policies.column_after;
            }

            columnized = true;
        }

        columnized
    }

    /// Figure out which column(s) or spanned element a descendant box
    /// belongs to.
    pub fn find_column(&self, finder: &mut dyn ColumnFinder) {
        for &idx in self.items.flex_sequence() {
            if finder.is_box_end_found() {
                break;
            }

            let stack_position = self.items.get(idx).new_y;

            finder.set_position(stack_position);

            if finder.is_target_within(idx) {
                finder.enter_child(stack_position);
                finder.set_box_start_found();
                finder.set_box_end_found();
                finder.leave_child(stack_position);
            }
        }
    }

    /// Combine the given break policies with the child break policies that
    /// should be propagated to the container's own edges (stealing them
    /// from the children so they are not applied twice).
    pub fn combine_child_break_properties(
        &mut self,
        page_break_before: &mut BreakPolicy,
        column_break_before: &mut BreakPolicy,
        page_break_after: &mut BreakPolicy,
        column_break_after: &mut BreakPolicy,
    ) {
        let flex_seq: Vec<usize> = self.items.flex_sequence().to_vec();

        if self.flags.is_vertical {
            if let (Some(&first), Some(&last)) = (flex_seq.first(), flex_seq.last()) {
                *page_break_before = combine_break_policies(
                    *page_break_before,
                    self.items.get_mut(first).steal_page_break_policy_before(),
                );
                *column_break_before = combine_break_policies(
                    *column_break_before,
                    self.items.get_mut(first).steal_column_break_policy_before(),
                );
                *page_break_after = combine_break_policies(
                    *page_break_after,
                    self.items.get_mut(last).steal_page_break_policy_after(),
                );
                *column_break_after = combine_break_policies(
                    *column_break_after,
                    self.items.get_mut(last).steal_column_break_policy_after(),
                );
            }
        } else if !self.lines.is_empty() {
            let (first_start, first_end) = self.line_range(0);
            let last_line_start = self.lines[self.lines.len() - 1].start;

            for &idx in &flex_seq[first_start..first_end] {
                *page_break_before = combine_break_policies(
                    *page_break_before,
                    self.items.get_mut(idx).steal_page_break_policy_before(),
                );
                *column_break_before = combine_break_policies(
                    *column_break_before,
                    self.items.get_mut(idx).steal_column_break_policy_before(),
                );
            }

            for &idx in &flex_seq[last_line_start..] {
                *page_break_after = combine_break_policies(
                    *page_break_after,
                    self.items.get_mut(idx).steal_page_break_policy_after(),
                );
                *column_break_after = combine_break_policies(
                    *column_break_after,
                    self.items.get_mut(idx).steal_column_break_policy_after(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_picks_the_strongest_policy() {
        use BreakPolicy::{Allow, Always, Avoid, Left};

        assert_eq!(combine_break_policies(Allow, Allow), Allow);
        assert_eq!(combine_break_policies(Allow, Avoid), Avoid);
        assert_eq!(combine_break_policies(Avoid, Always), Always);
        assert_eq!(combine_break_policies(Always, Left), Left);
    }

    #[test]
    fn forced_classification() {
        assert!(break_forced(BreakPolicy::Always));
        assert!(break_forced(BreakPolicy::Left));
        assert!(break_forced(BreakPolicy::Right));
        assert!(!break_forced(BreakPolicy::Avoid));
        assert!(!break_forced(BreakPolicy::Allow));
    }

    #[test]
    fn implicit_breaks_blocked_by_avoid() {
        assert!(break_allowed_between(BreakPolicy::Allow, BreakPolicy::Allow));
        assert!(!break_allowed_between(BreakPolicy::Avoid, BreakPolicy::Allow));
        assert!(break_allowed_between(BreakPolicy::Always, BreakPolicy::Avoid));
    }
}
