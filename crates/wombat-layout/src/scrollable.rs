//! Scrollable flex containers.
//!
//! [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
//!
//! A scrollable flex container owns a scrollable viewport: it reserves room
//! for scrollbars, detects when auto scrollbars appear or disappear, and
//! forces another reflow pass when they do. Auto scrollbars must not be
//! enabled while the base algorithm still expects another pass, since
//! content may shrink in that pass and remove the need for them.

use crate::container::{FinishedLayout, FlexContainer, FlexPass, ScrollExtras, SizeInput};
use crate::engine::{LayoutInfo, LayoutResult};
use crate::geometry::LayoutCoord;
use crate::style::{ContainerStyle, Overflow};

/// Default scrollbar thickness when the host toolkit supplies none.
const DEFAULT_SCROLLBAR_SIZE: LayoutCoord = 16;

/// A flex container with a scrollable viewport.
#[derive(Debug)]
pub struct ScrollableFlexContainer {
    flex: FlexContainer,
    /// Scrollbar thickness reported by the widget toolkit.
    scrollbar_size: LayoutCoord,
    /// Current horizontal scrollbar reservation (its height).
    hor_scrollbar_height: LayoutCoord,
    /// Current vertical scrollbar reservation (its width).
    ver_scrollbar_width: LayoutCoord,
    /// While set, auto scrollbars may be added but never removed; cleared
    /// on externally triggered layout changes.
    lock_auto_scrollbars: bool,
}

impl Default for ScrollableFlexContainer {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBAR_SIZE)
    }
}

impl ScrollableFlexContainer {
    /// Create a scrollable container with the given scrollbar thickness.
    #[must_use]
    pub fn new(scrollbar_size: LayoutCoord) -> Self {
        Self {
            flex: FlexContainer::new(),
            scrollbar_size,
            hor_scrollbar_height: 0,
            ver_scrollbar_width: 0,
            lock_auto_scrollbars: false,
        }
    }

    /// The wrapped flex container.
    #[must_use]
    pub fn container(&self) -> &FlexContainer {
        &self.flex
    }

    /// Mutable access to the wrapped flex container (item management).
    pub fn container_mut(&mut self) -> &mut FlexContainer {
        &mut self.flex
    }

    /// Current horizontal scrollbar height reservation.
    #[must_use]
    pub fn hor_scrollbar_height(&self) -> LayoutCoord {
        self.hor_scrollbar_height
    }

    /// Current vertical scrollbar width reservation.
    #[must_use]
    pub fn ver_scrollbar_width(&self) -> LayoutCoord {
        self.ver_scrollbar_width
    }

    /// Invalidate min/max widths; also unlocks auto scrollbar removal.
    pub fn clear_min_max_width(&mut self) {
        self.flex.clear_min_max_width();
        self.lock_auto_scrollbars = false;
    }

    /// Extra width that should be added to min/max widths to make room for
    /// a vertical scrollbar. This is very simplistic; may have to become
    /// smarter about 'auto' in the future.
    #[must_use]
    pub fn extra_min_max_width(&self, style: &ContainerStyle) -> LayoutCoord {
        if style.overflow_y.is_scrollable() {
            self.scrollbar_size
        } else {
            0
        }
    }

    /// Extra height that should be added to the minimum height to make
    /// room for a horizontal scrollbar.
    #[must_use]
    pub fn extra_min_height(&self, style: &ContainerStyle) -> LayoutCoord {
        if style.overflow_x.is_scrollable() {
            self.scrollbar_size
        } else {
            0
        }
    }

    fn extras(&self, style: &ContainerStyle) -> ScrollExtras {
        ScrollExtras {
            extra_min_max_width: self.extra_min_max_width(style),
            extra_min_height: self.extra_min_height(style),
            hor_scrollbar_height: self.hor_scrollbar_height,
            ver_scrollbar_width: self.ver_scrollbar_width,
        }
    }

    /// Cheap width recomputation; see [`FlexContainer::compute_size`].
    pub fn compute_size(&mut self, style: &ContainerStyle, input: &SizeInput) -> bool {
        self.flex.compute_size(style, input)
    }

    /// Run one layout pass with the current scrollbar reservations.
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from the base layout.
    pub fn layout(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
    ) -> LayoutResult<FlexPass> {
        if info.external_layout_change {
            /* It wasn't the layout engine itself that requested this reflow
            pass, so it's safe to allow removal of scrollbars. */
            self.lock_auto_scrollbars = false;
        }

        let extras = self.extras(style);
        self.flex.layout_with_scrollbars(style, input, info, extras)
    }

    /// Finalize the pass, then add or remove scrollbars as appropriate.
    /// Scrollbars appearing or disappearing forces another reflow pass.
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from the base finalization.
    pub fn finish_layout(
        &mut self,
        style: &ContainerStyle,
        input: &SizeInput,
        info: &mut LayoutInfo<'_>,
        pass: Option<FlexPass>,
    ) -> LayoutResult<FinishedLayout> {
        let had_pass = pass.is_some();
        let extras = self.extras(style);
        let mut finished = self
            .flex
            .finish_layout_with_extras(style, input, info, pass, extras)?;

        if !had_pass {
            return Ok(finished);
        }

        /* This is a good time to calculate the need for scrollbars, because
        now we know if the flex algorithm requires another reflow pass, and
        auto scrollbars should only be applied if it doesn't require that. */
        if self.calculate_scrollbars(style) {
            // Scrollbars appeared or disappeared; need reflow.
            info.host.request_reflow();
            self.flex.flags.needs_reflow = true;
            finished.needs_reflow = true;
        }

        Ok(finished)
    }

    /// Decide scrollbar presence from the laid-out content. Returns true
    /// when visibility changed.
    fn calculate_scrollbars(&mut self, style: &ContainerStyle) -> bool {
        if self.flex.needs_reflow() {
            /* There'll be another reflow pass, so wait before we enable
            auto scrollbars, since content may shrink in the next pass, and
            thus remove the need for them. */
            self.lock_auto_scrollbars = true;
        }

        let (content_right, content_bottom) = self.content_extent();
        let inner_width =
            self.flex.width() - style.border.horizontal() - self.ver_scrollbar_width;
        let inner_height =
            self.flex.height() - style.border.vertical() - self.hor_scrollbar_height;

        let ver_scrollbar_width = self.axis_scrollbar(
            style.overflow_y,
            self.ver_scrollbar_width,
            content_bottom > inner_height,
        );
        let hor_scrollbar_height = self.axis_scrollbar(
            style.overflow_x,
            self.hor_scrollbar_height,
            content_right > inner_width,
        );

        let changed = ver_scrollbar_width != self.ver_scrollbar_width
            || hor_scrollbar_height != self.hor_scrollbar_height;

        self.ver_scrollbar_width = ver_scrollbar_width;
        self.hor_scrollbar_height = hor_scrollbar_height;

        changed
    }

    fn axis_scrollbar(
        &self,
        overflow: Overflow,
        current: LayoutCoord,
        overflows: bool,
    ) -> LayoutCoord {
        match overflow {
            Overflow::Scroll => self.scrollbar_size,
            Overflow::Auto => {
                if overflows {
                    self.scrollbar_size
                } else if self.lock_auto_scrollbars {
                    // Keep whatever we have; removal waits for an external
                    // layout change.
                    current
                } else {
                    0
                }
            }
            Overflow::Visible | Overflow::Hidden => 0,
        }
    }

    /// Right/bottom extent of the laid-out items, relative to the border
    /// box.
    fn content_extent(&self) -> (LayoutCoord, LayoutCoord) {
        let vertical = self.flex.is_vertical();
        let mut right: LayoutCoord = 0;
        let mut bottom: LayoutCoord = 0;

        for item in self.flex.items().iter_logical() {
            let rect = item.margin_rect(vertical);
            right = right.max(rect.right());
            bottom = bottom.max(rect.bottom());
        }

        (right, bottom)
    }
}
