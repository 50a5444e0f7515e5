//! Contract between the flex algorithm and the surrounding layout engine.
//!
//! The generic reflow scheduler, pagination machinery and multicolumn
//! containers live outside this crate; layout passes reach them through
//! [`LayoutHost`] and the per-pass [`LayoutInfo`].

use thiserror::Error;

use crate::geometry::{LAYOUT_COORD_MAX, LayoutCoord};

/// Failures recognized inside the flex core.
///
/// The only failure mode is allocation failure reported by a collaborator
/// (laying out an item's content, advancing a page). It propagates
/// immediately and unconditionally; recovery policy belongs to the caller.
/// Logical inconsistencies are soft engine-limitation signals, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A collaborator ran out of memory mid-pass. Partially built line
    /// state must not be read after this.
    #[error("out of memory during layout")]
    OutOfMemory,
}

/// Result alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// State of paged-media page breaking for the current pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PagedMedia {
    /// Not laying out for paged media.
    #[default]
    Off,
    /// Page breaking is active; new implicit breaks may be inserted.
    On,
    /// Searching for a previously inserted pending break; page breaking
    /// resumes once it is found.
    Find,
}

/// Forced break classification used when propagating breakpoints to a
/// multipane (multicolumn) ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakType {
    /// A forced page break.
    Page,
    /// A forced column break.
    Column,
}

/// Description of the page the document advanced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number.
    pub number: u32,
    /// Document-relative position of the new page's top edge.
    pub top: LayoutCoord,
}

/// Callbacks into the generic layout engine.
///
/// Implemented by the reflow scheduler / document host. A trivial
/// [`NoPagination`] implementation is provided for callers that lay out
/// continuous media.
pub trait LayoutHost {
    /// Document-relative bottom of the current page.
    fn page_bottom(&self) -> LayoutCoord {
        LAYOUT_COORD_MAX
    }

    /// Advance to the next page, breaking at `virtual_y`. Returns the new
    /// page, or `LayoutError::OutOfMemory` if a page description could not
    /// be allocated.
    fn advance_page(&mut self, virtual_y: LayoutCoord) -> LayoutResult<PageInfo> {
        let _ = virtual_y;
        Err(LayoutError::OutOfMemory)
    }

    /// Propagate a forced breakpoint to an enclosing multipane container.
    fn propagate_breakpoint(&mut self, virtual_y: LayoutCoord, break_type: BreakType)
    -> LayoutResult<()> {
        let _ = (virtual_y, break_type);
        Ok(())
    }

    /// Mark the flex container dirty so the scheduler runs another reflow
    /// pass over it.
    fn request_reflow(&mut self);

    /// Tell the scheduler a pending page break was inserted; page breaking
    /// is disabled for the rest of this reflow pass.
    fn request_page_break(&mut self) {}
}

/// Pass-wide context handed into `layout`/`finish_layout`.
///
/// One `LayoutInfo` spans exactly one reflow pass; the flags on it describe
/// that pass, not the container.
pub struct LayoutInfo<'a> {
    /// Engine callbacks.
    pub host: &'a mut dyn LayoutHost,

    /// True when this pass was triggered by a DOM/style/viewport change
    /// rather than by the layout engine itself. Replenishes the container's
    /// additional-reflow budget.
    pub external_layout_change: bool,

    /// True when the container sits inside a multipane (multicolumn)
    /// container, so forced breaks propagate to it.
    pub in_multipane: bool,

    /// Page breaking state; mutated when a pending break is found during a
    /// `Find` pass.
    pub paged_media: PagedMedia,

    /// True when previously decided page breaks must be kept rather than
    /// recomputed.
    pub keep_page_breaks: bool,

    /// Whether `visibility: collapse` items may be collapsed in this pass.
    /// Collapsing during intrinsic-size discovery would corrupt min/max
    /// accumulation, so the engine only allows it once content is settled.
    pub allow_visibility_collapse: bool,
}

impl<'a> LayoutInfo<'a> {
    /// Context for an ordinary continuous-media pass.
    pub fn new(host: &'a mut dyn LayoutHost) -> Self {
        Self {
            host,
            external_layout_change: false,
            in_multipane: false,
            paged_media: PagedMedia::Off,
            keep_page_breaks: false,
            allow_visibility_collapse: true,
        }
    }
}

/// Host implementation for continuous media: no pages, no panes; reflow
/// requests are recorded so the caller can drive the pass loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPagination {
    /// Set when the flex algorithm asked for another reflow pass.
    pub reflow_requested: bool,
}

impl LayoutHost for NoPagination {
    fn request_reflow(&mut self) {
        self.reflow_requested = true;
    }
}
