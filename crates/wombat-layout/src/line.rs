//! Flex lines.
//!
//! [§ 9.3 Main Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-main-container)
//!
//! A line is a run of consecutive items in the flex-order sequence sharing
//! one cross-axis band. Lines are rebuilt from scratch at the start of
//! every layout pass; their cross geometry persists until the next pass so
//! that traversal and fragmentation can read it.

use crate::geometry::LayoutCoord;

/// Per-pass aggregates of one line, torn down when the pass finishes.
#[derive(Debug, Default)]
pub struct FlexLineState {
    /// Sum of the items' flex base sizes (margin-box).
    pub base_size_sum: LayoutCoord,
    /// Sum of the items' hypothetical main sizes (margin-box).
    pub hypothetical_size_sum: LayoutCoord,
    /// Largest cross size the line could use, recorded for items whose
    /// shrink-to-fit width resolution is deferred until line sizes are
    /// known.
    pub max_cross_size: LayoutCoord,
    /// Running maximum of item cross sizes while the line is being built.
    pub cross_space_used: LayoutCoord,
    /// Number of items on the line (absolutely positioned placeholders not
    /// included).
    pub item_count: u32,
    /// Number of 'auto' main-axis margins on the line.
    pub auto_margin_count: u32,
    /// Largest distance above the baseline among baseline-aligned items.
    pub max_above_baseline: LayoutCoord,
    /// Largest distance below the baseline among baseline-aligned items.
    pub max_below_baseline: LayoutCoord,
}

/// A run of items sharing one cross-axis position.
#[derive(Debug)]
pub struct FlexLine {
    /// Position of the line's first item in the flex-order sequence. The
    /// next line's start (or the sequence end) delimits the run.
    pub start: usize,
    /// Cross-axis margin-box size of the line.
    cross_size: LayoutCoord,
    /// Cross-axis position, relative to the container's content box.
    cross_position: LayoutCoord,
    /// Aggregates that exist only while the pass that built the line runs.
    state: Option<FlexLineState>,
}

impl FlexLine {
    /// Start a new line at the given flex-order position.
    #[must_use]
    pub fn new(start: usize) -> Self {
        Self {
            start,
            cross_size: 0,
            cross_position: 0,
            state: Some(FlexLineState::default()),
        }
    }

    /// Cross-axis size of the line.
    #[must_use]
    pub fn cross_size(&self) -> LayoutCoord {
        self.cross_size
    }

    /// Set the cross-axis size (stretching/shrinking the line).
    pub fn set_cross_size(&mut self, size: LayoutCoord) {
        self.cross_size = size;
    }

    /// Cross-axis position of the line, content-box relative.
    #[must_use]
    pub fn cross_position(&self) -> LayoutCoord {
        self.cross_position
    }

    /// Set the cross-axis position.
    pub fn set_cross_position(&mut self, position: LayoutCoord) {
        self.cross_position = position;
    }

    /// The line's per-pass aggregates.
    ///
    /// # Panics
    /// Panics if called after [`Self::finish_layout`] tore the state down;
    /// line aggregates are meaningful only within the pass that built the
    /// line.
    #[must_use]
    pub fn state(&self) -> &FlexLineState {
        self.state.as_ref().expect("line state read outside its pass")
    }

    /// Record one item's contributions while building the line.
    ///
    /// # Panics
    /// Panics outside the pass that built the line.
    pub fn add_item(
        &mut self,
        base_size: LayoutCoord,
        hypothetical_size: LayoutCoord,
        cross_size: LayoutCoord,
        auto_margin_count: u32,
    ) {
        let state = self.state.as_mut().expect("line state read outside its pass");
        state.base_size_sum += base_size;
        state.hypothetical_size_sum += hypothetical_size;
        state.auto_margin_count += auto_margin_count;
        state.item_count += 1;
        if state.cross_space_used < cross_size {
            state.cross_space_used = cross_size;
        }
    }

    /// Record a baseline-aligned item's extents above/below the baseline.
    ///
    /// # Panics
    /// Panics outside the pass that built the line.
    pub fn add_baseline(&mut self, above: LayoutCoord, below: LayoutCoord) {
        let state = self.state.as_mut().expect("line state read outside its pass");
        if state.max_above_baseline < above {
            state.max_above_baseline = above;
        }
        if state.max_below_baseline < below {
            state.max_below_baseline = below;
        }
    }

    /// Record the cross size an item could grow to if its line were wider
    /// (deferred shrink-to-fit).
    ///
    /// # Panics
    /// Panics outside the pass that built the line.
    pub fn propagate_max_cross_size(&mut self, max_cross_size: LayoutCoord) {
        let state = self.state.as_mut().expect("line state read outside its pass");
        if state.max_cross_size < max_cross_size {
            state.max_cross_size = max_cross_size;
        }
    }

    /// Close the line: no more items fit. Resolves the cross size from the
    /// item maxima and the baseline extents.
    ///
    /// # Panics
    /// Panics outside the pass that built the line.
    pub fn finish(&mut self) {
        let state = self.state.as_ref().expect("line state read outside its pass");
        let baseline_extent = state.max_above_baseline + state.max_below_baseline;
        self.cross_size = state.cross_space_used.max(baseline_extent);
    }

    /// The line's baseline position: the largest distance above the
    /// baseline among its baseline-aligned items.
    ///
    /// # Panics
    /// Panics outside the pass that built the line.
    #[must_use]
    pub fn baseline(&self) -> LayoutCoord {
        self.state().max_above_baseline
    }

    /// How much wider the line could usefully become for its deferred
    /// shrink-to-fit items.
    ///
    /// # Panics
    /// Panics outside the pass that built the line.
    #[must_use]
    pub fn max_cross_size_diff(&self) -> LayoutCoord {
        (self.state().max_cross_size - self.cross_size).max(0)
    }

    /// Tear down the per-pass aggregates; cross geometry stays readable.
    pub fn finish_layout(&mut self) {
        self.state = None;
    }
}

/// Accumulator for the line currently being registered during child
/// layout; feeds min/max width and min height propagation for the *next*
/// pass. Distinct from [`FlexLineState`], which belongs to the lines built
/// at the start of the current pass.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    /// Sum of registered items' hypothetical main sizes.
    pub hyp_main_space_used: LayoutCoord,
    /// Number of registered items on the current line.
    pub item_count: u32,
    /// Largest registered cross size (horizontal containers).
    pub cross_space_used: LayoutCoord,
    /// Largest distance above the baseline among baseline-aligned items.
    pub max_above_baseline: LayoutCoord,
    /// Largest distance below the baseline among baseline-aligned items.
    pub max_below_baseline: LayoutCoord,
    /// Largest minimum margin-box height (horizontal containers).
    pub min_height_used: LayoutCoord,
    /// Widest minimum item width on the line (vertical containers).
    pub minimum_width: LayoutCoord,
    /// Widest maximum item width on the line (vertical containers).
    pub maximum_width: LayoutCoord,
}

impl LineAccumulator {
    /// Unstretched cross size of the line as registered so far.
    #[must_use]
    pub fn cross_size(&self) -> LayoutCoord {
        self.cross_space_used
            .max(self.max_above_baseline + self.max_below_baseline)
    }

    /// Minimum height contribution of the line.
    #[must_use]
    pub fn min_height(&self) -> LayoutCoord {
        self.min_height_used
            .max(self.max_above_baseline + self.max_below_baseline)
    }

    /// Prepare for a new line.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
