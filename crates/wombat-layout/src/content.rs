//! The seam between flex items and the generic box tree.
//!
//! Each flex item wraps a piece of content owned by the generic layout
//! engine (a block container, a replaced element, a nested flex container).
//! The flex algorithm only needs the narrow surface captured by
//! [`ItemContent`]: lay the content out under imposed constraints and
//! report the intrinsic measurements the container aggregates.
//!
//! [`BlockContent`] is a self-contained implementation with fixed intrinsic
//! widths and a simple height model, used by tests and the headless driver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::container::FlexContainer;
use crate::engine::{LayoutInfo, LayoutResult};
use crate::geometry::LayoutCoord;

/// Sizes imposed on an item's content for one layout of that content.
///
/// [§ 9.5 Cross Sizing](https://www.w3.org/TR/css-flexbox-1/#algo-cross-item)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemConstraints {
    /// Border-box width the content must lay out at.
    pub border_box_width: LayoutCoord,

    /// Border-box height imposed by flexing/stretching; `None` lets the
    /// content find its natural height.
    pub border_box_height: Option<LayoutCoord>,

    /// Containing block width, for percentage resolution inside the
    /// content.
    pub containing_width: LayoutCoord,

    /// Containing block height, if definite.
    pub containing_height: Option<LayoutCoord>,

    /// True when the imposing container's main axis is vertical.
    pub parent_is_vertical: bool,
}

/// Measurements reported back by an item's content after it laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMetrics {
    /// Border-box height the content ended up with (honoring any imposed
    /// height).
    pub content_height: LayoutCoord,

    /// Border-box height the content would have with `height: auto` at the
    /// imposed width.
    pub natural_height: LayoutCoord,

    /// Intrinsic minimum (min-content) border-box width.
    pub min_content_width: LayoutCoord,

    /// Intrinsic maximum (max-content) border-box width.
    pub max_content_width: LayoutCoord,

    /// Intrinsic minimum border-box height.
    pub min_height: LayoutCoord,

    /// First baseline, measured from the border-box top; `None` when the
    /// content has no baseline (e.g. an empty block or a replaced element).
    pub baseline: Option<LayoutCoord>,

    /// Hypothetical border-box height propagated by a nested flex
    /// container; other content leaves this `None` and the item derives the
    /// hypothetical height itself.
    pub hypothetical_height: Option<LayoutCoord>,
}

/// Content of one flex item, owned by the generic box tree.
///
/// The flex container drives this during step 11 of its layout pass; the
/// returned [`ItemMetrics`] feed next-pass line estimation and min/max
/// width propagation.
pub trait ItemContent: fmt::Debug {
    /// Lay out the content under the given constraints.
    ///
    /// # Errors
    ///
    /// Propagates `LayoutError::OutOfMemory` from the content's own layout.
    fn layout(
        &mut self,
        constraints: &ItemConstraints,
        info: &mut LayoutInfo<'_>,
    ) -> LayoutResult<ItemMetrics>;

    /// Capability query: the nested flex container behind this content, if
    /// the content establishes one. The ancestor engine uses this instead
    /// of downcasting through a class hierarchy.
    fn as_flex(&mut self) -> Option<&mut FlexContainer> {
        None
    }
}

/// Height model for [`BlockContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeightBasis {
    /// The content is `height` pixels tall at any width.
    Fixed(LayoutCoord),
    /// Text-like content: height grows as width shrinks, covering a fixed
    /// area (`height = ceil(area / width)`).
    Area(i64),
}

/// A stand-in for ordinary block content: fixed intrinsic widths plus a
/// fixed-or-area height model.
///
/// Real engines plug their block container here; tests and the headless
/// driver use this directly, the same way an approximate font metrics
/// implementation stands in for a real text shaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContent {
    /// Min-content border-box width.
    pub min_width: LayoutCoord,

    /// Max-content border-box width.
    pub max_width: LayoutCoord,

    /// Natural height model.
    pub height: HeightBasis,

    /// Baseline offset from the border-box top, if the content has one.
    #[serde(default)]
    pub baseline: Option<LayoutCoord>,
}

impl BlockContent {
    /// Fixed-size content: both intrinsic widths equal to `width`, fixed
    /// `height`.
    #[must_use]
    pub const fn fixed(width: LayoutCoord, height: LayoutCoord) -> Self {
        Self {
            min_width: width,
            max_width: width,
            height: HeightBasis::Fixed(height),
            baseline: None,
        }
    }

    fn natural_height_at(&self, width: LayoutCoord) -> LayoutCoord {
        match self.height {
            HeightBasis::Fixed(height) => height,
            HeightBasis::Area(area) => {
                let width = i64::from(width.max(1));
                LayoutCoord::try_from((area + width - 1) / width)
                    .unwrap_or(crate::geometry::LAYOUT_COORD_MAX)
            }
        }
    }
}

impl ItemContent for BlockContent {
    fn layout(
        &mut self,
        constraints: &ItemConstraints,
        _info: &mut LayoutInfo<'_>,
    ) -> LayoutResult<ItemMetrics> {
        let natural_height = self.natural_height_at(constraints.border_box_width);

        Ok(ItemMetrics {
            content_height: constraints.border_box_height.unwrap_or(natural_height),
            natural_height,
            min_content_width: self.min_width,
            max_content_width: self.max_width,
            min_height: self.natural_height_at(self.min_width),
            baseline: self.baseline,
            hypothetical_height: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_height_grows_as_width_shrinks() {
        let content = BlockContent {
            min_width: 10,
            max_width: 100,
            height: HeightBasis::Area(1000),
            baseline: None,
        };
        assert_eq!(content.natural_height_at(100), 10);
        assert_eq!(content.natural_height_at(50), 20);
        assert_eq!(content.natural_height_at(30), 34); // rounded up
    }
}
