//! Integration tests for the flex layout algorithm.
//!
//! [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)

use wombat_layout::{
    AlignContent, AlignSelf, AutoOr, BlockContent, ContainerStyle, Direction, FlexContainer,
    HeightBasis, ItemStyle, JustifyContent, LayoutInfo, NoPagination, ScrollableFlexContainer,
    SizeInput, SizeValue, Visibility, Wrap,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Helper: run the reflow loop until the engine stops requesting passes.
/// The first pass counts as an externally triggered layout change.
fn layout_until_stable(container: &mut FlexContainer, style: &ContainerStyle, input: &SizeInput) {
    let mut host = NoPagination::default();
    let mut external = true;

    for _ in 0..8 {
        let mut info = LayoutInfo::new(&mut host);
        info.external_layout_change = external;
        external = false;

        let _ = container.compute_size(style, input);
        let pass = container
            .layout(style, input, &mut info)
            .expect("layout pass should succeed");
        let finished = container
            .finish_layout(style, input, &mut info, Some(pass))
            .expect("finishing layout should succeed");

        if !finished.needs_reflow {
            return;
        }
    }

    panic!("layout did not settle within the pass budget");
}

/// Helper: an item style with the given flex factors and preferred main
/// size.
fn flex_item(grow: f32, shrink: f32, basis: SizeValue) -> ItemStyle {
    ItemStyle {
        flex_grow: grow,
        flex_shrink: shrink,
        preferred_main_size: basis,
        ..ItemStyle::default()
    }
}

/// Helper: content with zero intrinsic widths (so `min-size: auto` never
/// interferes with flexing) and a fixed natural height.
fn zero_content(height: i32) -> Box<BlockContent> {
    Box::new(BlockContent {
        min_width: 0,
        max_width: 0,
        height: HeightBasis::Fixed(height),
        baseline: None,
    })
}

/// Helper: fixed-size content.
fn fixed_content(width: i32, height: i32) -> Box<BlockContent> {
    Box::new(BlockContent::fixed(width, height))
}

/// Helper: a horizontal container with a fixed width.
fn row_style(width: i32) -> ContainerStyle {
    ContainerStyle {
        width: SizeValue::Px(width),
        ..ContainerStyle::default()
    }
}

// ---------------------------------------------------------------------------
// Resolving flexible lengths
//
// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
// ---------------------------------------------------------------------------

/// Three items with `flex-grow: 1` and `flex-basis: 0` split a 300px
/// container evenly.
#[test]
fn test_equal_grow_distribution() {
    let mut container = FlexContainer::new();
    for _ in 0..3 {
        let _ = container.add_item(flex_item(1.0, 1.0, SizeValue::Px(0)), zero_content(20));
    }

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    for i in 0..3 {
        let rect = container.item_border_rect(i);
        assert_eq!(rect.width, 100, "item {i} should get a third of the space");
        assert_eq!(rect.x, 100 * i as i32);
    }
}

/// Distributed extra space sums exactly to the free space, even when the
/// division doesn't come out even (the cumulative-fraction technique hands
/// rounding remainders to later items).
#[test]
fn test_grow_distribution_conserves_space() {
    let mut container = FlexContainer::new();
    for grow in [1.0, 2.0, 3.0] {
        let _ = container.add_item(flex_item(grow, 1.0, SizeValue::Px(10)), zero_content(20));
    }

    let style = row_style(317);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    let total: i32 = (0..3).map(|i| container.item_border_rect(i).width).sum();
    assert_eq!(total, 317, "no space may be lost to rounding");

    for i in 0..3 {
        assert!(container.item_border_rect(i).width >= 10);
    }
}

/// Two items with equal base sizes shrink by equal amounts.
#[test]
fn test_proportional_shrink() {
    let mut container = FlexContainer::new();
    for _ in 0..2 {
        let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(80)), zero_content(20));
    }

    let style = row_style(100);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).width, 50);
    assert_eq!(container.item_border_rect(1).width, 50);
}

/// A min-main-size violation freezes the clamped item and redistributes the
/// remaining negative space over the others.
#[test]
fn test_shrink_respects_min_and_redistributes() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(80)), zero_content(20));

    let mut constrained = flex_item(0.0, 1.0, SizeValue::Px(80));
    constrained.min_main_size = AutoOr::Px(70);
    let _ = container.add_item(constrained, zero_content(20));

    let style = row_style(100);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    // Unconstrained shrinking would give 50/50; the min on the second item
    // freezes it at 70 and the first absorbs the rest.
    assert_eq!(container.item_border_rect(0).width, 30);
    assert_eq!(container.item_border_rect(1).width, 70);

    // The line still fills the container exactly.
    let total: i32 = (0..2).map(|i| container.item_border_rect(i).width).sum();
    assert_eq!(total, 100);
}

/// A max-main-size violation during growing excludes the item from further
/// distribution.
#[test]
fn test_grow_respects_max_and_redistributes() {
    let mut container = FlexContainer::new();
    let mut capped = flex_item(1.0, 1.0, SizeValue::Px(0));
    capped.max_main_size = Some(90);
    let _ = container.add_item(capped, zero_content(20));
    let _ = container.add_item(flex_item(1.0, 1.0, SizeValue::Px(0)), zero_content(20));

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).width, 90);
    assert_eq!(container.item_border_rect(1).width, 210);
}

/// The flex base size resolves percentages against the containing block.
#[test]
fn test_percent_flex_basis() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Percent(0.25)), zero_content(20));

    let style = row_style(200);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).width, 50);
}

/// An unresolvable percentage (indefinite containing block) behaves as
/// `auto`: a vertical item falls back to its hypothetical height.
#[test]
fn test_percent_basis_unresolvable_falls_back() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(
        flex_item(0.0, 1.0, SizeValue::Percent(0.5)),
        fixed_content(30, 40),
    );

    let style = ContainerStyle {
        direction: Direction::Column,
        ..ContainerStyle::default()
    };
    let input = SizeInput::block(200);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).height, 40);
}

// ---------------------------------------------------------------------------
// Cross sizing and alignment
//
// [§ 8.3 'align-self'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
// [§ 9.4 Cross Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-cross-line)
// ---------------------------------------------------------------------------

/// A single line always takes the container's full cross size, regardless
/// of 'align-content'.
#[test]
fn test_single_line_cross_size_matches_container() {
    for align_content in [
        AlignContent::Stretch,
        AlignContent::FlexEnd,
        AlignContent::SpaceAround,
    ] {
        let mut container = FlexContainer::new();
        let _ = container.add_item(ItemStyle::default(), fixed_content(50, 20));

        let style = ContainerStyle {
            height: SizeValue::Px(80),
            align_content,
            ..row_style(300)
        };
        let input = SizeInput::block(400);
        layout_until_stable(&mut container, &style, &input);

        assert_eq!(
            container.lines()[0].cross_size(),
            80,
            "single line must fill the container for {align_content:?}"
        );
    }
}

/// `align-self: stretch` grows an auto-height item to the line's cross
/// size.
#[test]
fn test_align_self_stretch_fills_line() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(ItemStyle::default(), fixed_content(50, 20));

    let style = ContainerStyle {
        height: SizeValue::Px(80),
        ..row_style(300)
    };
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).height, 80);
}

/// Stretching past the item's normal size is still clamped by its max
/// cross size.
#[test]
fn test_align_self_stretch_clamped_by_max() {
    let mut container = FlexContainer::new();
    let mut style_item = ItemStyle::default();
    style_item.max_cross_size = Some(60);
    let _ = container.add_item(style_item, fixed_content(50, 30));

    let style = ContainerStyle {
        height: SizeValue::Px(100),
        ..row_style(300)
    };
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).height, 60);
}

/// `flex-end` and `center` position items inside the line.
#[test]
fn test_align_self_end_and_center() {
    let mut container = FlexContainer::new();

    let mut end_item = ItemStyle::default();
    end_item.preferred_cross_size = SizeValue::Px(20);
    end_item.align_self = AlignSelf::FlexEnd;
    let _ = container.add_item(end_item, fixed_content(50, 20));

    let mut center_item = ItemStyle::default();
    center_item.preferred_cross_size = SizeValue::Px(20);
    center_item.align_self = AlignSelf::Center;
    let _ = container.add_item(center_item, fixed_content(50, 20));

    let style = ContainerStyle {
        height: SizeValue::Px(100),
        ..row_style(300)
    };
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).y, 80);
    assert_eq!(container.item_border_rect(1).y, 40);
}

/// Baseline-aligned items line up on their baselines; the line grows to
/// hold the union of above/below-baseline extents.
#[test]
fn test_baseline_alignment() {
    let mut container = FlexContainer::new();

    let mut first = ItemStyle::default();
    first.align_self = AlignSelf::Baseline;
    let _ = container.add_item(
        first,
        Box::new(BlockContent {
            min_width: 50,
            max_width: 50,
            height: HeightBasis::Fixed(30),
            baseline: Some(20),
        }),
    );

    let mut second = ItemStyle::default();
    second.align_self = AlignSelf::Baseline;
    let _ = container.add_item(
        second,
        Box::new(BlockContent {
            min_width: 50,
            max_width: 50,
            height: HeightBasis::Fixed(40),
            baseline: Some(10),
        }),
    );

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    // Baselines meet 20px below the line top: the first item sits at 0,
    // the second is pushed down by 10.
    assert_eq!(container.item_border_rect(0).y, 0);
    assert_eq!(container.item_border_rect(1).y, 10);

    // Above-baseline max (20) + below-baseline max (30).
    assert_eq!(container.height(), 50);

    // The container's own baseline is the shared one.
    assert_eq!(container.baseline(), 20);
}

// ---------------------------------------------------------------------------
// Main-axis alignment
//
// [§ 8.1 Aligning with auto margins](https://www.w3.org/TR/css-flexbox-1/#auto-margins)
// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
// ---------------------------------------------------------------------------

/// Auto margins on both sides split the extra space evenly, centering the
/// item.
#[test]
fn test_auto_margins_center_item() {
    let mut container = FlexContainer::new();
    let mut item = flex_item(0.0, 1.0, SizeValue::Px(100));
    item.margin.left = AutoOr::Auto;
    item.margin.right = AutoOr::Auto;
    let _ = container.add_item(item, zero_content(20));

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    let rect = container.item_border_rect(0);
    assert_eq!(rect.x, 100, "both auto margins get an equal share");
    assert_eq!(rect.width, 100);
}

/// A single auto margin absorbs all of the extra space.
#[test]
fn test_single_auto_margin_takes_all_space() {
    let mut container = FlexContainer::new();
    let mut item = flex_item(0.0, 1.0, SizeValue::Px(100));
    item.margin.left = AutoOr::Auto;
    let _ = container.add_item(item, zero_content(20));

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).x, 200);
}

/// `justify-content` distributes leftover space between inflexible items.
#[test]
fn test_justify_content_keywords() {
    let cases = [
        (JustifyContent::FlexStart, vec![0, 50]),
        (JustifyContent::FlexEnd, vec![200, 250]),
        (JustifyContent::Center, vec![100, 150]),
        (JustifyContent::SpaceBetween, vec![0, 250]),
        (JustifyContent::SpaceAround, vec![50, 200]),
    ];

    for (justify_content, expected) in cases {
        let mut container = FlexContainer::new();
        for _ in 0..2 {
            let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(50)), zero_content(20));
        }

        let style = ContainerStyle {
            justify_content,
            ..row_style(300)
        };
        let input = SizeInput::block(400);
        layout_until_stable(&mut container, &style, &input);

        let xs: Vec<i32> = (0..2).map(|i| container.item_border_rect(i).x).collect();
        assert_eq!(xs, expected, "positions for {justify_content:?}");
    }
}

// ---------------------------------------------------------------------------
// Line wrapping
//
// [§ 9.3 Main Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-main-container)
// ---------------------------------------------------------------------------

/// A vertical wrap container breaks to a new line when the next item's
/// hypothetical size would overflow the fixed height.
#[test]
fn test_vertical_wrap_divides_lines() {
    let mut container = FlexContainer::new();
    for _ in 0..3 {
        let mut item = ItemStyle::default();
        item.max_cross_size = Some(30);
        let _ = container.add_item(item, fixed_content(30, 40));
    }

    let style = ContainerStyle {
        direction: Direction::Column,
        wrap: Wrap::Wrap,
        height: SizeValue::Px(100),
        align_content: AlignContent::FlexStart,
        ..ContainerStyle::default()
    };
    let input = SizeInput::block(200);
    layout_until_stable(&mut container, &style, &input);

    // 40 + 40 fits in 100; the third 40 does not.
    assert_eq!(container.lines().len(), 2);

    assert_eq!(container.item_border_rect(0).y, 0);
    assert_eq!(container.item_border_rect(1).y, 40);

    // The wrapped item starts a new column to the right.
    assert_eq!(container.item_border_rect(2).y, 0);
    assert_eq!(container.item_border_rect(2).x, 30);
    assert_eq!(container.lines()[1].cross_position(), 30);
}

/// `wrap-reverse` mirrors the line stacking direction.
#[test]
fn test_wrap_reverse_mirrors_lines() {
    let mut container = FlexContainer::new();
    for _ in 0..2 {
        let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(60)), zero_content(20));
    }

    let style = ContainerStyle {
        wrap: Wrap::WrapReverse,
        ..row_style(100)
    };
    let input = SizeInput::block(200);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.lines().len(), 2);

    // The first line lands at the bottom, the second on top.
    assert_eq!(container.item_border_rect(0).y, 20);
    assert_eq!(container.item_border_rect(1).y, 0);
}

/// `row-reverse` mirrors item progression along the main axis.
#[test]
fn test_row_reverse_mirrors_items() {
    let mut container = FlexContainer::new();
    for _ in 0..2 {
        let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(50)), zero_content(20));
    }

    let style = ContainerStyle {
        direction: Direction::RowReverse,
        ..row_style(300)
    };
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(0).x, 250);
    assert_eq!(container.item_border_rect(1).x, 200);
}

/// A wrappable vertical flexbox with indefinite height cannot know where
/// lines end; intrinsic sizing assumes one item per line so the box always
/// becomes wide enough.
#[test]
fn test_indefinite_vertical_wrap_assumes_one_item_per_line() {
    let mut container = FlexContainer::new();
    for _ in 0..2 {
        let _ = container.add_item(ItemStyle::default(), fixed_content(30, 40));
    }

    let style = ContainerStyle {
        direction: Direction::Column,
        wrap: Wrap::Wrap,
        height: SizeValue::Percent(0.5),
        ..ContainerStyle::default()
    };
    let input = SizeInput::block(200);
    layout_until_stable(&mut container, &style, &input);

    // Minimum width is the sum of the items' widths, not their maximum.
    let (min_width, max_width) = container.min_max_width();
    assert_eq!(min_width, 60);
    assert_eq!(max_width, 60);

    // Minimum height, though, is just the tallest single item.
    assert_eq!(container.min_height(), 40);
}

// ---------------------------------------------------------------------------
// The 'order' property
//
// [§ 5.4 'order'](https://www.w3.org/TR/css-flexbox-1/#order-property)
// ---------------------------------------------------------------------------

/// Paint/flex order follows ascending `order` (stable on ties), while
/// logical iteration keeps document order.
#[test]
fn test_order_reorders_layout_but_not_logical_walk() {
    let mut container = FlexContainer::new();
    for order in [2, -5, 0] {
        let mut item = flex_item(0.0, 1.0, SizeValue::Px(50));
        item.order = order;
        let _ = container.add_item(item, zero_content(20));
    }

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    // Flex order: orders -5, 0, 2 → logical indices 1, 2, 0.
    assert_eq!(container.items().flex_sequence(), &[1, 2, 0]);

    // Main-axis positions follow the flex order.
    assert_eq!(container.item_border_rect(1).x, 0);
    assert_eq!(container.item_border_rect(2).x, 50);
    assert_eq!(container.item_border_rect(0).x, 100);

    // The logical walk is untouched.
    let orders: Vec<i32> = container.items().iter_logical().map(|i| i.order()).collect();
    assert_eq!(orders, vec![2, -5, 0]);
}

// ---------------------------------------------------------------------------
// visibility: collapse
// ---------------------------------------------------------------------------

/// A collapsed item contributes zero size everywhere but reappears once its
/// visibility changes back and another pass runs.
#[test]
fn test_visibility_collapse_and_reappear() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(50)), zero_content(20));

    let mut collapsed = flex_item(0.0, 1.0, SizeValue::Px(50));
    collapsed.visibility = Visibility::Collapse;
    let _ = container.add_item(collapsed.clone(), zero_content(20));

    let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(50)), zero_content(20));

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(1).width, 0);
    assert_eq!(container.item_border_rect(0).x, 0);
    assert_eq!(container.item_border_rect(2).x, 50, "collapsed item leaves no gap");

    // Make it visible again; the next passes resume its size.
    let mut visible = collapsed;
    visible.visibility = Visibility::Visible;
    container.items_mut().set_style(1, visible);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(1).width, 50);
    assert_eq!(container.item_border_rect(2).x, 100);
}

/// Collapsing while disallowed schedules another pass instead.
#[test]
fn test_collapse_disallowed_requests_reflow() {
    let mut container = FlexContainer::new();
    let mut collapsed = ItemStyle::default();
    collapsed.visibility = Visibility::Collapse;
    let _ = container.add_item(collapsed, fixed_content(50, 20));

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    let mut host = NoPagination::default();
    let mut info = LayoutInfo::new(&mut host);
    info.external_layout_change = true;
    info.allow_visibility_collapse = false;

    let _ = container.compute_size(&style, &input);
    let pass = container.layout(&style, &input, &mut info).expect("layout");
    let finished = container
        .finish_layout(&style, &input, &mut info, Some(pass))
        .expect("finish");

    assert!(finished.needs_reflow);
    assert!(host.reflow_requested);
}

// ---------------------------------------------------------------------------
// Idempotence and multi-pass convergence
// ---------------------------------------------------------------------------

/// Re-running layout with unchanged inputs produces identical geometry;
/// this is the basis of the needs-reflow termination guarantee.
#[test]
fn test_layout_is_idempotent() {
    let mut container = FlexContainer::new();
    for grow in [1.0, 2.0] {
        let _ = container.add_item(flex_item(grow, 1.0, SizeValue::Px(30)), fixed_content(40, 25));
    }

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    let before: Vec<_> = (0..2).map(|i| container.item_border_rect(i)).collect();

    let mut host = NoPagination::default();
    for _ in 0..3 {
        let mut info = LayoutInfo::new(&mut host);
        let _ = container.compute_size(&style, &input);
        let pass = container.layout(&style, &input, &mut info).expect("layout");
        let finished = container
            .finish_layout(&style, &input, &mut info, Some(pass))
            .expect("finish");
        assert!(!finished.needs_reflow, "stable layout must not drift");
    }

    let after: Vec<_> = (0..2).map(|i| container.item_border_rect(i)).collect();
    assert_eq!(before, after);
}

/// Text-like content (height driven by width) converges within the pass
/// budget.
#[test]
fn test_area_content_converges() {
    let mut container = FlexContainer::new();
    for _ in 0..2 {
        let _ = container.add_item(
            flex_item(1.0, 1.0, SizeValue::Px(0)),
            Box::new(BlockContent {
                min_width: 20,
                max_width: 200,
                height: HeightBasis::Area(3000),
                baseline: None,
            }),
        );
    }

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    // 150px wide each → ceil(3000 / 150) = 20px tall.
    assert_eq!(container.item_border_rect(0).width, 150);
    assert_eq!(container.item_border_rect(0).height, 20);
}

// ---------------------------------------------------------------------------
// Absolutely positioned placeholders
//
// [§ 4.1 Absolutely-Positioned Flex Children](https://www.w3.org/TR/css-flexbox-1/#abspos-items)
// ---------------------------------------------------------------------------

/// An abspos placeholder inherits the static position of the next in-flow
/// sibling on its line.
#[test]
fn test_abspos_placeholder_follows_next_sibling() {
    let mut container = FlexContainer::new();

    let mut placeholder = ItemStyle::default();
    placeholder.is_abspos_placeholder = true;
    let _ = container.add_item(placeholder, fixed_content(0, 0));

    let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(50)), zero_content(20));

    let style = ContainerStyle {
        justify_content: JustifyContent::FlexEnd,
        ..row_style(300)
    };
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(1).x, 250);
    let placeholder_rect = container.item_border_rect(0);
    assert_eq!(placeholder_rect.x, 250, "placeholder snaps to the in-flow sibling");
    assert_eq!(placeholder_rect.width, 0);
}

/// A trailing abspos placeholder lands after the last in-flow item.
#[test]
fn test_trailing_abspos_placeholder() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(flex_item(0.0, 1.0, SizeValue::Px(50)), zero_content(20));

    let mut placeholder = ItemStyle::default();
    placeholder.is_abspos_placeholder = true;
    let _ = container.add_item(placeholder, fixed_content(0, 0));

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.item_border_rect(1).x, 50);
}

// ---------------------------------------------------------------------------
// Nested flex containers
// ---------------------------------------------------------------------------

/// A nested flexbox receives its flexed size from the parent and propagates
/// its hypothetical height back up.
#[test]
fn test_nested_flexbox_height_propagation() {
    use wombat_layout::NestedFlexContainer;

    let mut inner = FlexContainer::new();
    for _ in 0..2 {
        let _ = inner.add_item(ItemStyle::default(), fixed_content(40, 30));
    }

    let inner_style = ContainerStyle {
        direction: Direction::Column,
        ..ContainerStyle::default()
    };

    let mut container = FlexContainer::new();
    let _ = container.add_item(
        ItemStyle::default(),
        Box::new(NestedFlexContainer::new(inner_style, inner)),
    );

    let style = row_style(300);
    let input = SizeInput::block(400);
    layout_until_stable(&mut container, &style, &input);

    // The column stacks two 30px children; the parent's auto height picks
    // that up through the propagated hypothetical height.
    assert_eq!(container.height(), 60);

    let item_rect = container.item_border_rect(0);
    assert_eq!(item_rect.width, 40);
    assert_eq!(item_rect.height, 60);

    let nested = container.item_as_flex(0).expect("item content is a flexbox");
    assert_eq!(nested.item_border_rect(0).width, 40);
    assert_eq!(nested.item_border_rect(1).y, 30);
}

// ---------------------------------------------------------------------------
// Intrinsic sizing and shrink-to-fit
// ---------------------------------------------------------------------------

/// A shrink-to-fit container clamps the available width to its accumulated
/// min/max content widths.
#[test]
fn test_shrink_to_fit_width() {
    let mut container = FlexContainer::new();
    let _ = container.add_item(ItemStyle::default(), fixed_content(150, 20));

    let style = ContainerStyle {
        is_shrink_to_fit: true,
        ..ContainerStyle::default()
    };
    let input = SizeInput::block(500);
    layout_until_stable(&mut container, &style, &input);

    assert_eq!(container.width(), 150);
    let (min_width, max_width) = container.min_max_width();
    assert_eq!(min_width, 150);
    assert_eq!(max_width, 150);
}

// ---------------------------------------------------------------------------
// Scrollable containers
// ---------------------------------------------------------------------------

/// Overflowing content on an `overflow-y: auto` container makes a vertical
/// scrollbar appear, which forces (and survives) another reflow pass.
#[test]
fn test_scrollbar_feedback_loop() {
    let mut scrollable = ScrollableFlexContainer::new(15);
    let _ = scrollable
        .container_mut()
        .add_item(ItemStyle::default(), fixed_content(100, 80));

    let style = ContainerStyle {
        height: SizeValue::Px(50),
        overflow_y: wombat_layout::Overflow::Auto,
        ..row_style(200)
    };
    let input = SizeInput::block(400);

    let mut host = NoPagination::default();
    let mut external = true;
    let mut settled = false;

    for _ in 0..8 {
        let mut info = LayoutInfo::new(&mut host);
        info.external_layout_change = external;
        external = false;

        let _ = scrollable.compute_size(&style, &input);
        let pass = scrollable.layout(&style, &input, &mut info).expect("layout");
        let finished = scrollable
            .finish_layout(&style, &input, &mut info, Some(pass))
            .expect("finish");

        if !finished.needs_reflow {
            settled = true;
            break;
        }
    }

    assert!(settled, "scrollbar feedback must converge");
    assert_eq!(scrollable.ver_scrollbar_width(), 15);
    assert_eq!(scrollable.hor_scrollbar_height(), 0);
    assert_eq!(scrollable.container().width(), 200);
}
