//! Integration tests for page and column breaking of flex containers.
//!
//! [CSS Fragmentation Module Level 3](https://www.w3.org/TR/css-break-3/)

use wombat_layout::{
    BlockContent, BreakPolicy, BreakStatus, BreakType, Columnizer, ContainerStyle, Direction,
    FinishedLayout, FlexContainer, HeightBasis, ItemStyle, LayoutCoord, LayoutHost, LayoutInfo,
    LayoutResult, PageInfo, PagedMedia, SizeInput, SizeValue, Wrap,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Host with one page boundary: the current page ends at `page_bottom`,
/// the next page starts at `next_page_top`.
struct PagedHost {
    page_bottom: LayoutCoord,
    next_page_top: LayoutCoord,
    next_page_number: u32,
    reflow_requested: bool,
    page_break_requested: bool,
    breakpoints: Vec<(LayoutCoord, BreakType)>,
    advanced: Vec<LayoutCoord>,
}

impl PagedHost {
    fn new(page_bottom: LayoutCoord) -> Self {
        Self {
            page_bottom,
            next_page_top: page_bottom,
            next_page_number: 2,
            reflow_requested: false,
            page_break_requested: false,
            breakpoints: Vec::new(),
            advanced: Vec::new(),
        }
    }
}

impl LayoutHost for PagedHost {
    fn page_bottom(&self) -> LayoutCoord {
        self.page_bottom
    }

    fn advance_page(&mut self, virtual_y: LayoutCoord) -> LayoutResult<PageInfo> {
        self.advanced.push(virtual_y);
        Ok(PageInfo {
            number: self.next_page_number,
            top: self.next_page_top,
        })
    }

    fn propagate_breakpoint(
        &mut self,
        virtual_y: LayoutCoord,
        break_type: BreakType,
    ) -> LayoutResult<()> {
        self.breakpoints.push((virtual_y, break_type));
        Ok(())
    }

    fn request_reflow(&mut self) {
        self.reflow_requested = true;
    }

    fn request_page_break(&mut self) {
        self.page_break_requested = true;
    }
}

/// Helper: one full pass (compute size, layout, finish) under the given
/// pagination state.
fn run_pass(
    container: &mut FlexContainer,
    style: &ContainerStyle,
    input: &SizeInput,
    host: &mut PagedHost,
    paged_media: PagedMedia,
    keep_page_breaks: bool,
    in_multipane: bool,
    external: bool,
) -> FinishedLayout {
    let mut info = LayoutInfo::new(host);
    info.external_layout_change = external;
    info.paged_media = paged_media;
    info.keep_page_breaks = keep_page_breaks;
    info.in_multipane = in_multipane;

    let _ = container.compute_size(style, input);
    let pass = container
        .layout(style, input, &mut info)
        .expect("layout pass should succeed");
    container
        .finish_layout(style, input, &mut info, Some(pass))
        .expect("finishing layout should succeed")
}

/// Helper: a vertical (column) container with three 50px-tall items and
/// the given break policies applied to them.
fn column_of_three(policies: impl Fn(usize, &mut ItemStyle)) -> (FlexContainer, ContainerStyle) {
    let mut container = FlexContainer::new();
    for i in 0..3 {
        let mut style = ItemStyle::default();
        policies(i, &mut style);
        let _ = container.add_item(
            style,
            Box::new(BlockContent {
                min_width: 30,
                max_width: 30,
                height: HeightBasis::Fixed(50),
                baseline: None,
            }),
        );
    }

    let style = ContainerStyle {
        direction: Direction::Column,
        ..ContainerStyle::default()
    };

    (container, style)
}

// ---------------------------------------------------------------------------
// Implicit page breaks
// ---------------------------------------------------------------------------

/// An item overflowing the page gets an implicit break inserted before it;
/// the following pass finds the pending break and pushes the item to the
/// next page, stretching the container by the gap.
#[test]
fn test_implicit_page_break_and_relayout() {
    let (mut container, style) = column_of_three(|_, _| {});
    let input = SizeInput::block(200);
    let mut host = PagedHost::new(120);

    // Pass 1: measurement discovery, no line geometry yet.
    let _ = run_pass(
        &mut container,
        &style,
        &input,
        &mut host,
        PagedMedia::On,
        false,
        false,
        true,
    );

    // Pass 2: items sit at 0/50/100; the third one ends at 150, past the
    // 120px page bottom, so a pending break is inserted after the second.
    let _ = run_pass(
        &mut container,
        &style,
        &input,
        &mut host,
        PagedMedia::On,
        false,
        false,
        false,
    );

    assert!(host.page_break_requested);
    assert!(container.items().get(1).has_trailing_page_break());

    // Pass 3: the break-keeping pass applies the pending break.
    let _ = run_pass(
        &mut container,
        &style,
        &input,
        &mut host,
        PagedMedia::Find,
        true,
        false,
        false,
    );

    assert_eq!(host.advanced, vec![100], "page advanced at the break position");
    assert_eq!(container.item_border_rect(2).y, 120, "item moved to the next page");
    assert_eq!(container.item_border_rect(1).y, 50, "items before the break stay put");
    assert_eq!(
        container.height(),
        170,
        "the page gap stretches the container without reflexing items"
    );
}

/// Implicit break search honors `break-after: avoid` at low strengths and
/// overrides it at strength 2.
#[test]
fn test_attempt_page_break_strength_gates_avoid() {
    let avoid_after_middle = |i: usize, style: &mut ItemStyle| {
        if i == 1 {
            style.page_break_after = BreakPolicy::Avoid;
        }
    };

    // Strength 0: the avoided boundary after item 1 is skipped; the break
    // lands after item 0 instead.
    let (mut container, style) = column_of_three(avoid_after_middle);
    let input = SizeInput::block(200);
    let mut host = PagedHost::new(120);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, true);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, false);

    let mut info = LayoutInfo::new(&mut host);
    info.paged_media = PagedMedia::On;
    let status = container
        .attempt_page_break(&mut info, 0)
        .expect("attempt should succeed");
    assert_eq!(status, BreakStatus::Found);
    assert!(container.items().get(0).has_trailing_page_break());
    assert!(!container.items().get(1).has_trailing_page_break());

    // Strength 2: 'avoid' is overridden; the last fitting boundary wins.
    let (mut container, style) = column_of_three(avoid_after_middle);
    let mut host = PagedHost::new(120);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, true);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, false);

    let mut info = LayoutInfo::new(&mut host);
    info.paged_media = PagedMedia::On;
    let status = container
        .attempt_page_break(&mut info, 2)
        .expect("attempt should succeed");
    assert_eq!(status, BreakStatus::Found);
    assert!(container.items().get(1).has_trailing_page_break());
}

/// Reversed item stacking cannot be fragmented: the logical and visual
/// orders disagree.
#[test]
fn test_reversed_stacking_is_not_breakable() {
    let mut container = FlexContainer::new();
    for _ in 0..3 {
        let _ = container.add_item(ItemStyle::default(), Box::new(BlockContent::fixed(30, 50)));
    }

    let style = ContainerStyle {
        direction: Direction::ColumnReverse,
        ..ContainerStyle::default()
    };
    let input = SizeInput::block(200);
    let mut host = PagedHost::new(120);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, true);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, false);

    let mut info = LayoutInfo::new(&mut host);
    info.paged_media = PagedMedia::On;
    let status = container
        .attempt_page_break(&mut info, 3)
        .expect("attempt should succeed");
    assert_eq!(status, BreakStatus::KeepLooking);
    assert!(!host.page_break_requested);
}

// ---------------------------------------------------------------------------
// Forced breaks in multipane containers
// ---------------------------------------------------------------------------

/// A forced `break-before: page` inside a multipane ancestor is propagated
/// as a breakpoint rather than applied locally.
#[test]
fn test_forced_break_propagates_to_multipane() {
    let (mut container, style) = column_of_three(|i, item| {
        if i == 1 {
            item.page_break_before = BreakPolicy::Always;
        }
    });
    let input = SizeInput::block(200);
    let mut host = PagedHost::new(10_000);

    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, true, true);
    host.breakpoints.clear();
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, true, false);

    assert_eq!(host.breakpoints, vec![(50, BreakType::Page)]);
}

// ---------------------------------------------------------------------------
// Columnization
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum ColumnizeEvent {
    Commit,
    Allocate(LayoutCoord, usize),
    Advance(LayoutCoord),
    BreakPage(usize),
    BreakColumn(usize),
}

#[derive(Default)]
struct RecordingColumnizer {
    events: Vec<ColumnizeEvent>,
}

impl Columnizer for RecordingColumnizer {
    fn explicitly_break_page(&mut self, before_item: usize) -> bool {
        self.events.push(ColumnizeEvent::BreakPage(before_item));
        true
    }

    fn explicitly_break_column(&mut self, before_item: usize) -> bool {
        self.events.push(ColumnizeEvent::BreakColumn(before_item));
        true
    }

    fn columns_left(&self) -> u32 {
        1
    }

    fn commit_content(&mut self) -> bool {
        self.events.push(ColumnizeEvent::Commit);
        true
    }

    fn allocate_content(&mut self, virtual_y: LayoutCoord, item: usize) {
        self.events.push(ColumnizeEvent::Allocate(virtual_y, item));
    }

    fn advance_head(&mut self, virtual_y: LayoutCoord) {
        self.events.push(ColumnizeEvent::Advance(virtual_y));
    }
}

/// A horizontal wrappable flexbox columnizes line by line: each line is
/// allocated (first and last item) and the head advances past its cross
/// end.
#[test]
fn test_columnize_walks_lines() {
    let mut container = FlexContainer::new();
    for _ in 0..4 {
        let style = ItemStyle {
            preferred_main_size: SizeValue::Px(40),
            ..ItemStyle::default()
        };
        let _ = container.add_item(
            style,
            Box::new(BlockContent {
                min_width: 0,
                max_width: 0,
                height: HeightBasis::Fixed(20),
                baseline: None,
            }),
        );
    }

    let style = ContainerStyle {
        wrap: Wrap::Wrap,
        width: SizeValue::Px(100),
        ..ContainerStyle::default()
    };
    let input = SizeInput::block(200);
    let mut host = PagedHost::new(10_000);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, true);
    let _ = run_pass(&mut container, &style, &input, &mut host, PagedMedia::Off, false, false, false);

    assert_eq!(container.lines().len(), 2);

    let mut sink = RecordingColumnizer::default();
    assert!(container.columnize(&mut sink));

    assert_eq!(
        sink.events,
        vec![
            // First line: no break allowed against the leading edge.
            ColumnizeEvent::Allocate(0, 0),
            ColumnizeEvent::Allocate(0, 1),
            ColumnizeEvent::Advance(20),
            // Second line: boundary between the lines allows a column move.
            ColumnizeEvent::Commit,
            ColumnizeEvent::Allocate(20, 2),
            ColumnizeEvent::Allocate(20, 3),
            ColumnizeEvent::Advance(40),
        ]
    );
}

// ---------------------------------------------------------------------------
// Break property propagation
// ---------------------------------------------------------------------------

/// Edge break policies are stolen from the first/last children so they are
/// only applied once, at the container's own boundary.
#[test]
fn test_combine_child_break_properties_steals_policies() {
    let (mut container, _style) = column_of_three(|i, item| {
        if i == 0 {
            item.page_break_before = BreakPolicy::Always;
        }
        if i == 2 {
            item.column_break_after = BreakPolicy::Avoid;
        }
    });

    let mut page_before = BreakPolicy::Allow;
    let mut column_before = BreakPolicy::Allow;
    let mut page_after = BreakPolicy::Allow;
    let mut column_after = BreakPolicy::Allow;

    container.combine_child_break_properties(
        &mut page_before,
        &mut column_before,
        &mut page_after,
        &mut column_after,
    );

    assert_eq!(page_before, BreakPolicy::Always);
    assert_eq!(column_after, BreakPolicy::Avoid);

    // The policies were stolen: a second combination sees nothing.
    assert_eq!(
        container.items().get(0).page_break_policy_before(),
        BreakPolicy::Allow
    );
    assert_eq!(
        container.items().get(2).column_break_policy_after(),
        BreakPolicy::Allow
    );
}
