//! Two-column flow of report sections with page breaks.
//!
//! Each column is laid out in its own pass over the canvas.  The first pass
//! may run over several pages; the second pass starts again on the first
//! content page at the same vertical position the first one started from, so
//! both columns share their top edge.  An item is never split: when the space
//! left on the page is smaller than the item's reserved height, the item moves
//! to the next page as a whole.

use log::debug;

use crate::canvas::{pt, Canvas, Point, Stroke, Text};
use crate::error::RekapError;
use crate::format::{format_item, ColumnSide};
use crate::model::{Mode, Section, WorkItem};

/// Base font size of the report, in points.
pub const FONT_SIZE: u8 = 12;
/// Extra leading added to each line, in points.
const LINE_LEADING_PT: f64 = 4.0;
/// Weight of the full-width ruler below the histogram, in points.
pub const RULER_WEIGHT_PT: f64 = 3.0;
const SECTION_RULER_FACTOR: f64 = 0.375;
const ITEM_RULER_FACTOR: f64 = 0.25;
const SECTION_TITLE_SCALE: f64 = 1.2;
const ITEM_SPACING_FACTOR: f64 = 1.5;
const REMOTE_RIGHT_SPACING_FACTOR: f64 = 2.2;
const RESERVED_SPACING_FACTOR: f64 = 3.0;

/// Height of a text line of `size` points, in millimetres.
pub fn line_height(size: u8) -> f64 {
    pt(f64::from(size) + LINE_LEADING_PT)
}

/// Base vertical spacing unit, in millimetres.
pub fn base_spacing() -> f64 {
    pt(f64::from(FONT_SIZE) / 2.2)
}

/// Vertical space reserved for `item`: its title line, its metadata lines and
/// the surrounding spacing.
pub fn item_height(item: &WorkItem) -> f64 {
    (1 + item.metadata_line_count()) as f64 * line_height(FONT_SIZE)
        + base_spacing() * RESERVED_SPACING_FACTOR
}

/// Horizontal extent of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnFrame {
    pub x: f64,
    pub width: f64,
    pub side: ColumnSide,
}

impl ColumnFrame {
    /// Splits `width` into two equal columns separated by a gutter of twice
    /// the base spacing.
    pub fn split(width: f64) -> Result<(Self, Self), RekapError> {
        let gutter = base_spacing() * 2.0;
        let column = (width - gutter) / 2.0;
        if column <= 0.0 {
            return Err(RekapError::Geometry {
                what: "column",
                extent_mm: column,
            });
        }

        Ok((
            Self {
                x: 0.0,
                width: column,
                side: ColumnSide::Left,
            },
            Self {
                x: column + gutter,
                width: column,
                side: ColumnSide::Right,
            },
        ))
    }
}

/// Page and cursor position a column pass starts from or ends at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowPosition {
    pub page: usize,
    pub cursor: f64,
}

impl FlowPosition {
    /// Captures the canvas position.
    pub fn of<C: Canvas>(canvas: &C) -> Self {
        Self {
            page: canvas.page(),
            cursor: canvas.cursor(),
        }
    }
}

/// Puts the larger section first (left); equal sizes keep their order.
pub fn order_sections(sections: &[Section; 2]) -> [&Section; 2] {
    let [first, second] = sections;
    if second.len() > first.len() {
        [second, first]
    } else {
        [first, second]
    }
}

fn ruler<C: Canvas>(canvas: &mut C, x: f64, width: f64, weight: f64) {
    let y = canvas.cursor();
    canvas.stroke_line(Point::new(x, y), Point::new(x + width, y), Stroke::solid(weight));
}

fn write_line<C: Canvas>(canvas: &mut C, text: Text) {
    let size = text.size;
    canvas.draw_text(text);
    canvas.move_down(line_height(size));
}

fn render_item<C: Canvas>(
    canvas: &mut C,
    item: &WorkItem,
    frame: ColumnFrame,
    mode: Mode,
) -> Result<(), RekapError> {
    let formatted = format_item(item, mode, frame.side)?;
    let spacing = base_spacing();

    let at = Point::new(frame.x, canvas.cursor());
    write_line(
        canvas,
        Text::new(formatted.link_text, at, frame.width, FONT_SIZE)
            .with_link(Some(formatted.link_target)),
    );
    ruler(canvas, frame.x, frame.width, RULER_WEIGHT_PT * ITEM_RULER_FACTOR);
    canvas.move_down(spacing / 2.0);

    for line in formatted.metadata {
        let at = Point::new(frame.x, canvas.cursor());
        write_line(canvas, Text::new(line, at, frame.width, FONT_SIZE));
    }

    let factor = if frame.side == ColumnSide::Right && mode == Mode::Remote {
        REMOTE_RIGHT_SPACING_FACTOR
    } else {
        ITEM_SPACING_FACTOR
    };
    canvas.move_down(spacing * factor);
    Ok(())
}

/// Lays out one section as a column starting at `start`, breaking pages as
/// needed, and returns where the column ended.
pub fn render_column<C: Canvas>(
    canvas: &mut C,
    section: &Section,
    frame: ColumnFrame,
    start: FlowPosition,
    mode: Mode,
) -> Result<FlowPosition, RekapError> {
    canvas.go_to_page(start.page);
    canvas.move_cursor_to(start.cursor);

    let title_size = (f64::from(FONT_SIZE) * SECTION_TITLE_SCALE) as u8;
    let at = Point::new(frame.x, canvas.cursor());
    write_line(
        canvas,
        Text::new(section.title(), at, frame.width, title_size),
    );
    ruler(canvas, frame.x, frame.width, RULER_WEIGHT_PT * SECTION_RULER_FACTOR);
    canvas.move_down(base_spacing() / 2.0);

    for item in section.sorted_items() {
        let needed = item_height(item);
        let remaining = canvas.bounds_height() - canvas.cursor();
        if remaining < needed && canvas.cursor() > 0.0 {
            debug!(
                "column {:?}: #{} needs {:.1} mm, {:.1} mm left on page {}; breaking",
                frame.side,
                item.number(),
                needed,
                remaining,
                canvas.page() + 1
            );
            canvas.advance_page();
        }
        render_item(canvas, item, frame, mode)?;
    }

    Ok(FlowPosition::of(canvas))
}

/// Where each column of a two-column layout ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnsEnd {
    pub left: FlowPosition,
    pub right: FlowPosition,
}

/// Lays out both sections side by side from the current canvas position.
///
/// The larger section goes left.  The right column restarts from the position
/// captured before the left column was drawn.
pub fn render_columns<C: Canvas>(
    canvas: &mut C,
    sections: &[Section; 2],
    mode: Mode,
) -> Result<ColumnsEnd, RekapError> {
    let (left_frame, right_frame) = ColumnFrame::split(canvas.bounds_width())?;
    let [left, right] = order_sections(sections);

    let top = FlowPosition::of(canvas);
    let left_end = render_column(canvas, left, left_frame, top, mode)?;
    let right_end = render_column(canvas, right, right_frame, top, mode)?;

    debug!(
        "columns: left ends on page {}, right ends on page {}",
        left_end.page + 1,
        right_end.page + 1
    );

    Ok(ColumnsEnd {
        left: left_end,
        right: right_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageCanvas;

    fn tickets(count: u64) -> Vec<WorkItem> {
        (1..=count)
            .map(|n| WorkItem::ticket(n, format!("ticket {n}"), format!("https://x/{n}"), "open"))
            .collect()
    }

    #[test]
    fn larger_section_goes_left() {
        let a = Section::new("a").with_items(tickets(5));
        let b = Section::new("b").with_items(tickets(2));
        let sections = [b.clone(), a.clone()];
        let [left, right] = order_sections(&sections);
        assert_eq!(left.title(), "a");
        assert_eq!(right.title(), "b");
    }

    #[test]
    fn equal_sections_keep_their_order() {
        let sections = [
            Section::new("first").with_items(tickets(2)),
            Section::new("second").with_items(tickets(2)),
        ];
        let [left, right] = order_sections(&sections);
        assert_eq!(left.title(), "first");
        assert_eq!(right.title(), "second");
    }

    #[test]
    fn item_height_follows_metadata_lines() {
        let bare = WorkItem::ticket(1u64, "t", "l", "open");
        let assigned = bare.clone().with_assignees(["a"]);
        let closed = WorkItem::change(2u64, "c", "l", "2025-06-01T10:00:00Z")
            .with_closed_at(Some("2025-06-02T10:00:00Z".to_string()));

        let line = line_height(FONT_SIZE);
        let reserve = base_spacing() * 3.0;
        assert!((item_height(&bare) - (2.0 * line + reserve)).abs() < 1e-9);
        assert!((item_height(&assigned) - (3.0 * line + reserve)).abs() < 1e-9);
        assert!((item_height(&closed) - (4.0 * line + reserve)).abs() < 1e-9);
    }

    #[test]
    fn item_that_does_not_fit_moves_to_next_page_whole() {
        let item = WorkItem::ticket(1u64, "only", "https://x/1", "open");
        let needed = item_height(&item);
        let mut canvas = PageCanvas::new(180.0, 250.0);
        let (frame, _) = ColumnFrame::split(180.0).unwrap();

        let section = Section::new("s").with_item(item);
        // Leave room for the column header plus half of the item.
        let header = line_height(14) + base_spacing() / 2.0;
        let start = FlowPosition {
            page: 0,
            cursor: 250.0 - header - needed / 2.0,
        };
        let end = render_column(&mut canvas, &section, frame, start, Mode::Remote).unwrap();

        assert_eq!(end.page, 1);
        let first_page: Vec<_> = canvas.pages()[0].texts().map(|t| t.content.clone()).collect();
        assert_eq!(first_page, ["s"]);
        let second_page: Vec<_> = canvas.pages()[1].texts().map(|t| t.content.clone()).collect();
        assert_eq!(second_page, ["#1 - only", "state: open"]);
        assert_eq!(canvas.pages()[1].texts().next().unwrap().at.y, 0.0);
    }

    #[test]
    fn drawn_item_never_exceeds_reserved_height() {
        let items = [
            WorkItem::ticket(1u64, "t", "l", "open").with_assignees(["a"]),
            WorkItem::change(2u64, "c", "l", "2025-06-01T10:00:00Z")
                .with_closed_at(Some("2025-06-04T10:00:00Z".to_string())),
        ];
        for mode in [Mode::Remote, Mode::Local] {
            for item in &items {
                let (_, frame) = ColumnFrame::split(180.0).unwrap();
                let mut canvas = PageCanvas::new(180.0, 250.0);
                render_item(&mut canvas, item, frame, mode).unwrap();
                assert!(canvas.cursor() <= item_height(item) + 1e-9);
            }
        }
    }

    #[test]
    fn right_column_starts_where_left_column_started() {
        let sections = [
            Section::new("big").with_items(tickets(40)),
            Section::new("small").with_items(tickets(1)),
        ];
        let mut canvas = PageCanvas::new(180.0, 250.0);
        canvas.move_cursor_to(60.0);

        let end = render_columns(&mut canvas, &sections, Mode::Remote).unwrap();
        assert!(end.left.page > 0);
        assert_eq!(end.right.page, 0);

        let small_title = canvas.pages()[0]
            .texts()
            .find(|t| t.content == "small")
            .unwrap();
        let big_title = canvas.pages()[0]
            .texts()
            .find(|t| t.content == "big")
            .unwrap();
        assert_eq!(small_title.at.y, 60.0);
        assert_eq!(big_title.at.y, 60.0);
        assert!(small_title.at.x > big_title.at.x);
    }

    #[test]
    fn continuation_pages_start_at_the_top() {
        let sections = [
            Section::new("big").with_items(tickets(40)),
            Section::new("small"),
        ];
        let mut canvas = PageCanvas::new(180.0, 250.0);
        render_columns(&mut canvas, &sections, Mode::Remote).unwrap();

        for page in &canvas.pages()[1..] {
            let first = page.texts().next().unwrap();
            assert_eq!(first.at.y, 0.0);
            assert!(page.texts().all(|t| t.at.y + line_height(t.size) <= 250.0 + 1e-9));
        }
    }

    #[test]
    fn larger_second_section_is_drawn_on_the_left() {
        let sections = [
            Section::new("repo").with_items(tickets(1)),
            Section::new("repo2").with_items(tickets(3)),
        ];
        let mut canvas = PageCanvas::new(180.0, 250.0);
        render_columns(&mut canvas, &sections, Mode::Local).unwrap();

        let repo2 = canvas.pages()[0].texts().find(|t| t.content == "repo2").unwrap();
        let repo = canvas.pages()[0].texts().find(|t| t.content == "repo").unwrap();
        assert_eq!(repo2.at.x, 0.0);
        assert!(repo.at.x > 0.0);
    }

    #[test]
    fn items_render_in_number_order_with_links() {
        let section = Section::new("s").with_items([
            WorkItem::ticket(9u64, "nine", "https://x/9", "open"),
            WorkItem::ticket(3u64, "three", "https://x/3", "open"),
        ]);
        let mut canvas = PageCanvas::new(180.0, 250.0);
        let (frame, _) = ColumnFrame::split(180.0).unwrap();
        let start = FlowPosition::of(&canvas);
        render_column(&mut canvas, &section, frame, start, Mode::Remote).unwrap();

        let links: Vec<_> = canvas.pages()[0]
            .texts()
            .filter_map(|t| t.link.clone())
            .collect();
        assert_eq!(links, ["https://x/3", "https://x/9"]);
    }

    #[test]
    fn too_narrow_canvas_cannot_hold_columns() {
        assert!(ColumnFrame::split(base_spacing()).is_err());
    }
}
