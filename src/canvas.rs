//! Drawing surface driven by the layout engine.
//!
//! Coordinates are millimetres relative to the top-left corner of the content
//! area of a page, with `y` growing downwards.  The vertical cursor follows the
//! same convention, so "remaining space" on a page is simply
//! `bounds_height() - cursor()`.
//!
//! [`PageCanvas`] records every call as a [`DrawCommand`] on the current page.
//! The recorded pages are later replayed into a PDF by [`crate::builder`], and
//! they double as an exact, font-independent log for tests.

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Converts typographic points to millimetres.
pub fn pt(points: f64) -> f64 {
    points * MM_PER_POINT
}

/// Position on a page in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Horizontal placement of text within its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// A single line of text.
///
/// `at` is the top-left corner of the line box and `width` its extent; the
/// width is used for alignment and as the clickable area when `link` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub content: String,
    pub at: Point,
    pub width: f64,
    pub size: u8,
    pub bold: bool,
    pub align: TextAlign,
    pub link: Option<String>,
}

impl Text {
    pub fn new(content: impl Into<String>, at: Point, width: f64, size: u8) -> Self {
        Self {
            content: content.into(),
            at,
            width,
            size,
            bold: false,
            align: TextAlign::Left,
            link: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn with_link(mut self, link: impl Into<Option<String>>) -> Self {
        self.link = link.into();
        self
    }
}

/// Stroke parameters for lines; `weight` is in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub weight: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(weight: f64) -> Self {
        Self {
            weight,
            dashed: false,
        }
    }

    pub fn dashed(weight: f64) -> Self {
        Self {
            weight,
            dashed: true,
        }
    }
}

/// Primitive drawing operation recorded on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Text(Text),
    FillRect {
        at: Point,
        width: f64,
        height: f64,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
}

/// Drawing surface with a page-aware vertical cursor.
pub trait Canvas {
    fn draw_text(&mut self, text: Text);

    fn fill_rect(&mut self, at: Point, width: f64, height: f64);

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke);

    /// Current vertical position on the current page.
    fn cursor(&self) -> f64;

    fn move_cursor_to(&mut self, y: f64);

    fn move_down(&mut self, dy: f64) {
        let y = self.cursor();
        self.move_cursor_to(y + dy);
    }

    /// Moves to the next page, creating it when needed, and resets the cursor
    /// to the top.
    fn advance_page(&mut self);

    /// Jumps to an existing zero-based page; the cursor is left unchanged.
    fn go_to_page(&mut self, page: usize);

    /// Zero-based index of the current page.
    fn page(&self) -> usize;

    fn bounds_width(&self) -> f64;

    fn bounds_height(&self) -> f64;
}

/// Commands recorded for one page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    commands: Vec<DrawCommand>,
}

impl Page {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text lines drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// In-memory canvas recording draw commands page by page.
#[derive(Clone, Debug)]
pub struct PageCanvas {
    width: f64,
    height: f64,
    pages: Vec<Page>,
    current: usize,
    cursor: f64,
}

impl PageCanvas {
    /// Creates a canvas with one empty page of the given content size (mm).
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: vec![Page::default()],
            current: 0,
            cursor: 0.0,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    fn push(&mut self, command: DrawCommand) {
        self.pages[self.current].commands.push(command);
    }
}

impl Canvas for PageCanvas {
    fn draw_text(&mut self, text: Text) {
        self.push(DrawCommand::Text(text));
    }

    fn fill_rect(&mut self, at: Point, width: f64, height: f64) {
        self.push(DrawCommand::FillRect { at, width, height });
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(DrawCommand::Line { from, to, stroke });
    }

    fn cursor(&self) -> f64 {
        self.cursor
    }

    fn move_cursor_to(&mut self, y: f64) {
        self.cursor = y;
    }

    fn advance_page(&mut self) {
        self.current += 1;
        if self.current == self.pages.len() {
            self.pages.push(Page::default());
        }
        self.cursor = 0.0;
    }

    fn go_to_page(&mut self, page: usize) {
        // Pages are created only through `advance_page`.
        self.current = page.min(self.pages.len() - 1);
    }

    fn page(&self) -> usize {
        self.current
    }

    fn bounds_width(&self) -> f64 {
        self.width
    }

    fn bounds_height(&self) -> f64 {
        self.height
    }
}
