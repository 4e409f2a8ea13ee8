//! `genpdf` element that replays recorded canvas pages.
//!
//! `genpdf` lays elements out as a flow, while the report layout positions
//! everything absolutely and revisits earlier pages.  [`RecordedPages`]
//! bridges the two: each call to [`Element::render`] draws one complete
//! recorded page into the area it is given and asks for another page while
//! recorded pages remain.
//!
//! `genpdf` only exposes plain strokes, so filled rectangles are painted as
//! dense vertical strokes, heavy lines as parallel strokes and dashed lines as
//! short segments.

use genpdf::error::Error;
use genpdf::fonts::FontCache;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult};
use log::{debug, warn};

use crate::canvas::{pt, DrawCommand, Page, Point, Stroke, Text, TextAlign};

/// Width of a default PDF stroke (1pt) in millimetres.
const DEFAULT_STROKE_MM: f64 = 25.4 / 72.0;
const FILL_STEP_MM: f64 = 0.25;
const DASH_PT: f64 = 2.0;
const HAIRLINE_WEIGHT_PT: f64 = 0.5;
const HAIRLINE_GREY: u8 = 170;
/// Text shrinks by at most this many points before it is clipped.
const MAX_SHRINK_PT: u8 = 2;
const MIN_FONT_SIZE: u8 = 6;
const ELLIPSIS: &str = "...";

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn position(point: Point) -> Position {
    Position::new(mm_from_f64(point.x), mm_from_f64(point.y))
}

/// Renders recorded pages, one per render pass.
pub struct RecordedPages {
    pages: Vec<Page>,
    next: usize,
}

impl RecordedPages {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages, next: 0 }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn draw_segment(area: &render::Area<'_>, from: Point, to: Point, style: Style) {
    area.draw_line(vec![position(from), position(to)], style);
}

fn fill_rect(area: &render::Area<'_>, at: Point, width: f64, height: f64) {
    // Inset by half a stroke so the painted strokes stay inside the rectangle.
    let inset = DEFAULT_STROKE_MM / 2.0;
    let start = at.x + inset.min(width / 2.0);
    let end = at.x + (width - inset).max(width / 2.0);
    let mut x = start;
    while x <= end {
        draw_segment(
            area,
            Point::new(x, at.y),
            Point::new(x, at.y + height),
            Style::new(),
        );
        x += FILL_STEP_MM;
    }
}

fn stroke_line(area: &render::Area<'_>, from: Point, to: Point, stroke: Stroke) {
    let style = if stroke.weight < HAIRLINE_WEIGHT_PT {
        Style::new().with_color(Color::Rgb(HAIRLINE_GREY, HAIRLINE_GREY, HAIRLINE_GREY))
    } else {
        Style::new()
    };

    let length = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
    if length <= f64::EPSILON {
        return;
    }
    let (ux, uy) = ((to.x - from.x) / length, (to.y - from.y) / length);

    // Perpendicular offsets of the parallel strokes making up a heavy line.
    let weight = pt(stroke.weight);
    let passes = (weight / DEFAULT_STROKE_MM).ceil().max(1.0) as usize;
    let offsets = (0..passes).map(|pass| {
        if passes == 1 {
            0.0
        } else {
            -weight / 2.0 + weight * pass as f64 / (passes - 1) as f64
        }
    });

    for offset in offsets {
        let shift = |p: Point| Point::new(p.x - uy * offset, p.y + ux * offset);
        let (a, b) = (shift(from), shift(to));
        if stroke.dashed {
            let dash = pt(DASH_PT);
            let mut travelled = 0.0;
            while travelled < length {
                let stop = (travelled + dash).min(length);
                draw_segment(
                    area,
                    Point::new(a.x + ux * travelled, a.y + uy * travelled),
                    Point::new(a.x + ux * stop, a.y + uy * stop),
                    style,
                );
                travelled += dash * 2.0;
            }
        } else {
            draw_segment(area, a, b, style);
        }
    }
}

/// Fits `content` into `max_width` millimetres as measured by `measure`.
///
/// The font size is reduced first, by up to two points; text that still
/// overflows is cut at the end and marked with an ellipsis.  Returns the
/// printed string and its font size.
pub fn fit_line(
    content: &str,
    size: u8,
    max_width: f64,
    measure: impl Fn(&str, u8) -> f64,
) -> (String, u8) {
    let fits = |text: &str, size: u8| measure(text, size) <= max_width;
    if fits(content, size) {
        return (content.to_string(), size);
    }

    let smallest = size.saturating_sub(MAX_SHRINK_PT).max(MIN_FONT_SIZE).min(size);
    let mut fitted = size;
    while fitted > smallest && !fits(content, fitted) {
        fitted -= 1;
    }
    if fits(content, fitted) {
        return (content.to_string(), fitted);
    }

    let chars: Vec<char> = content.chars().collect();
    for keep in (0..chars.len()).rev() {
        let head: String = chars[..keep].iter().collect();
        let clipped = format!("{}{}", head.trim_end(), ELLIPSIS);
        if fits(&clipped, fitted) {
            return (clipped, fitted);
        }
    }
    (String::new(), fitted)
}

fn text_style(text: &Text, base: Style, size: u8) -> Style {
    let style = base.with_font_size(size);
    if text.bold {
        style.bold()
    } else {
        style
    }
}

fn measured_width(font_cache: &FontCache, content: &str, style: Style) -> f64 {
    mm_to_f64(StyledString::new(content.to_string(), style).width(font_cache))
}

/// The string and style `text` is printed with.  Left-aligned text is fitted
/// to `text.width`; centered labels keep their size and may extend evenly past
/// both sides of their box.
pub fn fitted_text(font_cache: &FontCache, text: &Text, base: Style) -> (String, Style) {
    if text.align == TextAlign::Center {
        return (text.content.clone(), text_style(text, base, text.size));
    }
    let (content, size) = fit_line(&text.content, text.size, text.width, |candidate, size| {
        measured_width(font_cache, candidate, text_style(text, base, size))
    });
    if content != text.content || size != text.size {
        debug!(
            "text '{}' wider than {:.1} mm; printed as '{}' at {}pt",
            text.content, text.width, content, size
        );
    }
    (content, text_style(text, base, size))
}

fn print_text(
    context: &genpdf::Context,
    area: &render::Area<'_>,
    text: &Text,
    base: Style,
) -> Result<(), Error> {
    let (content, style) = fitted_text(&context.font_cache, text, base);

    let x_offset = match text.align {
        TextAlign::Left => 0.0,
        TextAlign::Center => {
            (text.width - measured_width(&context.font_cache, &content, style)) / 2.0
        }
    };

    let at = Point::new(text.at.x + x_offset, text.at.y);
    match area.text_section(&context.font_cache, position(at), style) {
        Some(mut section) => section.print_str(&content, style),
        None => {
            warn!(
                "text '{}' does not fit at {:.1}/{:.1} mm; skipped",
                text.content, text.at.x, text.at.y
            );
            Ok(())
        }
    }
}

impl Element for RecordedPages {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let Some(page) = self.pages.get(self.next) else {
            return Ok(result);
        };

        for command in page.commands() {
            match command {
                DrawCommand::Text(text) => print_text(context, &area, text, style)?,
                DrawCommand::FillRect { at, width, height } => {
                    fill_rect(&area, *at, *width, *height)
                }
                DrawCommand::Line { from, to, stroke } => stroke_line(&area, *from, *to, *stroke),
            }
        }

        self.next += 1;
        result.size = area.size();
        result.has_more = self.next < self.pages.len();
        Ok(result)
    }
}
