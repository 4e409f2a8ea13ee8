//! Document construction for recorded report pages.

use std::path::PathBuf;

use genpdf::error::Error;
use genpdf::style;
use genpdf::{Margins, PageDecorator, Size};
use log::debug;

use crate::canvas::{pt, Page, PageCanvas};
use crate::elements::{mm_from_f64, RecordedPages};
use crate::fonts;
use crate::layout::FONT_SIZE;

/// Paper size and uniform margin of a report page, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
}

impl PageGeometry {
    /// A4 portrait with 15pt margins.
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: pt(15.0),
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn content_height(&self) -> f64 {
        self.height_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Builder for `genpdf::Document` instances configured for report pages.
#[derive(Default)]
pub struct DocumentBuilder {
    geometry: PageGeometry,
    font_path: Option<PathBuf>,
    title: Option<String>,
}

impl DocumentBuilder {
    /// Creates a new builder for A4 pages using the default fonts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size and margin.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Uses a single font file instead of the bundled family.
    pub fn with_font_path(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    /// Sets the document title stored by `genpdf`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Returns an empty canvas sized to the content area of one page.
    pub fn canvas(&self) -> PageCanvas {
        PageCanvas::new(self.geometry.content_width(), self.geometry.content_height())
    }

    /// Builds a `genpdf::Document` with fonts, paper size and margins applied.
    pub fn build(&self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::report_font_family(self.font_path.as_deref())?;
        let mut document = genpdf::Document::new(font_family);

        document.set_paper_size(Size::new(
            mm_from_f64(self.geometry.width_mm),
            mm_from_f64(self.geometry.height_mm),
        ));
        document.set_font_size(FONT_SIZE);
        if let Some(title) = &self.title {
            document.set_title(title.clone());
        }
        let margin = mm_from_f64(self.geometry.margin_mm);
        document.set_page_decorator(MarginDecorator::new(Margins::trbl(
            margin, margin, margin, margin,
        )));

        Ok(document)
    }

    /// Renders recorded pages into PDF bytes.
    pub fn render(&self, pages: Vec<Page>) -> Result<Vec<u8>, Error> {
        let mut document = self.build()?;
        let element = RecordedPages::new(pages);
        debug!("rendering {} recorded page(s)", element.page_count());
        document.push(element);

        let mut buffer = Vec::new();
        document.render(&mut buffer)?;
        Ok(buffer)
    }
}

struct MarginDecorator {
    page: usize,
    margins: Margins,
}

impl MarginDecorator {
    fn new(margins: Margins) -> Self {
        Self { page: 0, margins }
    }
}

impl PageDecorator for MarginDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        debug!("decorating page {}", self.page);
        area.add_margins(self.margins);
        Ok(area)
    }
}
