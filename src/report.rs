//! Report assembly: header, histogram and the two item columns, rendered to
//! PDF bytes and written under the derived file name.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::annotations::{annotate, collect_link_areas, DocumentInfo};
use crate::builder::DocumentBuilder;
use crate::calendar::{business_days, ActiveDays};
use crate::canvas::{Canvas, Point, Stroke, Text};
use crate::error::RekapError;
use crate::histogram::{draw_histogram, BarGeometry};
use crate::layout::{
    base_spacing, line_height, render_columns, ColumnsEnd, FlowPosition, RULER_WEIGHT_PT,
};
use crate::model::{Mode, ReportRequest, TargetMonth};

const TITLE_SIZE: u8 = 13;
const SUBTITLE_SIZE: u8 = 9;
const TITLE_GAP_FACTOR: f64 = 0.6;
const SUBTITLE_GAP_FACTOR: f64 = 2.0;
const RULER_GAP_FACTOR: f64 = 1.5;

/// Output file name: `<subject>_<month>_<year>_<contributor>_rekap.pdf`, with
/// slashes in the subject replaced by underscores and the month name in lower
/// case.
pub fn file_name(subject: &str, month: TargetMonth, contributor: &str) -> String {
    format!(
        "{}_{}_{}_{}_rekap.pdf",
        subject.replace('/', "_"),
        month.name().to_lowercase(),
        month.year(),
        contributor
    )
}

/// Header title: the override when present, otherwise a summary of
/// contributor, subject and month.
pub fn title(request: &ReportRequest) -> String {
    match request.title() {
        Some(title) => title.to_string(),
        None => {
            let month = request.month();
            format!(
                "Activity summary for {} on {} in {} {}",
                request.contributor(),
                request.subject(),
                month.name(),
                month.year()
            )
        }
    }
}

fn subtitle(request: &ReportRequest) -> String {
    let generated = format!("Generated on {}.", request.generated_on().format("%Y-%m-%d"));
    match request.mode() {
        Mode::Remote => format!(
            "{} All PR and ticket titles are clickable links to their respective GitHub pages.",
            generated
        ),
        Mode::Local => generated,
    }
}

/// Line printed once a report has been written.
pub fn confirmation(file_name: &str) -> String {
    format!("-> rekap generated: {}", file_name)
}

/// Layout facts of an assembled report.
#[derive(Clone, Debug)]
pub struct AssembledReport {
    pub active_days: ActiveDays,
    pub bars: BarGeometry,
    /// Where both columns started.
    pub columns_top: FlowPosition,
    pub columns: ColumnsEnd,
}

/// Draws the complete report onto `canvas`.
pub fn assemble<C: Canvas>(
    request: &ReportRequest,
    canvas: &mut C,
) -> Result<AssembledReport, RekapError> {
    let month = request.month();
    let active_days = business_days(month, request.work_days(), request.days_off());
    let width = canvas.bounds_width();
    let spacing = base_spacing();

    let header = format!("> {} ({} days):", title(request), active_days.len());
    let at = Point::new(0.0, canvas.cursor());
    canvas.draw_text(Text::new(header, at, width, TITLE_SIZE).bold());
    canvas.move_down(line_height(TITLE_SIZE));
    canvas.move_down(spacing * TITLE_GAP_FACTOR);

    let at = Point::new(0.0, canvas.cursor());
    canvas.draw_text(Text::new(subtitle(request), at, width, SUBTITLE_SIZE));
    canvas.move_down(line_height(SUBTITLE_SIZE));
    canvas.move_down(spacing * SUBTITLE_GAP_FACTOR);

    let bars = draw_histogram(canvas, &active_days, month)?;

    canvas.move_down(spacing);
    let y = canvas.cursor();
    canvas.stroke_line(
        Point::new(0.0, y),
        Point::new(width, y),
        Stroke::solid(RULER_WEIGHT_PT),
    );
    canvas.move_down(spacing * RULER_GAP_FACTOR);

    let columns_top = FlowPosition::of(canvas);
    let columns = render_columns(canvas, request.sections(), request.mode())?;

    Ok(AssembledReport {
        active_days,
        bars,
        columns_top,
        columns,
    })
}

/// A rendered report ready to be written.
#[derive(Clone, Debug)]
pub struct GeneratedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub active_days: usize,
    pub pages: usize,
}

impl GeneratedReport {
    /// Writes the PDF into `directory` and returns the written path.
    pub fn write_to(&self, directory: impl AsRef<Path>) -> Result<PathBuf, RekapError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        let path = directory.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(
            "wrote {} ({} page(s), {} bytes)",
            path.display(),
            self.pages,
            self.bytes.len()
        );
        Ok(path)
    }

    pub fn confirmation(&self) -> String {
        confirmation(&self.file_name)
    }
}

/// Lays out, renders and annotates the report described by `request`.
pub fn generate(request: &ReportRequest) -> Result<GeneratedReport, RekapError> {
    let title = title(request);
    let builder = DocumentBuilder::new()
        .with_font_path(request.font_path().cloned())
        .with_title(title.clone());

    let mut canvas = builder.canvas();
    let assembled = assemble(request, &mut canvas)?;
    let pages = canvas.into_pages();
    let page_count = pages.len();

    let links = collect_link_areas(&pages, &builder.geometry());
    debug!("{} link area(s) on {} page(s)", links.len(), page_count);

    let rendered = builder.render(pages)?;
    let info = DocumentInfo {
        title,
        author: request.contributor().to_string(),
    };
    let bytes = annotate(&rendered, &links, &info)?;

    Ok(GeneratedReport {
        file_name: file_name(request.subject(), request.month(), request.contributor()),
        bytes,
        active_days: assembled.active_days.len(),
        pages: page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PageGeometry;
    use crate::canvas::{DrawCommand, PageCanvas};
    use crate::model::{Section, WorkItem};
    use chrono::NaiveDate;

    fn june() -> TargetMonth {
        TargetMonth::new(2026, 6).unwrap()
    }

    fn canvas() -> PageCanvas {
        let geometry = PageGeometry::a4();
        PageCanvas::new(geometry.content_width(), geometry.content_height())
    }

    fn request(mode: Mode) -> ReportRequest {
        ReportRequest::new(june(), "test/repo", "John Doe", mode)
            .with_generated_on(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap())
    }

    #[test]
    fn file_name_flattens_subject_and_lowercases_month() {
        assert_eq!(
            file_name("test/repo", june(), "John Doe"),
            "test_repo_june_2026_John Doe_rekap.pdf"
        );
    }

    #[test]
    fn custom_title_replaces_summary() {
        let default = request(Mode::Remote);
        assert_eq!(
            title(&default),
            "Activity summary for John Doe on test/repo in June 2026"
        );
        let custom = default.with_title(Some("Q2 wrap-up".to_string()));
        assert_eq!(title(&custom), "Q2 wrap-up");
    }

    #[test]
    fn confirmation_names_the_file() {
        assert_eq!(confirmation("a.pdf"), "-> rekap generated: a.pdf");
    }

    #[test]
    fn subtitle_mentions_links_only_in_remote_mode() {
        let remote = subtitle(&request(Mode::Remote));
        let local = subtitle(&request(Mode::Local));
        assert!(remote.starts_with("Generated on 2026-07-01."));
        assert!(remote.contains("clickable links"));
        assert_eq!(local, "Generated on 2026-07-01.");
    }

    #[test]
    fn june_scenario_places_right_column_at_shared_top() {
        let tickets: Vec<WorkItem> = (1u64..=3)
            .map(|n| WorkItem::ticket(n, format!("ticket {n}"), "https://x/t", "closed"))
            .collect();
        let request = request(Mode::Remote).with_sections(
            Section::new("> pull requests opened (1)").with_item(
                WorkItem::change(9u64, "pr", "https://x/p", "2026-06-02T09:00:00Z"),
            ),
            Section::new("> tickets processed (3)").with_items(tickets),
        );

        let mut canvas = canvas();
        let assembled = assemble(&request, &mut canvas).unwrap();

        assert_eq!(assembled.active_days.len(), 22);
        assert_eq!(assembled.bars.count, 30);

        let texts: Vec<_> = canvas.pages()[0].texts().collect();
        assert!(texts[0].content.ends_with("(22 days):"));
        let left_title = texts
            .iter()
            .find(|text| text.content == "> tickets processed (3)")
            .unwrap();
        let right_title = texts
            .iter()
            .find(|text| text.content == "> pull requests opened (1)")
            .unwrap();
        assert_eq!(left_title.at.x, 0.0);
        assert!(right_title.at.x > 0.0);
        assert_eq!(right_title.at.y, left_title.at.y);
        assert_eq!(right_title.at.y, assembled.columns_top.cursor);
        assert!(assembled.columns.left.cursor > assembled.columns.right.cursor);
    }

    #[test]
    fn empty_sections_still_render_header_and_histogram() {
        let mut canvas = canvas();
        let request = request(Mode::Local);
        let assembled = assemble(&request, &mut canvas).unwrap();
        assert_eq!(canvas.pages().len(), 1);
        assert_eq!(assembled.columns.left.page, 0);
        let fills = canvas.pages()[0]
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(fills, 22);
    }
}
