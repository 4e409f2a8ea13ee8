//! Month histogram of active days.

use log::debug;

use crate::calendar::ActiveDays;
use crate::canvas::{pt, Canvas, Point, Stroke, Text};
use crate::error::RekapError;
use crate::model::TargetMonth;

const CHART_HEIGHT_PT: f64 = 40.0;
const MAX_HOURS: u32 = 8;
const HOURS_STEP: usize = 2;
const HOURS_PER_ACTIVE_DAY: u32 = 8;
const BAR_SPACING_PT: f64 = 2.0;
const AXIS_GUTTER_PT: f64 = 15.0;
const AXIS_LABEL_SIZE: u8 = 8;
const DAY_LABEL_SIZE: u8 = 6;
const DAY_LABEL_GAP_PT: f64 = 2.0;
const REFERENCE_LINE_WEIGHT_PT: f64 = 0.05;
const BOTTOM_MARGIN_PT: f64 = 15.0;

/// Horizontal placement of the day slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub origin: f64,
    pub bar_width: f64,
    pub spacing: f64,
    pub count: usize,
}

impl BarGeometry {
    /// Splits `width` into `count` equal slots after the axis gutter.
    pub fn new(width: f64, count: usize) -> Result<Self, RekapError> {
        let origin = pt(AXIS_GUTTER_PT);
        let spacing = pt(BAR_SPACING_PT);
        let gaps = count.saturating_sub(1) as f64 * spacing;
        let bar_width = if count == 0 {
            0.0
        } else {
            (width - origin - gaps) / count as f64
        };

        if bar_width <= 0.0 {
            return Err(RekapError::Geometry {
                what: "histogram bar",
                extent_mm: bar_width,
            });
        }

        Ok(Self {
            origin,
            bar_width,
            spacing,
            count,
        })
    }

    /// Left edge of the slot at `index`.
    pub fn x(&self, index: usize) -> f64 {
        self.origin + index as f64 * (self.bar_width + self.spacing)
    }
}

/// Draws one slot per calendar day of `month`, filled for the active days,
/// with hour reference lines and `dd.mm` labels, then moves the cursor below
/// the chart.
pub fn draw_histogram<C: Canvas>(
    canvas: &mut C,
    active: &ActiveDays,
    month: TargetMonth,
) -> Result<BarGeometry, RekapError> {
    let days: Vec<_> = month.days().collect();
    let width = canvas.bounds_width();
    let geometry = BarGeometry::new(width, days.len())?;

    let top = canvas.cursor();
    let height = pt(CHART_HEIGHT_PT);
    let axis = top + height;

    for hours in (0..=MAX_HOURS).step_by(HOURS_STEP) {
        let y = axis - height * f64::from(hours) / f64::from(MAX_HOURS);
        let label_top = y - pt(f64::from(AXIS_LABEL_SIZE)) / 2.0;
        canvas.draw_text(Text::new(
            hours.to_string(),
            Point::new(0.0, label_top),
            geometry.origin,
            AXIS_LABEL_SIZE,
        ));
        canvas.stroke_line(
            Point::new(geometry.origin, y),
            Point::new(width, y),
            Stroke::dashed(REFERENCE_LINE_WEIGHT_PT),
        );
    }

    let bar_height = height * f64::from(HOURS_PER_ACTIVE_DAY) / f64::from(MAX_HOURS);
    for (index, day) in days.iter().enumerate() {
        let x = geometry.x(index);
        if active.contains(*day) {
            canvas.fill_rect(Point::new(x, axis - bar_height), geometry.bar_width, bar_height);
        }
        canvas.draw_text(
            Text::new(
                day.format("%d.%m").to_string(),
                Point::new(x, axis + pt(DAY_LABEL_GAP_PT)),
                geometry.bar_width,
                DAY_LABEL_SIZE,
            )
            .centered(),
        );
    }

    debug!(
        "histogram: {} slots, {} active, bar width {:.2} mm",
        days.len(),
        active.len(),
        geometry.bar_width
    );

    canvas.move_cursor_to(axis + pt(BOTTOM_MARGIN_PT));
    Ok(geometry)
}
