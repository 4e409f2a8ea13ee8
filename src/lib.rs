//! Monthly activity report (rekap) generation: active-day histogram and a
//! two-column listing of pull requests, tickets or commits, rendered to PDF.

pub mod annotations;
pub mod builder;
pub mod calendar;
pub mod canvas;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod format;
pub mod histogram;
pub mod layout;
pub mod model;
pub mod report;
pub mod sources;

pub use error::RekapError;
pub use model::{Mode, ReportRequest, Section, TargetMonth, WorkItem};
pub use report::{generate, GeneratedReport};
