//! Error type shared by the report pipeline.

use std::fmt;

use crate::annotations::AnnotationError;

/// Errors produced while assembling, rendering or writing a report.
#[derive(Debug)]
pub enum RekapError {
    /// A work item carried a timestamp that could not be parsed.
    Timestamp {
        /// The offending input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// The page geometry leaves no room for the requested drawing.
    Geometry {
        /// What could not be laid out.
        what: &'static str,
        /// The computed (non-positive) extent in millimetres.
        extent_mm: f64,
    },
    /// A data source (git, JSON input) failed.
    Source(String),
    /// `genpdf` failed to build or render the document.
    Render(genpdf::error::Error),
    /// Post-processing the rendered bytes failed.
    Annotate(AnnotationError),
    /// Writing the output file failed.
    Io(std::io::Error),
}

impl RekapError {
    pub(crate) fn timestamp(value: &str, reason: impl fmt::Display) -> Self {
        Self::Timestamp {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn source_failure(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }
}

impl fmt::Display for RekapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp { value, reason } => {
                write!(f, "Failed to parse timestamp '{}': {}", value, reason)
            }
            Self::Geometry { what, extent_mm } => write!(
                f,
                "Page geometry too small: {} would be {:.2} mm wide",
                what, extent_mm
            ),
            Self::Source(message) => write!(f, "Data source failed: {message}"),
            Self::Render(err) => write!(f, "Failed to render PDF: {err}"),
            Self::Annotate(err) => write!(f, "Failed to post-process PDF: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for RekapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(err) => Some(err),
            Self::Annotate(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Timestamp { .. } | Self::Geometry { .. } | Self::Source(_) => None,
        }
    }
}

impl From<genpdf::error::Error> for RekapError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Render(err)
    }
}

impl From<AnnotationError> for RekapError {
    fn from(err: AnnotationError) -> Self {
        Self::Annotate(err)
    }
}

impl From<std::io::Error> for RekapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
