use thiserror::Error;

/// Broad class of a [`ViewerError`], used by shells to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Ignored without state change; worth a log line at most.
    InvalidInput,
    /// Rejected and shown to the user; state unchanged.
    OutOfRange,
    /// The document the request was aimed at is gone or has no pages.
    DocumentUnavailable,
}

/// Malformed input that the core drops.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("non-finite {0}")]
    NonFinite(&'static str),
    #[error("duplicate touch point id {0}")]
    DuplicateTouchId(u64),
    #[error("page {index} has invalid size {width}x{height}")]
    PageSize { index: usize, width: f64, height: f64 },
    #[error("zoom factor {0} must be positive")]
    NonPositiveZoom(f64),
    #[error("viewport size {width}x{height} must be positive")]
    ViewportSize { width: f64, height: f64 },
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("Page number must be between 1 and {page_count}.")]
    PageOutOfRange { index: usize, page_count: usize },

    #[error("Zoom must be between {:.0}% and {:.0}%.", .min * 100.0, .max * 100.0)]
    ZoomOutOfRange { requested: f64, min: f64, max: f64 },

    #[error("You are already on the first page.")]
    AtFirstPage,

    #[error("You are already on the last page.")]
    AtLastPage,

    #[error("The document has no pages.")]
    NoPages,

    #[error("document load {ticket} was superseded")]
    StaleLoad { ticket: u64 },
}

impl ViewerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::PageOutOfRange { .. }
            | Self::ZoomOutOfRange { .. }
            | Self::AtFirstPage
            | Self::AtLastPage => ErrorKind::OutOfRange,
            Self::NoPages | Self::StaleLoad { .. } => ErrorKind::DocumentUnavailable,
        }
    }

    /// Whether the UI shell should show this error to the user.
    pub fn is_user_visible(&self) -> bool {
        self.kind() == ErrorKind::OutOfRange || matches!(self, Self::NoPages)
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;

/// Rejects NaN and infinities with a labelled [`InvalidInput::NonFinite`].
pub(crate) fn ensure_finite(value: f64, what: &'static str) -> ViewerResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInput::NonFinite(what).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_message_is_one_based() {
        let error = ViewerError::PageOutOfRange { index: 14, page_count: 10 };
        assert_eq!(error.to_string(), "Page number must be between 1 and 10.");
        assert!(error.is_user_visible());
    }

    #[test]
    fn zoom_out_of_range_reports_percentages() {
        let error = ViewerError::ZoomOutOfRange { requested: 9.0, min: 0.5, max: 3.0 };
        assert_eq!(error.to_string(), "Zoom must be between 50% and 300%.");
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            ViewerError::from(InvalidInput::DuplicateTouchId(3)).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(ViewerError::AtLastPage.kind(), ErrorKind::OutOfRange);
        assert_eq!(ViewerError::StaleLoad { ticket: 2 }.kind(), ErrorKind::DocumentUnavailable);
        assert!(!ViewerError::StaleLoad { ticket: 2 }.is_user_visible());
        assert_eq!(ViewerError::NoPages.kind(), ErrorKind::DocumentUnavailable);
        assert!(ViewerError::NoPages.is_user_visible());
    }

    #[test]
    fn ensure_finite_rejects_nan() {
        assert!(ensure_finite(f64::NAN, "delta").is_err());
        assert_eq!(ensure_finite(2.5, "delta"), Ok(2.5));
    }
}
