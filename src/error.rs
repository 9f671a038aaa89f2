use thiserror::Error;

/// Failure to turn an uploaded file into a dataset.
///
/// Every decode problem collapses into one user-facing condition; the
/// underlying reason is kept for the log.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Invalid file: {0}")]
    InvalidFile(String),
}

/// Why a chart could not be shown for the current selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartRequestError {
    #[error("Please upload a spreadsheet before generating a chart.")]
    NoData,
    #[error("Please select both X and Y axes before generating the chart.")]
    MissingAxes2D,
    #[error("Please select X, Y, and Z axes before generating the 3D chart.")]
    MissingAxes3D,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("PNG download is not supported for 3D charts. Please use a screenshot instead.")]
    PngUnsupportedFor3D,
    #[error("PDF download is not supported for 3D charts. Please use a screenshot instead.")]
    PdfUnsupportedFor3D,
    #[error("Copying to the clipboard is not supported for 3D charts. Please use a screenshot instead.")]
    ClipboardUnsupportedFor3D,
    #[error("There is no chart on screen to export.")]
    NothingToExport,
    #[error("Failed to capture the chart: {0}")]
    Rasterize(String),
    #[error("Failed to encode PNG: {0}")]
    Png(String),
    #[error("Failed to build PDF: {0}")]
    Pdf(String),
    #[error("Failed to save file: {0}")]
    Write(String),
}

/// Failure reasons surfaced by the insight requester.
///
/// The `Display` text of each variant is the exact message shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightError {
    #[error("Please provide data to generate insights.")]
    MissingData,
    #[error("Please select both X and Y axes to generate insights.")]
    MissingAxes,
    #[error("For 3D visualization, please select X, Y, and Z axes to generate insights.")]
    MissingAxes3D,
    #[error("Authentication failed: {0}")]
    Credential(String),
    #[error("API quota exceeded. Please try again later or check your Gemini API quota.")]
    QuotaExceeded,
    #[error("Failed to generate insights: {0}")]
    Request(String),
    #[error("Failed to generate insights: Unexpected API response format")]
    UnexpectedResponse,
}

impl InsightError {
    /// Classify an error message coming back from the remote service or the
    /// transport.
    pub fn from_remote_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("quota") {
            InsightError::QuotaExceeded
        } else if message.contains("API key") {
            InsightError::Credential(message)
        } else {
            InsightError::Request(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_messages_are_classified_by_marker() {
        assert_eq!(
            InsightError::from_remote_message("Resource has been exhausted (e.g. check quota)."),
            InsightError::QuotaExceeded
        );
        assert_eq!(
            InsightError::from_remote_message("API key not valid. Please pass a valid API key."),
            InsightError::Credential("API key not valid. Please pass a valid API key.".into())
        );
        assert_eq!(
            InsightError::from_remote_message("Internal error"),
            InsightError::Request("Internal error".into())
        );
    }

    #[test]
    fn messages_carry_distinct_prefixes() {
        assert!(InsightError::Credential("x".into()).to_string().starts_with("Authentication failed: "));
        assert!(InsightError::Request("x".into()).to_string().starts_with("Failed to generate insights: "));
        assert!(InsightError::QuotaExceeded.to_string().starts_with("API quota exceeded."));
    }
}
