use thiserror::Error;

/// Errors surfaced by the loading and rendering pipeline.
///
/// Row-level data problems are not errors: they are logged and collected in
/// [`crate::loader::LoadReport`] while loading continues.
#[derive(Debug, Error)]
pub enum VizError {
    /// A data file could not be retrieved (missing file, network failure, HTTP status).
    #[error("could not fetch {origin}: {message}")]
    Fetch { origin: String, message: String },

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// A required header is not present in a CSV table.
    #[error("missing column `{0}`")]
    MissingColumn(String),

    /// A dropdown value that is not one of its options.
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("render: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, VizError>;
