pub type SrResult<T> = Result<T, SrError>;

#[derive(Debug, thiserror::Error)]
pub enum SrError {
    #[error("[CSV Error] {0}")]
    CsvError(#[from] ::csv::Error),

    #[error("[Empty Input] {0}")]
    EmptyInput(String),

    #[error("[Fetch Failure] {ticker}: {message}")]
    FetchFailure { ticker: String, message: String },

    #[error("[HTTP Request Error] {0}")]
    HttpRequestError(#[from] ::reqwest::Error),

    #[error("[HTTP Middleware Error] {0}")]
    HttpMiddlewareError(#[from] ::reqwest_middleware::Error),

    #[error("[HTTP Status Error] [{request}] {status}")]
    HttpStatusError { status: String, request: String },

    #[error("[Insufficient Data] Too little data to compute the standard deviation of '{ticker}' over period '{period}'")]
    InsufficientData { ticker: String, period: String },

    #[error("[Invalid] {message}")]
    Invalid { code: &'static str, message: String },

    #[error("[IO Error] {0}")]
    IoError(#[from] std::io::Error),

    #[error("[Parse Config Error] {0}")]
    ParseConfigError(#[from] ::confy::ConfyError),

    #[error("[Parse DataTime Error] {0}")]
    ParseDataTimeError(#[from] chrono::ParseError),

    #[error("[Parse URL Error] {0}")]
    ParseUrlError(#[from] url::ParseError),

    #[error("[Serde JSON Error] {0}")]
    SerdeJsonError(#[from] ::serde_json::Error),

    #[error("[SQL Error] {0}")]
    SqlError(#[from] ::libsql::Error),

    #[error("[Timeout] Fetching '{ticker}' took longer than {secs}s")]
    Timeout { ticker: String, secs: u64 },
}

impl SrError {
    /// Folds any data retrieval error into the per-ticker taxonomy, keeping
    /// `InsufficientData` and `FetchFailure` as they are.
    pub fn into_fetch_failure(self, ticker: &str) -> Self {
        match self {
            err @ (SrError::InsufficientData { .. } | SrError::FetchFailure { .. }) => err,
            err => SrError::FetchFailure {
                ticker: ticker.to_string(),
                message: err.to_string(),
            },
        }
    }
}
