use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("could not read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Pull the `error` field out of a JSON error body, if there is one
    pub fn message(&self) -> Option<String> {
        match self {
            ApiError::HttpStatus(_, body) => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from)),
            _ => None,
        }
    }

    /// The server's message when it sent one, otherwise the error itself
    pub fn user_message(&self) -> String {
        self.message().unwrap_or_else(|| self.to_string())
    }
}
