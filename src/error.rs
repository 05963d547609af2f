use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Query `{query}` failed with status {status}")]
    Api {
        status: reqwest::StatusCode,
        query: &'static str,
    },

    #[error("Query `{query}` returned errors: {}", .messages.join("; "))]
    GraphQl {
        query: &'static str,
        messages: Vec<String>,
    },

    #[error("Malformed response for `{query}`: {detail}")]
    MalformedResponse { query: &'static str, detail: String },

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
