use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised at the edges of the engine: loading configuration, parsing
/// tenant documents and validating request-scoped settings.
///
/// Resolution itself never fails; broken sections are dropped or fall back to
/// defaults instead of surfacing here.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid asset base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid category key '{key}': must be non-empty")]
    InvalidCategory { key: String },

    #[error("Invalid section key '{key}': {reason}")]
    InvalidSectionKey { key: String, reason: String },

    #[error("Invalid color value '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("Invalid font family '{family}': {reason}")]
    InvalidFontFamily { family: String, reason: String },

    #[error("Invalid language code '{code}': expected 'xx' or 'xx-YY'")]
    InvalidLanguage { code: String },

    #[error("Schema for category '{category}' is missing essential section '{key}'")]
    MissingEssentialSection { category: String, key: String },

    #[error("Duplicate section '{key}' in schema for category '{category}'")]
    DuplicateSection { category: String, key: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
