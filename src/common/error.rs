use rust_tokenizers::error::TokenizerError;
use tch::TchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum W2nerError {
    #[cfg(feature = "remote")]
    #[error("Endpoint not available error: {0}")]
    FileDownloadError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Tch tensor error: {0}")]
    TchError(String),

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("Invalid configuration error: {0}")]
    InvalidConfigurationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Value error: {0}")]
    ValueError(String),
}

#[cfg(feature = "remote")]
impl From<cached_path::Error> for W2nerError {
    fn from(error: cached_path::Error) -> Self {
        W2nerError::FileDownloadError(error.to_string())
    }
}

impl From<std::io::Error> for W2nerError {
    fn from(error: std::io::Error) -> Self {
        W2nerError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for W2nerError {
    fn from(error: serde_json::Error) -> Self {
        W2nerError::ParseError(error.to_string())
    }
}

impl From<TokenizerError> for W2nerError {
    fn from(error: TokenizerError) -> Self {
        W2nerError::TokenizerError(error.to_string())
    }
}

impl From<TchError> for W2nerError {
    fn from(error: TchError) -> Self {
        W2nerError::TchError(error.to_string())
    }
}
