use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArticleSearchError>;

#[derive(Error, Debug)]
pub enum ArticleSearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for ArticleSearchError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub mod commands;
pub mod config;
pub mod database;
pub mod search;
pub mod server;
