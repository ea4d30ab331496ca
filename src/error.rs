use thiserror::Error;

/// Raised when a session cannot be built from the configured word list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("word list is empty")]
    EmptyWordList,
    #[error("word #{index} is empty")]
    EmptyWord { index: usize },
}
