use anyhow::Context as _;
use thiserror::Error;

/// Failures of the rating core.
///
/// Exhausted pairings are not an error (the selector returns `None`) and a
/// missing rating state is recovered by `StatsStore::ensure`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankingError {
    #[error("volatility solver did not converge within {iterations} iterations")]
    NumericNonConvergence { iterations: usize },

    #[error("history index {index} is out of range (history holds {len} entries)")]
    InconsistentHistoryIndex { index: usize, len: usize },

    #[error("failed to persist '{key}': {message}")]
    PersistenceWriteFailure { key: String, message: String },
}

/// Add context to storage errors
pub fn storage_context(operation: &str, key: &str) -> String {
    format!("Failed to {} storage key: {}", operation, key)
}

/// Add context to catalog errors
pub fn catalog_context(path: &str) -> String {
    format!("Failed to load item catalog from: {}", path)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failure() {
        let err = RankingError::InconsistentHistoryIndex { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "history index 7 is out of range (history holds 3 entries)"
        );

        let err = RankingError::NumericNonConvergence { iterations: 100 };
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_parse_context_wraps_source() {
        let result: Result<u32, _> = "nope".parse::<u32>();
        let err = with_parse_context(result, "battle count").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse battle count");
    }
}
