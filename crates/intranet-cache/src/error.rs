use thiserror::Error;

/// Errors reported by cleanup targets to the [`CleanupRegistry`](crate::CleanupRegistry).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cleanup of cache '{cache}' failed: {message}")]
    CleanupFailed { cache: String, message: String },

    #[error("Cache '{cache}' panicked: {message}")]
    Panicked { cache: String, message: String },
}

impl CacheError {
    pub fn cleanup_failed(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CleanupFailed {
            cache: cache.into(),
            message: message.into(),
        }
    }

    pub fn panicked(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            cache: cache.into(),
            message: message.into(),
        }
    }

    /// Name of the cache the error belongs to.
    pub fn cache(&self) -> &str {
        match self {
            Self::CleanupFailed { cache, .. } | Self::Panicked { cache, .. } => cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_cache() {
        let err = CacheError::cleanup_failed("user", "lock poisoned");
        assert_eq!(
            err.to_string(),
            "Cleanup of cache 'user' failed: lock poisoned"
        );
        assert_eq!(err.cache(), "user");

        let err = CacheError::panicked("branch", "boom");
        assert_eq!(err.to_string(), "Cache 'branch' panicked: boom");
    }
}
