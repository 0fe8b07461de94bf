/// Errors that can occur across prlens.
///
/// Library crates return this type directly; the binary renders it through
/// `miette` at the boundary, which is why each variant carries a diagnostic
/// code and, where useful, a help hint.
///
/// # Examples
///
/// ```
/// use prlens_core::PrlensError;
///
/// let err = PrlensError::Config("GITHUB_TOKEN is not set".into());
/// assert!(err.to_string().contains("GITHUB_TOKEN"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PrlensError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(prlens::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(prlens::config))]
    Config(String),

    /// The requested GitHub resource does not exist (HTTP 404).
    #[error("{0} not found")]
    #[diagnostic(code(prlens::github::not_found))]
    NotFound(String),

    /// GitHub refused the request because of rate limiting (HTTP 403).
    #[error("rate limited by GitHub")]
    #[diagnostic(
        code(prlens::github::rate_limited),
        help("set GITHUB_TOKEN to raise the API rate limit, or wait for the limit to reset")
    )]
    RateLimited,

    /// Any other non-2xx GitHub response.
    #[error("GitHub API error {status}: {message}")]
    #[diagnostic(code(prlens::github::http))]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    #[diagnostic(code(prlens::github::network))]
    Network(String),

    /// GitHub rejected or never acknowledged a review comment.
    #[error("failed to post review comment: {0}")]
    #[diagnostic(code(prlens::github::post))]
    Post(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(prlens::serde))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(prlens::toml))]
    Toml(#[from] toml::de::Error),
}

impl PrlensError {
    /// Classify a non-success HTTP status into the error taxonomy.
    ///
    /// `subject` names the resource for the 404 message.
    ///
    /// # Examples
    ///
    /// ```
    /// use prlens_core::PrlensError;
    ///
    /// let err = PrlensError::from_status(404, "User octocat", "");
    /// assert_eq!(err.to_string(), "User octocat not found");
    ///
    /// assert!(matches!(
    ///     PrlensError::from_status(403, "User octocat", ""),
    ///     PrlensError::RateLimited
    /// ));
    /// ```
    pub fn from_status(status: u16, subject: &str, body: &str) -> Self {
        match status {
            404 => PrlensError::NotFound(subject.to_string()),
            403 => PrlensError::RateLimited,
            _ => PrlensError::Http {
                status,
                message: body.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PrlensError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = PrlensError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            PrlensError::from_status(404, "PR #3", ""),
            PrlensError::NotFound(ref s) if s == "PR #3"
        ));
        assert!(matches!(
            PrlensError::from_status(403, "x", ""),
            PrlensError::RateLimited
        ));
        let err = PrlensError::from_status(500, "x", "boom");
        assert_eq!(err.to_string(), "GitHub API error 500: boom");
    }
}
