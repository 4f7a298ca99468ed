use thiserror::Error;

/// Failure of an operation against the backend, classified at the Data
/// Client boundary so every consumer sees the same taxonomy.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("no response from backend: {0}")]
    Network(String),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned {status}: {body_excerpt}")]
    Backend { status: u16, body_excerpt: String },

    /// The response arrived but its JSON shape was unusable even after
    /// defensive defaulting.
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn backend(status: u16, body: &str) -> Self {
        ApiError::Backend {
            status,
            body_excerpt: body.chars().take(200).collect(),
        }
    }
}

/// Malformed user-entered date/time. Surfaced immediately and blocks
/// submission; never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {0}")]
pub struct InvalidInput(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_excerpt_is_truncated() {
        let body = "x".repeat(500);
        match ApiError::backend(502, &body) {
            ApiError::Backend {
                status,
                body_excerpt,
            } => {
                assert_eq!(status, 502);
                assert_eq!(body_excerpt.len(), 200);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
