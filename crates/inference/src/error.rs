use thiserror::Error;

/// Failures of a single exchange with the inference endpoint. None are retried.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Inference endpoint returned status {status}")]
    UpstreamFailure { status: u16, body: String },

    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),

    #[error("Inference endpoint unreachable: {0}")]
    Unreachable(String),
}

impl GatewayError {
    /// Short machine-readable kind, for logs and debug payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamFailure { .. } => "upstream_failure",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Unreachable(_) => "unreachable",
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failure_mentions_status() {
        let err = GatewayError::UpstreamFailure {
            status: 503,
            body: "loading".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert_eq!(err.kind(), "upstream_failure");
    }
}
