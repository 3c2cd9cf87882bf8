use thiserror::Error;

/// Transport-level probe failures.
///
/// These are distinct from "not detected": a sniffer that hits one of these
/// could not observe the target at all, and the engine reports that
/// separately so the caller can tell "unreachable" from "reachable but not
/// this product".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("probe timed out: {0}")]
    Timeout(String),

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    #[error("invalid probe request: {0}")]
    InvalidRequest(String),

    #[error("http error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        let msg = err.to_string();
        if err.is_timeout() {
            ProbeError::Timeout(msg)
        } else if err.is_connect() {
            // reqwest folds TLS failures into connect errors; split them out
            // so the report names the actual obstacle
            let lower = msg.to_lowercase();
            if lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake")
            {
                ProbeError::Tls(msg)
            } else {
                ProbeError::Connect(msg)
            }
        } else if err.is_builder() {
            ProbeError::InvalidRequest(msg)
        } else {
            ProbeError::Http(msg)
        }
    }
}
