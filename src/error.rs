use thiserror::Error;

/// Failures talking to the broker bridge or decoding what it sends back.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("bridge unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("bridge returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },

    /// A single record inside an otherwise valid payload did not match its schema.
    #[error("unparsable upstream {kind} record #{index}: {reason}")]
    UnparsableRecord {
        kind: &'static str,
        index: usize,
        reason: String,
    },
}

impl BridgeError {
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            BridgeError::Unreachable { endpoint, .. }
            | BridgeError::Status { endpoint, .. }
            | BridgeError::Decode { endpoint, .. } => Some(endpoint),
            BridgeError::UnparsableRecord { .. } => None,
        }
    }
}
