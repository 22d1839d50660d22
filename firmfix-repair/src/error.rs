use thiserror::Error;

/// Failure of one inference call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("inference request timed out")]
    Timeout,

    #[error("inference service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("inference transport error: {message}")]
    Transport { message: String },

    #[error("could not decode inference response: {message}")]
    Decode { message: String },
}

/// How the retry policy treats a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The model did not fit (memory, GPU, capacity). Worth trying a smaller fallback model.
    ResourceExhausted,
    Timeout,
    Other,
}

const EXHAUSTION_MARKERS: &[&str] = &[
    "out of memory",
    "requires more system memory",
    "insufficient memory",
    "not enough memory",
    "resource exhausted",
    "cuda error",
];

/// Classify a failure for the retry policy.
pub fn classify(err: &InferenceError) -> FailureClass {
    match err {
        InferenceError::Timeout => FailureClass::Timeout,
        InferenceError::Http { status: 507, .. } => FailureClass::ResourceExhausted,
        InferenceError::Http { body, .. } => {
            let body = body.to_ascii_lowercase();
            if EXHAUSTION_MARKERS.iter().any(|m| body.contains(m)) {
                FailureClass::ResourceExhausted
            } else {
                FailureClass::Other
            }
        }
        InferenceError::Transport { .. } | InferenceError::Decode { .. } => FailureClass::Other,
    }
}
