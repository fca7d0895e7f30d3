//! # Stream Errors
//!
//! This module defines the error types that travel through streams.
//! By centralizing error definitions, every operator, cache and join strategy
//! reports failures the same way.
//!
//! Errors are `Clone`: a [`MulticastCache`](crate::cache::MulticastCache) delivers
//! the same failure to every subscriber it holds.

/// A remote resource call failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The backend answered with an unsuccessful status code.
    #[error("Backend returned code {status}: {body}")]
    Status { status: u16, body: String },

    /// A client-side or network failure; no response was received.
    #[error("An error occurred: {0}")]
    Network(String),

    /// The resource store is gone (its channel closed or the response was dropped).
    #[error("Resource store unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Shorthand for a status failure, e.g. `FetchError::status(500, "boom")`.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Status code of the failure, when the backend produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error carried by the `Error` event of a [`Stream`](crate::Stream).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// A remote fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A dependent per-item fetch inside a join strategy failed.
    #[error("Dependent fetch failed: {0}")]
    Join(Box<StreamError>),
}

impl StreamError {
    /// Wraps an inner error raised by a dependent fetch.
    ///
    /// Nested joins wrap once: an error that is already a join error is kept as is.
    pub fn join(inner: StreamError) -> Self {
        match inner {
            Self::Join(_) => inner,
            Self::Fetch(_) => Self::Join(Box::new(inner)),
        }
    }

    /// The innermost fetch failure, looking through any join wrappers.
    pub fn root_fetch_error(&self) -> &FetchError {
        match self {
            Self::Fetch(e) => e,
            Self::Join(inner) => inner.root_fetch_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_mentions_code() {
        let err = StreamError::from(FetchError::status(500, "Internal Server Error"));
        assert_eq!(
            err.to_string(),
            "Backend returned code 500: Internal Server Error"
        );
    }

    #[test]
    fn test_join_error_keeps_root_cause() {
        let err = StreamError::join(FetchError::status(404, "no supplier").into());
        assert!(err.to_string().contains("404"));
        assert_eq!(err.root_fetch_error().status_code(), Some(404));

        let nested = StreamError::join(err.clone());
        assert_eq!(nested, err);
    }
}
