//! Dispatch failures — every way a `get_answer` call can fail, as one enum.

use cotask_core::types::ProviderTag;
use thiserror::Error;

/// The outcome of one dispatch: the answer text, or why there isn't one.
pub type AnswerResult = Result<String, DispatchError>;

/// Fieldless discriminant of `DispatchError`, for callers that only branch on the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    ProviderRejected,
    MalformedResponse,
    TransportError,
    UnknownProvider,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No API key stored for the resolved provider. No request was sent.
    #[error("no API key configured for {}; add one in settings", .provider.display_name())]
    MissingCredential { provider: ProviderTag },

    /// The provider answered with a non-2xx status.
    #[error("{} rejected the request (HTTP {status}): {message}", .provider.display_name())]
    ProviderRejected {
        provider: ProviderTag,
        status: u16,
        message: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response from {}: {detail}", .provider.display_name())]
    MalformedResponse {
        provider: ProviderTag,
        detail: String,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The request never produced a usable response (DNS, connect, timeout, invalid JSON).
    #[error("request to {} failed: {detail}", .provider.display_name())]
    TransportError { provider: ProviderTag, detail: String },

    /// The model matched no provider and the fallback policy refuses to guess.
    #[error("model '{model}' does not match any known provider")]
    UnknownProvider { model: String },

    /// The caller cancelled the request before a response arrived.
    #[error("request to {} was cancelled", .provider.display_name())]
    Cancelled { provider: ProviderTag },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::MissingCredential { .. } => ErrorKind::MissingCredential,
            DispatchError::ProviderRejected { .. } => ErrorKind::ProviderRejected,
            DispatchError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            DispatchError::TransportError { .. } => ErrorKind::TransportError,
            DispatchError::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            DispatchError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// The provider the failure belongs to. `None` only for `UnknownProvider`.
    pub fn provider(&self) -> Option<ProviderTag> {
        match self {
            DispatchError::MissingCredential { provider }
            | DispatchError::ProviderRejected { provider, .. }
            | DispatchError::MalformedResponse { provider, .. }
            | DispatchError::TransportError { provider, .. }
            | DispatchError::Cancelled { provider } => Some(*provider),
            DispatchError::UnknownProvider { .. } => None,
        }
    }
}
