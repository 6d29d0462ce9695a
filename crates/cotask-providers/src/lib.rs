//! LLM provider layer for CoTask.
//!
//! Turns one user question plus page context into a single answer string,
//! whichever of the six supported providers the model belongs to.
//!
//! # Architecture
//!
//! - [`registry`] — static specs for all 6 providers + prefix matching
//! - [`request`] — per-provider request builders and prompt composition
//! - [`normalize`] — per-provider response normalizers
//! - [`transport::ReqwestTransport`] — the HTTP transport
//! - [`dispatcher::Dispatcher`] — resolve, authenticate, send, normalize

pub mod dispatcher;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod request;
pub mod traits;
pub mod transport;

// Re-export main types for convenience
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{AnswerResult, DispatchError, ErrorKind};
pub use registry::{find_by_tag, match_prefix, resolve_provider, ProviderSpec, PROVIDERS};
pub use request::{GenerationParams, ProviderRequest};
pub use traits::{CredentialStore, RawResponse, Transport};
pub use transport::ReqwestTransport;
