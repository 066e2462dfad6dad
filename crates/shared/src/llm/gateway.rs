use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::models::ChatMessage;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ChatMessage, CompletionError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request has no messages")]
    EmptyRequest,
    #[error("completion provider request timed out")]
    Timeout,
    #[error("completion provider unreachable: {0}")]
    Transport(String),
    #[error("completion provider request failed: status={status} code={code}")]
    ProviderFailure { status: u16, code: String },
    #[error("completion provider returned an invalid payload: {0}")]
    InvalidPayload(String),
    #[error("completion provider returned no usable choice")]
    EmptyCompletion,
}

/// A single remote chat-completion call. Implementations hold no
/// conversation state and never retry.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, messages: Vec<ChatMessage>) -> CompletionFuture<'a>;
}
