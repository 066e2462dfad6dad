pub mod context;
pub mod gateway;
pub mod groq;
pub mod prompts;

pub use context::build_completion_messages;
pub use gateway::{CompletionClient, CompletionError, CompletionFuture};
pub use groq::{GroqClientConfig, GroqCompletionClient, chat_completions_url};
pub use prompts::{OFF_TOPIC_REPLY, Preamble, agency_preamble};
