#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::llm::{CompletionClient, CompletionError, CompletionFuture};
use shared::models::{ChatMessage, ChatRole};

pub enum ScriptedReply {
    Echo,
    EchoAfter(Duration),
    Fail(CompletionError),
}

/// In-process completion client that records every request and answers
/// `reply to: <last user message>` unless scripted otherwise.
#[derive(Default)]
pub struct ScriptedCompletionClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletionClient {
    pub fn echo() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_replies(replies: Vec<ScriptedReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from(replies)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .expect("requests mutex should not be poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("requests mutex should not be poisoned")
            .len()
    }
}

pub fn echo_reply(prompt: &str) -> String {
    format!("reply to: {prompt}")
}

impl CompletionClient for ScriptedCompletionClient {
    fn complete<'a>(&'a self, messages: Vec<ChatMessage>) -> CompletionFuture<'a> {
        let last_user_prompt = messages
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::User)
            .map(|message| message.content.clone())
            .unwrap_or_default();

        self.requests
            .lock()
            .expect("requests mutex should not be poisoned")
            .push(messages);
        let reply = self
            .replies
            .lock()
            .expect("replies mutex should not be poisoned")
            .pop_front()
            .unwrap_or(ScriptedReply::Echo);

        Box::pin(async move {
            match reply {
                ScriptedReply::Echo => Ok(ChatMessage::assistant(echo_reply(&last_user_prompt))),
                ScriptedReply::EchoAfter(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(ChatMessage::assistant(echo_reply(&last_user_prompt)))
                }
                ScriptedReply::Fail(err) => Err(err),
            }
        })
    }
}
