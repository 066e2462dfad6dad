use crate::models::ChatMessage;

/// Composes the exact sequence sent to the completion client:
/// `preamble ++ history ++ [new_user_message]`. Inputs are left untouched.
pub fn build_completion_messages(
    preamble: &[ChatMessage],
    history: &[ChatMessage],
    new_user_message: &ChatMessage,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(preamble.len() + history.len() + 1);
    messages.extend_from_slice(preamble);
    messages.extend_from_slice(history);
    messages.push(new_user_message.clone());
    messages
}
