use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::conversation::ConversationError;
use shared::llm::CompletionError;
use shared::models::ErrorResponse;
use tracing::{error, warn};

pub(super) const MISSING_USER_ID_MESSAGE: &str = "userId is required to track conversations.";
pub(super) const MISSING_PROMPT_MESSAGE: &str = "prompt is required.";
pub(super) const INVALID_BODY_MESSAGE: &str = "Invalid request body.";
pub(super) const EMPTY_COMPLETION_MESSAGE: &str = "Failed to get a response from the GROQ API.";
pub(super) const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred.";
pub(super) const ORIGIN_NOT_ALLOWED_MESSAGE: &str = "Origin not allowed.";

pub(super) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub(super) fn bad_request_response(message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub(super) fn conversation_error_response(err: ConversationError) -> Response {
    match err {
        ConversationError::MissingUserId => bad_request_response(MISSING_USER_ID_MESSAGE),
        ConversationError::MissingPrompt => bad_request_response(MISSING_PROMPT_MESSAGE),
        ConversationError::Completion(CompletionError::EmptyCompletion) => {
            warn!("completion provider returned no usable choice");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, EMPTY_COMPLETION_MESSAGE)
        }
        ConversationError::Completion(other) => {
            error!(error = %other, "error interacting with completion provider");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}
