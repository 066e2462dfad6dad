use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{PromptRequest, PromptResponse};
use tracing::warn;

use super::AppState;
use super::errors::{INVALID_BODY_MESSAGE, bad_request_response, conversation_error_response};

pub(super) async fn submit_prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "rejected undecodable prompt body");
            return bad_request_response(INVALID_BODY_MESSAGE);
        }
    };

    match state
        .conversations
        .reply(request.user_id.as_deref(), request.prompt.as_deref())
        .await
    {
        Ok(reply) => (
            StatusCode::OK,
            Json(PromptResponse {
                prompt: reply.prompt,
                bot_response: reply.bot_response,
            }),
        )
            .into_response(),
        Err(err) => conversation_error_response(err),
    }
}
