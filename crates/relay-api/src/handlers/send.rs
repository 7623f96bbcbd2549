//! Message sending handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use relay_client::{ChatId, MessagePayload};
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{MessageResponse, SendRequest};

/// Success message for `/send-whatsapp`.
pub const SENT_MESSAGE: &str = "WhatsApp message sent successfully";

/// POST /send-whatsapp - Send a text message, or media captioned with it.
///
/// Readiness is checked before the body is looked at.
pub async fn send_whatsapp(
    State(state): State<AppState>,
    body: std::result::Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    if !state.is_ready() {
        return Err(ApiError::NotReady);
    }

    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = request
        .validate()
        .ok_or_else(|| ApiError::BadRequest("phone and message are required".into()))?;

    let chat_id = ChatId::from_phone(&request.phone)?;

    let payload = match &request.media_url {
        Some(url) => {
            let media = state.media.fetch(url).await?;
            debug!(
                mimetype = %media.mimetype,
                filesize = media.filesize(),
                "Attaching media"
            );
            MessagePayload::media_with_caption(media, request.message)
        }
        None => MessagePayload::text(request.message),
    };

    state.client.send_message(&chat_id, &payload).await?;

    info!(chat_id = %chat_id, kind = payload.kind(), "WhatsApp message sent");
    Ok(Json(MessageResponse::new(SENT_MESSAGE)))
}
