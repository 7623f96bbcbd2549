//! Liveness handler.

/// Body returned by `GET /`.
pub const ROOT_TEXT: &str = "WhatsApp relay is running";

/// GET / - Liveness text. Does not reflect session readiness.
pub async fn root() -> &'static str {
    ROOT_TEXT
}
