//! Request DTOs for the API.

use serde::{Deserialize, Deserializer};

/// Send message request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendRequest {
    /// Recipient phone number, as a string or a number.
    #[serde(default, deserialize_with = "phone_string")]
    pub phone: Option<String>,
    /// Message text; used as the caption when media is attached.
    #[serde(default)]
    pub message: Option<String>,
    /// Optional URL of media to attach.
    #[serde(default, rename = "qrcode", alias = "mediaUrl")]
    pub media_url: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSend {
    pub phone: String,
    pub message: String,
    pub media_url: Option<String>,
}

impl SendRequest {
    /// Checks required fields. Empty strings count as missing; a blank
    /// phone number does too.
    pub fn validate(self) -> Option<ValidSend> {
        let phone = self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())?;
        let message = self.message.filter(|m| !m.is_empty())?;
        let media_url = self.media_url.filter(|u| !u.is_empty());

        Some(ValidSend {
            phone,
            message,
            media_url,
        })
    }
}

fn phone_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Phone {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Phone>::deserialize(deserializer)?.map(|phone| match phone {
        Phone::Text(s) => s,
        Phone::Number(n) => n.to_string(),
    }))
}
