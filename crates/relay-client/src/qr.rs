//! Terminal rendering of login QR codes.

use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;

use crate::error::{ClientError, Result};

/// Renders a pairing QR payload into terminal-friendly text.
///
/// Uses Unicode half blocks so two QR rows fit in one terminal line.
pub fn render_qr(payload: &str) -> Result<String> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ClientError::QrRender("QR payload is empty".into()));
    }

    let code = QrCode::new(payload.as_bytes()).map_err(|e| ClientError::QrRender(e.to_string()))?;

    Ok(code.render::<Dense1x2>().quiet_zone(true).build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_qr() {
        let rendered = render_qr("2@AbCdEf,ghIjKl==,MnOpQr==,1").unwrap();
        assert!(rendered.lines().count() > 10);
        assert!(rendered.contains('█') || rendered.contains('▀') || rendered.contains('▄'));
    }

    #[test]
    fn test_render_empty_payload() {
        assert!(matches!(render_qr("   "), Err(ClientError::QrRender(_))));
    }
}
