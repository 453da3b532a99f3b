//! Raw message decoding.
//!
//! Turns a transport-encoded message into a subject and a plain-text body.
//! Only the transport layer can fail. Damaged transfer encodings inside the
//! MIME structure decode as far as they can, and a missing body is empty.

use equiscan_mime::encoding::decode_base64_url;
use equiscan_mime::{Headers, Message, Part};
use tracing::debug;

use crate::error::DecodeError;

/// Subject and body text of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Subject header, RFC 2047 decoded; empty if absent.
    pub subject: String,
    /// First `text/plain` body, possibly empty.
    pub body_text: String,
}

impl DecodedMessage {
    /// Subject and body joined by a single space, the text searched for an
    /// equipment identifier.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.body_text)
    }
}

/// Decodes a raw message as delivered by the mail service.
///
/// `raw` is the URL-safe Base64 encoding of an RFC 5322 message.
///
/// # Errors
///
/// Returns [`DecodeError`] only if the transport encoding is malformed.
pub fn decode(raw: &[u8]) -> Result<DecodedMessage, DecodeError> {
    if let Some(offset) = raw.iter().position(|b| !b.is_ascii()) {
        return Err(DecodeError::NotAscii { offset });
    }
    // ASCII was checked above, so this cannot substitute anything
    let encoded = String::from_utf8_lossy(raw);
    let bytes = decode_base64_url(&encoded)?;

    Ok(decode_mime(&bytes))
}

/// Decodes an already transport-decoded RFC 5322 message.
#[must_use]
pub fn decode_mime(bytes: &[u8]) -> DecodedMessage {
    let message = Message::parse(bytes);

    let subject = message.subject().map(decode_subject).unwrap_or_default();
    let body_text = if message.is_multipart() {
        first_plain_text(&message)
    } else {
        message.decode_text_lossy()
    };

    DecodedMessage { subject, body_text }
}

fn decode_subject(raw: &str) -> String {
    Headers::decode_value(raw).unwrap_or_else(|e| {
        debug!(error = %e, "Subject is not valid RFC 2047, keeping raw text");
        raw.to_string()
    })
}

/// Body of the first `text/plain` part, in depth-first order.
fn first_plain_text(message: &Message) -> String {
    message
        .walk()
        .into_iter()
        .find(|part| part.content_type().is_text_plain())
        .map(Part::decode_text_lossy)
        .unwrap_or_else(|| {
            debug!("Multipart message has no text/plain part");
            String::new()
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE;

    fn encode(message: &[u8]) -> Vec<u8> {
        URL_SAFE.encode(message).into_bytes()
    }

    #[test]
    fn test_plain_message() {
        let raw = encode(
            b"Subject: Equipment\r\n\r\nScan 12345678-1234-1234-1234-123456789abc done",
        );
        let decoded = decode(&raw).unwrap();

        assert_eq!(decoded.subject, "Equipment");
        assert!(
            decoded
                .body_text
                .contains("Scan 12345678-1234-1234-1234-123456789abc done")
        );
        let id = extract(&decoded.combined_text()).unwrap();
        assert_eq!(id.as_str(), "12345678-1234-1234-1234-123456789abc");
    }

    #[test]
    fn test_missing_subject_is_empty() {
        let decoded = decode(&encode(b"From: a@example.com\r\n\r\nbody")).unwrap();
        assert_eq!(decoded.subject, "");
        assert_eq!(decoded.body_text, "body");
        assert_eq!(decoded.combined_text(), " body");
    }

    #[test]
    fn test_encoded_subject() {
        let raw = encode(b"Subject: =?utf-8?B?U2NhbiDinJM=?=\r\n\r\n");
        assert_eq!(decode(&raw).unwrap().subject, "Scan \u{2713}");
    }

    #[test]
    fn test_bad_encoded_subject_falls_back_to_raw() {
        let raw = encode(b"Subject: =?utf-8?Z?abc?=\r\n\r\n");
        assert_eq!(decode(&raw).unwrap().subject, "=?utf-8?Z?abc?=");
    }

    #[test]
    fn test_unpadded_transport_encoding() {
        let padded = URL_SAFE.encode(b"Subject: x\r\n\r\nab");
        let unpadded = padded.trim_end_matches('=');
        assert_eq!(decode(unpadded.as_bytes()).unwrap().body_text, "ab");
    }

    #[test]
    fn test_malformed_transport_is_error() {
        assert!(matches!(
            decode(b"***not base64***"),
            Err(DecodeError::Transport(_))
        ));
        assert!(matches!(
            decode("caf\u{e9}".as_bytes()),
            Err(DecodeError::NotAscii { offset: 3 })
        ));
    }

    #[test]
    fn test_multipart_first_plain_part_with_invalid_utf8() {
        let mut message = Vec::new();
        message.extend_from_slice(
            b"Subject: Multi\r\n\
              Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
              \r\n\
              --sep\r\n\
              Content-Type: text/plain; charset=utf-8\r\n\
              \r\n\
              bad \xff\xfe bytes aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee\r\n\
              --sep\r\n\
              Content-Type: text/plain\r\n\
              \r\n\
              second 11111111-2222-3333-4444-555555555555\r\n\
              --sep--\r\n",
        );

        let decoded = decode(&encode(&message)).unwrap();
        assert!(decoded.body_text.starts_with("bad \u{FFFD}\u{FFFD} bytes"));
        let id = extract(&decoded.combined_text()).unwrap();
        assert_eq!(id.as_str(), "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
    }

    #[test]
    fn test_multipart_skips_html_and_attachments() {
        let message = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n",
            "\r\n",
            "--b\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<b>aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee</b>\r\n",
            "--b\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "tag=3D11111111-2222-3333-4444-555555555555\r\n",
            "--b--\r\n"
        );

        let decoded = decode(&encode(message.as_bytes())).unwrap();
        assert_eq!(decoded.body_text, "tag=11111111-2222-3333-4444-555555555555");
    }

    #[test]
    fn test_multipart_damaged_base64_part_still_decodes() {
        // "Scan aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee" with a stray line
        let message = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n",
            "\r\n",
            "--b\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "U2NhbiBhYWFhYWFhYS1iYmJi\r\n",
            ".\r\n",
            "LWNjY2MtZGRkZC1lZWVlZWVlZWVlZWU=\r\n",
            "--b\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "second 11111111-2222-3333-4444-555555555555\r\n",
            "--b--\r\n"
        );

        let decoded = decode(&encode(message.as_bytes())).unwrap();
        assert_eq!(decoded.body_text, "Scan aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
        let id = extract(&decoded.combined_text()).unwrap();
        assert_eq!(id.as_str(), "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
    }

    #[test]
    fn test_first_plain_part_wins_even_when_empty() {
        let message = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n",
            "\r\n",
            "--b\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "!!!!\r\n",
            "--b\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "fallback\r\n",
            "--b--\r\n"
        );

        assert_eq!(decode(&encode(message.as_bytes())).unwrap().body_text, "");
    }

    #[test]
    fn test_quoted_printable_with_bare_equals_keeps_identifier() {
        let message = concat!(
            "Subject: check-in\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "price = 5\r\n",
            "id aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee\r\n"
        );

        let decoded = decode(&encode(message.as_bytes())).unwrap();
        assert_eq!(
            decoded.body_text,
            "price = 5\r\nid aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee\r\n"
        );
        let id = extract(&decoded.combined_text()).unwrap();
        assert_eq!(id.as_str(), "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
    }

    #[test]
    fn test_quoted_printable_trailing_equals_keeps_identifier() {
        let message = concat!(
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "id aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee="
        );

        let decoded = decode(&encode(message.as_bytes())).unwrap();
        let id = extract(&decoded.combined_text()).unwrap();
        assert_eq!(id.as_str(), "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
    }

    #[test]
    fn test_body_without_blank_line_is_searched() {
        let message = b"Subject: scan\r\naaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee\r\n";
        let decoded = decode(&encode(message)).unwrap();
        assert_eq!(decoded.subject, "scan");
        assert_eq!(decoded.body_text, "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee\r\n");
    }

    #[test]
    fn test_multipart_without_plain_part_has_empty_body() {
        let message = concat!(
            "Subject: only html\r\n",
            "Content-Type: multipart/alternative; boundary=b\r\n",
            "\r\n",
            "--b\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<p>hi</p>\r\n",
            "--b--\r\n"
        );

        let decoded = decode(&encode(message.as_bytes())).unwrap();
        assert_eq!(decoded.subject, "only html");
        assert_eq!(decoded.body_text, "");
    }

    #[test]
    fn test_single_part_base64_with_no_valid_data_is_empty_body() {
        let message = b"Subject: s\r\nContent-Transfer-Encoding: base64\r\n\r\n%%%";
        let decoded = decode(&encode(message)).unwrap();
        assert_eq!(decoded.subject, "s");
        assert_eq!(decoded.body_text, "");
    }
}
