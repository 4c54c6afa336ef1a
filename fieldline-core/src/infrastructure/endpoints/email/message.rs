//! RFC 822 composition and Gmail payload decoding.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Value, json};

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Default)]
pub(crate) struct OutgoingEmail<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub cc: Option<&'a str>,
    pub reply_to: Option<&'a str>,
}

impl OutgoingEmail<'_> {
    /// Plain-text message with CRLF line endings. Line breaks inside header
    /// values are flattened to spaces so they cannot start a new header.
    pub(crate) fn to_rfc822(&self) -> String {
        let mut lines = vec![
            format!("To: {}", header_value(self.to)),
            format!("Subject: {}", header_value(self.subject)),
        ];
        if let Some(cc) = self.cc.filter(|cc| !cc.is_empty()) {
            lines.push(format!("Cc: {}", header_value(cc)));
        }
        if let Some(reply_to) = self.reply_to.filter(|r| !r.is_empty()) {
            lines.push(format!("Reply-To: {}", header_value(reply_to)));
        }
        lines.push("Content-Type: text/plain; charset=\"UTF-8\"".to_string());
        lines.push("MIME-Version: 1.0".to_string());
        lines.push(String::new());
        lines.push(self.body.to_string());
        lines.join("\r\n")
    }

    /// Value for the `raw` field of `messages/send`.
    pub(crate) fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_rfc822())
    }
}

fn header_value(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn header<'a>(payload: &'a Value, name: &str) -> &'a str {
    payload
        .get("headers")
        .and_then(Value::as_array)
        .and_then(|headers| {
            headers.iter().find(|h| {
                h.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
        })
        .and_then(|h| h.get("value"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn decode(data: &str) -> Option<String> {
    let bytes = LENIENT_URL_SAFE.decode(data).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// First `text/plain` body found, depth first.
pub(crate) fn extract_body(payload: &Value) -> Option<String> {
    if let Some(data) = payload.pointer("/body/data").and_then(Value::as_str) {
        return decode(data);
    }
    payload
        .get("parts")
        .and_then(Value::as_array)?
        .iter()
        .find_map(|part| {
            let plain = part.get("mimeType").and_then(Value::as_str) == Some("text/plain");
            match part.pointer("/body/data").and_then(Value::as_str) {
                Some(data) if plain => decode(data),
                _ if part.get("parts").is_some() => extract_body(part),
                _ => None,
            }
        })
}

/// Flattens a Gmail message resource into the summary shape.
pub(crate) fn summarize(message: &Value, include_body: bool) -> Value {
    let payload = message.get("payload").unwrap_or(&Value::Null);
    let unread = message
        .get("labelIds")
        .and_then(Value::as_array)
        .is_some_and(|labels| labels.iter().any(|l| l == "UNREAD"));
    let mut summary = json!({
        "id": message.get("id"),
        "threadId": message.get("threadId"),
        "subject": header(payload, "Subject"),
        "from": header(payload, "From"),
        "to": header(payload, "To"),
        "date": header(payload, "Date"),
        "snippet": message.get("snippet").and_then(Value::as_str).unwrap_or_default(),
        "unread": unread,
    });
    if include_body {
        summary["body"] = json!(extract_body(payload).unwrap_or_default());
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_headers_blank_line_and_body() {
        let email = OutgoingEmail {
            to: "sarah@example.com",
            subject: "Visit confirmed",
            body: "See you at 9.",
            cc: Some("office@example.com"),
            reply_to: None,
        };
        assert_eq!(
            email.to_rfc822(),
            "To: sarah@example.com\r\nSubject: Visit confirmed\r\nCc: office@example.com\r\n\
             Content-Type: text/plain; charset=\"UTF-8\"\r\nMIME-Version: 1.0\r\n\r\nSee you at 9."
        );
        let raw = email.encode();
        assert!(!raw.contains('=') && !raw.contains('+') && !raw.contains('/'));
        assert_eq!(decode(&raw).unwrap(), email.to_rfc822());
    }

    #[test]
    fn line_breaks_in_headers_cannot_add_headers() {
        let email = OutgoingEmail {
            to: "sarah@example.com\r\nBcc: spy@example.com",
            subject: "Invoice\nBcc: spy@example.com",
            body: "Line one\r\nLine two",
            cc: Some("office@example.com\r\n"),
            reply_to: Some("desk@example.com\rX-Extra: 1"),
        };
        let raw = email.to_rfc822();
        let (headers, body) = raw.split_once("\r\n\r\n").unwrap();
        assert!(!headers.lines().any(|line| line.starts_with("Bcc:") || line.starts_with("X-Extra:")));
        assert!(headers.starts_with("To: sarah@example.com Bcc: spy@example.com\r\n"));
        assert!(headers.contains("\r\nSubject: Invoice Bcc: spy@example.com\r\n"));
        assert!(headers.contains("\r\nCc: office@example.com\r\n"));
        assert!(headers.contains("\r\nReply-To: desk@example.com X-Extra: 1\r\n"));
        assert_eq!(body, "Line one\r\nLine two");
    }

    #[test]
    fn summary_reads_headers_and_unread_label() {
        let message = json!({
            "id": "m1",
            "threadId": "t1",
            "snippet": "The GFCI keeps tripping",
            "labelIds": ["INBOX", "UNREAD"],
            "payload": {
                "headers": [
                    { "name": "subject", "value": "Equipment Issue - Urgent" },
                    { "name": "From", "value": "emily@example.com" }
                ],
                "parts": [
                    { "mimeType": "text/html", "body": { "data": "PGI-aGk8L2I-" } },
                    { "mimeType": "text/plain", "body": { "data": "aGVsbG8" } }
                ]
            }
        });
        let summary = summarize(&message, true);
        assert_eq!(summary["subject"], "Equipment Issue - Urgent");
        assert_eq!(summary["to"], "");
        assert_eq!(summary["unread"], true);
        assert_eq!(summary["body"], "hello");
    }
}
