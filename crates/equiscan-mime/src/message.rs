//! Entity tree of a parsed RFC 5322 message.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64_body, decode_quoted_printable};
use crate::header::{Headers, is_header_line};

/// Multipart bodies nested deeper than this are left unsplit.
const MAX_DEPTH: usize = 32;

/// How an entity body is encoded for transport (RFC 2045 section 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// `7bit`, `8bit`, `binary` or anything unrecognized: bytes as-is.
    #[default]
    Identity,
    /// `base64`.
    Base64,
    /// `quoted-printable`.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Interprets a `Content-Transfer-Encoding` value, case-insensitively.
    #[must_use]
    pub fn from_header(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("base64") {
            Self::Base64
        } else if value.eq_ignore_ascii_case("quoted-printable") {
            Self::QuotedPrintable
        } else {
            Self::Identity
        }
    }

    fn of(headers: &Headers) -> Self {
        headers
            .get("content-transfer-encoding")
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// Undoes the encoding. Damaged input decodes as far as it can, so a
    /// stray byte never costs the rest of the body.
    #[must_use]
    pub fn decode(self, body: &[u8]) -> Vec<u8> {
        match self {
            Self::Identity => body.to_vec(),
            Self::Base64 => decode_base64_body(body),
            Self::QuotedPrintable => decode_quoted_printable(body),
        }
    }
}

/// One entity inside a multipart body. Multipart entities carry their
/// children in `parts`.
#[derive(Debug, Clone)]
pub struct Part {
    /// Entity headers.
    pub headers: Headers,
    /// Body bytes, still transfer-encoded.
    pub body: Vec<u8>,
    /// Child entities, if this one is multipart.
    pub parts: Vec<Part>,
}

impl Part {
    /// A leaf entity.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self {
            headers,
            body,
            parts: Vec::new(),
        }
    }

    fn parse(raw: &[u8], depth: usize) -> Self {
        let (headers, body) = split_entity(raw);
        let parts = if depth < MAX_DEPTH {
            parse_children(&content_type_of(&headers), body, depth + 1).unwrap_or_default()
        } else {
            Vec::new()
        };

        Self {
            headers,
            body: body.to_vec(),
            parts,
        }
    }

    /// `Content-Type`, or `text/plain` when absent or malformed.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        content_type_of(&self.headers)
    }

    /// `Content-Transfer-Encoding` of the body.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        TransferEncoding::of(&self.headers)
    }

    /// Body with the transfer encoding removed.
    #[must_use]
    pub fn decode_body(&self) -> Vec<u8> {
        self.transfer_encoding().decode(&self.body)
    }

    /// Decoded body as text; invalid UTF-8 becomes U+FFFD.
    #[must_use]
    pub fn decode_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.decode_body()).into_owned()
    }
}

/// A top-level message.
///
/// Parsing never fails: header lines that make no sense are dropped, a
/// missing or malformed `Content-Type` reads as `text/plain`, and a
/// multipart type without a boundary leaves the body whole.
#[derive(Debug, Clone)]
pub struct Message {
    /// Top-level headers.
    pub headers: Headers,
    /// Body bytes; for multipart messages this still holds the raw parts.
    pub body: Vec<u8>,
    /// Top-level entities of a multipart message.
    pub parts: Vec<Part>,
    multipart: bool,
}

impl Message {
    /// Parses raw message bytes.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let (headers, body) = split_entity(raw);
        let children = parse_children(&content_type_of(&headers), body, 1);

        Self {
            headers,
            body: body.to_vec(),
            multipart: children.is_some(),
            parts: children.unwrap_or_default(),
        }
    }

    /// `Content-Type`, or `text/plain` when absent or malformed.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        content_type_of(&self.headers)
    }

    /// Whether the body was split into parts.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        self.multipart
    }

    /// Undecoded `Subject` header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Body text of a single-part message; empty for multipart ones.
    #[must_use]
    pub fn decode_text_lossy(&self) -> String {
        if self.multipart {
            return String::new();
        }
        let bytes = TransferEncoding::of(&self.headers).decode(&self.body);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// All entities, depth first, each container before its children.
    #[must_use]
    pub fn walk(&self) -> Vec<&Part> {
        let mut out = Vec::new();
        let mut stack: Vec<&Part> = self.parts.iter().rev().collect();
        while let Some(part) = stack.pop() {
            out.push(part);
            stack.extend(part.parts.iter().rev());
        }
        out
    }
}

fn content_type_of(headers: &Headers) -> ContentType {
    headers
        .get("content-type")
        .and_then(|value| ContentType::parse(value).ok())
        .unwrap_or_else(ContentType::text_plain)
}

/// Parses the children of a multipart body, or returns `None` if the
/// content type is not multipart or lacks a boundary.
fn parse_children(content_type: &ContentType, body: &[u8], depth: usize) -> Option<Vec<Part>> {
    if !content_type.is_multipart() {
        return None;
    }
    let boundary = content_type.boundary().filter(|b| !b.is_empty())?;

    Some(
        split_multipart(body, boundary)
            .into_iter()
            .map(|raw| Part::parse(raw, depth))
            .collect(),
    )
}

/// Parses the header block and returns it with the body. The body follows
/// the first empty line, or starts at the first line that cannot belong to
/// a header block.
fn split_entity(raw: &[u8]) -> (Headers, &[u8]) {
    let mut offset = 0;
    let mut body: &[u8] = &[];
    for line in raw.split_inclusive(|&b| b == b'\n') {
        if line == b"\n" || line == b"\r\n" {
            body = &raw[offset + line.len()..];
            break;
        }
        if !is_header_line(line.strip_suffix(b"\n").unwrap_or(line)) {
            body = &raw[offset..];
            break;
        }
        offset += line.len();
    }
    (Headers::parse(&String::from_utf8_lossy(&raw[..offset])), body)
}

/// Splits a multipart body on `--boundary` delimiter lines.
///
/// The preamble and epilogue are discarded. A body that ends without the
/// closing `--boundary--` keeps its last part.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;

    for line in body.split_inclusive(|&b| b == b'\n') {
        let line_start = offset;
        offset += line.len();

        let Some(rest) = trim_line_end(line).strip_prefix(delimiter.as_bytes()) else {
            continue;
        };
        let closing = rest == b"--";
        if !rest.is_empty() && !closing {
            continue;
        }

        if let Some(s) = start.take() {
            parts.push(strip_trailing_newline(&body[s..line_start]));
        }
        if closing {
            return parts;
        }
        start = Some(offset);
    }

    if let Some(s) = start {
        parts.push(&body[s..]);
    }
    parts
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b'\r' | b'\n' | b' ' | b'\t'))
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// The line break before a delimiter belongs to the delimiter.
fn strip_trailing_newline(part: &[u8]) -> &[u8] {
    part.strip_suffix(b"\r\n")
        .or_else(|| part.strip_suffix(b"\n"))
        .unwrap_or(part)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_encoding_header_values() {
        assert_eq!(TransferEncoding::from_header(" Base64 "), TransferEncoding::Base64);
        assert_eq!(
            TransferEncoding::from_header("QUOTED-PRINTABLE"),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(TransferEncoding::from_header("8bit"), TransferEncoding::Identity);
        assert_eq!(TransferEncoding::from_header("x-uuencode"), TransferEncoding::Identity);
    }

    #[test]
    fn test_part_decode_text_lossy() {
        let mut headers = Headers::new();
        headers.add("content-type", "text/plain; charset=utf-8");
        let part = Part::new(headers, b"Hello, \xffWorld!".to_vec());

        assert_eq!(part.decode_text_lossy(), "Hello, \u{FFFD}World!");
    }

    #[test]
    fn test_part_base64_body() {
        let mut headers = Headers::new();
        headers.add("content-transfer-encoding", "base64");
        let part = Part::new(headers, b"SGVsbG8s\r\nIFdvcmxkIQ==\r\n".to_vec());

        assert_eq!(part.decode_text_lossy(), "Hello, World!");
    }

    #[test]
    fn test_part_damaged_base64_body_keeps_text() {
        let mut headers = Headers::new();
        headers.add("content-transfer-encoding", "base64");
        let part = Part::new(headers, b"SGVsbG8s\r\n.\r\nIFdvcmxkIQ==\r\n".to_vec());

        assert_eq!(part.decode_text_lossy(), "Hello, World!");
    }

    #[test]
    fn test_part_quoted_printable_with_stray_equals() {
        let mut headers = Headers::new();
        headers.add("Content-Transfer-Encoding", "quoted-printable");
        let part = Part::new(headers, b"price = 5=\r\n0 =E2=9C=93 tag=".to_vec());

        assert_eq!(part.decode_text_lossy(), "price = 50 \u{2713} tag");
    }

    #[test]
    fn test_parse_single_part() {
        let raw = concat!(
            "From: sender@example.com\r\n",
            "Subject: Test\r\n",
            "\r\n",
            "Hello, World!\r\n"
        );
        let message = Message::parse(raw.as_bytes());

        assert!(!message.is_multipart());
        assert_eq!(message.subject(), Some("Test"));
        assert!(message.content_type().is_text_plain());
        assert_eq!(message.decode_text_lossy(), "Hello, World!\r\n");
        assert!(message.walk().is_empty());
    }

    #[test]
    fn test_parse_headers_only() {
        let message = Message::parse(b"Subject: nothing else");
        assert_eq!(message.subject(), Some("nothing else"));
        assert_eq!(message.decode_text_lossy(), "");
    }

    #[test]
    fn test_body_starts_at_first_non_header_line() {
        let raw = concat!(
            "Subject: Scan\r\n",
            "Equipment aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee checked in\r\n",
            "Note: second line\r\n"
        );
        let message = Message::parse(raw.as_bytes());

        assert_eq!(message.subject(), Some("Scan"));
        assert!(message.headers.get("note").is_none());
        assert_eq!(
            message.decode_text_lossy(),
            "Equipment aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee checked in\r\nNote: second line\r\n"
        );
    }

    #[test]
    fn test_whitespace_only_line_is_a_fold() {
        let message = Message::parse(b"Subject: a\n   \nX-Other: b\n\nbody\n");
        assert_eq!(message.subject(), Some("a"));
        assert_eq!(message.headers.get("x-other"), Some("b"));
        assert_eq!(message.decode_text_lossy(), "body\n");
    }

    #[test]
    fn test_parse_bare_newlines() {
        let message = Message::parse(b"Subject: unix\n\nbody\n");
        assert_eq!(message.subject(), Some("unix"));
        assert_eq!(message.decode_text_lossy(), "body\n");
    }

    #[test]
    fn test_parse_multipart() {
        let raw = concat!(
            "Subject: Parts\r\n",
            "Content-Type: multipart/alternative; boundary=\"b1\"\r\n",
            "\r\n",
            "This is the preamble.\r\n",
            "--b1\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<p>html</p>\r\n",
            "--b1\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "plain text\r\n",
            "--b1--\r\n",
            "epilogue\r\n"
        );
        let message = Message::parse(raw.as_bytes());

        assert!(message.is_multipart());
        assert_eq!(message.parts.len(), 2);
        assert_eq!(message.parts[0].content_type().to_string(), "text/html");
        assert_eq!(message.parts[0].body, b"<p>html</p>");
        assert_eq!(message.parts[1].decode_text_lossy(), "plain text");
        assert_eq!(message.decode_text_lossy(), "");
    }

    #[test]
    fn test_parse_nested_multipart_walk_order() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=outer\r\n",
            "\r\n",
            "--outer\r\n",
            "Content-Type: multipart/alternative; boundary=inner\r\n",
            "\r\n",
            "--inner\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "nested plain\r\n",
            "--inner--\r\n",
            "--outer\r\n",
            "Content-Type: application/pdf\r\n",
            "\r\n",
            "%PDF\r\n",
            "--outer--\r\n"
        );
        let message = Message::parse(raw.as_bytes());
        let walked = message.walk();

        assert_eq!(walked.len(), 3);
        assert!(walked[0].content_type().is_multipart());
        assert!(walked[1].content_type().is_text_plain());
        assert_eq!(walked[1].decode_text_lossy(), "nested plain");
        assert_eq!(walked[2].content_type().to_string(), "application/pdf");
    }

    #[test]
    fn test_parse_multipart_without_closing_delimiter() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=x\r\n",
            "\r\n",
            "--x\r\n",
            "\r\n",
            "truncated body"
        );
        let message = Message::parse(raw.as_bytes());

        assert_eq!(message.parts.len(), 1);
        // No Content-Type on the part: defaults to text/plain
        assert!(message.parts[0].content_type().is_text_plain());
        assert_eq!(message.parts[0].body, b"truncated body");
    }

    #[test]
    fn test_parse_multipart_without_boundary_is_single_part() {
        let raw = b"Content-Type: multipart/mixed\r\n\r\nloose body";
        let message = Message::parse(raw);

        assert!(!message.is_multipart());
        assert_eq!(message.decode_text_lossy(), "loose body");
    }

    #[test]
    fn test_boundary_prefix_lines_are_content() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=ab\r\n",
            "\r\n",
            "--ab\r\n",
            "\r\n",
            "--abc is not a delimiter\r\n",
            "--ab--\r\n"
        );
        let message = Message::parse(raw.as_bytes());

        assert_eq!(message.parts.len(), 1);
        assert_eq!(message.parts[0].body, b"--abc is not a delimiter");
    }

    #[test]
    fn test_unparseable_content_type_defaults_to_plain() {
        let message = Message::parse(b"Content-Type: garbage\r\n\r\nbody");
        assert!(message.content_type().is_text_plain());
        assert!(!message.is_multipart());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_parse_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..512)) {
                let message = Message::parse(&raw);
                let _ = message.decode_text_lossy();
                for part in message.walk() {
                    let _ = part.decode_text_lossy();
                }
            }

            #[test]
            fn prop_plain_body_survives(body in "[a-zA-Z0-9 .,-]{0,200}") {
                let raw = format!("Subject: s\r\n\r\n{body}");
                let message = Message::parse(raw.as_bytes());
                prop_assert_eq!(message.decode_text_lossy(), body);
            }

            #[test]
            fn prop_multipart_finds_nested_text(text in "[a-z0-9]{1,60}") {
                let raw = format!(
                    "Content-Type: multipart/mixed; boundary=outer\r\n\r\n\
                     --outer\r\n\
                     Content-Type: multipart/alternative; boundary=inner\r\n\r\n\
                     --inner\r\n\
                     Content-Type: text/plain\r\n\r\n\
                     {text}\r\n\
                     --inner--\r\n\
                     --outer--\r\n"
                );
                let message = Message::parse(raw.as_bytes());
                let plain = message
                    .walk()
                    .into_iter()
                    .find(|p| p.content_type().is_text_plain())
                    .map(Part::decode_text_lossy);
                prop_assert_eq!(plain, Some(text));
            }
        }
    }
}
