//! MIME decoding utilities.
//!
//! Supports Base64 (standard and URL-safe), Quoted-Printable, and RFC 2047
//! header decoding.

use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Padding is optional in both alphabets; mail APIs and MIME writers disagree on it.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Decodes standard Base64 data, ignoring embedded whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD_LENIENT.decode(cleaned).map_err(Into::into)
}

/// Decodes URL-safe Base64 data (`-` and `_` alphabet), ignoring embedded
/// whitespace. Padding is optional.
///
/// This is the transport encoding used by REST mail APIs for raw messages.
///
/// # Errors
///
/// Returns an error if the input is not valid URL-safe Base64.
pub fn decode_base64_url(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    URL_SAFE_LENIENT.decode(cleaned).map_err(Into::into)
}

/// Decodes a Base64 body part the way mail readers do: characters outside
/// the alphabet are skipped, padding is optional and a dangling final
/// character is dropped. Never fails.
#[must_use]
pub fn decode_base64_body(data: &[u8]) -> Vec<u8> {
    let mut cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/'))
        .collect();
    // A single leftover character carries less than one byte
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }
    STANDARD_LENIENT.decode(cleaned).unwrap_or_default()
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Works on raw bytes so that 8-bit content passes through untouched.
/// Decoding never fails: an `=` that does not start a valid escape is kept
/// as a literal, and `=` at the end of a line, optionally followed by
/// trailing whitespace, is a soft line break.
#[must_use]
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        i += 1;
        if byte != b'=' {
            result.push(byte);
            continue;
        }

        let rest = &data[i..];
        let padding = rest
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t'))
            .count();
        match &rest[padding..] {
            [b'\r', b'\n', ..] => i += padding + 2,
            [b'\n', ..] => i += padding + 1,
            [] => i += padding,
            [hi, lo, ..] if padding == 0 => match (hex_value(*hi), hex_value(*lo)) {
                (Some(hi), Some(lo)) => {
                    result.push((hi << 4) | lo);
                    i += 2;
                }
                _ => result.push(b'='),
            },
            _ => result.push(b'='),
        }
    }

    result
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// A parsed `=?charset?encoding?text?=` token.
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    text: &'a str,
}

/// Decodes every RFC 2047 encoded-word in a header value.
///
/// Text outside encoded-words is kept as-is. Whitespace between two adjacent
/// encoded-words is dropped, as RFC 2047 section 6.2 requires.
///
/// # Errors
///
/// Returns an error if an encoded-word has an unknown encoding or its
/// payload cannot be decoded.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut last_was_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        let Some((word, consumed)) = parse_encoded_word(candidate) else {
            result.push_str(&rest[..start + 2]);
            rest = &rest[start + 2..];
            last_was_word = false;
            continue;
        };

        if !(last_was_word && before.trim().is_empty()) {
            result.push_str(before);
        }
        result.push_str(&decode_word(&word)?);
        rest = &candidate[consumed..];
        last_was_word = true;
    }

    result.push_str(rest);
    Ok(result)
}

fn parse_encoded_word(s: &str) -> Option<(EncodedWord<'_>, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, after) = inner.split_once('?')?;
    let (encoding, after) = after.split_once('?')?;
    let end = after.find("?=")?;
    let text = &after[..end];

    if charset.is_empty() || encoding.len() != 1 || text.contains(char::is_whitespace) {
        return None;
    }

    let consumed = s.len() - after.len() + end + 2;
    Some((
        EncodedWord {
            charset,
            encoding,
            text,
        },
        consumed,
    ))
}

fn decode_word(word: &EncodedWord<'_>) -> Result<String> {
    let bytes = match word.encoding {
        "B" | "b" => decode_base64(word.text)?,
        // Quoted-Printable with underscore for space
        "Q" | "q" => decode_quoted_printable(word.text.replace('_', " ").as_bytes()),
        other => return Err(Error::WordEncoding(other.to_string())),
    };

    // RFC 2231 language suffix: utf-8*en
    let charset = word.charset.split('*').next().unwrap_or(word.charset);
    if charset.eq_ignore_ascii_case("iso-8859-1") || charset.eq_ignore_ascii_case("latin1") {
        return Ok(bytes.into_iter().map(char::from).collect());
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
