//! Header block parsing.

use crate::encoding::decode_rfc2047;
use crate::error::Result;

/// Header fields of a message or body part, in their original order.
///
/// Lookups ignore ASCII case in field names. A repeated field keeps every
/// occurrence; [`Headers::get`] returns the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value of the field `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Every value of the field `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Number of fields, repeats included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parses a header block.
    ///
    /// Stops at the first empty line, or at the first line that is neither
    /// a field nor a fold (see [`is_header_line`]). Lines starting with
    /// whitespace are folded into the previous field with a single space.
    /// Folds with no field to attach to, and fields with an empty name, are
    /// dropped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || !is_header_line(line.as_bytes()) {
                break;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = headers.fields.last_mut() {
                    let folded = line.trim();
                    if !folded.is_empty() {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(folded);
                    }
                }
                continue;
            }

            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    headers.add(name, value.trim());
                }
            }
        }

        headers
    }

    /// Decodes RFC 2047 encoded-words in a field value.
    ///
    /// # Errors
    ///
    /// Returns an error if an encoded-word is malformed.
    pub fn decode_value(value: &str) -> Result<String> {
        decode_rfc2047(value)
    }
}

/// Whether `line` can belong to a header block.
///
/// That is a fold (leading space or tab), an mbox `From ` envelope line, or
/// a field whose name before the first colon is printable ASCII without
/// spaces. Anything else opens the body.
pub(crate) fn is_header_line(line: &[u8]) -> bool {
    if line.starts_with(b" ") || line.starts_with(b"\t") || line.starts_with(b"From ") {
        return true;
    }
    line.iter()
        .position(|&b| b == b':')
        .is_some_and(|colon| line[..colon].iter().all(|b| (b'!'..=b'~').contains(b)))
}
