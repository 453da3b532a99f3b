//! `Content-Type` field values (RFC 2045 section 5).

use crate::error::{Error, Result};
use std::fmt;

/// A media type such as `text/plain` plus its parameters.
///
/// Type, subtype and parameter names are stored lowercased; parameter
/// values keep their case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    main_type: String,
    sub_type: String,
    params: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a media type without parameters.
    #[must_use]
    pub fn new(main_type: &str, sub_type: &str) -> Self {
        Self {
            main_type: main_type.to_ascii_lowercase(),
            sub_type: sub_type.to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    /// `text/plain; charset=us-ascii`, the type of an entity that has no
    /// usable `Content-Type` field.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_param("charset", "us-ascii")
    }

    /// Adds or replaces a parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        self.params.retain(|(n, _)| *n != name);
        self.params.push((name, value.into()));
        self
    }

    /// Top-level type, e.g. `multipart`.
    #[must_use]
    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    /// Subtype, e.g. `alternative`.
    #[must_use]
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Value of the parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `charset` parameter.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    /// The `boundary` parameter of a multipart type.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary")
    }

    /// Whether this is any `multipart/*` type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type == "multipart"
    }

    /// Whether this is any `text/*` type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type == "text"
    }

    /// Whether this is `text/plain`.
    #[must_use]
    pub fn is_text_plain(&self) -> bool {
        self.is_text() && self.sub_type == "plain"
    }

    /// Parses a field value like `multipart/mixed; boundary="a;b"`.
    ///
    /// Quoted parameter values may contain `;` and backslash escapes.
    /// Parameters without `=` are ignored; a repeated name keeps the first
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if the media type is empty or has no `/`.
    pub fn parse(value: &str) -> Result<Self> {
        let mut segments = split_params(value).into_iter();
        let media = segments.next().unwrap_or_default();

        let Some((main_type, sub_type)) = media.split_once('/') else {
            return Err(Error::ContentType(format!(
                "expected type/subtype, got {media:?}"
            )));
        };
        let (main_type, sub_type) = (main_type.trim(), sub_type.trim());
        if main_type.is_empty() || sub_type.is_empty() {
            return Err(Error::ContentType(format!(
                "empty type or subtype in {media:?}"
            )));
        }

        let mut content_type = Self::new(main_type, sub_type);
        for segment in segments {
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() || content_type.param(name).is_some() {
                continue;
            }
            content_type = content_type.with_param(name, unquote(value.trim()));
        }

        Ok(content_type)
    }
}

/// Splits on `;` outside double quotes.
fn split_params(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(value[start..].trim());
    segments
}

/// Strips surrounding quotes and resolves backslash escapes.
fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)
    }
}
