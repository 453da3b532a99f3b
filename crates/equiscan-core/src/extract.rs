//! Equipment identifier extraction.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Five hyphen-separated hex groups: 8-4-4-4-12.
const PATTERN: &str =
    r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

#[allow(clippy::expect_used)]
static EQUIPMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN).expect("equipment id pattern is valid"));

#[allow(clippy::expect_used)]
static EQUIPMENT_ID_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{PATTERN}$")).expect("equipment id pattern is valid")
});

/// Identifier of a physical asset, in canonical `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
/// form. Letter case is kept exactly as it appeared in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquipmentId(String);

impl EquipmentId {
    /// Length of the canonical form, hyphens included.
    pub const LEN: usize = 36;

    /// Parses a string that must be exactly one identifier.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        EQUIPMENT_ID_EXACT
            .is_match(s)
            .then(|| Self(s.to_string()))
    }

    /// Wraps a value read back from storage without validating it.
    pub(crate) const fn from_stored(s: String) -> Self {
        Self(s)
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds the leftmost equipment identifier in `text`.
///
/// Matching is a plain substring search: surrounding characters are not
/// inspected, so an identifier glued to other text is still found.
#[must_use]
pub fn extract(text: &str) -> Option<EquipmentId> {
    EQUIPMENT_ID
        .find(text)
        .map(|m| EquipmentId(m.as_str().to_string()))
}
