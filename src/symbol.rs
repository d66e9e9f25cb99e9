//! Clicked symbol normalization

use std::fmt;

/// A clicked token, normalized for comparison.
///
/// Surrounding quotes are stripped, the text is lower-cased and every space
/// or tab is removed, so `"Patient"`, `'patient'` and `Pat ient` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    raw: String,
    normalized: String,
}

impl Symbol {
    pub fn new(raw: &str) -> Self {
        let trimmed = strip_quotes(raw.trim());
        let normalized = trimmed
            .chars()
            .filter(|c| *c != ' ' && *c != '\t')
            .flat_map(char::to_lowercase)
            .collect();

        Self {
            raw: trimmed.to_string(),
            normalized,
        }
    }

    /// Text as clicked, without quotes
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lower-cased, whitespace-free form used for probing
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Regex fragment matching the symbol in original text: every character
    /// escaped, with optional blanks between them.
    pub fn pattern(&self) -> String {
        self.normalized
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0u8; 4])))
            .collect::<Vec<_>>()
            .join("[ \\t]*")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}
