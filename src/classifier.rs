//! Content classification: which relationship kinds a document holds for a symbol

use crate::rules::{CompiledProbe, CompiledRule, CompiledRules};
use crate::symbol::Symbol;
use crate::types::DocumentKind;

/// Marker identifying a context document once normalized
const CONTEXT_MARKER: &str = "text:context";

/// Normalize document text for probing.
///
/// Lower-cases everything, keeps each line's leading indentation but drops
/// every other space and tab, then collapses `"symbol"` and `'symbol'` to
/// the bare symbol so quoting style never affects a probe.
pub fn normalize_content(content: &str, symbol: &Symbol) -> String {
    let lowered = content.to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for line in lowered.split_inclusive('\n') {
        let body = line.trim_start_matches([' ', '\t']);
        out.push_str(&line[..line.len() - body.len()]);
        out.extend(body.chars().filter(|c| *c != ' ' && *c != '\t'));
    }

    let word = symbol.normalized();
    if word.is_empty() {
        return out;
    }
    out.replace(&format!("\"{}\"", word), word)
        .replace(&format!("'{}'", word), word)
}

/// Context documents carry a `text: context` marker
pub fn document_kind(normalized: &str) -> DocumentKind {
    if normalized.contains(CONTEXT_MARKER) {
        DocumentKind::Context
    } else {
        DocumentKind::Mapping
    }
}

/// Run one rule's probe over normalized content
pub fn probe_matches(rule: &CompiledRule, normalized: &str) -> bool {
    match &rule.probe {
        CompiledProbe::Contains(needle) => contains_word(normalized, needle),
        CompiledProbe::ListItem { key, item } => list_contains(normalized, key, item),
        CompiledProbe::Locator => rule.locator.regex().is_match(normalized),
    }
}

/// First matching rule among those probed when a declaration was clicked
pub fn classify_usage<'r>(rules: &'r CompiledRules, normalized: &str) -> Option<&'r CompiledRule> {
    rules.usage_rules().find(|rule| probe_matches(rule, normalized))
}

/// First matching rule among those probed when a usage was clicked
pub fn classify_declaration<'r>(
    rules: &'r CompiledRules,
    normalized: &str,
) -> Option<&'r CompiledRule> {
    rules
        .declaration_rules()
        .find(|rule| probe_matches(rule, normalized))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_symbol_char(c: char) -> bool {
    is_ident_char(c) || c == '-' || c == '.'
}

/// Substring search that rejects hits glued to a longer identifier on
/// either side
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_symbol_char)
    })
}

/// Split a normalized line into indentation width and body
fn split_indent(line: &str) -> (usize, &str) {
    let body = line.trim_start_matches([' ', '\t']);
    (line.len() - body.len(), body.trim_end_matches('\r'))
}

fn strip_comment(body: &str) -> &str {
    body.split('#').next().unwrap_or("")
}

/// Scan for `key:` followed by block list items, one of which is `-item`.
/// Items may sit at the key's indentation or deeper; blank lines and
/// comments are skipped, anything else ends the list.
fn list_contains(normalized: &str, key: &str, item: &str) -> bool {
    if item.is_empty() {
        return false;
    }

    let header = format!("{}:", key);
    let mut list_indent: Option<usize> = None;

    for line in normalized.lines() {
        let (indent, body) = split_indent(line);
        let body = strip_comment(body);

        if let Some(key_indent) = list_indent {
            if body.is_empty() {
                continue;
            }
            if indent >= key_indent {
                if let Some(value) = body.strip_prefix('-') {
                    if value == item {
                        return true;
                    }
                    continue;
                }
            }
            list_indent = None;
        }

        let header_at = body.find(&header).filter(|at| {
            let before = body[..*at].trim_start_matches('-');
            before.is_empty() && body[*at + header.len()..].is_empty()
        });
        if header_at.is_some() {
            list_indent = Some(indent);
        }
    }

    false
}
