//! Click-site classification
//!
//! Decides whether the key a user clicked is one the navigator understands,
//! and which relationship category it stands for. Plain entries such as
//! `slotArchetype` match the key text directly; dotted entries such as
//! `metadata.name` also require the enclosing keys to line up, which is
//! checked by walking up the document one key-value at a time.

use crate::outline::YamlOutline;
use crate::types::{RelationshipCategory, TextRange};
use serde::{Deserialize, Serialize};

/// Upward navigation over key-values, provided by whatever YAML structure
/// the host has at hand.
pub trait KeyPathTree {
    type Node: Copy;

    /// Key text of a key-value node
    fn key_text(&self, node: Self::Node) -> Option<&str>;

    /// The logical parent key-value, stepping over an intervening
    /// sequence item when the node is an entry of a list of mappings
    fn parent_key_value(&self, node: Self::Node) -> Option<Self::Node>;
}

/// A navigable key path and the category it implies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigableKey {
    pub path: String,
    pub category: RelationshipCategory,
}

impl NavigableKey {
    pub fn new(path: impl Into<String>, category: RelationshipCategory) -> Self {
        Self {
            path: path.into(),
            category,
        }
    }

    pub fn is_dotted(&self) -> bool {
        self.path.contains('.')
    }

    fn segments(&self) -> Vec<&str> {
        self.path.split('.').collect()
    }

    fn last_segment(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// Table of navigable key paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigableKeys {
    pub entries: Vec<NavigableKey>,
}

impl Default for NavigableKeys {
    fn default() -> Self {
        use RelationshipCategory::*;

        Self {
            entries: vec![
                NavigableKey::new("archetypes", Archetypes),
                NavigableKey::new("start", Start),
                NavigableKey::new("extensions", Extensions),
                NavigableKey::new("slotArchetype", SlotArchetype),
                NavigableKey::new("extends", Extends),
                NavigableKey::new("metadata.name", MetadataName),
            ],
        }
    }
}

impl NavigableKeys {
    /// Category of a key-value node, or `None` when it is not navigable
    pub fn classify<T: KeyPathTree>(
        &self,
        tree: &T,
        node: T::Node,
    ) -> Option<RelationshipCategory> {
        let key = tree.key_text(node)?;

        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| !e.is_dotted() && e.path == key)
        {
            return Some(entry.category);
        }

        // only the first dotted entry ending in this key is considered
        let entry = self
            .entries
            .iter()
            .find(|e| e.is_dotted() && e.last_segment() == key)?;
        matches_ancestry(tree, node, &entry.segments()).then_some(entry.category)
    }

    /// Classify a bare dotted key path such as `spec.mappings.slotArchetype`.
    /// Entries match as suffixes of the path.
    pub fn classify_path(&self, path: &str) -> Option<RelationshipCategory> {
        let path = DottedPath::new(path);
        let last = path.segments.len().checked_sub(1)?;
        self.classify(&path, last)
    }
}

#[derive(Debug, Clone, Copy)]
enum Ascent<N> {
    /// Compare `node` against segment `remaining - 1`
    Compare { node: N, remaining: usize },
    /// Move to the parent key-value of `node`
    Climb { node: N, remaining: usize },
    Accept,
    Reject,
}

/// Consume `segments` right to left while climbing from `node`. Running out
/// of parents before the path is used up rejects the match.
fn matches_ancestry<T: KeyPathTree>(tree: &T, node: T::Node, segments: &[&str]) -> bool {
    if segments.is_empty() {
        return false;
    }

    let mut state = Ascent::Compare {
        node,
        remaining: segments.len(),
    };

    loop {
        state = match state {
            Ascent::Compare { node, remaining } => {
                if tree.key_text(node) != Some(segments[remaining - 1]) {
                    Ascent::Reject
                } else if remaining == 1 {
                    Ascent::Accept
                } else {
                    Ascent::Climb {
                        node,
                        remaining: remaining - 1,
                    }
                }
            }
            Ascent::Climb { node, remaining } => match tree.parent_key_value(node) {
                Some(parent) => Ascent::Compare {
                    node: parent,
                    remaining,
                },
                None => Ascent::Reject,
            },
            Ascent::Accept => return true,
            Ascent::Reject => return false,
        }
    }
}

/// A dotted path viewed as a chain of key-values
struct DottedPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> DottedPath<'a> {
    fn new(path: &'a str) -> Self {
        Self {
            segments: path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl KeyPathTree for DottedPath<'_> {
    type Node = usize;

    fn key_text(&self, node: usize) -> Option<&str> {
        self.segments.get(node).copied()
    }

    fn parent_key_value(&self, node: usize) -> Option<usize> {
        node.checked_sub(1)
    }
}

/// What the user clicked on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickSite {
    /// Clicked token without quotes
    pub word: String,
    /// Key of the enclosing key-value
    pub key: String,
    /// Dotted key path from the document root
    pub key_path: String,
    /// Text range of the enclosing key-value, for highlighting
    pub range: TextRange,
    /// The key itself was clicked rather than a value
    pub on_key: bool,
    /// Inline scalar value of the key-value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// The key-value carries a value
    pub has_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RelationshipCategory>,
}

impl ClickSite {
    pub fn is_navigable(&self) -> bool {
        self.category.is_some()
    }

    pub fn category(&self) -> Option<RelationshipCategory> {
        self.category
    }

    /// Symbol to search for: the clicked scalar, or the key's own value
    /// when the key itself was clicked
    pub fn symbol(&self) -> Option<&str> {
        let symbol = if self.on_key {
            self.value.as_deref()?
        } else {
            self.word.as_str()
        };
        (!symbol.trim().is_empty()).then_some(symbol)
    }
}

/// Interpret a click at a byte offset.
///
/// Returns `None` when the offset is not on a key or scalar that belongs to a
/// key-value.
pub fn classify_click_site(
    outline: &YamlOutline,
    offset: usize,
    keys: &NavigableKeys,
) -> Option<ClickSite> {
    let token = outline.token_at(offset)?;
    let kv = outline.enclosing_key_value(token.node)?;
    let node = outline.node(kv)?;

    Some(ClickSite {
        word: token.text,
        key: outline.key(kv)?.to_string(),
        key_path: outline.key_path(kv),
        range: node.range,
        on_key: token.is_key,
        value: outline.scalar_value(kv).map(str::to_string),
        has_value: outline.has_value(kv),
        category: keys.classify(outline, kv),
    })
}

/// Categories to search for after clicking a site of `category`.
///
/// A declaration (`metadata.name`) looks for its usages; every other site is
/// a usage and looks for the declaration.
pub fn request_categories(category: RelationshipCategory) -> Vec<RelationshipCategory> {
    if category.is_declaration() {
        vec![RelationshipCategory::MetadataName]
    } else {
        vec![
            RelationshipCategory::SlotArchetype,
            RelationshipCategory::Archetypes,
            RelationshipCategory::Start,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(text: &str, needle: &str) -> Option<ClickSite> {
        let outline = YamlOutline::parse(text);
        let offset = text.find(needle).unwrap() + 1;
        classify_click_site(&outline, offset, &NavigableKeys::default())
    }

    #[test]
    fn test_simple_keys() {
        let keys = NavigableKeys::default();
        assert_eq!(
            keys.classify_path("slotArchetype"),
            Some(RelationshipCategory::SlotArchetype)
        );
        assert_eq!(
            keys.classify_path("archetypes"),
            Some(RelationshipCategory::Archetypes)
        );
        assert_eq!(keys.classify_path("start"), Some(RelationshipCategory::Start));
        assert_eq!(keys.classify_path("fhir"), None);
    }

    #[test]
    fn test_simple_key_at_any_depth() {
        let keys = NavigableKeys::default();
        assert_eq!(
            keys.classify_path("mappings.slotArchetype"),
            Some(RelationshipCategory::SlotArchetype)
        );
    }

    #[test]
    fn test_dotted_path() {
        let keys = NavigableKeys::default();
        assert_eq!(
            keys.classify_path("metadata.name"),
            Some(RelationshipCategory::MetadataName)
        );
        assert_eq!(
            keys.classify_path("spec.metadata.name"),
            Some(RelationshipCategory::MetadataName)
        );
        assert_eq!(keys.classify_path("mappings.name"), None);
        assert_eq!(keys.classify_path("name"), None);
        assert_eq!(keys.classify_path(""), None);
    }

    #[test]
    fn test_click_metadata_name_value() {
        let site = click("metadata:\n  name: \"Patient\"\n", "Patient").unwrap();
        assert_eq!(site.word, "Patient");
        assert_eq!(site.key_path, "metadata.name");
        assert!(site.is_navigable());
        assert!(site.has_value);
        assert_eq!(site.category(), Some(RelationshipCategory::MetadataName));
    }

    #[test]
    fn test_click_name_outside_metadata() {
        let text = "mappings:\n  - name: \"gender\"\n";
        let site = click(text, "gender").unwrap();
        assert_eq!(site.key, "name");
        assert!(!site.is_navigable());
    }

    #[test]
    fn test_dotted_path_through_sequence_item() {
        let keys = NavigableKeys {
            entries: vec![NavigableKey::new(
                "mappings.slot.starts",
                RelationshipCategory::Start,
            )],
        };
        let text = "mappings:\n  - name: a\n    slot:\n      starts: Patient\n";
        let outline = YamlOutline::parse(text);
        let offset = text.find("Patient").unwrap();
        let site = classify_click_site(&outline, offset, &keys).unwrap();
        assert_eq!(site.key_path, "mappings.slot.starts");
        assert_eq!(site.category, Some(RelationshipCategory::Start));
    }

    #[test]
    fn test_dotted_path_runs_out_of_parents() {
        let keys = NavigableKeys {
            entries: vec![NavigableKey::new(
                "spec.metadata.name",
                RelationshipCategory::MetadataName,
            )],
        };
        let text = "metadata:\n  name: Patient\n";
        let outline = YamlOutline::parse(text);
        let site = classify_click_site(&outline, text.find("Patient").unwrap(), &keys).unwrap();
        assert!(!site.is_navigable());
    }

    #[test]
    fn test_click_archetype_list_item() {
        let text = "context:\n  archetypes:\n    - \"Patient\"\n    - \"Other\"\n";
        let site = click(text, "Other").unwrap();
        assert_eq!(site.word, "Other");
        assert_eq!(site.key, "archetypes");
        assert_eq!(site.category, Some(RelationshipCategory::Archetypes));
    }

    #[test]
    fn test_click_on_key_without_value() {
        let site = click("slotArchetype:\nnext: 1\n", "slotArchetype").unwrap();
        assert!(site.is_navigable());
        assert!(!site.has_value);
    }

    #[test]
    fn test_symbol_from_key_or_value() {
        let text = "metadata:\n  name: \"Patient\"\n";
        let on_key = click(text, "name").unwrap();
        assert!(on_key.on_key);
        assert_eq!(on_key.symbol(), Some("Patient"));

        let on_value = click(text, "Patient").unwrap();
        assert!(!on_value.on_key);
        assert_eq!(on_value.symbol(), Some("Patient"));

        let list = click("archetypes:\n  - Patient\n", "archetypes").unwrap();
        assert_eq!(list.symbol(), None);
    }

    #[test]
    fn test_click_through_anchor_and_tag() {
        for text in ["metadata: &m\n  name: Patient\n", "metadata: !!map\n  name: Patient\n"] {
            let site = click(text, "Patient").unwrap();
            assert_eq!(site.key_path, "metadata.name");
            assert_eq!(site.category, Some(RelationshipCategory::MetadataName));
            assert_eq!(site.symbol(), Some("Patient"));
        }
    }

    #[test]
    fn test_click_inside_flow_mapping() {
        let text = "mappings:\n  - slot: {slotArchetype: Patient}\n";

        let on_value = click(text, "Patient").unwrap();
        assert_eq!(on_value.key_path, "mappings.slot.slotArchetype");
        assert_eq!(on_value.category, Some(RelationshipCategory::SlotArchetype));

        let on_key = click(text, "slotArchetype").unwrap();
        assert_eq!(on_key.symbol(), Some("Patient"));
    }

    #[test]
    fn test_click_on_nothing() {
        let text = "metadata:\n\n  name: x\n";
        let outline = YamlOutline::parse(text);
        assert!(classify_click_site(&outline, 10, &NavigableKeys::default()).is_none());
    }

    #[test]
    fn test_request_categories() {
        assert_eq!(
            request_categories(RelationshipCategory::MetadataName),
            vec![RelationshipCategory::MetadataName]
        );
        for category in [
            RelationshipCategory::SlotArchetype,
            RelationshipCategory::Archetypes,
            RelationshipCategory::Start,
            RelationshipCategory::Extends,
            RelationshipCategory::Extensions,
        ] {
            assert_eq!(
                request_categories(category),
                vec![
                    RelationshipCategory::SlotArchetype,
                    RelationshipCategory::Archetypes,
                    RelationshipCategory::Start,
                ]
            );
        }
    }
}
