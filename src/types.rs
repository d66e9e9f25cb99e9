//! Types for cross-file navigation between FHIR-Connect documents

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Position in a document (0-based line and character)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Byte range in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check if an offset falls inside this range (end inclusive, so a click
    /// right after the last character still hits the token)
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Kinds of cross-file reference understood by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipCategory {
    /// `slotArchetype: <name>` inside a model mapping
    SlotArchetype,
    /// `metadata.name` — the declaration of a mapping
    MetadataName,
    /// Item of a context `archetypes:` list
    Archetypes,
    /// `start`/`starts` of a slot
    Start,
    /// `spec.extends` inheritance
    Extends,
    /// Item of a context `extensions:` list
    Extensions,
}

impl RelationshipCategory {
    /// Name used in configuration files and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            RelationshipCategory::SlotArchetype => "slotArchetype",
            RelationshipCategory::MetadataName => "metadataName",
            RelationshipCategory::Archetypes => "archetypes",
            RelationshipCategory::Start => "start",
            RelationshipCategory::Extends => "extends",
            RelationshipCategory::Extensions => "extensions",
        }
    }

    /// Parse a category name, case-insensitively. YAML key spellings such as
    /// `metadata.name` or `starts` are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "slotarchetype" | "slot_archetype" | "slot-archetype" => {
                Some(RelationshipCategory::SlotArchetype)
            }
            "metadataname" | "metadata.name" | "metadata_name" | "metadata-name" => {
                Some(RelationshipCategory::MetadataName)
            }
            "archetypes" => Some(RelationshipCategory::Archetypes),
            "start" | "starts" => Some(RelationshipCategory::Start),
            "extends" => Some(RelationshipCategory::Extends),
            "extensions" => Some(RelationshipCategory::Extensions),
            _ => None,
        }
    }

    /// Clicking this category is a click on a declaration, so the search
    /// looks for usages.
    pub fn is_declaration(&self) -> bool {
        matches!(self, RelationshipCategory::MetadataName)
    }

    /// All categories
    pub fn all() -> &'static [RelationshipCategory] {
        &[
            RelationshipCategory::SlotArchetype,
            RelationshipCategory::MetadataName,
            RelationshipCategory::Archetypes,
            RelationshipCategory::Start,
            RelationshipCategory::Extends,
            RelationshipCategory::Extensions,
        ]
    }
}

impl fmt::Display for RelationshipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RelationshipCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("Unknown relationship category: {}", s))
    }
}

/// What a candidate document is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Context document (`text: context` marker)
    Context,
    /// Model mapping
    Mapping,
}

/// Compiled locator pattern with exactly one capture group around the symbol
#[derive(Debug, Clone)]
pub struct Locator {
    regex: Regex,
}

impl Locator {
    pub(crate) fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Pattern source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Locator {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Locator {}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A document believed to hold the target, plus the pattern that finds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
    pub category: RelationshipCategory,
    pub kind: DocumentKind,
    pub locator: Locator,
}

impl Candidate {
    pub fn new(
        path: PathBuf,
        category: RelationshipCategory,
        kind: DocumentKind,
        locator: Locator,
    ) -> Self {
        Self {
            path,
            category,
            kind,
            locator,
        }
    }

    /// Short label for pickers: the file name
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Final jump target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub path: PathBuf,
    pub position: Position,
    pub symbol: String,
}

impl Anchor {
    pub fn new(path: PathBuf, position: Position, symbol: impl Into<String>) -> Self {
        Self {
            path,
            position,
            symbol: symbol.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_name() {
        assert_eq!(
            RelationshipCategory::from_name("slotArchetype"),
            Some(RelationshipCategory::SlotArchetype)
        );
        assert_eq!(
            RelationshipCategory::from_name("metadata.name"),
            Some(RelationshipCategory::MetadataName)
        );
        assert_eq!(
            RelationshipCategory::from_name("STARTS"),
            Some(RelationshipCategory::Start)
        );
        assert_eq!(RelationshipCategory::from_name("unknown"), None);
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in RelationshipCategory::all() {
            assert_eq!(RelationshipCategory::from_name(category.name()), Some(*category));
        }
    }

    #[test]
    fn test_only_metadata_name_is_declaration() {
        let declarations: Vec<_> = RelationshipCategory::all()
            .iter()
            .filter(|c| c.is_declaration())
            .collect();
        assert_eq!(declarations, vec![&RelationshipCategory::MetadataName]);
    }

    #[test]
    fn test_category_serde_name() {
        let json = serde_json::to_string(&RelationshipCategory::SlotArchetype).unwrap();
        assert_eq!(json, "\"slotArchetype\"");
        let parsed: RelationshipCategory = serde_yaml::from_str("metadataName").unwrap();
        assert_eq!(parsed, RelationshipCategory::MetadataName);
    }

    #[test]
    fn test_text_range_contains() {
        let range = TextRange::new(4, 10);
        assert!(range.contains(4));
        assert!(range.contains(10));
        assert!(!range.contains(3));
        assert!(!range.contains(11));
        assert_eq!(range.len(), 6);
    }

    #[test]
    fn test_candidate_display_name() {
        let candidate = Candidate::new(
            PathBuf::from("/ws/mappings/patient.model.yaml"),
            RelationshipCategory::SlotArchetype,
            DocumentKind::Mapping,
            Locator::from_regex(Regex::new("(x)").unwrap()),
        );
        assert_eq!(candidate.display_name(), "patient.model.yaml");
    }
}
