//! Anchor location inside a chosen document

use crate::error::NavError;
use crate::types::{Anchor, Candidate, Locator, Position};
use std::fs;

/// Position of the first match's symbol group, or `None` when the pattern
/// finds nothing. Later matches are never considered.
pub fn locate_anchor(content: &str, locator: &Locator, symbol: &str) -> Option<Position> {
    let found = locator
        .regex()
        .captures_iter(content)
        .find_map(|caps| caps.get(1));

    match found {
        Some(group) => Some(offset_to_position(content, group.start())),
        None => {
            log::debug!("Anchor '{}' not found with {}", symbol, locator.as_str());
            None
        }
    }
}

impl Candidate {
    /// Read the candidate document and locate the symbol in it
    pub fn locate(&self, symbol: &str) -> Result<Option<Anchor>, NavError> {
        let content = fs::read_to_string(&self.path).map_err(|e| NavError::io(&self.path, e))?;

        Ok(locate_anchor(&content, &self.locator, symbol).map(|position| {
            log::info!(
                "Anchor '{}' found in {} at line {}, character {}",
                symbol,
                self.path.display(),
                position.line,
                position.character
            );
            Anchor::new(self.path.clone(), position, symbol)
        }))
    }
}

/// Convert a byte offset to a 0-based position. Characters are counted as
/// Unicode scalar values; `\r\n` counts as one line break.
pub fn offset_to_position(content: &str, offset: usize) -> Position {
    let offset = offset.min(content.len());
    let mut line = 0u32;
    let mut line_start = 0usize;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }

    let character = content[line_start..offset]
        .trim_end_matches('\r')
        .chars()
        .count() as u32;
    Position::new(line, character)
}

/// Convert a 0-based position to a byte offset. Returns `None` when the line
/// does not exist or the character lies past its end.
pub fn position_to_offset(content: &str, position: Position) -> Option<usize> {
    let mut line_start = 0usize;
    for _ in 0..position.line {
        line_start += content[line_start..].find('\n')? + 1;
    }

    let line = &content[line_start..];
    let line = line.split('\n').next().unwrap_or("").trim_end_matches('\r');

    let mut chars = line.char_indices().map(|(i, _)| i).chain(std::iter::once(line.len()));
    chars.nth(position.character as usize).map(|i| line_start + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{normalize_content, probe_matches};
    use crate::rules::RuleTable;
    use crate::symbol::Symbol;
    use crate::types::RelationshipCategory;

    fn locator(category: RelationshipCategory, symbol: &str) -> Locator {
        RuleTable::default()
            .compile(&Symbol::new(symbol))
            .unwrap()
            .get(category)
            .unwrap()
            .locator
            .clone()
    }

    #[test]
    fn test_offset_to_position() {
        let source = "abc\ndef\nghi";
        assert_eq!(offset_to_position(source, 0), Position::new(0, 0));
        assert_eq!(offset_to_position(source, 2), Position::new(0, 2));
        assert_eq!(offset_to_position(source, 4), Position::new(1, 0));
        assert_eq!(offset_to_position(source, 9), Position::new(2, 1));
    }

    #[test]
    fn test_offset_to_position_crlf_and_unicode() {
        let source = "a: é\r\nname: x";
        let offset = source.find('x').unwrap();
        assert_eq!(offset_to_position(source, offset), Position::new(1, 6));
        let cr = source.find('\r').unwrap();
        assert_eq!(offset_to_position(source, cr), Position::new(0, 4));
    }

    #[test]
    fn test_position_to_offset() {
        let source = "abc\r\ndef\nghi";
        assert_eq!(position_to_offset(source, Position::new(0, 0)), Some(0));
        assert_eq!(position_to_offset(source, Position::new(1, 1)), Some(6));
        assert_eq!(position_to_offset(source, Position::new(2, 3)), Some(12));
        assert_eq!(position_to_offset(source, Position::new(2, 4)), None);
        assert_eq!(position_to_offset(source, Position::new(5, 0)), None);
    }

    #[test]
    fn test_locate_slot_archetype() {
        let content = "mappings:\n  - name: a\n    slotArchetype: \"Patient\"\n";
        let loc = locator(RelationshipCategory::SlotArchetype, "Patient");
        assert_eq!(
            locate_anchor(content, &loc, "patient"),
            Some(Position::new(2, 20))
        );
    }

    #[test]
    fn test_locate_metadata_name() {
        let content = "grammar: x\nmetadata:\n  version: 1\n  name: 'Patient'\n";
        let loc = locator(RelationshipCategory::MetadataName, "patient");
        assert_eq!(
            locate_anchor(content, &loc, "patient"),
            Some(Position::new(3, 9))
        );
    }

    #[test]
    fn test_locate_first_match_only() {
        let content = "a:\n  starts: Patient\nb:\n  starts: Patient\n";
        let loc = locator(RelationshipCategory::Start, "Patient");
        assert_eq!(
            locate_anchor(content, &loc, "patient"),
            Some(Position::new(1, 10))
        );
    }

    #[test]
    fn test_locate_archetype_in_list() {
        let content = "archetypes:\n  - \"Other\"\n  - \"Patient\"\n";
        let loc = locator(RelationshipCategory::Archetypes, "Patient");
        assert_eq!(
            locate_anchor(content, &loc, "patient"),
            Some(Position::new(2, 5))
        );
    }

    #[test]
    fn test_locate_extends_inside_spec() {
        let content = "spec:\n  system: FHIR\n  extends: Base\n";
        let loc = locator(RelationshipCategory::Extends, "Base");
        assert_eq!(
            locate_anchor(content, &loc, "base"),
            Some(Position::new(2, 11))
        );
    }

    #[test]
    fn test_locate_extension_in_list() {
        let content = "spec:\n  extensions:\n    - Other\n    - 'Patient'\n";
        let loc = locator(RelationshipCategory::Extensions, "Patient");
        assert_eq!(
            locate_anchor(content, &loc, "patient"),
            Some(Position::new(3, 7))
        );
    }

    #[test]
    fn test_classified_documents_are_locatable() {
        let cases = [
            (RelationshipCategory::SlotArchetype, "slotArchetype: \"Patient \"\n", Position::new(0, 16)),
            (RelationshipCategory::SlotArchetype, "slotArchetype: \" Patient\"\n", Position::new(0, 17)),
            (RelationshipCategory::SlotArchetype, "slotArchetype : Patient\n", Position::new(0, 16)),
            (RelationshipCategory::SlotArchetype, "- x: {slotArchetype: Patient}\n", Position::new(0, 21)),
            (RelationshipCategory::Extends, "spec:\n  extends : Patient\n", Position::new(1, 12)),
            (RelationshipCategory::Archetypes, "archetypes :\n  - Patient\n", Position::new(1, 4)),
            (RelationshipCategory::Extensions, "extensions:\n- \" Patient \"\n", Position::new(1, 4)),
            (RelationshipCategory::Start, "starts:\t'Patient'  # x\n", Position::new(0, 9)),
        ];

        let symbol = Symbol::new("Patient");
        let rules = RuleTable::default().compile(&symbol).unwrap();
        for (category, content, expected) in cases {
            let rule = rules.get(category).unwrap();
            let normalized = normalize_content(content, &symbol);
            assert!(probe_matches(rule, &normalized), "{} probe on {:?}", category, content);
            assert_eq!(
                locate_anchor(content, &rule.locator, "Patient"),
                Some(expected),
                "{} locator on {:?}",
                category,
                content
            );
        }
    }

    #[test]
    fn test_locate_not_found() {
        let loc = locator(RelationshipCategory::SlotArchetype, "Patient");
        assert_eq!(locate_anchor("slotArchetype: Other\n", &loc, "patient"), None);
    }
}
