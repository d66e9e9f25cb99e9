//! Probe and locator table, one rule per relationship category
//!
//! Every rule pairs a cheap probe, deciding whether a document might hold the
//! symbol, with a locator pattern that finds the exact spot once the document
//! is chosen. Templates use a `{symbol}` placeholder that is filled in per
//! request.

use crate::error::NavError;
use crate::symbol::Symbol;
use crate::types::{Locator, RelationshipCategory};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted with the clicked symbol
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// How a document is pre-screened for a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    /// Substring of the normalized content, e.g. `slotarchetype:{symbol}`
    Contains(String),
    /// `- <symbol>` item of the block list under the given key
    ListItem(String),
    /// Run the locator pattern itself over the normalized content
    Locator,
}

/// Probe plus locator template for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub probe: Probe,
    /// Regex with exactly one capture group, `({symbol})`
    pub locator: String,
}

impl Rule {
    pub fn new(probe: Probe, locator: impl Into<String>) -> Self {
        Self {
            probe,
            locator: locator.into(),
        }
    }
}

/// Rule table and probe priorities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    /// Keyed by category name at the top level of the `rules` section
    #[serde(flatten)]
    pub rules: BTreeMap<RelationshipCategory, Rule>,
    /// Probed in order when a declaration was clicked; first hit wins
    pub usage_order: Vec<RelationshipCategory>,
    /// Probed in order when a usage was clicked; first hit wins
    pub declaration_order: Vec<RelationshipCategory>,
}

/// Blanks and an optional closing quote after the symbol, then the end of
/// the scalar: a flow separator, a comment or the end of the line
const VALUE_END: &str = r#"[ \t]*["']?[ \t]*(?:[,}\]]|#|\r?$)"#;
/// Optional opening quote, with blanks allowed inside it
const VALUE_START: &str = r#"[ \t]*["']?[ \t]*"#;
/// Rest of a header line: anchors and tags, then an optional comment
const HEADER_END: &str = r"[ \t]*(?:[&!][^ \t\r\n]*[ \t]*)*(?:#.*)?\r?\n";
const BLOCK_LINES: &str = r"(?:[ \t]*(?:#.*)?\r?\n|[ \t]+.*\r?\n)*?";
const LIST_LINES: &str = r"(?:[ \t]*(?:#.*)?\r?\n|[ \t]*-.*\r?\n)*?";

fn scalar_locator(key: &str) -> String {
    format!(r"\b{key}[ \t]*:{VALUE_START}({SYMBOL_PLACEHOLDER}){VALUE_END}")
}

fn nested_locator(parent: &str, key: &str) -> String {
    format!(
        r"^[ \t]*{parent}[ \t]*:{HEADER_END}{BLOCK_LINES}[ \t]+{key}[ \t]*:{VALUE_START}({SYMBOL_PLACEHOLDER}){VALUE_END}"
    )
}

fn list_locator(key: &str) -> String {
    format!(
        r"\b{key}[ \t]*:{HEADER_END}{LIST_LINES}[ \t]*-{VALUE_START}({SYMBOL_PLACEHOLDER}){VALUE_END}"
    )
}

impl Default for RuleTable {
    fn default() -> Self {
        use RelationshipCategory::*;

        let mut rules = BTreeMap::new();
        rules.insert(
            MetadataName,
            Rule::new(Probe::Locator, nested_locator("metadata", "name")),
        );
        rules.insert(
            SlotArchetype,
            Rule::new(
                Probe::Contains("slotarchetype:{symbol}".to_string()),
                scalar_locator("slotArchetype"),
            ),
        );
        rules.insert(
            Archetypes,
            Rule::new(
                Probe::ListItem("archetypes".to_string()),
                list_locator("archetypes"),
            ),
        );
        rules.insert(
            Extensions,
            Rule::new(
                Probe::ListItem("extensions".to_string()),
                list_locator("extensions"),
            ),
        );
        rules.insert(
            Start,
            Rule::new(
                Probe::Contains("starts:{symbol}".to_string()),
                scalar_locator("starts"),
            ),
        );
        rules.insert(
            Extends,
            Rule::new(Probe::Locator, nested_locator("spec", "extends")),
        );

        Self {
            rules,
            usage_order: vec![SlotArchetype, Archetypes, Extends, Start, Extensions],
            declaration_order: vec![MetadataName, Start],
        }
    }
}

impl RuleTable {
    /// Fill in built-in rules for categories a configuration file left out
    pub fn with_defaults(mut self) -> Self {
        for (category, rule) in Self::default().rules {
            self.rules.entry(category).or_insert(rule);
        }
        self
    }

    pub fn rule(&self, category: RelationshipCategory) -> Option<&Rule> {
        self.rules.get(&category)
    }

    /// Compile every rule for one symbol
    pub fn compile(&self, symbol: &Symbol) -> Result<CompiledRules, NavError> {
        let mut rules = BTreeMap::new();
        for (category, rule) in &self.rules {
            rules.insert(*category, CompiledRule::compile(*category, rule, symbol)?);
        }

        for category in self.usage_order.iter().chain(&self.declaration_order) {
            if !rules.contains_key(category) {
                return Err(NavError::Rule {
                    category: *category,
                    message: "category is listed in a probe order but has no rule".to_string(),
                });
            }
        }

        Ok(CompiledRules {
            rules,
            usage_order: self.usage_order.clone(),
            declaration_order: self.declaration_order.clone(),
        })
    }
}

/// Probe with the symbol filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledProbe {
    Contains(String),
    ListItem { key: String, item: String },
    Locator,
}

/// A rule ready to run against documents
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub category: RelationshipCategory,
    pub probe: CompiledProbe,
    pub locator: Locator,
}

impl CompiledRule {
    fn compile(
        category: RelationshipCategory,
        rule: &Rule,
        symbol: &Symbol,
    ) -> Result<Self, NavError> {
        let rule_error = |message: String| NavError::Rule { category, message };

        if !rule.locator.contains(&format!("({SYMBOL_PLACEHOLDER})")) {
            return Err(rule_error(
                "locator must capture the symbol as `({symbol})`".to_string(),
            ));
        }

        let source = rule.locator.replace(SYMBOL_PLACEHOLDER, &symbol.pattern());
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|e| rule_error(e.to_string()))?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() != 2 {
            return Err(rule_error(format!(
                "locator must have exactly one capture group, found {}",
                regex.captures_len() - 1
            )));
        }

        let probe = match &rule.probe {
            Probe::Contains(template) => CompiledProbe::Contains(
                template
                    .to_lowercase()
                    .replace(' ', "")
                    .replace(SYMBOL_PLACEHOLDER, symbol.normalized()),
            ),
            Probe::ListItem(key) => CompiledProbe::ListItem {
                key: key.trim().to_lowercase(),
                item: symbol.normalized().to_string(),
            },
            Probe::Locator => CompiledProbe::Locator,
        };

        Ok(Self {
            category,
            probe,
            locator: Locator::from_regex(regex),
        })
    }
}

/// All rules compiled for one request
#[derive(Debug, Clone)]
pub struct CompiledRules {
    rules: BTreeMap<RelationshipCategory, CompiledRule>,
    usage_order: Vec<RelationshipCategory>,
    declaration_order: Vec<RelationshipCategory>,
}

impl CompiledRules {
    pub fn get(&self, category: RelationshipCategory) -> Option<&CompiledRule> {
        self.rules.get(&category)
    }

    /// Rules probed when a declaration was clicked, in priority order
    pub fn usage_rules(&self) -> impl Iterator<Item = &CompiledRule> {
        self.usage_order.iter().filter_map(|c| self.rules.get(c))
    }

    /// Rules probed when a usage was clicked, in priority order
    pub fn declaration_rules(&self) -> impl Iterator<Item = &CompiledRule> {
        self.declaration_order.iter().filter_map(|c| self.rules.get(c))
    }
}
