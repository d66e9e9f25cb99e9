//! FHIR-Connect cross-reference navigation
//!
//! Go to Definition and Find Usages across a workspace of FHIR-Connect YAML
//! mappings: `metadata.name` declarations on one side, `slotArchetype`,
//! `archetypes`, `extensions`, `extends` and `starts` references on the
//! other.
//!
//! # Example
//!
//! ```
//! use fhirconnect_nav::{classify_click_site, NavigableKeys, RelationshipCategory, YamlOutline};
//!
//! let source = "metadata:\n  name: \"Patient\"\n";
//! let outline = YamlOutline::parse(source);
//!
//! let site = classify_click_site(&outline, 20, &NavigableKeys::default()).unwrap();
//! assert_eq!(site.category(), Some(RelationshipCategory::MetadataName));
//! assert_eq!(site.symbol(), Some("Patient"));
//! ```

mod classifier;
mod config;
mod error;
mod locator;
mod navigation;
mod outline;
mod resolver;
mod rules;
mod scanner;
mod session;
mod symbol;
mod types;

pub use classifier::{
    classify_declaration, classify_usage, document_kind, normalize_content, probe_matches,
};
pub use config::{ConfigError, NavConfig, ScanConfig, CONFIG_FILE_NAMES};
pub use error::NavError;
pub use locator::{locate_anchor, offset_to_position, position_to_offset};
pub use navigation::{
    classify_click_site, request_categories, ClickSite, KeyPathTree, NavigableKey,
    NavigableKeys,
};
pub use outline::{Node, NodeId, NodeKind, Token, YamlOutline};
pub use resolver::Resolver;
pub use rules::{
    CompiledProbe, CompiledRule, CompiledRules, Probe, Rule, RuleTable, SYMBOL_PLACEHOLDER,
};
pub use scanner::WorkspaceScanner;
pub use session::{NavigationOutcome, NavigationSink, Navigator, CHOOSE_TITLE};
pub use symbol::Symbol;
pub use types::{
    Anchor, Candidate, DocumentKind, Locator, Position, RelationshipCategory, TextRange,
};
