//! Cross-file reference resolution

use crate::classifier::{classify_declaration, classify_usage, document_kind, normalize_content};
use crate::config::NavConfig;
use crate::error::NavError;
use crate::rules::CompiledRule;
use crate::scanner::WorkspaceScanner;
use crate::symbol::Symbol;
use crate::types::{Candidate, RelationshipCategory};
use std::fs;
use std::path::{Path, PathBuf};

/// Finds the documents on the other end of a relationship
#[derive(Debug, Clone)]
pub struct Resolver {
    config: NavConfig,
    scanner: WorkspaceScanner,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}

impl Resolver {
    pub fn new(config: NavConfig) -> Self {
        let scanner = WorkspaceScanner::new(&config.scan);
        Self { config, scanner }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Documents under `root` that relate to `symbol`.
    ///
    /// When `categories` holds `MetadataName` the search looks for usages of
    /// a declaration; any other category looks for the declaration itself.
    /// At most one candidate per path is produced, in scan order, and
    /// `current_file` is never returned.
    pub fn find_candidates(
        &self,
        root: &Path,
        current_file: &Path,
        symbol: &str,
        categories: &[RelationshipCategory],
    ) -> Result<Vec<Candidate>, NavError> {
        let symbol = Symbol::new(symbol);
        if symbol.is_empty() || categories.is_empty() {
            return Ok(Vec::new());
        }

        let rules = self.config.rules.compile(&symbol)?;
        let want_usages = categories.contains(&RelationshipCategory::MetadataName);
        let want_declarations = categories.iter().any(|c| !c.is_declaration());
        let current = canonical(current_file);

        let mut candidates = Vec::new();
        for path in self.scanner.scan(root) {
            if canonical(&path) == current {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let normalized = normalize_content(&content, &symbol);
            let kind = document_kind(&normalized);

            let mut hits: Vec<&CompiledRule> = Vec::new();
            if want_usages {
                hits.extend(classify_usage(&rules, &normalized));
            }
            if want_declarations {
                hits.extend(classify_declaration(&rules, &normalized));
            }

            match hits.first() {
                Some(rule) => {
                    log::debug!("{}: {} '{}'", path.display(), rule.category, symbol);
                    candidates.push(Candidate::new(
                        path,
                        rule.category,
                        kind,
                        rule.locator.clone(),
                    ));
                }
                None => log::debug!("{}: no match for '{}'", path.display(), symbol),
            }
        }

        Ok(candidates)
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
