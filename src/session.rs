//! A single go-to request from click to opened anchor

use crate::error::NavError;
use crate::navigation::{classify_click_site, request_categories, ClickSite};
use crate::outline::YamlOutline;
use crate::resolver::Resolver;
use crate::types::{Anchor, Candidate};
use std::path::Path;

/// Title shown when several documents qualify
pub const CHOOSE_TITLE: &str = "Multiple Destinations Found, Select One";

/// Host side of a navigation: picking among candidates and opening the
/// result
pub trait NavigationSink {
    /// Pick one of `candidates` by index, or `None` to cancel
    fn choose(&mut self, title: &str, candidates: &[Candidate]) -> Option<usize>;

    /// Show the anchor to the user
    fn open(&mut self, anchor: &Anchor);
}

/// How a navigation request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The click was not on a navigable key with a value
    NotNavigable,
    /// No other document relates to the symbol
    NoCandidates,
    /// The sink was asked to open this anchor
    Opened(Anchor),
    /// The chosen document no longer contains the symbol
    NotLocated(Candidate),
    /// The sink declined to choose
    Cancelled,
}

/// Drives a click through classification, resolution and location
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    resolver: Resolver,
}

impl Navigator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Classify the click at byte `offset` of `content`, the text of `file`
    pub fn click_site(&self, content: &str, offset: usize) -> Option<ClickSite> {
        let outline = YamlOutline::parse(content);
        classify_click_site(&outline, offset, &self.resolver.config().keys)
    }

    /// Handle a click at byte `offset` of `content`, the text of `file`
    pub fn navigate(
        &self,
        root: &Path,
        file: &Path,
        content: &str,
        offset: usize,
        sink: &mut dyn NavigationSink,
    ) -> Result<NavigationOutcome, NavError> {
        let Some(site) = self.click_site(content, offset) else {
            log::debug!("No key at offset {} in {}", offset, file.display());
            return Ok(NavigationOutcome::NotNavigable);
        };

        let (Some(category), true) = (site.category(), site.has_value) else {
            log::debug!("'{}' in {} is not navigable", site.key_path, file.display());
            return Ok(NavigationOutcome::NotNavigable);
        };
        let Some(symbol) = site.symbol() else {
            return Ok(NavigationOutcome::NotNavigable);
        };

        log::debug!(
            "Click on {} ({}) for '{}' in {}",
            site.key_path,
            category,
            symbol,
            file.display()
        );

        let categories = request_categories(category);
        let mut candidates = self
            .resolver
            .find_candidates(root, file, symbol, &categories)?;

        let candidate = match candidates.len() {
            0 => return Ok(NavigationOutcome::NoCandidates),
            1 => candidates.remove(0),
            count => match sink.choose(CHOOSE_TITLE, &candidates) {
                Some(index) if index < count => candidates.swap_remove(index),
                _ => return Ok(NavigationOutcome::Cancelled),
            },
        };

        match candidate.locate(symbol)? {
            Some(anchor) => {
                sink.open(&anchor);
                Ok(NavigationOutcome::Opened(anchor))
            }
            None => Ok(NavigationOutcome::NotLocated(candidate)),
        }
    }
}
