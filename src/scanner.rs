//! Workspace scanning for YAML documents

use crate::config::ScanConfig;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Enumerates YAML documents below a workspace root
#[derive(Debug, Clone)]
pub struct WorkspaceScanner {
    exclude_dirs: Vec<String>,
    extensions: Vec<String>,
    follow_links: bool,
}

impl Default for WorkspaceScanner {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl WorkspaceScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            exclude_dirs: config.exclude_dirs.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            follow_links: config.follow_links,
        }
    }

    /// All YAML files under `root`, sorted by name within each directory.
    ///
    /// Excluded directories are pruned at any depth below the root. Entries
    /// that cannot be read are skipped.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_yaml_file(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => log::warn!("Skipping unreadable entry: {}", e),
            }
        }

        log::debug!("Found {} YAML files under {}", files.len(), root.display());
        files
    }

    /// Check if a path has one of the configured YAML extensions
    pub fn is_yaml_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_lowercase();
                self.extensions.iter().any(|ext| *ext == e)
            })
            .unwrap_or(false)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| self.exclude_dirs.iter().any(|d| d == name))
                .unwrap_or(false)
    }
}
