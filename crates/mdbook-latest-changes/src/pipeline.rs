// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Page rendering pipeline
//!
//! `render_page` is the whole plugin behind a narrow interface: repository,
//! settings and page text in, page text out. Records are collected afresh
//! on every call.

use std::path::PathBuf;

use latest_changes_git::{CollectOptions, GitRepo};
use tracing::debug;

use crate::config::{PluginOptions, RenderConfig};
use crate::error::PluginError;
use crate::marker::{MARKER, contains_marker, substitute};
use crate::table;
use crate::vendor::{Vendor, resolve_vendor};

/// Book-wide settings shared by every page render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Validated plugin options
    pub options: PluginOptions,
    /// Repository base URL for links
    pub repo_url: Option<String>,
    /// Vendor for links, configured or discovered
    pub vendor: Option<Vendor>,
    /// Repository-relative docs directory, used when `limit_to_docs_dir` is set
    pub docs_subdir: Option<PathBuf>,
}

impl RenderSettings {
    /// Resolve settings from plugin options and the host's repository URL
    ///
    /// The plugin's own `repo_url` takes precedence over the host's.
    #[must_use]
    pub fn new(options: PluginOptions, host_repo_url: Option<&str>) -> Self {
        let repo_url = options
            .repo_url
            .clone()
            .or_else(|| host_repo_url.map(str::to_string))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let vendor = resolve_vendor(options.repo_vendor, repo_url.as_deref());

        Self {
            options,
            repo_url,
            vendor,
            docs_subdir: None,
        }
    }

    /// Set the repository-relative docs directory
    #[must_use]
    pub fn with_docs_subdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.docs_subdir = Some(dir.into());
        self
    }

    fn row_limit(&self) -> Option<usize> {
        usize::try_from(self.options.history_limit)
            .ok()
            .filter(|n| *n > 0)
    }

    fn collect_options(&self) -> CollectOptions {
        let mut options = CollectOptions::default();
        if self.options.limit_to_docs_dir {
            if let Some(dir) = &self.docs_subdir {
                options = options.subdir(dir.clone());
            }
        }
        // One extra row tells whether the limit cut anything
        if self.row_limit().is_some() {
            options = options.limit(self.options.history_limit.saturating_add(1));
        }
        options
    }

    fn render_config(&self, branch: String, page_path: Option<&str>) -> RenderConfig {
        RenderConfig {
            vendor: self.vendor,
            repo_url: self.repo_url.clone(),
            branch,
            timestamp_format: self.options.timestamp_format.clone(),
            table_features: self.options.table_features.clone(),
            limit_to_docs_dir: self.options.limit_to_docs_dir,
            page_path: page_path.map(str::to_string),
        }
    }
}

/// Replace the marker in one page with the latest-changes table
///
/// Pages without the marker come back unchanged and never touch git.
///
/// # Errors
///
/// Returns `PluginError::Git` if the repository has no usable history.
pub fn render_page(
    repo: &GitRepo,
    settings: &RenderSettings,
    page_path: Option<&str>,
    page_text: &str,
) -> Result<String, PluginError> {
    if !contains_marker(page_text) {
        return Ok(page_text.to_string());
    }
    debug!(page = page_path.unwrap_or("<unknown>"), "Found latest_changes marker");

    let mut records = repo.collect(&settings.collect_options())?;

    let mut hint = None;
    if let Some(limit) = settings.row_limit() {
        if records.len() > limit {
            records.truncate(limit);
            hint = Some(table::limit_hint(limit));
        }
    }

    let branch = repo.head_branch()?;
    let config = settings.render_config(branch, page_path);

    let mut rendered = table::render(&records, &config);
    if let Some(hint) = hint {
        rendered.push_str("\n\n");
        rendered.push_str(&hint);
    }

    Ok(substitute(page_text, MARKER, &rendered))
}
