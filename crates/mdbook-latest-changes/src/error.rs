// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for mdbook-latest-changes

use latest_changes_git::GitError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort a page render or the whole preprocessor run
#[derive(Debug, Error)]
pub enum PluginError {
    /// Collecting history failed
    #[error("{0}")]
    Git(#[from] GitError),

    /// The plugin options are invalid
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The book or context JSON could not be read or written
    #[error("Failed to process book JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading stdin or writing stdout failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not look like an mdBook preprocessor payload
    #[error("Unexpected preprocessor input: {0}")]
    Protocol(String),
}

impl PluginError {
    /// Whether this error means there is no git history to render
    #[must_use]
    pub fn is_repository_unavailable(&self) -> bool {
        matches!(self, PluginError::Git(GitError::RepositoryUnavailable { .. }))
    }
}
