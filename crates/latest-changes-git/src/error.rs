// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for latest-changes-git

use thiserror::Error;

/// Errors that can occur while collecting change records
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// No repository, or a repository without any reachable commit
    #[error("Repository unavailable: {path}")]
    RepositoryUnavailable {
        /// The path that was searched for a repository
        path: String,
    },

    /// A path that cannot be expressed relative to the working tree
    #[error("Path is outside the repository working tree: {path}")]
    InvalidPath {
        /// The offending path
        path: String,
    },
}
