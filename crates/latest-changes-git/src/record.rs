// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Change record type

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The latest commit touching one tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Repository-relative path, `/`-separated
    pub file_path: String,
    /// The full commit SHA (40 hex characters)
    pub commit_hash: String,
    /// Committer timestamp, in the committer's offset
    pub commit_timestamp: DateTime<FixedOffset>,
    /// Author name
    pub commit_author: String,
    /// Full commit message
    pub commit_message: String,
}

impl ChangeRecord {
    /// Get the short SHA (first 7 characters)
    #[must_use]
    pub fn short_hash(&self) -> &str {
        &self.commit_hash[..7.min(self.commit_hash.len())]
    }

    /// Get the first line of the commit message (subject)
    #[must_use]
    pub fn subject(&self) -> &str {
        self.commit_message.lines().next().unwrap_or("")
    }

    /// Key by which records are ordered; greater means more recent.
    ///
    /// Equal timestamps fall back to the lexically greater commit hash so
    /// the order never depends on walk order.
    #[must_use]
    pub fn recency_key(&self) -> (DateTime<FixedOffset>, &str) {
        (self.commit_timestamp, self.commit_hash.as_str())
    }

    /// Newest-first ordering used for the rendered table
    ///
    /// Files sharing a commit are ordered by path.
    #[must_use]
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.recency_key()
            .cmp(&a.recency_key())
            .then_with(|| a.file_path.cmp(&b.file_path))
    }
}
