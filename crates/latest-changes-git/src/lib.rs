// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! latest-changes-git: per-file latest change extraction for mdbook-latest-changes
//!
//! This library crate resolves, for every file tracked in a git repository,
//! the most recent commit that touched it, and returns those records newest
//! first.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use latest_changes_git::{CollectOptions, GitRepo};
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let records = repo
//!     .collect(&CollectOptions::default().subdir("docs").limit(10))
//!     .expect("collect changes");
//!
//! for r in records {
//!     println!("{} {} {}", r.short_hash(), r.file_path, r.subject());
//! }
//! ```

pub mod error;
pub mod history;
pub mod record;

pub use error::GitError;
pub use history::{CollectOptions, GitRepo};
pub use record::ChangeRecord;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::GitError;
    pub use crate::history::{CollectOptions, GitRepo};
    pub use crate::record::ChangeRecord;
}
