// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! mdbook-latest-changes library
//!
//! An mdBook preprocessor that replaces the `{{ latest_changes }}` marker
//! with a markdown table of the most recently changed files in the book's
//! git repository. The modules are exported for the binary, the
//! integration tests and the benchmarks.
//!
//! # Example
//!
//! ```no_run
//! use latest_changes_git::GitRepo;
//! use mdbook_latest_changes::config::PluginOptions;
//! use mdbook_latest_changes::pipeline::{RenderSettings, render_page};
//!
//! let repo = GitRepo::discover(".")?;
//! let settings = RenderSettings::new(PluginOptions::default(), Some("https://github.com/acme/handbook"));
//! let page = render_page(&repo, &settings, Some("src/changes.md"), "# Changes\n\n{{ latest_changes }}\n")?;
//! println!("{page}");
//! # Ok::<(), mdbook_latest_changes::error::PluginError>(())
//! ```

pub mod config;
pub mod error;
pub mod marker;
pub mod pipeline;
pub mod preprocessor;
pub mod table;
pub mod vendor;

pub use config::{Cli, Command, ConfigError, PluginOptions, RenderConfig};
pub use error::PluginError;
pub use pipeline::{RenderSettings, render_page};
pub use preprocessor::{PREPROCESSOR_NAME, RunFlags};
pub use table::TableFeature;
pub use vendor::Vendor;
