// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the latest-changes preprocessor
//!
//! Three layers: command-line flags passed by whoever launches the
//! preprocessor, plugin options read from the book's
//! `[preprocessor.latest-changes]` table, and the per-page render settings
//! derived from both.

use std::collections::BTreeMap;
use std::fmt;

use chrono::format::{Item, StrftimeItems};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::table::TableFeature;
use crate::vendor::Vendor;

/// Default strftime pattern for the Date column
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keys mdBook itself reads from every preprocessor table
const MDBOOK_RESERVED_KEYS: [&str; 5] = ["command", "renderers", "before", "after", "optional"];

/// mdBook preprocessor that renders recent git changes into book pages
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mdbook-latest-changes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (defaults to preprocessing stdin)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr; stdout carries the book.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Fail the build when no git history is available
    #[arg(long, default_value = "false", env = "MDBOOK_LATEST_CHANGES_STRICT")]
    pub strict: bool,

    /// The book is being served interactively rather than built
    #[arg(long, default_value = "false", env = "MDBOOK_LATEST_CHANGES_SERVE")]
    pub serve: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check whether a renderer is supported (exit status 0 means yes)
    Supports {
        /// Renderer name, e.g. `html`
        renderer: String,
    },
}

impl Cli {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Options from the book's `[preprocessor.latest-changes]` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Only list files below the book's source directory
    pub limit_to_docs_dir: bool,
    /// Hosting vendor used for links
    pub repo_vendor: Option<Vendor>,
    /// Run when the book is served, not only when built
    pub enabled_on_serve: bool,
    /// Row cap; zero or negative means unlimited
    pub history_limit: i64,
    /// strftime pattern for the Date column
    pub timestamp_format: String,
    /// Columns, in order
    pub table_features: Vec<TableFeature>,
    /// Repository URL overriding `output.html.git-repository-url`
    pub repo_url: Option<String>,
    /// Fail the build when no git history is available
    pub strict: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            limit_to_docs_dir: false,
            repo_vendor: None,
            enabled_on_serve: true,
            history_limit: -1,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            table_features: TableFeature::DEFAULT.to_vec(),
            repo_url: None,
            strict: false,
        }
    }
}

/// Wire form of [`PluginOptions`]
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawOptions {
    limit_to_docs_dir: bool,
    repo_vendor: Option<String>,
    enabled_on_serve: bool,
    history_limit: i64,
    timestamp_format: String,
    table_features: Vec<String>,
    repo_url: Option<String>,
    strict: bool,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Default for RawOptions {
    fn default() -> Self {
        let defaults = PluginOptions::default();
        Self {
            limit_to_docs_dir: defaults.limit_to_docs_dir,
            repo_vendor: None,
            enabled_on_serve: defaults.enabled_on_serve,
            history_limit: defaults.history_limit,
            timestamp_format: defaults.timestamp_format,
            table_features: defaults
                .table_features
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
            repo_url: defaults.repo_url,
            strict: defaults.strict,
            extra: BTreeMap::new(),
        }
    }
}

impl PluginOptions {
    /// Parse and validate the preprocessor table; `None` yields defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed values, unknown table features
    /// or an unusable timestamp format.
    pub fn from_value(value: Option<&Value>) -> Result<Self, ConfigError> {
        let raw: RawOptions = match value {
            Some(value) => RawOptions::deserialize(value).map_err(ConfigError::Options)?,
            None => RawOptions::default(),
        };

        for key in raw.extra.keys() {
            if !MDBOOK_RESERVED_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown option `{key}` in [preprocessor.latest-changes]");
            }
        }

        let mut table_features = Vec::with_capacity(raw.table_features.len());
        let mut invalid = Vec::new();
        for name in &raw.table_features {
            match name.parse::<TableFeature>() {
                Ok(feature) => table_features.push(feature),
                Err(name) => invalid.push(name),
            }
        }
        if !invalid.is_empty() {
            return Err(ConfigError::InvalidTableFeatures {
                invalid: FeatureNames(invalid),
            });
        }

        let options = Self {
            limit_to_docs_dir: raw.limit_to_docs_dir,
            repo_vendor: raw.repo_vendor.as_deref().and_then(parse_vendor),
            enabled_on_serve: raw.enabled_on_serve,
            history_limit: raw.history_limit,
            timestamp_format: raw.timestamp_format,
            table_features,
            repo_url: raw.repo_url.filter(|url| !url.trim().is_empty()),
            strict: raw.strict,
        };
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No table features are configured
    /// - The timestamp format is not a usable strftime pattern
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_features.is_empty() {
            return Err(ConfigError::EmptyTableFeatures);
        }
        validate_timestamp_format(&self.timestamp_format)
    }
}

/// Case-insensitive vendor name; an unsupported vendor only disables links
fn parse_vendor(name: &str) -> Option<Vendor> {
    if name.trim().is_empty() {
        return None;
    }
    match name.parse::<Vendor>() {
        Ok(vendor) => Some(vendor),
        Err(err) => {
            warn!("{err}, rendering without vendor links unless one is discovered");
            None
        }
    }
}

/// Check that a strftime pattern parses and contains at least one directive
///
/// # Errors
///
/// Returns `ConfigError::InvalidTimestampFormat` otherwise.
pub fn validate_timestamp_format(format: &str) -> Result<(), ConfigError> {
    let mut has_directive = false;
    for item in StrftimeItems::new(format) {
        match item {
            Item::Error => {
                return Err(ConfigError::InvalidTimestampFormat {
                    format: format.to_string(),
                    reason: "unsupported or malformed directive",
                });
            }
            Item::Numeric(..) | Item::Fixed(..) => has_directive = true,
            _ => {}
        }
    }
    if has_directive {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimestampFormat {
            format: format.to_string(),
            reason: "no date or time directive",
        })
    }
}

/// Resolved options for rendering one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Hosting vendor used for links
    pub vendor: Option<Vendor>,
    /// Repository base URL
    pub repo_url: Option<String>,
    /// Ref used in file links
    pub branch: String,
    /// strftime pattern for the Date column
    pub timestamp_format: String,
    /// Columns, in order
    pub table_features: Vec<TableFeature>,
    /// Whether collection was limited to the docs directory
    pub limit_to_docs_dir: bool,
    /// Repository-relative path of the page being rendered
    pub page_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vendor: None,
            repo_url: None,
            branch: "main".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            table_features: TableFeature::DEFAULT.to_vec(),
            limit_to_docs_dir: false,
            page_path: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The preprocessor table could not be deserialized
    #[error("Invalid [preprocessor.latest-changes] options: {0}")]
    Options(#[source] serde_json::Error),

    /// One or more unknown table features
    #[error(
        "Invalid table_features: {invalid}. Valid options are: {}",
        FeatureNames::valid()
    )]
    InvalidTableFeatures {
        /// The unknown names, in configuration order
        invalid: FeatureNames,
    },

    /// An empty table_features list
    #[error("table_features must name at least one column")]
    EmptyTableFeatures,

    /// Unusable timestamp format
    #[error("Invalid timestamp_format '{format}': {reason}")]
    InvalidTimestampFormat {
        /// The configured pattern
        format: String,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Table feature names, displayed as a quoted, comma-separated list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureNames(pub Vec<String>);

impl FeatureNames {
    fn valid() -> Self {
        let mut names: Vec<String> = TableFeature::ALL
            .iter()
            .map(|f| f.as_str().to_string())
            .collect();
        names.sort();
        Self(names)
    }
}

impl fmt::Display for FeatureNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{name}\"")?;
        }
        Ok(())
    }
}
