// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Markdown table rendering
//!
//! Turns change records into a pipe table whose columns are chosen and
//! ordered by the configured table features.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use latest_changes_git::ChangeRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RenderConfig;
use crate::vendor::LinkTarget;

/// A table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFeature {
    /// Plain file path
    Filepath,
    /// File path linked to the file in the hosted repository
    FileLinkGitRepo,
    /// File path linked relative to the page being rendered
    PagePathLink,
    /// Commit timestamp
    Timestamp,
    /// Commit author
    Author,
    /// Commit subject line
    Message,
    /// Short commit hash linked to the hosted commit
    CommitHashLink,
}

impl TableFeature {
    /// Every feature, in declaration order
    pub const ALL: [TableFeature; 7] = [
        TableFeature::Filepath,
        TableFeature::FileLinkGitRepo,
        TableFeature::PagePathLink,
        TableFeature::Timestamp,
        TableFeature::Author,
        TableFeature::Message,
        TableFeature::CommitHashLink,
    ];

    /// Columns rendered when none are configured
    pub const DEFAULT: [TableFeature; 5] = [
        TableFeature::FileLinkGitRepo,
        TableFeature::Timestamp,
        TableFeature::Author,
        TableFeature::Message,
        TableFeature::CommitHashLink,
    ];

    /// Configuration name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TableFeature::Filepath => "filepath",
            TableFeature::FileLinkGitRepo => "file_link_git_repo",
            TableFeature::PagePathLink => "page_path_link",
            TableFeature::Timestamp => "timestamp",
            TableFeature::Author => "author",
            TableFeature::Message => "message",
            TableFeature::CommitHashLink => "commit_hash_link",
        }
    }

    /// Column header
    #[must_use]
    pub fn header(self, limit_to_docs_dir: bool) -> &'static str {
        match self {
            TableFeature::Filepath => "File",
            TableFeature::FileLinkGitRepo => "File (Git)",
            TableFeature::PagePathLink if limit_to_docs_dir => "Page",
            TableFeature::PagePathLink => "Page/File",
            TableFeature::Timestamp => "Date",
            TableFeature::Author => "Author",
            TableFeature::Message => "Description",
            TableFeature::CommitHashLink => "Commit",
        }
    }

    fn is_linkable(self) -> bool {
        matches!(
            self,
            TableFeature::FileLinkGitRepo | TableFeature::CommitHashLink
        )
    }
}

impl fmt::Display for TableFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableFeature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Render records as a markdown pipe table
///
/// An empty record list still yields the header and separator rows.
#[must_use]
pub fn render(records: &[ChangeRecord], config: &RenderConfig) -> String {
    let links = LinkTarget::new(config.vendor, config.repo_url.as_deref(), &config.branch);
    if links.is_none() && config.table_features.iter().any(|f| f.is_linkable()) {
        debug!("No vendor or repository URL available, rendering links as plain text");
    }

    let headers: Vec<&str> = config
        .table_features
        .iter()
        .map(|f| f.header(config.limit_to_docs_dir))
        .collect();

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied());
    push_row(&mut out, headers.iter().map(|_| "---"));

    for record in records {
        let cells: Vec<String> = config
            .table_features
            .iter()
            .map(|feature| cell(*feature, record, config, links.as_ref()))
            .collect();
        push_row(&mut out, cells.iter().map(String::as_str));
    }

    out.truncate(out.trim_end().len());
    out
}

/// Note appended below a table whose rows were cut by the history limit
#[must_use]
pub fn limit_hint(shown: usize) -> String {
    let what = if shown == 1 {
        "entry is".to_string()
    } else {
        format!("{shown} entries are")
    };
    format!(
        "<p style=\"margin-bottom: 1em; margin-top: 1em; padding-top: .5em; \
         font-style: italic; font-size: smaller;\">Only the most recent {what} displayed.</p>"
    )
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(cell);
        out.push_str(" |");
    }
    out.push('\n');
}

fn cell(
    feature: TableFeature,
    record: &ChangeRecord,
    config: &RenderConfig,
    links: Option<&LinkTarget<'_>>,
) -> String {
    match feature {
        TableFeature::Filepath => escape_cell(&record.file_path),
        TableFeature::FileLinkGitRepo => match links {
            Some(links) => link(&record.file_path, &links.file_url(&record.file_path)),
            None => escape_cell(&record.file_path),
        },
        TableFeature::PagePathLink => match config.page_path.as_deref() {
            Some(page) => link(&record.file_path, &relative_path(page, &record.file_path)),
            None => escape_cell(&record.file_path),
        },
        TableFeature::Timestamp => format_timestamp(record, &config.timestamp_format),
        TableFeature::Author => escape_cell(&record.commit_author),
        TableFeature::Message => escape_cell(record.subject()),
        TableFeature::CommitHashLink => match links {
            Some(links) => link(record.short_hash(), &links.commit_url(&record.commit_hash)),
            None => escape_cell(record.short_hash()),
        },
    }
}

fn format_timestamp(record: &ChangeRecord, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", record.commit_timestamp.format(format)).is_err() {
        debug!(format, "Timestamp format failed, falling back to RFC 3339");
        out = record.commit_timestamp.to_rfc3339();
    }
    escape_cell(&out)
}

fn link(text: &str, url: &str) -> String {
    let text = escape_cell(text).replace('[', "\\[").replace(']', "\\]");
    format!("[{text}]({})", link_destination(url))
}

/// Make text safe for a single table cell
///
/// HTML special characters and `\` are entity-escaped, `|` is
/// backslash-escaped and line breaks become spaces. The only backslashes
/// in the result are the ones escaping a `|`.
#[must_use]
pub fn escape_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '\\' => out.push_str("&#92;"),
            '|' => out.push_str("\\|"),
            '\r' | '\n' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encode the characters that end a link destination or a cell
fn link_destination(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '|' => out.push_str("%7C"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '\r' | '\n' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Path of `target` relative to the directory containing `page`
///
/// Both are repository-relative, `/`-separated paths.
#[must_use]
pub fn relative_path(page: &str, target: &str) -> String {
    let page_dir: Vec<&str> = page.split('/').filter(|s| !s.is_empty()).collect();
    let page_dir = &page_dir[..page_dir.len().saturating_sub(1)];
    let target: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

    let common = page_dir
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; page_dir.len() - common];
    parts.extend_from_slice(&target[common..]);
    parts.join("/")
}
