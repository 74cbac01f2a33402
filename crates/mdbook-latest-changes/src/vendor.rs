// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository hosting vendors and their link formats
//!
//! Each vendor maps to a pair of URL templates in a single lookup table;
//! adding a vendor means adding a variant and a table row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A supported repository hosting vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// GitHub
    Github,
    /// GitLab
    Gitlab,
    /// Gitea (and Forgejo)
    Gitea,
    /// Bitbucket Server / Data Center
    Bitbucket,
}

/// URL templates for one vendor
///
/// Placeholders: `{repo_url}`, `{commit_hash}`, `{branch}`, `{filepath}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTemplates {
    /// Link to a commit
    pub commit: &'static str,
    /// Link to a file on a branch
    pub file: &'static str,
}

/// Indexed by `Vendor as usize`
const LINK_TEMPLATES: [(Vendor, LinkTemplates); 4] = [
    (
        Vendor::Github,
        LinkTemplates {
            commit: "{repo_url}/commit/{commit_hash}",
            file: "{repo_url}/blob/{branch}/{filepath}",
        },
    ),
    (
        Vendor::Gitlab,
        LinkTemplates {
            commit: "{repo_url}/-/commit/{commit_hash}",
            file: "{repo_url}/-/blob/{branch}/{filepath}",
        },
    ),
    (
        Vendor::Gitea,
        LinkTemplates {
            commit: "{repo_url}/commit/{commit_hash}",
            file: "{repo_url}/src/branch/{branch}/{filepath}",
        },
    ),
    (
        Vendor::Bitbucket,
        LinkTemplates {
            commit: "{repo_url}/commits/{commit_hash}",
            file: "{repo_url}/browse/{filepath}?at={branch}",
        },
    ),
];

impl Vendor {
    /// All vendors, in table order
    pub const ALL: [Vendor; 4] = [
        Vendor::Github,
        Vendor::Gitlab,
        Vendor::Gitea,
        Vendor::Bitbucket,
    ];

    /// Lowercase configuration name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Github => "github",
            Vendor::Gitlab => "gitlab",
            Vendor::Gitea => "gitea",
            Vendor::Bitbucket => "bitbucket",
        }
    }

    /// The vendor's URL templates
    #[must_use]
    pub fn templates(self) -> &'static LinkTemplates {
        &LINK_TEMPLATES[self as usize].1
    }

    /// Guess the vendor from a repository URL's host name
    ///
    /// Matches on whole host labels, so `github.com` and
    /// `gitlab.example.org` are recognised but `mygithub.dev` is not.
    #[must_use]
    pub fn from_repo_url(repo_url: &str) -> Option<Vendor> {
        let host = host_of(repo_url)?.to_ascii_lowercase();
        host.split('.').find_map(|label| match label {
            "github" => Some(Vendor::Github),
            "gitlab" => Some(Vendor::Gitlab),
            "gitea" | "codeberg" => Some(Vendor::Gitea),
            "bitbucket" => Some(Vendor::Bitbucket),
            _ => None,
        })
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown vendor name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown repository vendor: {0}")]
pub struct UnknownVendor(pub String);

impl FromStr for Vendor {
    type Err = UnknownVendor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vendor::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVendor(s.to_string()))
    }
}

/// Pick the vendor used for links
///
/// A configured vendor always wins; otherwise the vendor is inferred from
/// the repository URL.
#[must_use]
pub fn resolve_vendor(configured: Option<Vendor>, repo_url: Option<&str>) -> Option<Vendor> {
    let discovered = repo_url.and_then(Vendor::from_repo_url);
    match (configured, discovered) {
        (Some(configured), Some(discovered)) if configured != discovered => {
            warn!(
                "Configured repo_vendor `{configured}` differs from discovered `{discovered}`, using `{configured}`"
            );
            Some(configured)
        }
        (Some(configured), _) => Some(configured),
        (None, Some(discovered)) => {
            debug!("repo_vendor not configured, using `{discovered}` from repository URL");
            Some(discovered)
        }
        (None, None) => None,
    }
}

/// Everything needed to build vendor links for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTarget<'a> {
    vendor: Vendor,
    repo_url: &'a str,
    branch: &'a str,
}

impl<'a> LinkTarget<'a> {
    /// Build a link target; `None` when vendor or repository URL is missing
    #[must_use]
    pub fn new(vendor: Option<Vendor>, repo_url: Option<&'a str>, branch: &'a str) -> Option<Self> {
        let repo_url = repo_url.map(|url| url.trim_end_matches('/'))?;
        if repo_url.is_empty() {
            return None;
        }
        Some(Self {
            vendor: vendor?,
            repo_url,
            branch,
        })
    }

    /// URL of a commit
    #[must_use]
    pub fn commit_url(&self, commit_hash: &str) -> String {
        self.fill(self.vendor.templates().commit, commit_hash, "")
    }

    /// URL of a file on the configured branch
    #[must_use]
    pub fn file_url(&self, filepath: &str) -> String {
        self.fill(self.vendor.templates().file, "", filepath)
    }

    fn fill(&self, template: &str, commit_hash: &str, filepath: &str) -> String {
        template
            .replace("{repo_url}", self.repo_url)
            .replace("{commit_hash}", commit_hash)
            .replace("{branch}", self.branch)
            .replace("{filepath}", filepath)
    }
}

/// Host part of an `https://`, `ssh://` or scp-style `git@host:path` URL
fn host_of(url: &str) -> Option<&str> {
    let url = url.trim();
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url.split_once(':').map(|(host, _)| host)?,
    };
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    (!host.is_empty()).then_some(host)
}
