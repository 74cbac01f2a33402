// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Latest-change collection
//!
//! This module resolves, for each tracked file, the newest commit that
//! modified it, using the `git2` crate. Nothing here writes to the
//! repository.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{Commit, DiffOptions, Oid, Repository, Sort};
use tracing::{debug, info};

use crate::error::GitError;
use crate::record::ChangeRecord;

/// Configuration for collecting change records
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Only consider tracked files below this repository-relative directory
    pub limit_to_subdir: Option<PathBuf>,
    /// Maximum number of records to return; zero or negative means unbounded
    pub history_limit: i64,
}

impl CollectOptions {
    /// Restrict collection to a repository-relative directory
    #[must_use]
    pub fn subdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.limit_to_subdir = Some(dir.into());
        self
    }

    /// Cap the number of returned records
    #[must_use]
    pub fn limit(mut self, n: i64) -> Self {
        self.history_limit = n;
        self
    }

    /// The subdirectory filter, with `""` and `"."` treated as no filter
    fn effective_subdir(&self) -> Option<&Path> {
        self.limit_to_subdir
            .as_deref()
            .filter(|dir| dir.components().any(|c| !matches!(c, Component::CurDir)))
    }

    /// The record cap, if any
    fn effective_limit(&self) -> Option<usize> {
        usize::try_from(self.history_limit).ok().filter(|n| *n > 0)
    }
}

/// Commit metadata shared by every file the commit is latest for
#[derive(Debug, Clone)]
struct CommitMeta {
    sha: String,
    timestamp: DateTime<FixedOffset>,
    author: String,
    message: String,
}

impl CommitMeta {
    fn from_commit(git_commit: &Commit<'_>) -> Self {
        let time = git_commit.time();
        let offset =
            FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
        let timestamp = DateTime::<Utc>::from_timestamp(time.seconds(), 0)
            .unwrap_or_default()
            .with_timezone(&offset);

        Self {
            sha: git_commit.id().to_string(),
            timestamp,
            author: git_commit.author().name().unwrap_or("Unknown").to_string(),
            message: git_commit.message().unwrap_or("").to_string(),
        }
    }

    fn is_newer_than(&self, other: &Self) -> bool {
        (self.timestamp, self.sha.as_str()) > (other.timestamp, other.sha.as_str())
    }
}

/// A git repository wrapper for collecting change records
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryUnavailable` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryUnavailable {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryUnavailable` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryUnavailable {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Express a filesystem path relative to the working tree
    ///
    /// Both sides are canonicalized when they exist, so symlinked temp
    /// directories and relative inputs resolve consistently.
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidPath` if the path lies outside the working
    /// tree or the repository is bare.
    pub fn relative_to_workdir(&self, path: impl AsRef<Path>) -> Result<PathBuf, GitError> {
        let path = path.as_ref();
        let invalid = || GitError::InvalidPath {
            path: path.display().to_string(),
        };

        let workdir = self.workdir().ok_or_else(invalid)?;
        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| invalid())
    }

    /// Name of the branch HEAD points to, or the HEAD SHA when detached
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryUnavailable` if HEAD cannot be resolved.
    pub fn head_branch(&self) -> Result<String, GitError> {
        let head = self.repo.head().map_err(|_| self.unavailable())?;
        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }
        let commit = head.peel_to_commit().map_err(|_| self.unavailable())?;
        Ok(commit.id().to_string())
    }

    /// List the paths in the index, optionally restricted to a subdirectory
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the index cannot be read.
    pub fn tracked_files(&self, subdir: Option<&Path>) -> Result<Vec<String>, GitError> {
        let index = self.repo.index()?;
        let files: BTreeSet<String> = index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .filter(|path| is_within(path, subdir))
            .collect();
        Ok(files.into_iter().collect())
    }

    /// Collect the latest change for every tracked file, newest first
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryUnavailable` if HEAD does not resolve to
    /// a commit, or `GitError::Git2` if the history cannot be walked.
    pub fn collect(&self, options: &CollectOptions) -> Result<Vec<ChangeRecord>, GitError> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|_| self.unavailable())?;
        debug!(head = %head.id(), "Resolved HEAD");

        let files = self.tracked_files(options.effective_subdir())?;
        info!("{} files found in git index", files.len());

        let tracked: HashSet<&str> = files.iter().map(String::as_str).collect();
        let latest = self.latest_commits(&tracked)?;

        let mut records: Vec<ChangeRecord> = files
            .iter()
            .filter_map(|file| match latest.get(file.as_str()) {
                Some(meta) => Some(ChangeRecord {
                    file_path: file.clone(),
                    commit_hash: meta.sha.clone(),
                    commit_timestamp: meta.timestamp,
                    commit_author: meta.author.clone(),
                    commit_message: meta.message.clone(),
                }),
                None => {
                    debug!(file = %file, "No commit reachable from HEAD touches this path, omitting");
                    None
                }
            })
            .collect();

        records.sort_by(ChangeRecord::newest_first);

        if let Some(limit) = options.effective_limit() {
            debug!(limit, total = records.len(), "Applying history limit");
            records.truncate(limit);
        }

        Ok(records)
    }

    /// Walk history from HEAD and keep the newest modifying commit per path
    fn latest_commits<'a>(
        &self,
        tracked: &HashSet<&'a str>,
    ) -> Result<HashMap<&'a str, CommitMeta>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut metas: HashMap<Oid, CommitMeta> = HashMap::new();
        let mut latest: HashMap<&'a str, Oid> = HashMap::new();

        for oid_result in revwalk {
            let oid = oid_result?;
            let git_commit = self.repo.find_commit(oid)?;

            let modified = self.modified_paths(&git_commit)?;
            let touched: Vec<&'a str> = modified
                .iter()
                .filter_map(|path| tracked.get(path.as_str()).copied())
                .collect();
            if touched.is_empty() {
                continue;
            }

            let meta = metas
                .entry(oid)
                .or_insert_with(|| CommitMeta::from_commit(&git_commit))
                .clone();

            for path in touched {
                let replace = match latest.get(path) {
                    Some(current) => metas
                        .get(current)
                        .is_none_or(|current| meta.is_newer_than(current)),
                    None => true,
                };
                if replace {
                    latest.insert(path, oid);
                }
            }
        }

        Ok(latest
            .into_iter()
            .filter_map(|(path, oid)| metas.get(&oid).map(|meta| (path, meta.clone())))
            .collect())
    }

    /// Paths a commit modified relative to its parents
    ///
    /// Root commits compare against the empty tree. For merges a path only
    /// counts when it differs from every parent.
    fn modified_paths(&self, git_commit: &Commit<'_>) -> Result<HashSet<String>, GitError> {
        let tree = git_commit.tree()?;

        if git_commit.parent_count() == 0 {
            return self.diff_paths(None, &tree);
        }

        let mut modified: Option<HashSet<String>> = None;
        for parent in git_commit.parents() {
            let parent_tree = parent.tree()?;
            let paths = self.diff_paths(Some(&parent_tree), &tree)?;
            modified = Some(match modified {
                Some(acc) => acc.intersection(&paths).cloned().collect(),
                None => paths,
            });
        }
        Ok(modified.unwrap_or_default())
    }

    fn diff_paths(
        &self,
        old: Option<&git2::Tree<'_>>,
        new: &git2::Tree<'_>,
    ) -> Result<HashSet<String>, GitError> {
        let mut opts = DiffOptions::new();
        opts.ignore_submodules(true);

        let diff = self.repo.diff_tree_to_tree(old, Some(new), Some(&mut opts))?;

        let mut paths = HashSet::new();
        for delta in diff.deltas() {
            for side in [delta.old_file(), delta.new_file()] {
                if let Some(bytes) = side.path_bytes() {
                    paths.insert(String::from_utf8_lossy(bytes).into_owned());
                }
            }
        }
        Ok(paths)
    }

    fn unavailable(&self) -> GitError {
        let path = self.workdir().unwrap_or_else(|| self.repo.path());
        GitError::RepositoryUnavailable {
            path: path.display().to_string(),
        }
    }
}

/// Component-wise prefix match, so `docs-old/a.md` is not inside `docs`
fn is_within(path: &str, subdir: Option<&Path>) -> bool {
    match subdir {
        Some(dir) => {
            let dir: PathBuf = dir
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            Path::new(path).starts_with(dir)
        }
        None => true,
    }
}
