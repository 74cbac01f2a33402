// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test utilities for mdbook-latest-changes integration tests
//!
//! Provides throwaway git repositories laid out as books, and builders for
//! the JSON payload mdBook sends to a preprocessor.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use git2::{Repository, RepositoryInitOptions, Signature, Time};
use serde_json::{Value, json};

use mdbook_latest_changes::preprocessor::{self, RunFlags};

/// Counter for generating unique test directory names
static TEST_DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Base commit time for fixtures (2026-01-01T00:00:00Z)
pub const BASE_TIME: i64 = 1_767_225_600;

/// A temporary directory that is removed when dropped
pub struct TempTestDir {
    path: PathBuf,
}

impl TempTestDir {
    /// Create a new, uniquely named temporary test directory
    pub fn new(test_name: &str) -> Self {
        let counter = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir_name = format!(
            "mdbook-latest-changes-{}-{}-{}",
            test_name,
            std::process::id(),
            counter
        );
        let path = std::env::temp_dir().join(dir_name);
        fs::create_dir_all(&path).expect("Failed to create temp test directory");
        Self { path }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempTestDir {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

/// A git repository on branch `main` holding a book
pub struct TestBook {
    temp_dir: TempTestDir,
    repo: Repository,
}

impl TestBook {
    /// Initialize an empty repository
    pub fn new(test_name: &str) -> Self {
        let temp_dir = TempTestDir::new(test_name);
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(temp_dir.path(), &opts).expect("Failed to init repo");
        Self { temp_dir, repo }
    }

    /// Repository working tree
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file and stage it
    pub fn write(&self, relative_path: &str, content: &str) -> &Self {
        let file_path = self.path().join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write file");

        let mut index = self.repo.index().expect("Failed to open index");
        index
            .add_path(Path::new(relative_path))
            .expect("Failed to stage file");
        index.write().expect("Failed to write index");
        self
    }

    /// Commit the index onto HEAD as "Test Author" at `BASE_TIME + offset_secs`
    pub fn commit_at(&self, message: &str, offset_secs: i64) -> String {
        self.commit_as("Test Author", message, offset_secs)
    }

    /// Commit the index onto HEAD with a custom author name
    pub fn commit_as(&self, author: &str, message: &str, offset_secs: i64) -> String {
        let time = Time::new(BASE_TIME + offset_secs, 0);
        let sig = Signature::new(author, "test@example.com", &time).expect("signature");

        let mut index = self.repo.index().expect("Failed to open index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit")
            .to_string()
    }
}

/// Preprocessor context for a book rooted at `root` with sources in `src`
pub fn context(root: &Path, preprocessor_options: Value, repo_url: Option<&str>) -> Value {
    let mut config = json!({
        "book": { "src": "src", "title": "Handbook" },
        "preprocessor": { "latest-changes": preprocessor_options },
    });
    if let Some(url) = repo_url {
        config["output"] = json!({ "html": { "git-repository-url": url } });
    }
    json!({
        "root": root,
        "config": config,
        "renderer": "html",
        "mdbook_version": "0.4.40",
    })
}

/// A chapter item as mdBook serializes it
pub fn chapter(name: &str, source_path: &str, content: &str, sub_items: Vec<Value>) -> Value {
    json!({
        "Chapter": {
            "name": name,
            "content": content,
            "number": null,
            "sub_items": sub_items,
            "path": source_path,
            "source_path": source_path,
            "parent_names": [],
        }
    })
}

/// A book holding `items` at the top level
pub fn book(items: Vec<Value>) -> Value {
    json!({ "sections": items, "__non_exhaustive": null })
}

/// Run the preprocessor on `[context, book]` and parse what it writes
pub fn run_preprocessor(
    context: &Value,
    book: &Value,
    flags: RunFlags,
) -> Result<Value, mdbook_latest_changes::PluginError> {
    let input = serde_json::to_vec(&json!([context, book])).expect("serialize input");
    let mut output = Vec::new();
    preprocessor::run(input.as_slice(), &mut output, flags)?;
    Ok(serde_json::from_slice(&output).expect("preprocessor wrote valid JSON"))
}

/// Content of the chapter at `pointer`, e.g. `/sections/0`
pub fn content_at<'a>(book: &'a Value, pointer: &str) -> &'a str {
    book.pointer(&format!("{pointer}/Chapter/content"))
        .and_then(Value::as_str)
        .expect("chapter content")
}
