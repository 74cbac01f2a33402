// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! mdBook preprocessor protocol
//!
//! mdBook runs the preprocessor with `[context, book]` as JSON on stdin and
//! reads the book back from stdout. The book is handled as untyped JSON so
//! fields this crate does not know about survive the round trip.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use latest_changes_git::GitRepo;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::PluginOptions;
use crate::error::PluginError;
use crate::marker::contains_marker;
use crate::pipeline::{RenderSettings, render_page};

/// Name of the preprocessor table in `book.toml`
pub const PREPROCESSOR_NAME: &str = "latest-changes";

/// Command-line switches that affect a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Fail when no git history is available
    pub strict: bool,
    /// The book is being served rather than built
    pub serve: bool,
}

/// The parts of mdBook's preprocessor context this crate uses
#[derive(Debug, Clone)]
pub struct BookContext {
    /// Book root directory (where `book.toml` lives)
    pub root: PathBuf,
    /// Source directory, relative to `root`
    pub src_dir: PathBuf,
    /// Renderer the book is being prepared for
    pub renderer: String,
    /// Validated plugin options
    pub options: PluginOptions,
    /// `output.html.git-repository-url`, if set
    pub host_repo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    root: PathBuf,
    #[serde(default)]
    config: Value,
    #[serde(default)]
    renderer: String,
    #[serde(default)]
    mdbook_version: String,
}

impl BookContext {
    /// Extract the context from mdBook's JSON
    ///
    /// # Errors
    ///
    /// Returns `PluginError::Json` for a malformed context and
    /// `PluginError::Config` for invalid plugin options.
    pub fn from_value(ctx: Value) -> Result<Self, PluginError> {
        let raw: RawContext = serde_json::from_value(ctx)?;
        debug!(
            renderer = %raw.renderer,
            mdbook_version = %raw.mdbook_version,
            root = %raw.root.display(),
            "Read preprocessor context"
        );

        let src_dir = raw
            .config
            .pointer("/book/src")
            .and_then(Value::as_str)
            .map_or_else(|| PathBuf::from("src"), PathBuf::from);
        let options = PluginOptions::from_value(
            raw.config
                .pointer(&format!("/preprocessor/{PREPROCESSOR_NAME}")),
        )?;
        let host_repo_url = raw
            .config
            .pointer("/output/html/git-repository-url")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            root: raw.root,
            src_dir,
            renderer: raw.renderer,
            options,
            host_repo_url,
        })
    }

    /// Absolute source directory
    #[must_use]
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(&self.src_dir)
    }
}

/// Whether output for `renderer` can be produced; every renderer consumes
/// plain markdown, so always true
#[must_use]
pub fn supports_renderer(renderer: &str) -> bool {
    debug!(renderer, "Renderer support probe");
    true
}

/// Read `[context, book]` from `input`, rewrite the book, write it to `output`
///
/// # Errors
///
/// Returns `PluginError` if the payload is malformed, the options are
/// invalid, or history is unavailable in strict mode.
pub fn run<R: Read, W: Write>(input: R, mut output: W, flags: RunFlags) -> Result<(), PluginError> {
    let (ctx, mut book): (Value, Value) = serde_json::from_reader(input)?;
    let context = BookContext::from_value(ctx)?;

    let rewritten = process_book(&context, &mut book, flags)?;
    info!("Rendered latest changes into {rewritten} page(s)");

    serde_json::to_writer(&mut output, &book)?;
    output.flush()?;
    Ok(())
}

/// Rewrite every chapter containing the marker; returns how many changed
///
/// # Errors
///
/// Returns `PluginError` if the book JSON has an unexpected shape, or if
/// history is unavailable and strict mode is on.
pub fn process_book(
    context: &BookContext,
    book: &mut Value,
    flags: RunFlags,
) -> Result<usize, PluginError> {
    let options = &context.options;
    if flags.serve && !options.enabled_on_serve {
        info!("Plugin deactivated during `serve`. Hint: config option `enabled_on_serve`");
        return Ok(0);
    }

    let items = book_items_mut(book)?;
    if marker_pages(items) == 0 {
        debug!("No page contains the latest_changes marker");
        return Ok(0);
    }

    let strict = flags.strict || options.strict;
    let repo = match GitRepo::discover(&context.root) {
        Ok(repo) => repo,
        Err(err) => return lenient(PluginError::from(err), strict).map(|()| 0),
    };

    let mut settings = RenderSettings::new(options.clone(), context.host_repo_url.as_deref());
    if options.limit_to_docs_dir {
        match repo.relative_to_workdir(context.docs_dir()) {
            Ok(dir) => {
                debug!(
                    "limit_to_docs_dir enabled: only files from {} are listed",
                    dir.display()
                );
                settings = settings.with_docs_subdir(dir);
            }
            Err(err) => warn!("limit_to_docs_dir ignored: {err}"),
        }
    }

    let src_dir = context.docs_dir();
    let mut rewritten = 0;
    let mut outcome = Ok(());
    for_each_chapter(items, &mut |chapter| {
        if outcome.is_err() {
            return;
        }
        let Some(content) = chapter.get("content").and_then(Value::as_str) else {
            return;
        };
        if !contains_marker(content) {
            return;
        }

        let page_path = chapter_page_path(chapter, &src_dir, &repo);
        match render_page(&repo, &settings, page_path.as_deref(), content) {
            Ok(rendered) => {
                chapter.insert("content".to_string(), Value::String(rendered));
                rewritten += 1;
            }
            Err(err) => outcome = lenient(err, strict),
        }
    });
    outcome?;

    Ok(rewritten)
}

/// Swallow a missing-history error with a warning unless strict
fn lenient(err: PluginError, strict: bool) -> Result<(), PluginError> {
    if err.is_repository_unavailable() && !strict {
        warn!("{err}; leaving latest_changes markers untouched");
        Ok(())
    } else {
        Err(err)
    }
}

/// Top-level book items (`sections`, or `items` in newer mdBook)
fn book_items_mut(book: &mut Value) -> Result<&mut Vec<Value>, PluginError> {
    let book = book
        .as_object_mut()
        .ok_or_else(|| PluginError::Protocol("book is not a JSON object".to_string()))?;
    let key = if book.contains_key("sections") {
        "sections"
    } else {
        "items"
    };
    book.get_mut(key)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| PluginError::Protocol("book has no sections array".to_string()))
}

fn chapter(item: &Value) -> Option<&Map<String, Value>> {
    item.get("Chapter").and_then(Value::as_object)
}

/// Number of chapters, at any depth, containing the marker
fn marker_pages(items: &[Value]) -> usize {
    items
        .iter()
        .filter_map(chapter)
        .map(|chapter| {
            let own = chapter
                .get("content")
                .and_then(Value::as_str)
                .is_some_and(contains_marker);
            let nested = chapter
                .get("sub_items")
                .and_then(Value::as_array)
                .map_or(0, |children| marker_pages(children));
            usize::from(own) + nested
        })
        .sum()
}

/// Visit every chapter, depth first
fn for_each_chapter<F>(items: &mut [Value], f: &mut F)
where
    F: FnMut(&mut Map<String, Value>),
{
    for item in items {
        if let Some(chapter) = item.get_mut("Chapter").and_then(Value::as_object_mut) {
            f(chapter);
            if let Some(children) = chapter.get_mut("sub_items").and_then(Value::as_array_mut) {
                for_each_chapter(children, f);
            }
        }
    }
}

/// Repository-relative, `/`-separated path of a chapter's source file
fn chapter_page_path(chapter: &Map<String, Value>, src_dir: &Path, repo: &GitRepo) -> Option<String> {
    let source = chapter
        .get("source_path")
        .and_then(Value::as_str)
        .or_else(|| chapter.get("path").and_then(Value::as_str))?;

    match repo.relative_to_workdir(src_dir.join(source)) {
        Ok(path) => Some(
            path.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        ),
        Err(err) => {
            debug!("No repository path for chapter {source}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    fn ctx(preprocessor: Value) -> Value {
        json!({
            "root": "/books/handbook",
            "config": {
                "book": { "src": "content" },
                "output": { "html": { "git-repository-url": "https://github.com/acme/handbook" } },
                "preprocessor": { "latest-changes": preprocessor }
            },
            "renderer": "html",
            "mdbook_version": "0.4.40"
        })
    }

    #[test]
    fn test_context_extraction() {
        let context = BookContext::from_value(ctx(json!({ "history_limit": 2 }))).expect("context");
        assert_eq!(context.root, PathBuf::from("/books/handbook"));
        assert_eq!(context.src_dir, PathBuf::from("content"));
        assert_eq!(context.docs_dir(), PathBuf::from("/books/handbook/content"));
        assert_eq!(context.renderer, "html");
        assert_eq!(context.options.history_limit, 2);
        assert_eq!(
            context.host_repo_url.as_deref(),
            Some("https://github.com/acme/handbook")
        );
    }

    #[test]
    fn test_context_defaults() {
        let context = BookContext::from_value(json!({ "root": "/b", "config": {} })).expect("context");
        assert_eq!(context.src_dir, PathBuf::from("src"));
        assert_eq!(context.options, PluginOptions::default());
        assert!(context.host_repo_url.is_none());
    }

    #[test]
    fn test_context_invalid_options() {
        let result = BookContext::from_value(ctx(json!({ "table_features": ["nope"] })));
        assert!(matches!(result, Err(PluginError::Config(_))));
    }

    #[test]
    fn test_supports_every_renderer() {
        assert!(supports_renderer("html"));
        assert!(supports_renderer("markdown"));
    }

    #[test]
    fn test_marker_pages_counts_nested_chapters() {
        let items = vec![
            json!({ "Chapter": { "content": "{{ latest_changes }}", "sub_items": [
                { "Chapter": { "content": "plain", "sub_items": [] } },
                { "Chapter": { "content": "x {{ latest_changes }}", "sub_items": [] } }
            ] } }),
            json!("Separator"),
            json!({ "PartTitle": "Part" }),
        ];
        assert_eq!(marker_pages(&items), 2);
    }

    #[test]
    fn test_for_each_chapter_visits_depth_first() {
        let mut items = vec![
            json!({ "Chapter": { "name": "a", "sub_items": [
                { "Chapter": { "name": "a.1", "sub_items": [] } }
            ] } }),
            json!({ "Chapter": { "name": "b", "sub_items": [] } }),
        ];
        let mut names = Vec::new();
        for_each_chapter(&mut items, &mut |chapter| {
            names.push(chapter["name"].as_str().unwrap_or_default().to_string());
        });
        assert_eq!(names, vec!["a", "a.1", "b"]);
    }

    #[test]
    fn test_book_items_accepts_sections_or_items() {
        let mut old = json!({ "sections": [], "__non_exhaustive": null });
        assert!(book_items_mut(&mut old).is_ok());
        let mut new = json!({ "items": [] });
        assert!(book_items_mut(&mut new).is_ok());
        let mut bad = json!({ "chapters": [] });
        assert!(matches!(book_items_mut(&mut bad), Err(PluginError::Protocol(_))));
        let mut not_object = json!([]);
        assert!(book_items_mut(&mut not_object).is_err());
    }

    #[test]
    fn test_serve_with_enabled_on_serve_false_passes_through() {
        let context = BookContext::from_value(ctx(json!({ "enabled_on_serve": false })))
            .expect("context");
        let mut book = json!({ "sections": [
            { "Chapter": { "content": "{{ latest_changes }}", "sub_items": [] } }
        ] });
        let before = book.clone();
        let flags = RunFlags {
            serve: true,
            ..RunFlags::default()
        };
        assert_eq!(process_book(&context, &mut book, flags).expect("ok"), 0);
        assert_eq!(book, before);
    }

    #[test]
    fn test_lenient_only_swallows_missing_history() {
        let missing = PluginError::Git(latest_changes_git::GitError::RepositoryUnavailable {
            path: "/x".to_string(),
        });
        assert!(lenient(missing, false).is_ok());

        let missing = PluginError::Git(latest_changes_git::GitError::RepositoryUnavailable {
            path: "/x".to_string(),
        });
        assert!(lenient(missing, true).is_err());

        let other = PluginError::Protocol("bad".to_string());
        assert!(lenient(other, false).is_err());
    }
}
