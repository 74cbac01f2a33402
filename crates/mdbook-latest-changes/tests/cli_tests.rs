// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI tests for the preprocessor binary's arguments
//!
//! These tests cover the `supports` subcommand mdBook calls first, the
//! logging flags, and the strict / serve switches.

use clap::Parser;
use mdbook_latest_changes::config::{Cli, Command};
use tracing::Level;

// ============================================================================
// supports subcommand
// ============================================================================

#[test]
fn test_supports_subcommand() {
    let cli = Cli::try_parse_from(["mdbook-latest-changes", "supports", "html"])
        .expect("parse should succeed");
    assert_eq!(
        cli.command,
        Some(Command::Supports {
            renderer: "html".to_string()
        })
    );
}

#[test]
fn test_supports_requires_renderer() {
    let result = Cli::try_parse_from(["mdbook-latest-changes", "supports"]);
    assert!(result.is_err(), "supports needs a renderer name");
}

#[test]
fn test_no_subcommand_means_preprocess() {
    let cli = Cli::try_parse_from(["mdbook-latest-changes"]).expect("parse should succeed");
    assert!(cli.command.is_none());
}

#[test]
fn test_unknown_subcommand_rejected() {
    let result = Cli::try_parse_from(["mdbook-latest-changes", "render"]);
    assert!(result.is_err());
}

// ============================================================================
// logging flags
// ============================================================================

#[test]
fn test_verbose_sets_debug_log_level() {
    let cli = Cli::try_parse_from(["mdbook-latest-changes", "-v"]).expect("parse should succeed");
    assert!(cli.verbose);
    assert_eq!(cli.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_sets_warn_log_level() {
    let cli =
        Cli::try_parse_from(["mdbook-latest-changes", "--quiet"]).expect("parse should succeed");
    assert!(cli.quiet);
    assert_eq!(cli.log_level(), Level::WARN);
}

#[test]
fn test_default_log_level_is_info() {
    let cli = Cli::default();
    assert_eq!(cli.log_level(), Level::INFO);
}

#[test]
fn test_verbose_wins_over_quiet() {
    let cli = Cli {
        verbose: true,
        quiet: true,
        ..Default::default()
    };
    assert_eq!(cli.log_level(), Level::DEBUG);
}

#[test]
fn test_flags_combine_with_supports() {
    let cli = Cli::try_parse_from(["mdbook-latest-changes", "-q", "supports", "markdown"])
        .expect("parse should succeed");
    assert!(cli.quiet);
    assert!(matches!(cli.command, Some(Command::Supports { ref renderer }) if renderer == "markdown"));
}

// ============================================================================
// strict / serve
// ============================================================================

#[test]
fn test_strict_and_serve_flags() {
    let cli = Cli::try_parse_from(["mdbook-latest-changes", "--strict", "--serve"])
        .expect("parse should succeed");
    assert!(cli.strict);
    assert!(cli.serve);
}

#[test]
fn test_unknown_flag_rejected() {
    let result = Cli::try_parse_from(["mdbook-latest-changes", "--lenient"]);
    assert!(result.is_err());
}
