// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! mdbook-latest-changes: mdBook preprocessor listing recent git changes
//!
//! Invoked by mdBook either as `mdbook-latest-changes supports <renderer>`
//! or with the preprocessor payload on stdin.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use mdbook_latest_changes::config::{Cli, Command};
use mdbook_latest_changes::preprocessor::{self, RunFlags};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries the book, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .init();

    if let Some(Command::Supports { renderer }) = &cli.command {
        return Ok(if preprocessor::supports_renderer(renderer) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let flags = RunFlags {
        strict: cli.strict,
        serve: cli.serve,
    };
    debug!(?flags, "Running preprocessor");

    preprocessor::run(io::stdin().lock(), io::stdout().lock(), flags)
        .context("latest-changes preprocessor failed")?;

    Ok(ExitCode::SUCCESS)
}
