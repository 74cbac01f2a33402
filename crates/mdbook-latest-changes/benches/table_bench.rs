// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use chrono::{FixedOffset, TimeZone};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use latest_changes_git::ChangeRecord;
use mdbook_latest_changes::config::RenderConfig;
use mdbook_latest_changes::marker::{MARKER, substitute};
use mdbook_latest_changes::table::{self, TableFeature, escape_cell};
use mdbook_latest_changes::vendor::Vendor;

/// Records spread across a docs tree, newest first
fn sample_records(count: usize) -> Vec<ChangeRecord> {
    let tz = FixedOffset::east_opt(3600).expect("valid offset");
    (0..count)
        .map(|i| ChangeRecord {
            file_path: format!("docs/chapter-{}/page-{}.md", i % 12, i),
            commit_hash: format!("{:040x}", i),
            commit_timestamp: tz
                .timestamp_opt(1_767_225_600 - i as i64 * 60, 0)
                .single()
                .expect("valid timestamp"),
            commit_author: format!("Author {}", i % 7),
            commit_message: format!("Update page {} | fix <typos> & links\n\nLonger body", i),
        })
        .collect()
}

fn render_benchmarks(c: &mut Criterion) {
    let plain = RenderConfig::default();
    let linked = RenderConfig {
        vendor: Some(Vendor::Github),
        repo_url: Some("https://github.com/acme/handbook".to_string()),
        table_features: TableFeature::ALL.to_vec(),
        page_path: Some("docs/changes.md".to_string()),
        ..RenderConfig::default()
    };

    let mut group = c.benchmark_group("render");
    for count in [10, 100, 1000] {
        let records = sample_records(count);
        group.bench_with_input(BenchmarkId::new("plain", count), &records, |b, records| {
            b.iter(|| table::render(records, &plain))
        });
        group.bench_with_input(BenchmarkId::new("linked", count), &records, |b, records| {
            b.iter(|| table::render(records, &linked))
        });
    }
    group.finish();
}

fn text_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("text");

    let message = "Fix | pipes & <html> in \"quoted\" messages\r\nsecond line ".repeat(20);
    group.bench_function("escape_cell", |b| b.iter(|| escape_cell(&message)));

    let page = format!("# Changes\n\n{}\n\n{MARKER}\n\nFooter", "Intro text. ".repeat(500));
    let table = table::render(&sample_records(50), &RenderConfig::default());
    group.bench_function("substitute", |b| b.iter(|| substitute(&page, MARKER, &table)));

    group.finish();
}

criterion_group!(benches, render_benchmarks, text_benchmarks);
criterion_main!(benches);
