#![allow(missing_docs)]

//! Tests for ArchiveScanner over a temporary archive directory.

use std::fs;
use std::path::Path;

use rac_scanner::{ArchiveFilter, ArchiveScanner, LintIssueKind, LintSeverity, ScanError};
use rac_types::DifficultyLevel;
use tempfile::TempDir;

fn write_doc(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn capture(title: &str, source: &str, tags: &str, technologies: &str, difficulty: &str) -> String {
    let domain = rac_scanner::source_host(source).unwrap_or_default();
    format!(
        "---
title: {title}
source: {source}
date_published: unknown
date_captured: 2025-01-14T10:21:07.512044
domain: {domain}
author: Unknown
category: programming
technologies: {technologies}
programming_languages: []
tags: {tags}
key_concepts: []
code_examples: false
difficulty_level: {difficulty}
summary: |
  A short summary of {title}.
---

# {title}

Body text for {title}.
"
    )
}

fn seed_archive(root: &Path) {
    write_doc(
        root,
        "example.com_cqrs.md",
        &capture(
            "CQRS",
            "https://example.com/cqrs",
            "[cqrs, microservices]",
            "[EventStoreDB]",
            "advanced",
        ),
    );
    write_doc(
        root,
        "example.com_saga.md",
        &capture(
            "Saga",
            "https://example.com/saga",
            "[saga, Microservices]",
            "[Kafka]",
            "intermediate",
        ),
    );
    write_doc(
        root,
        "nested/blog.dev_observer.md",
        &capture(
            "Observer in Rust",
            "https://www.blog.dev/observer",
            "[design-patterns]",
            "[]",
            "beginner",
        ),
    );
    write_doc(root, "notes.txt", "not an archive document");
    write_doc(root, ".drafts/hidden.md", "---\ntitle: hidden\n---\n");
}

/// Scanning returns every valid document sorted by path.
#[test]
fn test_scan_all() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());

    let scanner = ArchiveScanner::new();
    let entries = scanner.scan_all(temp_dir.path(), None).unwrap();

    let paths: Vec<&str> = entries.iter().map(|e| e.file_path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "example.com_cqrs.md",
            "example.com_saga.md",
            "nested/blog.dev_observer.md"
        ]
    );
    let cqrs = &entries[0];
    assert_eq!(cqrs.record.title, "CQRS");
    assert_eq!(cqrs.record.difficulty_level, DifficultyLevel::Advanced);
    assert_eq!(cqrs.record.summary, "A short summary of CQRS.");
    assert_eq!(cqrs.stats.code_block_count, 0);
    assert_eq!(cqrs.stats.word_count, 4);
    assert_eq!(cqrs.file_hash.len(), 64);
    assert_eq!(cqrs.id.len(), 32);
}

/// Depth limits stop at the archive root.
#[test]
fn test_scan_depth() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());

    let entries = ArchiveScanner::new()
        .scan_all(temp_dir.path(), Some(0))
        .unwrap();
    assert_eq!(entries.len(), 2);
}

/// Broken files are skipped by scanning.
#[test]
fn test_scan_skips_invalid_documents() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());
    write_doc(temp_dir.path(), "broken.md", "# no front matter\n");

    let entries = ArchiveScanner::new()
        .scan_all(temp_dir.path(), None)
        .unwrap();
    assert_eq!(entries.len(), 3);
}

/// Scanning a file path instead of a directory is an error.
#[test]
fn test_scan_rejects_file_root() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("single.md");
    fs::write(&file, "x").unwrap();

    let result = ArchiveScanner::new().scan_all(&file, None);
    assert!(matches!(result, Err(ScanError::NotADirectory(_))));
}

/// Non-markdown files are rejected by scan_document.
#[test]
fn test_scan_document_non_markdown() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());

    let result = ArchiveScanner::new()
        .scan_document(&temp_dir.path().join("notes.txt"), temp_dir.path());
    assert!(matches!(result, Err(ScanError::NotMarkdown(_))));
}

/// Filters combine tags, technologies, difficulty and domain.
#[test]
fn test_filter() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());
    let scanner = ArchiveScanner::new();

    let micro = scanner
        .filter(temp_dir.path(), &ArchiveFilter::new().with_tag("microservices"))
        .unwrap();
    assert_eq!(micro.len(), 2);

    let kafka = scanner
        .filter(
            temp_dir.path(),
            &ArchiveFilter::new()
                .with_tag("microservices")
                .with_technology("kafka"),
        )
        .unwrap();
    assert_eq!(kafka.len(), 1);
    assert_eq!(kafka[0].record.title, "Saga");

    let beginner = scanner
        .filter(
            temp_dir.path(),
            &ArchiveFilter::new()
                .with_difficulty(DifficultyLevel::Beginner)
                .with_domain("blog.dev"),
        )
        .unwrap();
    assert_eq!(beginner.len(), 1);
    assert_eq!(beginner[0].record.title, "Observer in Rust");
}

/// Tag counts merge spellings and sort by frequency.
#[test]
fn test_tag_counts() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());

    let tags = ArchiveScanner::new().tag_counts(temp_dir.path()).unwrap();
    assert_eq!(tags[0], ("microservices".to_string(), 2));
    assert_eq!(tags.len(), 4);
    assert_eq!(tags[1].0, "cqrs");

    let technologies = ArchiveScanner::new()
        .technology_counts(temp_dir.path())
        .unwrap();
    assert_eq!(technologies.len(), 2);
}

/// Lint flags broken and inconsistent documents.
#[test]
fn test_lint_report() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());
    write_doc(temp_dir.path(), "broken.md", "# no front matter\n");
    write_doc(
        temp_dir.path(),
        "example.com_cqrs_copy.md",
        &capture(
            "CQRS again",
            "https://example.com/cqrs",
            "[cqrs]",
            "[]",
            "advanced",
        ),
    );

    let report = ArchiveScanner::new().lint(temp_dir.path()).unwrap();

    assert_eq!(report.files_checked, 5);
    assert!(!report.is_clean());
    assert_eq!(report.error_count(), 1);

    let broken: Vec<_> = report.issues_for("broken.md").collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].kind, LintIssueKind::MissingFrontMatter);
    assert_eq!(broken[0].severity, LintSeverity::Error);

    let duplicate: Vec<_> = report.issues_for("example.com_cqrs_copy.md").collect();
    assert_eq!(
        duplicate[0].kind,
        LintIssueKind::DuplicateSource("example.com_cqrs.md".to_string())
    );
}

/// A tidy archive lints clean.
#[test]
fn test_lint_clean_archive() {
    let temp_dir = TempDir::new().unwrap();
    seed_archive(temp_dir.path());

    let report = ArchiveScanner::new().lint(temp_dir.path()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.warning_count(), 0);
}
