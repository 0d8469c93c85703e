//! Archive linting: structural checks over every captured document.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use rac_types::{
    DEFAULT_SUMMARY, DifficultyLevel, DocumentRecord, domain_matches, netloc, parse_source_url,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::archive::scanner::{ArchiveScanner, markdown_files};
use crate::archive::types::BodyStats;
use crate::error::ScanError;
use crate::frontmatter::split_frontmatter;

/// Front matter keys every capture must carry with a non-empty value.
pub const REQUIRED_FIELDS: &[&str] = &["title", "source", "domain", "date_captured"];

/// How serious an issue is.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// The document is structurally broken
    Error,
    /// The document loads but looks inconsistent
    Warning,
}

/// What is wrong with a document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LintIssueKind {
    /// The file cannot be read
    Unreadable(String),
    /// No leading `---` block
    MissingFrontMatter,
    /// Opening `---` without a closing one
    UnterminatedFrontMatter,
    /// YAML syntax error or wrong value types
    InvalidYaml(String),
    /// Required key absent or empty
    MissingField(String),
    /// `source` is not an http(s) URL
    InvalidSource(String),
    /// `domain` does not match the host of `source`
    DomainMismatch {
        /// Value of `domain`
        domain: String,
        /// Host parsed from `source`
        host: String,
    },
    /// `code_examples` disagrees with the body
    CodeExamplesMismatch {
        /// Value of `code_examples`
        declared: bool,
        /// Code blocks found in the body
        code_blocks: usize,
    },
    /// `difficulty_level` is not a known level
    UnknownDifficulty,
    /// `summary` is empty or the placeholder
    EmptySummary,
    /// Another file captures the same URL
    DuplicateSource(String),
}

impl LintIssueKind {
    /// Severity of this kind of issue.
    #[must_use]
    pub const fn severity(&self) -> LintSeverity {
        match self {
            Self::Unreadable(_)
            | Self::MissingFrontMatter
            | Self::UnterminatedFrontMatter
            | Self::InvalidYaml(_)
            | Self::MissingField(_)
            | Self::InvalidSource(_) => LintSeverity::Error,
            Self::DomainMismatch { .. }
            | Self::CodeExamplesMismatch { .. }
            | Self::UnknownDifficulty
            | Self::EmptySummary
            | Self::DuplicateSource(_) => LintSeverity::Warning,
        }
    }
}

impl fmt::Display for LintIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(e) => write!(f, "unreadable: {e}"),
            Self::MissingFrontMatter => f.write_str("missing front matter"),
            Self::UnterminatedFrontMatter => f.write_str("unterminated front matter"),
            Self::InvalidYaml(e) => write!(f, "invalid front matter: {e}"),
            Self::MissingField(name) => write!(f, "missing field `{name}`"),
            Self::InvalidSource(source) => write!(f, "source is not an http(s) URL: {source}"),
            Self::DomainMismatch { domain, host } => {
                write!(f, "domain `{domain}` does not match source host `{host}`")
            }
            Self::CodeExamplesMismatch {
                declared,
                code_blocks,
            } => write!(
                f,
                "code_examples is {declared} but the body has {code_blocks} code block(s)"
            ),
            Self::UnknownDifficulty => f.write_str("difficulty_level is unknown"),
            Self::EmptySummary => f.write_str("summary is empty"),
            Self::DuplicateSource(other) => write!(f, "same source as {other}"),
        }
    }
}

/// One finding for one file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LintIssue {
    /// Path relative to the archive root
    pub file_path: String,
    /// Severity
    pub severity: LintSeverity,
    /// Finding
    #[serde(flatten)]
    pub kind: LintIssueKind,
}

/// Result of linting an archive.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    /// Markdown files examined
    pub files_checked: usize,
    /// Findings sorted by file path
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    /// True when no error-severity issue was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// Number of error-severity issues.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(LintSeverity::Error)
    }

    /// Number of warning-severity issues.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(LintSeverity::Warning)
    }

    /// Issues reported for one file.
    pub fn issues_for<'a>(&'a self, file_path: &'a str) -> impl Iterator<Item = &'a LintIssue> {
        self.issues.iter().filter(move |i| i.file_path == file_path)
    }

    fn count(&self, severity: LintSeverity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

struct FileLint {
    file_path: String,
    kinds: Vec<LintIssueKind>,
    source: Option<String>,
}

impl ArchiveScanner {
    /// Check every markdown file under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_path` exists but is not a directory.
    pub fn lint(&self, base_path: &Path) -> Result<LintReport, ScanError> {
        let files = markdown_files(base_path, None)?;

        let linted: Vec<FileLint> = files
            .par_iter()
            .map(|path| {
                let file_path = path
                    .strip_prefix(base_path)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/");
                let (kinds, source) = match fs::read_to_string(path) {
                    Ok(content) => lint_content(&content),
                    Err(error) => (vec![LintIssueKind::Unreadable(error.to_string())], None),
                };
                FileLint {
                    file_path,
                    kinds,
                    source,
                }
            })
            .collect();

        let mut first_by_source: HashMap<String, String> = HashMap::new();
        let mut issues = Vec::new();
        for file in linted {
            let FileLint {
                file_path,
                mut kinds,
                source,
            } = file;
            if let Some(source) = source {
                let key = source.trim_end_matches('/').to_string();
                match first_by_source.get(&key) {
                    Some(other) => kinds.push(LintIssueKind::DuplicateSource(other.clone())),
                    None => {
                        first_by_source.insert(key, file_path.clone());
                    }
                }
            }
            issues.extend(kinds.into_iter().map(|kind| LintIssue {
                file_path: file_path.clone(),
                severity: kind.severity(),
                kind,
            }));
        }

        let report = LintReport {
            files_checked: files.len(),
            issues,
        };
        log::info!(
            "Linted {} documents: {} error(s), {} warning(s)",
            report.files_checked,
            report.error_count(),
            report.warning_count()
        );
        Ok(report)
    }
}

/// Lint one document's text. Returns the findings and, when readable, its source URL.
#[must_use]
pub fn lint_content(content: &str) -> (Vec<LintIssueKind>, Option<String>) {
    let front = match split_frontmatter(content) {
        Ok(front) => front,
        Err(ScanError::UnterminatedFrontMatter) => {
            return (vec![LintIssueKind::UnterminatedFrontMatter], None);
        }
        Err(_) => return (vec![LintIssueKind::MissingFrontMatter], None),
    };

    let value: serde_yaml::Value = match serde_yaml::from_str(front.yaml) {
        Ok(value) => value,
        Err(error) => return (vec![LintIssueKind::InvalidYaml(error.to_string())], None),
    };
    if !value.is_mapping() {
        return (
            vec![LintIssueKind::InvalidYaml(
                "front matter is not a mapping".to_string(),
            )],
            None,
        );
    }

    let mut kinds: Vec<LintIssueKind> = REQUIRED_FIELDS
        .iter()
        .filter(|field| is_blank(value.get(**field)))
        .map(|field| LintIssueKind::MissingField((*field).to_string()))
        .collect();

    let record: DocumentRecord = match serde_yaml::from_value(value) {
        Ok(record) => record,
        Err(error) => {
            if kinds.is_empty() {
                kinds.push(LintIssueKind::InvalidYaml(error.to_string()));
            }
            return (kinds, None);
        }
    };

    let source = record.source.trim();
    match parse_source_url(source) {
        Some(url) => {
            if !record.domain.trim().is_empty() && !domain_matches(&record.domain, &url) {
                kinds.push(LintIssueKind::DomainMismatch {
                    domain: record.domain.clone(),
                    host: netloc(&url),
                });
            }
        }
        None if !source.is_empty() => kinds.push(LintIssueKind::InvalidSource(source.to_string())),
        None => {}
    }

    let stats = BodyStats::from_markdown(front.body);
    if record.code_examples != (stats.code_block_count > 0) {
        kinds.push(LintIssueKind::CodeExamplesMismatch {
            declared: record.code_examples,
            code_blocks: stats.code_block_count,
        });
    }
    if record.difficulty_level == DifficultyLevel::Unknown {
        kinds.push(LintIssueKind::UnknownDifficulty);
    }
    let summary = record.summary.trim();
    if summary.is_empty() || summary == DEFAULT_SUMMARY {
        kinds.push(LintIssueKind::EmptySummary);
    }

    let source = (!source.is_empty()).then(|| source.to_string());
    (kinds, source)
}

fn is_blank(value: Option<&serde_yaml::Value>) -> bool {
    match value {
        None | Some(serde_yaml::Value::Null) => true,
        Some(serde_yaml::Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "---
title: Saga Pattern
source: https://example.com/saga
date_captured: 2025-01-01T00:00:00
domain: example.com
code_examples: false
difficulty_level: advanced
summary: Sagas coordinate local transactions.
---

# Saga Pattern

Prose only.
";

    #[test]
    fn test_clean_document() {
        let (kinds, source) = lint_content(GOOD);
        assert!(kinds.is_empty(), "{kinds:?}");
        assert_eq!(source.as_deref(), Some("https://example.com/saga"));
    }

    #[test]
    fn test_missing_fields_reported_once() {
        let content = "---\ntitle: ''\n---\nbody\n";
        let (kinds, _) = lint_content(content);
        assert_eq!(
            kinds,
            vec![
                LintIssueKind::MissingField("title".into()),
                LintIssueKind::MissingField("source".into()),
                LintIssueKind::MissingField("domain".into()),
                LintIssueKind::MissingField("date_captured".into()),
            ]
        );
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            lint_content("# No front matter").0,
            vec![LintIssueKind::MissingFrontMatter]
        );
        assert_eq!(
            lint_content("---\ntitle: x\n").0,
            vec![LintIssueKind::UnterminatedFrontMatter]
        );
        assert!(matches!(
            lint_content("---\n- a\n- b\n---\n").0.as_slice(),
            [LintIssueKind::InvalidYaml(_)]
        ));
        assert!(matches!(
            lint_content("---\ntitle: [x\n---\n").0.as_slice(),
            [LintIssueKind::InvalidYaml(_)]
        ));
    }

    #[test]
    fn test_consistency_warnings() {
        let content = GOOD
            .replace("domain: example.com", "domain: other.org")
            .replace("code_examples: false", "code_examples: true")
            .replace("difficulty_level: advanced", "difficulty_level: hard")
            .replace(
                "summary: Sagas coordinate local transactions.",
                "summary: No summary available",
            );
        let (kinds, _) = lint_content(&content);
        assert!(kinds.contains(&LintIssueKind::DomainMismatch {
            domain: "other.org".into(),
            host: "example.com".into()
        }));
        assert!(kinds.contains(&LintIssueKind::CodeExamplesMismatch {
            declared: true,
            code_blocks: 0
        }));
        assert!(kinds.contains(&LintIssueKind::UnknownDifficulty));
        assert!(kinds.contains(&LintIssueKind::EmptySummary));
        assert!(kinds.iter().all(|k| k.severity() == LintSeverity::Warning));
    }

    #[test]
    fn test_invalid_source() {
        let content = GOOD.replace("source: https://example.com/saga", "source: example.com/saga");
        let (kinds, _) = lint_content(&content);
        assert!(kinds.contains(&LintIssueKind::InvalidSource("example.com/saga".into())));
    }

    #[test]
    fn test_default_port_is_not_a_mismatch() {
        let content = GOOD.replace(
            "source: https://example.com/saga",
            "source: https://example.com:443/saga",
        );
        let (kinds, _) = lint_content(&content);
        assert!(kinds.is_empty(), "{kinds:?}");

        let content = GOOD.replace("domain: example.com", "domain: example.com:443");
        let (kinds, _) = lint_content(&content);
        assert!(kinds.is_empty(), "{kinds:?}");
    }

    #[test]
    fn test_non_ascii_host_is_valid_source() {
        let content = GOOD
            .replace("source: https://example.com/saga", "source: http://é.example/x")
            .replace("domain: example.com", "domain: é.example");
        let (kinds, source) = lint_content(&content);
        assert!(kinds.is_empty(), "{kinds:?}");
        assert_eq!(source.as_deref(), Some("http://é.example/x"));

        let host = rac_types::source_host("http://é.example/x").unwrap();
        let content = GOOD
            .replace("source: https://example.com/saga", "source: http://é.example/x")
            .replace("domain: example.com", &format!("domain: {host}"));
        assert!(lint_content(&content).0.is_empty());
    }

    #[test]
    fn test_report_json_shape() {
        let report = LintReport {
            files_checked: 1,
            issues: vec![LintIssue {
                file_path: "a.md".into(),
                severity: LintSeverity::Warning,
                kind: LintIssueKind::DuplicateSource("b.md".into()),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["filesChecked"], 1);
        assert_eq!(json["issues"][0]["filePath"], "a.md");
        assert_eq!(json["issues"][0]["severity"], "warning");
        assert_eq!(json["issues"][0]["kind"], "duplicate_source");
        assert_eq!(json["issues"][0]["detail"], "b.md");
    }
}
