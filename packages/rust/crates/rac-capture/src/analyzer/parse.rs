//! Parsing of analyzer responses into classification metadata.

use rac_types::DifficultyLevel;

const METADATA_HEADING: &str = "## Metadata";
const CONTENT_HEADING: &str = "## Content";
const MAX_TAGS: usize = 10;
const MAX_KEY_CONCEPTS: usize = 8;

/// Classification and improved Markdown returned by an analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentAnalysis {
    /// Technologies, frameworks, libraries and tools
    pub technologies: Vec<String>,
    /// Programming languages only
    pub programming_languages: Vec<String>,
    /// Lowercase hyphenated tags, at most ten
    pub tags: Vec<String>,
    /// Main concepts, at most eight
    pub key_concepts: Vec<String>,
    /// Whether the article contains code
    pub code_examples: bool,
    /// Reader difficulty
    pub difficulty_level: DifficultyLevel,
    /// Short summary, when the analyzer gave one
    pub summary: Option<String>,
    /// Improved Markdown body
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Technologies,
    ProgrammingLanguages,
    Tags,
    KeyConcepts,
    CodeExamples,
    DifficultyLevel,
    Summary,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "technologies" => Some(Self::Technologies),
            "programming_languages" => Some(Self::ProgrammingLanguages),
            "tags" => Some(Self::Tags),
            "key_concepts" => Some(Self::KeyConcepts),
            "code_examples" => Some(Self::CodeExamples),
            "difficulty_level" => Some(Self::DifficultyLevel),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// Parse a response laid out as `## Metadata` fields followed by a
/// `## Content` section.
///
/// Missing fields keep their defaults. Without a `## Content` section (or
/// with an empty one) `original_markdown` becomes the content.
#[must_use]
pub fn parse_analysis(response: &str, original_markdown: &str) -> ContentAnalysis {
    let metadata_start = response
        .find(METADATA_HEADING)
        .map(|pos| pos + METADATA_HEADING.len());
    let content_pos = match metadata_start {
        Some(start) => response[start..]
            .find(CONTENT_HEADING)
            .map(|pos| start + pos),
        None => response.find(CONTENT_HEADING),
    };

    let mut analysis = ContentAnalysis::default();
    if let Some(start) = metadata_start {
        let end = content_pos.unwrap_or(response.len());
        apply_metadata(&mut analysis, &response[start..end]);
    }

    let content = content_pos
        .map(|pos| {
            let after = &response[pos + CONTENT_HEADING.len()..];
            let body = after.split_once('\n').map_or("", |(_, rest)| rest);
            body.trim_matches(['\n', '\r']).trim_end()
        })
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| original_markdown.trim_end());
    analysis.content = content.to_string();
    analysis
}

fn apply_metadata(analysis: &mut ContentAnalysis, block: &str) {
    let lines: Vec<&str> = block.lines().collect();
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        index += 1;
        let Some((field, value)) = split_field(line) else {
            continue;
        };
        match field {
            Field::Technologies => analysis.technologies = parse_list(value),
            Field::ProgrammingLanguages => analysis.programming_languages = parse_list(value),
            Field::Tags => analysis.tags = normalize_tags(parse_list(value)),
            Field::KeyConcepts => {
                let mut concepts = parse_list(value);
                concepts.truncate(MAX_KEY_CONCEPTS);
                analysis.key_concepts = concepts;
            }
            Field::CodeExamples => {
                let answer = strip_brackets(value).to_ascii_lowercase();
                analysis.code_examples = answer.starts_with("yes") || answer == "true";
            }
            Field::DifficultyLevel => {
                analysis.difficulty_level = strip_brackets(value).parse().unwrap_or_default();
            }
            Field::Summary => {
                let mut summary = vec![value.trim()];
                while index < lines.len() {
                    let next = lines[index];
                    if next.trim().is_empty() || split_field(next).is_some() {
                        break;
                    }
                    summary.push(next.trim());
                    index += 1;
                }
                let summary = summary.join("\n").trim().to_string();
                analysis.summary =
                    (!summary.is_empty() && !summary.eq_ignore_ascii_case("none")).then_some(summary);
            }
        }
    }
}

/// Split `Key: value`, tolerating list bullets and bold markers.
fn split_field(line: &str) -> Option<(Field, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim().trim_start_matches(['-', '*', ' ']).trim_end_matches('*');
    let field = Field::from_key(key.trim())?;
    Some((field, value.trim().trim_start_matches('*').trim()))
}

fn strip_brackets(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value)
        .trim()
}

/// Items of `[a, b]` or `a, b`; `none` means no items.
fn parse_list(value: &str) -> Vec<String> {
    let inner = strip_brackets(value);
    let mut items: Vec<String> = Vec::new();
    for item in inner.split(',') {
        let item = item.trim().trim_matches(['"', '\'', '`']).trim();
        if item.is_empty() || item.eq_ignore_ascii_case("none") {
            continue;
        }
        if !items.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            items.push(item.to_string());
        }
    }
    items
}

fn normalize_tags(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "## Metadata
Technologies: [ASP.NET Core, Dapper, SQL Server]
Programming_Languages: [C#, SQL]
Tags: [ORM, Data Access, dotnet, orm]
Key_Concepts: [micro-orm, repository-pattern]
Code_Examples: yes
Difficulty_Level: Intermediate
Summary: Dapper is a micro ORM.
It maps rows to objects.

## Content
# Dapper

Fast data access.
";

    #[test]
    fn test_full_response() {
        let analysis = parse_analysis(RESPONSE, "original");
        assert_eq!(
            analysis.technologies,
            vec!["ASP.NET Core", "Dapper", "SQL Server"]
        );
        assert_eq!(analysis.programming_languages, vec!["C#", "SQL"]);
        assert_eq!(analysis.tags, vec!["orm", "data-access", "dotnet"]);
        assert_eq!(
            analysis.key_concepts,
            vec!["micro-orm", "repository-pattern"]
        );
        assert!(analysis.code_examples);
        assert_eq!(analysis.difficulty_level, DifficultyLevel::Intermediate);
        assert_eq!(
            analysis.summary.as_deref(),
            Some("Dapper is a micro ORM.\nIt maps rows to objects.")
        );
        assert_eq!(analysis.content, "# Dapper\n\nFast data access.");
    }

    #[test]
    fn test_none_and_bare_lists() {
        let response = "## Metadata
**Technologies:** none
Programming_Languages: Rust, Go
Tags: [none]
Key_Concepts: [a, b, c, d, e, f, g, h, i]
Code_Examples: [no]
Difficulty_Level: [expert]
Summary: none

## Content
Body";
        let analysis = parse_analysis(response, "original");
        assert!(analysis.technologies.is_empty());
        assert_eq!(analysis.programming_languages, vec!["Rust", "Go"]);
        assert!(analysis.tags.is_empty());
        assert_eq!(analysis.key_concepts.len(), 8);
        assert!(!analysis.code_examples);
        assert_eq!(analysis.difficulty_level, DifficultyLevel::Unknown);
        assert!(analysis.summary.is_none());
        assert_eq!(analysis.content, "Body");
    }

    #[test]
    fn test_tag_limit() {
        let response = "## Metadata\nTags: [a, b, c, d, e, f, g, h, i, j, k, l]\n";
        let analysis = parse_analysis(response, "x");
        assert_eq!(analysis.tags.len(), 10);
    }

    #[test]
    fn test_missing_content_keeps_original() {
        let analysis = parse_analysis("## Metadata\nTags: [x]\n", "# Original\n");
        assert_eq!(analysis.tags, vec!["x"]);
        assert_eq!(analysis.content, "# Original");

        let analysis = parse_analysis("## Metadata\nTags: [x]\n\n## Content\n\n", "# Original");
        assert_eq!(analysis.content, "# Original");
    }

    #[test]
    fn test_unstructured_response() {
        let analysis = parse_analysis("Sorry, I cannot help with that.", "# Original");
        assert_eq!(analysis, ContentAnalysis {
            content: "# Original".into(),
            ..ContentAnalysis::default()
        });
    }
}
