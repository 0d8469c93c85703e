//! Instruction prompt sent to the analyzer.

const INSTRUCTIONS: &str = "You are a technical content analyzer. Analyze the provided content and extract metadata.

CRITICAL: You MUST format your response EXACTLY as shown below. Do not deviate from this format.

## Metadata
Technologies: [LIST HERE - e.g., ASP.NET Core, Dapper, Entity Framework, SQL Server, PostgreSQL]
Programming_Languages: [LIST HERE - e.g., C#, SQL, JavaScript]
Tags: [LIST HERE - e.g., orm, database, dotnet, web-api, data-access]
Key_Concepts: [LIST HERE - e.g., micro-orm, repository-pattern, dependency-injection]
Code_Examples: [yes or no]
Difficulty_Level: [beginner or intermediate or advanced]
Summary: [Write 4-6 sentences here]

## Content
[Put the improved markdown content here]

IMPORTANT RULES:
1. For Technologies: List ALL technologies, frameworks, libraries, tools mentioned
2. For Programming_Languages: List ONLY programming languages, NOT frameworks
3. For Tags: Use lowercase, hyphenated terms for categorization (max 10)
4. For Key_Concepts: List main technical concepts, patterns, or methodologies (max 8)
5. Never leave any field empty - if nothing found, write \"none\"
6. Keep the original content structure but improve formatting and clarity";

/// Build the analysis prompt for content captured from `url`.
#[must_use]
pub fn build_prompt(url: &str, content: &str) -> String {
    format!("{INSTRUCTIONS}\n\nNow analyze this content from {url}:\n\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("https://example.com/a", "# Body");
        assert!(prompt.starts_with("You are a technical content analyzer."));
        assert!(prompt.contains("## Metadata\nTechnologies: [LIST HERE"));
        assert!(prompt.contains("write \"none\""));
        assert!(prompt.ends_with("Now analyze this content from https://example.com/a:\n\n# Body"));
    }
}
