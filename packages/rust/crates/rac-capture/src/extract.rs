//! Page metadata and main-content extraction from downloaded HTML.

use scraper::{ElementRef, Html, Selector};

use crate::fetch::{netloc, parse_page_url};

/// Metadata and content found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// `<title>` text, or the URL host when absent
    pub title: String,
    /// Author from meta tags or byline markup, else `Unknown`
    pub author: String,
    /// Publication date as declared by the page
    pub publication_date: Option<String>,
    /// Host plus explicit port of the page URL
    pub domain: String,
    /// HTML of the main content region
    pub content_html: String,
}

const AUTHOR_META: &[&str] = &["meta[name=author]", "meta[property=\"article:author\"]"];

const DATE_META: &[&str] = &[
    "meta[property=\"article:published_time\"]",
    "meta[name=publish_date]",
    "meta[property=\"og:published_time\"]",
];

const CONTENT_REGIONS: &[&str] = &["main", "article", "[role=main]", "body"];

/// Extract metadata and the main content region from `html`.
#[must_use]
pub fn extract_page(html: &str, url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let domain = parse_page_url(url)
        .map(|u| netloc(&u))
        .unwrap_or_default();

    let title = select_first(&document, "title")
        .map(collapse_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| domain.clone());

    let author = first_meta_content(&document, AUTHOR_META)
        .or_else(|| byline(&document))
        .unwrap_or_else(|| rac_types::DEFAULT_AUTHOR.to_string());

    let publication_date = first_meta_content(&document, DATE_META).or_else(|| {
        select_first(&document, "time[datetime]")
            .and_then(|el| el.value().attr("datetime"))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    });

    let content_html = CONTENT_REGIONS
        .iter()
        .find_map(|css| select_first(&document, css))
        .map_or_else(|| document.root_element().html(), |el| el.inner_html());

    ExtractedPage {
        title,
        author,
        publication_date,
        domain,
        content_html,
    }
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn first_meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        select_first(document, css)
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    })
}

/// Text of the first element whose class mentions `author`, else the first
/// `itemprop=author` element.
fn byline(document: &Html) -> Option<String> {
    let by_class = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| class.to_ascii_lowercase().contains("author"))
        });
    let element = by_class.or_else(|| select_first(document, "[itemprop=author]"))?;
    let text = collapse_text(element);
    (!text.is_empty()).then_some(text)
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.example.com/blog/cqrs";

    #[test]
    fn test_full_page() {
        let html = r#"<html><head>
            <title>
              CQRS Explained
            </title>
            <meta name="author" content="Jane Doe">
            <meta property="article:published_time" content="2024-03-01T08:00:00Z">
        </head><body>
            <nav>menu</nav>
            <main><h1>CQRS</h1><p>Split reads from writes.</p></main>
        </body></html>"#;
        let page = extract_page(html, URL);
        assert_eq!(page.title, "CQRS Explained");
        assert_eq!(page.author, "Jane Doe");
        assert_eq!(
            page.publication_date.as_deref(),
            Some("2024-03-01T08:00:00Z")
        );
        assert_eq!(page.domain, "www.example.com");
        assert!(page.content_html.contains("<h1>CQRS</h1>"));
        assert!(!page.content_html.contains("menu"));
    }

    #[test]
    fn test_fallbacks() {
        let html = r#"<html><body>
            <div class="post-Author-name"> John
               Smith </div>
            <time datetime="2023-11-05">Nov 5</time>
            <p>Body only.</p>
        </body></html>"#;
        let page = extract_page(html, URL);
        assert_eq!(page.title, "www.example.com");
        assert_eq!(page.author, "John Smith");
        assert_eq!(page.publication_date.as_deref(), Some("2023-11-05"));
        assert!(page.content_html.contains("Body only."));
    }

    #[test]
    fn test_empty_meta_falls_through() {
        let html = r#"<html><head>
            <meta name="author" content="">
            <meta name="publish_date" content=" ">
            <meta property="og:published_time" content="2022-01-01">
        </head><body>
            <span itemprop="author">Ada</span>
            <article><p>Article text</p></article>
        </body></html>"#;
        let page = extract_page(html, URL);
        assert_eq!(page.author, "Ada");
        assert_eq!(page.publication_date.as_deref(), Some("2022-01-01"));
        assert_eq!(page.content_html, "<p>Article text</p>");
    }

    #[test]
    fn test_unknown_author_and_role_main() {
        let html = r#"<html><body><div role="main"><p>x</p></div></body></html>"#;
        let page = extract_page(html, URL);
        assert_eq!(page.author, "Unknown");
        assert!(page.publication_date.is_none());
        assert_eq!(page.content_html, "<p>x</p>");
    }
}
