// ABOUTME: Converts feed items from HTML to Markdown fragments
// ABOUTME: Builds per-item headers and the aggregated per-tag document

use crate::model::Item;
use crate::{Error, Result};
use chrono::DateTime;

pub const ITEM_SEPARATOR: &str = "\n\n---\n\n";

const HN_HOST: &str = "news.ycombinator.com";
const HN_COMMENTS_HEADING: &str = "# Comments:";

/// `YYYY-MM-DD HH:MM:SS` in UTC. Out-of-range timestamps fall back to the epoch.
pub fn format_published(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn html_to_markdown(html: &str) -> Result<String> {
    if html.trim().is_empty() {
        return Ok(String::new());
    }
    htmd::convert(html).map_err(|e| Error::Convert(e.to_string()))
}

/// Hacker News summaries render their comment count as a heading.
pub fn rewrite_hn_comments(markdown: &str) -> String {
    if !markdown.contains(HN_HOST) {
        return markdown.to_string();
    }

    markdown
        .split_inclusive('\n')
        .map(|line| match line.strip_prefix(HN_COMMENTS_HEADING) {
            Some(rest) => format!("Comments:{}", rest),
            None => line.to_string(),
        })
        .collect()
}

pub fn render_item(item: &Item) -> Result<String> {
    let mut markdown = format!("# {}\n\n", item.title());
    markdown.push_str(&format!("**Author:** {}  \n", item.author()));
    markdown.push_str(&format!(
        "**Published:** {}  \n",
        format_published(item.published())
    ));
    markdown.push_str(&format!("**URL:** {}  \n\n", item.url()));
    markdown.push_str("---\n\n");

    let body = html_to_markdown(item.body_html())?;
    markdown.push_str(&rewrite_hn_comments(&body));

    Ok(markdown)
}

/// Header line for a backup file.
pub enum DocumentHeader<'a> {
    Tag(&'a str),
    Starred,
}

impl DocumentHeader<'_> {
    fn render(&self) -> String {
        match self {
            DocumentHeader::Tag(name) => format!("# Tag: {}\n\n", name),
            DocumentHeader::Starred => "# Starred Items\n\n".to_string(),
        }
    }
}

pub fn render_document(header: DocumentHeader<'_>, items: &[Item]) -> Result<String> {
    let mut document = header.render();
    for item in items {
        document.push_str(&render_item(item)?);
        document.push_str(ITEM_SEPARATOR);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemContent, Link};

    fn item(title: Option<&str>, html: &str) -> Item {
        Item {
            title: title.map(str::to_string),
            author: Some("Ferris".into()),
            published: Some(1_700_000_000),
            summary: Some(ItemContent {
                content: Some(html.to_string()),
            }),
            content: None,
            alternate: vec![Link {
                href: Some("https://example.com/post".into()),
            }],
        }
    }

    #[test]
    fn test_format_published() {
        assert_eq!(format_published(0), "1970-01-01 00:00:00");
        assert_eq!(format_published(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_render_item_header() {
        let output = render_item(&item(Some("Hello"), "")).unwrap();
        assert_eq!(
            output,
            "# Hello\n\n\
             **Author:** Ferris  \n\
             **Published:** 2023-11-14 22:13:20  \n\
             **URL:** https://example.com/post  \n\n\
             ---\n\n"
        );
    }

    #[test]
    fn test_render_item_untitled() {
        let output = render_item(&item(None, "")).unwrap();
        assert!(output.starts_with("# Untitled\n\n"));
    }

    #[test]
    fn test_render_item_defaults() {
        let output = render_item(&Item::default()).unwrap();
        assert!(output.contains("**Author:** Unknown  \n"));
        assert!(output.contains("**Published:** 1970-01-01 00:00:00  \n"));
        assert!(output.contains("**URL:**   \n"));
    }

    #[test]
    fn test_render_item_keeps_links() {
        let html = r#"<p>Read <a href="https://example.com/more">more</a></p>"#;
        let output = render_item(&item(Some("Links"), html)).unwrap();
        assert!(output.contains("[more](https://example.com/more)"));
    }

    #[test]
    fn test_render_item_deterministic() {
        let post = item(Some("Same"), "<p>Body <em>text</em></p><ul><li>one</li></ul>");
        assert_eq!(render_item(&post).unwrap(), render_item(&post).unwrap());
    }

    #[test]
    fn test_rewrite_hn_comments() {
        let md = "Article URL: https://example.com\n\nComments URL: https://news.ycombinator.com/item?id=1\n\n# Comments: 42\n";
        let rewritten = rewrite_hn_comments(md);
        assert!(rewritten.contains("\nComments: 42\n"));
        assert!(!rewritten.contains("# Comments:"));
    }

    #[test]
    fn test_rewrite_hn_comments_first_line() {
        let md = "# Comments: 3\n\nhttps://news.ycombinator.com/item?id=7";
        assert_eq!(
            rewrite_hn_comments(md),
            "Comments: 3\n\nhttps://news.ycombinator.com/item?id=7"
        );
    }

    #[test]
    fn test_rewrite_hn_comments_other_hosts_untouched() {
        let md = "# Comments: 42\n\nhttps://lobste.rs/s/abc";
        assert_eq!(rewrite_hn_comments(md), md);
    }

    #[test]
    fn test_render_document_tag() {
        let items = vec![item(Some("One"), ""), item(Some("Two"), "")];
        let doc = render_document(DocumentHeader::Tag("Tech"), &items).unwrap();
        assert!(doc.starts_with("# Tag: Tech\n\n# One\n\n"));
        assert!(doc.ends_with(ITEM_SEPARATOR));
        assert_eq!(doc.matches("**Author:**").count(), 2);
    }

    #[test]
    fn test_render_document_starred_empty() {
        let doc = render_document(DocumentHeader::Starred, &[]).unwrap();
        assert_eq!(doc, "# Starred Items\n\n");
    }
}
