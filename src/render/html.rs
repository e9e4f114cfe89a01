//! Standalone HTML pages, the input of the PDF engine.

use super::{render_markdown, RenderOptions};
use crate::error::Result;
use crate::model::TestData;
use pulldown_cmark::{html, Options, Parser};

/// Dark page style used when no stylesheet is supplied.
pub const DEFAULT_STYLESHEET: &str = r#"
@page { margin: 0; padding: 0; size: A4; }

html, body {
  background-color: #1e1e2e;
  color: #cdd6f4;
  margin: 0;
  padding: 0;
  min-height: 100vh;
  width: 100%;
}

body {
  font-family: 'Source Sans Pro', sans-serif;
  line-height: 1.4;
  font-size: 14px;
  padding: 20px;
  box-sizing: border-box;
}

h1 {
  color: #89b4fa;
  padding-bottom: 8px;
  border-bottom: 1px solid #45475a;
  margin-bottom: 1.5em;
}

h2 {
  color: #89dceb;
  margin-top: 20px;
  margin-bottom: 10px;
  font-size: 1.3em;
}

img {
  max-width: 95%;
  display: block;
  margin: 15px auto;
  border: 1px solid #45475a;
  border-radius: 5px;
}

strong { color: #a6e3a1; font-weight: 600; }

em { color: #bac2de; font-style: italic; font-size: 0.9em; }

blockquote { border-left: 3px solid #45475a; margin: 0; padding-left: 1em; }

hr { border: 0; height: 1px; background: #45475a; margin: 15px 0; }
"#;

/// Converts Markdown to a complete HTML page.
///
/// `stylesheet` replaces [`DEFAULT_STYLESHEET`] when given.
pub fn markdown_to_html(markdown: &str, title: &str, stylesheet: Option<&str>) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        stylesheet.unwrap_or(DEFAULT_STYLESHEET),
        body
    )
}

/// Renders a test to an HTML page through its Markdown form.
///
/// Frontmatter is never included, it has no meaning in HTML.
pub fn render_html(test: &TestData, options: &RenderOptions, stylesheet: Option<&str>) -> Result<String> {
    let options = RenderOptions {
        include_frontmatter: false,
        ..options.clone()
    };
    let markdown = render_markdown(test, &options)?;
    Ok(markdown_to_html(&markdown, &test.title, stylesheet))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html("# Title\n\n**✓ 1. Yes**\n", "T & C", None);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>T &amp; C</title>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>✓ 1. Yes</strong>"));
        assert!(html.contains("#1e1e2e"));
    }

    #[test]
    fn test_custom_stylesheet() {
        let html = markdown_to_html("text", "t", Some("body { color: red; }"));
        assert!(html.contains("body { color: red; }"));
        assert!(!html.contains("#1e1e2e"));
    }

    #[test]
    fn test_render_html_skips_frontmatter() {
        let test = TestData::default();
        let html = render_html(&test, &RenderOptions::default().with_frontmatter(), None).unwrap();
        assert!(html.contains("<h1>Untitled Test</h1>"));
        assert!(!html.contains("title: "));
        assert!(html.contains("<hr />"));
    }
}
