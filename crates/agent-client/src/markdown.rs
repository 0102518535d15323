//! Reply Formatting
//!
//! Assistant replies are Markdown and are shown as HTML. Raw HTML inside a
//! reply is escaped and shown as text; script links are neutralized.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Render a Markdown reply to an HTML fragment
pub fn to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn is_script_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("javascript:") || url.starts_with("vbscript:") || url.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_formatting() {
        let html = to_html("Buy **low**, sell `high`");
        assert_eq!(html, "<p>Buy <strong>low</strong>, sell <code>high</code></p>\n");
    }

    #[test]
    fn test_lists_and_tables() {
        let html = to_html("- one\n- two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = to_html("<script>alert(1)</script>\n\nhi <b>there</b>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_script_links_neutralized() {
        let html = to_html("[click](javascript:alert(1)) and [docs](https://example.com)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"<a href="#">click</a>"##));
        assert!(html.contains(r#"<a href="https://example.com">docs</a>"#));
    }
}
