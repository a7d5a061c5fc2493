//! Reply rendering: fixed fallback texts and the grouped Markdown answer.

use crate::content::{ContentItem, ContentType};
use crate::search::site_index::SiteHit;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt::Write as _;

pub const SHORT_QUERY_RESPONSE: &str =
    "Could you provide more details? I need a bit more information to give you a helpful answer.";

pub const NO_RESULTS_RESPONSE: &str = "I couldn't find anything on the site that matches your question. \
Try asking about specific forex brokers, trading strategies, or market analysis and I'll point you to the right pages.";

pub const APOLOGY_RESPONSE: &str =
    "I'm having trouble processing your request right now. Please try again in a moment.";

pub const INVALID_REQUEST_ERROR: &str = "Invalid request. Message is required.";

pub const CLOSING_INVITATION: &str = "💡 **Need more help?** Feel free to ask me to:
• Explain any broker in detail
• Compare specific features
• Help you narrow down your choices
• Provide personalized recommendations

What else would you like to know?";

pub const WEB_RESULTS_LABEL: &str = "Web Search Results";

/// Characters of excerpt / snippet shown under a link.
pub const SNIPPET_CHARS: usize = 100;

/// Site hits shown in the web results section.
pub const MAX_WEB_RESULTS: usize = 3;

/// Decode entities, strip tags and collapse whitespace.
pub fn plain_text(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));

    let stripped = re_tags.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

fn snippet(s: &str) -> String {
    plain_text(s).chars().take(SNIPPET_CHARS).collect()
}

fn push_item(out: &mut String, item: &ContentItem) {
    let _ = write!(out, "- [{}]({})", item.title, item.url);
    match item.kind {
        ContentType::Broker if item.rating != 0.0 => {
            let _ = write!(out, " - Rating: {}/10", item.rating);
        }
        ContentType::Blog if !item.excerpt.trim().is_empty() => {
            let _ = write!(out, "\n  {}...", snippet(&item.excerpt));
        }
        ContentType::Tool if !item.category.is_empty() => {
            let _ = write!(out, " ({})", item.category);
        }
        _ => {}
    }
    out.push('\n');
}

/// Render the reply for ranked items (already truncated) and optional site
/// hits. With nothing to show, returns `NO_RESULTS_RESPONSE`.
pub fn format_reply(intro: &str, ranked: &[ContentItem], web: &[SiteHit]) -> String {
    if ranked.is_empty() && web.is_empty() {
        return NO_RESULTS_RESPONSE.to_string();
    }

    let mut sections = String::new();
    for kind in ContentType::DISPLAY_ORDER {
        let mut group = ranked.iter().filter(|it| it.kind == kind).peekable();
        if group.peek().is_none() {
            continue;
        }
        let _ = write!(sections, "\n### {}\n\n", kind.label());
        for item in group {
            push_item(&mut sections, item);
        }
        sections.push('\n');
    }

    if !web.is_empty() {
        let _ = write!(sections, "\n### {WEB_RESULTS_LABEL}\n\n");
        for hit in web.iter().take(MAX_WEB_RESULTS) {
            let _ = writeln!(
                sections,
                "- [{}]({})\n  {}...",
                hit.title,
                hit.url,
                snippet(&hit.snippet)
            );
        }
        sections.push('\n');
    }

    format!("{intro}\n\n{sections}\n\n{CLOSING_INVITATION}")
}
