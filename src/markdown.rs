//! Markdown rendering for note bodies.
//!
//! Notes flagged as Markdown are rendered with the GitHub-flavoured subset the
//! editor preview supports: tables, strikethrough and task lists.
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::Note;

/// Shown by the preview while the editor is still empty.
pub const EMPTY_PREVIEW: &str = "*Nothing to preview yet*";

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders Markdown source to an HTML fragment.
pub fn render_html(source: &str) -> String {
    let parser = Parser::new_ext(source, options());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Renders the editor preview, using a placeholder for empty input.
pub fn preview_html(source: &str) -> String {
    if source.trim().is_empty() {
        render_html(EMPTY_PREVIEW)
    } else {
        render_html(source)
    }
}

/// Renders Markdown source to plain text for terminal output.
///
/// Block structure is kept as line breaks, list items get a bullet and task
/// items show their checkbox. Inline markup and raw HTML are dropped.
pub fn render_plain(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut list_depth = 0usize;

    for event in Parser::new_ext(source, options()) {
        match event {
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                start_line(&mut out);
                out.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                out.push_str("- ");
            }
            Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => {
                if list_depth == 0 {
                    out.push_str("\n\n");
                }
            }
            Event::End(TagEnd::CodeBlock) => out.push('\n'),
            Event::End(TagEnd::TableCell) => out.push('\t'),
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                trim_trailing_tab(&mut out);
                out.push('\n');
            }
            Event::End(TagEnd::Table) => out.push('\n'),
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str("---\n\n"),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

/// Renders a note body for display: Markdown notes are converted, plain
/// notes are returned as written.
pub fn render_note(note: &Note, as_html: bool) -> String {
    match (note.is_markdown, as_html) {
        (true, true) => render_html(&note.content),
        (true, false) => render_plain(&note.content),
        (false, true) => format!("<p>{}</p>\n", escape_html(&note.content)),
        (false, false) => note.content.clone(),
    }
}

fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn trim_trailing_tab(out: &mut String) {
    if out.ends_with('\t') {
        out.pop();
    }
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
