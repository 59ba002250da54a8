//! The markup render engine: a stateful visitor over element events.

use tracing::warn;

use crate::error::RenderError;
use crate::events::{AttrList, XhtmlEvent, parse_fragment};
use crate::media;
use crate::state::{CellSeparator, ListStack, TableInfo};
use crate::style::{CODE_FENCE, StyleToggles, TextStyle};
use crate::tag::Tag;

/// Forced line-break marker used between block-styled paragraphs.
const BR: &str = "<br />";

/// Render one XHTML fragment to Markdown.
///
/// The fragment is implicitly wrapped in a root `div`. Embedded media
/// renders as placeholder tokens; see the crate docs.
///
/// # Errors
///
/// Returns an error if the fragment is not well-formed XML.
pub fn render(fragment: &str) -> Result<String, RenderError> {
    let events = parse_fragment(fragment)?;
    let mut renderer = MarkupRenderer::new();
    for event in events {
        renderer.push_event(event);
    }
    Ok(renderer.finish())
}

/// Render state for one fragment conversion.
///
/// Owns the output buffer and every nesting context: one value accumulator
/// and attribute list per open element, the list stack, the table stack, and
/// the global style toggles. Create one per fragment and discard it after
/// [`finish`](MarkupRenderer::finish).
#[derive(Default)]
pub struct MarkupRenderer {
    output: String,
    /// Text collected per open element; depth == number of open elements.
    values: Vec<String>,
    /// Attributes per open element, parallel to `values`.
    attrs: Vec<AttrList>,
    lists: ListStack,
    tables: Vec<TableInfo>,
    toggles: StyleToggles,
    /// The most recently closed tag.
    previous_tag: Option<Tag>,
    /// Line breaks requested by `br` elements, applied on the next flush.
    pending_breaks: u32,
    /// Whether the last flush opened a monospace run (for fence merging).
    last_flush_monospace: bool,
    /// Whether the last event was a closing tag (text after a close gets a
    /// separating space so words don't fuse across element boundaries).
    after_close: bool,
}

impl MarkupRenderer {
    #[must_use]
    pub fn new() -> Self {
        MarkupRenderer::default()
    }

    /// Feed one element event into the engine.
    pub fn push_event(&mut self, event: XhtmlEvent) {
        match event {
            XhtmlEvent::Open { tag, attrs } => self.open_tag(&tag, attrs),
            XhtmlEvent::Text(text) => self.text(&text),
            XhtmlEvent::Close(tag) => self.close_tag(tag),
        }
    }

    /// Consume the engine and return the rendered Markdown.
    #[must_use]
    pub fn finish(self) -> String {
        self.output
    }

    fn open_tag(&mut self, tag: &Tag, attrs: AttrList) {
        self.after_close = false;
        self.values.push(String::new());
        match tag {
            // The prefix is decided at close, when the heading text is known.
            Tag::Heading(_) => {}
            Tag::UnorderedList => self.lists.push(false),
            Tag::OrderedList => self.lists.push(true),
            Tag::ListItem => self.open_list_item(),
            Tag::Table => {
                if self.tables.is_empty() {
                    self.add_line_break();
                }
                self.tables.push(TableInfo::new());
            }
            Tag::TableCell => self.open_cell(&attrs),
            Tag::Bold => self.toggles.bold = true,
            Tag::Underline => self.toggles.underline = true,
            Tag::Italic => self.toggles.italic = true,
            Tag::Media => self.open_media(&attrs),
            Tag::Anchor
            | Tag::Div
            | Tag::LineBreak
            | Tag::TableBody
            | Tag::TableRow
            | Tag::Paragraph
            | Tag::Font
            | Tag::Col
            | Tag::ColGroup
            | Tag::Span
            | Tag::Code => {}
            Tag::Unsupported(name) => warn!(tag = %name, "unsupported start tag"),
        }
        self.attrs.push(attrs);
    }

    fn close_tag(&mut self, tag: Tag) {
        match &tag {
            Tag::Heading(level) => self.close_heading(*level),
            Tag::UnorderedList | Tag::OrderedList => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.add_line_break();
                }
            }
            Tag::ListItem => {
                self.flush_text();
                if self.output.len() > 1 && !self.output.ends_with('\n') {
                    self.output.push('\n');
                }
            }
            Tag::Table => {
                self.tables.pop();
            }
            Tag::TableCell => self.flush_text(),
            Tag::TableRow => self.close_row(),
            Tag::Bold => {
                self.flush_text();
                self.toggles.bold = false;
            }
            Tag::Underline => {
                self.flush_text();
                self.toggles.underline = false;
            }
            Tag::Italic => {
                self.flush_text();
                self.toggles.italic = false;
            }
            Tag::Anchor => self.close_anchor(),
            Tag::Div => self.close_div(),
            Tag::LineBreak => self.pending_breaks += 1,
            Tag::Media
            | Tag::Paragraph
            | Tag::Font
            | Tag::TableBody
            | Tag::Col
            | Tag::ColGroup
            | Tag::Span
            | Tag::Code => self.flush_text(),
            Tag::Unsupported(name) => {
                warn!(tag = %name, "unsupported end tag");
                self.flush_text();
            }
        }
        self.previous_tag = Some(tag);
        self.attrs.pop();
        self.values.pop();
        self.after_close = true;
    }

    fn text(&mut self, text: &str) {
        if let Some(value) = self.values.last_mut() {
            if self.after_close {
                value.push(' ');
                self.after_close = false;
            }
            value.push_str(text);
        }
    }

    /// Headings render `level + 1` hash characters, a deliberate off-by-one
    /// kept for compatibility with existing converted notes.
    fn close_heading(&mut self, level: u8) {
        let text = self.take_value();
        if !text.trim().is_empty() {
            self.add_line_break();
            self.add_line_break();
            for _ in 0..=level {
                self.output.push('#');
            }
            self.output.push(' ');
        }
        self.output.push_str(&text);
        self.ensure_blank_line();
    }

    fn open_list_item(&mut self) {
        if let Some(prefix) = self.lists.item_prefix() {
            if prefix.opens_list {
                self.add_line_break();
            }
            self.output.push_str(&prefix.text);
        }
    }

    fn open_cell(&mut self, attrs: &AttrList) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        if let Some(value) = attrs.get("rowspan") {
            match value.trim().parse::<i64>() {
                Ok(count) => table.start_row_span(count),
                Err(_) => warn!(value, "ignoring malformed rowspan"),
            }
        }
        match table.begin_cell() {
            CellSeparator::None => {}
            CellSeparator::Normal => self.output.push_str(" | "),
            CellSeparator::SpanReserved => self.output.push_str(" || "),
        }
    }

    fn close_row(&mut self) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        self.output.push('\n');
        if let Some(columns) = table.end_row() {
            self.output.push_str("--- ");
            for _ in 1..columns {
                self.output.push_str("| --- ");
            }
            self.output.push('\n');
        }
    }

    fn close_anchor(&mut self) {
        let href = self
            .attrs
            .last()
            .and_then(|attrs| attrs.get("href"))
            .unwrap_or_default()
            .to_owned();
        let text = self.take_value();
        if text.is_empty() {
            self.output.push('<');
            self.output.push_str(&href);
            self.output.push('>');
        } else {
            self.output.push('[');
            self.output.push_str(&text);
            self.output.push_str("](");
            self.output.push_str(&href);
            self.output.push(')');
        }
    }

    fn close_div(&mut self) {
        self.flush_text();
        if matches!(self.previous_tag, Some(Tag::Div | Tag::Anchor)) {
            self.add_br();
        } else {
            self.output.push(' ');
        }
        // No paragraph breaks inside tables, and none after an inline span
        // (block-styled runs would otherwise double their spacing).
        if self.tables.is_empty() && !matches!(self.previous_tag, Some(Tag::Span)) {
            self.add_line_break();
        }
    }

    fn open_media(&mut self, attrs: &AttrList) {
        self.add_line_break();
        media::emit_placeholder(&mut self.output, attrs);
        self.add_line_break();
    }

    /// Flush the current element's accumulated text, wrapped in the style
    /// markers resolved from its ancestry, then apply pending line breaks.
    fn flush_text(&mut self) {
        if self.values.last().is_none_or(String::is_empty) {
            return;
        }
        let style = TextStyle::resolve(&self.attrs, &self.toggles);
        self.open_style(&style);
        let text = self.take_value();
        self.output.push_str(&text);
        self.close_style(&style);
        for _ in 0..self.pending_breaks {
            self.add_br();
        }
        self.pending_breaks = 0;
    }

    fn open_style(&mut self, style: &TextStyle) {
        if style.monospace() {
            if self.last_flush_monospace && self.output.ends_with(CODE_FENCE) {
                // adjacent monospace runs merge into one fenced block
                self.output.truncate(self.output.len() - CODE_FENCE.len());
            } else {
                self.output.push_str(CODE_FENCE);
            }
            self.last_flush_monospace = true;
        } else {
            self.last_flush_monospace = false;
        }
        self.output.push_str(&style.opening_markers());
    }

    fn close_style(&mut self, style: &TextStyle) {
        self.output.push_str(&style.closing_markers());
        if style.monospace() {
            self.output.push_str(CODE_FENCE);
        }
    }

    /// Take and clear the current element's accumulated text.
    fn take_value(&mut self) -> String {
        self.values.last_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Append a forced line-break marker unless one is already pending at
    /// the end of the buffer.
    fn add_br(&mut self) {
        if !self.output.ends_with(BR) {
            self.output.push_str(BR);
        }
    }

    /// Append one newline, suppressed when the buffer already ends with a
    /// blank line; redundant blank lines never accumulate.
    fn add_line_break(&mut self) {
        if self.output.len() > 2 && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    /// Pad the buffer with newlines until it ends with exactly one blank
    /// line.
    fn ensure_blank_line(&mut self) {
        while !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let out = render("hello world").unwrap();
        assert!(out.starts_with("hello world"));
    }

    #[test]
    fn value_accumulators_track_open_elements() {
        let mut renderer = MarkupRenderer::new();
        renderer.push_event(XhtmlEvent::Open {
            tag: Tag::Div,
            attrs: AttrList::default(),
        });
        renderer.push_event(XhtmlEvent::Open {
            tag: Tag::Span,
            attrs: AttrList::default(),
        });
        assert_eq!(renderer.values.len(), 2);
        renderer.push_event(XhtmlEvent::Close(Tag::Span));
        assert_eq!(renderer.values.len(), 1);
    }

    #[test]
    fn text_after_close_gets_a_separating_space() {
        let out = render("<b>bold</b>tail").unwrap();
        assert!(out.starts_with("**bold** tail"), "got: {out:?}");
    }

    #[test]
    fn line_breaks_apply_on_next_flush() {
        let out = render("one<br/>two").unwrap();
        assert!(out.starts_with("one two<br />"), "got: {out:?}");
    }

    #[test]
    fn stray_list_item_renders_without_prefix() {
        let out = render("<li>loose</li>").unwrap();
        assert!(out.starts_with("loose\n"), "got: {out:?}");
    }

    #[test]
    fn unsupported_tags_keep_their_content() {
        let out = render("<blockquote>kept</blockquote>").unwrap();
        assert!(out.contains("kept"));
    }
}
