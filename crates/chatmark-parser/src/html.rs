//! Minimal HTML writer used by extension renderers
//!
//! Tokens are flat, so the writer tracks the little block structure HTML
//! needs: an open paragraph, and "line blocks" (heading, list item and
//! blockquote markers) that close at the next newline.

use html_escape::{encode_double_quoted_attribute, encode_text};

/// Accumulates rendered HTML
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
    paragraph_open: bool,
    pending_break: bool,
    inline_only: bool,
    line_blocks: Vec<&'static str>,
}

impl HtmlWriter {
    /// Empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer for a fragment that never opens paragraphs, such as a label
    pub fn inline() -> Self {
        Self {
            inline_only: true,
            ..Self::default()
        }
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Escaped text; newlines close line blocks or become soft breaks
    pub fn text(&mut self, text: &str) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.line_break();
            }
            if !segment.is_empty() {
                self.ensure_inline();
                self.out.push_str(&encode_text(segment));
            }
        }
    }

    /// Pre-rendered HTML, written as-is
    pub fn raw(&mut self, html: &str) {
        self.out.push_str(html);
    }

    /// Escaped text with newlines preserved, for the inside of `<pre>`-like blocks
    pub fn escaped(&mut self, text: &str) {
        self.out.push_str(&encode_text(text));
    }

    /// Open an inline element, starting a paragraph if needed
    pub fn open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.ensure_inline();
        self.write_open(tag, attrs);
    }

    /// Close an element opened with [`open`](Self::open) or [`open_block`](Self::open_block)
    pub fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// Inline element wrapping escaped text
    pub fn element(&mut self, tag: &str, attrs: &[(&str, String)], text: &str) {
        self.open(tag, attrs);
        self.out.push_str(&encode_text(text));
        self.close(tag);
    }

    /// Void element such as `<img>` or `<hr>`
    pub fn void(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.ensure_inline();
        self.write_open(tag, attrs);
    }

    /// Open a block element, ending the current paragraph
    pub fn open_block(&mut self, tag: &str, attrs: &[(&str, String)]) {
        if self.line_blocks.is_empty() {
            self.end_block();
        }
        self.write_open(tag, attrs);
    }

    /// Open an element inside whatever is open, with no paragraph handling
    pub fn open_nested(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.write_open(tag, attrs);
    }

    /// Block-level void element such as `<hr>`
    pub fn void_block(&mut self, tag: &str, attrs: &[(&str, String)]) {
        if self.line_blocks.is_empty() {
            self.end_block();
        }
        self.write_open(tag, attrs);
    }

    /// Open an element that closes itself at the next newline
    pub fn open_line_block(&mut self, tag: &'static str, attrs: &[(&str, String)]) {
        if self.line_blocks.is_empty() {
            self.end_block();
        }
        self.write_open(tag, attrs);
        self.line_blocks.push(tag);
    }

    /// Close the open paragraph and any line blocks
    pub fn end_block(&mut self) {
        self.close_line_blocks();
        if self.paragraph_open {
            self.out.push_str("</p>");
            self.paragraph_open = false;
        }
        self.pending_break = false;
    }

    /// Close everything and return the HTML
    pub fn finish(mut self) -> String {
        self.end_block();
        self.out
    }

    fn ensure_inline(&mut self) {
        if self.inline_only {
            if self.pending_break {
                self.out.push(' ');
                self.pending_break = false;
            }
            return;
        }
        if !self.line_blocks.is_empty() {
            return;
        }
        if !self.paragraph_open {
            self.out.push_str("<p>");
            self.paragraph_open = true;
        } else if self.pending_break {
            self.out.push('\n');
        }
        self.pending_break = false;
    }

    fn line_break(&mut self) {
        if !self.line_blocks.is_empty() {
            self.close_line_blocks();
        } else if self.paragraph_open || self.inline_only {
            // written lazily so a paragraph never ends in a newline
            self.pending_break = true;
        }
    }

    fn close_line_blocks(&mut self) {
        while let Some(tag) = self.line_blocks.pop() {
            self.close(tag);
        }
    }

    fn write_open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&encode_double_quoted_attribute(value));
            self.out.push('"');
        }
        self.out.push('>');
    }
}
