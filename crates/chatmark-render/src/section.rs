//! HTML for one tool-call section
//!
//! Output depends only on the record, its [`DecodedResult`] and the section's
//! [`CollapsibleState`], so re-rendering an unchanged call yields the same
//! HTML.

use crate::attachments::{is_embeddable, AttachmentKind, FileAttachment};
use crate::collapsible::CollapsibleState;
use crate::interpreter::{DecodedResult, RenderMode};
use crate::record::ToolInvocationRecord;
use crate::translate::{DefaultTranslator, Translator, EXECUTING, VIEW_RESULT};
use crate::unwrap::Payload;
use chatmark_parser::{HtmlWriter, Lexer};
use std::sync::Arc;

/// Sandbox applied to embedded frames
pub const EMBED_SANDBOX: &str = "allow-scripts allow-downloads allow-popups";

/// Renders tool sections, lexing labels and rich results with a shared lexer
pub struct ToolSectionRenderer {
    lexer: Arc<Lexer>,
    translator: Box<dyn Translator>,
}

impl ToolSectionRenderer {
    pub fn new(lexer: Arc<Lexer>) -> Self {
        Self {
            lexer,
            translator: Box::new(DefaultTranslator),
        }
    }

    /// Use a different label translator
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Header label, translated and rendered as inline markup
    pub fn label(&self, record: &ToolInvocationRecord) -> String {
        let key = if record.done { VIEW_RESULT } else { EXECUTING };
        let label = self.translator.translate(key, &[("NAME", record.name.as_str())]);
        self.lexer.render_inline(&self.lexer.lex(&label))
    }

    /// Section HTML as a standalone fragment
    pub fn render(
        &self,
        record: &ToolInvocationRecord,
        decoded: &DecodedResult,
        state: &CollapsibleState,
    ) -> String {
        let mut out = HtmlWriter::new();
        self.render_into(record, decoded, state, &mut out);
        out.finish()
    }

    /// Write the section into `out` as a block
    pub fn render_into(
        &self,
        record: &ToolInvocationRecord,
        decoded: &DecodedResult,
        state: &CollapsibleState,
        out: &mut HtmlWriter,
    ) {
        let mut attrs = vec![
            ("class", "tool-call".to_string()),
            ("data-id", record.id.clone()),
            ("data-name", record.name.clone()),
            ("data-done", record.done.to_string()),
        ];
        if state.is_open {
            attrs.push(("open", String::new()));
        }
        out.open_block("details", &attrs);

        out.open_nested("summary", &[]);
        out.raw(&self.label(record));
        out.close("summary");

        out.open_nested("div", &[("class", "tool-call-body".to_string())]);
        if record.done {
            self.write_result(decoded, out);
            write_files(&decoded.files, out);
        } else {
            write_arguments(decoded, out);
            if !record.result.is_empty() {
                out.open_nested(
                    "pre",
                    &[
                        ("class", "tool-result".to_string()),
                        ("data-streaming", "true".to_string()),
                    ],
                );
                out.escaped(&record.result);
                out.close("pre");
            }
        }
        out.close("div");
        out.close("details");
    }

    fn write_result(&self, decoded: &DecodedResult, out: &mut HtmlWriter) {
        match decoded.render_mode {
            RenderMode::Embeds => {
                for url in &decoded.embeds {
                    write_embed(url, out);
                }
            }
            RenderMode::StructuredJson => {
                write_code_block(Some("json"), &decoded.combined_json(), "tool-result", out);
            }
            RenderMode::RichText => {
                write_arguments(decoded, out);
                out.open_nested("div", &[("class", "tool-result".to_string())]);
                out.raw(&self.lexer.to_html(&decoded.result_text()));
                out.close("div");
            }
            RenderMode::PlainText => {
                write_arguments(decoded, out);
                if !decoded.has_empty_result() {
                    out.open_nested("pre", &[("class", "tool-result".to_string())]);
                    out.escaped(&decoded.result_text());
                    out.close("pre");
                }
            }
        }
    }
}

impl std::fmt::Debug for ToolSectionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSectionRenderer")
            .field("lexer", &self.lexer)
            .finish_non_exhaustive()
    }
}

fn write_arguments(decoded: &DecodedResult, out: &mut HtmlWriter) {
    if decoded.arguments_formatted.trim().is_empty() {
        return;
    }
    let lang = match decoded.arguments {
        Payload::Json(_) => Some("json"),
        Payload::Text(_) => None,
    };
    write_code_block(lang, &decoded.arguments_formatted, "tool-arguments", out);
}

fn write_code_block(lang: Option<&str>, body: &str, class: &str, out: &mut HtmlWriter) {
    out.open_nested("pre", &[("class", format!("code-block {class}"))]);
    let code_attrs: Vec<(&str, String)> = lang
        .iter()
        .map(|lang| ("class", format!("language-{lang}")))
        .collect();
    out.open_nested("code", &code_attrs);
    out.escaped(body);
    out.close("code");
    out.close("pre");
}

fn write_embed(url: &str, out: &mut HtmlWriter) {
    if !is_embeddable(url) {
        tracing::debug!(url, "skipping embed with unsupported scheme");
        return;
    }
    out.open_nested(
        "iframe",
        &[
            ("class", "tool-embed".to_string()),
            ("src", url.to_string()),
            ("sandbox", EMBED_SANDBOX.to_string()),
            ("loading", "lazy".to_string()),
        ],
    );
    out.close("iframe");
}

fn write_files(files: &[FileAttachment], out: &mut HtmlWriter) {
    if files.is_empty() {
        return;
    }
    out.open_nested("div", &[("class", "tool-files".to_string())]);
    for file in files {
        match file.kind {
            AttachmentKind::Image => out.open_nested(
                "img",
                &[
                    ("src", file.url.clone()),
                    ("alt", file.display_name().to_string()),
                ],
            ),
            AttachmentKind::File => {
                out.open_nested(
                    "a",
                    &[
                        ("class", "tool-file".to_string()),
                        ("href", file.url.clone()),
                        ("download", file.display_name().to_string()),
                    ],
                );
                out.escaped(file.display_name());
                out.close("a");
            }
        }
    }
    out.close("div");
}
