//! Whole-message rendering
//!
//! A message is lexed once per snapshot. Prose renders through the lexer;
//! details blocks are intercepted, mounted in the caller's
//! [`CollapsibleController`] and drawn as collapsible sections. Tool calls go
//! through the interpreter and [`ToolSectionRenderer`]; other details types
//! render their body as chat content, up to a nesting limit past which the
//! body is shown as escaped text.

use crate::collapsible::CollapsibleController;
use crate::interpreter::{DecodedResult, ToolResultInterpreter};
use crate::record::{ToolInvocationRecord, TOOL_CALLS_TYPE};
use crate::section::ToolSectionRenderer;
use crate::translate::Translator;
use chatmark_config::defaults::DEFAULT_MAX_DETAILS_DEPTH;
use chatmark_config::ChatmarkConfig;
use chatmark_parser::{
    lexer_from_config, HtmlWriter, Lexer, RegistryError, RegistryResult, Token, TokenKind,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Section type used for details blocks without a `type` attribute
const UNTYPED_DETAILS: &str = "details";

/// Renders chat messages containing tool calls and other details sections
#[derive(Debug)]
pub struct MessageRenderer {
    lexer: Arc<Lexer>,
    interpreter: ToolResultInterpreter,
    sections: ToolSectionRenderer,
    max_details_depth: usize,
}

impl MessageRenderer {
    /// Compose the lexer and interpreter from `config`
    pub fn new(config: &ChatmarkConfig) -> RegistryResult<Self> {
        config
            .validate()
            .map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;
        let lexer = Arc::new(lexer_from_config(&config.parser)?);
        Ok(Self::from_parts(
            lexer,
            ToolResultInterpreter::new(&config.interpreter),
        )
        .with_max_details_depth(config.parser.max_details_depth))
    }

    /// Build from an existing lexer and interpreter
    pub fn from_parts(lexer: Arc<Lexer>, interpreter: ToolResultInterpreter) -> Self {
        Self {
            sections: ToolSectionRenderer::new(Arc::clone(&lexer)),
            lexer,
            interpreter,
            max_details_depth: DEFAULT_MAX_DETAILS_DEPTH,
        }
    }

    /// Use a different label translator
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.sections = self.sections.with_translator(translator);
        self
    }

    /// Render at most `depth` levels of nested sections
    pub fn with_max_details_depth(mut self, depth: usize) -> Self {
        self.max_details_depth = depth.max(1);
        self
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn interpreter(&self) -> &ToolResultInterpreter {
        &self.interpreter
    }

    /// Render the current snapshot of `content`
    pub fn render(&self, content: &str, controller: &mut CollapsibleController) -> String {
        self.render_nested(content, controller, "", 0)
    }

    /// Render `content` found inside `depth` enclosing sections
    ///
    /// Generated ids are prefixed with `scope`, the id of the enclosing
    /// section, because token offsets restart in every body.
    fn render_nested(
        &self,
        content: &str,
        controller: &mut CollapsibleController,
        scope: &str,
        depth: usize,
    ) -> String {
        let tokens = self.lexer.lex(content);
        self.lexer.render_html_with(&tokens, |token, out| {
            let TokenKind::Details {
                attributes,
                summary,
                body,
            } = &token.kind
            else {
                return false;
            };
            let section_type = attributes
                .get("type")
                .map(String::as_str)
                .unwrap_or(UNTYPED_DETAILS);
            if section_type == TOOL_CALLS_TYPE {
                self.render_tool_call(token, attributes, scope, controller, out);
                return true;
            }

            let id = section_id(token, attributes, section_type, scope);
            let done = attributes.get("done").map_or(true, |d| d == "true");
            let open = controller.mount(&id, section_type, done).is_open;

            let mut attrs = vec![("data-type", section_type.to_string())];
            if open {
                attrs.push(("open", String::new()));
            }
            out.open_block("details", &attrs);
            out.open_nested("summary", &[]);
            out.escaped(summary.as_deref().unwrap_or("Details"));
            out.close("summary");
            out.open_nested("div", &[("class", "details-body".to_string())]);
            if depth + 1 < self.max_details_depth {
                out.raw(&self.render_nested(body, controller, &id, depth + 1));
            } else {
                tracing::debug!(id = %id, depth, "section nested too deeply, showing body as text");
                out.escaped(body);
            }
            out.close("div");
            out.close("details");
            true
        })
    }

    fn render_tool_call(
        &self,
        token: &Token,
        attributes: &BTreeMap<String, String>,
        scope: &str,
        controller: &mut CollapsibleController,
        out: &mut HtmlWriter,
    ) {
        let mut record = match ToolInvocationRecord::from_token(token) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(error = %err, offset = token.span.start, "skipping tool section");
                return;
            }
        };
        if record.id.is_empty() {
            record.id = section_id(token, attributes, TOOL_CALLS_TYPE, scope);
        }

        let decoded = self.interpreter.interpret(&record);
        let state = controller.mount(&record.id, TOOL_CALLS_TYPE, record.done);
        self.sections.render_into(&record, &decoded, state, out);
    }

    /// Interpret every tool call in `content`, including nested ones
    pub fn interpret_all(&self, content: &str) -> Vec<(ToolInvocationRecord, DecodedResult)> {
        let mut calls = Vec::new();
        self.interpret_nested(content, 0, &mut calls);
        calls
    }

    fn interpret_nested(
        &self,
        content: &str,
        depth: usize,
        calls: &mut Vec<(ToolInvocationRecord, DecodedResult)>,
    ) {
        for token in self.lexer.lex(content) {
            let TokenKind::Details { body, .. } = &token.kind else {
                continue;
            };
            match ToolInvocationRecord::from_token(&token) {
                Ok(record) => {
                    let decoded = self.interpreter.interpret(&record);
                    calls.push((record, decoded));
                }
                Err(err) if err.is_empty_record() => {
                    tracing::debug!(error = %err, "skipping tool section");
                }
                Err(_) if depth + 1 < self.max_details_depth => {
                    self.interpret_nested(body, depth + 1, calls);
                }
                Err(_) => {
                    tracing::debug!(depth, "section nested too deeply, not searching it");
                }
            }
        }
    }
}

fn section_id(
    token: &Token,
    attributes: &BTreeMap<String, String>,
    section_type: &str,
    scope: &str,
) -> String {
    match attributes.get("id").filter(|id| !id.is_empty()) {
        Some(id) => id.clone(),
        None if scope.is_empty() => format!("{section_type}-{}", token.span.start),
        None => format!("{scope}/{section_type}-{}", token.span.start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MessageRenderer {
        MessageRenderer::new(&ChatmarkConfig::default()).unwrap()
    }

    #[test]
    fn test_prose_only() {
        let mut controller = CollapsibleController::default();
        assert_eq!(
            renderer().render("Hello **there**", &mut controller),
            "<p>Hello <strong>there</strong></p>"
        );
        assert_eq!(controller.sections().count(), 0);
    }

    #[test]
    fn test_reasoning_section_follows_default() {
        let mut controller = CollapsibleController::new(chatmark_config::SectionConfig {
            details_open_by_default: true,
            ..Default::default()
        });
        let html = renderer().render(
            "<details type=\"reasoning\" done=\"true\">\n<summary>Thought</summary>\nStep *one*\n</details>\n",
            &mut controller,
        );
        assert!(html.starts_with("<details data-type=\"reasoning\" open=\"\"><summary>Thought</summary>"));
        assert!(html.contains("<em>one</em>"));
        assert!(controller.sections().next().unwrap().is_open);
    }

    #[test]
    fn test_missing_name_renders_nothing() {
        let mut controller = CollapsibleController::default();
        let html = renderer().render(
            "<details type=\"tool_calls\" done=\"true\">\n<summary>x</summary>\n</details>\n",
            &mut controller,
        );
        assert!(html.is_empty());
        assert_eq!(controller.sections().count(), 0);
    }

    #[test]
    fn test_generated_ids_are_stable() {
        let content = "<details type=\"tool_calls\" done=\"true\" name=\"ls\">\n<summary>x</summary>\n</details>\n";
        let mut controller = CollapsibleController::default();
        let first = renderer().render(content, &mut controller);
        let second = renderer().render(content, &mut controller);
        assert_eq!(first, second);
        assert!(controller.state("tool_calls-0").is_some());
    }

    #[test]
    fn test_nested_generated_ids_are_scoped() {
        let content = concat!(
            "<details type=\"reasoning\">\n<summary>Outer</summary>\n",
            "<details type=\"reasoning\">\n<summary>Inner</summary>\nx\n</details>\n",
            "</details>\n"
        );
        let mut controller = CollapsibleController::default();
        renderer().render(content, &mut controller);
        let ids: Vec<_> = controller.sections().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["reasoning-0", "reasoning-0/reasoning-0"]);
    }

    #[test]
    fn test_invalid_interpreter_config() {
        let mut config = ChatmarkConfig::default();
        config.interpreter.max_unwrap_depth = 0;
        assert!(matches!(
            MessageRenderer::new(&config),
            Err(RegistryError::InvalidConfig(_))
        ));
    }
}
