//! Subcommand implementations
//!
//! Each command takes the loaded configuration and input text and returns
//! what should be printed, so the binary only does I/O.

use anyhow::{Context, Result};
use chatmark_config::ChatmarkConfig;
use chatmark_parser::{
    default_registry, scan_directives, CalendarImport, Scope, Token, CALENDAR_IMPORT,
};
use chatmark_render::{CollapsibleController, DecodedResult, MessageRenderer, ToolInvocationRecord};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Read `path`, or stdin when it is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[derive(Serialize)]
struct LexReport<'a> {
    tokens: &'a [Token],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<String>,
}

pub fn lex(config: &ChatmarkConfig, input: &str, diagnostics: bool) -> Result<String> {
    let lexer = default_registry(&config.parser)?.compose();
    let output = lexer.lex_with_diagnostics(input);
    let report = LexReport {
        tokens: &output.tokens,
        diagnostics: if diagnostics {
            output.diagnostics.iter().map(|e| e.to_string()).collect()
        } else {
            Vec::new()
        },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render(config: &ChatmarkConfig, input: &str, open: bool) -> Result<String> {
    let renderer = MessageRenderer::new(config)?;
    let mut sections = config.sections.clone();
    if open {
        sections.details_open_by_default = true;
    }
    let mut controller = CollapsibleController::new(sections);
    Ok(renderer.render(input, &mut controller))
}

#[derive(Serialize)]
struct InterpretedCall {
    record: ToolInvocationRecord,
    decoded: DecodedResult,
}

pub fn interpret(config: &ChatmarkConfig, input: &str) -> Result<String> {
    let renderer = MessageRenderer::new(config)?;
    let calls: Vec<InterpretedCall> = renderer
        .interpret_all(input)
        .into_iter()
        .map(|(record, decoded)| InterpretedCall { record, decoded })
        .collect();
    Ok(serde_json::to_string_pretty(&calls)?)
}

pub fn directives(input: &str) -> Result<String> {
    let mut lines = Vec::new();
    for directive in scan_directives(input) {
        let marker = if directive.escaped { " (escaped)" } else { "" };
        lines.push(format!(
            "{} at {}..{}{}",
            directive.name, directive.span.start, directive.span.end, marker
        ));
        if directive.name != CALENDAR_IMPORT {
            continue;
        }
        match CalendarImport::from_directive(&directive) {
            Ok(import) => {
                for article in &import.articles {
                    lines.push(format!("  {} {}", article.publish_date, article.title));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "undecodable calendar import");
                lines.push(format!("  invalid payload: {err}"));
            }
        }
    }
    Ok(lines.join("\n"))
}

pub fn extensions(config: &ChatmarkConfig) -> Result<String> {
    let registry = default_registry(&config.parser)?;
    let mut lines: Vec<String> = registry
        .iter()
        .map(|ext| {
            let scope = match ext.scope() {
                Scope::Block => "block",
                Scope::Inline => "inline",
            };
            format!("{:<22} {:<7} {}", ext.name(), scope, ext.description())
        })
        .collect();
    let stats = registry.stats();
    lines.push(format!(
        "{} extensions ({} block, {} inline)",
        stats.total, stats.block, stats.inline
    ));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello @bob").unwrap();
        assert_eq!(read_input(file.path()).unwrap(), "hello @bob");
        assert!(read_input(Path::new("/nonexistent/chatmark-input")).is_err());
    }

    #[test]
    fn test_lex_outputs_json() {
        let json = lex(&ChatmarkConfig::default(), "**hi**", false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tokens"][0]["kind"]["type"], "strong");
        assert!(value.get("diagnostics").is_none());
    }

    #[test]
    fn test_render_and_interpret() {
        let content = "<details type=\"tool_calls\" done=\"true\" id=\"c1\" name=\"ls\" result=\"a\">\n<summary>x</summary>\n</details>\n";
        let config = ChatmarkConfig::default();
        assert!(render(&config, content, false)
            .unwrap()
            .starts_with("<details class=\"tool-call\""));

        let value: serde_json::Value =
            serde_json::from_str(&interpret(&config, content).unwrap()).unwrap();
        assert_eq!(value[0]["record"]["id"], "c1");
        assert_eq!(value[0]["decoded"]["classification"], "plain_text");
    }

    #[test]
    fn test_directives_listing() {
        let text = "<!-- CALENDAR_IMPORT:eyJhcnRpY2xlcyI6W3sicHVibGlzaF9kYXRlIjoiMjAyNC0wNS0wMSIsInRpdGxlIjoiSGVsbG8ifV19 -->";
        let listing = directives(text).unwrap();
        assert!(listing.starts_with("CALENDAR_IMPORT at 0.."));
        assert!(listing.ends_with("  2024-05-01 Hello"));
    }

    #[test]
    fn test_extensions_listing() {
        let listing = extensions(&ChatmarkConfig::default()).unwrap();
        assert!(listing.starts_with("details"));
        assert!(listing.ends_with("22 extensions (8 block, 14 inline)"));
    }
}
