//! End-to-end interpretation and section state scenarios

use chatmark_config::SectionConfig;
use chatmark_render::{
    Classification, CollapsibleController, Payload, RenderMode, ToolInvocationRecord,
    ToolResultInterpreter, ToolSectionRenderer,
};
use chatmark_parser::default_lexer;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn interpret(record: &ToolInvocationRecord) -> chatmark_render::DecodedResult {
    ToolResultInterpreter::default().interpret(record)
}

#[test]
fn test_string_encoded_object_is_structured() {
    let record = ToolInvocationRecord::new("call_a", "lookup")
        .with_result(r#""{\"a\":1}""#)
        .done();
    let decoded = interpret(&record);
    assert_eq!(decoded.classification, Classification::StructuredJson);
    assert_eq!(decoded.payload, Payload::Json(json!({"a": 1})));
}

#[test]
fn test_quoted_markdown_is_rich_after_one_unwrap() {
    let text = format!("##Title\n\n{}", "word ".repeat(24));
    assert!(text.chars().count() >= 120);
    let record = ToolInvocationRecord::new("call_b", "report")
        .with_result(serde_json::to_string(&text).unwrap())
        .done();

    let decoded = interpret(&record);
    assert_eq!(decoded.unwrap_depth, 1);
    assert_eq!(decoded.classification, Classification::EmbeddedRich);
    assert_eq!(decoded.payload, Payload::Text(text));
    assert_eq!(decoded.render_mode, RenderMode::RichText);
}

#[test]
fn test_empty_result_keeps_pretty_arguments() {
    let record = ToolInvocationRecord::new("call_c", "search")
        .with_arguments(r#"{"q":"test"}"#)
        .with_result("")
        .done();
    let decoded = interpret(&record);
    assert_eq!(decoded.arguments_formatted, "{\n  \"q\": \"test\"\n}");
    assert_eq!(decoded.result_text(), "");

    let renderer = ToolSectionRenderer::new(Arc::new(default_lexer()));
    let mut controller = CollapsibleController::default();
    let state = controller.mount("call_c", "tool_calls", true).clone();
    let html = renderer.render(&record, &decoded, &state);
    assert!(html.contains("tool-arguments"));
    assert!(!html.contains("class=\"tool-result\""));
}

#[test]
fn test_embeds_bypass_result_text() {
    let record = ToolInvocationRecord::new("call_d", "chart")
        .with_arguments(r#"{"kind":"bar"}"#)
        .with_result("## this text is never shown")
        .with_embeds(r#"["https://example.com/a","https://example.com/b"]"#)
        .done();
    let decoded = interpret(&record);
    assert_eq!(decoded.render_mode, RenderMode::Embeds);
    assert_eq!(decoded.embeds.len(), 2);

    let renderer = ToolSectionRenderer::new(Arc::new(default_lexer()));
    let mut controller = CollapsibleController::default();
    let state = controller.mount("call_d", "tool_calls", true).clone();
    let html = renderer.render(&record, &decoded, &state);
    assert_eq!(html.matches("<iframe").count(), 2);
    assert!(html.contains("src=\"https://example.com/a\""));
    assert!(html.contains("src=\"https://example.com/b\""));
    assert!(!html.contains("never shown"));
    assert!(!html.contains("tool-arguments"));
}

#[test]
fn test_forced_collapse_ignores_open_preference() {
    let mut controller = CollapsibleController::new(SectionConfig {
        details_open_by_default: true,
        ..SectionConfig::default()
    });
    assert!(!controller.mount("call_e", "tool_calls", true).is_open);
    assert!(controller.mount("thinking", "reasoning", true).is_open);
}

#[test_case(99, Classification::PlainText ; "one below threshold")]
#[test_case(100, Classification::EmbeddedRich ; "at threshold")]
#[test_case(101, Classification::EmbeddedRich ; "above threshold")]
fn test_length_threshold(len: usize, expected: Classification) {
    let text = format!("{}\n{}", "x".repeat(len / 2), "y".repeat(len - len / 2 - 1));
    assert_eq!(text.chars().count(), len);
    let record = ToolInvocationRecord::new("1", "t").with_result(text);
    assert_eq!(interpret(&record).classification, expected);
}

#[test]
fn test_interpretation_tracks_streaming_record() {
    let interpreter = ToolResultInterpreter::default();
    let mut record = ToolInvocationRecord::new("1", "fetch").with_arguments(r#"{"url":"x"}"#);

    let early = interpreter.interpret(&record);
    assert!(early.has_empty_result());

    record.append_result(r#"{"status":"#);
    assert_eq!(
        interpreter.interpret(&record).classification,
        Classification::PlainText
    );

    record.append_result(r#" "ok"}"#);
    record.complete(record.result.clone());
    let done = interpreter.interpret(&record);
    assert_eq!(done.payload, Payload::Json(json!({"status": "ok"})));
    assert_eq!(interpreter.interpret(&record), done);
}
