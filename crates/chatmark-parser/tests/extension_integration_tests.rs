//! Integration tests for composed extensions on realistic chat content

use chatmark_parser::{
    compose, create_latex_extension, create_mention_extension, default_lexer, lexer_from_config,
    reconstruct, scan_directives, CalendarImport, FootnoteKind, TokenKind,
};
use chatmark_config::ParserConfig;

fn kinds(source: &str) -> Vec<TokenKind> {
    default_lexer().lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_chat_answer_with_every_extension() {
    let source = "## Results\n\nEnergy is $E=mc^2$ [1][2], see @alice and #physics.[^n]\n\n[^n]: Einstein, 1905\n";
    let tokens = default_lexer().lex(source);
    assert_eq!(reconstruct(source, &tokens), source);

    let kinds: Vec<_> = tokens.iter().map(|t| &t.kind).collect();
    assert!(kinds.contains(&&TokenKind::Heading { level: 2 }));
    assert!(kinds.contains(&&TokenKind::Math {
        body: "E=mc^2".to_string(),
        display: false,
    }));
    assert!(kinds.contains(&&TokenKind::Citation {
        source_ids: vec![1, 2]
    }));
    assert!(kinds.contains(&&TokenKind::Mention {
        trigger: '@',
        query: "alice".to_string(),
        label: None,
    }));
    assert!(kinds.contains(&&TokenKind::Mention {
        trigger: '#',
        query: "physics".to_string(),
        label: None,
    }));
    assert!(kinds.contains(&&TokenKind::Footnote {
        kind: FootnoteKind::Reference,
        label: "n".to_string(),
    }));
    assert!(kinds.contains(&&TokenKind::Footnote {
        kind: FootnoteKind::Definition,
        label: "n".to_string(),
    }));
}

#[test]
fn test_two_mention_triggers_compose_independently() {
    let lexer = compose([create_mention_extension('@'), create_mention_extension('#')]).unwrap();
    let tokens = lexer.lex("@bob in #ops");
    let mentions: Vec<_> = tokens
        .iter()
        .filter_map(|t| match &t.kind {
            TokenKind::Mention { trigger, query, .. } => Some((*trigger, query.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(mentions, vec![('@', "bob"), ('#', "ops")]);
    assert_eq!(tokens[0].extension.as_deref(), Some("mention-@"));
    assert_eq!(tokens[2].extension.as_deref(), Some("mention-#"));
}

#[test]
fn test_registration_order_decides_conflicts() {
    // '$' as a mention trigger only wins when registered before math
    let mention_first =
        compose([create_mention_extension('$'), create_latex_extension()]).unwrap();
    assert!(matches!(
        mention_first.lex("$x$")[0].kind,
        TokenKind::Mention { .. }
    ));

    let math_first = compose([create_latex_extension(), create_mention_extension('$')]).unwrap();
    assert!(matches!(math_first.lex("$x$")[0].kind, TokenKind::Math { .. }));
}

#[test]
fn test_directive_survives_lexing() {
    let payload = "eyJhcnRpY2xlcyI6W3sicHVibGlzaF9kYXRlIjoiMjAyNC0wNS0wMSIsInRpdGxlIjoiSGVsbG8ifV19";
    for source in [
        format!("Planned!\n<!-- CALENDAR_IMPORT:{} -->\nDone", payload),
        format!("Planned!\n&lt;!-- CALENDAR_IMPORT:{} --&gt;\nDone", payload),
    ] {
        let tokens = default_lexer().lex(&source);
        assert_eq!(tokens.len(), 1, "directive must stay literal: {:?}", tokens);
        assert!(tokens[0].kind.is_text());

        let directives = scan_directives(&source);
        assert_eq!(directives.len(), 1);
        let import = CalendarImport::from_directive(&directives[0]).unwrap();
        assert_eq!(import.articles[0].title, "Hello");
    }
}

#[test]
fn test_streaming_snapshots_converge() {
    let full = "Here:\n```python\nprint('hi')\n```\nThat is $x$.";
    let lexer = default_lexer();

    let partial = &full[..full.find("print").unwrap() + 5];
    let partial_tokens = lexer.lex(partial);
    assert!(partial_tokens.iter().any(|t| matches!(
        &t.kind,
        TokenKind::CodeBlock { closed: false, .. }
    )));

    let tokens = lexer.lex(full);
    assert!(tokens.iter().any(|t| matches!(
        &t.kind,
        TokenKind::CodeBlock { closed: true, lang: Some(lang), .. } if lang == "python"
    )));
    assert_eq!(reconstruct(full, &tokens), full);
}

#[test]
fn test_math_inside_code_is_not_math() {
    let tokens = kinds("`$x$` and\n```\n$$y$$\n```\n");
    assert!(!tokens.iter().any(|k| matches!(k, TokenKind::Math { .. })));
}

#[test]
fn test_details_block_in_message() {
    let source = "Let me check.\n<details type=\"tool_calls\" done=\"true\" id=\"1\" name=\"web_search\" arguments=\"{}\" result=\"&quot;[]&quot;\">\n<summary>Tool Executed</summary>\n</details>\nNothing found.";
    let tokens = kinds(source);
    let details = tokens
        .iter()
        .find_map(|k| match k {
            TokenKind::Details { attributes, .. } => Some(attributes),
            _ => None,
        })
        .unwrap();
    assert_eq!(details["name"], "web_search");
    assert_eq!(details["result"], "\"[]\"");
}

#[test]
fn test_features_can_be_disabled() {
    let config = ParserConfig {
        citations: false,
        math: false,
        ..ParserConfig::default()
    };
    let lexer = lexer_from_config(&config).unwrap();
    let tokens = lexer.lex("cost $5 [1]");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].kind.is_text());
}

#[test]
fn test_html_output() {
    let html = default_lexer().to_html("# Title\n\n- **bold** item\n- `code` <b>\n\n---\n");
    assert_eq!(
        html,
        concat!(
            "<h1>Title</h1>",
            "<li class=\"bullet\" data-depth=\"0\"><strong>bold</strong> item</li>",
            "<li class=\"bullet\" data-depth=\"0\"><code>code</code> &lt;b&gt;</li>",
            "<hr>"
        )
    );
}
