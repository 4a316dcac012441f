//! Large inputs built from openers that never close
//!
//! Each matcher gives up within a bounded distance, so these lex in linear
//! time. A matcher that rescans the rest of the input per opener turns any
//! of them into minutes of work.

use chatmark_parser::{default_lexer, reconstruct, TokenKind};
use test_case::test_case;

#[test_case("[", 100_000 ; "open brackets")]
#[test_case("![", 50_000 ; "image openers")]
#[test_case("[^", 50_000 ; "footnote openers")]
#[test_case("`", 100_000 ; "one backtick run")]
#[test_case("` ``", 25_000 ; "mixed backtick runs")]
#[test_case("*a ", 10_000 ; "unclosed emphasis")]
#[test_case("~~a ", 10_000 ; "unclosed strikethrough")]
#[test_case("\\(", 20_000 ; "inline math openers")]
#[test_case("\\[", 5_000 ; "display math openers")]
fn test_unclosed_openers_stay_text(unit: &str, count: usize) {
    let source = unit.repeat(count);
    let tokens = default_lexer().lex(&source);
    assert_eq!(reconstruct(&source, &tokens), source);
}

#[test]
fn test_many_brackets_are_one_text_token() {
    let source = "[".repeat(100_000);
    let tokens = default_lexer().lex(&source);
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].kind.is_text());
}

#[test]
fn test_deep_details_nesting_stays_text() {
    let levels = 10_000;
    let source = format!("{}x{}", "<details>\n".repeat(levels), "</details>\n".repeat(levels));
    let tokens = default_lexer().lex(&source);
    assert_eq!(reconstruct(&source, &tokens), source);

    let sections: Vec<_> = tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Details { .. }))
        .collect();
    // only the innermost levels that fit under the cap become a section
    assert_eq!(sections.len(), 1);
}
