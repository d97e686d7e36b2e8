use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer, LexMode::Standard);
    assert_eq!(t.typ, expected, "in {:?}", code);
  }
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(EOF, t.typ, "in {:?}", code);
}

#[test]
fn test_lex_keywords() {
  check("class", [KeywordClass]);
  check("instanceof", [KeywordInstanceof]);
  check("import", [KeywordImport]);
  check("export", [KeywordExport]);
  check("from", [KeywordFrom]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Identifier]);
  check("imports", [Identifier]);
  check("exporter", [Identifier]);
  check("classes", [Identifier]);
  check("\\u0061bc", [Identifier]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralNumber]);
  check("929", [LiteralNumber]);
  check(".929", [LiteralNumber]);
  check(". 929", [Dot, LiteralNumber]);
  check("0x1f", [LiteralNumber]);
  check("1e10", [LiteralNumber]);
  check("?.929", [Question, LiteralNumber]);
  check("?..929", [QuestionDot, LiteralNumber]);
}

#[test]
fn test_lex_literal_bigints() {
  check("1n", [LiteralBigInt]);
  check("0x800faceb00cn", [LiteralBigInt]);
  check("0b110101010n", [LiteralBigInt]);
  check("0o12077n", [LiteralBigInt]);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [LiteralString]);
  check("\"hello world\"", [LiteralString]);
  check("'hello world\n'", [Invalid]);
  check("'unterminated", [Invalid]);
  check("'esc\\'aped'", [LiteralString]);
}

#[test]
fn test_lex_templates() {
  check("`plain`", [LiteralTemplatePartStringEnd]);
  check("`unterminated", [Invalid]);

  // The scanner drives the continuation after `}` itself.
  let mut lexer = Lexer::new("`a${b}c`");
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, LiteralTemplatePartString);
  assert_eq!(lex_next(&mut lexer, LexMode::SlashIsRegex).typ, Identifier);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, BraceClose);
  assert_eq!(
    lex_next(&mut lexer, LexMode::TemplateStrContinue).typ,
    LiteralTemplatePartStringEnd
  );
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, EOF);
}

#[test]
fn test_lex_regex() {
  let mut lexer = Lexer::new("/ab[c/]d/gi");
  let t = lex_next(&mut lexer, LexMode::SlashIsRegex);
  assert_eq!(t.typ, LiteralRegex);
  assert_eq!(t.loc.len(), 11);

  let mut lexer = Lexer::new("/ab/");
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(t.typ, Slash);
}

#[test]
fn test_lex_comments() {
  check("// only a comment", []);
  check("/* block */ a", [Identifier]);
  check("/* unterminated", [Invalid]);
}

#[test]
fn test_lex_line_terminator_tracking() {
  let mut lexer = Lexer::new("a\nb c");
  let a = lex_next(&mut lexer, LexMode::Standard);
  assert!(!a.preceded_by_line_terminator);
  let b = lex_next(&mut lexer, LexMode::Standard);
  assert!(b.preceded_by_line_terminator);
  let c = lex_next(&mut lexer, LexMode::Standard);
  assert!(!c.preceded_by_line_terminator);
}

#[test]
fn test_lex_import_statement() {
  check("import * as a from \"./a\";", [
    KeywordImport,
    Asterisk,
    KeywordAs,
    Identifier,
    KeywordFrom,
    LiteralString,
    Semicolon,
  ]);
  check("import('x')", [
    KeywordImport,
    ParenthesisOpen,
    LiteralString,
    ParenthesisClose,
  ]);
}

#[test]
fn test_lex_jsx_tag_mode() {
  let mut lexer = Lexer::new("data-value=\"a < b\"/>");
  let name = lex_next(&mut lexer, LexMode::JsxTag);
  assert_eq!(name.typ, Identifier);
  assert_eq!(name.loc.len(), "data-value".len());
  assert_eq!(lex_next(&mut lexer, LexMode::JsxTag).typ, Equals);
  assert_eq!(lex_next(&mut lexer, LexMode::JsxTag).typ, LiteralString);
  assert_eq!(lex_next(&mut lexer, LexMode::JsxTag).typ, Slash);
  assert_eq!(lex_next(&mut lexer, LexMode::JsxTag).typ, ChevronRight);
}

#[test]
fn test_lex_jsx_text_mode() {
  let mut lexer = Lexer::new("some // text <b>");
  let text = lex_next(&mut lexer, LexMode::JsxTextContent);
  assert_eq!(text.typ, JsxTextContent);
  assert_eq!(text.loc.len(), "some // text ".len());
}
