use crate::error::ScanError;
use crate::error::ScanErrorType;
use crate::error::ScanResult;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::output::Output;
use crate::token::Token;
use crate::token::TT;
use std::iter::Peekable;
use std::str::CharIndices;

mod import_export;
mod jsx;
#[cfg(test)]
mod tests;

/// Source dialect, selected once from the file's logical extension and
/// threaded through the state machine as a plain flag pair.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Dialect {
  Js,
  Jsx,
  Ts,
  Tsx,
  Dts,
}

impl Dialect {
  pub fn from_path(file_path: &str) -> Dialect {
    let lower = file_path.to_ascii_lowercase();
    if lower.ends_with(".d.ts") || lower.ends_with(".d.mts") || lower.ends_with(".d.cts") {
      return Dialect::Dts;
    }
    match lower.rsplit('.').next() {
      Some("jsx") => Dialect::Jsx,
      Some("tsx") => Dialect::Tsx,
      Some("ts") | Some("mts") | Some("cts") => Dialect::Ts,
      _ => Dialect::Js,
    }
  }

  pub fn jsx(self) -> bool {
    matches!(self, Dialect::Jsx | Dialect::Tsx)
  }

  pub fn ts(self) -> bool {
    matches!(self, Dialect::Ts | Dialect::Tsx | Dialect::Dts)
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ParenKind {
  // `(` of a call or parenthesised expression; the matching `)` ends an
  // expression.
  Expr,
  // `(` after `if`/`for`/`while`/`switch`/`catch`/`with`; the matching `)`
  // does not end an expression, so a following `/` starts a regex and a
  // following `{` is a block.
  Control,
  // Function parameter list.
  Params,
}

#[derive(Debug)]
struct DynImport {
  // Index of the reserved slot in `Output::imports`; reserved at `import(`
  // so nested dynamic imports keep source order.
  record: usize,
  // Offset of the `import` keyword.
  keyword: usize,
  arg_start: Option<usize>,
  // Significant tokens seen at call depth within the current argument.
  arg_tokens: usize,
  // Set while the first argument looks like a single plain string literal.
  string_arg: Option<(String, usize, usize)>,
  arg_index: usize,
  attributes: i32,
  // Resolved (n, s, e) once the first argument settles.
  spec: Option<(Option<String>, usize, usize)>,
}

impl DynImport {
  fn new(record: usize, keyword: usize) -> DynImport {
    DynImport {
      record,
      keyword,
      arg_start: None,
      arg_tokens: 0,
      string_arg: None,
      arg_index: 0,
      attributes: -1,
      spec: None,
    }
  }

  /// Resolves the specifier fields once the first argument is complete.
  /// Returns whether the argument was something other than a single plain
  /// string literal, which falsifies the facade flag.
  fn settle_specifier(&mut self, prev_end: usize) -> bool {
    if self.spec.is_some() {
      return false;
    }
    if self.arg_tokens == 1 {
      if let Some((n, s, e)) = self.string_arg.take() {
        self.spec = Some((Some(n), s, e));
        return false;
      }
    }
    let start = self.arg_start.unwrap_or(prev_end);
    self.spec = Some((None, start, prev_end));
    true
  }
}

#[derive(Debug)]
struct JsxTagFrame {
  // Depth of `<` type-argument nesting inside the tag.
  chevrons: usize,
  // Significant tokens seen since the opening `<`.
  tokens: usize,
  from_children: bool,
}

#[derive(Debug)]
enum Frame {
  Block,
  Object,
  Paren(ParenKind),
  Bracket,
  TemplateExpr,
  DynamicImport(DynImport),
  JsxTag(JsxTagFrame),
  JsxChildren,
  JsxExpr,
}

/// Single forward pass over one source text. Tracks only the context needed
/// to find statement boundaries and literal delimiters: a delimiter stack,
/// the previous significant token, and a handful of flags. Never builds an
/// AST.
pub struct ModuleScanner<'a> {
  lexer: Lexer<'a>,
  dialect: Dialect,
  stack: Vec<Frame>,
  prev: TT,
  prev_loc: Loc,
  prev_ends_expr: bool,
  // The next token continues a template literal after its `${expr}` region.
  template_continue: bool,
  // A `function` keyword was seen and its parameter list has not opened yet.
  function_header: bool,
  // A top-level dynamic import call just closed; the next token decides
  // whether the whole statement was that call.
  pending_import_stmt: bool,
  // Inside a top-level decorator chain ahead of an (exported) class; the
  // missing-semicolon guard must stand down until the declaration starts.
  decorator_context: bool,
  out: Output,
}

pub fn scan_source(source_text: &str, file_path: &str) -> ScanResult<Output> {
  ModuleScanner::new(source_text, Dialect::from_path(file_path)).run()
}

impl<'a> ModuleScanner<'a> {
  pub fn new(source_text: &'a str, dialect: Dialect) -> ModuleScanner<'a> {
    let mut lexer = Lexer::new(source_text);
    // A hashbang line is not part of any statement.
    if source_text.starts_with("#!") {
      let end = source_text
        .find('\n')
        .map(|i| i + 1)
        .unwrap_or(source_text.len());
      lexer.set_next(end);
    }
    ModuleScanner {
      lexer,
      dialect,
      stack: Vec::new(),
      prev: TT::_Dummy,
      prev_loc: Loc(0, 0),
      prev_ends_expr: false,
      template_continue: false,
      function_header: false,
      pending_import_stmt: false,
      decorator_context: false,
      out: Output {
        imports: Vec::new(),
        exports: Vec::new(),
        facade: true,
        has_module_syntax: false,
      },
    }
  }

  pub fn run(mut self) -> ScanResult<Output> {
    loop {
      if matches!(self.stack.last(), Some(Frame::JsxChildren)) {
        self.jsx_children_step()?;
        continue;
      }
      let mode = self.next_mode();
      self.template_continue = false;
      let tok = lex_next(&mut self.lexer, mode);
      match tok.typ {
        TT::Invalid => return Err(self.invalid_token_error(&tok, mode)),
        TT::EOF => return self.finish(),
        _ => {}
      }
      if matches!(self.stack.last(), Some(Frame::JsxTag(_))) {
        self.jsx_tag_step(tok)?;
        continue;
      }
      if self.stack.is_empty() {
        self.classify_top_level(&tok)?;
      } else if matches!(self.stack.last(), Some(Frame::DynamicImport(_))) {
        if self.dynamic_import_step(&tok)? {
          continue;
        }
      }
      self.step(tok)?;
    }
  }

  fn next_mode(&self) -> LexMode {
    if self.template_continue {
      LexMode::TemplateStrContinue
    } else if matches!(self.stack.last(), Some(Frame::JsxTag(_))) {
      LexMode::JsxTag
    } else if self.prev_ends_expr {
      LexMode::Standard
    } else {
      LexMode::SlashIsRegex
    }
  }

  fn set_prev(&mut self, typ: TT, loc: Loc, ends_expr: bool) {
    self.prev = typ;
    self.prev_loc = loc;
    self.prev_ends_expr = ends_expr;
  }

  /// Marks the end of a fully consumed import/export statement so regex,
  /// brace and adjacency disambiguation treat what follows as a fresh
  /// statement.
  fn end_statement(&mut self) {
    let at = self.lexer.next();
    self.set_prev(TT::Semicolon, Loc(at, at), false);
  }

  fn lex_checked(&mut self, mode: LexMode) -> ScanResult<Token> {
    let tok = lex_next(&mut self.lexer, mode);
    if tok.typ == TT::Invalid {
      return Err(self.invalid_token_error(&tok, mode));
    }
    Ok(tok)
  }

  fn invalid_token_error(&self, tok: &Token, mode: LexMode) -> ScanError {
    let text = &self.lexer[tok.loc];
    let typ = if mode == LexMode::TemplateStrContinue {
      ScanErrorType::UnterminatedTemplate
    } else if text.starts_with("/*") {
      ScanErrorType::UnterminatedComment
    } else if text.starts_with('\'') || text.starts_with('"') {
      ScanErrorType::UnterminatedString
    } else if text.starts_with('`') {
      ScanErrorType::UnterminatedTemplate
    } else if text.starts_with('/') {
      ScanErrorType::UnterminatedRegex
    } else if text.starts_with('\\') {
      ScanErrorType::InvalidCharacterEscape
    } else {
      ScanErrorType::UnexpectedToken
    };
    ScanError::new(typ, tok.loc.0)
  }

  fn finish(self) -> ScanResult<Output> {
    if let Some(top) = self.stack.last() {
      let typ = match top {
        Frame::TemplateExpr => ScanErrorType::UnterminatedTemplate,
        Frame::JsxTag(_) | Frame::JsxChildren | Frame::JsxExpr => ScanErrorType::UnterminatedJsx,
        _ => ScanErrorType::UnexpectedEnd,
      };
      return Err(ScanError::new(typ, self.lexer.next()));
    }
    Ok(self.out)
  }

  /// Bookkeeping for every significant token seen at the top level: facade
  /// falsification, the tail of a dynamic-import statement, and detection of
  /// a statement that ran into the next one without any possible implicit
  /// semicolon.
  fn classify_top_level(&mut self, tok: &Token) -> ScanResult<()> {
    if self.pending_import_stmt {
      self.pending_import_stmt = false;
      if tok.typ == TT::Semicolon {
        return Ok(());
      }
      if tok.typ.continues_expression() {
        // The dynamic import was a subexpression of a larger statement.
        self.out.facade = false;
        return Ok(());
      }
      // Otherwise a new statement begins here; classify it below.
    }
    match tok.typ {
      TT::KeywordImport | TT::KeywordExport if !matches!(self.prev, TT::Dot | TT::QuestionDot) => {}
      _ => self.out.facade = false,
    }
    match tok.typ {
      TT::At => self.decorator_context = true,
      TT::Semicolon | TT::KeywordClass => self.decorator_context = false,
      _ => {}
    }
    if adjacency_requires_semicolon(self.prev, tok) {
      return Err(tok.loc.error(ScanErrorType::ExpectedSemicolon));
    }
    Ok(())
  }

  /// Tracks the argument list of a dynamic import at call depth. Returns
  /// true when the token was consumed entirely (argument separators and the
  /// closing parenthesis); other tokens still go through the generic step so
  /// nested delimiters are tracked.
  fn dynamic_import_step(&mut self, tok: &Token) -> ScanResult<bool> {
    match tok.typ {
      TT::ParenthesisClose => {
        let Some(Frame::DynamicImport(frame)) = self.stack.pop() else {
          unreachable!();
        };
        self.finish_dynamic_import(frame, tok);
        if self.stack.is_empty() {
          self.pending_import_stmt = true;
        }
        self.set_prev(TT::ParenthesisClose, tok.loc, true);
        Ok(true)
      }
      TT::Comma => {
        let prev_end = self.prev_loc.1;
        let Some(Frame::DynamicImport(frame)) = self.stack.last_mut() else {
          unreachable!();
        };
        let falsify = if frame.arg_index == 0 {
          frame.settle_specifier(prev_end)
        } else {
          false
        };
        frame.arg_index += 1;
        frame.arg_tokens = 0;
        if falsify {
          self.out.facade = false;
        }
        self.set_prev(TT::Comma, tok.loc, false);
        Ok(true)
      }
      _ => {
        let string_arg = if tok.typ == TT::LiteralString {
          Some(self.decode_string_token(tok)?)
        } else {
          None
        };
        let mut falsify = false;
        let Some(Frame::DynamicImport(frame)) = self.stack.last_mut() else {
          unreachable!();
        };
        if frame.arg_index == 0 {
          if frame.arg_tokens == 0 {
            frame.arg_start = Some(tok.loc.0);
            frame.string_arg = string_arg;
          }
        } else if frame.arg_tokens == 0 {
          // A real extra argument beyond the specifier.
          falsify = true;
          if frame.arg_index == 1 && tok.typ == TT::BraceOpen {
            frame.attributes = tok.loc.0 as i32;
          }
        }
        frame.arg_tokens += 1;
        if falsify {
          self.out.facade = false;
        }
        Ok(false)
      }
    }
  }

  fn finish_dynamic_import(&mut self, mut frame: DynImport, close: &Token) {
    let falsify = if frame.arg_index == 0 {
      frame.settle_specifier(self.prev_loc.1)
    } else {
      false
    };
    let (n, s, e) = frame.spec.take().unwrap_or((None, close.loc.0, close.loc.0));
    let import = &mut self.out.imports[frame.record];
    import.n = n;
    import.s = s as u32;
    import.e = e as u32;
    import.ss = frame.keyword as u32;
    import.se = close.loc.1 as u32;
    import.d = frame.keyword as i32;
    import.a = frame.attributes;
    if falsify {
      self.out.facade = false;
    }
  }

  fn step(&mut self, tok: Token) -> ScanResult<()> {
    match tok.typ {
      TT::KeywordImport if !matches!(self.prev, TT::Dot | TT::QuestionDot) => self.scan_import(tok),
      TT::KeywordExport if self.stack.is_empty() && !matches!(self.prev, TT::Dot | TT::QuestionDot) => {
        self.scan_export(tok)
      }
      TT::BraceOpen => {
        let frame = if self.brace_is_object() {
          Frame::Object
        } else {
          Frame::Block
        };
        self.stack.push(frame);
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      TT::BraceClose => self.close_brace(&tok),
      TT::ParenthesisOpen | TT::QuestionDotParenthesisOpen => {
        let kind = if self.function_header {
          ParenKind::Params
        } else if matches!(
          self.prev,
          TT::KeywordIf
            | TT::KeywordFor
            | TT::KeywordWhile
            | TT::KeywordSwitch
            | TT::KeywordCatch
            | TT::KeywordWith
        ) {
          ParenKind::Control
        } else {
          ParenKind::Expr
        };
        self.function_header = false;
        self.stack.push(Frame::Paren(kind));
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      TT::ParenthesisClose => match self.stack.pop() {
        Some(Frame::Paren(kind)) => {
          self.set_prev(tok.typ, tok.loc, kind == ParenKind::Expr);
          Ok(())
        }
        _ => Err(tok.loc.error(ScanErrorType::UnexpectedClosingDelimiter)),
      },
      TT::BracketOpen | TT::QuestionDotBracketOpen => {
        self.stack.push(Frame::Bracket);
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      TT::BracketClose => match self.stack.pop() {
        Some(Frame::Bracket) => {
          self.set_prev(tok.typ, tok.loc, true);
          Ok(())
        }
        _ => Err(tok.loc.error(ScanErrorType::UnexpectedClosingDelimiter)),
      },
      TT::LiteralTemplatePartString => {
        self.stack.push(Frame::TemplateExpr);
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      TT::KeywordFunction => {
        self.function_header = true;
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      TT::ChevronLeft if self.dialect.jsx() && !self.prev_ends_expr => {
        self.stack.push(Frame::JsxTag(JsxTagFrame {
          chevrons: 0,
          tokens: 0,
          from_children: false,
        }));
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      _ => {
        let ends = tok.typ.ends_expression();
        self.set_prev(tok.typ, tok.loc, ends);
        Ok(())
      }
    }
  }

  fn close_brace(&mut self, tok: &Token) -> ScanResult<()> {
    match self.stack.pop() {
      Some(Frame::Object) => {
        self.set_prev(tok.typ, tok.loc, true);
        Ok(())
      }
      Some(Frame::Block) => {
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      Some(Frame::TemplateExpr) => {
        self.template_continue = true;
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      Some(Frame::JsxExpr) => {
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      _ => Err(tok.loc.error(ScanErrorType::UnexpectedClosingDelimiter)),
    }
  }

  /// `{` in expression position starts an object literal; elsewhere a block.
  /// The distinction matters on the matching `}`: an object literal ends an
  /// expression (so `/` after it divides), a block does not (so `/` starts a
  /// regex).
  fn brace_is_object(&self) -> bool {
    match self.prev {
      TT::_Dummy
      | TT::Semicolon
      | TT::BraceClose
      | TT::ParenthesisClose
      | TT::EqualsChevronRight
      | TT::KeywordDo
      | TT::KeywordElse
      | TT::KeywordTry
      | TT::KeywordFinally => false,
      TT::BraceOpen => matches!(self.stack.last(), Some(Frame::Object) | Some(Frame::JsxExpr)),
      TT::Colon => matches!(self.stack.last(), Some(Frame::Object)),
      _ => !self.prev_ends_expr,
    }
  }

  fn decode_string_token(&self, tok: &Token) -> ScanResult<(String, usize, usize)> {
    let inner = Loc(tok.loc.0 + 1, tok.loc.1 - 1);
    let decoded = decode_string_literal(&self.lexer[inner], inner.0)?;
    Ok((decoded, inner.0, inner.1))
  }
}

fn adjacency_requires_semicolon(prev: TT, tok: &Token) -> bool {
  if tok.preceded_by_line_terminator {
    return false;
  }
  // Two adjacent value tokens with no operator and no possible implicit
  // semicolon between them, e.g. `var a number = 1`.
  matches!(
    prev,
    TT::Identifier | TT::LiteralBigInt | TT::LiteralNumber | TT::LiteralString
  ) && matches!(
    tok.typ,
    TT::Identifier | TT::LiteralBigInt | TT::LiteralNumber | TT::LiteralString
  )
}

fn hex_value(c: char) -> Option<u32> {
  c.to_digit(16)
}

fn read_hex(chars: &mut Peekable<CharIndices<'_>>, n: usize) -> Option<u32> {
  let mut value = 0u32;
  for _ in 0..n {
    let (_, c) = chars.next()?;
    value = value * 16 + hex_value(c)?;
  }
  Some(value)
}

/// Decodes the contents of a string literal (quotes already stripped).
/// `base` is the byte offset of `raw` within the source, used for fault
/// positions. Follows JS string semantics: escape sequences including
/// `\uXXXX`, `\u{...}` and surrogate pairs, line continuations, and identity
/// escapes for everything else.
fn decode_string_literal(raw: &str, base: usize) -> ScanResult<String> {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.char_indices().peekable();
  // Pending high surrogate from a previous `\uXXXX` escape.
  let mut pending: Option<u32> = None;
  while let Some((i, c)) = chars.next() {
    let fault = ScanError::new(ScanErrorType::InvalidCharacterEscape, base + i);
    if c != '\\' {
      if pending.is_some() {
        return Err(fault);
      }
      out.push(c);
      continue;
    }
    let Some((_, esc)) = chars.next() else {
      return Err(fault);
    };
    let unit: Option<u32> = match esc {
      'n' => {
        out.push('\n');
        None
      }
      't' => {
        out.push('\t');
        None
      }
      'r' => {
        out.push('\r');
        None
      }
      'b' => {
        out.push('\u{8}');
        None
      }
      'f' => {
        out.push('\u{c}');
        None
      }
      'v' => {
        out.push('\u{b}');
        None
      }
      '0' if !matches!(chars.peek(), Some((_, '0'..='9'))) => {
        out.push('\0');
        None
      }
      'x' => Some(read_hex(&mut chars, 2).ok_or(fault.clone())?),
      'u' => {
        if matches!(chars.peek(), Some((_, '{'))) {
          chars.next();
          let mut value = 0u32;
          let mut digits = 0;
          loop {
            match chars.next() {
              Some((_, '}')) if digits > 0 => break,
              Some((_, c)) => {
                let digit = hex_value(c).ok_or_else(|| fault.clone())?;
                value = value
                  .checked_mul(16)
                  .and_then(|v| v.checked_add(digit))
                  .ok_or_else(|| fault.clone())?;
                digits += 1;
              }
              None => return Err(fault),
            }
          }
          if value > 0x10FFFF {
            return Err(fault);
          }
          Some(value)
        } else {
          Some(read_hex(&mut chars, 4).ok_or(fault.clone())?)
        }
      }
      '\r' => {
        // Line continuation; CRLF counts as one terminator.
        if matches!(chars.peek(), Some((_, '\n'))) {
          chars.next();
        }
        None
      }
      '\n' | '\u{2028}' | '\u{2029}' => None,
      other => {
        out.push(other);
        None
      }
    };
    match unit {
      None => {
        if pending.is_some() {
          return Err(fault);
        }
      }
      Some(u) if (0xD800..=0xDBFF).contains(&u) => {
        if pending.is_some() {
          return Err(fault);
        }
        pending = Some(u);
      }
      Some(u) if (0xDC00..=0xDFFF).contains(&u) => {
        let Some(hi) = pending.take() else {
          return Err(fault);
        };
        let combined = 0x10000 + ((hi - 0xD800) << 10) + (u - 0xDC00);
        out.push(char::from_u32(combined).ok_or(fault)?);
      }
      Some(u) => {
        if pending.is_some() {
          return Err(fault);
        }
        out.push(char::from_u32(u).ok_or(fault)?);
      }
    }
  }
  if pending.is_some() {
    return Err(ScanError::new(
      ScanErrorType::InvalidCharacterEscape,
      base + raw.len(),
    ));
  }
  Ok(out)
}
