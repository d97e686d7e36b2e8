use super::DynImport;
use super::Frame;
use super::ModuleScanner;
use crate::error::ScanErrorType;
use crate::error::ScanResult;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::KEYWORDS_MAPPING;
use crate::loc::Loc;
use crate::output::Export;
use crate::output::Import;
use crate::token::Token;
use crate::token::TT;

/// Names allowed in import/export specifier positions: identifiers, any
/// keyword (`export { default as x }`), and string literals (arbitrary
/// module namespace identifiers).
fn is_export_name(typ: TT) -> bool {
  typ == TT::Identifier || typ == TT::LiteralString || KEYWORDS_MAPPING.contains_key(&typ)
}

/// Names allowed as local bindings.
fn is_binding_name(typ: TT) -> bool {
  typ == TT::Identifier || typ.is_contextual_keyword()
}

impl<'a> ModuleScanner<'a> {
  /// Dispatches an `import` keyword: dynamic call, `import.meta`, or a
  /// static declaration at the top level. `import` in any other position is
  /// left alone (it may be e.g. a method name).
  pub(super) fn scan_import(&mut self, kw: Token) -> ScanResult<()> {
    let cp = self.lexer.checkpoint();
    let t = self.lex_checked(LexMode::Standard)?;
    match t.typ {
      TT::ParenthesisOpen => {
        // Reserve the output slot now so nested dynamic imports keep source
        // order; the argument tokens flow through the main loop.
        let record = self.out.imports.len();
        self.out.imports.push(Import::default());
        self
          .stack
          .push(Frame::DynamicImport(DynImport::new(record, kw.loc.0)));
        self.set_prev(TT::ParenthesisOpen, t.loc, false);
        Ok(())
      }
      TT::Dot => {
        let meta = self.lex_checked(LexMode::Standard)?;
        if meta.typ != TT::Identifier || &self.lexer[meta.loc] != "meta" {
          return Err(
            meta
              .loc
              .error(ScanErrorType::ExpectedSyntax("`meta` after `import.`")),
          );
        }
        // `import.meta` is module-syntax evidence but never an import entry.
        self.out.has_module_syntax = true;
        if self.stack.is_empty() {
          self.out.facade = false;
        }
        self.set_prev(TT::Identifier, meta.loc, true);
        Ok(())
      }
      _ if self.stack.is_empty() => {
        if self.prev != TT::_Dummy
          && self.prev_ends_expr
          && !kw.preceded_by_line_terminator
          && !self.decorator_context
        {
          // The previous statement ran straight into an import declaration.
          return Err(kw.loc.error(ScanErrorType::ExpectedSemicolon));
        }
        self.decorator_context = false;
        self.scan_static_import(kw, t)
      }
      _ => {
        self.lexer.apply_checkpoint(cp);
        self.set_prev(TT::KeywordImport, kw.loc, false);
        Ok(())
      }
    }
  }

  /// `import defaultBinding, { named } from 'specifier' assert { .. };` and
  /// the bare side-effect form `import 'specifier'`.
  fn scan_static_import(&mut self, kw: Token, first: Token) -> ScanResult<()> {
    self.out.has_module_syntax = true;
    let spec = if first.typ == TT::LiteralString {
      first
    } else {
      let mut depth = 0usize;
      let mut t = first;
      loop {
        match t.typ {
          TT::BraceOpen => depth += 1,
          TT::BraceClose => {
            if depth == 0 {
              return Err(t.loc.error(ScanErrorType::ExpectedSyntax("import clause")));
            }
            depth -= 1;
          }
          TT::KeywordAs => {
            // The alias follows unconditionally; it may itself be a
            // contextual keyword such as `from`.
            self.lex_checked(LexMode::Standard)?;
          }
          TT::KeywordFrom if depth == 0 => {
            let s = self.lex_checked(LexMode::Standard)?;
            if s.typ != TT::LiteralString {
              return Err(
                s.loc
                  .error(ScanErrorType::ExpectedSyntax("import module specifier")),
              );
            }
            break s;
          }
          TT::Equals if depth == 0 => {
            // TypeScript `import A = require('x')`: module syntax, no
            // import record.
            return self.skip_to_statement_end();
          }
          TT::Semicolon => {
            return Err(
              t.loc
                .error(ScanErrorType::ExpectedSyntax("`from` clause of import statement")),
            );
          }
          TT::EOF => return Err(t.loc.error(ScanErrorType::UnexpectedEnd)),
          _ => {}
        }
        t = self.lex_checked(LexMode::Standard)?;
      }
    };
    let (n, s_off, e_off) = self.decode_string_token(&spec)?;
    let mut import = Import::default();
    import.n = Some(n);
    import.s = s_off as u32;
    import.e = e_off as u32;
    import.ss = kw.loc.0 as u32;
    import.se = spec.loc.1 as u32;
    self.scan_attributes_and_terminator(&mut import)?;
    self.out.imports.push(import);
    self.end_statement();
    Ok(())
  }

  /// Optional `assert { .. }` / `with { .. }` clause (no line terminator
  /// before the keyword) followed by an optional statement semicolon.
  fn scan_attributes_and_terminator(&mut self, import: &mut Import) -> ScanResult<()> {
    let cp = self.lexer.checkpoint();
    let t = lex_next(&mut self.lexer, LexMode::Standard);
    match t.typ {
      TT::KeywordAssert | TT::KeywordWith if !t.preceded_by_line_terminator => {
        let brace = lex_next(&mut self.lexer, LexMode::Standard);
        if brace.typ == TT::BraceOpen {
          import.a = brace.loc.0 as i32;
          let close = self.skip_balanced_braces()?;
          import.se = close.1 as u32;
          self.consume_optional_semicolon();
        } else {
          self.lexer.apply_checkpoint(cp);
        }
      }
      TT::Semicolon => {}
      _ => self.lexer.apply_checkpoint(cp),
    }
    Ok(())
  }

  /// Consumes a balanced `{ .. }` whose opening brace was already consumed;
  /// returns the location of the closing brace.
  fn skip_balanced_braces(&mut self) -> ScanResult<Loc> {
    let mut depth = 1usize;
    loop {
      let t = self.lex_checked(LexMode::Standard)?;
      match t.typ {
        TT::BraceOpen => depth += 1,
        TT::BraceClose => {
          depth -= 1;
          if depth == 0 {
            return Ok(t.loc);
          }
        }
        TT::EOF => return Err(t.loc.error(ScanErrorType::UnexpectedEnd)),
        _ => {}
      }
    }
  }

  fn skip_balanced_parens(&mut self) -> ScanResult<Loc> {
    let mut depth = 1usize;
    loop {
      let t = self.lex_checked(LexMode::Standard)?;
      match t.typ {
        TT::ParenthesisOpen | TT::QuestionDotParenthesisOpen => depth += 1,
        TT::ParenthesisClose => {
          depth -= 1;
          if depth == 0 {
            return Ok(t.loc);
          }
        }
        TT::EOF => return Err(t.loc.error(ScanErrorType::UnexpectedEnd)),
        _ => {}
      }
    }
  }

  fn consume_optional_semicolon(&mut self) {
    let cp = self.lexer.checkpoint();
    let t = lex_next(&mut self.lexer, LexMode::Standard);
    if t.typ != TT::Semicolon {
      self.lexer.apply_checkpoint(cp);
    }
  }

  /// Consumes the rest of a statement the scanner records nothing from
  /// (TypeScript `import A = ..` / `export = ..`), respecting nesting and
  /// automatic semicolon insertion.
  fn skip_to_statement_end(&mut self) -> ScanResult<()> {
    let mut depth = 0usize;
    loop {
      let cp = self.lexer.checkpoint();
      let t = self.lex_checked(LexMode::Standard)?;
      match t.typ {
        TT::EOF => {
          self.lexer.apply_checkpoint(cp);
          break;
        }
        TT::Semicolon if depth == 0 => break,
        TT::BraceOpen
        | TT::ParenthesisOpen
        | TT::BracketOpen
        | TT::QuestionDotParenthesisOpen
        | TT::QuestionDotBracketOpen
        | TT::LiteralTemplatePartString => depth += 1,
        TT::BraceClose | TT::ParenthesisClose | TT::BracketClose => {
          if depth == 0 {
            self.lexer.apply_checkpoint(cp);
            break;
          }
          depth -= 1;
        }
        _ if depth == 0 && t.preceded_by_line_terminator && !t.typ.continues_expression() => {
          self.lexer.apply_checkpoint(cp);
          break;
        }
        _ => {}
      }
    }
    self.end_statement();
    Ok(())
  }

  /// Dispatches the declaration or clause after a top-level `export`.
  pub(super) fn scan_export(&mut self, kw: Token) -> ScanResult<()> {
    if self.prev != TT::_Dummy
      && self.prev_ends_expr
      && !kw.preceded_by_line_terminator
      && !self.decorator_context
    {
      return Err(kw.loc.error(ScanErrorType::ExpectedSemicolon));
    }
    self.decorator_context = false;
    self.out.has_module_syntax = true;
    let mut t = self.lex_checked(LexMode::Standard)?;
    // Modifier prefixes ahead of the declaration proper.
    loop {
      match t.typ {
        TT::KeywordDeclare | TT::KeywordAbstract if self.dialect.ts() => {
          self.out.facade = false;
          t = self.lex_checked(LexMode::Standard)?;
        }
        TT::At => {
          // Decorators on an exported class.
          self.out.facade = false;
          t = self.skip_decorator()?;
        }
        _ => break,
      }
    }
    match t.typ {
      TT::KeywordDefault => self.scan_export_default(t),
      TT::BraceOpen => self.scan_export_list(kw),
      TT::Asterisk => self.scan_export_star(kw),
      TT::KeywordVar | TT::KeywordLet | TT::KeywordConst | TT::KeywordUsing => {
        self.scan_export_binding_decl(t)
      }
      TT::KeywordAsync | TT::KeywordFunction => self.scan_export_function(t),
      TT::KeywordClass => self.scan_export_class(t),
      TT::KeywordEnum | TT::KeywordInterface if self.dialect.ts() => self.scan_export_named_decl(t),
      TT::KeywordNamespace | TT::KeywordModule if self.dialect.ts() => {
        self.out.facade = false;
        self.set_prev(t.typ, t.loc, false);
        Ok(())
      }
      TT::KeywordType if self.dialect.ts() => {
        let cp = self.lexer.checkpoint();
        let t2 = self.lex_checked(LexMode::Standard)?;
        match t2.typ {
          // `export type { .. } [from ..]` / `export type * from ..`.
          TT::BraceOpen => self.scan_export_list(kw),
          TT::Asterisk => self.scan_export_star(kw),
          _ => {
            self.lexer.apply_checkpoint(cp);
            self.scan_export_named_decl(t)
          }
        }
      }
      // TypeScript `export = expr;`: module syntax, nothing recorded.
      TT::Equals if self.dialect.ts() => self.skip_to_statement_end(),
      _ => {
        self.out.facade = false;
        let ends = t.typ.ends_expression();
        self.set_prev(t.typ, t.loc, ends);
        Ok(())
      }
    }
  }

  fn scan_export_default(&mut self, def: Token) -> ScanResult<()> {
    self.out.facade = false;
    let mut export = Export::default();
    export.n = Some("default".to_string());
    export.s = def.loc.0 as u32;
    export.e = def.loc.1 as u32;

    let decl = 'decl: {
      let cp = self.lexer.checkpoint();
      let t = lex_next(&mut self.lexer, LexMode::Standard);
      match t.typ {
        TT::KeywordFunction => break 'decl Some(TT::KeywordFunction),
        TT::KeywordClass => break 'decl Some(TT::KeywordClass),
        TT::KeywordAsync => {
          let t2 = lex_next(&mut self.lexer, LexMode::Standard);
          if t2.typ == TT::KeywordFunction {
            break 'decl Some(TT::KeywordFunction);
          }
        }
        TT::KeywordAbstract if self.dialect.ts() => {
          let t2 = lex_next(&mut self.lexer, LexMode::Standard);
          if t2.typ == TT::KeywordClass {
            break 'decl Some(TT::KeywordClass);
          }
        }
        _ => {}
      }
      self.lexer.apply_checkpoint(cp);
      break 'decl None;
    };
    match decl {
      Some(TT::KeywordFunction) => {
        self.function_header = true;
        let cp = self.lexer.checkpoint();
        let mut name = self.lex_checked(LexMode::Standard)?;
        if name.typ == TT::Asterisk {
          name = self.lex_checked(LexMode::Standard)?;
        }
        if is_binding_name(name.typ) {
          export.ln = Some(self.lexer[name.loc].to_string());
          export.ls = name.loc.0 as i32;
          export.le = name.loc.1 as i32;
          self.set_prev(TT::Identifier, name.loc, true);
        } else {
          self.lexer.apply_checkpoint(cp);
          self.set_prev(TT::KeywordFunction, def.loc, false);
        }
      }
      Some(_) => {
        let cp = self.lexer.checkpoint();
        let name = self.lex_checked(LexMode::Standard)?;
        if is_binding_name(name.typ) {
          export.ln = Some(self.lexer[name.loc].to_string());
          export.ls = name.loc.0 as i32;
          export.le = name.loc.1 as i32;
          self.set_prev(TT::Identifier, name.loc, true);
        } else {
          self.lexer.apply_checkpoint(cp);
          self.set_prev(TT::KeywordClass, def.loc, false);
        }
      }
      None => {
        // Expression default; the main loop consumes it.
        self.set_prev(TT::KeywordDefault, def.loc, false);
      }
    }
    self.out.exports.push(export);
    Ok(())
  }

  /// `export { a, b as c, 'd' as e } [from 'specifier' [assert { .. }]]`.
  fn scan_export_list(&mut self, kw: Token) -> ScanResult<()> {
    let mut entries: Vec<(Token, Token)> = Vec::new();
    loop {
      let t = self.lex_checked(LexMode::Standard)?;
      match t.typ {
        TT::BraceClose => break,
        TT::Comma => continue,
        TT::EOF => return Err(t.loc.error(ScanErrorType::UnexpectedEnd)),
        typ if is_export_name(typ) => {
          let mut local = t;
          // TypeScript inline type specifier: `export { type A as B }`.
          // A lone `type as x` entry is a binding named `type`, not a
          // specifier prefix.
          if typ == TT::KeywordType && self.dialect.ts() {
            let cp = self.lexer.checkpoint();
            let t2 = self.lex_checked(LexMode::Standard)?;
            if is_export_name(t2.typ) && t2.typ != TT::KeywordAs {
              local = t2;
            } else {
              self.lexer.apply_checkpoint(cp);
            }
          }
          let mut exported = local.clone();
          let cp = self.lexer.checkpoint();
          let t2 = self.lex_checked(LexMode::Standard)?;
          if t2.typ == TT::KeywordAs {
            let alias = self.lex_checked(LexMode::Standard)?;
            if !is_export_name(alias.typ) {
              return Err(alias.loc.error(ScanErrorType::ExpectedSyntax("export alias")));
            }
            exported = alias;
          } else {
            self.lexer.apply_checkpoint(cp);
          }
          entries.push((local, exported));
        }
        _ => return Err(t.loc.error(ScanErrorType::ExpectedSyntax("export specifier"))),
      }
    }
    let cp = self.lexer.checkpoint();
    let t = lex_next(&mut self.lexer, LexMode::Standard);
    if t.typ == TT::KeywordFrom {
      let spec = self.lex_checked(LexMode::Standard)?;
      if spec.typ != TT::LiteralString {
        return Err(
          spec
            .loc
            .error(ScanErrorType::ExpectedSyntax("module specifier after `from`")),
        );
      }
      let (n, s_off, e_off) = self.decode_string_token(&spec)?;
      let mut import = Import::default();
      import.n = Some(n);
      import.s = s_off as u32;
      import.e = e_off as u32;
      import.ss = kw.loc.0 as u32;
      import.se = spec.loc.1 as u32;
      self.scan_attributes_and_terminator(&mut import)?;
      self.out.imports.push(import);
      for (_, exported) in entries {
        let (n, s, e) = self.export_name(&exported)?;
        let mut export = Export::default();
        export.n = Some(n);
        export.s = s as u32;
        export.e = e as u32;
        self.out.exports.push(export);
      }
    } else {
      if t.typ != TT::Semicolon {
        self.lexer.apply_checkpoint(cp);
      }
      for (local, exported) in entries {
        let (n, s, e) = self.export_name(&exported)?;
        let (ln, ls, le) = self.export_name(&local)?;
        let mut export = Export::default();
        export.n = Some(n);
        export.s = s as u32;
        export.e = e as u32;
        export.ln = Some(ln);
        export.ls = ls as i32;
        export.le = le as i32;
        self.out.exports.push(export);
      }
    }
    self.end_statement();
    Ok(())
  }

  /// `export * from 'specifier'` and `export * as ns from 'specifier'`.
  fn scan_export_star(&mut self, kw: Token) -> ScanResult<()> {
    let cp = self.lexer.checkpoint();
    let t = self.lex_checked(LexMode::Standard)?;
    let exported = if t.typ == TT::KeywordAs {
      let name = self.lex_checked(LexMode::Standard)?;
      if !is_export_name(name.typ) {
        return Err(name.loc.error(ScanErrorType::ExpectedSyntax("export alias")));
      }
      Some(name)
    } else {
      self.lexer.apply_checkpoint(cp);
      None
    };
    let from = self.lex_checked(LexMode::Standard)?;
    if from.typ != TT::KeywordFrom {
      return Err(from.loc.error(ScanErrorType::ExpectedSyntax("`from` after `export *`")));
    }
    let spec = self.lex_checked(LexMode::Standard)?;
    if spec.typ != TT::LiteralString {
      return Err(
        spec
          .loc
          .error(ScanErrorType::ExpectedSyntax("module specifier after `from`")),
      );
    }
    let (n, s_off, e_off) = self.decode_string_token(&spec)?;
    let mut import = Import::default();
    import.n = Some(n);
    import.s = s_off as u32;
    import.e = e_off as u32;
    import.ss = kw.loc.0 as u32;
    import.se = spec.loc.1 as u32;
    self.scan_attributes_and_terminator(&mut import)?;
    self.out.imports.push(import);
    if let Some(name) = exported {
      let (n, s, e) = self.export_name(&name)?;
      let mut export = Export::default();
      export.n = Some(n);
      export.s = s as u32;
      export.e = e as u32;
      self.out.exports.push(export);
    }
    self.end_statement();
    Ok(())
  }

  /// `export var|let|const|using binding = ..`; records the first binding
  /// when it is a plain identifier (destructuring patterns record nothing).
  fn scan_export_binding_decl(&mut self, decl: Token) -> ScanResult<()> {
    if decl.typ == TT::KeywordConst && self.dialect.ts() {
      let cp = self.lexer.checkpoint();
      let t = self.lex_checked(LexMode::Standard)?;
      if t.typ == TT::KeywordEnum {
        return self.scan_export_named_decl(t);
      }
      self.lexer.apply_checkpoint(cp);
    }
    self.out.facade = false;
    let cp = self.lexer.checkpoint();
    let name = self.lex_checked(LexMode::Standard)?;
    if is_binding_name(name.typ) {
      self.push_named_export(&name);
      self.set_prev(TT::Identifier, name.loc, true);
    } else {
      self.lexer.apply_checkpoint(cp);
      self.set_prev(decl.typ, decl.loc, false);
    }
    Ok(())
  }

  fn scan_export_function(&mut self, first: Token) -> ScanResult<()> {
    self.out.facade = false;
    let mut kw = first;
    if kw.typ == TT::KeywordAsync {
      kw = self.lex_checked(LexMode::Standard)?;
      if kw.typ != TT::KeywordFunction {
        // `export async` without `function`; nothing to record.
        let ends = kw.typ.ends_expression();
        self.set_prev(kw.typ, kw.loc, ends);
        return Ok(());
      }
    }
    self.function_header = true;
    let cp = self.lexer.checkpoint();
    let mut name = self.lex_checked(LexMode::Standard)?;
    if name.typ == TT::Asterisk {
      name = self.lex_checked(LexMode::Standard)?;
    }
    if is_binding_name(name.typ) {
      self.push_named_export(&name);
      self.set_prev(TT::Identifier, name.loc, true);
    } else {
      self.lexer.apply_checkpoint(cp);
      self.set_prev(TT::KeywordFunction, kw.loc, false);
    }
    Ok(())
  }

  fn scan_export_class(&mut self, class: Token) -> ScanResult<()> {
    self.out.facade = false;
    let cp = self.lexer.checkpoint();
    let name = self.lex_checked(LexMode::Standard)?;
    if is_binding_name(name.typ) {
      self.push_named_export(&name);
      self.set_prev(TT::Identifier, name.loc, true);
    } else {
      self.lexer.apply_checkpoint(cp);
      self.set_prev(TT::KeywordClass, class.loc, false);
    }
    Ok(())
  }

  /// TypeScript `export enum|interface|type Name ..`.
  fn scan_export_named_decl(&mut self, decl: Token) -> ScanResult<()> {
    self.out.facade = false;
    let cp = self.lexer.checkpoint();
    let name = self.lex_checked(LexMode::Standard)?;
    if is_binding_name(name.typ) {
      self.push_named_export(&name);
      self.set_prev(TT::Identifier, name.loc, true);
    } else {
      self.lexer.apply_checkpoint(cp);
      self.set_prev(decl.typ, decl.loc, false);
    }
    Ok(())
  }

  fn push_named_export(&mut self, name: &Token) {
    let text = self.lexer[name.loc].to_string();
    let mut export = Export::default();
    export.n = Some(text.clone());
    export.s = name.loc.0 as u32;
    export.e = name.loc.1 as u32;
    export.ln = Some(text);
    export.ls = name.loc.0 as i32;
    export.le = name.loc.1 as i32;
    self.out.exports.push(export);
  }

  /// Decoded text plus source range of an exported name. String-literal
  /// names keep their quotes in the range while the text is decoded.
  fn export_name(&self, tok: &Token) -> ScanResult<(String, usize, usize)> {
    if tok.typ == TT::LiteralString {
      let (n, _, _) = self.decode_string_token(tok)?;
      Ok((n, tok.loc.0, tok.loc.1))
    } else {
      Ok((self.lexer[tok.loc].to_string(), tok.loc.0, tok.loc.1))
    }
  }

  /// Consumes a decorator after its `@`: a dotted name chain with optional
  /// call arguments. Returns the first token after the decorator.
  fn skip_decorator(&mut self) -> ScanResult<Token> {
    let name = self.lex_checked(LexMode::Standard)?;
    if !is_binding_name(name.typ) {
      return Err(name.loc.error(ScanErrorType::ExpectedSyntax("decorator name")));
    }
    loop {
      let t = self.lex_checked(LexMode::Standard)?;
      match t.typ {
        TT::Dot => {
          self.lex_checked(LexMode::Standard)?;
        }
        TT::ParenthesisOpen => {
          self.skip_balanced_parens()?;
        }
        _ => return Ok(t),
      }
    }
  }
}
