use super::Frame;
use super::JsxTagFrame;
use super::ModuleScanner;
use crate::error::ScanErrorType;
use crate::error::ScanResult;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::KEYWORDS_MAPPING;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

// JSX is skipped, never extracted from directly; expression containers
// (`{..}`) re-enter the normal state machine, which is how dynamic imports
// inside JSX are still found.
impl<'a> ModuleScanner<'a> {
  /// One step inside element children: a text run, then whatever follows it
  /// (`{` container, `</` closing tag, `<` nested element).
  pub(super) fn jsx_children_step(&mut self) -> ScanResult<()> {
    let _text = lex_next(&mut self.lexer, LexMode::JsxTextContent);
    let t = lex_next(&mut self.lexer, LexMode::Standard);
    match t.typ {
      TT::ChevronLeftSlash => self.jsx_closing_tag(),
      TT::ChevronLeft => {
        self.stack.push(Frame::JsxTag(JsxTagFrame {
          chevrons: 0,
          tokens: 0,
          from_children: true,
        }));
        Ok(())
      }
      TT::BraceOpen => {
        self.stack.push(Frame::JsxExpr);
        self.set_prev(TT::BraceOpen, t.loc, false);
        Ok(())
      }
      TT::EOF => Err(t.loc.error(ScanErrorType::UnterminatedJsx)),
      TT::Invalid => Err(self.invalid_token_error(&t, LexMode::Standard)),
      _ => Err(t.loc.error(ScanErrorType::UnterminatedJsx)),
    }
  }

  /// `</name>` (or `</>`): consumes through `>` and completes the element.
  fn jsx_closing_tag(&mut self) -> ScanResult<()> {
    loop {
      let t = lex_next(&mut self.lexer, LexMode::JsxTag);
      match t.typ {
        TT::ChevronRight => break,
        TT::Identifier | TT::Dot | TT::Colon => {}
        TT::EOF => return Err(t.loc.error(ScanErrorType::UnterminatedJsx)),
        TT::Invalid => return Err(self.invalid_token_error(&t, LexMode::JsxTag)),
        typ if KEYWORDS_MAPPING.contains_key(&typ) => {}
        _ => return Err(t.loc.error(ScanErrorType::ExpectedSyntax("`>` to close JSX tag"))),
      }
    }
    self.stack.pop();
    self.jsx_element_done();
    Ok(())
  }

  /// One token inside an opening tag (attributes, type arguments, the
  /// closing `>` or `/>`).
  pub(super) fn jsx_tag_step(&mut self, tok: Token) -> ScanResult<()> {
    let (tokens, from_children, chevrons) = {
      let Some(Frame::JsxTag(tag)) = self.stack.last_mut() else {
        unreachable!();
      };
      tag.tokens += 1;
      (tag.tokens, tag.from_children, tag.chevrons)
    };
    match tok.typ {
      // In TSX, `<T,`, `<T =` and `<T extends` open a type-parameter list,
      // not an element; back out and treat the consumed tokens as plain
      // expression tokens.
      TT::Comma | TT::Equals | TT::KeywordExtends
        if self.dialect.ts() && !from_children && tokens == 2 && chevrons == 0 =>
      {
        self.stack.pop();
        self.set_prev(tok.typ, tok.loc, false);
        Ok(())
      }
      TT::ChevronRight => {
        if chevrons > 0 {
          self.jsx_tag_mut().chevrons -= 1;
        } else {
          self.jsx_open_tag_done();
        }
        Ok(())
      }
      TT::ChevronRightChevronRight => {
        // `>>` closing nested type arguments, possibly ending the tag too.
        if chevrons >= 2 {
          self.jsx_tag_mut().chevrons -= 2;
        } else {
          self.jsx_tag_mut().chevrons = 0;
          self.jsx_open_tag_done();
        }
        Ok(())
      }
      TT::ChevronLeft => {
        self.jsx_tag_mut().chevrons += 1;
        Ok(())
      }
      TT::Slash => {
        let t = lex_next(&mut self.lexer, LexMode::JsxTag);
        if t.typ != TT::ChevronRight {
          return Err(t.loc.error(ScanErrorType::ExpectedSyntax("`>` after `/` in JSX tag")));
        }
        self.stack.pop();
        self.jsx_element_done();
        Ok(())
      }
      TT::BraceOpen => {
        self.stack.push(Frame::JsxExpr);
        self.set_prev(TT::BraceOpen, tok.loc, false);
        Ok(())
      }
      // Attribute and tag-name tokens: identifiers, member/namespace
      // separators, attribute strings, everything else in type arguments.
      _ => Ok(()),
    }
  }

  fn jsx_tag_mut(&mut self) -> &mut JsxTagFrame {
    let Some(Frame::JsxTag(tag)) = self.stack.last_mut() else {
      unreachable!();
    };
    tag
  }

  /// The opening tag ended with a bare `>`; switch to children.
  fn jsx_open_tag_done(&mut self) {
    self.stack.pop();
    self.stack.push(Frame::JsxChildren);
  }

  /// A whole element (or fragment) ended. When it was the outermost JSX in
  /// an expression, what follows sees it as a completed operand.
  pub(super) fn jsx_element_done(&mut self) {
    if !matches!(
      self.stack.last(),
      Some(Frame::JsxTag(_)) | Some(Frame::JsxChildren)
    ) {
      let at = self.lexer.next();
      self.set_prev(TT::Identifier, Loc(at.saturating_sub(1), at), true);
    }
  }
}
