use crate::loc::Loc;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Used to represent the absence of a previous token without having to use
  // `Option` everywhere.
  _Dummy,
  // Special token used to represent the end of the source code.
  EOF,
  // Special token used to represent invalid source code. Easier than having
  // to propagate errors from the lexer level; the scanner converts it into a
  // `ScanError` using the token's text and lexing context.
  Invalid,
  // These are only used by the lexer.
  CommentMultiline,
  CommentMultilineEnd,
  CommentSingle,
  LineTerminator,
  LiteralNumberBin,
  LiteralNumberHex,
  LiteralNumberOct,
  Whitespace,

  Ampersand,
  AmpersandAmpersand,
  AmpersandAmpersandEquals,
  AmpersandEquals,
  Asterisk,
  AsteriskAsterisk,
  AsteriskAsteriskEquals,
  AsteriskEquals,
  At,
  Bar,
  BarBar,
  BarBarEquals,
  BarEquals,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  Caret,
  CaretEquals,
  ChevronLeft,
  ChevronLeftChevronLeft,
  ChevronLeftChevronLeftEquals,
  ChevronLeftEquals,
  ChevronLeftSlash,
  ChevronRight,
  ChevronRightChevronRight,
  ChevronRightChevronRightChevronRight,
  ChevronRightChevronRightChevronRightEquals,
  ChevronRightChevronRightEquals,
  ChevronRightEquals,
  Colon,
  Comma,
  Dot,
  DotDotDot,
  Equals,
  EqualsChevronRight,
  EqualsEquals,
  EqualsEqualsEquals,
  Exclamation,
  ExclamationEquals,
  ExclamationEqualsEquals,
  Hyphen,
  HyphenEquals,
  HyphenHyphen,
  Identifier,
  JsxTextContent,
  KeywordAbstract,
  KeywordAs,
  KeywordAssert,
  KeywordAsserts,
  KeywordAsync,
  KeywordAwait,
  KeywordBreak,
  KeywordCase,
  KeywordCatch,
  KeywordClass,
  KeywordConst,
  KeywordContinue,
  KeywordDebugger,
  KeywordDeclare,
  KeywordDefault,
  KeywordDelete,
  KeywordDo,
  KeywordElse,
  KeywordEnum,
  KeywordExport,
  KeywordExtends,
  KeywordFinally,
  KeywordFor,
  KeywordFrom,
  KeywordFunction,
  KeywordIf,
  KeywordImplements,
  KeywordImport,
  KeywordIn,
  KeywordInfer,
  KeywordInstanceof,
  KeywordInterface,
  KeywordIs,
  KeywordKeyof,
  KeywordLet,
  KeywordModule,
  KeywordNamespace,
  KeywordNew,
  KeywordOf,
  KeywordOut,
  KeywordReadonly,
  KeywordReturn,
  KeywordSatisfies,
  KeywordStatic,
  KeywordSuper,
  KeywordSwitch,
  KeywordThis,
  KeywordThrow,
  KeywordTry,
  KeywordType,
  KeywordTypeof,
  KeywordUsing,
  KeywordVar,
  KeywordVoid,
  KeywordWhile,
  KeywordWith,
  KeywordYield,
  LiteralBigInt,
  LiteralFalse,
  LiteralNull,
  LiteralNumber,
  LiteralRegex,
  LiteralString,
  LiteralTemplatePartString,
  LiteralTemplatePartStringEnd,
  LiteralTrue,
  ParenthesisClose,
  ParenthesisOpen,
  Percent,
  PercentEquals,
  Plus,
  PlusEquals,
  PlusPlus,
  PrivateMember,
  Question,
  QuestionDot,
  QuestionDotBracketOpen,
  QuestionDotParenthesisOpen,
  QuestionQuestion,
  QuestionQuestionEquals,
  Semicolon,
  Slash,
  SlashEquals,
  Tilde,
}

impl TT {
  /// Keywords that are only contextually reserved; in module code they can
  /// still appear as plain identifiers (`var from = 1`).
  pub fn is_contextual_keyword(self) -> bool {
    matches!(
      self,
      TT::KeywordAbstract
        | TT::KeywordAs
        | TT::KeywordAssert
        | TT::KeywordAsserts
        | TT::KeywordAsync
        | TT::KeywordDeclare
        | TT::KeywordFrom
        | TT::KeywordInfer
        | TT::KeywordIs
        | TT::KeywordKeyof
        | TT::KeywordModule
        | TT::KeywordNamespace
        | TT::KeywordOf
        | TT::KeywordOut
        | TT::KeywordReadonly
        | TT::KeywordSatisfies
        | TT::KeywordType
        | TT::KeywordUsing
    )
  }

  /// Whether a token of this type can end an expression. Used to
  /// disambiguate regex literals from division and JSX elements from
  /// comparisons. `)` and `}` are decided by the scanner from its delimiter
  /// stack instead.
  pub fn ends_expression(self) -> bool {
    matches!(
      self,
      TT::BracketClose
        | TT::HyphenHyphen
        | TT::Identifier
        | TT::KeywordSuper
        | TT::KeywordThis
        | TT::LiteralBigInt
        | TT::LiteralFalse
        | TT::LiteralNull
        | TT::LiteralNumber
        | TT::LiteralRegex
        | TT::LiteralString
        | TT::LiteralTemplatePartStringEnd
        | TT::LiteralTrue
        | TT::PlusPlus
    ) || self.is_contextual_keyword()
  }

  /// Whether a token of this type continues the expression that precedes it
  /// rather than starting a new statement. Used when deciding if a
  /// top-level `import(...)` call was the whole statement.
  pub fn continues_expression(self) -> bool {
    matches!(
      self,
      TT::Ampersand
        | TT::AmpersandAmpersand
        | TT::AmpersandAmpersandEquals
        | TT::AmpersandEquals
        | TT::Asterisk
        | TT::AsteriskAsterisk
        | TT::AsteriskAsteriskEquals
        | TT::AsteriskEquals
        | TT::Bar
        | TT::BarBar
        | TT::BarBarEquals
        | TT::BarEquals
        | TT::BracketOpen
        | TT::Caret
        | TT::CaretEquals
        | TT::ChevronLeft
        | TT::ChevronLeftChevronLeft
        | TT::ChevronLeftChevronLeftEquals
        | TT::ChevronLeftEquals
        | TT::ChevronRight
        | TT::ChevronRightChevronRight
        | TT::ChevronRightChevronRightChevronRight
        | TT::ChevronRightChevronRightChevronRightEquals
        | TT::ChevronRightChevronRightEquals
        | TT::ChevronRightEquals
        | TT::Colon
        | TT::Comma
        | TT::Dot
        | TT::Equals
        | TT::EqualsEquals
        | TT::EqualsEqualsEquals
        | TT::Exclamation
        | TT::ExclamationEquals
        | TT::ExclamationEqualsEquals
        | TT::Hyphen
        | TT::HyphenEquals
        | TT::HyphenHyphen
        | TT::KeywordAs
        | TT::KeywordIn
        | TT::KeywordInstanceof
        | TT::KeywordSatisfies
        | TT::LiteralTemplatePartString
        | TT::LiteralTemplatePartStringEnd
        | TT::ParenthesisOpen
        | TT::Percent
        | TT::PercentEquals
        | TT::Plus
        | TT::PlusEquals
        | TT::PlusPlus
        | TT::Question
        | TT::QuestionDot
        | TT::QuestionDotBracketOpen
        | TT::QuestionDotParenthesisOpen
        | TT::QuestionQuestion
        | TT::QuestionQuestionEquals
        | TT::Slash
        | TT::SlashEquals
    )
  }
}

#[derive(Clone, Debug)]
pub struct Token {
  pub loc: Loc,
  // Whether one or more whitespace characters appear immediately before this
  // token, and at least one of those whitespace characters is a line
  // terminator.
  pub preceded_by_line_terminator: bool,
  pub typ: TT,
}
