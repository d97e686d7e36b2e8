use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of the syntax faults that can abort a scan.
///
/// A fault is always fatal to that file's scan; there is no partial or
/// degraded output.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ScanErrorType {
  ExpectedSemicolon,
  ExpectedSyntax(&'static str),
  InvalidCharacterEscape,
  UnexpectedClosingDelimiter,
  UnexpectedEnd,
  UnexpectedToken,
  UnterminatedComment,
  UnterminatedJsx,
  UnterminatedRegex,
  UnterminatedString,
  UnterminatedTemplate,
}

impl ScanErrorType {
  /// Human-readable message describing this fault.
  ///
  /// The `ExpectedSemicolon` text is a stable part of the error contract;
  /// callers match on it verbatim.
  pub fn message(&self) -> String {
    match self {
      ScanErrorType::ExpectedSemicolon => {
        "Expected a semicolon or an implicit semicolon after a statement, but found none".into()
      }
      ScanErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      ScanErrorType::InvalidCharacterEscape => "invalid character escape".into(),
      ScanErrorType::UnexpectedClosingDelimiter => "unmatched closing delimiter".into(),
      ScanErrorType::UnexpectedEnd => "unexpected end of input".into(),
      ScanErrorType::UnexpectedToken => "unexpected token".into(),
      ScanErrorType::UnterminatedComment => "unterminated block comment".into(),
      ScanErrorType::UnterminatedJsx => "unterminated JSX element".into(),
      ScanErrorType::UnterminatedRegex => "unterminated regular expression literal".into(),
      ScanErrorType::UnterminatedString => "unterminated string literal".into(),
      ScanErrorType::UnterminatedTemplate => "unterminated template literal".into(),
    }
  }
}

/// A syntax fault in one source text.
///
/// `offset` is the byte position of the fault when the tokenizer state could
/// recover one. `file_path` is attached by the batch coordinator, never by
/// the scanner itself, so a single-file scan renders exactly the bare
/// message.
#[derive(Clone)]
pub struct ScanError {
  pub typ: ScanErrorType,
  pub offset: Option<usize>,
  pub file_path: Option<String>,
}

impl ScanError {
  pub fn new(typ: ScanErrorType, offset: usize) -> ScanError {
    ScanError {
      typ,
      offset: Some(offset),
      file_path: None,
    }
  }

  pub fn with_file_path(mut self, file_path: &str) -> ScanError {
    self.file_path = Some(file_path.to_string());
    self
  }
}

impl Debug for ScanError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self.offset {
      Some(offset) => write!(f, "{} around offset {}", self, offset),
      None => write!(f, "{}", self),
    }
  }
}

impl Display for ScanError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.typ.message())
  }
}

impl Error for ScanError {}

impl PartialEq for ScanError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for ScanError {}

pub type ScanResult<T> = Result<T, ScanError>;

/// Aggregated failure for the concurrent batch path.
///
/// Wraps every failing file's fault; the message carries one line per
/// failure in the form `<filePath>: <message>`. Successes from a partially
/// failing batch are discarded by the coordinator.
#[derive(Clone, Debug)]
pub struct BatchScanError {
  pub errors: Vec<ScanError>,
}

impl Display for BatchScanError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    for (i, error) in self.errors.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      let path = error.file_path.as_deref().unwrap_or("<unknown>");
      write!(f, "{}: {}", path, error)?;
    }
    Ok(())
  }
}

impl Error for BatchScanError {}
