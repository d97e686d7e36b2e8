use serde::Serialize;

/// One static or dynamic import site.
///
/// Field names follow the interoperability convention of existing
/// module-lexer tooling so outputs can be compared directly.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Import {
  /// Decoded module specifier.
  ///
  /// `None` for dynamic import expressions whose first argument is not a
  /// plain string literal.
  pub n: Option<String>,
  /// Specifier start.
  pub s: u32,
  /// Specifier end.
  pub e: u32,
  /// Statement start.
  pub ss: u32,
  /// Statement end.
  pub se: u32,
  /// Dynamic import index.
  /// - `-1`: static import
  /// - `> -1`: offset of the `import` keyword opening the dynamic call
  pub d: i32,
  /// Attributes index.
  /// - `-1`: no `assert`/`with` clause
  /// - `> -1`: offset of the `{` opening the clause
  pub a: i32,
}

impl Default for Import {
  fn default() -> Self {
    Self {
      n: None,
      s: 0,
      e: 0,
      ss: 0,
      se: 0,
      d: -1,
      a: -1,
    }
  }
}

/// One export site (declaration or re-export).
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Export {
  /// Exported name start.
  pub s: u32,
  /// Exported name end.
  pub e: u32,
  /// Local binding start.
  ///
  /// `-1` when the export has no distinct local binding, e.g.
  /// `export { x as 'external name' } from 'external'`.
  pub ls: i32,
  /// Local binding end; `-1` like `ls`.
  pub le: i32,
  /// Decoded exported name.
  pub n: Option<String>,
  /// Local binding name.
  pub ln: Option<String>,
}

impl Default for Export {
  fn default() -> Self {
    Self {
      s: 0,
      e: 0,
      ls: -1,
      le: -1,
      n: None,
      ln: None,
    }
  }
}

/// Result of scanning one file.
///
/// `imports` and `exports` are ordered by each construct's first token in the
/// source. The value is freshly computed per scan; it holds no references to
/// the input and no hidden state.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
  pub imports: Vec<Import>,
  pub exports: Vec<Export>,
  pub facade: bool,
  pub has_module_syntax: bool,
}
