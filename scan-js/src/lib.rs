//! Module-dependency scanning for JavaScript, TypeScript and JSX sources.
//!
//! Extracts every `import`/`export` occurrence of a file with exact byte
//! offsets, plus a facade flag and a module-syntax flag, without building an
//! AST. Single files go through [`scan`]/[`scan_async`]; ordered batches go
//! through [`scan_all_sequential`] (fail-fast) or [`scan_all_concurrent`]
//! (worker pool, aggregated errors).

use scan::ModuleScanner;

pub mod batch;
pub mod char;
pub mod error;
pub mod lex;
pub mod loc;
pub mod output;
pub mod scan;
pub mod token;

pub use batch::scan_all_concurrent;
pub use batch::scan_all_sequential;
pub use batch::scan_async;
pub use batch::ScanInput;
pub use error::BatchScanError;
pub use error::ScanError;
pub use error::ScanErrorType;
pub use error::ScanResult;
pub use output::Export;
pub use output::Import;
pub use output::Output;
pub use scan::Dialect;

/// Scans a single source text and returns its module-dependency surface.
///
/// `file_path` is a logical label: it selects the dialect (`.jsx`/`.tsx`
/// enable JSX disambiguation, `.ts`/`.tsx`/`.d.ts` the TypeScript forms) and
/// is reported back by batch errors. It is never opened.
///
/// # Examples
///
/// ```
/// let output = scan_js::scan("import { x } from 'mod'", "index.js").unwrap();
/// assert_eq!(output.imports[0].n.as_deref(), Some("mod"));
/// assert!(output.has_module_syntax);
/// ```
pub fn scan(source_text: &str, file_path: &str) -> ScanResult<Output> {
  ModuleScanner::new(source_text, Dialect::from_path(file_path)).run()
}
