use crate::error::BatchScanError;
use crate::error::ScanError;
use crate::error::ScanResult;
use crate::output::Output;
use futures::channel::oneshot;
use std::sync::Arc;

/// One unit of batch work.
///
/// `file_path` is an opaque label used for dialect selection and
/// diagnostics; it is never resolved against a filesystem.
#[derive(Clone, Debug)]
pub struct ScanInput {
  pub source_text: String,
  pub file_path: String,
}

impl ScanInput {
  pub fn new(source_text: impl Into<String>, file_path: impl Into<String>) -> ScanInput {
    ScanInput {
      source_text: source_text.into(),
      file_path: file_path.into(),
    }
  }
}

/// Dispatches one scan onto the process-wide worker pool. The pool is
/// initialized on first use by rayon, is shared across batches, and holds no
/// per-batch state afterwards.
fn dispatch(
  source_text: &str,
  file_path: &str,
  attach_path: bool,
) -> oneshot::Receiver<ScanResult<Output>> {
  let source: Arc<str> = Arc::from(source_text);
  let path: Arc<str> = Arc::from(file_path);
  let (tx, rx) = oneshot::channel();
  rayon::spawn(move || {
    let mut result = crate::scan(&source, &path);
    if attach_path {
      result = result.map_err(|error| error.with_file_path(&path));
    }
    // The receiver may have been dropped (batch cancelled); nothing to do.
    let _ = tx.send(result);
  });
  rx
}

/// Suspending single-file scan with the same success/failure contract as
/// [`crate::scan`].
pub async fn scan_async(source_text: &str, file_path: &str) -> ScanResult<Output> {
  let rx = dispatch(source_text, file_path, false);
  rx.await.expect("scan worker dropped its result channel")
}

/// Scans every input strictly in order on the calling thread, aborting on
/// the first failure with that file's plain error, byte-identical to what a
/// direct [`crate::scan`] of that file would report, with no file-path
/// decoration.
pub fn scan_all_sequential(inputs: &[ScanInput]) -> Result<Vec<Output>, ScanError> {
  let mut outputs = Vec::with_capacity(inputs.len());
  for input in inputs {
    outputs.push(crate::scan(&input.source_text, &input.file_path)?);
  }
  Ok(outputs)
}

/// Scans every input in parallel on the global worker pool and suspends
/// until all of them settle.
///
/// On success the results preserve input order exactly, irrespective of
/// completion order. When one or more files fail, the whole batch fails with
/// a single [`BatchScanError`] listing every failing file; successes are
/// discarded. This is a reduction over settled slots, not a loop with an
/// early exit: every dispatched scan runs to completion before the report is
/// folded.
pub async fn scan_all_concurrent(inputs: &[ScanInput]) -> Result<Vec<Output>, BatchScanError> {
  let pending: Vec<_> = inputs
    .iter()
    .map(|input| dispatch(&input.source_text, &input.file_path, true))
    .collect();
  let mut outputs = Vec::with_capacity(pending.len());
  let mut errors = Vec::new();
  for rx in pending {
    match rx.await.expect("scan worker dropped its result channel") {
      Ok(output) => outputs.push(output),
      Err(error) => errors.push(error),
    }
  }
  if errors.is_empty() {
    Ok(outputs)
  } else {
    Err(BatchScanError { errors })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::executor::block_on;

  fn inputs(sources: &[(&str, &str)]) -> Vec<ScanInput> {
    sources
      .iter()
      .map(|(text, path)| ScanInput::new(*text, *path))
      .collect()
  }

  #[test]
  fn sequential_preserves_input_order() {
    let batch = inputs(&[
      ("import a from 'a'", "a.js"),
      ("import b from 'b'", "b.js"),
      ("export const c = 1;", "c.js"),
    ]);
    let outputs = scan_all_sequential(&batch).unwrap();
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].imports[0].n.as_deref(), Some("a"));
    assert_eq!(outputs[1].imports[0].n.as_deref(), Some("b"));
    assert_eq!(outputs[2].exports[0].n.as_deref(), Some("c"));
  }

  #[test]
  fn concurrent_matches_sequential_on_success() {
    let batch: Vec<ScanInput> = (0..64)
      .map(|i| ScanInput::new(format!("import x{0} from 'mod{0}'", i), format!("f{}.js", i)))
      .collect();
    let sequential = scan_all_sequential(&batch).unwrap();
    let concurrent = block_on(scan_all_concurrent(&batch)).unwrap();
    assert_eq!(sequential, concurrent);
  }

  #[test]
  fn concurrent_aggregates_every_failure() {
    let batch = inputs(&[
      ("var a number = 1", "a.js"),
      ("import ok from 'fine'", "ok.js"),
      ("var b string = 'b'", "b.js"),
    ]);
    let error = block_on(scan_all_concurrent(&batch)).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("a.js: Expected a semicolon"), "{}", message);
    assert!(message.contains("b.js: Expected a semicolon"), "{}", message);
    assert!(!message.contains("ok.js"), "{}", message);
  }

  #[test]
  fn sequential_fails_fast_with_undecorated_error() {
    let batch = inputs(&[("var a number = 1", "a.js"), ("var b string = 'b'", "b.js")]);
    let error = scan_all_sequential(&batch).unwrap_err();
    let direct = crate::scan("var a number = 1", "a.js").unwrap_err();
    assert_eq!(error.to_string(), direct.to_string());
    assert!(error.file_path.is_none());
  }

  #[test]
  fn scan_async_matches_scan() {
    let sync = crate::scan("export * from 'x'", "m.js").unwrap();
    let asynced = block_on(scan_async("export * from 'x'", "m.js")).unwrap();
    assert_eq!(sync, asynced);
  }
}
