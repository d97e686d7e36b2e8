use futures::executor::block_on;
use scan_js::scan;
use scan_js::scan_all_concurrent;
use scan_js::scan_all_sequential;
use scan_js::ScanInput;

fn fixture() -> &'static str {
  r#"
import { name } from 'mod'
import json from './json.json' assert { type: 'json' }
export var p = 5;
export function q () {

};
export { x as 'external name' } from 'external';

// Comments provided to demonstrate edge cases
import /*comment!*/ (  'asdf', { assert: { type: 'json' }});
"#
}

#[test]
fn batch_outputs_match_single_scans_in_order() {
  let inputs = vec![
    ScanInput::new(fixture(), "a.js"),
    ScanInput::new("export * from './other'", "b.js"),
    ScanInput::new(fixture(), "c.js"),
  ];
  let singles: Vec<_> = inputs
    .iter()
    .map(|input| scan(&input.source_text, &input.file_path).unwrap())
    .collect();

  let sequential = scan_all_sequential(&inputs).unwrap();
  assert_eq!(sequential, singles);

  let concurrent = block_on(scan_all_concurrent(&inputs)).unwrap();
  assert_eq!(concurrent, singles);
}

#[test]
fn concurrent_order_is_stable_across_many_inputs() {
  let inputs: Vec<ScanInput> = (0..200)
    .map(|i| {
      ScanInput::new(
        format!("import m{0} from './m{0}';\nexport const v{0} = m{0};", i),
        format!("file{}.js", i),
      )
    })
    .collect();
  let outputs = block_on(scan_all_concurrent(&inputs)).unwrap();
  assert_eq!(outputs.len(), inputs.len());
  for (i, output) in outputs.iter().enumerate() {
    assert_eq!(output.imports[0].n.as_deref(), Some(format!("./m{}", i).as_str()));
    assert_eq!(output.exports[0].n.as_deref(), Some(format!("v{}", i).as_str()));
  }
}

#[test]
fn failing_batch_discards_successes() {
  let inputs = vec![
    ScanInput::new("export const fine = 1;", "fine.js"),
    ScanInput::new("import '", "broken.js"),
  ];
  let error = block_on(scan_all_concurrent(&inputs)).unwrap_err();
  assert_eq!(error.errors.len(), 1);
  assert_eq!(error.errors[0].file_path.as_deref(), Some("broken.js"));
}

#[test]
fn empty_batch_yields_empty_output() {
  assert!(scan_all_sequential(&[]).unwrap().is_empty());
  assert!(block_on(scan_all_concurrent(&[])).unwrap().is_empty());
}
