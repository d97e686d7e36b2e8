use scan_js::scan;

#[test]
fn static_import_sets_module_syntax() {
  let output = scan("\nimport { name } from 'mod'\n", "index.ts").unwrap();
  assert!(output.has_module_syntax);
}

#[test]
fn export_sets_module_syntax() {
  let output = scan("export {}", "index.js").unwrap();
  assert!(output.has_module_syntax);
}

#[test]
fn import_meta_sets_module_syntax() {
  let output = scan("import.meta", "index.ts").unwrap();
  assert!(output.has_module_syntax);
  assert!(output.imports.is_empty());
}

#[test]
fn import_meta_in_expression_sets_module_syntax() {
  let output = scan("function f() { return import.meta.url; }", "index.js").unwrap();
  assert!(output.has_module_syntax);
}

#[test]
fn bare_dynamic_import_is_not_module_syntax() {
  let output = scan("\nimport('./foo')\n", "index.ts").unwrap();
  assert!(!output.has_module_syntax);
  assert_eq!(output.imports.len(), 1);
}

#[test]
fn dynamic_import_with_attributes_is_not_module_syntax() {
  let output = scan(
    "import('./foo', { assert: { type: 'json' } })",
    "index.js",
  )
  .unwrap();
  assert!(!output.has_module_syntax);
  let import = &output.imports[0];
  assert_eq!(import.d, 0);
}

#[test]
fn adding_import_meta_flips_the_flag() {
  let without = scan("import('x')", "index.js").unwrap();
  assert!(!without.has_module_syntax);
  let with = scan("import('x');\nimport.meta;", "index.js").unwrap();
  assert!(with.has_module_syntax);
}
