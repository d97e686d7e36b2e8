use crate::error::ScanErrorType;
use crate::scan::scan_source;
use crate::scan::Dialect;

#[test]
fn dialect_from_path() {
  assert_eq!(Dialect::from_path("a.js"), Dialect::Js);
  assert_eq!(Dialect::from_path("a.mjs"), Dialect::Js);
  assert_eq!(Dialect::from_path("a.cjs"), Dialect::Js);
  assert_eq!(Dialect::from_path("a.jsx"), Dialect::Jsx);
  assert_eq!(Dialect::from_path("a.ts"), Dialect::Ts);
  assert_eq!(Dialect::from_path("a.mts"), Dialect::Ts);
  assert_eq!(Dialect::from_path("a.tsx"), Dialect::Tsx);
  assert_eq!(Dialect::from_path("a.d.ts"), Dialect::Dts);
  assert_eq!(Dialect::from_path("noext"), Dialect::Js);
  assert!(Dialect::Tsx.jsx());
  assert!(Dialect::Tsx.ts());
  assert!(!Dialect::Jsx.ts());
}

#[test]
fn static_import_offsets() {
  let out = scan_source("import { name } from 'mod';", "index.js").unwrap();
  assert_eq!(out.imports.len(), 1);
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("mod"));
  assert_eq!(import.s, 22);
  assert_eq!(import.e, 25);
  assert_eq!(import.ss, 0);
  // The trailing semicolon is not part of the statement range.
  assert_eq!(import.se, 26);
  assert_eq!(import.d, -1);
  assert_eq!(import.a, -1);
  assert!(out.has_module_syntax);
  assert!(out.facade);
}

#[test]
fn side_effect_import() {
  let out = scan_source("import 'x';", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("x"));
  assert_eq!(import.s, 8);
  assert_eq!(import.e, 9);
  assert_eq!(import.ss, 0);
  assert_eq!(import.se, 10);
}

#[test]
fn specifier_with_unicode_escape_decodes_but_keeps_raw_range() {
  let out = scan_source(r"import { name } from 'mod\u1011';", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("mod\u{1011}"));
  assert_eq!(import.s, 22);
  assert_eq!(import.e, 31);
  assert_eq!(import.se, 32);
}

#[test]
fn import_attributes_record_brace_offset() {
  let out = scan_source(
    "import json from './j.json' assert { type: 'json' }",
    "index.js",
  )
  .unwrap();
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("./j.json"));
  assert_eq!(import.s, 18);
  assert_eq!(import.e, 26);
  assert_eq!(import.a, 35);
  assert_eq!(import.se, 51);
}

#[test]
fn with_clause_records_brace_offset() {
  let out = scan_source("import j from './j.json' with { type: 'json' };", "index.js").unwrap();
  let import = &out.imports[0];
  assert!(import.a > -1);
  assert_eq!(import.a, 30);
}

#[test]
fn assert_on_next_line_is_not_an_attributes_clause() {
  let out = scan_source("import j from './j'\nassert({})", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.a, -1);
  assert_eq!(import.se, 19);
  // The `assert(..)` call is an ordinary statement.
  assert!(!out.facade);
}

#[test]
fn dynamic_import_with_attributes_argument() {
  let out = scan_source("import('./foo', { assert: { type: 'json' } })", "index.js").unwrap();
  assert_eq!(out.imports.len(), 1);
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("./foo"));
  assert_eq!(import.d, 0);
  assert_eq!(import.ss, 0);
  assert_eq!(import.s, 8);
  assert_eq!(import.e, 13);
  assert_eq!(import.a, 16);
  assert_eq!(import.se, 45);
  assert!(!out.has_module_syntax);
  // The second argument makes this more than a pure re-export surface.
  assert!(!out.facade);
}

#[test]
fn dynamic_import_keyword_offset_in_context() {
  let out = scan_source("const p = import('./mod');", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.d, 10);
  assert_eq!(import.ss, 10);
  assert_eq!(import.n.as_deref(), Some("./mod"));
  assert_eq!(import.s, 18);
  assert_eq!(import.e, 23);
  assert_eq!(import.se, 25);
}

#[test]
fn dynamic_import_non_string_argument_has_no_name() {
  let out = scan_source("import(specifier)", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.n, None);
  assert_eq!(import.s, 7);
  assert_eq!(import.e, 16);
  assert!(!out.facade);
}

#[test]
fn nested_dynamic_imports_keep_source_order() {
  let out = scan_source("import(import('./inner'))", "index.js").unwrap();
  assert_eq!(out.imports.len(), 2);
  assert_eq!(out.imports[0].d, 0);
  assert_eq!(out.imports[0].n, None);
  assert_eq!(out.imports[1].d, 7);
  assert_eq!(out.imports[1].n.as_deref(), Some("./inner"));
}

#[test]
fn import_meta_is_not_an_import_entry() {
  let out = scan_source("import.meta.url", "index.js").unwrap();
  assert!(out.imports.is_empty());
  assert!(out.has_module_syntax);
  assert!(!out.facade);
}

#[test]
fn comment_between_import_and_payload() {
  let out = scan_source("import /*comment!*/ (  'asdf');", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.d, 0);
  assert_eq!(import.ss, 0);
  assert_eq!(import.n.as_deref(), Some("asdf"));
  assert_eq!(import.s, 24);
  assert_eq!(import.e, 28);
  assert_eq!(import.se, 30);
}

#[test]
fn imports_in_comments_strings_and_regexes_are_ignored() {
  let out = scan_source(
    "// import 'a'\n/* import 'b' */\nconst re = /import\\('x'\\)/;\nconst s = \"import 'd'\";\nimport 'c';",
    "index.js",
  )
  .unwrap();
  assert_eq!(out.imports.len(), 1);
  assert_eq!(out.imports[0].n.as_deref(), Some("c"));
}

#[test]
fn dynamic_import_inside_template_expression() {
  let out = scan_source("const s = `import 'a' ${import('./b')} tail`;", "index.js").unwrap();
  assert_eq!(out.imports.len(), 1);
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("./b"));
  assert_eq!(import.d, 24);
  assert_eq!(import.s, 32);
  assert_eq!(import.e, 35);
  assert_eq!(import.se, 37);
}

#[test]
fn export_var_records_binding() {
  let out = scan_source("export var p = 5;", "index.js").unwrap();
  assert_eq!(out.exports.len(), 1);
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("p"));
  assert_eq!(export.s, 11);
  assert_eq!(export.e, 12);
  assert_eq!(export.ln.as_deref(), Some("p"));
  assert_eq!(export.ls, 11);
  assert_eq!(export.le, 12);
  assert!(!out.facade);
  assert!(out.has_module_syntax);
}

#[test]
fn export_function_records_binding() {
  let out = scan_source("export function q() {}", "index.js").unwrap();
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("q"));
  assert_eq!(export.s, 16);
  assert_eq!(export.e, 17);
  assert_eq!(export.ls, 16);
  assert_eq!(export.le, 17);
}

#[test]
fn export_default_function_records_both_names() {
  let out = scan_source("export default function foo() {}", "index.js").unwrap();
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("default"));
  assert_eq!(export.s, 7);
  assert_eq!(export.e, 14);
  assert_eq!(export.ln.as_deref(), Some("foo"));
  assert_eq!(export.ls, 24);
  assert_eq!(export.le, 27);
  assert!(!out.facade);
}

#[test]
fn export_default_expression_has_no_local() {
  let out = scan_source("export default 42;", "index.js").unwrap();
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("default"));
  assert_eq!(export.ln, None);
  assert_eq!(export.ls, -1);
  assert_eq!(export.le, -1);
}

#[test]
fn export_list_rename() {
  let out = scan_source("export { x as y };", "index.js").unwrap();
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("y"));
  assert_eq!(export.s, 14);
  assert_eq!(export.e, 15);
  assert_eq!(export.ln.as_deref(), Some("x"));
  assert_eq!(export.ls, 9);
  assert_eq!(export.le, 10);
  // A bare rename list forwards existing bindings only.
  assert!(out.facade);
}

#[test]
fn reexport_with_string_name() {
  let out = scan_source("export { x as 'external name' } from 'external';", "index.js").unwrap();
  assert_eq!(out.imports.len(), 1);
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("external"));
  assert_eq!(import.s, 38);
  assert_eq!(import.e, 46);
  assert_eq!(import.ss, 0);
  assert_eq!(import.se, 47);
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("external name"));
  // String-literal export names keep their quotes in the range.
  assert_eq!(export.s, 14);
  assert_eq!(export.e, 29);
  assert_eq!(export.ls, -1);
  assert_eq!(export.le, -1);
  assert_eq!(export.ln, None);
  assert!(out.facade);
}

#[test]
fn export_star_with_alias() {
  let out = scan_source("export * as ns from 'mod';", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.n.as_deref(), Some("mod"));
  assert_eq!(import.s, 21);
  assert_eq!(import.e, 24);
  assert_eq!(import.se, 25);
  let export = &out.exports[0];
  assert_eq!(export.n.as_deref(), Some("ns"));
  assert_eq!(export.s, 12);
  assert_eq!(export.e, 14);
  assert_eq!(export.ls, -1);
  assert!(out.facade);
}

#[test]
fn export_star_without_alias_has_no_export_entry() {
  let out = scan_source("export * from 'mod';", "index.js").unwrap();
  assert_eq!(out.imports.len(), 1);
  assert!(out.exports.is_empty());
  assert!(out.facade);
}

#[test]
fn reexport_attributes_are_recorded() {
  let out = scan_source("export { x } from './x.json' assert { type: 'json' };", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.a, 36);
  assert_eq!(import.se, 52);
}

#[test]
fn hashbang_is_skipped() {
  let out = scan_source("#!/usr/bin/env node\nimport 'x';", "index.js").unwrap();
  let import = &out.imports[0];
  assert_eq!(import.ss, 20);
  assert_eq!(import.s, 28);
  assert_eq!(import.e, 29);
}

#[test]
fn regex_division_disambiguation() {
  // `/re/` after `=` is a regex; after an identifier it divides.
  let out = scan_source("const a = /import\\('x'\\)/g; const b = a / 2 / 3;", "index.js").unwrap();
  assert!(out.imports.is_empty());

  // Regex at statement start after a block.
  let out = scan_source("if (x) {}\n/import/.test(s);", "index.js").unwrap();
  assert!(out.imports.is_empty());
}

#[test]
fn class_body_does_not_leak_statement_context() {
  let out = scan_source(
    "class A { import() { return 1; } }\nimport 'real';",
    "index.js",
  )
  .unwrap();
  // The method named `import` is over-approximated as a dynamic call site by
  // design, but the real static import must still be found.
  assert!(out.imports.iter().any(|i| i.n.as_deref() == Some("real")));
  assert!(out.has_module_syntax);
}

#[test]
fn property_named_import_is_ignored() {
  let out = scan_source("foo.import('bar');", "index.js").unwrap();
  assert!(out.imports.is_empty());
  assert!(!out.has_module_syntax);
}

#[test]
fn import_equals_is_module_syntax_without_entry() {
  let out = scan_source("import A = require('mod');\nexport = A;", "index.ts").unwrap();
  assert!(out.imports.is_empty());
  assert!(out.exports.is_empty());
  assert!(out.has_module_syntax);
}

#[test]
fn missing_semicolon_between_value_tokens() {
  let error = scan_source("var a number = 1", "index.js").unwrap_err();
  assert_eq!(error.typ, ScanErrorType::ExpectedSemicolon);
  assert_eq!(
    error.to_string(),
    "Expected a semicolon or an implicit semicolon after a statement, but found none"
  );
}

#[test]
fn statement_running_into_import_declaration() {
  let error = scan_source("error import { name } from 'mod'", "index.js").unwrap_err();
  assert_eq!(error.typ, ScanErrorType::ExpectedSemicolon);
}

#[test]
fn unterminated_literals_fail() {
  assert_eq!(
    scan_source("import 'x", "a.js").unwrap_err().typ,
    ScanErrorType::UnterminatedString
  );
  assert_eq!(
    scan_source("const s = `never closed", "a.js").unwrap_err().typ,
    ScanErrorType::UnterminatedTemplate
  );
  assert_eq!(
    scan_source("/* never closed", "a.js").unwrap_err().typ,
    ScanErrorType::UnterminatedComment
  );
}

#[test]
fn unbalanced_delimiters_fail() {
  assert_eq!(
    scan_source("const x = (1 + 2;", "a.js").unwrap_err().typ,
    ScanErrorType::UnexpectedEnd
  );
  assert_eq!(
    scan_source("}", "a.js").unwrap_err().typ,
    ScanErrorType::UnexpectedClosingDelimiter
  );
}

#[test]
fn invalid_escape_in_specifier_fails() {
  let error = scan_source(r"import { x } from 'mod\u12'", "a.js").unwrap_err();
  assert_eq!(error.typ, ScanErrorType::InvalidCharacterEscape);
}

#[test]
fn surrogate_pair_escape_decodes() {
  let out = scan_source(r"import e from 'mod\uD83D\uDE00'", "a.js").unwrap();
  assert_eq!(out.imports[0].n.as_deref(), Some("mod\u{1F600}"));
}

#[test]
fn scanning_is_deterministic() {
  let source = "import a from 'a';\nexport { b } from './b';\nimport('./c');\n";
  let first = scan_source(source, "m.js").unwrap();
  let second = scan_source(source, "m.js").unwrap();
  assert_eq!(first, second);
}
