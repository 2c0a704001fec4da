use crate::lit::decode_string_token;
use crate::prologue::split_directives;
use ahash::AHashSet;
use itertools::Itertools;
use parse_js::ast::Node;
use parse_js::ast::Syntax;
use parse_js::visit::JourneyControls;
use parse_js::visit::Visitor;
use regex::Captures;
use regex::Regex;

/// Hoist require-style calls whose single string argument starts with
/// `prefix` into static imports fronted by a `__cjs_require__` lookup.
/// Returns None when nothing matches, in which case the caller should keep
/// the source untouched. `code` must be the exact text `top` was parsed
/// from; the rewritten body is produced by textual substitution against it
/// so untouched formatting and comments survive.
pub(crate) fn rewrite(top: &Node, code: &str, prefix: &str) -> Option<String> {
  let mut visitor = RequireVisitor::new(code, prefix);
  visitor.visit(top);
  if visitor.path_order.is_empty() {
    return None;
  }

  let (directives, body) = split_directives(top, code);

  let mut used_names = AHashSet::<String>::new();
  let names: Vec<String> = visitor
    .path_order
    .iter()
    .map(|path| binding_name(path, &mut used_names))
    .collect();
  let imports: String = visitor
    .path_order
    .iter()
    .zip(&names)
    .map(|(path, name)| format!("import {} from {};\n", name, quote_path(path)))
    .collect();
  let table = visitor
    .path_order
    .iter()
    .zip(&names)
    .map(|(path, name)| format!("{}: {}", quote_path(path), name))
    .join(",\n\t");
  let scaffolding = format!(
    "{}const __cjs_imports__ = {{\n\t{},\n}}\nfunction __cjs_require__(path) {{\n\tconst req = __cjs_imports__[path]\n\tif (!req) {{\n\t\tthrow new Error(\"Module not found: \" + path)\n\t}}\n\treturn req\n}}\n",
    imports, table
  );

  let body = replace_require_calls(body, &visitor.callees, prefix);
  Some(format!("{}{}{}", directives, scaffolding, body))
}

struct RequireVisitor<'a> {
  code: &'a str,
  prefix: &'a str,
  path_order: Vec<String>,
  seen_paths: AHashSet<String>,
  callees: Vec<String>,
  seen_callees: AHashSet<String>,
}

impl<'a> RequireVisitor<'a> {
  fn new(code: &'a str, prefix: &'a str) -> RequireVisitor<'a> {
    Self {
      code,
      prefix,
      path_order: Vec::new(),
      seen_paths: AHashSet::new(),
      callees: Vec::new(),
      seen_callees: AHashSet::new(),
    }
  }
}

impl<'a> Visitor for RequireVisitor<'a> {
  fn on_syntax_down(&mut self, node: &Node, _ctl: &mut JourneyControls) {
    let Syntax::CallExpr {
      callee, arguments, ..
    } = node.stx.as_ref()
    else {
      return;
    };
    if arguments.len() != 1 {
      return;
    }
    let Syntax::CallArg { value, .. } = arguments[0].stx.as_ref() else {
      return;
    };
    if !matches!(value.stx.as_ref(), Syntax::LiteralStringExpr { .. }) {
      return;
    }
    let path = decode_string_token(&self.code[value.loc.0..value.loc.1]);
    if !path.starts_with(self.prefix) {
      return;
    }
    // Calls already routed through the shim would otherwise qualify again and
    // stack a second scaffolding on a rerun.
    if matches!(callee.stx.as_ref(), Syntax::IdentifierExpr { name } if name == "__cjs_require__") {
      return;
    }
    if self.seen_paths.insert(path.clone()) {
      self.path_order.push(path);
    }
    // Only a plain identifier callee can be targeted by the textual rewrite;
    // member and other complex callees still contribute their path.
    if let Syntax::IdentifierExpr { name } = callee.stx.as_ref() {
      if self.seen_callees.insert(name.clone()) {
        self.callees.push(name.clone());
      }
    }
  }
}

// Derive the import binding for a path from its last non-empty segment.
// Distinct paths can reduce to the same stem; an ordinal keeps the bindings
// and table keys apart.
fn binding_name(path: &str, used: &mut AHashSet<String>) -> String {
  let stem = path
    .split('/')
    .rev()
    .find(|segment| !segment.is_empty())
    .unwrap_or("module");
  let mut stem: String = stem
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();
  if stem.starts_with(|c: char| c.is_ascii_digit()) {
    stem.insert(0, '_');
  }
  let name = format!("__cjs_import_{}__", stem);
  if used.insert(name.clone()) {
    return name;
  }
  let mut ordinal = 2;
  loop {
    let name = format!("__cjs_import_{}_{}__", stem, ordinal);
    if used.insert(name.clone()) {
      return name;
    }
    ordinal += 1;
  }
}

fn quote_path(path: &str) -> String {
  let mut out = String::with_capacity(path.len() + 2);
  out.push('"');
  for c in path.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '"' => out.push_str("\\\""),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      // Legal raw in ES2019+ strings, but older consumers treat them as
      // line terminators.
      '\u{2028}' => out.push_str("\\u2028"),
      '\u{2029}' => out.push_str("\\u2029"),
      c => out.push(c),
    }
  }
  out.push('"');
  out
}

fn replace_require_calls(body: &str, callees: &[String], prefix: &str) -> String {
  // Longest first, so rewriting `require` can never clobber the middle of a
  // `__require(...)` call site that is itself being rewritten.
  let mut ordered: Vec<&String> = callees.iter().collect();
  ordered.sort_by(|a, b| b.len().cmp(&a.len()));
  let mut result = body.to_string();
  for callee in ordered {
    let pattern = format!(
      r#"{}\s*\(\s*(["']){}"#,
      regex::escape(callee),
      regex::escape(prefix)
    );
    let Ok(re) = Regex::new(&pattern) else {
      continue;
    };
    result = re
      .replace_all(&result, |caps: &Captures| {
        format!("__cjs_require__({}{}", &caps[1], prefix)
      })
      .into_owned();
  }
  result
}
