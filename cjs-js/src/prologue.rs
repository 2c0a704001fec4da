use parse_js::ast::Node;
use parse_js::ast::Syntax;

/// Split a leading shebang line off `source`. Blank lines before the shebang
/// are dropped; the shebang itself is returned verbatim with a trailing
/// newline. If the first non-blank line is not a shebang, `source` is
/// returned untouched.
pub(crate) fn split_shebang(source: &str) -> (String, &str) {
  let mut pos = 0;
  for line in source.split('\n') {
    let end = pos + line.len();
    let trimmed = line.trim();
    if trimmed.is_empty() {
      pos = end + 1;
      continue;
    }
    if trimmed.starts_with("#!") {
      let rest = if end < source.len() {
        &source[end + 1..]
      } else {
        ""
      };
      return (format!("{}\n", line), rest);
    }
    break;
  }
  (String::new(), source)
}

/// Split the directive prologue (leading string-expression statements such as
/// `"use strict";`) off the front of `code`, which must be the exact text
/// `top` was parsed from. Returns the prologue text with a trailing newline
/// and the remaining body. Comments and whitespace ahead of a directive stay
/// part of the prologue text so the directive keeps its position.
pub(crate) fn split_directives<'a>(top: &Node, code: &'a str) -> (String, &'a str) {
  let Syntax::TopLevel { body } = top.stx.as_ref() else {
    return (String::new(), code);
  };
  let bytes = code.as_bytes();
  let mut end = 0;
  for stmt in body {
    let Syntax::ExpressionStmt { expression } = stmt.stx.as_ref() else {
      break;
    };
    if !matches!(expression.stx.as_ref(), Syntax::LiteralStringExpr { .. }) {
      break;
    }
    // The literal's token must sit at its claimed position; a parenthesised
    // pseudo-directive like `("use strict");` fails one of these checks and
    // conservatively ends the prologue.
    if !matches!(bytes.get(expression.loc.0).copied(), Some(b'"' | b'\'')) {
      break;
    }
    let mut pos = expression.loc.1;
    while matches!(bytes.get(pos).copied(), Some(b' ' | b'\t')) {
      pos += 1;
    }
    match bytes.get(pos).copied() {
      Some(b';') => end = pos + 1,
      // Terminated by a line break or end of input (automatic semicolon).
      Some(b'\n' | b'\r') | None => end = expression.loc.1,
      _ => break,
    }
  }
  if end == 0 {
    return (String::new(), code);
  }
  let mut directives = code[..end].to_string();
  directives.push('\n');
  let mut pos = end;
  while matches!(bytes.get(pos).copied(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
    pos += 1;
  }
  (directives, &code[pos..])
}
