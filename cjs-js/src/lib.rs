use parse_js::parse;
pub use err::CjsError;
pub use parse_js::error::SyntaxError;

mod err;
mod exports;
mod lit;
mod prologue;
mod requires;

/// Statically infers the export surface of a CommonJS module: the sorted set
/// of named bindings it will expose at runtime, with `"default"` included
/// when the module replaces `module.exports` wholesale. The heuristics cover
/// direct assignments onto `exports`/`module.exports` (dotted and indexed),
/// object literals assigned to `module.exports`, and
/// `Object.defineProperty` re-export idioms, including suppression of
/// getters whose bodies cannot be trusted statically.
///
/// # Arguments
///
/// * `path` - Name of the source, used only in error messages.
/// * `source` - UTF-8 JavaScript source text. A leading shebang line is
///   permitted and ignored.
///
/// # Examples
///
/// ```
/// let exports = cjs_js::analyze_exports("mod.js", "exports.a = 1;").unwrap();
/// assert_eq!(exports, ["a"]);
/// ```
pub fn analyze_exports(path: &str, source: &str) -> Result<Vec<String>, CjsError> {
  let (_, code) = prologue::split_shebang(source);
  let top = parse(code.as_bytes()).map_err(|error| CjsError::Parse {
    path: path.to_string(),
    error,
  })?;
  Ok(exports::analyze(&top, code))
}

/// Rewrites require-style calls into statically hoisted imports. Every call
/// with exactly one string-literal argument whose value starts with `prefix`
/// is collected, at any nesting depth; the rewritten document front-loads
/// one import per distinct path, a lookup table, and a `__cjs_require__`
/// function, and redirects the original call sites to it. A shebang line and
/// directive prologue keep their positions ahead of the injected code.
///
/// If no call qualifies the source is returned byte-for-byte unchanged.
/// Calls already going through `__cjs_require__` do not qualify, so feeding
/// the output back in with the same prefix returns it unchanged.
///
/// # Arguments
///
/// * `path` - Name of the source, used only in error messages.
/// * `prefix` - Path prefix a call's string argument must start with.
/// * `source` - UTF-8 JavaScript source text.
///
/// # Examples
///
/// ```
/// let out = cjs_js::rewrite_requires(
///   "mod.js",
///   "/node_modules/",
///   "const React = require(\"/node_modules/react\");",
/// )
/// .unwrap();
/// assert!(out.starts_with("import __cjs_import_react__ from \"/node_modules/react\";\n"));
/// assert!(out.contains("const React = __cjs_require__(\"/node_modules/react\");"));
///
/// let untouched = cjs_js::rewrite_requires("mod.js", "/node_modules/", "let x = 1;").unwrap();
/// assert_eq!(untouched, "let x = 1;");
/// ```
pub fn rewrite_requires(path: &str, prefix: &str, source: &str) -> Result<String, CjsError> {
  let (shebang, code) = prologue::split_shebang(source);
  let top = parse(code.as_bytes()).map_err(|error| CjsError::Parse {
    path: path.to_string(),
    error,
  })?;
  let Some(rewritten) = requires::rewrite(&top, code, prefix) else {
    return Ok(source.to_string());
  };
  Ok(format!("{}{}", shebang, rewritten))
}
