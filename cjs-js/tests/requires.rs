use cjs_js::rewrite_requires;
use similar::ChangeTag;
use similar::TextDiff;

const SHIM: &str = concat!(
  "function __cjs_require__(path) {\n",
  "\tconst req = __cjs_imports__[path]\n",
  "\tif (!req) {\n",
  "\t\tthrow new Error(\"Module not found: \" + path)\n",
  "\t}\n",
  "\treturn req\n",
  "}\n",
);

fn assert_rewrite(source: &str, prefix: &str, expected: &str) {
  let actual = rewrite_requires("test.js", prefix, source).unwrap();
  if actual != expected {
    let mut rendered = String::new();
    for change in TextDiff::from_lines(expected, &actual).iter_all_changes() {
      let sign = match change.tag() {
        ChangeTag::Delete => "-",
        ChangeTag::Insert => "+",
        ChangeTag::Equal => " ",
      };
      rendered.push_str(sign);
      rendered.push_str(change.as_str().unwrap());
    }
    panic!("rewritten output does not match:\n{}", rendered);
  }
}

#[test]
fn use_strict_directive_stays_ahead_of_imports() {
  let expected = [
    concat!(
      "\"use strict\";\n",
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "import __cjs_import_react_dom__ from \"/node_modules/react-dom\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "\t\"/node_modules/react-dom\": __cjs_import_react_dom__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var React = __cjs_require__(\"/node_modules/react\");\n",
      "var ReactDOM = __cjs_require__(\"/node_modules/react-dom\");\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "\"use strict\";\nvar React = __require(\"/node_modules/react\");\nvar ReactDOM = __require(\"/node_modules/react-dom\");\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn shebang_stays_first() {
  let expected = [
    concat!(
      "#!/usr/bin/env node\n",
      "import __cjs_import_fs_extra__ from \"/node_modules/fs-extra\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/fs-extra\": __cjs_import_fs_extra__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var fs = __cjs_require__(\"/node_modules/fs-extra\");\n",
      "console.log(fs);\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "#!/usr/bin/env node\nvar fs = __require(\"/node_modules/fs-extra\");\nconsole.log(fs);\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn repeated_paths_import_once() {
  let expected = [
    concat!(
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var React1 = __cjs_require__(\"/node_modules/react\");\n",
      "var React2 = __cjs_require__(\"/node_modules/react\");\n",
      "var React3 = __cjs_require__(\"/node_modules/react\");\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "var React1 = __require(\"/node_modules/react\");\nvar React2 = __require(\"/node_modules/react\");\nvar React3 = require2(\"/node_modules/react\");\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn no_matching_calls_return_input_byte_for_byte() {
  let source = "var x = 1;\nconsole.log(x);\n";
  assert_eq!(
    rewrite_requires("test.js", "/node_modules/", source).unwrap(),
    source
  );

  let with_prologue = "#!/usr/bin/env node\n\"use strict\";\nvar x = 1;\n";
  assert_eq!(
    rewrite_requires("test.js", "/node_modules/", with_prologue).unwrap(),
    with_prologue
  );
}

#[test]
fn non_matching_prefix_left_untouched() {
  let expected = [
    concat!(
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var local = __require(\"./local\");\n",
      "var remote = __cjs_require__(\"/node_modules/react\");\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "var local = __require(\"./local\");\nvar remote = __require(\"/node_modules/react\");\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn every_callee_spelling_is_redirected() {
  let expected = [
    concat!(
      "import __cjs_import_a__ from \"/lib/a\";\n",
      "import __cjs_import_b__ from \"/lib/b\";\n",
      "import __cjs_import_c__ from \"/lib/c\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/lib/a\": __cjs_import_a__,\n",
      "\t\"/lib/b\": __cjs_import_b__,\n",
      "\t\"/lib/c\": __cjs_import_c__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var a = __cjs_require__(\"/lib/a\");\n",
      "var b = __cjs_require__(\"/lib/b\");\n",
      "var c = __cjs_require__(\"/lib/c\");\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "var a = require1(\"/lib/a\");\nvar b = require2(\"/lib/b\");\nvar c = myRequire(\"/lib/c\");\n",
    "/lib/",
    &expected,
  );
}

#[test]
fn scoped_packages_bind_the_last_segment() {
  let expected = [
    concat!(
      "import __cjs_import_core__ from \"/node_modules/@babel/core\";\n",
      "import __cjs_import_hooks__ from \"/node_modules/@react/hooks\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/@babel/core\": __cjs_import_core__,\n",
      "\t\"/node_modules/@react/hooks\": __cjs_import_hooks__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var babel = __cjs_require__(\"/node_modules/@babel/core\");\n",
      "var react = __cjs_require__(\"/node_modules/@react/hooks\");\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "var babel = __require(\"/node_modules/@babel/core\");\nvar react = __require(\"/node_modules/@react/hooks\");\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn rewrite_reaches_nested_scopes() {
  let source = r#"var __getOwnPropNames = Object.getOwnPropertyNames;
var __require = ((x) => typeof require !== "undefined" ? require : x)(function(x) {
  if (typeof require !== "undefined") return require.apply(this, arguments);
  throw Error('Dynamic require of "' + x + '" is not supported');
});
var __commonJS = (cb, mod) => function __require2() {
  return mod || (0, cb[__getOwnPropNames(cb)[0]])((mod = { exports: {} }).exports, mod), mod.exports;
};
// node_modules/react-dom/cjs/react-dom-client.development.js
var require_react_dom_client_development = __commonJS({
  "node_modules/react-dom/cjs/react-dom-client.development.js"(exports) {
    "use strict";
    (function() {
      var Scheduler = __require("/node_modules/scheduler"), React = __require("/node_modules/react"), ReactDOM = __require("/node_modules/react-dom");
    })();
  }
});
"#;
  let expected = [
    concat!(
      "import __cjs_import_scheduler__ from \"/node_modules/scheduler\";\n",
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "import __cjs_import_react_dom__ from \"/node_modules/react-dom\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/scheduler\": __cjs_import_scheduler__,\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "\t\"/node_modules/react-dom\": __cjs_import_react_dom__,\n",
      "}\n",
    ),
    SHIM,
    r#"var __getOwnPropNames = Object.getOwnPropertyNames;
var __require = ((x) => typeof require !== "undefined" ? require : x)(function(x) {
  if (typeof require !== "undefined") return require.apply(this, arguments);
  throw Error('Dynamic require of "' + x + '" is not supported');
});
var __commonJS = (cb, mod) => function __require2() {
  return mod || (0, cb[__getOwnPropNames(cb)[0]])((mod = { exports: {} }).exports, mod), mod.exports;
};
// node_modules/react-dom/cjs/react-dom-client.development.js
var require_react_dom_client_development = __commonJS({
  "node_modules/react-dom/cjs/react-dom-client.development.js"(exports) {
    "use strict";
    (function() {
      var Scheduler = __cjs_require__("/node_modules/scheduler"), React = __cjs_require__("/node_modules/react"), ReactDOM = __cjs_require__("/node_modules/react-dom");
    })();
  }
});
"#,
  ]
  .concat();
  assert_rewrite(source, "/node_modules/", &expected);
}

#[test]
fn rerunning_on_own_output_is_a_no_op() {
  let source = "var React = __require(\"/node_modules/react\");\n";
  let once = rewrite_requires("test.js", "/node_modules/", source).unwrap();
  let twice = rewrite_requires("test.js", "/node_modules/", &once).unwrap();
  assert_eq!(once, twice);
}

#[test]
fn single_quote_call_sites_keep_their_quote() {
  let expected = [
    concat!(
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "}\n",
    ),
    SHIM,
    "var React = __cjs_require__('/node_modules/react');\n",
  ]
  .concat();
  assert_rewrite(
    "var React = __require('/node_modules/react');\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn colliding_stems_get_ordinals() {
  let expected = [
    concat!(
      "import __cjs_import_util__ from \"/node_modules/a/util\";\n",
      "import __cjs_import_util_2__ from \"/node_modules/b/util\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/a/util\": __cjs_import_util__,\n",
      "\t\"/node_modules/b/util\": __cjs_import_util_2__,\n",
      "}\n",
    ),
    SHIM,
    concat!(
      "var a = __cjs_require__(\"/node_modules/a/util\");\n",
      "var b = __cjs_require__(\"/node_modules/b/util\");\n",
    ),
  ]
  .concat();
  assert_rewrite(
    "var a = __require(\"/node_modules/a/util\");\nvar b = __require(\"/node_modules/b/util\");\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn whitespace_inside_call_collapses() {
  let expected = [
    concat!(
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "}\n",
    ),
    SHIM,
    "var React = __cjs_require__(\"/node_modules/react\" );\n",
  ]
  .concat();
  assert_rewrite(
    "var React = __require ( \"/node_modules/react\" );\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn member_callee_paths_hoist_without_rewrite() {
  let expected = [
    concat!(
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "}\n",
    ),
    SHIM,
    "var x = mod.require(\"/node_modules/react\");\n",
  ]
  .concat();
  assert_rewrite(
    "var x = mod.require(\"/node_modules/react\");\n",
    "/node_modules/",
    &expected,
  );
}

#[test]
fn escaped_path_hoists_but_call_site_stays() {
  // Detection decodes the literal, substitution matches the raw text; an
  // escaped spelling of the prefix qualifies for hoisting yet no call text
  // can be targeted.
  let expected = [
    concat!(
      "import __cjs_import_react__ from \"/node_modules/react\";\n",
      "const __cjs_imports__ = {\n",
      "\t\"/node_modules/react\": __cjs_import_react__,\n",
      "}\n",
    ),
    SHIM,
    "var React = __require(\"\\x2Fnode_modules\\x2Freact\");\n",
  ]
  .concat();
  assert_rewrite(
    "var React = __require(\"\\x2Fnode_modules\\x2Freact\");\n",
    "/node_modules/",
    &expected,
  );
}
