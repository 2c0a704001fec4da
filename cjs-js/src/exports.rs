use crate::lit::decode_string_token;
use ahash::AHashSet;
use parse_js::ast::ClassOrObjectMemberKey;
use parse_js::ast::ClassOrObjectMemberValue;
use parse_js::ast::Node;
use parse_js::ast::ObjectMemberType;
use parse_js::ast::Syntax;
use parse_js::operator::OperatorName;
use parse_js::visit::JourneyControls;
use parse_js::visit::Visitor;

/// Walk `top` and collect the CommonJS export surface: names assigned onto
/// `exports`/`module.exports`, keys of an object literal assigned to
/// `module.exports` (plus `"default"` for the assignment itself), and names
/// registered through `Object.defineProperty`. The result is sorted and
/// duplicate-free.
pub(crate) fn analyze(top: &Node, code: &str) -> Vec<String> {
  let mut visitor = ExportVisitor::new(code);
  visitor.visit(top);
  visitor.into_sorted_names()
}

struct ExportVisitor<'a> {
  code: &'a str,
  exports: AHashSet<String>,
  unsafe_getters: AHashSet<String>,
  has_default: bool,
}

impl<'a> ExportVisitor<'a> {
  fn new(code: &'a str) -> ExportVisitor<'a> {
    Self {
      code,
      exports: AHashSet::new(),
      unsafe_getters: AHashSet::new(),
      has_default: false,
    }
  }

  /// A name in `unsafe_getters` never exports, no matter how often or where
  /// it was also added normally. The synthetic `default` joins the set after
  /// the purge, so it collapses with an explicit `default` export and is not
  /// suppressed by an unsafe getter of that name.
  fn into_sorted_names(mut self) -> Vec<String> {
    for name in &self.unsafe_getters {
      self.exports.remove(name);
    }
    if self.has_default {
      self.exports.insert("default".to_string());
    }
    let mut names: Vec<String> = self.exports.into_iter().collect();
    names.sort_unstable();
    names
  }

  fn is_exports_ident(node: &Node) -> bool {
    matches!(node.stx.as_ref(), Syntax::IdentifierExpr { name } if name == "exports")
  }

  fn is_module_ident(node: &Node) -> bool {
    matches!(node.stx.as_ref(), Syntax::IdentifierExpr { name } if name == "module")
  }

  fn is_object_ident(node: &Node) -> bool {
    matches!(node.stx.as_ref(), Syntax::IdentifierExpr { name } if name == "Object")
  }

  fn is_module_exports(node: &Node) -> bool {
    match node.stx.as_ref() {
      Syntax::MemberExpr { left, right, .. } => {
        Self::is_module_ident(left) && right.as_str() == "exports"
      }
      _ => false,
    }
  }

  // Decoded value of a string literal node, or None for any other node or an
  // empty string. The raw token text runs through the same decoder as direct
  // object keys, so escaped and plain spellings of a name collapse together.
  fn string_literal_value(&self, node: &Node) -> Option<String> {
    if !matches!(node.stx.as_ref(), Syntax::LiteralStringExpr { .. }) {
      return None;
    }
    let name = decode_string_token(&self.code[node.loc.0..node.loc.1]);
    if name.is_empty() {
      return None;
    }
    Some(name)
  }

  fn property_key_name(&self, key: &ClassOrObjectMemberKey) -> Option<String> {
    match key {
      ClassOrObjectMemberKey::Direct(raw) => {
        let name = decode_string_token(raw);
        if name.is_empty() {
          return None;
        }
        Some(name)
      }
      ClassOrObjectMemberKey::Computed(node) => self.string_literal_value(node),
    }
  }

  fn handle_assignment(&mut self, left: &Node, right: &Node) {
    match left.stx.as_ref() {
      Syntax::MemberExpr {
        left: object,
        right: member,
        ..
      } => {
        if Self::is_exports_ident(object) || Self::is_module_exports(object) {
          // exports.NAME = ... / module.exports.NAME = ...
          self.exports.insert(member.clone());
        } else if Self::is_module_ident(object) && member.as_str() == "exports" {
          // module.exports = ...
          self.has_default = true;
          if let Syntax::LiteralObjectExpr { members } = right.stx.as_ref() {
            self.extract_object_keys(members);
          }
        }
      }
      Syntax::ComputedMemberExpr { object, member, .. } => {
        // exports["NAME"] = ... / module.exports["NAME"] = ...
        if Self::is_exports_ident(object) || Self::is_module_exports(object) {
          if let Some(name) = self.string_literal_value(member) {
            self.exports.insert(name);
          }
        }
      }
      // A plain `exports = ...` rebinds the local variable and exports
      // nothing; its target parses as a pattern, not a member expression.
      _ => {}
    }
  }

  fn handle_call(&mut self, callee: &Node, arguments: &[Node]) {
    // Object.defineProperty(exports | module.exports, "NAME", { ... })
    let Syntax::MemberExpr { left, right, .. } = callee.stx.as_ref() else {
      return;
    };
    if !Self::is_object_ident(left) || right.as_str() != "defineProperty" {
      return;
    }
    if arguments.len() < 3 {
      return;
    }
    let Syntax::CallArg { value: target, .. } = arguments[0].stx.as_ref() else {
      return;
    };
    if !Self::is_exports_ident(target) && !Self::is_module_exports(target) {
      return;
    }
    let Syntax::CallArg { value: name_arg, .. } = arguments[1].stx.as_ref() else {
      return;
    };
    let Some(name) = self.string_literal_value(name_arg) else {
      return;
    };
    let Syntax::CallArg {
      value: descriptor, ..
    } = arguments[2].stx.as_ref()
    else {
      return;
    };
    let Syntax::LiteralObjectExpr { members } = descriptor.stx.as_ref() else {
      return;
    };
    if self.should_export_descriptor(members, &name) {
      self.exports.insert(name);
    }
  }

  fn should_export_descriptor(&mut self, members: &[Node], name: &str) -> bool {
    let mut has_getter = false;
    let mut has_value = false;
    let mut enumerable_false = false;
    for member in members {
      let Syntax::ObjectMember { typ } = member.stx.as_ref() else {
        continue;
      };
      match typ {
        ObjectMemberType::Valued { key, value } => match value {
          ClassOrObjectMemberValue::Getter { function } => {
            // Accessor form `get NAME() {}`, whatever NAME is.
            has_getter = true;
            if !self.is_safe_getter_function(function) {
              self.unsafe_getters.insert(name.to_string());
              return false;
            }
          }
          ClassOrObjectMemberValue::Method { function } => {
            // Only a method spelled exactly `get` acts as the getter; a
            // string key like `"get"() {}` does not.
            if matches!(key, ClassOrObjectMemberKey::Direct(k) if k == "get") {
              has_getter = true;
              if !self.is_safe_getter_function(function) {
                self.unsafe_getters.insert(name.to_string());
                return false;
              }
            }
          }
          ClassOrObjectMemberValue::Property { initializer } => {
            let Some(key_name) = self.property_key_name(key) else {
              continue;
            };
            match key_name.as_str() {
              "get" => {
                has_getter = true;
                if !self.is_safe_getter_value(initializer.as_ref()) {
                  self.unsafe_getters.insert(name.to_string());
                  return false;
                }
              }
              "value" => has_value = true,
              "enumerable" => {
                if let Some(init) = initializer {
                  if matches!(init.stx.as_ref(), Syntax::LiteralBooleanExpr { value: false }) {
                    enumerable_false = true;
                  }
                }
              }
              _ => {}
            }
          }
          ClassOrObjectMemberValue::Setter { .. } => {}
        },
        ObjectMemberType::Shorthand { identifier } => {
          let Syntax::IdentifierExpr { name: ident } = identifier.stx.as_ref() else {
            continue;
          };
          match ident.as_str() {
            // A bare `get` reference cannot be statically resolved.
            "get" => {
              self.unsafe_getters.insert(name.to_string());
              return false;
            }
            "value" => has_value = true,
            _ => {}
          }
        }
        ObjectMemberType::Rest { .. } => {}
      }
    }
    if self.unsafe_getters.contains(name) {
      self.exports.remove(name);
      return false;
    }
    if has_getter && enumerable_false {
      return false;
    }
    has_value || has_getter
  }

  // A getter is safe when its body does nothing but hand back an existing
  // binding: exactly one meaningful statement, a `return` of an identifier
  // or member access.
  fn is_safe_getter_function(&self, function: &Node) -> bool {
    let Syntax::Function {
      arrow: false, body, ..
    } = function.stx.as_ref()
    else {
      return false;
    };
    let Syntax::FunctionBody { body } = body.stx.as_ref() else {
      return false;
    };
    let meaningful: Vec<&Node> = body
      .iter()
      .filter(|stmt| !matches!(stmt.stx.as_ref(), Syntax::EmptyStmt {}))
      .collect();
    let [stmt] = meaningful.as_slice() else {
      return false;
    };
    let Syntax::ReturnStmt { value: Some(value) } = stmt.stx.as_ref() else {
      return false;
    };
    matches!(
      value.stx.as_ref(),
      Syntax::IdentifierExpr { .. } | Syntax::MemberExpr { .. } | Syntax::ComputedMemberExpr { .. }
    )
  }

  fn is_safe_getter_value(&self, initializer: Option<&Node>) -> bool {
    let Some(init) = initializer else {
      return false;
    };
    let Syntax::FunctionExpr { function, .. } = init.stx.as_ref() else {
      return false;
    };
    self.is_safe_getter_function(function)
  }

  fn extract_object_keys(&mut self, members: &[Node]) {
    for member in members {
      let Syntax::ObjectMember { typ } = member.stx.as_ref() else {
        continue;
      };
      match typ {
        ObjectMemberType::Valued { key, .. } => {
          if let Some(name) = self.property_key_name(key) {
            self.exports.insert(name);
          }
        }
        ObjectMemberType::Shorthand { identifier } => {
          if let Syntax::IdentifierExpr { name } = identifier.stx.as_ref() {
            self.exports.insert(name.clone());
          }
        }
        ObjectMemberType::Rest { .. } => {}
      }
    }
  }
}

impl<'a> Visitor for ExportVisitor<'a> {
  fn on_syntax_down(&mut self, node: &Node, _ctl: &mut JourneyControls) {
    match node.stx.as_ref() {
      Syntax::BinaryExpr {
        operator: OperatorName::Assignment,
        left,
        right,
        ..
      } => {
        self.handle_assignment(left, right);
      }
      Syntax::CallExpr {
        callee, arguments, ..
      } => {
        self.handle_call(callee, arguments);
      }
      _ => {}
    }
  }
}
