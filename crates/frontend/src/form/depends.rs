//! Dependency evaluation for `depends_on` style expressions
//!
//! Supported forms: a boolean, a closure, `eval:<expression>` evaluated
//! against `doc` / `parent`, `fn:<name>` resolved through the form's script
//! handlers, and a bare fieldname tested for a truthy value (lists: non-empty).

use super::expr::{eval_expression, ExprError, Scope};
use crate::shared::value::{is_truthy, js_truthy};
use contracts::shared::metadata::DependsOn;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DependsError {
    #[error("Invalid depends_on expression: {expression} ({reason})")]
    InvalidExpression { expression: String, reason: ExprError },
}

/// Resolves `fn:` dependencies. `None` means the result is not known yet.
pub trait ScriptHook {
    fn call(&self, function: &str) -> Option<Value>;
}

pub struct DependsContext<'a> {
    pub doc: &'a Value,
    /// Owning document; absent at top level.
    pub parent: Option<&'a Value>,
    pub scripts: Option<&'a dyn ScriptHook>,
}

impl<'a> DependsContext<'a> {
    pub fn new(doc: &'a Value) -> Self {
        Self {
            doc,
            parent: None,
            scripts: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<&'a Value>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_scripts(mut self, scripts: Option<&'a dyn ScriptHook>) -> Self {
        self.scripts = scripts;
        self
    }
}

/// Evaluate a dependency; `Ok(None)` when a script result is still pending.
pub fn evaluate_depends_on_value(
    expression: &DependsOn,
    cx: &DependsContext<'_>,
) -> Result<Option<bool>, DependsError> {
    match expression {
        DependsOn::Flag(flag) => Ok(Some(*flag)),
        DependsOn::Callback(callback) => Ok(Some(js_truthy(&callback.call(cx.doc)))),
        DependsOn::Expression(text) => evaluate_text(text, cx),
    }
}

fn evaluate_text(text: &str, cx: &DependsContext<'_>) -> Result<Option<bool>, DependsError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Some(true));
    }

    if let Some(body) = text.strip_prefix("eval:") {
        let parent = cx.parent.unwrap_or(&Value::Null);
        let value = eval_expression(
            body,
            &Scope {
                doc: cx.doc,
                parent,
            },
        )
        .map_err(|reason| DependsError::InvalidExpression {
            expression: text.to_string(),
            reason,
        })?;

        // Rows of a child table never carry submit state of their own.
        if parent.get("istable").is_some_and(is_truthy) && body.contains("is_submittable") {
            return Ok(Some(true));
        }
        return Ok(Some(js_truthy(&value)));
    }

    if let Some(function) = text.strip_prefix("fn:") {
        return Ok(match cx.scripts {
            Some(scripts) => scripts.call(function.trim()).map(|v| js_truthy(&v)),
            None => Some(false),
        });
    }

    Ok(Some(cx.doc.get(text).is_some_and(is_truthy)))
}

/// Convenience wrapper without script handlers; pending resolves to false.
pub fn evaluate(
    expression: &DependsOn,
    doc: &Value,
    parent: Option<&Value>,
) -> Result<bool, DependsError> {
    let cx = DependsContext::new(doc).with_parent(parent);
    Ok(evaluate_depends_on_value(expression, &cx)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_bare_fieldname_truthiness() {
        let doc = json!({"customer": "ACME", "items": [], "rows": [{"a": 1}], "qty": 0});
        assert!(evaluate(&"customer".into(), &doc, None).unwrap());
        assert!(!evaluate(&"items".into(), &doc, None).unwrap());
        assert!(evaluate(&"rows".into(), &doc, None).unwrap());
        assert!(!evaluate(&"qty".into(), &doc, None).unwrap());
        assert!(!evaluate(&"missing".into(), &doc, None).unwrap());
    }

    #[test]
    fn test_eval_expression_against_doc() {
        let doc = json!({"qty": 5});
        assert!(evaluate(&"eval:doc.qty > 0".into(), &doc, None).unwrap());
        let doc = json!({"qty": 0});
        assert!(!evaluate(&"eval:doc.qty > 0".into(), &doc, None).unwrap());
    }

    #[test]
    fn test_flag_and_callback() {
        let doc = json!({"a": 1});
        assert!(evaluate(&DependsOn::Flag(true), &doc, None).unwrap());
        assert!(!evaluate(&DependsOn::Flag(false), &doc, None).unwrap());
        let cb = DependsOn::callback(|doc| doc["a"].clone());
        assert!(evaluate(&cb, &doc, None).unwrap());
    }

    #[test]
    fn test_invalid_expression_is_reported() {
        let err = evaluate(&"eval:doc.qty >".into(), &json!({}), None).unwrap_err();
        assert!(err.to_string().starts_with("Invalid depends_on expression"));
    }

    #[test]
    fn test_child_table_submittable_override() {
        let row = json!({"qty": 1});
        let parent = json!({"istable": 1, "is_submittable": 0});
        assert!(evaluate(&"eval:parent.is_submittable".into(), &row, Some(&parent)).unwrap());

        let parent = json!({"is_submittable": 0});
        assert!(!evaluate(&"eval:parent.is_submittable".into(), &row, Some(&parent)).unwrap());
    }

    struct Scripts {
        calls: RefCell<Vec<String>>,
        result: Option<Value>,
    }

    impl ScriptHook for Scripts {
        fn call(&self, function: &str) -> Option<Value> {
            self.calls.borrow_mut().push(function.to_string());
            self.result.clone()
        }
    }

    #[test]
    fn test_fn_dependency_uses_script_hook() {
        let doc = json!({});
        let scripts = Scripts {
            calls: RefCell::new(vec![]),
            result: Some(json!(true)),
        };
        let cx = DependsContext::new(&doc).with_scripts(Some(&scripts));
        assert_eq!(
            evaluate_depends_on_value(&"fn:show_discount".into(), &cx),
            Ok(Some(true))
        );
        assert_eq!(*scripts.calls.borrow(), vec!["show_discount"]);

        let pending = Scripts {
            calls: RefCell::new(vec![]),
            result: None,
        };
        let cx = DependsContext::new(&doc).with_scripts(Some(&pending));
        assert_eq!(evaluate_depends_on_value(&"fn:later".into(), &cx), Ok(None));

        let cx = DependsContext::new(&doc);
        assert_eq!(evaluate_depends_on_value(&"fn:later".into(), &cx), Ok(Some(false)));
    }
}
