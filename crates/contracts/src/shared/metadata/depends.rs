//! Dependency expressions attached to docfields
//!
//! Metadata coming over the wire carries either a boolean or a string
//! (`eval:...`, `fn:...` or a bare fieldname). Client code may additionally
//! attach a closure, which is never serialized.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Closure form of a dependency: receives the document snapshot.
#[derive(Clone)]
pub struct DependsCallback(pub Rc<dyn Fn(&Value) -> Value>);

impl DependsCallback {
    pub fn new(f: impl Fn(&Value) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, doc: &Value) -> Value {
        (self.0)(doc)
    }
}

impl fmt::Debug for DependsCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DependsCallback(..)")
    }
}

impl PartialEq for DependsCallback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    Flag(bool),
    Expression(String),
    #[serde(skip)]
    Callback(DependsCallback),
}

impl DependsOn {
    pub fn expr(text: impl Into<String>) -> Self {
        Self::Expression(text.into())
    }

    pub fn callback(f: impl Fn(&Value) -> Value + 'static) -> Self {
        Self::Callback(DependsCallback::new(f))
    }

    /// Empty expression strings mean "no dependency".
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Expression(text) if text.trim().is_empty())
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Expression(text) => text.clone(),
            Self::Callback(_) => "<callback>".to_string(),
        }
    }
}

impl From<&str> for DependsOn {
    fn from(text: &str) -> Self {
        Self::Expression(text.to_string())
    }
}

impl From<bool> for DependsOn {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_string_and_bool() {
        let expr: DependsOn = serde_json::from_value(json!("eval:doc.qty > 0")).unwrap();
        assert_eq!(expr, DependsOn::expr("eval:doc.qty > 0"));

        let flag: DependsOn = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(flag, DependsOn::Flag(true));
    }

    #[test]
    fn test_callback_equality_is_identity() {
        let a = DependsOn::callback(|_| json!(true));
        let b = a.clone();
        let c = DependsOn::callback(|_| json!(true));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_blank_expression() {
        assert!(DependsOn::expr("  ").is_blank());
        assert!(!DependsOn::expr("qty").is_blank());
    }
}
