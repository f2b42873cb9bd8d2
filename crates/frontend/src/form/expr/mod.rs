//! Expression language behind `eval:` dependencies
//!
//! A small script subset evaluated against the document snapshot: literals,
//! `doc` / `parent` member and index access, arithmetic, comparison
//! (loose and strict equality), `!`, `&&` / `||` returning an operand,
//! the ternary operator, list literals, a few string/list methods
//! (`includes`, `indexOf`, `startsWith`, `endsWith`, `trim`, ...) and the
//! helpers `in_list`, `cint`, `flt`, `cstr`, `is_null`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let doc = json!({"qty": 3, "status": "Open"});
//! let scope = Scope { doc: &doc, parent: &Value::Null };
//! let v = eval_expression("doc.qty > 0 && doc.status === 'Open'", &scope)?;
//! assert_eq!(v, json!(true));
//! ```

mod ast;
mod eval;
mod parser;
mod token;

pub use eval::Scope;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: usize },
    #[error("unexpected token {token} at {pos}")]
    UnexpectedToken { token: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("{0} is not defined")]
    UnknownIdentifier(String),
    #[error("{0} is not a function")]
    UnknownFunction(String),
    #[error("expression is not callable")]
    NotCallable,
    #[error("{name} expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("cannot read property '{0}' of null")]
    NullAccess(String),
}

/// Parsed expression, reusable across evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program(ast::Expr);

impl Program {
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        let tokens = token::tokenize(source)?;
        parser::parse_tokens(&tokens, source.len()).map(Self)
    }

    pub fn run(&self, scope: &Scope<'_>) -> Result<Value, ExprError> {
        eval::evaluate(&self.0, scope)
    }
}

pub fn eval_expression(source: &str, scope: &Scope<'_>) -> Result<Value, ExprError> {
    Program::compile(source)?.run(scope)
}
