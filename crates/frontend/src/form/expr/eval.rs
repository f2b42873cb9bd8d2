use super::ast::{BinaryOp, Expr, UnaryOp};
use super::ExprError;
use crate::shared::value::{
    cint, flt, format_number, is_null, js_truthy, number, to_display_string, to_number,
};
use serde_json::Value;

/// Names visible to an expression.
pub struct Scope<'a> {
    pub doc: &'a Value,
    pub parent: &'a Value,
}

pub(super) fn evaluate(expr: &Expr, scope: &Scope<'_>) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Ident(name) => match name.as_str() {
            "doc" => Ok(scope.doc.clone()),
            "parent" => Ok(scope.parent.clone()),
            _ => Err(ExprError::UnknownIdentifier(name.clone())),
        },
        Expr::Array(items) => items
            .iter()
            .map(|e| evaluate(e, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Member(object, name) => {
            let object = evaluate(object, scope)?;
            member(&object, name)
        }
        Expr::Index(object, index) => {
            let object = evaluate(object, scope)?;
            let index = evaluate(index, scope)?;
            Ok(match (&object, &index) {
                (Value::Array(items), _) => {
                    let i = to_number(&index);
                    if i >= 0.0 && i.fract() == 0.0 {
                        items.get(i as usize).cloned().unwrap_or(Value::Null)
                    } else {
                        Value::Null
                    }
                }
                _ => member(&object, &to_display_string(&index))?,
            })
        }
        Expr::Call(callee, args) => {
            let args = args
                .iter()
                .map(|e| evaluate(e, scope))
                .collect::<Result<Vec<_>, _>>()?;
            match callee.as_ref() {
                Expr::Ident(name) => call_function(name, &args),
                Expr::Member(object, method) => {
                    let object = evaluate(object, scope)?;
                    call_method(&object, method, &args)
                }
                _ => Err(ExprError::NotCallable),
            }
        }
        Expr::Unary(op, operand) => {
            let v = evaluate(operand, scope)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!js_truthy(&v)),
                UnaryOp::Neg => number(-to_number(&v)),
            })
        }
        Expr::Binary(BinaryOp::And, left, right) => {
            let l = evaluate(left, scope)?;
            if js_truthy(&l) {
                evaluate(right, scope)
            } else {
                Ok(l)
            }
        }
        Expr::Binary(BinaryOp::Or, left, right) => {
            let l = evaluate(left, scope)?;
            if js_truthy(&l) {
                Ok(l)
            } else {
                evaluate(right, scope)
            }
        }
        Expr::Binary(op, left, right) => {
            let l = evaluate(left, scope)?;
            let r = evaluate(right, scope)?;
            Ok(binary(*op, &l, &r))
        }
        Expr::Conditional(test, then, otherwise) => {
            if js_truthy(&evaluate(test, scope)?) {
                evaluate(then, scope)
            } else {
                evaluate(otherwise, scope)
            }
        }
    }
}

fn member(object: &Value, name: &str) -> Result<Value, ExprError> {
    Ok(match object {
        Value::Null => return Err(ExprError::NullAccess(name.to_string())),
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
        Value::Array(items) if name == "length" => number(items.len() as f64),
        Value::String(s) if name == "length" => number(s.chars().count() as f64),
        _ => Value::Null,
    })
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if l.is_string() || r.is_string() {
                Value::String(format!("{}{}", to_display_string(l), to_display_string(r)))
            } else {
                number(to_number(l) + to_number(r))
            }
        }
        BinaryOp::Sub => number(to_number(l) - to_number(r)),
        BinaryOp::Mul => number(to_number(l) * to_number(r)),
        BinaryOp::Div => number(to_number(l) / to_number(r)),
        BinaryOp::Rem => number(to_number(l) % to_number(r)),
        BinaryOp::Lt => Value::Bool(compare(l, r, |o| o.is_lt())),
        BinaryOp::Le => Value::Bool(compare(l, r, |o| o.is_le())),
        BinaryOp::Gt => Value::Bool(compare(l, r, |o| o.is_gt())),
        BinaryOp::Ge => Value::Bool(compare(l, r, |o| o.is_ge())),
        BinaryOp::LooseEq => Value::Bool(loose_eq(l, r)),
        BinaryOp::LooseNe => Value::Bool(!loose_eq(l, r)),
        BinaryOp::StrictEq => Value::Bool(strict_eq(l, r)),
        BinaryOp::StrictNe => Value::Bool(!strict_eq(l, r)),
        BinaryOp::And | BinaryOp::Or => Value::Null,
    }
}

fn compare(l: &Value, r: &Value, test: impl Fn(std::cmp::Ordering) -> bool) -> bool {
    if let (Value::String(a), Value::String(b)) = (l, r) {
        return test(a.cmp(b));
    }
    to_number(l)
        .partial_cmp(&to_number(r))
        .map(test)
        .unwrap_or(false)
}

fn strict_eq(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => l == r,
    }
}

fn loose_eq(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => l == r,
        (Value::Array(_) | Value::Object(_), _) => to_display_string(l) == to_display_string(r),
        (_, Value::Array(_) | Value::Object(_)) => to_display_string(l) == to_display_string(r),
        _ => to_number(l) == to_number(r),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), ExprError> {
    if args.len() < expected {
        return Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn call_function(name: &str, args: &[Value]) -> Result<Value, ExprError> {
    match name {
        "in_list" => {
            arity(name, args, 2)?;
            Ok(Value::Bool(match &args[0] {
                Value::Array(items) => items.iter().any(|i| strict_eq(i, &args[1])),
                _ => false,
            }))
        }
        "cint" => {
            arity(name, args, 1)?;
            Ok(number(cint(&args[0]) as f64))
        }
        "flt" => {
            arity(name, args, 1)?;
            Ok(number(flt(&args[0])))
        }
        "cstr" => {
            arity(name, args, 1)?;
            Ok(Value::String(to_display_string(&args[0])))
        }
        "is_null" => {
            arity(name, args, 1)?;
            Ok(Value::Bool(is_null(&args[0])))
        }
        _ => Err(ExprError::UnknownFunction(name.to_string())),
    }
}

fn call_method(object: &Value, method: &str, args: &[Value]) -> Result<Value, ExprError> {
    match (object, method) {
        (Value::Array(items), "includes") => {
            arity(method, args, 1)?;
            Ok(Value::Bool(items.iter().any(|i| strict_eq(i, &args[0]))))
        }
        (Value::Array(items), "indexOf") => {
            arity(method, args, 1)?;
            let found = items.iter().position(|i| strict_eq(i, &args[0]));
            Ok(number(found.map(|i| i as f64).unwrap_or(-1.0)))
        }
        (Value::String(s), "includes") => {
            arity(method, args, 1)?;
            Ok(Value::Bool(s.contains(&to_display_string(&args[0]))))
        }
        (Value::String(s), "indexOf") => {
            arity(method, args, 1)?;
            let needle = to_display_string(&args[0]);
            let found = s
                .find(&needle)
                .map(|byte| s[..byte].chars().count() as f64);
            Ok(number(found.unwrap_or(-1.0)))
        }
        (Value::String(s), "startsWith") => {
            arity(method, args, 1)?;
            Ok(Value::Bool(s.starts_with(&to_display_string(&args[0]))))
        }
        (Value::String(s), "endsWith") => {
            arity(method, args, 1)?;
            Ok(Value::Bool(s.ends_with(&to_display_string(&args[0]))))
        }
        (Value::String(s), "trim") => Ok(Value::String(s.trim().to_string())),
        (Value::String(s), "toLowerCase") => Ok(Value::String(s.to_lowercase())),
        (Value::String(s), "toUpperCase") => Ok(Value::String(s.to_uppercase())),
        (Value::Number(n), "toString") => Ok(Value::String(format_number(
            n.as_f64().unwrap_or(f64::NAN),
        ))),
        _ => Err(ExprError::UnknownFunction(method.to_string())),
    }
}
