//! Expression compilation and invocation.
//!
//! `compile` applies the grammar ladder from the module docs and produces a
//! [`CompiledExpr`]; `invoke` runs it against the optional last HTTP result.
//! Everything an expression can see is passed in at invocation time, so a
//! compiled expression holds no references into the engine.

use super::parser::{self, Expr, Root, Segment};
use super::{util, ExprError};
use crate::models::HttpResult;
use serde_json::{Number, Value};

/// A binding expression compiled against the restricted grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledExpr {
    /// A literal constant (`true`, `"Bruno"`, `42`).
    Constant(Value),
    /// A parsed expression tree evaluated at invocation time.
    Program(Expr),
}

/// Compiles `expr` into an invocable form.
///
/// Returns `Ok(None)` for an empty (whitespace-only) expression - the
/// "plain passthrough" case where the binding's value is read straight from
/// the session. The grammar steps are checked in order: boolean keyword,
/// double-quoted string, numeric literal, then the expression language.
///
/// # Examples
///
/// ```
/// use rest_runner::expr::compile;
///
/// assert!(compile("").unwrap().is_none());
/// assert!(compile("\"Bruno\"").unwrap().is_some());
/// assert!(compile("$res.data.id").unwrap().is_some());
/// assert!(compile("not valid js(((").is_err());
/// ```
pub fn compile(expr: &str) -> Result<Option<CompiledExpr>, ExprError> {
    let expr = expr.trim();

    if expr.is_empty() {
        return Ok(None);
    }
    if expr == "true" {
        return Ok(Some(CompiledExpr::Constant(Value::Bool(true))));
    }
    if expr == "false" {
        return Ok(Some(CompiledExpr::Constant(Value::Bool(false))));
    }
    if expr.len() >= 2 && expr.starts_with('"') && expr.ends_with('"') {
        // Only the surrounding quotes are stripped; inner quotes survive.
        let inner = &expr[1..expr.len() - 1];
        return Ok(Some(CompiledExpr::Constant(Value::String(
            inner.to_string(),
        ))));
    }
    if let Some(number) = parse_numeric_literal(expr) {
        return Ok(Some(CompiledExpr::Constant(Value::Number(number))));
    }

    let ast = parser::parse(expr)?;
    Ok(Some(CompiledExpr::Program(ast)))
}

fn parse_numeric_literal(expr: &str) -> Option<Number> {
    if let Ok(int) = expr.parse::<i64>() {
        return Some(Number::from(int));
    }
    expr.parse::<f64>().ok().and_then(Number::from_f64)
}

impl CompiledExpr {
    /// Runs the compiled expression.
    ///
    /// `res` is the last HTTP result, present only for AFTER_RESPONSE
    /// evaluation. A path rooted at `$res` when no result is bound is an
    /// evaluation error; the safe `get` helper yields `null` instead.
    pub fn invoke(&self, res: Option<&HttpResult>) -> Result<Value, ExprError> {
        match self {
            CompiledExpr::Constant(value) => Ok(value.clone()),
            CompiledExpr::Program(ast) => {
                let res_value = res.map(HttpResult::to_value);
                eval_expr(ast, res_value.as_ref())
            }
        }
    }
}

fn eval_expr(expr: &Expr, res: Option<&Value>) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path { root, segments } => {
            let start = resolve_root(root, res)?;
            walk_segments(start, segments)
        }
        Expr::Call {
            name,
            args,
            segments,
        } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_arg(arg, res)?);
            }
            let result = util::call(name, &values)?;
            walk_segments(result, segments)
        }
    }
}

// Call arguments resolve an unbound `$res` to null rather than failing, so
// the safe helpers can be handed the response unconditionally.
fn eval_arg(expr: &Expr, res: Option<&Value>) -> Result<Value, ExprError> {
    match expr {
        Expr::Path {
            root: Root::Response,
            segments,
        } if segments.is_empty() => Ok(res.cloned().unwrap_or(Value::Null)),
        other => eval_expr(other, res),
    }
}

fn resolve_root(root: &Root, res: Option<&Value>) -> Result<Value, ExprError> {
    match root {
        Root::Response => res
            .cloned()
            .ok_or_else(|| ExprError::Eval("'$res' is not defined".to_string())),
        Root::Name(name) => Err(ExprError::Eval(format!("'{}' is not defined", name))),
    }
}

fn walk_segments(start: Value, segments: &[Segment]) -> Result<Value, ExprError> {
    let mut current = start;
    for segment in segments {
        current = match (&current, segment) {
            (Value::Null, Segment::Key(key)) => {
                return Err(ExprError::Eval(format!(
                    "cannot access property '{}' of null",
                    key
                )))
            }
            (Value::Null, Segment::Index(index)) => {
                return Err(ExprError::Eval(format!(
                    "cannot access index {} of null",
                    index
                )))
            }
            (Value::Object(map), Segment::Key(key)) => {
                map.get(key).cloned().unwrap_or(Value::Null)
            }
            (Value::Array(items), Segment::Index(index)) => {
                items.get(*index).cloned().unwrap_or(Value::Null)
            }
            // Any other access misses silently, like property access on a
            // primitive in the source notation this grammar replaces.
            _ => Value::Null,
        };
    }
    Ok(current)
}
