//! Transform rule engine.
//!
//! Applies an ordered rule list to an already-coerced record, in place.
//! Rules run strictly in list order, so later rules see earlier results on
//! the same record. The language is arithmetic only: a rule touching a
//! string or date value is a type mismatch, not a silent coercion.
//!
//! Numeric semantics follow the spec documents banks actually ship:
//! integer lanes stay integer for `add`/`subtract`/`multiply`, mixed
//! int/float promotes to float, and `divide` is true division (always a
//! float, zero divisor fails).

use crate::error::{RuleError, RuleResult};
use crate::models::{Record, Value};
use crate::spec::{Op, Operand, Rule};

/// Apply every rule to the record, strictly in list order.
pub fn apply(record: &mut Record, rules: &[Rule]) -> RuleResult<()> {
    for rule in rules {
        apply_rule(record, rule)?;
    }
    Ok(())
}

fn apply_rule(record: &mut Record, rule: &Rule) -> RuleResult<()> {
    let field = rule.field();
    let current = record
        .get(field)
        .cloned()
        .ok_or_else(|| RuleError::MissingField(field.to_string()))?;
    let operand = resolve_operand(record, rule)?;
    let result = combine(field, rule.op(), &current, &operand)?;
    record.insert(field.to_string(), result);
    Ok(())
}

/// Turn the rule's third element into a value: literals as-is, field names
/// looked up on the record.
fn resolve_operand(record: &Record, rule: &Rule) -> RuleResult<Value> {
    match rule.operand() {
        Operand::Int(i) => Ok(Value::Int(*i)),
        Operand::Float(x) => Ok(Value::Float(*x)),
        Operand::Field(name) => record
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::MissingField(name.clone())),
    }
}

fn combine(field: &str, op: Op, lhs: &Value, rhs: &Value) -> RuleResult<Value> {
    let mismatch = |found: &'static str| RuleError::TypeMismatch {
        field: field.to_string(),
        op: op.name(),
        found,
    };
    if !lhs.is_numeric() {
        return Err(mismatch(lhs.type_name()));
    }
    if !rhs.is_numeric() {
        return Err(mismatch(rhs.type_name()));
    }

    if op == Op::Divide {
        return divide(field, lhs, rhs);
    }

    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(field, op, *a, *b),
        _ => {
            // as_float cannot fail: both sides are numeric here.
            let a = lhs.as_float().unwrap_or_default();
            let b = rhs.as_float().unwrap_or_default();
            let out = match op {
                Op::Add | Op::AddFields => a + b,
                Op::Subtract => a - b,
                Op::Multiply => a * b,
                Op::Divide => unreachable!("handled above"),
            };
            Ok(Value::Float(out))
        }
    }
}

fn int_op(field: &str, op: Op, a: i64, b: i64) -> RuleResult<Value> {
    let out = match op {
        Op::Add | Op::AddFields => a.checked_add(b),
        Op::Subtract => a.checked_sub(b),
        Op::Multiply => a.checked_mul(b),
        Op::Divide => unreachable!("handled before dispatch"),
    };
    out.map(Value::Int).ok_or_else(|| RuleError::Arithmetic {
        field: field.to_string(),
        message: "integer overflow".to_string(),
    })
}

/// True division: always a float, zero divisor fails in both lanes.
fn divide(field: &str, lhs: &Value, rhs: &Value) -> RuleResult<Value> {
    let a = lhs.as_float().unwrap_or_default();
    let b = rhs.as_float().unwrap_or_default();
    if b == 0.0 {
        return Err(RuleError::Arithmetic {
            field: field.to_string(),
            message: "division by zero".to_string(),
        });
    }
    Ok(Value::Float(a / b))
}
