use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use crate::criteria::ast::{Criteria, Filter, FilterOperator, FilterValue};
use crate::error::CriteriaError;

/// Check a record against a criteria tree. A tree with no filters anywhere
/// imposes no constraint and is always valid.
pub fn validate_object(object: &Value, criteria: &Criteria) -> Result<bool, CriteriaError> {
    if !criteria.has_filters() {
        return Ok(true);
    }
    match criteria {
        Criteria::And { left, right } => {
            let left_ok = validate_object(object, left)?;
            let right_ok = validate_object(object, right)?;
            Ok(left_ok && right_ok)
        }
        Criteria::Or { left, right } => {
            let left_ok = validate_object(object, left)?;
            let right_ok = validate_object(object, right)?;
            Ok(left_ok || right_ok)
        }
        Criteria::Not { inner } => Ok(!validate_object(object, inner)?),
        Criteria::Leaf { filters, .. } => {
            for filter in filters {
                if !evaluate_filter(field_value(object, &filter.field), filter)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

/// Like [`validate_object`], but also collects a message for every failed
/// filter. For And both children's messages are concatenated; for Or the
/// right child's messages are reported only when the left child also failed;
/// Not negates the verdict and passes the child's messages through.
pub fn validate_object_with_messages(
    object: &Value,
    criteria: &Criteria,
) -> Result<(bool, Vec<String>), CriteriaError> {
    if !criteria.has_filters() {
        return Ok((true, Vec::new()));
    }
    match criteria {
        Criteria::And { left, right } => {
            let (left_ok, mut messages) = validate_object_with_messages(object, left)?;
            let (right_ok, right_messages) = validate_object_with_messages(object, right)?;
            messages.extend(right_messages);
            Ok((left_ok && right_ok, messages))
        }
        Criteria::Or { left, right } => {
            let (left_ok, left_messages) = validate_object_with_messages(object, left)?;
            let (right_ok, right_messages) = validate_object_with_messages(object, right)?;
            let messages = if left_ok { left_messages } else { right_messages };
            Ok((left_ok || right_ok, messages))
        }
        Criteria::Not { inner } => {
            let (ok, messages) = validate_object_with_messages(object, inner)?;
            Ok((!ok, messages))
        }
        Criteria::Leaf { filters, .. } => {
            let mut messages = Vec::new();
            for filter in filters {
                if !evaluate_filter(field_value(object, &filter.field), filter)? {
                    messages.push(failure_message(filter));
                }
            }
            Ok((messages.is_empty(), messages))
        }
    }
}

fn field_value<'a>(object: &'a Value, field: &str) -> &'a Value {
    object.get(field).unwrap_or(&Value::Null)
}

fn failure_message(filter: &Filter) -> String {
    match &filter.message {
        Some(message) => message.clone(),
        None => format!("Field '{}' failed {} check", filter.field, filter.operator),
    }
}

/// Evaluate one filter against a record value (a missing field reads as
/// `Null`). Fails on a malformed BETWEEN operand and on operators the
/// evaluator does not support.
pub fn evaluate_filter(value: &Value, filter: &Filter) -> Result<bool, CriteriaError> {
    let passed = match filter.operator {
        // Null checks are decided before the general null guard below.
        FilterOperator::IsNull => value.is_null(),
        FilterOperator::IsNotNull => !value.is_null(),
        _ if value.is_null() => false,

        FilterOperator::Equal => compare(value, &filter.value) == Some(Ordering::Equal),
        FilterOperator::NotEqual => compare(value, &filter.value) != Some(Ordering::Equal),
        FilterOperator::Greater => compare(value, &filter.value) == Some(Ordering::Greater),
        FilterOperator::GreaterEqual => matches!(
            compare(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Less => compare(value, &filter.value) == Some(Ordering::Less),
        FilterOperator::LessEqual => matches!(
            compare(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),

        FilterOperator::Like => string_op(value, &filter.value, |s, pattern| like_match(s, pattern)),
        FilterOperator::NotLike => {
            string_op(value, &filter.value, |s, pattern| !like_match(s, pattern))
        }
        FilterOperator::Contains => string_op(value, &filter.value, |s, needle| s.contains(needle)),
        FilterOperator::NotContains => {
            string_op(value, &filter.value, |s, needle| !s.contains(needle))
        }
        FilterOperator::StartsWith => {
            string_op(value, &filter.value, |s, prefix| s.starts_with(prefix))
        }
        FilterOperator::NotStartsWith => {
            string_op(value, &filter.value, |s, prefix| !s.starts_with(prefix))
        }
        FilterOperator::EndsWith => {
            string_op(value, &filter.value, |s, suffix| s.ends_with(suffix))
        }
        FilterOperator::NotEndsWith => {
            string_op(value, &filter.value, |s, suffix| !s.ends_with(suffix))
        }

        FilterOperator::Between => in_range(value, filter)?,
        FilterOperator::NotBetween => !in_range(value, filter)?,

        FilterOperator::In | FilterOperator::NotIn => {
            return Err(CriteriaError::UnsupportedOperator(
                filter.operator.to_string(),
            ))
        }
    };
    Ok(passed)
}

/// String operators apply only when both the record value and the filter
/// value are strings; any other shape is a plain failure, not an error.
fn string_op(value: &Value, operand: &FilterValue, test: impl Fn(&str, &str) -> bool) -> bool {
    match (value, operand) {
        (Value::String(s), FilterValue::String(o)) => test(s, o),
        _ => false,
    }
}

fn in_range(value: &Value, filter: &Filter) -> Result<bool, CriteriaError> {
    let FilterValue::List(bounds) = &filter.value else {
        return Err(CriteriaError::InvalidOperand {
            operator: filter.operator,
        });
    };
    let [low, high] = bounds.as_slice() else {
        return Err(CriteriaError::InvalidOperand {
            operator: filter.operator,
        });
    };
    let above_low = matches!(compare(value, low), Some(Ordering::Greater | Ordering::Equal));
    let below_high = matches!(compare(value, high), Some(Ordering::Less | Ordering::Equal));
    Ok(above_low && below_high)
}

// SQL-style pattern: '%' matches any run, '_' exactly one character, the rest
// is literal. Anchored at both ends.
fn like_match(text: &str, pattern: &str) -> bool {
    let mut regex = String::with_capacity(pattern.len() + 2);
    let mut literal = String::new();
    regex.push('^');
    for ch in pattern.chars() {
        if ch == '%' || ch == '_' {
            if !literal.is_empty() {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
            }
            regex.push_str(if ch == '%' { ".*" } else { "." });
        } else {
            literal.push(ch);
        }
    }
    if !literal.is_empty() {
        regex.push_str(&regex::escape(&literal));
    }
    regex.push('$');

    Regex::new(&regex).map_or(false, |re| re.is_match(text))
}

fn compare(value: &Value, other: &FilterValue) -> Option<Ordering> {
    match (value, other) {
        (Value::Number(a), FilterValue::Number(b)) => a.as_f64()?.partial_cmp(b),
        (Value::String(a), FilterValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Compare two record values, returning an ordering when the types are
/// comparable: numbers as f64, strings lexicographically, false < true.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
