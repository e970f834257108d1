use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};

use crate::answer::{AnswerValue, Quantity};
use crate::spec::EnableOperator;

/// Decides whether a set of observed answers satisfies one condition
/// against a target value.
pub type Checker = fn(&[&AnswerValue], &AnswerValue) -> bool;

/// Looks up the checker for a raw FHIR operator code. Unknown codes fail
/// closed: the returned checker is constant false and the miss is logged,
/// never raised.
pub fn checker(operator: &str) -> Checker {
    match EnableOperator::from_code(operator) {
        Some(EnableOperator::Exists) => check_exists,
        Some(EnableOperator::Equal) => check_equal,
        Some(EnableOperator::NotEqual) => check_not_equal,
        Some(EnableOperator::Greater) => check_greater,
        Some(EnableOperator::Less) => check_less,
        Some(EnableOperator::GreaterOrEqual) => check_greater_or_equal,
        Some(EnableOperator::LessOrEqual) => check_less_or_equal,
        None => {
            log::warn!("unknown enable-when operator `{operator}`");
            check_never
        }
    }
}

impl EnableOperator {
    /// Applies this operator to the observed answer set. Multi-answer items
    /// use any-observed-value-satisfies semantics; ordering operators fail
    /// (false) on incomparable kinds.
    pub fn check(self, observed: &[&AnswerValue], target: &AnswerValue) -> bool {
        match self {
            EnableOperator::Exists => check_exists(observed, target),
            EnableOperator::Equal => check_equal(observed, target),
            EnableOperator::NotEqual => check_not_equal(observed, target),
            EnableOperator::Greater => check_greater(observed, target),
            EnableOperator::Less => check_less(observed, target),
            EnableOperator::GreaterOrEqual => check_greater_or_equal(observed, target),
            EnableOperator::LessOrEqual => check_less_or_equal(observed, target),
        }
    }
}

fn check_exists(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    let expected = match target {
        AnswerValue::Boolean(flag) => *flag,
        _ => true,
    };
    !observed.is_empty() == expected
}

fn check_equal(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    observed.iter().any(|value| *value == target)
}

fn check_not_equal(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    // An unanswered question fails the condition; only `exists` can match
    // on absence.
    !observed.is_empty() && !observed.iter().any(|value| *value == target)
}

fn check_greater(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    check_ordering(observed, target, |ordering| ordering == Ordering::Greater)
}

fn check_less(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    check_ordering(observed, target, |ordering| ordering == Ordering::Less)
}

fn check_greater_or_equal(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    check_ordering(observed, target, |ordering| ordering != Ordering::Less)
}

fn check_less_or_equal(observed: &[&AnswerValue], target: &AnswerValue) -> bool {
    check_ordering(observed, target, |ordering| ordering != Ordering::Greater)
}

fn check_never(_observed: &[&AnswerValue], _target: &AnswerValue) -> bool {
    false
}

fn check_ordering(
    observed: &[&AnswerValue],
    target: &AnswerValue,
    accepts: fn(Ordering) -> bool,
) -> bool {
    observed
        .iter()
        .any(|value| compare_values(value, target).is_some_and(accepts))
}

/// Compares two answer values after coercing both sides to a common
/// representation. Integers, decimals, and quantities (with agreeing
/// units) compare numerically; dates and dateTimes temporally; strings
/// lexicographically. Everything else is incomparable and yields `None`.
pub fn compare_values(left: &AnswerValue, right: &AnswerValue) -> Option<Ordering> {
    if let (Some(left), Some(right)) = (numeric(left), numeric(right)) {
        return left.partial_cmp(&right);
    }

    match (left, right) {
        (AnswerValue::String(left), AnswerValue::String(right)) => Some(left.cmp(right)),
        (AnswerValue::Quantity(left), AnswerValue::Quantity(right)) => {
            if quantity_units_match(left, right) {
                left.value.partial_cmp(&right.value)
            } else {
                None
            }
        }
        (AnswerValue::Date(left), AnswerValue::Date(right)) => {
            Some(parse_date(left)?.cmp(&parse_date(right)?))
        }
        (AnswerValue::DateTime(left), AnswerValue::DateTime(right)) => {
            Some(parse_date_time(left)?.cmp(&parse_date_time(right)?))
        }
        // Mixed precision compares on the date part.
        (AnswerValue::Date(left), AnswerValue::DateTime(right)) => {
            Some(parse_date(left)?.cmp(&parse_date_time(right)?.date_naive()))
        }
        (AnswerValue::DateTime(left), AnswerValue::Date(right)) => {
            Some(parse_date_time(left)?.date_naive().cmp(&parse_date(right)?))
        }
        _ => None,
    }
}

fn numeric(value: &AnswerValue) -> Option<f64> {
    match value {
        AnswerValue::Integer(value) => Some(*value as f64),
        AnswerValue::Decimal(value) => Some(*value),
        _ => None,
    }
}

fn quantity_units_match(left: &Quantity, right: &Quantity) -> bool {
    match (&left.code, &right.code) {
        (Some(left), Some(right)) => left == right,
        _ => left.unit == right.unit,
    }
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

pub(crate) fn parse_date_time(text: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok()
}
