use std::collections::BTreeMap;

use serde::Serialize;

use crate::answer::AnswerValue;
use crate::compare::{parse_date, parse_date_time};
use crate::form::{FormItems, FormValue, GroupItems, GroupValue, answer_values};
use crate::path::{FieldPath, Segment};
use crate::spec::{EnableBehavior, EnableWhen, ItemType, QuestionnaireItem};

/// Structural validation rules for one group scope, keyed by linkId.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub fields: BTreeMap<String, FieldSchema>,
}

/// The rules attached to one item, plus the enablement gate that decides
/// whether they currently apply at all.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub rule: FieldRule,
    pub required: bool,
    pub gate: Option<EnableGate>,
}

/// Per-item-type base rule mirroring the declarative tree.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// string/text items: answers must be strings, optionally bounded.
    Text { max_length: Option<u32> },
    /// integer items: answers must be integer-typed.
    Integer,
    /// date items: answers must parse as a date or dateTime.
    Date,
    /// Items with substructure: the nested `items` field is itself
    /// required, holding one scope or one scope per repeat instance.
    Group { repeats: bool, items: ObjectSchema },
    /// No finer validation defined (choice, boolean, ...): required means
    /// a non-empty answer sequence, anything else accepts everything.
    Any,
}

/// An item's enable-when conditions as captured for validation. While the
/// gate is closed the field accepts anything, including absence.
#[derive(Debug, Clone)]
pub struct EnableGate {
    pub conditions: Vec<EnableWhen>,
    pub behavior: EnableBehavior,
}

/// Machine-readable category of a structural validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    MaxLength,
    TypeMismatch,
    InvalidDate,
    MinItems,
}

/// One per-field failure surfaced to the caller; never a fault.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Builds the validation schema mirroring an item tree. An empty tree
/// yields an empty, valid schema.
pub fn build_schema(items: &[QuestionnaireItem]) -> ObjectSchema {
    let mut fields = BTreeMap::new();

    for item in items {
        let rule = match item.item_type {
            ItemType::String | ItemType::Text => FieldRule::Text {
                max_length: item.max_length.filter(|limit| *limit > 0),
            },
            ItemType::Integer => FieldRule::Integer,
            ItemType::Date => FieldRule::Date,
            _ if !item.item.is_empty() => FieldRule::Group {
                repeats: item.repeats,
                items: build_schema(&item.item),
            },
            _ => FieldRule::Any,
        };

        let gate = if item.enable_when.is_empty() {
            None
        } else {
            Some(EnableGate {
                conditions: item.enable_when.clone(),
                behavior: item.enable_behavior,
            })
        };

        fields.insert(
            item.link_id.clone(),
            FieldSchema {
                rule,
                required: item.required,
                gate,
            },
        );
    }

    ObjectSchema { fields }
}

/// Validates a form-state snapshot against the schema. Failures come back
/// per field; nothing here panics or terminates early.
pub fn validate(schema: &ObjectSchema, form: &FormItems) -> ValidationResult {
    let mut errors = Vec::new();
    validate_object(schema, form, &FieldPath::new(), &mut errors);
    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// Evaluates a gate against the live sibling values of the current scope.
/// `all` stops at the first failing condition; `any` visits the whole list
/// before deciding.
fn gate_open(gate: &EnableGate, scope: &FormItems) -> bool {
    let satisfied = |condition: &EnableWhen| {
        let observed = match scope.get(&condition.question) {
            Some(FormValue::Answers(entries)) => answer_values(entries),
            _ => Vec::new(),
        };
        condition.operator.check(&observed, &condition.answer)
    };

    match gate.behavior {
        EnableBehavior::All => gate.conditions.iter().all(satisfied),
        EnableBehavior::Any => gate.conditions.iter().any(satisfied),
    }
}

fn validate_object(
    schema: &ObjectSchema,
    scope: &FormItems,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    for (link_id, field) in &schema.fields {
        if let Some(gate) = &field.gate
            && !gate_open(gate, scope)
        {
            continue;
        }

        let field_path = path.child(Segment::key(link_id));
        let value = scope.get(link_id);

        match &field.rule {
            FieldRule::Text { max_length } => {
                validate_text(field, *max_length, value, &field_path, errors);
            }
            FieldRule::Integer => validate_typed(
                field,
                value,
                &field_path,
                errors,
                |answer| matches!(answer, AnswerValue::Integer(_)),
                ErrorCode::TypeMismatch,
                "answer is not an integer",
            ),
            FieldRule::Date => validate_typed(
                field,
                value,
                &field_path,
                errors,
                is_valid_date,
                ErrorCode::InvalidDate,
                "answer is not a valid date",
            ),
            FieldRule::Group { repeats, items } => {
                validate_group(*repeats, items, value, &field_path, errors);
            }
            FieldRule::Any => {
                if field.required && !has_any_answer(value) {
                    errors.push(FieldError {
                        path: field_path.clone(),
                        code: ErrorCode::MinItems,
                        message: "at least one answer is required".into(),
                    });
                }
            }
        }
    }
}

fn validate_text(
    field: &FieldSchema,
    max_length: Option<u32>,
    value: Option<&FormValue>,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    let answers = leaf_answers(value);

    if field.required {
        let filled = answers
            .iter()
            .any(|answer| matches!(answer, AnswerValue::String(text) if !text.is_empty()));
        if !filled {
            errors.push(required_error(path));
        }
    }

    for answer in answers {
        let AnswerValue::String(text) = answer else {
            errors.push(FieldError {
                path: path.clone(),
                code: ErrorCode::TypeMismatch,
                message: "answer is not a string".into(),
            });
            continue;
        };
        if let Some(limit) = max_length
            && text.chars().count() > limit as usize
        {
            errors.push(FieldError {
                path: path.clone(),
                code: ErrorCode::MaxLength,
                message: format!("string longer than max length {limit}"),
            });
        }
    }
}

fn validate_typed(
    field: &FieldSchema,
    value: Option<&FormValue>,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
    accepts: fn(&AnswerValue) -> bool,
    code: ErrorCode,
    message: &str,
) {
    let answers = leaf_answers(value);

    if field.required && !answers.iter().any(|answer| accepts(answer)) {
        errors.push(required_error(path));
    }

    for answer in answers {
        if !accepts(answer) {
            errors.push(FieldError {
                path: path.clone(),
                code,
                message: message.into(),
            });
        }
    }
}

fn validate_group(
    repeats: bool,
    items: &ObjectSchema,
    value: Option<&FormValue>,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    match value {
        Some(FormValue::Group(GroupValue {
            items: GroupItems::Single(scope),
        })) if !repeats => {
            validate_object(items, scope, &path.items(), errors);
        }
        Some(FormValue::Group(GroupValue {
            items: GroupItems::Repeating(instances),
        })) if repeats => {
            for (index, scope) in instances.iter().enumerate() {
                let instance_path = path.items().child(Segment::Index(index));
                validate_object(items, scope, &instance_path, errors);
            }
        }
        Some(_) => {
            errors.push(FieldError {
                path: path.clone(),
                code: ErrorCode::TypeMismatch,
                message: "value does not match the group shape".into(),
            });
        }
        // The nested items wrapper is required for every group.
        None => errors.push(required_error(path)),
    }
}

fn leaf_answers(value: Option<&FormValue>) -> Vec<&AnswerValue> {
    match value {
        Some(FormValue::Answers(entries)) => answer_values(entries),
        _ => Vec::new(),
    }
}

fn has_any_answer(value: Option<&FormValue>) -> bool {
    !leaf_answers(value).is_empty()
}

fn is_valid_date(answer: &AnswerValue) -> bool {
    match answer {
        AnswerValue::Date(text) => parse_date(text).is_some(),
        AnswerValue::DateTime(text) => parse_date_time(text).is_some(),
        _ => false,
    }
}

fn required_error(path: &FieldPath) -> FieldError {
    FieldError {
        path: path.clone(),
        code: ErrorCode::Required,
        message: "required answer is missing".into(),
    }
}
