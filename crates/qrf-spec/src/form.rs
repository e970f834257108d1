use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answer::{AnswerValue, FormAnswerItem};
use crate::path::{FieldPath, Segment};

/// Live form state for one group scope: linkId to entered value.
pub type FormItems = BTreeMap<String, FormValue>;

/// The instances of a group field. Non-repeating groups hold a single
/// scope and are addressed with a bare `items` segment; repeating groups
/// hold one scope per rendered instance and are addressed with
/// `items.<index>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupItems {
    Repeating(Vec<FormItems>),
    Single(FormItems),
}

/// The `items` wrapper a group value carries in form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    pub items: GroupItems,
}

/// What the form state holds for one linkId: an answer sequence for leaf
/// items, or nested scopes for group items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Answers(Vec<FormAnswerItem>),
    Group(GroupValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("path `{0}` does not address a form value")]
    InvalidPath(FieldPath),
}

/// Reads the value stored at `path`, if any. The path must name a leaf or
/// group entry (`a.items.0.b`), not a bare scope.
pub fn value_at<'a>(form: &'a FormItems, path: &FieldPath) -> Option<&'a FormValue> {
    let segments = path.segments();
    let mut scope = form;
    let mut position = 0;

    loop {
        let Segment::Key(key) = segments.get(position)? else {
            return None;
        };
        let value = scope.get(key)?;
        position += 1;
        if position == segments.len() {
            return Some(value);
        }

        let FormValue::Group(group) = value else {
            return None;
        };
        let Segment::Items = segments.get(position)? else {
            return None;
        };
        position += 1;

        scope = match &group.items {
            GroupItems::Single(items) => items,
            GroupItems::Repeating(instances) => {
                let Segment::Index(index) = segments.get(position)? else {
                    return None;
                };
                position += 1;
                instances.get(*index)?
            }
        };

        if position == segments.len() {
            // The path stops at a scope rather than a value.
            return None;
        }
    }
}

/// Reads the group scope addressed by `path` (a path ending in `items` or
/// `items.<index>`); the empty path is the root scope.
pub fn scope_at<'a>(form: &'a FormItems, path: &FieldPath) -> Option<&'a FormItems> {
    let segments = path.segments();
    let mut scope = form;
    let mut position = 0;

    while position < segments.len() {
        let Segment::Key(key) = &segments[position] else {
            return None;
        };
        let Some(FormValue::Group(group)) = scope.get(key) else {
            return None;
        };
        position += 1;
        let Some(Segment::Items) = segments.get(position) else {
            return None;
        };
        position += 1;

        scope = match &group.items {
            GroupItems::Single(items) => items,
            GroupItems::Repeating(instances) => {
                let Some(Segment::Index(index)) = segments.get(position) else {
                    return None;
                };
                position += 1;
                instances.get(*index)?
            }
        };
    }

    Some(scope)
}

/// Stores an answer sequence at `path`, creating intermediate group scopes
/// as needed. Whether an intermediate group is repeating is inferred from
/// the path shape: `items.<index>` materializes a repeating group,
/// a bare `items` a single one.
pub fn set_answers(
    form: &mut FormItems,
    path: &FieldPath,
    answers: Vec<FormAnswerItem>,
) -> Result<(), FormError> {
    set_value(form, path, FormValue::Answers(answers))
}

/// Stores a group value at `path`; used by the group controller.
pub fn set_group_items(
    form: &mut FormItems,
    path: &FieldPath,
    items: GroupItems,
) -> Result<(), FormError> {
    set_value(form, path, FormValue::Group(GroupValue { items }))
}

fn set_value(form: &mut FormItems, path: &FieldPath, value: FormValue) -> Result<(), FormError> {
    let segments = path.segments();
    let mut scope = form;
    let mut position = 0;

    loop {
        let Some(Segment::Key(key)) = segments.get(position) else {
            return Err(FormError::InvalidPath(path.clone()));
        };
        position += 1;

        if position == segments.len() {
            scope.insert(key.clone(), value);
            return Ok(());
        }

        let Some(Segment::Items) = segments.get(position) else {
            return Err(FormError::InvalidPath(path.clone()));
        };
        position += 1;

        let index = match segments.get(position) {
            Some(Segment::Index(index)) => {
                position += 1;
                Some(*index)
            }
            _ => None,
        };

        let entry = scope.entry(key.clone()).or_insert_with(|| {
            FormValue::Group(GroupValue {
                items: match index {
                    Some(_) => GroupItems::Repeating(Vec::new()),
                    None => GroupItems::Single(FormItems::new()),
                },
            })
        });

        let FormValue::Group(group) = entry else {
            return Err(FormError::InvalidPath(path.clone()));
        };

        scope = match (&mut group.items, index) {
            (GroupItems::Single(items), None) => items,
            (GroupItems::Repeating(instances), Some(index)) => {
                while instances.len() <= index {
                    instances.push(FormItems::new());
                }
                &mut instances[index]
            }
            _ => return Err(FormError::InvalidPath(path.clone())),
        };
    }
}

/// Extracts the populated answer values of an answer sequence, dropping
/// entries a widget materialized but never filled.
pub fn answer_values(answers: &[FormAnswerItem]) -> Vec<&AnswerValue> {
    answers
        .iter()
        .filter_map(|entry| entry.value.as_ref())
        .collect()
}
