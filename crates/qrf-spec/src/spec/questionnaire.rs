use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::item::QuestionnaireItem;

/// Top-level questionnaire definition.
///
/// Owned by the form session for its whole lifetime and never mutated after
/// load; every evaluation pass walks `item` read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<QuestionnaireItem>,
}
