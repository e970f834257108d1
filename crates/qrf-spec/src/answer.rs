use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A coded concept reference (terminology system + code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A measured amount with an optional unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quantity {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A literal reference to another resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Reference {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Tagged union over the answer kinds a questionnaire item can hold.
///
/// Serialized with external tagging so the JSON shape matches the
/// first-class-extension form used by responses: `{"string": "yes"}`,
/// `{"Coding": {"code": "..."}}` and so on. Exactly one variant is
/// populated per instance. Dates carry their literal text because FHIR
/// permits reduced precision; parsing happens at comparison time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum AnswerValue {
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "integer")]
    Integer(i64),
    #[serde(rename = "decimal")]
    Decimal(f64),
    #[serde(rename = "boolean")]
    Boolean(bool),
    #[serde(rename = "date")]
    Date(String),
    #[serde(rename = "dateTime")]
    DateTime(String),
    Coding(Coding),
    Quantity(Quantity),
    Reference(Reference),
}

/// One entry of an item's answer sequence as stored in form state.
///
/// Non-repeating items hold a single entry; repeating-answer items hold one
/// entry per selection. The value is optional because widgets materialize
/// entries before the user has typed anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormAnswerItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnswerValue>,
}

impl FormAnswerItem {
    pub fn new(value: AnswerValue) -> Self {
        Self { value: Some(value) }
    }
}
