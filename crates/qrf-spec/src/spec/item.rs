use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answer::{AnswerValue, Coding};

/// Closed set of item kinds this engine understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    String,
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Choice,
    Quantity,
    Reference,
    Group,
    Display,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::String => "string",
            ItemType::Text => "text",
            ItemType::Integer => "integer",
            ItemType::Decimal => "decimal",
            ItemType::Boolean => "boolean",
            ItemType::Date => "date",
            ItemType::DateTime => "dateTime",
            ItemType::Choice => "choice",
            ItemType::Quantity => "quantity",
            ItemType::Reference => "reference",
            ItemType::Group => "group",
            ItemType::Display => "display",
        }
    }
}

/// Comparison operator of an enable-when condition, using the FHIR codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EnableOperator {
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl EnableOperator {
    pub fn as_code(&self) -> &'static str {
        match self {
            EnableOperator::Exists => "exists",
            EnableOperator::Equal => "=",
            EnableOperator::NotEqual => "!=",
            EnableOperator::Greater => ">",
            EnableOperator::Less => "<",
            EnableOperator::GreaterOrEqual => ">=",
            EnableOperator::LessOrEqual => "<=",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "exists" => Some(EnableOperator::Exists),
            "=" => Some(EnableOperator::Equal),
            "!=" => Some(EnableOperator::NotEqual),
            ">" => Some(EnableOperator::Greater),
            "<" => Some(EnableOperator::Less),
            ">=" => Some(EnableOperator::GreaterOrEqual),
            "<=" => Some(EnableOperator::LessOrEqual),
            _ => None,
        }
    }
}

/// How multiple enable-when conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnableBehavior {
    #[default]
    All,
    Any,
}

/// One visibility condition against another item's current answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnableWhen {
    /// linkId of the referenced item, resolved against the same or an
    /// ancestor group scope.
    pub question: String,
    pub operator: EnableOperator,
    pub answer: AnswerValue,
}

/// Rendering hint carried by an item (`itemControl` extension).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItemControl {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
}

impl ItemControl {
    /// The effective control code: the first coding wins.
    pub fn code(&self) -> Option<&str> {
        self.coding.first().map(|coding| coding.code.as_str())
    }
}

/// A preset answer offered by a choice item. Carried as data only; option
/// handling belongs to the widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnswerValue>,
}

/// A node of the questionnaire definition tree: a question or a group.
///
/// Immutable once loaded; `linkId` is unique within its nesting scope but
/// not globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireItem {
    pub link_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub repeats: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_control: Option<ItemControl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enable_when: Vec<EnableWhen>,
    #[serde(default)]
    pub enable_behavior: EnableBehavior,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answer_option: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<QuestionnaireItem>,
}

impl QuestionnaireItem {
    /// Minimal constructor used by builders and tests; everything optional
    /// starts out empty.
    pub fn new(link_id: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            link_id: link_id.into(),
            text: None,
            item_type,
            required: false,
            repeats: false,
            read_only: false,
            max_length: None,
            item_control: None,
            enable_when: Vec::new(),
            enable_behavior: EnableBehavior::All,
            answer_option: Vec::new(),
            item: Vec::new(),
        }
    }

    /// The item-control code used for widget lookup, if any.
    pub fn control_code(&self) -> Option<&str> {
        self.item_control.as_ref().and_then(ItemControl::code)
    }
}
