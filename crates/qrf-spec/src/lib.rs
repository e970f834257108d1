#![allow(missing_docs)]

pub mod answer;
pub mod compare;
pub mod convert;
pub mod enablement;
pub mod form;
pub mod group;
pub mod path;
pub mod response;
pub mod schema;
pub mod spec;

pub use answer::{AnswerValue, Coding, FormAnswerItem, Quantity, Reference};
pub use compare::{Checker, checker, compare_values};
pub use convert::{map_form_to_response, map_response_to_form};
pub use enablement::{
    EnabledQuestion, EnablementContext, enabled_questions, is_enabled, remove_disabled_answers,
};
pub use form::{
    FormError, FormItems, FormValue, GroupItems, GroupValue, answer_values, scope_at, set_answers,
    set_group_items, value_at,
};
pub use group::{GroupController, GroupError};
pub use path::{FieldPath, Segment};
pub use response::{
    QuestionnaireResponse, ResponseAnswer, ResponseItem, initial_item_count, resolve,
};
pub use schema::{
    EnableGate, ErrorCode, FieldError, FieldRule, FieldSchema, ObjectSchema, ValidationResult,
    build_schema, validate,
};
pub use spec::{
    AnswerOption, EnableBehavior, EnableOperator, EnableWhen, ItemControl, ItemType, Questionnaire,
    QuestionnaireItem,
};
