pub mod item;
pub mod questionnaire;

pub use item::{
    AnswerOption, EnableBehavior, EnableOperator, EnableWhen, ItemControl, ItemType,
    QuestionnaireItem,
};
pub use questionnaire::Questionnaire;
