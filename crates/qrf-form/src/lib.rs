#![allow(missing_docs)]

pub mod registry;
pub mod service;

pub use registry::{PlannedItem, WidgetRegistry, render_plan};
pub use service::{
    FormData, LaunchContextParameter, QuestionnaireLoader, QuestionnaireService, SaveOutcome,
    ServiceError, load_form_data, save_form_data,
};
