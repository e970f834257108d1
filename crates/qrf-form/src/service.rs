use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use qrf_spec::{
    FormItems, Questionnaire, QuestionnaireResponse, map_form_to_response, map_response_to_form,
    remove_disabled_answers,
};

/// Failure of an external questionnaire operation, surfaced as a value to
/// the caller. The evaluator and schema builder never see these.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("failed to decode resource")]
    Decode(#[from] serde_json::Error),
    #[error("questionnaire `{0}` is not available")]
    Unavailable(String),
    #[error("constraint check failed: {}", .0.join("; "))]
    Constraint(Vec<String>),
}

/// A launch-context parameter forwarded to populate and extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchContextParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

/// The async operations a backing server provides. Every operation is
/// fallible and returns a tagged failure, never an unhandled fault; none
/// of them run interleaved with evaluation.
#[async_trait]
pub trait QuestionnaireService {
    /// Fetches a questionnaire definition by id; `assemble` requests the
    /// server-side composition of sub-questionnaires.
    async fn questionnaire(&self, id: &str, assemble: bool)
    -> Result<Questionnaire, ServiceError>;

    /// Pre-fills a response for the questionnaire from launch context.
    async fn populate(
        &self,
        questionnaire: &Questionnaire,
        launch_context: &[LaunchContextParameter],
    ) -> Result<QuestionnaireResponse, ServiceError>;

    /// Runs server-side constraint checks against the final response.
    async fn constraint_check(
        &self,
        questionnaire: &Questionnaire,
        response: &QuestionnaireResponse,
    ) -> Result<(), ServiceError>;

    /// Persists the response and returns the stored representation.
    async fn save_response(
        &self,
        response: QuestionnaireResponse,
    ) -> Result<QuestionnaireResponse, ServiceError>;

    /// Triggers server-side data extraction from the saved response.
    async fn extract(
        &self,
        questionnaire: &Questionnaire,
        response: &QuestionnaireResponse,
    ) -> Result<Value, ServiceError>;
}

/// How the session obtains its questionnaire definition.
#[derive(Debug, Clone)]
pub enum QuestionnaireLoader {
    /// Fetch by id, assembled with sub-questionnaires.
    Id(String),
    /// Fetch by id without assembly.
    RawId(String),
    /// Use an already loaded definition.
    Preloaded(Questionnaire),
}

/// Everything a form session needs: the definition, the backing response,
/// and the form values derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    pub questionnaire: Questionnaire,
    pub response: QuestionnaireResponse,
    pub form_values: FormItems,
}

/// Result of a completed save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub response: QuestionnaireResponse,
    /// Whether server-side extraction succeeded. Extraction failures
    /// degrade this flag instead of failing the save.
    pub extracted: bool,
}

/// Loads the questionnaire, populates (or adopts) a response, and derives
/// initial form values. Supersession of an in-flight load by a newer one
/// is the caller's concern; the session itself is strictly sequential.
pub async fn load_form_data(
    service: &dyn QuestionnaireService,
    loader: QuestionnaireLoader,
    initial_response: Option<QuestionnaireResponse>,
    launch_context: &[LaunchContextParameter],
) -> Result<FormData, ServiceError> {
    let questionnaire = match loader {
        QuestionnaireLoader::Id(id) => service.questionnaire(&id, true).await?,
        QuestionnaireLoader::RawId(id) => service.questionnaire(&id, false).await?,
        QuestionnaireLoader::Preloaded(questionnaire) => questionnaire,
    };

    // A response that already has an id is resumed as-is; everything else
    // goes through populate.
    let response = match initial_response {
        Some(response) if response.id.is_some() => response,
        _ => service.populate(&questionnaire, launch_context).await?,
    };

    let form_values = map_response_to_form(&response.item, &questionnaire.item);

    Ok(FormData {
        questionnaire,
        response,
        form_values,
    })
}

/// Converts the current form values back into a response, runs the
/// constraint check, saves, and triggers extraction.
///
/// Disabled items are pruned first so stale answers of hidden questions
/// never reach the server; the submitted response is marked `completed`
/// and stamped with the current time.
pub async fn save_form_data(
    service: &dyn QuestionnaireService,
    form_data: &FormData,
) -> Result<SaveOutcome, ServiceError> {
    let questionnaire = &form_data.questionnaire;
    let enabled_values = remove_disabled_answers(&questionnaire.item, &form_data.form_values);

    let response = QuestionnaireResponse {
        status: "completed".into(),
        authored: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        item: map_form_to_response(&enabled_values, &questionnaire.item),
        ..form_data.response.clone()
    };

    service.constraint_check(questionnaire, &response).await?;
    let saved = service.save_response(response).await?;

    let extracted = match service.extract(questionnaire, &saved).await {
        Ok(_) => true,
        Err(error) => {
            log::warn!("extraction failed after save: {error}");
            false
        }
    };

    Ok(SaveOutcome {
        response: saved,
        extracted,
    })
}
