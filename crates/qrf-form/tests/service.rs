use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use qrf_form::{
    FormData, LaunchContextParameter, QuestionnaireLoader, QuestionnaireService, ServiceError,
    load_form_data, save_form_data,
};
use qrf_spec::{
    AnswerValue, EnableOperator, EnableWhen, FormAnswerItem, FormValue, ItemType, Questionnaire,
    QuestionnaireItem, QuestionnaireResponse, ResponseAnswer, ResponseItem,
};

fn questionnaire() -> Questionnaire {
    let mut gated = QuestionnaireItem::new("details", ItemType::String);
    gated.enable_when = vec![EnableWhen {
        question: "gate".into(),
        operator: EnableOperator::Equal,
        answer: AnswerValue::String("yes".into()),
    }];

    Questionnaire {
        id: Some("intake".into()),
        name: Some("Intake".into()),
        title: None,
        status: "active".into(),
        item: vec![QuestionnaireItem::new("gate", ItemType::String), gated],
    }
}

fn populated_response() -> QuestionnaireResponse {
    QuestionnaireResponse {
        id: None,
        status: "in-progress".into(),
        questionnaire: Some("intake".into()),
        authored: None,
        item: vec![ResponseItem {
            link_id: "gate".into(),
            answer: vec![ResponseAnswer::new(AnswerValue::String("no".into()))],
            item: Vec::new(),
        }],
    }
}

#[derive(Default)]
struct RecordingService {
    saved: Mutex<Vec<QuestionnaireResponse>>,
    fail_constraint: bool,
    fail_extract: bool,
}

#[async_trait]
impl QuestionnaireService for RecordingService {
    async fn questionnaire(
        &self,
        id: &str,
        _assemble: bool,
    ) -> Result<Questionnaire, ServiceError> {
        if id == "intake" {
            Ok(questionnaire())
        } else {
            Err(ServiceError::Unavailable(id.into()))
        }
    }

    async fn populate(
        &self,
        _questionnaire: &Questionnaire,
        _launch_context: &[LaunchContextParameter],
    ) -> Result<QuestionnaireResponse, ServiceError> {
        Ok(populated_response())
    }

    async fn constraint_check(
        &self,
        _questionnaire: &Questionnaire,
        _response: &QuestionnaireResponse,
    ) -> Result<(), ServiceError> {
        if self.fail_constraint {
            Err(ServiceError::Constraint(vec![
                "gate must be answered".into(),
            ]))
        } else {
            Ok(())
        }
    }

    async fn save_response(
        &self,
        response: QuestionnaireResponse,
    ) -> Result<QuestionnaireResponse, ServiceError> {
        let mut saved = QuestionnaireResponse {
            id: Some("qr-1".into()),
            ..response
        };
        saved.questionnaire = Some("intake".into());
        self.saved.lock().expect("lock").push(saved.clone());
        Ok(saved)
    }

    async fn extract(
        &self,
        _questionnaire: &Questionnaire,
        _response: &QuestionnaireResponse,
    ) -> Result<Value, ServiceError> {
        if self.fail_extract {
            Err(ServiceError::Http {
                status: 500,
                message: "extract failed".into(),
            })
        } else {
            Ok(json!({ "resourceType": "Bundle", "entry": [] }))
        }
    }
}

#[tokio::test]
async fn loading_populates_and_derives_form_values() {
    let service = RecordingService::default();
    let form_data = load_form_data(
        &service,
        QuestionnaireLoader::Id("intake".into()),
        None,
        &[],
    )
    .await
    .expect("load");

    assert_eq!(form_data.questionnaire.id.as_deref(), Some("intake"));
    assert!(matches!(
        form_data.form_values.get("gate"),
        Some(FormValue::Answers(answers))
            if answers[0].value == Some(AnswerValue::String("no".into()))
    ));
}

#[tokio::test]
async fn an_existing_response_is_resumed_without_populate() {
    let service = RecordingService::default();
    let existing = QuestionnaireResponse {
        id: Some("qr-9".into()),
        status: "in-progress".into(),
        ..QuestionnaireResponse::default()
    };

    let form_data = load_form_data(
        &service,
        QuestionnaireLoader::Preloaded(questionnaire()),
        Some(existing),
        &[],
    )
    .await
    .expect("load");

    assert_eq!(form_data.response.id.as_deref(), Some("qr-9"));
}

#[tokio::test]
async fn unknown_questionnaires_surface_as_failure_values() {
    let service = RecordingService::default();
    let result = load_form_data(
        &service,
        QuestionnaireLoader::RawId("missing".into()),
        None,
        &[],
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Unavailable(id)) if id == "missing"));
}

#[tokio::test]
async fn saving_prunes_disabled_answers_and_completes_the_response() {
    let service = RecordingService::default();
    let mut form_data = load_form_data(
        &service,
        QuestionnaireLoader::Id("intake".into()),
        None,
        &[],
    )
    .await
    .expect("load");

    // Stale value behind a closed gate must not reach the server.
    form_data.form_values.insert(
        "details".into(),
        FormValue::Answers(vec![FormAnswerItem::new(AnswerValue::String(
            "stale".into(),
        ))]),
    );

    let outcome = save_form_data(&service, &form_data).await.expect("save");

    assert!(outcome.extracted);
    assert_eq!(outcome.response.status, "completed");
    assert!(outcome.response.authored.is_some());
    let submitted = &service.saved.lock().expect("lock")[0];
    assert!(submitted.item.iter().all(|item| item.link_id != "details"));
}

#[tokio::test]
async fn constraint_failures_abort_the_save() {
    let service = RecordingService {
        fail_constraint: true,
        ..RecordingService::default()
    };
    let form_data = FormData {
        questionnaire: questionnaire(),
        response: populated_response(),
        form_values: Default::default(),
    };

    let result = save_form_data(&service, &form_data).await;

    assert!(matches!(result, Err(ServiceError::Constraint(_))));
    assert!(service.saved.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn extraction_failure_degrades_the_outcome_instead_of_failing() {
    let service = RecordingService {
        fail_extract: true,
        ..RecordingService::default()
    };
    let form_data = FormData {
        questionnaire: questionnaire(),
        response: populated_response(),
        form_values: Default::default(),
    };

    let outcome = save_form_data(&service, &form_data).await.expect("save");

    assert!(!outcome.extracted);
    assert_eq!(service.saved.lock().expect("lock").len(), 1);
}
