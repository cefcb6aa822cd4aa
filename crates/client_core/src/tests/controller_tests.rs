use std::sync::Mutex as StdMutex;

use super::*;
use crate::{api::HttpSurveyApi, error::ClientError, link::parse_route, session::SessionPhase};
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{QuestionType, ResponseStatus},
    protocol::{AnswerValue, Question, SaveResponseRequest, SurveyInfo, SurveyPayload},
};
use std::collections::{BTreeMap, HashMap};
use tokio::{net::TcpListener, sync::Notify};

struct TestSurveyApi {
    fetch_calls: Arc<StdMutex<u32>>,
    saved: Arc<StdMutex<Vec<SaveResponseRequest>>>,
    fail_fetch_with: Option<String>,
    save_entered: Arc<Notify>,
    release_save: Option<Arc<Notify>>,
}

impl TestSurveyApi {
    fn new() -> Self {
        Self {
            fetch_calls: Arc::new(StdMutex::new(0)),
            saved: Arc::new(StdMutex::new(Vec::new())),
            fail_fetch_with: None,
            save_entered: Arc::new(Notify::new()),
            release_save: None,
        }
    }

    fn gated() -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        let mut api = Self::new();
        api.release_save = Some(release.clone());
        (api, release)
    }
}

fn text_question() -> Question {
    Question {
        id: "q1".into(),
        question_code: "Q1".into(),
        group_code: "G".into(),
        order: 1,
        content: "Họ tên".into(),
        question_type: QuestionType::Text,
        is_required: true,
        options: Vec::new(),
        min_length: None,
        max_length: None,
        min_value: None,
        max_value: None,
        pattern: None,
    }
}

#[async_trait]
impl SurveyApi for TestSurveyApi {
    async fn fetch_survey(&self, link: &SurveyLink) -> Result<SurveyPayload, ClientError> {
        *self.fetch_calls.lock().unwrap() += 1;
        if let Some(message) = &self.fail_fetch_with {
            return Err(ClientError::Api {
                status: 404,
                message: Some(message.clone()),
            });
        }
        Ok(SurveyPayload {
            survey: SurveyInfo {
                id: "s1".into(),
                code: link.code().to_string(),
                name: "Khảo sát".into(),
                description: None,
            },
            questions: vec![text_question()],
            existing_answers: BTreeMap::new(),
            response_id: None,
            response_status: None,
        })
    }

    async fn save_response(
        &self,
        request: &SaveResponseRequest,
    ) -> Result<SaveResponseResult, ClientError> {
        self.saved.lock().unwrap().push(request.clone());
        self.save_entered.notify_one();
        if let Some(release) = &self.release_save {
            release.notified().await;
        }
        Ok(SaveResponseResult {
            response_id: "r1".into(),
            status: if request.is_submit() {
                ResponseStatus::Completed
            } else {
                ResponseStatus::Partial
            },
        })
    }
}

fn controller_with(api: TestSurveyApi) -> (Arc<SessionController>, TestSurveyApiHandles) {
    let handles = TestSurveyApiHandles {
        fetch_calls: api.fetch_calls.clone(),
        saved: api.saved.clone(),
        save_entered: api.save_entered.clone(),
    };
    let link = SurveyLink::new("abc", "tok1").expect("link");
    (
        Arc::new(SessionController::new(Arc::new(api), Some(link))),
        handles,
    )
}

struct TestSurveyApiHandles {
    fetch_calls: Arc<StdMutex<u32>>,
    saved: Arc<StdMutex<Vec<SaveResponseRequest>>>,
    save_entered: Arc<Notify>,
}

#[tokio::test]
async fn invalid_link_never_reaches_the_api() {
    let api = TestSurveyApi::new();
    let fetch_calls = api.fetch_calls.clone();
    let controller = SessionController::from_route(Arc::new(api), &parse_route("/survey/abc"));

    assert_eq!(controller.load().await, Err(SessionError::InvalidLink));
    assert_eq!(
        controller.save(SaveKind::Submit).await,
        Ok(SaveDispatch::Skipped)
    );
    assert_eq!(*fetch_calls.lock().unwrap(), 0);
    assert_eq!(
        controller.snapshot(ResponseSession::phase).await,
        SessionPhase::InvalidLink
    );
}

#[tokio::test]
async fn load_failure_surfaces_server_message() {
    let mut api = TestSurveyApi::new();
    api.fail_fetch_with = Some("Không tìm thấy khảo sát".into());
    let (controller, _handles) = controller_with(api);

    let err = controller.load().await.expect_err("load should fail");
    assert_eq!(err.message(), "Không tìm thấy khảo sát");
    assert_eq!(
        controller.snapshot(ResponseSession::phase).await,
        SessionPhase::LoadFailed
    );
}

#[tokio::test]
async fn save_before_load_is_skipped() {
    let (controller, handles) = controller_with(TestSurveyApi::new());
    assert_eq!(
        controller.save(SaveKind::Draft).await,
        Ok(SaveDispatch::Skipped)
    );
    assert!(handles.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn only_one_save_in_flight() -> Result<()> {
    let (api, release) = TestSurveyApi::gated();
    let (controller, handles) = controller_with(api);
    controller.load().await?;
    controller
        .edit(&"q1".into(), FieldEdit::SetText("first".into()))
        .await;

    let in_flight = tokio::spawn({
        let controller = controller.clone();
        async move { controller.save(SaveKind::Draft).await }
    });
    handles.save_entered.notified().await;

    assert!(controller.snapshot(ResponseSession::is_saving).await);
    assert_eq!(controller.save(SaveKind::Draft).await, Ok(SaveDispatch::Skipped));
    assert_eq!(controller.save(SaveKind::Submit).await, Ok(SaveDispatch::Skipped));

    // Edits are still accepted and go into the next save only.
    assert!(
        controller
            .edit(&"q1".into(), FieldEdit::SetText("second".into()))
            .await
    );

    release.notify_one();
    assert!(matches!(in_flight.await?, Ok(SaveDispatch::Sent(_))));
    assert_eq!(handles.saved.lock().unwrap().len(), 1);
    assert_eq!(
        handles.saved.lock().unwrap()[0].answers[0].value,
        AnswerValue::Text("first".into())
    );

    let next = tokio::spawn({
        let controller = controller.clone();
        async move { controller.save(SaveKind::Draft).await }
    });
    handles.save_entered.notified().await;
    release.notify_one();
    next.await??;

    let saved = handles.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].answers[0].value, AnswerValue::Text("second".into()));
    assert_eq!(*handles.fetch_calls.lock().unwrap(), 1);
    Ok(())
}

#[derive(Clone, Default)]
struct MockBackendState {
    survey_calls: Arc<StdMutex<u32>>,
    bodies: Arc<StdMutex<Vec<Value>>>,
}

async fn survey(
    State(state): State<MockBackendState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    *state.survey_calls.lock().unwrap() += 1;
    assert_eq!(query.get("code").map(String::as_str), Some("abc"));
    assert_eq!(query.get("token").map(String::as_str), Some("tok1"));
    Json(json!({
        "data": {
            "survey": { "id": "s1", "code": "abc", "name": "Khảo sát" },
            "questions": [
                { "id": "q1", "questionCode": "NAME", "groupCode": "A", "order": 1,
                  "content": "Họ tên", "type": "text", "isRequired": true },
                { "id": "q2", "questionCode": "PICK", "groupCode": "A", "order": 2,
                  "content": "Chọn", "type": "multiple_choice", "options": ["A", "B"] }
            ],
            "existingAnswers": {},
            "responseId": null,
            "responseStatus": null
        }
    }))
}

async fn responses(State(state): State<MockBackendState>, Json(body): Json<Value>) -> Json<Value> {
    let submit = body["submit"].as_bool().unwrap_or(false);
    state.bodies.lock().unwrap().push(body);
    Json(json!({
        "data": {
            "responseId": "r-42",
            "status": if submit { "Completed" } else { "Partial" }
        }
    }))
}

async fn spawn_mock_backend() -> Result<(String, MockBackendState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = MockBackendState::default();
    let app = Router::new()
        .route("/v1/public/survey", get(survey))
        .route("/v1/public/responses", post(responses))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn submit_with_required_question_unanswered_completes() -> Result<()> {
    let (base_url, backend) = spawn_mock_backend().await?;
    let api = Arc::new(HttpSurveyApi::new(&base_url)?);
    let route = parse_route(&format!("{base_url}/survey/abc?token=tok1"));
    let controller = SessionController::from_route(api, &route);

    controller.load().await?;
    assert_eq!(
        controller.snapshot(ResponseSession::phase).await,
        SessionPhase::Editing
    );
    assert!(
        controller
            .edit(&"q2".into(), FieldEdit::Toggle("B".into()))
            .await
    );

    let dispatch = controller.save(SaveKind::Submit).await?;
    match dispatch {
        SaveDispatch::Sent(saved) => {
            assert_eq!(saved.response_id.as_str(), "r-42");
            assert_eq!(saved.status, ResponseStatus::Completed);
        }
        SaveDispatch::Skipped => panic!("submit was not sent"),
    }

    assert_eq!(
        controller.snapshot(ResponseSession::phase).await,
        SessionPhase::Completed
    );
    let bodies = backend.bodies.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![json!({
            "token": "tok1",
            "surveyCode": "abc",
            "answers": [{ "questionId": "q2", "value": ["B"] }],
            "submit": true
        })]
    );
    assert!(
        !controller
            .edit(&"q1".into(), FieldEdit::SetText("late".into()))
            .await
    );
    assert_eq!(*backend.survey_calls.lock().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn draft_save_sends_submit_false_and_stays_editable() -> Result<()> {
    let (base_url, backend) = spawn_mock_backend().await?;
    let api = Arc::new(HttpSurveyApi::new(&base_url)?);
    let controller = SessionController::new(api, Some(SurveyLink::new("abc", "tok1")?));

    controller.load().await?;
    controller
        .edit(&"q1".into(), FieldEdit::SetText("Lan".into()))
        .await;
    controller.save(SaveKind::Draft).await?;

    assert_eq!(
        controller.snapshot(ResponseSession::phase).await,
        SessionPhase::Editing
    );
    let bodies = backend.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0]["submit"], json!(false));
    assert_eq!(bodies[0]["answers"][0]["value"], json!("Lan"));
    Ok(())
}
