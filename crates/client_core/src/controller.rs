//! Async driver that runs a [`ResponseSession`] against a [`SurveyApi`].
//!
//! The session lock is never held across a network call, so edits keep
//! landing while a load or save is in flight.

use std::sync::Arc;

use shared::{domain::QuestionId, protocol::SaveResponseResult};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    api::SurveyApi,
    error::SessionError,
    form::FieldEdit,
    link::{Route, SurveyLink},
    session::{ResponseSession, SaveKind},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SaveDispatch {
    Sent(SaveResponseResult),
    /// Another save was in flight, the survey was not loaded yet, or the
    /// response is already completed. Nothing was sent.
    Skipped,
}

pub struct SessionController {
    api: Arc<dyn SurveyApi>,
    session: Mutex<ResponseSession>,
}

impl SessionController {
    pub fn new(api: Arc<dyn SurveyApi>, link: Option<SurveyLink>) -> Self {
        Self {
            api,
            session: Mutex::new(ResponseSession::new(link)),
        }
    }

    pub fn from_route(api: Arc<dyn SurveyApi>, route: &Route) -> Self {
        Self::new(api, route.link().cloned())
    }

    pub async fn load(&self) -> Result<(), SessionError> {
        let request = self.session.lock().await.begin_load()?;

        let outcome = self
            .api
            .fetch_survey(&request.link)
            .await
            .map_err(|err| {
                warn!(survey_code = request.link.code(), "fetch_survey failed: {err}");
                SessionError::load_failure(&err)
            });
        let failure = outcome.as_ref().err().cloned();

        self.session.lock().await.apply_load(&request.link, outcome);
        failure.map_or(Ok(()), Err)
    }

    pub async fn save(&self, kind: SaveKind) -> Result<SaveDispatch, SessionError> {
        let Some(request) = self.session.lock().await.begin_save(kind) else {
            return Ok(SaveDispatch::Skipped);
        };

        let outcome = self
            .api
            .save_response(&request.body)
            .await
            .map_err(|err| {
                warn!(?kind, "save_response failed: {err}");
                SessionError::save_failure(&err)
            });

        self.session
            .lock()
            .await
            .apply_save(&request.link, kind, outcome.clone());
        if let Ok(saved) = &outcome {
            info!(?kind, response_id = %saved.response_id, "save dispatched");
        }
        outcome.map(SaveDispatch::Sent)
    }

    pub async fn edit(&self, question_id: &QuestionId, edit: FieldEdit) -> bool {
        self.session.lock().await.edit(question_id, edit)
    }

    /// Runs `f` against the current session state.
    pub async fn snapshot<R>(&self, f: impl FnOnce(&ResponseSession) -> R) -> R {
        f(&*self.session.lock().await)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
