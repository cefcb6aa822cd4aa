//! Respondent session state: loading, the local answer buffer, and the
//! draft/submit lifecycle.
//!
//! The session never performs I/O. Callers ask it for a request
//! ([`ResponseSession::begin_load`], [`ResponseSession::begin_save`]), run the
//! request however they like, and hand the outcome back with the matching
//! `apply_*` method.

use shared::{
    domain::{QuestionId, ResponseId, ResponseStatus},
    protocol::{AnswerValue, Question, SaveResponseRequest, SaveResponseResult, SurveyInfo, SurveyPayload},
};
use tracing::{debug, info, warn};

use crate::{
    answers::AnswerMap,
    error::SessionError,
    form::{self, FieldEdit, RenderedForm},
    link::{Route, SurveyLink},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveKind {
    Draft,
    Submit,
}

impl SaveKind {
    pub fn is_submit(self) -> bool {
        self == Self::Submit
    }
}

/// What the front end should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InvalidLink,
    Idle,
    Loading,
    LoadFailed,
    Editing,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(SessionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSurvey {
    pub survey: SurveyInfo,
    pub questions: Vec<Question>,
    pub existing_answers: AnswerMap,
    pub response_id: Option<ResponseId>,
    pub response_status: Option<ResponseStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub link: SurveyLink,
}

/// A save captured at the moment it was started.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub kind: SaveKind,
    pub link: SurveyLink,
    pub body: SaveResponseRequest,
}

#[derive(Debug, Clone)]
pub struct ResponseSession {
    link: Option<SurveyLink>,
    load: LoadStatus,
    survey: Option<LoadedSurvey>,
    answers: AnswerMap,
    edited: bool,
    pending_save: Option<SaveKind>,
    save_error: Option<SessionError>,
    last_saved: Option<SaveResponseResult>,
    completed: bool,
}

impl ResponseSession {
    pub fn new(link: Option<SurveyLink>) -> Self {
        Self {
            link,
            load: LoadStatus::Idle,
            survey: None,
            answers: AnswerMap::new(),
            edited: false,
            pending_save: None,
            save_error: None,
            last_saved: None,
            completed: false,
        }
    }

    pub fn from_route(route: &Route) -> Self {
        Self::new(route.link().cloned())
    }

    pub fn link(&self) -> Option<&SurveyLink> {
        self.link.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.link.is_none() {
            return SessionPhase::InvalidLink;
        }
        if self.completed {
            return SessionPhase::Completed;
        }
        match (&self.load, &self.survey) {
            (LoadStatus::Failed(_), _) => SessionPhase::LoadFailed,
            (_, Some(_)) => SessionPhase::Editing,
            (LoadStatus::Loading, None) => SessionPhase::Loading,
            (LoadStatus::Idle | LoadStatus::Ready, None) => SessionPhase::Idle,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn load_error(&self) -> Option<&SessionError> {
        match &self.load {
            LoadStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn survey(&self) -> Option<&LoadedSurvey> {
        self.survey.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        self.survey
            .as_ref()
            .map(|loaded| loaded.questions.as_slice())
            .unwrap_or(&[])
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn has_local_edits(&self) -> bool {
        self.edited
    }

    pub fn pending_save(&self) -> Option<SaveKind> {
        self.pending_save
    }

    /// While true, both the draft and the submit actions are unavailable.
    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn save_error(&self) -> Option<&SessionError> {
        self.save_error.as_ref()
    }

    pub fn last_saved(&self) -> Option<&SaveResponseResult> {
        self.last_saved.as_ref()
    }

    pub fn dismiss_save_error(&mut self) {
        self.save_error = None;
    }

    pub fn can_save(&self) -> bool {
        self.link.is_some() && self.survey.is_some() && !self.completed && !self.is_saving()
    }

    pub fn form(&self) -> Option<RenderedForm<'_>> {
        let loaded = self.survey.as_ref()?;
        Some(form::render_form(&loaded.questions, &self.answers))
    }

    /// Starts a (re)load. Without a complete link no request is produced.
    pub fn begin_load(&mut self) -> Result<LoadRequest, SessionError> {
        let link = self.link.clone().ok_or(SessionError::InvalidLink)?;
        self.load = LoadStatus::Loading;
        debug!(survey_code = link.code(), "survey load started");
        Ok(LoadRequest { link })
    }

    /// Applies a load outcome. Returns `false` when the outcome belongs to a
    /// different link and was dropped.
    pub fn apply_load(
        &mut self,
        link: &SurveyLink,
        result: Result<SurveyPayload, SessionError>,
    ) -> bool {
        if self.link.as_ref() != Some(link) {
            warn!(survey_code = link.code(), "dropping load result for a stale link");
            return false;
        }

        match result {
            Ok(payload) => {
                for question in payload
                    .questions
                    .iter()
                    .filter(|q| !q.question_type.is_known())
                {
                    warn!(
                        question_id = %question.id,
                        question_type = %question.question_type,
                        "survey contains a question type this client cannot render"
                    );
                }

                let existing: AnswerMap = payload
                    .existing_answers
                    .into_iter()
                    .filter(|(_, value)| !value.is_null())
                    .collect();
                if !self.edited && self.answers.is_empty() {
                    self.answers = existing.clone();
                }
                if payload.response_status == Some(ResponseStatus::Completed) {
                    self.completed = true;
                }
                info!(
                    survey_code = link.code(),
                    questions = payload.questions.len(),
                    existing_answers = existing.len(),
                    status = ?payload.response_status,
                    "survey loaded"
                );
                self.survey = Some(LoadedSurvey {
                    survey: payload.survey,
                    questions: payload.questions,
                    existing_answers: existing,
                    response_id: payload.response_id,
                    response_status: payload.response_status,
                });
                self.load = LoadStatus::Ready;
            }
            Err(err) => {
                warn!(survey_code = link.code(), "survey load failed: {err}");
                self.load = LoadStatus::Failed(err);
            }
        }
        true
    }

    /// Applies one respondent edit. Returns whether the answer map changed.
    pub fn edit(&mut self, question_id: &QuestionId, edit: FieldEdit) -> bool {
        if self.completed {
            debug!(%question_id, "ignoring edit on a completed response");
            return false;
        }
        let Some(question) = self
            .survey
            .as_ref()
            .and_then(|loaded| loaded.questions.iter().find(|q| &q.id == question_id))
        else {
            debug!(%question_id, "ignoring edit for unknown question");
            return false;
        };

        let next = form::apply_edit(&self.answers, question, edit);
        if next.same_as(&self.answers) {
            return false;
        }
        self.answers = next;
        self.edited = true;
        true
    }

    /// Captures the current buffer for a draft save or a submit. Returns `None`
    /// while another save is in flight, before the survey is loaded, or once
    /// the response is completed.
    pub fn begin_save(&mut self, kind: SaveKind) -> Option<SaveRequest> {
        if !self.can_save() {
            debug!(?kind, pending = ?self.pending_save, "save not started");
            return None;
        }
        let link = self.link.clone()?;

        self.pending_save = Some(kind);
        self.save_error = None;
        let body = SaveResponseRequest {
            token: link.token().to_string(),
            survey_code: link.code().to_string(),
            answers: self.answers.to_entries(),
            submit: Some(kind.is_submit()),
        };
        debug!(?kind, answers = body.answers.len(), "save started");
        Some(SaveRequest { kind, link, body })
    }

    pub fn apply_save(
        &mut self,
        link: &SurveyLink,
        kind: SaveKind,
        result: Result<SaveResponseResult, SessionError>,
    ) -> bool {
        if self.link.as_ref() != Some(link) {
            warn!(survey_code = link.code(), "dropping save result for a stale link");
            return false;
        }
        self.pending_save = None;

        match result {
            Ok(saved) => {
                info!(
                    ?kind,
                    response_id = %saved.response_id,
                    status = ?saved.status,
                    "response saved"
                );
                if kind.is_submit() || saved.status.is_completed() {
                    self.completed = true;
                }
                if let Some(loaded) = self.survey.as_mut() {
                    loaded.response_id = Some(saved.response_id.clone());
                    loaded.response_status = Some(if self.completed {
                        ResponseStatus::Completed
                    } else {
                        saved.status
                    });
                }
                self.last_saved = Some(saved);
            }
            Err(err) => {
                warn!(?kind, "save failed: {err}");
                self.save_error = Some(err);
            }
        }
        true
    }

    /// Current value for one question, if answered.
    pub fn answer(&self, question_id: &QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
