//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use anyhow::Context;
use client_core::{HttpSurveyApi, SessionError, Settings, SurveyApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let (runtime, api) = match start(&settings) {
            Ok(started) => started,
            Err(err) => {
                tracing::error!("backend worker startup failure: {err:#}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("{err:#}"),
                )));
                return;
            }
        };
        tracing::info!(api_base_url = %settings.api_base_url, "backend worker started");

        while let Ok(cmd) = cmd_rx.recv() {
            let event = runtime.block_on(execute(api.as_ref(), cmd));
            if ui_tx.send(event).is_err() {
                tracing::debug!("ui event receiver dropped; stopping backend worker");
                break;
            }
        }
    });
}

fn start(settings: &Settings) -> anyhow::Result<(tokio::runtime::Runtime, Arc<dyn SurveyApi>)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build backend runtime")?;
    let api = HttpSurveyApi::from_settings(settings).context("failed to configure survey API")?;
    Ok((runtime, Arc::new(api)))
}

/// Runs one command to completion and reports its outcome, keyed by the link
/// it was issued for.
pub async fn execute(api: &dyn SurveyApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::LoadSurvey { link } => {
            let result = api.fetch_survey(&link).await.map_err(|err| {
                tracing::warn!(survey_code = link.code(), "fetch_survey failed: {err}");
                SessionError::load_failure(&err)
            });
            UiEvent::SurveyLoaded { link, result }
        }
        BackendCommand::SaveResponse { request } => {
            let result = api.save_response(&request.body).await.map_err(|err| {
                tracing::warn!(kind = ?request.kind, "save_response failed: {err}");
                SessionError::save_failure(&err)
            });
            UiEvent::SaveFinished {
                link: request.link,
                kind: request.kind,
                result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use client_core::{strings, ClientError, ResponseSession, SaveKind, SurveyLink};
    use shared::{
        domain::ResponseStatus,
        protocol::{SaveResponseRequest, SaveResponseResult, SurveyInfo, SurveyPayload},
    };

    struct StubApi {
        fail_with: Option<Option<String>>,
    }

    #[async_trait]
    impl SurveyApi for StubApi {
        async fn fetch_survey(&self, link: &SurveyLink) -> Result<SurveyPayload, ClientError> {
            if let Some(message) = &self.fail_with {
                return Err(ClientError::Api {
                    status: 400,
                    message: message.clone(),
                });
            }
            Ok(SurveyPayload {
                survey: SurveyInfo {
                    id: "s1".into(),
                    code: link.code().to_string(),
                    name: "Khảo sát".into(),
                    description: None,
                },
                questions: Vec::new(),
                existing_answers: Default::default(),
                response_id: None,
                response_status: Some(ResponseStatus::Partial),
            })
        }

        async fn save_response(
            &self,
            request: &SaveResponseRequest,
        ) -> Result<SaveResponseResult, ClientError> {
            if let Some(message) = &self.fail_with {
                return Err(ClientError::Api {
                    status: 500,
                    message: message.clone(),
                });
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

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("runtime")
    }

    fn link() -> SurveyLink {
        SurveyLink::new("abc", "tok1").expect("link")
    }

    #[test]
    fn load_reports_payload_for_the_requested_link() {
        let api = StubApi { fail_with: None };
        let event = runtime().block_on(execute(&api, BackendCommand::LoadSurvey { link: link() }));
        match event {
            UiEvent::SurveyLoaded { link: loaded, result } => {
                assert_eq!(loaded, link());
                assert_eq!(result.expect("payload").survey.code, "abc");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn load_failure_carries_server_message() {
        let api = StubApi {
            fail_with: Some(Some("Token đã hết hạn".into())),
        };
        let event = runtime().block_on(execute(&api, BackendCommand::LoadSurvey { link: link() }));
        match event {
            UiEvent::SurveyLoaded { result, .. } => assert_eq!(
                result,
                Err(SessionError::LoadFailure("Token đã hết hạn".into()))
            ),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn save_failure_without_message_uses_fallback() {
        let api = StubApi {
            fail_with: Some(None),
        };
        let mut session = ResponseSession::new(Some(link()));
        let load = runtime().block_on(execute(
            &StubApi { fail_with: None },
            BackendCommand::LoadSurvey { link: link() },
        ));
        if let UiEvent::SurveyLoaded { link, result } = load {
            session.apply_load(&link, result);
        }
        let request = session.begin_save(SaveKind::Submit).expect("save request");

        let event = runtime().block_on(execute(&api, BackendCommand::SaveResponse { request }));
        match event {
            UiEvent::SaveFinished { kind, result, .. } => {
                assert_eq!(kind, SaveKind::Submit);
                assert_eq!(
                    result,
                    Err(SessionError::SaveFailure(strings::SAVE_FAILED_FALLBACK.into()))
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn bad_base_url_fails_startup() {
        let settings = Settings {
            api_base_url: "not a url".into(),
            ..Settings::default()
        };
        let err = start(&settings).err().expect("startup should fail");
        assert!(format!("{err:#}").contains("invalid API base url"));
    }
}
