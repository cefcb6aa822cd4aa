//! Backend commands queued from UI to backend worker.

use client_core::{SaveRequest, SurveyLink};

#[derive(Debug)]
pub enum BackendCommand {
    LoadSurvey { link: SurveyLink },
    SaveResponse { request: SaveRequest },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadSurvey { .. } => "load_survey",
            Self::SaveResponse { .. } => "save_response",
        }
    }
}
