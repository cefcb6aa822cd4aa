//! Respondent-side survey client: link parsing, form rendering, the local
//! answer buffer and the draft/submit session against the public survey API.

pub mod answers;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod link;
pub mod session;
pub mod strings;

pub use answers::AnswerMap;
pub use api::{HttpSurveyApi, SurveyApi};
pub use config::{load_settings, Settings};
pub use controller::{SaveDispatch, SessionController};
pub use error::{ClientError, SessionError};
pub use form::{render_form, FieldControl, FieldEdit, RenderedForm};
pub use link::{parse_route, Route, SurveyLink};
pub use session::{ResponseSession, SaveKind, SaveRequest, SessionPhase};
