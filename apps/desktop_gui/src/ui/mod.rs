//! UI layer for the survey window.

pub mod app;
mod fields;

pub use app::SurveyApp;
