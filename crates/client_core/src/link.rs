//! Emailed survey links: `/survey/{code}?token={token}`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::{form_urlencoded, Url};

use crate::error::SessionError;

const SURVEY_SEGMENT: &str = "survey";
const TOKEN_PARAM: &str = "token";
const LINK_BASE: &str = "http://localhost/";

/// Characters escaped when a code is written back into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Identifies one respondent's session. Load results are keyed on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurveyLink {
    code: String,
    token: String,
}

impl SurveyLink {
    pub fn new(code: impl Into<String>, token: impl Into<String>) -> Result<Self, SessionError> {
        let code = code.into();
        let token = token.into();
        if code.trim().is_empty() || token.trim().is_empty() {
            return Err(SessionError::InvalidLink);
        }
        Ok(Self { code, token })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn to_path(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(TOKEN_PARAM, &self.token)
            .finish();
        let code = utf8_percent_encode(&self.code, PATH_SEGMENT);
        format!("/{SURVEY_SEGMENT}/{code}?{query}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Survey(SurveyLink),
    /// The survey route, but the code or the token is missing.
    InvalidLink,
    NotFound,
}

impl Route {
    pub fn link(&self) -> Option<&SurveyLink> {
        match self {
            Self::Survey(link) => Some(link),
            _ => None,
        }
    }
}

/// Accepts a full URL (as pasted from the email) or just its path and query.
pub fn parse_route(input: &str) -> Route {
    let input = input.trim();
    if input.is_empty() {
        return Route::NotFound;
    }

    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(LINK_BASE).and_then(|base| base.join(input)) {
                Ok(url) => url,
                Err(_) => return Route::NotFound,
            }
        }
        Err(_) => return Route::NotFound,
    };

    let mut segments: Vec<&str> = match url.path_segments() {
        Some(segments) => segments.collect(),
        None => return Route::NotFound,
    };
    if segments.len() > 1 && segments.last() == Some(&"") {
        segments.pop();
    }

    let code = match segments.as_slice() {
        [SURVEY_SEGMENT] => "",
        [SURVEY_SEGMENT, code] => *code,
        _ => return Route::NotFound,
    };
    // Segments come back still percent-encoded.
    let Ok(code) = percent_decode_str(code).decode_utf8() else {
        return Route::InvalidLink;
    };
    let token = url
        .query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    match SurveyLink::new(code.into_owned(), token) {
        Ok(link) => Route::Survey(link),
        Err(_) => Route::InvalidLink,
    }
}

#[cfg(test)]
#[path = "tests/link_tests.rs"]
mod tests;
